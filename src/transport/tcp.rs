//! TCP robot client — one connection per message.
//!
//! Each send opens a fresh connection to the configured port, writes the
//! full ASCII message ending in a newline, flushes, and closes. Programs go
//! to the program-execution port behind a single-slot lock (the controller
//! cannot accept overlapping programs); dashboard commands go to their own
//! port and never queue behind a program send.

use super::{TimeoutPhase, Transport, TransportError};
use crate::core::config::{CellConfig, TransportPolicy};
use crate::core::types::{CompiledProgram, ControlCommand};
use async_trait::async_trait;
use std::borrow::Cow;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tokio::time::timeout;
use tracing::{debug, warn};

pub struct RobotClient {
    addr: String,
    program_port: u16,
    dashboard_port: u16,
    policy: TransportPolicy,
    program_slot: Mutex<()>,
}

impl RobotClient {
    pub fn new(config: &CellConfig) -> Self {
        Self {
            addr: config.robot.addr.clone(),
            program_port: config.robot.program_port,
            dashboard_port: config.robot.dashboard_port,
            policy: config.transport,
            program_slot: Mutex::new(()),
        }
    }

    async fn deliver(&self, port: u16, payload: &str) -> Result<(), TransportError> {
        let message: Cow<'_, str> = if payload.ends_with('\n') {
            Cow::Borrowed(payload)
        } else {
            Cow::Owned(format!("{}\n", payload))
        };
        let target = format!("{}:{}", self.addr, port);

        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.try_deliver(&target, message.as_bytes()).await {
                Ok(()) => {
                    debug!(target = %target, bytes = message.len(), "message delivered");
                    return Ok(());
                }
                Err(err) if attempt < self.policy.attempts => {
                    warn!(target = %target, attempt, error = %err, "send failed, retrying");
                    tokio::time::sleep(self.policy.retry_delay()).await;
                }
                Err(err) => return Err(err),
            }
        }
    }

    async fn try_deliver(&self, target: &str, bytes: &[u8]) -> Result<(), TransportError> {
        let connect_timeout = self.policy.connect_timeout();
        let mut stream = match timeout(connect_timeout, TcpStream::connect(target)).await {
            Ok(Ok(stream)) => stream,
            Ok(Err(source)) => {
                return Err(TransportError::ConnectFailed { addr: target.to_string(), source })
            }
            Err(_) => {
                return Err(TransportError::Timeout {
                    addr: target.to_string(),
                    phase: TimeoutPhase::Connect,
                    timeout: connect_timeout,
                })
            }
        };

        let write_timeout = self.policy.write_timeout();
        let write = async {
            stream.write_all(bytes).await?;
            stream.flush().await?;
            stream.shutdown().await
        };
        match timeout(write_timeout, write).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(source)) => {
                Err(TransportError::WriteFailed { addr: target.to_string(), source })
            }
            Err(_) => Err(TransportError::Timeout {
                addr: target.to_string(),
                phase: TimeoutPhase::Write,
                timeout: write_timeout,
            }),
        }
    }
}

#[async_trait]
impl Transport for RobotClient {
    async fn send_program(&self, program: &CompiledProgram) -> Result<(), TransportError> {
        let _slot = self.program_slot.lock().await;
        self.deliver(self.program_port, program.text()).await
    }

    async fn send_command(&self, command: ControlCommand) -> Result<(), TransportError> {
        self.deliver(self.dashboard_port, command.as_line()).await
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};
    use tokio::io::AsyncReadExt;
    use tokio::net::TcpListener;

    fn config_for(program_port: u16, dashboard_port: u16) -> CellConfig {
        let mut config = CellConfig::default();
        config.robot.addr = "127.0.0.1".to_string();
        config.robot.program_port = program_port;
        config.robot.dashboard_port = dashboard_port;
        config
    }

    async fn read_one_message(listener: &TcpListener) -> String {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut buf = String::new();
        socket.read_to_string(&mut buf).await.unwrap();
        buf
    }

    #[tokio::test]
    async fn test_send_command_writes_fixed_line() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let client = RobotClient::new(&config_for(1, port));

        let server = tokio::spawn(async move { read_one_message(&listener).await });
        client.send_command(ControlCommand::Stop).await.unwrap();
        assert_eq!(server.await.unwrap(), "stop\n");
    }

    #[tokio::test]
    async fn test_send_program_delivers_full_text() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let client = RobotClient::new(&config_for(port, 1));
        let program = CompiledProgram::new("def prog():\n  do_a()\nend\nprog()".to_string());

        let server = tokio::spawn(async move { read_one_message(&listener).await });
        client.send_program(&program).await.unwrap();
        let received = server.await.unwrap();
        assert_eq!(received, "def prog():\n  do_a()\nend\nprog()\n");
        assert!(received.ends_with('\n'));
    }

    #[tokio::test]
    async fn test_channels_use_their_own_ports() {
        let program_listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let dashboard_listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let client = RobotClient::new(&config_for(
            program_listener.local_addr().unwrap().port(),
            dashboard_listener.local_addr().unwrap().port(),
        ));

        let program_server =
            tokio::spawn(async move { read_one_message(&program_listener).await });
        let dashboard_server =
            tokio::spawn(async move { read_one_message(&dashboard_listener).await });

        let program = CompiledProgram::new("prog()".to_string());
        client.send_program(&program).await.unwrap();
        client.send_command(ControlCommand::BrakeRelease).await.unwrap();

        assert_eq!(program_server.await.unwrap(), "prog()\n");
        assert_eq!(dashboard_server.await.unwrap(), "brake release\n");
    }

    #[tokio::test]
    async fn test_connect_refused_is_connect_failed() {
        // Bind then drop to get a port that is closed right now.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let client = RobotClient::new(&config_for(port, 1));
        let program = CompiledProgram::new("prog()".to_string());
        let err = client.send_program(&program).await.unwrap_err();
        assert!(matches!(err, TransportError::ConnectFailed { .. }), "got {:?}", err);
    }

    #[tokio::test]
    async fn test_stalled_write_times_out() {
        // Server accepts but never reads; a payload far beyond the socket
        // buffers cannot finish writing within the bound.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let mut config = config_for(port, 1);
        config.transport.write_timeout_ms = 200;
        let client = RobotClient::new(&config);

        let server = tokio::spawn(async move {
            let (socket, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(5)).await;
            drop(socket);
        });

        let program = CompiledProgram::new("x".repeat(16 * 1024 * 1024));
        let err = client.send_program(&program).await.unwrap_err();
        assert!(
            matches!(err, TransportError::Timeout { phase: TimeoutPhase::Write, .. }),
            "got {:?}",
            err
        );
        server.abort();
    }

    #[tokio::test]
    async fn test_program_sends_are_serialized() {
        // The first send's write cannot complete until the server drains
        // it. While it is stalled, no second connection may appear — a
        // pending connection in the backlog would mean the sends overlap.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let client = std::sync::Arc::new(RobotClient::new(&config_for(port, 1)));

        let server = tokio::spawn(async move {
            let (mut first_socket, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_millis(300)).await;
            let early = timeout(Duration::from_millis(100), listener.accept()).await;
            let overlapped = early.is_ok();

            let mut sink = Vec::new();
            first_socket.read_to_end(&mut sink).await.unwrap();

            let (mut second_socket, _) = match early {
                Ok(Ok(pair)) => pair,
                _ => listener.accept().await.unwrap(),
            };
            let mut sink = Vec::new();
            second_socket.read_to_end(&mut sink).await.unwrap();
            overlapped
        });

        // Large enough that write_all stalls until the server reads.
        let big = CompiledProgram::new("y".repeat(8 * 1024 * 1024));
        let c1 = std::sync::Arc::clone(&client);
        let p1 = big.clone();
        let first = tokio::spawn(async move { c1.send_program(&p1).await });
        let c2 = std::sync::Arc::clone(&client);
        let p2 = big;
        let second = tokio::spawn(async move { c2.send_program(&p2).await });

        first.await.unwrap().unwrap();
        second.await.unwrap().unwrap();
        assert!(
            !server.await.unwrap(),
            "second program connected while the first was still in flight"
        );
    }

    #[tokio::test]
    async fn test_retry_policy_makes_second_attempt() {
        // First attempt hits a closed port; the listener comes up before
        // the retry fires.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let mut config = config_for(port, 1);
        config.transport.attempts = 3;
        config.transport.retry_delay_ms = 150;
        let client = RobotClient::new(&config);

        let server = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            let listener = TcpListener::bind(("127.0.0.1", port)).await.unwrap();
            read_one_message(&listener).await
        });

        let program = CompiledProgram::new("prog()".to_string());
        client.send_program(&program).await.unwrap();
        assert_eq!(server.await.unwrap(), "prog()\n");
    }

    #[tokio::test]
    async fn test_single_attempt_does_not_retry() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let client = RobotClient::new(&config_for(port, 1));
        let started = Instant::now();
        let program = CompiledProgram::new("prog()".to_string());
        let err = client.send_program(&program).await.unwrap_err();
        assert!(matches!(err, TransportError::ConnectFailed { .. }));
        // A refused connect fails immediately; any retry sleep would show.
        assert!(started.elapsed() < Duration::from_millis(400));
    }
}
