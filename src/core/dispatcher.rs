//! Order dispatcher — the boundary between order entry and the cell.
//!
//! Validation and compilation happen synchronously on the caller's task;
//! the network send is detached onto a background task so the caller never
//! blocks on the controller. The returned receipt lets a caller observe
//! the send outcome, but nothing forces it to: failures are also logged,
//! and a dropped receipt does not cancel the send.

use super::codegen::Compiler;
use super::config::CellConfig;
use super::types::{ControlCommand, Order, OrderError};
use crate::transport::{RobotClient, Transport, TransportError};
use std::sync::Arc;
use tokio::sync::oneshot;
use tracing::{error, info};

/// Handle to one detached program send.
#[derive(Debug)]
pub struct DispatchReceipt {
    order: Order,
    outcome: oneshot::Receiver<Result<(), TransportError>>,
}

impl DispatchReceipt {
    /// The order this receipt tracks.
    pub fn order(&self) -> &Order {
        &self.order
    }

    /// Wait for the background send to finish. Returns `None` only when
    /// the runtime was torn down before the send completed.
    pub async fn wait(self) -> Option<Result<(), TransportError>> {
        self.outcome.await.ok()
    }
}

/// Boundary API: accepts orders, compiles, hands off to the transport.
pub struct Dispatcher {
    compiler: Compiler,
    transport: Arc<dyn Transport>,
}

impl Dispatcher {
    pub fn new(config: &CellConfig) -> Self {
        Self::with_transport(config, Arc::new(RobotClient::new(config)))
    }

    /// Construct with an explicit transport (tests inject a fake here).
    pub fn with_transport(config: &CellConfig, transport: Arc<dyn Transport>) -> Self {
        Self { compiler: Compiler::new(config), transport }
    }

    /// Entry point for raw counts from the surrounding application.
    /// Invalid quantities are rejected here, before any compilation or
    /// transport work.
    pub fn dispatch_counts(
        &self,
        qty_a: i64,
        qty_b: i64,
        qty_c: i64,
    ) -> Result<DispatchReceipt, OrderError> {
        Ok(self.dispatch(Order::new(qty_a, qty_b, qty_c)?))
    }

    /// Compile an order and detach the send. Never blocks on the network;
    /// must be called from within a tokio runtime.
    pub fn dispatch(&self, order: Order) -> DispatchReceipt {
        let program = self.compiler.compile(&order);
        let transport = Arc::clone(&self.transport);
        let (tx, rx) = oneshot::channel();

        info!(%order, bytes = program.text().len(), "dispatching order");
        tokio::spawn(async move {
            let result = transport.send_program(&program).await;
            match &result {
                Ok(()) => info!(%order, "program delivered"),
                Err(err) => error!(%order, error = %err, "program send failed"),
            }
            let _ = tx.send(result);
        });

        DispatchReceipt { order, outcome: rx }
    }

    /// Stop the robot. Inline on the dashboard channel; safe to call while
    /// a program send is in flight.
    pub async fn stop(&self) -> Result<(), TransportError> {
        self.transport.send_command(ControlCommand::Stop).await
    }

    /// Release the brakes. Inline on the dashboard channel.
    pub async fn brake_release(&self) -> Result<(), TransportError> {
        self.transport.send_command(ControlCommand::BrakeRelease).await
    }

    /// The compiler bound to this cell's configuration.
    pub fn compiler(&self) -> &Compiler {
        &self.compiler
    }
}

// ============================================================================
// Tests
// ============================================================================
