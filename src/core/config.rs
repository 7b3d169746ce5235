//! Cell configuration — YAML parsing and validation.
//!
//! The controller's network location varies per deployment, so every
//! endpoint (address, program port, dashboard port, gripper RPC port)
//! comes from cell.yaml. Nothing network-shaped is compiled in.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Root configuration — one robot cell.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CellConfig {
    /// Schema version (must be "1.0")
    #[serde(default = "default_version")]
    pub version: String,

    /// Human-readable cell name
    #[serde(default = "default_name")]
    pub name: String,

    /// Controller endpoints
    pub robot: RobotEndpoints,

    /// Shared motion parameters for all recipes
    #[serde(default)]
    pub motion: MotionParams,

    /// Transport timeouts and retry policy
    #[serde(default)]
    pub transport: TransportPolicy,
}

impl Default for CellConfig {
    fn default() -> Self {
        Self {
            version: default_version(),
            name: default_name(),
            robot: RobotEndpoints::default(),
            motion: MotionParams::default(),
            transport: TransportPolicy::default(),
        }
    }
}

fn default_version() -> String {
    "1.0".to_string()
}

fn default_name() -> String {
    "cell".to_string()
}

/// Network endpoints of one controller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RobotEndpoints {
    /// Controller address (IP or DNS)
    #[serde(default = "default_addr")]
    pub addr: String,

    /// Program-execution port: accepts a full URScript program as text
    #[serde(default = "default_program_port")]
    pub program_port: u16,

    /// Dashboard port: accepts single-word operational commands
    #[serde(default = "default_dashboard_port")]
    pub dashboard_port: u16,

    /// XML-RPC port of the gripper service on the controller
    #[serde(default = "default_rpc_port")]
    pub gripper_rpc_port: u16,

    /// Numeric address of the gripper actuator on the tool flange
    #[serde(default)]
    pub tool_index: u32,
}

impl Default for RobotEndpoints {
    fn default() -> Self {
        Self {
            addr: default_addr(),
            program_port: default_program_port(),
            dashboard_port: default_dashboard_port(),
            gripper_rpc_port: default_rpc_port(),
            tool_index: 0,
        }
    }
}

impl RobotEndpoints {
    /// URL of the gripper's XML-RPC service, as referenced from inside a
    /// generated program (the controller resolves it, not this process).
    pub fn gripper_rpc_url(&self) -> String {
        format!("http://{}:{}", self.addr, self.gripper_rpc_port)
    }
}

fn default_addr() -> String {
    "127.0.0.1".to_string()
}

fn default_program_port() -> u16 {
    30002
}

fn default_dashboard_port() -> u16 {
    29999
}

fn default_rpc_port() -> u16 {
    41414
}

/// Shared acceleration and velocity, declared once in the program header
/// and referenced by every recipe move.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MotionParams {
    #[serde(default = "default_accel")]
    pub accel: f64,

    #[serde(default = "default_vel")]
    pub vel: f64,
}

impl Default for MotionParams {
    fn default() -> Self {
        Self { accel: default_accel(), vel: default_vel() }
    }
}

fn default_accel() -> f64 {
    1.2
}

fn default_vel() -> f64 {
    0.25
}

/// Transport timeouts and retry policy.
///
/// Attempts defaults to 1: re-sending a motion program risks
/// double-executing physical motion, so retries are opt-in per cell.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TransportPolicy {
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,

    #[serde(default = "default_write_timeout_ms")]
    pub write_timeout_ms: u64,

    #[serde(default = "default_attempts")]
    pub attempts: u32,

    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
}

impl Default for TransportPolicy {
    fn default() -> Self {
        Self {
            connect_timeout_ms: default_connect_timeout_ms(),
            write_timeout_ms: default_write_timeout_ms(),
            attempts: default_attempts(),
            retry_delay_ms: default_retry_delay_ms(),
        }
    }
}

impl TransportPolicy {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn write_timeout(&self) -> Duration {
        Duration::from_millis(self.write_timeout_ms)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }
}

fn default_connect_timeout_ms() -> u64 {
    5000
}

fn default_write_timeout_ms() -> u64 {
    5000
}

fn default_attempts() -> u32 {
    1
}

fn default_retry_delay_ms() -> u64 {
    500
}

// ============================================================================
// Parsing and validation
// ============================================================================

/// Validation error.
#[derive(Debug, Clone)]
pub struct ValidationError {
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

/// Parse a cell.yaml file from disk.
pub fn parse_config_file(path: &Path) -> Result<CellConfig, String> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("failed to read {}: {}", path.display(), e))?;
    parse_config(&content)
}

/// Parse a cell.yaml from a string.
pub fn parse_config(yaml: &str) -> Result<CellConfig, String> {
    serde_yaml_ng::from_str(yaml).map_err(|e| format!("YAML parse error: {}", e))
}

/// Load a config file if it exists, fall back to defaults otherwise.
pub fn load_or_default(path: &Path) -> Result<CellConfig, String> {
    if path.exists() {
        parse_config_file(path)
    } else {
        Ok(CellConfig::default())
    }
}

/// Validate a parsed config. Returns a list of errors (empty = valid).
pub fn validate_config(config: &CellConfig) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if config.version != "1.0" {
        errors.push(ValidationError {
            message: format!("version must be \"1.0\", got \"{}\"", config.version),
        });
    }

    if config.robot.addr.is_empty() {
        errors.push(ValidationError {
            message: "robot.addr must not be empty".to_string(),
        });
    }

    if config.robot.program_port == 0 || config.robot.dashboard_port == 0 {
        errors.push(ValidationError {
            message: "robot ports must be non-zero".to_string(),
        });
    }

    if config.robot.program_port == config.robot.dashboard_port {
        errors.push(ValidationError {
            message: format!(
                "program_port and dashboard_port must differ, both are {}",
                config.robot.program_port
            ),
        });
    }

    if config.motion.accel <= 0.0 || config.motion.vel <= 0.0 {
        errors.push(ValidationError {
            message: "motion.accel and motion.vel must be positive".to_string(),
        });
    }

    if config.transport.attempts == 0 {
        errors.push(ValidationError {
            message: "transport.attempts must be at least 1".to_string(),
        });
    }

    if config.transport.connect_timeout_ms == 0 || config.transport.write_timeout_ms == 0 {
        errors.push(ValidationError {
            message: "transport timeouts must be non-zero".to_string(),
        });
    }

    errors
}

/// Template written by `celda init`.
pub fn default_config_template() -> &'static str {
    r#"version: "1.0"
name: my-cell

robot:
  # Controller network address — set this to the physical robot.
  addr: 192.168.0.10
  program_port: 30002
  dashboard_port: 29999
  gripper_rpc_port: 41414
  tool_index: 0

motion:
  accel: 1.2
  vel: 0.25

transport:
  connect_timeout_ms: 5000
  write_timeout_ms: 5000
  # Keep attempts at 1 unless double-executed motion is acceptable.
  attempts: 1
  retry_delay_ms: 500
"#
}

// ============================================================================
// Tests
// ============================================================================
