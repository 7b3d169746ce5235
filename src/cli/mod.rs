//! CLI subcommands — init, validate, compile, send, run-one, probe, stop,
//! brake-release.

use crate::core::codegen::Compiler;
use crate::core::config::{self, CellConfig};
use crate::core::dispatcher::Dispatcher;
use crate::core::types::{ComponentType, ControlCommand, Order};
use crate::transport::{RobotClient, Transport};
use clap::Subcommand;
use std::path::{Path, PathBuf};

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize a cell.yaml template
    Init {
        /// Directory to initialize (default: current)
        #[arg(default_value = ".")]
        path: PathBuf,
    },

    /// Validate cell.yaml without connecting to the robot
    Validate {
        /// Path to cell.yaml
        #[arg(short, long, default_value = "cell.yaml")]
        file: PathBuf,
    },

    /// Compile an order and print the program without sending it
    Compile {
        /// Quantity of component A
        #[arg(short = 'a', long = "qty-a", default_value_t = 0)]
        qty_a: i64,

        /// Quantity of component B
        #[arg(short = 'b', long = "qty-b", default_value_t = 0)]
        qty_b: i64,

        /// Quantity of component C
        #[arg(short = 'c', long = "qty-c", default_value_t = 0)]
        qty_c: i64,

        /// Path to cell.yaml (defaults are used when absent)
        #[arg(short, long, default_value = "cell.yaml")]
        file: PathBuf,
    },

    /// Compile an order and send it to the program-execution port
    Send {
        /// Quantity of component A
        #[arg(short = 'a', long = "qty-a", default_value_t = 0)]
        qty_a: i64,

        /// Quantity of component B
        #[arg(short = 'b', long = "qty-b", default_value_t = 0)]
        qty_b: i64,

        /// Quantity of component C
        #[arg(short = 'c', long = "qty-c", default_value_t = 0)]
        qty_c: i64,

        /// Path to cell.yaml
        #[arg(short, long, default_value = "cell.yaml")]
        file: PathBuf,
    },

    /// Dispatch a single unit of one component (a, b or c)
    RunOne {
        /// Component type
        component: String,

        /// Path to cell.yaml
        #[arg(short, long, default_value = "cell.yaml")]
        file: PathBuf,
    },

    /// Send a one-move connectivity-check program
    Probe {
        /// Path to cell.yaml
        #[arg(short, long, default_value = "cell.yaml")]
        file: PathBuf,
    },

    /// Stop the robot via the dashboard port
    Stop {
        /// Path to cell.yaml
        #[arg(short, long, default_value = "cell.yaml")]
        file: PathBuf,
    },

    /// Release the brakes via the dashboard port
    BrakeRelease {
        /// Path to cell.yaml
        #[arg(short, long, default_value = "cell.yaml")]
        file: PathBuf,
    },
}

/// Dispatch a CLI command.
pub async fn dispatch(cmd: Commands) -> Result<(), String> {
    match cmd {
        Commands::Init { path } => cmd_init(&path),
        Commands::Validate { file } => cmd_validate(&file),
        Commands::Compile { qty_a, qty_b, qty_c, file } => {
            cmd_compile(qty_a, qty_b, qty_c, &file)
        }
        Commands::Send { qty_a, qty_b, qty_c, file } => {
            cmd_send(qty_a, qty_b, qty_c, &file).await
        }
        Commands::RunOne { component, file } => cmd_run_one(&component, &file).await,
        Commands::Probe { file } => cmd_probe(&file).await,
        Commands::Stop { file } => cmd_command(ControlCommand::Stop, &file).await,
        Commands::BrakeRelease { file } => {
            cmd_command(ControlCommand::BrakeRelease, &file).await
        }
    }
}

/// Load a config (defaults when the file is absent) and refuse to proceed
/// on validation errors.
fn load_config(path: &Path) -> Result<CellConfig, String> {
    let config = config::load_or_default(path)?;
    let errors = config::validate_config(&config);
    if !errors.is_empty() {
        let messages: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
        return Err(messages.join("\n"));
    }
    Ok(config)
}

fn cmd_init(path: &Path) -> Result<(), String> {
    let config_path = path.join("cell.yaml");
    if config_path.exists() {
        return Err(format!("{} already exists", config_path.display()));
    }
    std::fs::create_dir_all(path).map_err(|e| format!("cannot create {}: {}", path.display(), e))?;
    std::fs::write(&config_path, config::default_config_template())
        .map_err(|e| format!("cannot write {}: {}", config_path.display(), e))?;
    println!("wrote {}", config_path.display());
    Ok(())
}

fn cmd_validate(file: &Path) -> Result<(), String> {
    let config = config::parse_config_file(file)?;
    let errors = config::validate_config(&config);
    if errors.is_empty() {
        println!(
            "{} valid: cell '{}', robot {} (program {}, dashboard {})",
            file.display(),
            config.name,
            config.robot.addr,
            config.robot.program_port,
            config.robot.dashboard_port
        );
        Ok(())
    } else {
        for e in &errors {
            eprintln!("invalid: {}", e);
        }
        Err(format!("{} validation error(s)", errors.len()))
    }
}

fn cmd_compile(qty_a: i64, qty_b: i64, qty_c: i64, file: &Path) -> Result<(), String> {
    let config = load_config(file)?;
    let order = Order::new(qty_a, qty_b, qty_c).map_err(|e| e.to_string())?;
    let program = Compiler::new(&config).compile(&order);
    print!("{}", program.text());
    Ok(())
}

async fn cmd_send(qty_a: i64, qty_b: i64, qty_c: i64, file: &Path) -> Result<(), String> {
    let config = load_config(file)?;
    let order = Order::new(qty_a, qty_b, qty_c).map_err(|e| e.to_string())?;
    send_order(&config, order).await
}

async fn cmd_run_one(component: &str, file: &Path) -> Result<(), String> {
    let component: ComponentType = component.parse()?;
    let config = load_config(file)?;
    send_order(&config, Order::single(component)).await
}

async fn send_order(config: &CellConfig, order: Order) -> Result<(), String> {
    let dispatcher = Dispatcher::new(config);
    let receipt = dispatcher.dispatch(order);
    println!(
        "order {} dispatched to {}:{}",
        receipt.order(),
        config.robot.addr,
        config.robot.program_port
    );
    // The library never blocks its caller on the send; the CLI is the
    // caller here and chooses to observe the outcome before exiting.
    match receipt.wait().await {
        Some(Ok(())) => {
            println!("program delivered");
            Ok(())
        }
        Some(Err(e)) => Err(e.to_string()),
        None => Err("dispatch task was aborted before completion".to_string()),
    }
}

async fn cmd_probe(file: &Path) -> Result<(), String> {
    let config = load_config(file)?;
    let client = RobotClient::new(&config);
    let program = Compiler::new(&config).probe_program();
    client.send_program(&program).await.map_err(|e| e.to_string())?;
    println!("probe delivered to {}:{}", config.robot.addr, config.robot.program_port);
    Ok(())
}

async fn cmd_command(command: ControlCommand, file: &Path) -> Result<(), String> {
    let config = load_config(file)?;
    let client = RobotClient::new(&config);
    client.send_command(command).await.map_err(|e| e.to_string())?;
    println!(
        "'{}' sent to {}:{}",
        command, config.robot.addr, config.robot.dashboard_port
    );
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cmd_init_writes_template() {
        let dir = tempfile::tempdir().unwrap();
        cmd_init(dir.path()).unwrap();
        let config = config::parse_config_file(&dir.path().join("cell.yaml")).unwrap();
        assert!(config::validate_config(&config).is_empty());
    }

    #[test]
    fn test_cmd_init_refuses_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        cmd_init(dir.path()).unwrap();
        let err = cmd_init(dir.path()).unwrap_err();
        assert!(err.contains("already exists"));
    }

    #[test]
    fn test_cmd_validate_ok() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cell.yaml");
        std::fs::write(&path, config::default_config_template()).unwrap();
        cmd_validate(&path).unwrap();
    }

    #[test]
    fn test_cmd_validate_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = cmd_validate(&dir.path().join("absent.yaml")).unwrap_err();
        assert!(err.contains("failed to read"));
    }

    #[test]
    fn test_cmd_validate_rejects_bad_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cell.yaml");
        std::fs::write(&path, "robot:\n  addr: 10.0.0.1\ntransport:\n  attempts: 0\n").unwrap();
        let err = cmd_validate(&path).unwrap_err();
        assert!(err.contains("validation error"));
    }

    #[test]
    fn test_cmd_compile_defaults_when_config_absent() {
        let dir = tempfile::tempdir().unwrap();
        cmd_compile(2, 0, 1, &dir.path().join("absent.yaml")).unwrap();
    }

    #[test]
    fn test_cmd_compile_rejects_negative() {
        let dir = tempfile::tempdir().unwrap();
        let err = cmd_compile(-1, 0, 0, &dir.path().join("absent.yaml")).unwrap_err();
        assert!(err.contains("negative"));
    }

    #[test]
    fn test_load_config_refuses_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cell.yaml");
        std::fs::write(&path, "version: \"9.9\"\nrobot:\n  addr: 10.0.0.1\n").unwrap();
        let err = load_config(&path).unwrap_err();
        assert!(err.contains("version"));
    }
}
