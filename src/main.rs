//! Celda CLI — robot cell order dispatch.

use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "celda",
    version,
    about = "Robot cell order dispatch — deterministic URScript codegen, fire-and-forget TCP delivery"
)]
struct Cli {
    #[command(subcommand)]
    command: celda::cli::Commands,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    if let Err(e) = celda::cli::dispatch(cli.command).await {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}
