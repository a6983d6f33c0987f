//! ## flowguard
//! **Endpoint flow classification agent**
//!
//! Captures a bounded window of the device's traffic, classifies the flow
//! and reports the result to a remote collector, over and over until
//! SIGINT or SIGTERM.

use clap::Parser;

mod commands;

use commands::{Cli, Commands};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run(args) => commands::run_agent(args).await,
        Commands::CheckConfig(args) => commands::check_config(args),
    }
}
