use altmo::{
    cli::{Cli, Command},
    commands::network,
    Settings,
};
use anyhow::{Context, Result};
use clap::Parser;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let settings = Settings::load().context("invalid configuration")?;

    match cli.command {
        Command::Network(args) => {
            network::run(args, &settings).await?;
        }
    }
    Ok(())
}
