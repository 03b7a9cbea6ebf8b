//! Bilan CLI entry point.

use clap::Parser;

use bilan_engine::cli::{commands, handle_error, Cli, Commands};
use bilan_engine::infrastructure::{ConfigLoader, LoggerImpl};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match ConfigLoader::load() {
        Ok(config) => config,
        Err(err) => handle_error(err, cli.json),
    };

    let _logger = match LoggerImpl::init(&config.logging) {
        Ok(logger) => logger,
        Err(err) => handle_error(err, cli.json),
    };

    let result = match cli.command {
        Commands::Packages(args) => commands::packages::execute(args, cli.json).await,
        Commands::Config(args) => commands::config::execute(args, &config, cli.json).await,
        Commands::Simulate(args) => commands::simulate::execute(args, &config, cli.json).await,
    };

    if let Err(err) = result {
        handle_error(err, cli.json);
    }
}
