//! Seedplan CLI - seed test data into an org and migrate records between orgs

use clap::Parser;
use std::process;

mod cli;
mod commands;
mod logger;
mod prompt;

use cli::Cli;
use commands::common::ExitCode;
use commands::{generate, migrate, seed, validate};

#[tokio::main]
async fn main() -> process::ExitCode {
    let cli = Cli::parse();
    logger::init(cli.global.verbose);

    let result = match &cli.command {
        cli::Commands::Generate(args) => generate::execute(args, &cli.global).await,
        cli::Commands::Validate(args) => validate::execute(args, &cli.global).await,
        cli::Commands::Seed(args) => seed::execute(args, &cli.global).await,
        cli::Commands::Migrate(args) => migrate::execute(args, &cli.global).await,
    };

    match result {
        Ok(()) => process::ExitCode::SUCCESS,
        Err(err) => match err.downcast_ref::<ExitCode>() {
            Some(code) => process::ExitCode::from(u8::try_from(code.0).unwrap_or(1)),
            None => {
                eprintln!("Error: {:#}", err);
                process::ExitCode::FAILURE
            }
        },
    }
}
