use std::process;

use clap::Parser;
use presswire::{
    application::{ClientConfig, WordPressClient},
    config::{self, CliArgs},
    infra::{error::InfraError, telemetry},
};
use tracing::{Dispatch, Level, debug, dispatcher, error};
use tracing_subscriber::fmt as tracing_fmt;

mod cli;

use cli::CliError;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        report_error(&error);
        process::exit(1);
    }
}

fn report_error(error: &CliError) {
    if dispatcher::has_been_set() {
        error!(error = %error, "command failed");
        return;
    }

    let subscriber = tracing_fmt()
        .with_max_level(Level::ERROR)
        .with_writer(std::io::stderr)
        .finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(error = %error, "command failed");
    });
}

async fn run() -> Result<(), CliError> {
    let args = CliArgs::parse();
    let settings = config::load(&args)?;

    telemetry::init(&settings.logging)?;

    let client = WordPressClient::new(ClientConfig::from(&settings))
        .map_err(|err| InfraError::configuration(err.to_string()))?;
    debug!(base_url = client.base_url(), "WordPress client ready");

    cli::handle(&client, args.command).await
}
