//! This project is split in 2 main parts:
//!
//! - [gateway] (CamPay API client)
//! - [poll] (waiting for a collection to settle)
//!
//! The rest is the command-line shell around them.
#![doc = include_str!("../README.md")]

use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::{
    config::{Cli, Config},
    gateway::{
        CampayGateway,
        collect::{self, CollectionRequest},
    },
    prompt::Prompter,
    validate::{parse_amount, parse_phone},
};

mod config;
mod display;
/// CamPay gateway integration
///
/// This module defines the types and methods to communicate with the CamPay REST API.
mod gateway;
mod poll;
mod prompt;
mod validate;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    match dotenvy::dotenv() {
        Ok(p) => tracing::info!(path = %p.display(), "Loaded environment variables from .env file"),
        Err(e) => tracing::debug!("No environment variables loaded from .env: {e}"),
    };
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = Config::from_cli(&cli)?;

    println!("=== CamPay Mobile Money Payment System ===");
    println!("Environment: {}\n", config.environment);

    let request = read_collection(&cli)?;

    let client = CampayGateway::build_client(config.request_timeout)
        .context("failed to build http client")?;
    let gateway = CampayGateway::new(client, config.base_url.clone());
    tracing::debug!(base_url = %gateway.base_url(), "Using gateway");

    tokio::select! {
        res = collect_payment(&gateway, &config, &request) => res,
        _ = tokio::signal::ctrl_c() => Err(anyhow::anyhow!("cancelled by user")),
    }
}

/// Gathers and validates the order from flags, prompting for whatever is missing.
/// A malformed value fails the run, only empty answers are asked again.
fn read_collection(cli: &Cli) -> anyhow::Result<CollectionRequest> {
    let mut prompter = Prompter::stdio();

    let phone = match &cli.phone {
        Some(phone) => phone.clone(),
        None => prompter.ask("Enter mobile money number (e.g., 670123456 or 237670123456): ")?,
    };
    let phone = parse_phone(&phone)?;

    let amount = match &cli.amount {
        Some(amount) => amount.clone(),
        None => prompter.ask("Enter amount (XAF): ")?,
    };
    let amount = parse_amount(&amount)?;

    let description = match &cli.description {
        Some(description) => description.clone(),
        None => prompter.ask("Enter description: ")?,
    };

    let external_reference = collect::external_reference(time::OffsetDateTime::now_utc());
    Ok(CollectionRequest::new(
        amount,
        phone,
        description,
        external_reference,
    ))
}

async fn collect_payment(
    gateway: &CampayGateway,
    config: &Config,
    request: &CollectionRequest,
) -> anyhow::Result<()> {
    println!("Authenticating...");
    let session = gateway
        .authenticate(&config.credentials)
        .await
        .context("failed to fetch access token")?;
    println!("Authentication successful");

    println!(
        "\nInitiating payment of {} XAF from {}...",
        request.amount().value(),
        request.phone()
    );
    let ack = session
        .initiate_collection(request)
        .await
        .context("failed to initiate collection")?;
    println!("\nPayment initiated\nReference: {}", ack.reference);
    println!("Please check your phone for USSD popup...");

    let tx = poll::poll_transaction(&session, &ack.reference, config.poll, |p| {
        println!("Status: {} (attempt {}/{})", p.status, p.attempt, p.max_attempts);
    })
    .await
    .with_context(|| format!("failed to poll transaction {}", ack.reference))?;

    print!("{}", display::Summary(&tx));
    Ok(())
}
