use std::{fmt::Display, time::Duration};

use clap::Parser;

use crate::{gateway::CampayGateway, gateway::auth::Credentials, poll::PollConfig};

#[derive(Parser, Debug)]
#[command(name = "campay-collect", version, about, long_about = None)]
pub struct Cli {
    /// Merchant API username
    #[arg(long, env = "APP_USERNAME", hide_env_values = true)]
    pub username: Option<String>,

    /// Merchant API password
    #[arg(long, env = "APP_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Gateway environment. `PROD` (any case) selects production, anything else the demo host.
    #[arg(long, env = "ENVIRONMENT", default_value = "DEV", value_parser = Environment::parse)]
    pub environment: Environment,

    /// Override the gateway base URL
    #[arg(long, env = "CAMPAY_BASE_URL")]
    pub base_url: Option<String>,

    /// Payer number, local (670123456) or international (237670123456). Prompted when absent.
    #[arg(long)]
    pub phone: Option<String>,

    /// Amount in XAF. Prompted when absent.
    #[arg(long)]
    pub amount: Option<String>,

    /// Payment description. Prompted when absent.
    #[arg(long)]
    pub description: Option<String>,

    /// Status checks before giving up
    #[arg(long, default_value_t = PollConfig::DEFAULT_MAX_ATTEMPTS, value_parser = clap::value_parser!(u32).range(1..))]
    pub max_attempts: u32,

    /// Seconds between status checks
    #[arg(long, default_value_t = PollConfig::DEFAULT_INTERVAL.as_secs())]
    pub poll_interval_secs: u64,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = CampayGateway::DEFAULT_TIMEOUT.as_secs(), value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Dev,
    Prod,
}

impl Environment {
    pub fn parse(value: &str) -> Result<Self, std::convert::Infallible> {
        if value.trim().eq_ignore_ascii_case("PROD") {
            Ok(Environment::Prod)
        } else {
            Ok(Environment::Dev)
        }
    }

    pub fn base_url(self) -> &'static str {
        match self {
            Environment::Dev => CampayGateway::DEMO_BASE_URL,
            Environment::Prod => CampayGateway::PROD_BASE_URL,
        }
    }
}

impl Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Dev => f.write_str("DEV"),
            Environment::Prod => f.write_str("PROD"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    MissingCredentials,
}

impl std::error::Error for ConfigError {}

impl Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::MissingCredentials => {
                f.write_str("APP_USERNAME and APP_PASSWORD must be set")
            }
        }
    }
}

/// Resolved runtime settings
#[derive(Debug, Clone)]
pub struct Config {
    pub credentials: Credentials,
    pub environment: Environment,
    pub base_url: String,
    pub poll: PollConfig,
    pub request_timeout: Duration,
}

impl Config {
    pub fn from_cli(cli: &Cli) -> Result<Self, ConfigError> {
        let non_empty = |v: &Option<String>| v.as_deref().filter(|s| !s.is_empty()).map(str::to_owned);
        let (Some(username), Some(password)) = (non_empty(&cli.username), non_empty(&cli.password))
        else {
            return Err(ConfigError::MissingCredentials);
        };

        let base_url = cli
            .base_url
            .clone()
            .filter(|url| !url.is_empty())
            .unwrap_or_else(|| cli.environment.base_url().to_string());

        Ok(Self {
            credentials: Credentials { username, password },
            environment: cli.environment,
            base_url,
            poll: PollConfig {
                max_attempts: cli.max_attempts,
                interval: Duration::from_secs(cli.poll_interval_secs),
            },
            request_timeout: Duration::from_secs(cli.timeout_secs),
        })
    }
}
