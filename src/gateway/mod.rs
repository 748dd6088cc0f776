use std::time::{Duration, Instant};

use reqwest::StatusCode;
use serde::{Deserialize, Deserializer, de::DeserializeOwned};

use crate::gateway::{
    auth::{AccessToken, Credentials},
    error::GatewayError,
};

pub mod auth;
/// Payment collection request and acknowledgement
pub mod collect;
pub mod error;
/// Requisite masking
pub mod mask;
/// Transaction status lookup
pub mod status;
mod token;

pub type Result<T> = std::result::Result<T, GatewayError>;

/// Unauthenticated handle to the CamPay API.
///
/// The underlying `reqwest::Client` is injected by the caller, so clones of the
/// gateway share one connection pool.
#[derive(Debug, Clone)]
pub struct CampayGateway {
    client: reqwest::Client,
    base_url: String,
}

/// Gateway handle bound to an access token. Only a session can issue
/// authorized calls.
#[derive(Debug, Clone)]
pub struct GatewaySession {
    gateway: CampayGateway,
    token: AccessToken,
}

impl CampayGateway {
    pub const DEMO_BASE_URL: &str = "https://demo.campay.net/api";
    pub const PROD_BASE_URL: &str = "https://www.campay.net/api";
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    /// HTTP client with the per-request timeout applied to every call
    pub fn build_client(timeout: Duration) -> reqwest::Result<reqwest::Client> {
        reqwest::Client::builder().timeout(timeout).build()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    /// Exchanges the credentials for a token and binds it to a new session
    pub async fn authenticate(&self, credentials: &Credentials) -> Result<GatewaySession> {
        let token = self.fetch_token(credentials).await?;
        Ok(self.session(token))
    }

    pub fn session(&self, token: AccessToken) -> GatewaySession {
        GatewaySession {
            gateway: self.clone(),
            token,
        }
    }

    async fn execute<T: DeserializeOwned>(&self, request: reqwest::RequestBuilder) -> Result<T> {
        let started = Instant::now();
        let res = request.send().await?;
        let status = res.status();
        let body = res.bytes().await?;
        tracing::debug!(
            %status,
            data = %mask::secure_body(&body),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Gateway API response"
        );
        decode_response(status, &body)
    }
}

/// Decodes a gateway response body.
///
/// 200 bodies must decode into `T`; anything else becomes a [`GatewayError`]
/// built from the error envelope or the raw body.
pub fn decode_response<T: DeserializeOwned>(status: StatusCode, body: &[u8]) -> Result<T> {
    if status != StatusCode::OK {
        return Err(GatewayError::from_error_body(status, body));
    }
    Ok(serde_json::from_slice(body)?)
}

/// Amounts come back as integers, fractional numbers or numeric strings
/// depending on the endpoint.
fn deserialize_amount<'de, D>(deserializer: D) -> std::result::Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum WireAmount {
        Number(f64),
        Text(String),
    }

    match Option::<WireAmount>::deserialize(deserializer)? {
        None => Ok(None),
        Some(WireAmount::Number(n)) => Ok(Some(n)),
        Some(WireAmount::Text(s)) => s
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| serde::de::Error::custom(format!("invalid amount {s:?}"))),
    }
}
