use std::fmt::Display;

use reqwest::StatusCode;

/// Error envelope returned by the gateway on non-200 responses
#[derive(Debug, serde::Deserialize)]
pub struct ErrorResponse {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug)]
pub enum GatewayError {
    RequestError(reqwest::Error),
    /// Non-200 response carrying a decodable error envelope
    GatewayResponse {
        status: StatusCode,
        code: String,
        message: String,
    },
    /// Non-200 response whose body is not a usable error envelope
    RawResponse { status: StatusCode, body: String },
    GatewayDeserialization(serde_json::Error),
    InvalidToken,
}

impl GatewayError {
    /// Builds the error for a non-200 response. Never fails: a body that is not
    /// an error envelope, or one with an empty message, is surfaced verbatim.
    pub fn from_error_body(status: StatusCode, body: &[u8]) -> Self {
        match serde_json::from_slice::<ErrorResponse>(body) {
            Ok(ErrorResponse { code, message }) if !message.is_empty() => Self::GatewayResponse {
                status,
                code,
                message,
            },
            _ => Self::RawResponse {
                status,
                body: String::from_utf8_lossy(body).into_owned(),
            },
        }
    }

    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::RequestError(e) => e.status(),
            Self::GatewayResponse { status, .. } | Self::RawResponse { status, .. } => {
                Some(*status)
            }
            Self::GatewayDeserialization(_) | Self::InvalidToken => None,
        }
    }
}

impl From<reqwest::Error> for GatewayError {
    fn from(value: reqwest::Error) -> Self {
        Self::RequestError(value)
    }
}

impl From<serde_json::Error> for GatewayError {
    fn from(value: serde_json::Error) -> Self {
        Self::GatewayDeserialization(value)
    }
}

impl std::error::Error for GatewayError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::RequestError(e) => Some(e),
            Self::GatewayDeserialization(e) => Some(e),
            _ => None,
        }
    }
}

impl Display for GatewayError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GatewayError::RequestError(e) if e.is_timeout() => {
                write!(f, "http request timed out: {e}")
            }
            GatewayError::RequestError(e) => write!(f, "http request error: {e}"),
            GatewayError::GatewayResponse {
                status,
                code,
                message,
            } => write!(f, "API error ({}): {code} - {message}", status.as_u16()),
            GatewayError::RawResponse { status, body } => {
                write!(f, "API error ({}): {body}", status.as_u16())
            }
            GatewayError::GatewayDeserialization(e) => {
                write!(f, "gateway response deserialization: {e}")
            }
            GatewayError::InvalidToken => {
                f.write_str("gateway issued a token that cannot be sent as a header")
            }
        }
    }
}
