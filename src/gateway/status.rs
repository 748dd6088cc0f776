use std::fmt::Display;

use serde::Deserialize;
use tracing::instrument;

use crate::gateway::{GatewaySession, Result, auth};

/// Snapshot of a transaction as reported by the gateway
#[derive(Debug, Clone, Deserialize)]
pub struct TransactionResponse {
    #[serde(default)]
    pub reference: Option<String>,
    #[serde(default)]
    pub external_reference: Option<String>,
    pub status: String,
    #[serde(default, deserialize_with = "super::deserialize_amount")]
    pub amount: Option<f64>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub operator: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub operator_reference: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl TransactionResponse {
    pub fn normalized_status(&self) -> TransactionStatus {
        TransactionStatus::parse(&self.status)
    }
}

/// Gateway status after trimming and upper-casing.
///
/// Values this client does not model are kept in [`TransactionStatus::Other`]
/// and are never terminal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionStatus {
    Pending,
    Successful,
    Failed,
    Other(String),
}

impl TransactionStatus {
    pub fn parse(raw: &str) -> Self {
        let normalized = raw.trim().to_uppercase();
        match normalized.as_str() {
            "PENDING" => Self::Pending,
            "SUCCESSFUL" => Self::Successful,
            "FAILED" => Self::Failed,
            _ => Self::Other(normalized),
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Successful | Self::Failed)
    }
}

impl Display for TransactionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => f.write_str("PENDING"),
            Self::Successful => f.write_str("SUCCESSFUL"),
            Self::Failed => f.write_str("FAILED"),
            Self::Other(s) => f.write_str(s),
        }
    }
}

impl GatewaySession {
    #[instrument(skip_all, fields(%reference))]
    pub async fn fetch_transaction(&self, reference: &str) -> Result<TransactionResponse> {
        let url = self.gateway.url(&format!("transaction/{reference}/"));
        tracing::debug!(%url, "Gateway API status request");
        self.gateway
            .execute(
                self.gateway
                    .client
                    .get(&url)
                    .headers(auth::authenticated_headers(&self.token)),
            )
            .await
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn status_is_trimmed_and_uppercased() {
        assert_eq!(TransactionStatus::parse(" successful\n"), TransactionStatus::Successful);
        assert_eq!(TransactionStatus::parse("Failed"), TransactionStatus::Failed);
        assert_eq!(TransactionStatus::parse("pending"), TransactionStatus::Pending);
    }

    #[test]
    fn unknown_status_is_kept_and_not_terminal() {
        let status = TransactionStatus::parse(" processing ");
        assert_eq!(status, TransactionStatus::Other("PROCESSING".into()));
        assert!(!status.is_terminal());
        assert_eq!(status.to_string(), "PROCESSING");
    }

    #[test]
    fn only_successful_and_failed_are_terminal() {
        assert!(TransactionStatus::Successful.is_terminal());
        assert!(TransactionStatus::Failed.is_terminal());
        assert!(!TransactionStatus::Pending.is_terminal());
    }

    #[test]
    fn fractional_amount_is_accepted() {
        let tx: TransactionResponse = serde_json::from_value(json!({
            "reference": "r1",
            "status": "SUCCESSFUL",
            "amount": 100.0,
            "currency": "XAF",
        }))
        .unwrap();
        assert_eq!(tx.amount, Some(100.0));
        assert_eq!(tx.operator, None);
    }

    #[test]
    fn status_field_is_required() {
        let res = serde_json::from_value::<TransactionResponse>(json!({"reference": "r1"}));
        assert!(res.is_err());
    }
}
