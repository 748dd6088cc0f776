use serde::{Deserialize, Serialize, Serializer};
use time::OffsetDateTime;
use tracing::instrument;

use crate::{
    gateway::{GatewaySession, Result, auth, mask},
    validate::{Amount, PhoneNumber},
};

/// A single collection order. Built once per run and never mutated.
#[derive(Debug, Clone, Serialize)]
pub struct CollectionRequest {
    #[serde(serialize_with = "amount_as_string")]
    amount: Amount,
    currency: &'static str,
    from: PhoneNumber,
    description: String,
    external_reference: String,
}

/// The collect endpoint expects the amount as a decimal string
fn amount_as_string<S: Serializer>(
    amount: &Amount,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.collect_str(&amount.value())
}

impl CollectionRequest {
    pub const CURRENCY: &str = "XAF";

    pub fn new(
        amount: Amount,
        from: PhoneNumber,
        description: String,
        external_reference: String,
    ) -> Self {
        Self {
            amount,
            currency: Self::CURRENCY,
            from,
            description,
            external_reference,
        }
    }

    pub fn amount(&self) -> Amount {
        self.amount
    }

    pub fn phone(&self) -> &PhoneNumber {
        &self.from
    }
}

/// Client-side tracking reference derived from the current unix time
pub fn external_reference(now: OffsetDateTime) -> String {
    format!("TXN-{}", now.unix_timestamp())
}

/// Collect acknowledgement. `reference` is the key for status polling.
#[derive(Debug, Clone, Deserialize)]
pub struct CollectResponse {
    pub reference: String,
    #[serde(default)]
    pub external_reference: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
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
}

impl GatewaySession {
    #[instrument(skip_all, fields(external_reference = %request.external_reference))]
    pub async fn initiate_collection(&self, request: &CollectionRequest) -> Result<CollectResponse> {
        let url = self.gateway.url("collect/");
        tracing::debug!(%url, data = %mask::secure_serializable(request), "Gateway API collect request");
        let ack: CollectResponse = self
            .gateway
            .execute(
                self.gateway
                    .client
                    .post(&url)
                    .headers(auth::authenticated_headers(&self.token))
                    .json(request),
            )
            .await?;
        tracing::info!(
            reference = %ack.reference,
            external_reference = ?ack.external_reference,
            status = ?ack.status,
            amount = ?ack.amount,
            currency = ?ack.currency,
            operator = ?ack.operator,
            code = ?ack.code,
            operator_reference = ?ack.operator_reference,
            "Collection initiated"
        );
        Ok(ack)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::validate::{parse_amount, parse_phone};

    #[test]
    fn request_wire_shape() {
        let request = CollectionRequest::new(
            parse_amount("2500").unwrap(),
            parse_phone("690 12 34 56").unwrap(),
            "Groceries".into(),
            "TXN-1".into(),
        );
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({
                "amount": "2500",
                "currency": "XAF",
                "from": "237690123456",
                "description": "Groceries",
                "external_reference": "TXN-1",
            })
        );
    }

    #[test]
    fn external_reference_uses_unix_seconds() {
        let now = OffsetDateTime::from_unix_timestamp(1_700_000_000).unwrap();
        assert_eq!(external_reference(now), "TXN-1700000000");
    }

    #[test]
    fn ack_accepts_sparse_body() {
        let ack: CollectResponse = serde_json::from_value(json!({"reference": "r1"})).unwrap();
        assert_eq!(ack.reference, "r1");
        assert_eq!(ack.status, None);
        assert_eq!(ack.amount, None);
    }

    #[test]
    fn ack_requires_reference() {
        let res = serde_json::from_value::<CollectResponse>(json!({"status": "PENDING"}));
        assert!(res.is_err());
    }

    #[test]
    fn ack_accepts_string_amount() {
        let ack: CollectResponse =
            serde_json::from_value(json!({"reference": "r1", "amount": "150"})).unwrap();
        assert_eq!(ack.amount, Some(150.0));
    }
}
