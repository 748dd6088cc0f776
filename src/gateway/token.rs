use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::gateway::{
    CampayGateway, Result,
    auth::{self, AccessToken, Credentials},
    error::GatewayError,
    mask,
};

#[derive(Debug, Serialize)]
struct TokenRequest<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    token: String,
}

impl CampayGateway {
    #[instrument(skip_all)]
    pub async fn fetch_token(&self, credentials: &Credentials) -> Result<AccessToken> {
        let request = TokenRequest {
            username: &credentials.username,
            password: &credentials.password,
        };
        let url = self.url("token/");
        tracing::debug!(%url, data = %mask::secure_serializable(&request), "Gateway API token request");
        let response: TokenResponse = self
            .execute(
                self.client
                    .post(&url)
                    .headers(auth::json_headers())
                    .json(&request),
            )
            .await?;
        if response.token.is_empty() {
            return Err(GatewayError::InvalidToken);
        }
        AccessToken::new(&response.token).map_err(|_| GatewayError::InvalidToken)
    }
}
