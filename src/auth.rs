use crate::context::CallContext;
use crate::error::{OblioError, Result};
use crate::rest::{OblioClient, Payload};
use crate::wire::{Int, Timestamp};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::info;

/// Token-issue endpoint, relative to the API root
pub const TOKEN_PATH: &str = "/authorize/token";

/// Subtracted from the lifetime the API reports before caching a token,
/// covering clock skew and requests already in flight
pub const TOKEN_EXPIRY_MARGIN: Duration = Duration::from_secs(10);

/// Client id and secret issued by Oblio.
#[derive(Clone)]
pub struct Credentials {
    client_id: String,
    client_secret: String,
}

impl Credentials {
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Credentials {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
        }
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    /// Both parts must be non-empty
    pub fn validate(&self) -> Result<()> {
        if self.client_id.is_empty() {
            return Err(OblioError::invalid_argument("clientID is empty"));
        }
        if self.client_secret.is_empty() {
            return Err(OblioError::invalid_argument("clientSecret is empty"));
        }
        Ok(())
    }
}

// Implement Debug manually to avoid exposing the secret
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .finish()
    }
}

#[derive(Serialize)]
struct GenerateTokenRequest<'a> {
    client_id: &'a str,
    client_secret: &'a str,
}

impl Payload for GenerateTokenRequest<'_> {}

/// Answer of the token-issue endpoint
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerateTokenResponse {
    #[serde(default)]
    pub access_token: String,

    /// Token lifetime in seconds
    #[serde(default)]
    pub expires_in: Int,

    #[serde(default)]
    pub token_type: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,

    #[serde(default)]
    pub request_time: Timestamp,
}

impl GenerateTokenResponse {
    /// How long the token may be cached: the reported lifetime minus
    /// [`TOKEN_EXPIRY_MARGIN`], never negative
    pub fn cache_ttl(&self) -> Duration {
        let secs = u64::try_from(self.expires_in.get()).unwrap_or(0);
        Duration::from_secs(secs).saturating_sub(TOKEN_EXPIRY_MARGIN)
    }
}

impl OblioClient {
    /// Exchange the client credentials for a new access token.
    ///
    /// This does not touch the token cache; authenticated calls mint and
    /// cache tokens on their own.
    pub fn generate_token(&self, ctx: &CallContext) -> Result<GenerateTokenResponse> {
        self.credentials.validate()?;

        let request = GenerateTokenRequest {
            client_id: &self.credentials.client_id,
            client_secret: &self.credentials.client_secret,
        };

        self.execute_unauthenticated(ctx, Method::POST, TOKEN_PATH, &request)
    }

    /// Mint a token and write it through to the token store.
    ///
    /// Callers must hold the token-resolution lock.
    pub(crate) fn mint_token(&self, ctx: &CallContext) -> Result<String> {
        let response = self.generate_token(ctx)?;
        if response.access_token.is_empty() {
            return Err(OblioError::Decode(serde::de::Error::custom(
                "token response has no access_token",
            )));
        }
        let ttl = response.cache_ttl();

        self.token_store.set(&response.access_token, ttl)?;

        info!(
            client_id = %self.credentials.client_id(),
            expires_in = response.expires_in.get(),
            "minted access token"
        );

        Ok(response.access_token)
    }
}
