//! Bearer token collaborator.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::result::AppResult;
use crate::types::UserId;

/// An opaque bearer token with its expiry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssuedToken {
    /// The encoded token.
    pub token: String,
    /// When the token stops being accepted.
    pub expires_at: DateTime<Utc>,
}

/// Issues and verifies bearer tokens for authenticated principals.
#[async_trait]
pub trait TokenIssuer: Send + Sync + 'static {
    /// Issue a token for the given principal.
    async fn issue(&self, user_id: UserId) -> AppResult<IssuedToken>;

    /// Resolve a token back to its principal, `None` if invalid or expired.
    async fn verify(&self, token: &str) -> AppResult<Option<UserId>>;
}
