//! Credential verification collaborator.

use async_trait::async_trait;

use crate::result::AppResult;
use crate::types::UserId;

/// Checks a plaintext password against the stored credential of a user.
///
/// Hashing is owned by the implementor; the lifecycle core only consumes
/// the verdict.
#[async_trait]
pub trait CredentialVerifier: Send + Sync + 'static {
    /// Returns the user id when `password` matches the stored hash for
    /// `username`, `None` when it does not (or the user is unknown).
    async fn verify(&self, username: &str, password: &str) -> AppResult<Option<UserId>>;
}
