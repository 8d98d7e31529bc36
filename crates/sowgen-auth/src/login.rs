//! Rate-limited login.

use std::sync::Arc;

use tracing::{info, warn};

use sowgen_core::error::AppError;
use sowgen_core::traits::{CredentialVerifier, IssuedToken, TokenIssuer};

use crate::rate_limit::RateLimiter;

/// Guards the authentication entry point.
///
/// Every attempt is admitted by the [`RateLimiter`] under the client's
/// address before any credential is looked at.
#[derive(Clone)]
pub struct LoginGuard {
    limiter: Arc<RateLimiter>,
    verifier: Arc<dyn CredentialVerifier>,
    issuer: Arc<dyn TokenIssuer>,
}

impl std::fmt::Debug for LoginGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginGuard")
            .field("limiter", &self.limiter)
            .finish()
    }
}

impl LoginGuard {
    /// Creates a new login guard.
    pub fn new(
        limiter: Arc<RateLimiter>,
        verifier: Arc<dyn CredentialVerifier>,
        issuer: Arc<dyn TokenIssuer>,
    ) -> Self {
        Self {
            limiter,
            verifier,
            issuer,
        }
    }

    /// Performs the login flow:
    ///
    /// 1. Admit the attempt under `client_ip`
    /// 2. Verify the credentials
    /// 3. Issue a token for the verified user
    pub async fn login(
        &self,
        client_ip: &str,
        username: &str,
        password: &str,
    ) -> Result<IssuedToken, AppError> {
        let admission = self.limiter.admit(client_ip);
        if !admission.allowed {
            warn!(client_ip = %client_ip, "Login attempt rate limited");
            return Err(AppError::rate_limited(
                "Too many login attempts, please try again later",
            ));
        }

        let Some(user_id) = self.verifier.verify(username, password).await? else {
            warn!(
                client_ip = %client_ip,
                remaining = admission.remaining,
                "Login rejected: invalid credentials"
            );
            return Err(AppError::authentication("Invalid username or password"));
        };

        let token = self.issuer.issue(user_id).await?;
        info!(user_id = %user_id, "Login successful");
        Ok(token)
    }

    /// The limiter guarding this entry point.
    pub fn limiter(&self) -> &Arc<RateLimiter> {
        &self.limiter
    }
}
