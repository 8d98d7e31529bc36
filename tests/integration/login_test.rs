//! Integration tests for the rate-limited login entry point.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::watch;

use sowgen_auth::{LoginGuard, RateLimiter, spawn_sweeper};
use sowgen_core::ErrorKind;
use sowgen_core::config::rate_limit::RateLimitConfig;
use sowgen_core::result::AppResult;
use sowgen_core::traits::{CredentialVerifier, IssuedToken, MockClock, TokenIssuer};
use sowgen_core::types::UserId;

#[derive(Debug)]
struct SingleUser {
    id: UserId,
}

#[async_trait]
impl CredentialVerifier for SingleUser {
    async fn verify(&self, username: &str, password: &str) -> AppResult<Option<UserId>> {
        Ok((username == "cleo" && password == "correct horse").then_some(self.id))
    }
}

#[derive(Debug)]
struct OpaqueIssuer;

#[async_trait]
impl TokenIssuer for OpaqueIssuer {
    async fn issue(&self, user_id: UserId) -> AppResult<IssuedToken> {
        Ok(IssuedToken {
            token: format!("opaque.{user_id}"),
            expires_at: Utc::now() + chrono::Duration::minutes(30),
        })
    }

    async fn verify(&self, token: &str) -> AppResult<Option<UserId>> {
        Ok(token.strip_prefix("opaque.").and_then(|id| id.parse().ok()))
    }
}

fn guard(clock: &MockClock) -> (LoginGuard, UserId) {
    let user = UserId::new();
    let limiter = Arc::new(RateLimiter::from_config(
        &RateLimitConfig::default(),
        Arc::new(clock.clone()),
    ));
    let guard = LoginGuard::new(limiter, Arc::new(SingleUser { id: user }), Arc::new(OpaqueIssuer));
    (guard, user)
}

#[tokio::test]
async fn test_five_attempts_per_five_minutes() {
    let clock = MockClock::new(Instant::now());
    let (guard, user) = guard(&clock);

    for _ in 0..5 {
        let err = guard.login("203.0.113.7", "cleo", "wrong").await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Authentication);
    }

    // Correct credentials do not help once the window is full.
    let err = guard
        .login("203.0.113.7", "cleo", "correct horse")
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::RateLimited);

    clock.advance(Duration::from_secs(301));
    let token = guard
        .login("203.0.113.7", "cleo", "correct horse")
        .await
        .unwrap();
    assert_eq!(token.token, format!("opaque.{user}"));
}

#[tokio::test]
async fn test_addresses_are_limited_independently() {
    let clock = MockClock::new(Instant::now());
    let (guard, _) = guard(&clock);

    for _ in 0..6 {
        let _ = guard.login("198.51.100.1", "cleo", "wrong").await;
    }
    assert!(guard.login("198.51.100.2", "cleo", "correct horse").await.is_ok());
}

#[tokio::test(start_paused = true)]
async fn test_sweeper_forgets_idle_addresses() {
    let clock = MockClock::new(Instant::now());
    let (guard, _) = guard(&clock);

    for ip in ["192.0.2.1", "192.0.2.2", "192.0.2.3"] {
        let _ = guard.login(ip, "cleo", "wrong").await;
    }
    assert_eq!(guard.limiter().tracked(), 3);

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let handle = spawn_sweeper(
        Arc::clone(guard.limiter()),
        Duration::from_secs(60),
        shutdown_rx,
    );

    tokio::time::sleep(Duration::from_secs(61)).await;
    assert_eq!(guard.limiter().tracked(), 3);

    clock.advance(Duration::from_secs(301));
    tokio::time::sleep(Duration::from_secs(60)).await;
    assert_eq!(guard.limiter().tracked(), 0);

    shutdown_tx.send(true).unwrap();
    handle.await.unwrap();
}
