//! Core traits defined in `sowgen-core` and implemented by other crates
//! or by the excluded transport layer.

pub mod clock;
pub mod credential;
pub mod service;
pub mod token;

pub use clock::{Clock, SystemClock};
#[cfg(any(test, feature = "test-helpers"))]
pub use clock::MockClock;
pub use credential::CredentialVerifier;
pub use service::Service;
pub use token::{IssuedToken, TokenIssuer};
