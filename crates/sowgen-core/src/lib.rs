//! # sowgen-core
//!
//! Core crate for SOWgen. Contains the unified error system, configuration
//! schemas, typed identifiers, and the traits implemented by collaborators
//! outside the document lifecycle (clock, credential verifier, token issuer).
//!
//! This crate has **no** internal dependencies on other SOWgen crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;
pub mod types;

pub use error::{AppError, ErrorKind};
pub use result::AppResult;
