//! Core type definitions used across the SOWgen workspace.

pub mod id;

pub use id::*;
