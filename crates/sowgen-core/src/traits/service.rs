//! Service marker trait.

/// Marker trait for business logic services.
///
/// Services are constructed once at startup and shared by `Arc` between
/// request handlers.
pub trait Service: Send + Sync + 'static {}
