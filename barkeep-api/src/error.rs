//! API client error types.

use barkeep_fetch::FetchError;
use barkeep_store::StoreError;
use thiserror::Error;

/// Errors raised while assembling a [`BarClient`](crate::BarClient).
///
/// Operations themselves never return this; they report failures through
/// [`UnifiedResult`](barkeep_core::UnifiedResult).
#[derive(Debug, Error)]
pub enum ApiError {
    /// Transport or orchestration setup failed.
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// Local state could not be loaded.
    #[error(transparent)]
    Store(#[from] StoreError),
}
