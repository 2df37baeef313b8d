// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # Barkeep API
//!
//! One method per logical backend operation, each returning a
//! [`UnifiedResult`](barkeep_core::UnifiedResult).
//!
//! ```ignore
//! use barkeep_api::BarClient;
//! use barkeep_core::DrinkQuery;
//!
//! let client = BarClient::from_env()?;
//! let page = client.list_drinks(&DrinkQuery::new().search("Apfel")).await;
//! if page.is_mock() {
//!     println!("showing offline data");
//! }
//! ```

// Core modules
pub mod client;
pub mod endpoints;
pub mod error;


// Re-export key types at crate root
pub use client::{BarClient, BarClientBuilder};
pub use error::ApiError;
