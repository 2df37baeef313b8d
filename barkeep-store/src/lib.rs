// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # Barkeep Store
//!
//! Local state for Barkeep.
//!
//! ## Modules
//!
//! - [`config`] - Configuration resolved from `BARKEEP_*` variables
//! - [`offline`] - Bundled dataset served after live strategies fail
//! - [`token`] - Session token persisted to `session.json`
//! - [`persistence`] - Atomic JSON file helpers with owner-only permissions
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use barkeep_store::{AppConfig, FileTokenStore, OfflineStore};
//!
//! let config = AppConfig::from_env()?;
//! let tokens = Arc::new(FileTokenStore::default_location());
//! let offline = Arc::new(OfflineStore::builtin()?);
//! ```

// Core modules
pub mod config;
pub mod error;
pub mod offline;
pub mod persistence;
pub mod token;

// Re-export key types at crate root
pub use config::{AppConfig, ENV_PREFIX, Environment};
pub use error::StoreError;
pub use offline::OfflineStore;
pub use persistence::{default_config_dir, default_session_path};
pub use token::FileTokenStore;
