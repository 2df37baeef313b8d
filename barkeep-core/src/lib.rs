// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # Barkeep Core
//!
//! Core types and models shared by every Barkeep crate.
//!
//! - Catalog models mirroring the content backend (categories, drinks,
//!   locations, highlights, social posts, users)
//! - Pagination and the drink list query
//! - The uniform [`UnifiedResult`] returned to every caller
//! - The failure taxonomy ([`FailureKind`]) and [`StrategyUsed`]
//!
//! ## Key Types
//!
//! ### Catalog
//! - [`Category`], [`Drink`], [`Location`], [`Highlight`], [`SocialPost`]
//! - [`User`], [`LoginResponse`], [`HealthStatus`], [`NewsletterResponse`]
//!
//! ### Paging
//! - [`Paginated`] - One page of a list endpoint
//! - [`DrinkQuery`] - Query parameters for listing drinks
//!
//! ### Results
//! - [`UnifiedResult`] - Success flag, payload, strategy and diagnostics
//! - [`StrategyUsed`] - Which tier produced the payload
//! - [`FailureKind`] - Classified failure

pub mod error;
pub mod models;

pub use error::CoreError;

pub use models::{
    // Catalog
    Category,
    CategoryUpdate,
    Drink,
    DrinkUpdate,
    HealthStatus,
    Highlight,
    HighlightUpdate,
    Location,
    LocationUpdate,
    LoginRequest,
    LoginResponse,
    NewCategory,
    NewDrink,
    NewHighlight,
    NewLocation,
    NewsletterRequest,
    NewsletterResponse,
    SocialPost,
    User,
    // Paging
    DEFAULT_PAGE_SIZE,
    DrinkQuery,
    Paginated,
    SortOrder,
    total_pages,
    // Results
    FailureKind,
    StrategyUsed,
    UnifiedResult,
};
