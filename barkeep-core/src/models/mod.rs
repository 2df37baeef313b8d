//! Domain models for Barkeep.
//!
//! ## Submodules
//!
//! - [`catalog`] - Content served by the backend (drinks, locations, ...)
//! - [`page`] - Pagination and the drink list query
//! - [`result`] - The uniform result contract and failure taxonomy

mod catalog;
mod page;
mod result;

pub use catalog::{
    Category, CategoryUpdate, Drink, DrinkUpdate, HealthStatus, Highlight, HighlightUpdate,
    Location, LocationUpdate, LoginRequest, LoginResponse, NewCategory, NewDrink, NewHighlight,
    NewLocation, NewsletterRequest, NewsletterResponse, SocialPost, User,
};
pub use page::{DEFAULT_PAGE_SIZE, DrinkQuery, Paginated, SortOrder, total_pages};
pub use result::{FailureKind, StrategyUsed, UnifiedResult};

#[cfg(test)]
mod serde_tests;
