//! Catalog types served by the content backend.
//!
//! Field names serialize camelCase to match the live API payloads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// Categories
// ============================================================================

/// A drink category (e.g. "Cocktails", "Alkoholfrei").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    /// Backend identifier.
    pub id: u64,
    /// Display name.
    pub name: String,
    /// URL slug used by the `category` drink filter.
    pub slug: String,
    /// Short description.
    #[serde(default)]
    pub description: Option<String>,
    /// Position in menus.
    #[serde(default)]
    pub sort_order: i32,
    /// Whether the category is shown on the site.
    #[serde(default = "default_true")]
    pub is_active: bool,
}

/// Payload for creating a category.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCategory {
    /// Display name.
    pub name: String,
    /// URL slug.
    pub slug: String,
    /// Short description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Position in menus.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_order: Option<i32>,
}

/// Partial update for a category.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryUpdate {
    /// New display name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// New slug.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    /// New description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// New position.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_order: Option<i32>,
    /// Toggle visibility.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

// ============================================================================
// Drinks
// ============================================================================

/// A drink on the menu.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Drink {
    /// Backend identifier.
    pub id: u64,
    /// Display name.
    pub name: String,
    /// Menu description.
    #[serde(default)]
    pub description: String,
    /// Price in EUR.
    pub price: f64,
    /// Owning category.
    pub category_id: u64,
    /// Slug of the owning category.
    pub category_slug: String,
    /// Product photo.
    #[serde(default)]
    pub image_url: Option<String>,
    /// Main ingredients.
    #[serde(default)]
    pub ingredients: Vec<String>,
    /// Whether the drink contains alcohol.
    #[serde(default)]
    pub is_alcoholic: bool,
    /// Whether the drink is currently offered.
    #[serde(default = "default_true")]
    pub is_active: bool,
    /// Position in menus.
    #[serde(default)]
    pub sort_order: i32,
}

impl Drink {
    /// Case-insensitive substring match against name and description.
    pub fn matches_text(&self, needle: &str) -> bool {
        let needle = needle.to_lowercase();
        self.name.to_lowercase().contains(&needle)
            || self.description.to_lowercase().contains(&needle)
    }
}

/// Payload for creating a drink.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewDrink {
    /// Display name.
    pub name: String,
    /// Menu description.
    pub description: String,
    /// Price in EUR.
    pub price: f64,
    /// Owning category.
    pub category_id: u64,
    /// Product photo.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    /// Main ingredients.
    #[serde(default)]
    pub ingredients: Vec<String>,
    /// Whether the drink contains alcohol.
    #[serde(default)]
    pub is_alcoholic: bool,
}

/// Partial update for a drink.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DrinkUpdate {
    /// New name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// New description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// New price.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    /// Move to another category.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<u64>,
    /// New photo.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    /// Toggle availability.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

// ============================================================================
// Locations
// ============================================================================

/// Where the bar is (or will be) parked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    /// Backend identifier.
    pub id: u64,
    /// Event or venue name.
    pub name: String,
    /// Street address.
    pub address: String,
    /// City.
    pub city: String,
    /// Free-form notes.
    #[serde(default)]
    pub description: Option<String>,
    /// Start of the stay.
    pub starts_at: DateTime<Utc>,
    /// End of the stay.
    #[serde(default)]
    pub ends_at: Option<DateTime<Utc>>,
    /// Whether the bar is there right now.
    #[serde(default)]
    pub is_current: bool,
}

impl Location {
    /// Returns true if the stay starts after `now`.
    pub fn is_upcoming(&self, now: DateTime<Utc>) -> bool {
        !self.is_current && self.starts_at > now
    }
}

/// Payload for creating a location.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewLocation {
    /// Event or venue name.
    pub name: String,
    /// Street address.
    pub address: String,
    /// City.
    pub city: String,
    /// Free-form notes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Start of the stay.
    pub starts_at: DateTime<Utc>,
    /// End of the stay.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ends_at: Option<DateTime<Utc>>,
}

/// Partial update for a location.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationUpdate {
    /// New name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// New address.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    /// New city.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    /// New start.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub starts_at: Option<DateTime<Utc>>,
    /// New end.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ends_at: Option<DateTime<Utc>>,
    /// Mark as the current stop.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_current: Option<bool>,
}

// ============================================================================
// Highlights
// ============================================================================

/// A teaser shown on the landing page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Highlight {
    /// Backend identifier.
    pub id: u64,
    /// Headline.
    pub title: String,
    /// Body text.
    #[serde(default)]
    pub description: String,
    /// Teaser image.
    #[serde(default)]
    pub image_url: Option<String>,
    /// Call-to-action target.
    #[serde(default)]
    pub link: Option<String>,
    /// Position on the page.
    #[serde(default)]
    pub sort_order: i32,
    /// Whether it is shown.
    #[serde(default = "default_true")]
    pub is_active: bool,
}

/// Payload for creating a highlight.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewHighlight {
    /// Headline.
    pub title: String,
    /// Body text.
    pub description: String,
    /// Teaser image.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    /// Call-to-action target.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

/// Partial update for a highlight.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HighlightUpdate {
    /// New headline.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// New body text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// New image.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    /// New link.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    /// New position.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_order: Option<i32>,
    /// Toggle visibility.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

// ============================================================================
// Social Feed
// ============================================================================

/// A post from the bar's social media feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SocialPost {
    /// Platform identifier.
    pub id: String,
    /// Caption text.
    #[serde(default)]
    pub caption: String,
    /// Media URL.
    pub image_url: String,
    /// Link to the original post.
    pub permalink: String,
    /// Publication time.
    pub posted_at: DateTime<Utc>,
    /// Like count.
    #[serde(default)]
    pub likes: u32,
}

// ============================================================================
// Auth, Health, Newsletter
// ============================================================================

/// A backend user (staff account).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Backend identifier.
    pub id: u64,
    /// Login email.
    pub email: String,
    /// Display name.
    #[serde(default)]
    pub name: Option<String>,
    /// Role (e.g. "admin", "editor").
    #[serde(default)]
    pub role: Option<String>,
}

/// Login request body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    /// Login email.
    pub email: String,
    /// Password.
    pub password: String,
}

/// Login response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    /// Session bearer token.
    pub token: String,
    /// The logged-in user.
    pub user: User,
}

/// Response of the health endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthStatus {
    /// Status string, "ok" when healthy.
    pub status: String,
    /// Backend version.
    #[serde(default)]
    pub version: Option<String>,
    /// Server time.
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
}

impl HealthStatus {
    /// Returns true if the backend reports itself healthy.
    pub fn is_ok(&self) -> bool {
        self.status.eq_ignore_ascii_case("ok") || self.status.eq_ignore_ascii_case("healthy")
    }
}

/// Newsletter subscribe/unsubscribe request body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewsletterRequest {
    /// Subscriber email.
    pub email: String,
}

/// Newsletter subscribe/unsubscribe response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsletterResponse {
    /// Subscriber email.
    pub email: String,
    /// Subscription state after the call.
    pub subscribed: bool,
    /// Message to show to the visitor.
    #[serde(default)]
    pub message: Option<String>,
}

fn default_true() -> bool {
    true
}

// ============================================================================
// Tests
// ============================================================================
