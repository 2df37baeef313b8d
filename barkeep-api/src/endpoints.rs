//! Backend endpoint paths.
//!
//! Paths are relative to the configured base URL.

// ============================================================================
// Constants
// ============================================================================

/// Health probe.
pub const HEALTH: &str = "/health";

/// Login.
pub const AUTH_LOGIN: &str = "/auth/login";

/// Current user.
pub const AUTH_ME: &str = "/auth/me";

/// Categories collection.
pub const CATEGORIES: &str = "/categories";

/// Drinks collection.
pub const DRINKS: &str = "/drinks";

/// Locations collection.
pub const LOCATIONS: &str = "/locations";

/// Current location.
pub const LOCATIONS_CURRENT: &str = "/locations/current";

/// Upcoming locations.
pub const LOCATIONS_UPCOMING: &str = "/locations/upcoming";

/// Highlights collection.
pub const HIGHLIGHTS: &str = "/highlights";

/// Newsletter subscription.
pub const NEWSLETTER_SUBSCRIBE: &str = "/newsletter/subscribe";

/// Newsletter unsubscription.
pub const NEWSLETTER_UNSUBSCRIBE: &str = "/newsletter/unsubscribe";

/// Social media feed.
pub const SOCIAL_FEED: &str = "/social-feed";

// ============================================================================
// Item Paths
// ============================================================================

/// Path of one category.
pub fn category(id: u64) -> String {
    format!("{CATEGORIES}/{id}")
}

/// Path of one drink.
pub fn drink(id: u64) -> String {
    format!("{DRINKS}/{id}")
}

/// Path of one location.
pub fn location(id: u64) -> String {
    format!("{LOCATIONS}/{id}")
}

/// Path of one highlight.
pub fn highlight(id: u64) -> String {
    format!("{HIGHLIGHTS}/{id}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_paths() {
        assert_eq!(category(3), "/categories/3");
        assert_eq!(drink(12), "/drinks/12");
        assert_eq!(location(1), "/locations/1");
        assert_eq!(highlight(7), "/highlights/7");
    }
}
