//! Offline dataset.
//!
//! A fixed catalog that mirrors the live API's response shapes. The
//! orchestrator consults it through [`OfflineFallback`] once every live
//! strategy has failed.
//!
//! List filtering and pagination follow the live contract exactly:
//! 1-indexed pages and `total_pages = ceil(total / page_size)` computed
//! from the filtered set.

use std::cmp::Ordering;

use barkeep_core::{
    Category, Drink, DrinkQuery, HealthStatus, Highlight, Location, Paginated, SocialPost,
    SortOrder,
};
use barkeep_fetch::{HttpMethod, OfflineFallback, RequestDescriptor};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, trace};

use crate::error::StoreError;

/// Bundled dataset.
const DATASET: &str = include_str!("dataset.json");

/// Status reported by the offline health answer.
pub const OFFLINE_STATUS: &str = "offline";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Dataset {
    categories: Vec<Category>,
    drinks: Vec<Drink>,
    locations: Vec<Location>,
    highlights: Vec<Highlight>,
    social_feed: Vec<SocialPost>,
}

// ============================================================================
// Offline Store
// ============================================================================

/// In-memory substitute for the content backend.
#[derive(Debug, Clone)]
pub struct OfflineStore {
    categories: Vec<Category>,
    drinks: Vec<Drink>,
    locations: Vec<Location>,
    highlights: Vec<Highlight>,
    social: Vec<SocialPost>,
}

impl OfflineStore {
    /// Loads the bundled dataset.
    pub fn builtin() -> Result<Self, StoreError> {
        Self::from_json(DATASET)
    }

    /// Loads a dataset from JSON text.
    pub fn from_json(json: &str) -> Result<Self, StoreError> {
        let dataset: Dataset = serde_json::from_str(json)?;
        debug!(
            categories = dataset.categories.len(),
            drinks = dataset.drinks.len(),
            locations = dataset.locations.len(),
            "Loaded offline dataset"
        );
        Ok(Self {
            categories: dataset.categories,
            drinks: dataset.drinks,
            locations: dataset.locations,
            highlights: dataset.highlights,
            social: dataset.social_feed,
        })
    }

    // ------------------------------------------------------------------------
    // Categories
    // ------------------------------------------------------------------------

    /// All categories.
    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    /// Category by id.
    pub fn category(&self, id: u64) -> Result<&Category, StoreError> {
        self.categories
            .iter()
            .find(|c| c.id == id)
            .ok_or_else(|| StoreError::NotFound(format!("category {id}")))
    }

    // ------------------------------------------------------------------------
    // Drinks
    // ------------------------------------------------------------------------

    /// Filters, sorts and pages drinks the way the live endpoint does.
    pub fn list_drinks(&self, query: &DrinkQuery) -> Paginated<Drink> {
        let needle = query.q.as_deref().map(str::trim).filter(|q| !q.is_empty());
        let category = query.category.as_deref().filter(|c| !c.is_empty());

        let mut matched: Vec<Drink> = self
            .drinks
            .iter()
            .filter(|d| needle.is_none_or(|n| d.matches_text(n)))
            .filter(|d| category.is_none_or(|slug| d.category_slug.eq_ignore_ascii_case(slug)))
            .filter(|d| query.is_active.is_none_or(|active| d.is_active == active))
            .cloned()
            .collect();

        if let Some(field) = query.sort_by.as_deref() {
            sort_drinks(&mut matched, field, query.sort_order.unwrap_or_default());
        }

        let page = Paginated::from_filtered(
            matched,
            query.effective_page(),
            query.effective_page_size(),
        );
        trace!(
            total = page.total,
            page = page.page,
            total_pages = page.total_pages,
            "Listed offline drinks"
        );
        page
    }

    /// Drink by id.
    pub fn drink(&self, id: u64) -> Result<&Drink, StoreError> {
        self.drinks
            .iter()
            .find(|d| d.id == id)
            .ok_or_else(|| StoreError::NotFound(format!("drink {id}")))
    }

    // ------------------------------------------------------------------------
    // Locations
    // ------------------------------------------------------------------------

    /// All locations.
    pub fn locations(&self) -> &[Location] {
        &self.locations
    }

    /// The location flagged as current, if any.
    pub fn current_location(&self) -> Option<&Location> {
        self.locations.iter().find(|l| l.is_current)
    }

    /// Locations starting after `now`, soonest first.
    pub fn upcoming_locations(&self, now: DateTime<Utc>) -> Vec<&Location> {
        let mut upcoming: Vec<&Location> =
            self.locations.iter().filter(|l| l.is_upcoming(now)).collect();
        upcoming.sort_by_key(|l| l.starts_at);
        upcoming
    }

    /// Location by id.
    pub fn location(&self, id: u64) -> Result<&Location, StoreError> {
        self.locations
            .iter()
            .find(|l| l.id == id)
            .ok_or_else(|| StoreError::NotFound(format!("location {id}")))
    }

    // ------------------------------------------------------------------------
    // Highlights, social, health
    // ------------------------------------------------------------------------

    /// All highlights.
    pub fn highlights(&self) -> &[Highlight] {
        &self.highlights
    }

    /// Sample social feed.
    pub fn social_feed(&self) -> &[SocialPost] {
        &self.social
    }

    /// Health answer. Never reports the backend as healthy.
    pub fn health(&self) -> HealthStatus {
        HealthStatus {
            status: OFFLINE_STATUS.to_string(),
            version: None,
            timestamp: Some(Utc::now()),
        }
    }

    // ------------------------------------------------------------------------
    // Routing
    // ------------------------------------------------------------------------

    fn route(&self, req: &RequestDescriptor) -> Option<Value> {
        match req.segments().as_slice() {
            ["categories"] => to_json(self.categories()),
            ["categories", id] => self.category(parse_id(id)?).ok().and_then(to_json),
            ["drinks"] => {
                let query = DrinkQuery::from_pairs(
                    req.query_pairs().iter().map(|(k, v)| (k.as_str(), v.as_str())),
                );
                to_json(&self.list_drinks(&query))
            }
            ["drinks", id] => self.drink(parse_id(id)?).ok().and_then(to_json),
            ["locations"] => to_json(self.locations()),
            ["locations", "current"] => self.current_location().and_then(to_json),
            ["locations", "upcoming"] => to_json(&self.upcoming_locations(Utc::now())),
            ["locations", id] => self.location(parse_id(id)?).ok().and_then(to_json),
            ["highlights"] => to_json(self.highlights()),
            ["social-feed"] => to_json(self.social_feed()),
            ["health"] => to_json(&self.health()),
            _ => None,
        }
    }
}

impl OfflineFallback for OfflineStore {
    fn answer(&self, req: &RequestDescriptor) -> Option<Value> {
        if req.method() != HttpMethod::Get {
            return None;
        }
        let answer = self.route(req);
        debug!(path = %req.path(), answered = answer.is_some(), "Offline lookup");
        answer
    }
}

fn parse_id(segment: &str) -> Option<u64> {
    segment.parse().ok()
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> Option<Value> {
    serde_json::to_value(value).ok()
}

fn sort_drinks(drinks: &mut [Drink], field: &str, order: SortOrder) {
    let compare: fn(&Drink, &Drink) -> Ordering = match field {
        "name" => |a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()),
        "price" => |a, b| a.price.total_cmp(&b.price),
        "id" => |a, b| a.id.cmp(&b.id),
        "sortOrder" | "sort_order" => |a, b| a.sort_order.cmp(&b.sort_order),
        other => {
            debug!(field = other, "Ignoring unknown sort field");
            return;
        }
    };

    drinks.sort_by(|a, b| match order {
        SortOrder::Asc => compare(a, b),
        SortOrder::Desc => compare(b, a),
    });
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use barkeep_core::total_pages;

    fn store() -> OfflineStore {
        OfflineStore::builtin().unwrap()
    }

    #[test]
    fn test_dataset_shape() {
        let store = store();
        assert_eq!(store.categories().len(), 5);
        assert_eq!(store.list_drinks(&DrinkQuery::new().page(1, 100)).total, 14);
        assert_eq!(store.locations().len(), 4);
        assert_eq!(store.highlights().len(), 3);
        assert_eq!(store.social_feed().len(), 4);
    }

    #[test]
    fn test_categories_answer() {
        let answer = store().answer(&RequestDescriptor::get("/categories")).unwrap();
        let categories: Vec<Category> = serde_json::from_value(answer).unwrap();
        assert_eq!(categories.len(), 5);
        assert_eq!(categories[0].slug, "cocktails");
    }

    #[test]
    fn test_search_apfel_first_page() {
        let req = RequestDescriptor::get("/drinks").query([
            ("q", "Apfel"),
            ("page", "1"),
            ("pageSize", "10"),
        ]);
        let answer = store().answer(&req).unwrap();
        let page: Paginated<Drink> = serde_json::from_value(answer).unwrap();

        assert!(!page.items.is_empty());
        assert!(page.items.iter().all(|d| d.matches_text("apfel")));
        assert_eq!(page.page, 1);
        assert_eq!(page.page_size, 10);
        assert!(page.total <= 10);
        assert_eq!(page.total_pages, 1);
        assert_eq!(page.items.len() as u64, page.total);
    }

    #[test]
    fn test_search_is_case_insensitive() {
        let store = store();
        let lower = store.list_drinks(&DrinkQuery::new().search("apfel"));
        let upper = store.list_drinks(&DrinkQuery::new().search("APFEL"));
        assert_eq!(lower, upper);
        // Matches in descriptions count too.
        assert!(lower.items.iter().any(|d| d.name == "Ingwer-Limonade"));
    }

    #[test]
    fn test_category_and_active_filters() {
        let store = store();
        let shots = store.list_drinks(&DrinkQuery::new().category("shots"));
        assert_eq!(shots.total, 2);

        let active_shots = store.list_drinks(&DrinkQuery {
            is_active: Some(true),
            ..DrinkQuery::new().category("shots")
        });
        assert_eq!(active_shots.total, 1);
        assert_eq!(active_shots.items[0].name, "Tequila");

        let none = store.list_drinks(&DrinkQuery::new().category("wein"));
        assert_eq!(none.total, 0);
        assert_eq!(none.total_pages, 0);
        assert!(none.items.is_empty());
    }

    #[test]
    fn test_pagination_matches_live_contract() {
        let store = store();
        for page_size in 1..=15 {
            let first = store.list_drinks(&DrinkQuery::new().page(1, page_size));
            assert_eq!(first.total, 14);
            assert_eq!(first.total_pages, total_pages(14, page_size));
            assert_eq!(first.total_pages, 14_u32.div_ceil(page_size));

            let collected: usize = (1..=first.total_pages)
                .map(|p| store.list_drinks(&DrinkQuery::new().page(p, page_size)).items.len())
                .sum();
            assert_eq!(collected, 14);
        }
    }

    #[test]
    fn test_page_beyond_end_is_empty() {
        let page = store().list_drinks(&DrinkQuery::new().page(9, 5));
        assert!(page.items.is_empty());
        assert_eq!(page.total, 14);
        assert_eq!(page.total_pages, 3);
    }

    #[test]
    fn test_zero_page_size_uses_default() {
        let page = store().list_drinks(&DrinkQuery::new().page(1, 0));
        assert_eq!(page.page_size, 12);
        assert_eq!(page.items.len(), 12);
        assert_eq!(page.total_pages, 2);
    }

    #[test]
    fn test_sorting() {
        let store = store();
        let by_price = store.list_drinks(&DrinkQuery {
            sort_by: Some("price".to_string()),
            sort_order: Some(SortOrder::Desc),
            ..DrinkQuery::new().page(1, 100)
        });
        let prices: Vec<f64> = by_price.items.iter().map(|d| d.price).collect();
        assert!(prices.windows(2).all(|w| w[0] >= w[1]));
        assert_eq!(by_price.items[0].name, "Espresso Martini");

        let by_name = store.list_drinks(&DrinkQuery {
            sort_by: Some("name".to_string()),
            ..DrinkQuery::new().page(1, 3)
        });
        assert_eq!(by_name.items[0].name, "Aperol Spritz");
        assert_eq!(by_name.items[1].name, "Apfel Mule");
    }

    #[test]
    fn test_locations() {
        let store = store();
        let current = store.current_location().unwrap();
        assert!(current.is_current);

        let now = "2026-01-01T00:00:00Z".parse().unwrap();
        let upcoming = store.upcoming_locations(now);
        assert_eq!(upcoming.len(), 2);
        assert!(upcoming[0].starts_at <= upcoming[1].starts_at);

        assert!(store.answer(&RequestDescriptor::get("/locations/current")).is_some());
        let answer = store.answer(&RequestDescriptor::get("/locations/3")).unwrap();
        assert_eq!(answer["city"], "Heidelberg");
    }

    #[test]
    fn test_current_location_follows_flag_not_clock() {
        let store = store();
        let before_everything = "2000-01-01T00:00:00Z".parse().unwrap();

        let current = store.current_location().unwrap();
        assert_eq!(current.id, 2);
        assert!(current.starts_at > before_everything);

        let upcoming = store.upcoming_locations(before_everything);
        assert!(upcoming.iter().all(|l| !l.is_current));
        assert_eq!(upcoming.len(), 3);
    }

    #[test]
    fn test_lookup_by_id() {
        let store = store();
        assert_eq!(store.drink(8).unwrap().name, "Apfelschorle");
        assert!(matches!(store.drink(99), Err(StoreError::NotFound(_))));
        assert!(store.answer(&RequestDescriptor::get("/drinks/99")).is_none());
        assert!(store.answer(&RequestDescriptor::get("/drinks/abc")).is_none());
    }

    #[test]
    fn test_offline_health_is_not_ok() {
        let answer = store().answer(&RequestDescriptor::get("/health")).unwrap();
        let health: HealthStatus = serde_json::from_value(answer).unwrap();
        assert!(!health.is_ok());
        assert_eq!(health.status, OFFLINE_STATUS);
    }

    #[test]
    fn test_only_get_is_answered() {
        let store = store();
        assert!(store.answer(&RequestDescriptor::post("/categories")).is_none());
        assert!(store.answer(&RequestDescriptor::delete("/drinks/1")).is_none());
        assert!(store.answer(&RequestDescriptor::get("/auth/me")).is_none());
        assert!(store.answer(&RequestDescriptor::get("/newsletter/subscribe")).is_none());
    }
}
