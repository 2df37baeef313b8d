//! Text output formatting with colors.

use barkeep_core::{
    Category, Drink, HealthStatus, Highlight, Location, LoginResponse, NewsletterResponse,
    Paginated, SocialPost, StrategyUsed, UnifiedResult, User,
};
use barkeep_fetch::{HealthSnapshot, ProbeReport, TokenClaims};
use chrono::{DateTime, Utc};

// ============================================================================
// ANSI Colors
// ============================================================================

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const RED: &str = "\x1b[31m";
const CYAN: &str = "\x1b[36m";

/// Text formatter with optional colors.
pub struct TextFormatter {
    use_colors: bool,
}

impl TextFormatter {
    /// Creates a new text formatter.
    pub fn new(use_colors: bool) -> Self {
        Self { use_colors }
    }

    // ------------------------------------------------------------------------
    // Drinks
    // ------------------------------------------------------------------------

    /// Formats one page of drinks with a paging footer.
    pub fn format_drink_page(&self, page: &Paginated<Drink>) -> String {
        if page.items.is_empty() {
            return self.dim("No drinks found.");
        }

        let mut lines: Vec<String> = page
            .items
            .iter()
            .map(|d| self.format_drink_line(d))
            .collect();

        lines.push(String::new());
        lines.push(self.dim(&format!(
            "Page {} of {} ({} drinks)",
            page.page,
            page.total_pages.max(1),
            page.total
        )));
        lines.join("\n")
    }

    /// Formats a drink as one line.
    pub fn format_drink_line(&self, drink: &Drink) -> String {
        let mut line = format!(
            "{:>4}  {:<24} {:>8}  {}",
            drink.id,
            drink.name,
            format_price(drink.price),
            self.dim(&drink.category_slug)
        );
        if !drink.is_alcoholic {
            line.push_str(&format!("  {}", self.green("alkoholfrei")));
        }
        if !drink.is_active {
            line.push_str(&format!("  {}", self.yellow("inactive")));
        }
        line
    }

    /// Formats a drink with all details.
    pub fn format_drink(&self, drink: &Drink) -> String {
        let mut lines = vec![
            format!("{} ({})", self.bold(&drink.name), format_price(drink.price)),
            format!("Category:    {}", drink.category_slug),
        ];
        if !drink.description.is_empty() {
            lines.push(format!("Description: {}", drink.description));
        }
        if !drink.ingredients.is_empty() {
            lines.push(format!("Ingredients: {}", drink.ingredients.join(", ")));
        }
        lines.push(format!(
            "Alcoholic:   {}",
            if drink.is_alcoholic { "yes" } else { "no" }
        ));
        lines.join("\n")
    }

    // ------------------------------------------------------------------------
    // Catalog
    // ------------------------------------------------------------------------

    /// Formats the category list.
    pub fn format_categories(&self, categories: &[Category]) -> String {
        if categories.is_empty() {
            return self.dim("No categories.");
        }
        categories
            .iter()
            .map(|c| format!("{:>4}  {:<16} {}", c.id, c.name, self.dim(&c.slug)))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Formats a location with its dates.
    pub fn format_location(&self, location: &Location) -> String {
        let marker = if location.is_current {
            format!(" {}", self.green("● now"))
        } else {
            String::new()
        };

        let mut lines = vec![
            format!("{}{}", self.bold(&location.name), marker),
            format!("  {}, {}", location.address, location.city),
        ];
        let dates = match location.ends_at {
            Some(end) => format!("  {} - {}", format_time(location.starts_at), format_time(end)),
            None => format!("  from {}", format_time(location.starts_at)),
        };
        lines.push(self.dim(&dates));
        if let Some(description) = &location.description {
            lines.push(format!("  {description}"));
        }
        lines.join("\n")
    }

    /// Formats the location list.
    pub fn format_locations(&self, locations: &[Location]) -> String {
        if locations.is_empty() {
            return self.dim("No locations.");
        }
        locations
            .iter()
            .map(|l| self.format_location(l))
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// Formats the highlight list.
    pub fn format_highlights(&self, highlights: &[Highlight]) -> String {
        if highlights.is_empty() {
            return self.dim("No highlights.");
        }
        highlights
            .iter()
            .map(|h| format!("{}\n  {}", self.bold(&h.title), h.description))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Formats the social feed.
    pub fn format_feed(&self, posts: &[SocialPost]) -> String {
        if posts.is_empty() {
            return self.dim("No posts.");
        }
        posts
            .iter()
            .map(|p| {
                format!(
                    "{}  {}  {}\n  {}",
                    self.dim(&p.posted_at.format("%Y-%m-%d").to_string()),
                    p.caption,
                    self.dim(&format!("♥ {}", p.likes)),
                    self.cyan(&p.permalink)
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    // ------------------------------------------------------------------------
    // Account
    // ------------------------------------------------------------------------

    /// Formats a successful login.
    pub fn format_login(&self, response: &LoginResponse) -> String {
        format!(
            "{} Logged in as {}",
            self.green("✓"),
            self.cyan(&response.user.email)
        )
    }

    /// Formats the current user and session.
    pub fn format_user(&self, user: &User, claims: Option<&TokenClaims>) -> String {
        let mut lines = vec![format!("Account: {}", self.cyan(&user.email))];
        if let Some(name) = &user.name {
            lines.push(format!("Name:    {name}"));
        }
        if let Some(role) = &user.role {
            lines.push(format!("Role:    {role}"));
        }
        if let Some(expires) = claims.and_then(TokenClaims::expires_at) {
            lines.push(format!("Session: expires {}", format_time(expires)));
        }
        lines.join("\n")
    }

    /// Formats a newsletter answer.
    pub fn format_newsletter(&self, response: &NewsletterResponse) -> String {
        let state = if response.subscribed {
            self.green("subscribed")
        } else {
            self.yellow("unsubscribed")
        };
        let mut line = format!("{} is {}", response.email, state);
        if let Some(message) = &response.message {
            line.push_str(&format!(" ({message})"));
        }
        line
    }

    // ------------------------------------------------------------------------
    // Health & provenance
    // ------------------------------------------------------------------------

    /// Formats a health snapshot with the backend's own status.
    pub fn format_health(&self, snapshot: &HealthSnapshot, status: Option<&HealthStatus>) -> String {
        let mut lines = vec![
            self.format_probe("Standard", &snapshot.direct),
            self.format_probe("Edge", &snapshot.edge),
            format!("Recommended: {}", self.bold(snapshot.recommended.label())),
        ];
        if let Some(status) = status {
            let mut line = format!("Backend:     {}", status.status);
            if let Some(version) = &status.version {
                line.push_str(&format!(" (v{version})"));
            }
            lines.push(line);
        }
        lines.join("\n")
    }

    /// Formats a health snapshot as one timestamped line.
    pub fn format_health_line(&self, snapshot: &HealthSnapshot) -> String {
        let state = if snapshot.is_online() {
            self.green("online")
        } else {
            self.red("offline")
        };
        format!(
            "{}  {}  via {}  ({} ms / {} ms)",
            self.dim(&snapshot.checked_at.format("%H:%M:%S").to_string()),
            state,
            snapshot.recommended.label(),
            snapshot.direct.latency_ms,
            snapshot.edge.latency_ms
        )
    }

    fn format_probe(&self, label: &str, report: &ProbeReport) -> String {
        let label = format!("{label}:");
        if report.success {
            format!(
                "{label:<12} {} {}",
                self.green("✓"),
                self.dim(&format!("{} ms", report.latency_ms))
            )
        } else {
            let reason = report
                .failure
                .map_or_else(|| "failed".to_string(), |k| k.label().to_string());
            format!("{label:<12} {} {}", self.red("✗"), reason)
        }
    }

    /// Notes where a payload came from, when it was not a first-try live
    /// answer.
    pub fn format_provenance<T>(&self, result: &UnifiedResult<T>) -> Option<String> {
        match result.strategy_used()? {
            StrategyUsed::Mock => Some(self.yellow(&format!(
                "Offline data: the backend could not be reached ({} tiers failed).",
                result.retry_count()
            ))),
            StrategyUsed::EdgeOptimized => Some(self.dim("Served through the edge-optimized tier.")),
            StrategyUsed::Standard if result.retry_count() > 0 => Some(self.dim(&format!(
                "Served after {} failed tier(s).",
                result.retry_count()
            ))),
            StrategyUsed::Standard => None,
        }
    }

    // ------------------------------------------------------------------------
    // Colors
    // ------------------------------------------------------------------------

    fn paint(&self, code: &str, s: &str) -> String {
        if self.use_colors {
            format!("{code}{s}{RESET}")
        } else {
            s.to_string()
        }
    }

    fn bold(&self, s: &str) -> String {
        self.paint(BOLD, s)
    }

    fn dim(&self, s: &str) -> String {
        self.paint(DIM, s)
    }

    fn green(&self, s: &str) -> String {
        self.paint(GREEN, s)
    }

    fn yellow(&self, s: &str) -> String {
        self.paint(YELLOW, s)
    }

    fn red(&self, s: &str) -> String {
        self.paint(RED, s)
    }

    fn cyan(&self, s: &str) -> String {
        self.paint(CYAN, s)
    }
}

fn format_price(price: f64) -> String {
    format!("{price:.2} €")
}

fn format_time(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%d %H:%M UTC").to_string()
}
