use std::time::Duration;

use liscrape_core::AppConfig;

use crate::scroll::ScrollPolicy;

/// Time budgets and limits for one scrape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrapePolicy {
    pub navigation_timeout: Duration,
    /// Wait for a page's main content (profile heading, list items, feed
    /// cards) to appear.
    pub selector_timeout: Duration,
    /// Shorter wait used on the reactions page, which is not scrolled.
    pub reactions_selector_timeout: Duration,
    /// Section-level expansion controls ("See more", "Show all").
    pub click_timeout: Duration,
    /// Per-item "show more" controls inside a list.
    pub item_click_timeout: Duration,
    pub scroll: ScrollPolicy,
    pub reactions_limit: usize,
}

impl Default for ScrapePolicy {
    fn default() -> Self {
        Self {
            navigation_timeout: Duration::from_secs(60),
            selector_timeout: Duration::from_secs(20),
            reactions_selector_timeout: Duration::from_secs(10),
            click_timeout: Duration::from_secs(2),
            item_click_timeout: Duration::from_secs(1),
            scroll: ScrollPolicy::default(),
            reactions_limit: 20,
        }
    }
}

impl ScrapePolicy {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        let defaults = Self::default();
        Self {
            navigation_timeout: Duration::from_secs(config.navigation_timeout_secs),
            selector_timeout: Duration::from_secs(config.selector_timeout_secs),
            scroll: ScrollPolicy {
                max_rounds: config.max_scroll_rounds,
                delay: Duration::from_millis(config.scroll_delay_ms),
                ..defaults.scroll
            },
            reactions_limit: config.reactions_limit,
            ..defaults
        }
    }
}
