//! Infinite-scroll loading.
//!
//! Activity feeds append cards as the page is scrolled. [`load_all`] keeps
//! scrolling until the document height stops changing for
//! [`ScrollPolicy::stagnation_limit`] consecutive rounds or the round budget
//! runs out, whichever comes first.

use std::time::Duration;

use crate::driver::{click_quietly, ClickTarget, PageDriver};
use crate::error::ScraperError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollPolicy {
    pub max_rounds: u32,
    pub delay: Duration,
    pub stagnation_limit: u32,
    /// Budget for clicking the optional "load more" control.
    pub load_more_timeout: Duration,
}

impl Default for ScrollPolicy {
    fn default() -> Self {
        Self {
            max_rounds: 30,
            delay: Duration::from_millis(1500),
            stagnation_limit: 2,
            load_more_timeout: Duration::from_secs(2),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollOutcome {
    pub rounds: u32,
    pub final_height: u64,
    /// `true` when loading stopped because the height settled rather than
    /// because the round budget ran out.
    pub settled: bool,
}

/// Counts consecutive rounds without height growth.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StagnationTracker {
    last_height: u64,
    stagnant_rounds: u32,
    limit: u32,
}

impl StagnationTracker {
    #[must_use]
    pub fn new(limit: u32) -> Self {
        Self {
            last_height: 0,
            stagnant_rounds: 0,
            limit,
        }
    }

    /// Records a height measurement. Returns `true` once the height has been
    /// unchanged for `limit` consecutive observations.
    pub fn observe(&mut self, height: u64) -> bool {
        if height == self.last_height {
            self.stagnant_rounds += 1;
        } else {
            self.stagnant_rounds = 0;
        }
        self.last_height = height;
        self.stagnant_rounds >= self.limit
    }

    #[must_use]
    pub fn last_height(&self) -> u64 {
        self.last_height
    }
}

/// Scrolls the current page until its content stops growing.
///
/// When `load_more` is given, a visible match is clicked after each scroll
/// and the page gets another `delay` to render what the click loaded.
///
/// # Errors
///
/// Returns the driver error if scrolling or measuring the page fails.
pub async fn load_all<D: PageDriver>(
    driver: &D,
    policy: &ScrollPolicy,
    load_more: Option<ClickTarget<'_>>,
) -> Result<ScrollOutcome, ScraperError> {
    let mut tracker = StagnationTracker::new(policy.stagnation_limit);
    let mut rounds = 0;

    while rounds < policy.max_rounds {
        rounds += 1;
        driver.scroll_to_bottom().await?;
        tokio::time::sleep(policy.delay).await;

        if let Some(target) = load_more {
            if click_quietly(driver, target, policy.load_more_timeout).await {
                tokio::time::sleep(policy.delay).await;
            }
        }

        let height = driver.document_height().await?;
        if tracker.observe(height) {
            tracing::debug!(rounds, height, "scroll height settled");
            return Ok(ScrollOutcome {
                rounds,
                final_height: height,
                settled: true,
            });
        }
    }

    tracing::debug!(
        rounds,
        height = tracker.last_height(),
        "scroll round budget exhausted"
    );
    Ok(ScrollOutcome {
        rounds,
        final_height: tracker.last_height(),
        settled: false,
    })
}
