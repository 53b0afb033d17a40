//! Browser abstraction the extractors are written against.
//!
//! A [`PageDriver`] owns one browser session with one page. Everything the
//! extractors need from the DOM is expressed as a handful of text-returning
//! primitives, so the parsing side never touches browser handles and tests
//! can substitute an in-memory driver.

pub mod chrome;
mod scripts;

use std::future::Future;
use std::time::Duration;

use serde::Serialize;

use crate::error::ScraperError;

/// Where a query looks for elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Scope<'a> {
    Document,
    /// The first `section` whose `h2` heading contains `heading`
    /// (case-insensitive).
    Section { heading: &'a str },
}

impl<'a> Scope<'a> {
    #[must_use]
    pub const fn section(heading: &'a str) -> Self {
        Scope::Section { heading }
    }
}

/// A list-item query. Each matching item yields one token list:
/// - with `text` set, the trimmed inner texts of the item's descendants
///   matching `text`;
/// - without it, the item's own inner text split into trimmed lines.
///
/// Empty strings are dropped in both cases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ItemQuery<'a> {
    pub scope: Scope<'a>,
    pub item: &'a str,
    /// Keep only items containing a descendant matching this selector.
    pub has: Option<&'a str>,
    pub text: Option<&'a str>,
}

impl<'a> ItemQuery<'a> {
    #[must_use]
    pub const fn lines(scope: Scope<'a>, item: &'a str) -> Self {
        Self {
            scope,
            item,
            has: None,
            text: None,
        }
    }

    #[must_use]
    pub const fn texts(scope: Scope<'a>, item: &'a str, text: &'a str) -> Self {
        Self {
            scope,
            item,
            has: None,
            text: Some(text),
        }
    }

    #[must_use]
    pub const fn having(mut self, has: &'a str) -> Self {
        self.has = Some(has);
        self
    }
}

/// A control to click: first visible match of `selector` within `scope`
/// whose text contains `text` when given. With `every` set, all visible
/// matches are clicked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ClickTarget<'a> {
    pub scope: Scope<'a>,
    pub selector: &'a str,
    pub text: Option<&'a str>,
    pub every: bool,
}

impl<'a> ClickTarget<'a> {
    #[must_use]
    pub const fn new(scope: Scope<'a>, selector: &'a str) -> Self {
        Self {
            scope,
            selector,
            text: None,
            every: false,
        }
    }

    #[must_use]
    pub const fn with_text(mut self, text: &'a str) -> Self {
        self.text = Some(text);
        self
    }

    #[must_use]
    pub const fn every(mut self) -> Self {
        self.every = true;
        self
    }
}

/// One browser session driving one page.
///
/// All operations act on the current page; callers run them strictly in
/// sequence.
pub trait PageDriver: Send + Sync {
    /// Launches the browser and attaches `session_cookie`. Calling it on an
    /// initialized driver is a no-op.
    fn initialize(
        &mut self,
        session_cookie: &str,
    ) -> impl Future<Output = Result<(), ScraperError>> + Send;

    /// Loads `url`, failing with [`ScraperError::NavigationTimeout`] when the
    /// page does not reach DOM readiness within `timeout`.
    fn navigate(
        &self,
        url: &str,
        timeout: Duration,
    ) -> impl Future<Output = Result<(), ScraperError>> + Send;

    /// Waits until `selector` matches, failing with
    /// [`ScraperError::SelectorNotFound`] once `timeout` elapses.
    fn wait_for_selector(
        &self,
        selector: &str,
        timeout: Duration,
    ) -> impl Future<Output = Result<(), ScraperError>> + Send;

    fn scroll_to_bottom(&self) -> impl Future<Output = Result<(), ScraperError>> + Send;

    fn document_height(&self) -> impl Future<Output = Result<u64, ScraperError>> + Send;

    /// Clicks the target if it is present and visible. Returns whether at
    /// least one click happened.
    fn click(
        &self,
        target: ClickTarget<'_>,
        timeout: Duration,
    ) -> impl Future<Output = Result<bool, ScraperError>> + Send;

    /// Inner text of the first `selector` match in `scope`, or of the scope
    /// element itself when `selector` is `None`. `None` if nothing matches.
    fn read_text(
        &self,
        scope: Scope<'_>,
        selector: Option<&str>,
    ) -> impl Future<Output = Result<Option<String>, ScraperError>> + Send;

    /// Runs an [`ItemQuery`]. `None` means the scope itself is absent.
    fn collect_items(
        &self,
        query: ItemQuery<'_>,
    ) -> impl Future<Output = Result<Option<Vec<Vec<String>>>, ScraperError>> + Send;

    /// Evaluates a script in the page and returns its JSON result.
    fn evaluate(
        &self,
        script: &str,
    ) -> impl Future<Output = Result<serde_json::Value, ScraperError>> + Send;

    /// Releases the browser. Safe to call more than once.
    fn shutdown(&mut self) -> impl Future<Output = Result<(), ScraperError>> + Send;
}

/// Clicks an optional expansion control, ignoring absence, slowness and
/// errors. Returns whether a click happened.
pub async fn click_quietly<D: PageDriver>(
    driver: &D,
    target: ClickTarget<'_>,
    timeout: Duration,
) -> bool {
    match driver.click(target, timeout).await {
        Ok(clicked) => {
            tracing::trace!(selector = target.selector, clicked, "optional click");
            clicked
        }
        Err(e) => {
            tracing::debug!(selector = target.selector, error = %e, "optional click skipped");
            false
        }
    }
}
