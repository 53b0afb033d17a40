#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use liscrape_scraper::{
    ClickTarget, ItemQuery, PageDriver, Scope, ScrapePolicy, ScraperError, ScrollPolicy,
};
use serde_json::Value;

pub const PROFILE_URL: &str = "https://www.linkedin.com/in/jane-doe/";

pub fn subpage(path: &str) -> String {
    format!("{PROFILE_URL}{path}")
}

/// Policy with zero delays so scroll loops finish instantly.
pub fn fast_policy() -> ScrapePolicy {
    ScrapePolicy {
        navigation_timeout: Duration::from_millis(50),
        selector_timeout: Duration::from_millis(50),
        reactions_selector_timeout: Duration::from_millis(50),
        click_timeout: Duration::from_millis(10),
        item_click_timeout: Duration::from_millis(10),
        scroll: ScrollPolicy {
            max_rounds: 30,
            delay: Duration::ZERO,
            stagnation_limit: 2,
            load_more_timeout: Duration::from_millis(10),
        },
        reactions_limit: 20,
    }
}

fn scope_label(scope: Scope<'_>) -> String {
    match scope {
        Scope::Document => "document".to_string(),
        Scope::Section { heading } => heading.to_string(),
    }
}

fn text_key(scope: &str, selector: Option<&str>) -> String {
    format!("{scope}|{}", selector.unwrap_or("*"))
}

fn items_key(scope: &str, item: &str, text: Option<&str>) -> String {
    format!("{scope}|{item}|{}", text.unwrap_or("*"))
}

/// Canned DOM for one URL.
#[derive(Debug, Clone, Default)]
pub struct FakePage {
    selectors: HashSet<String>,
    clickable: HashSet<String>,
    texts: HashMap<String, String>,
    items: HashMap<String, Vec<Vec<String>>>,
    script_result: Option<Value>,
    heights: Vec<u64>,
}

impl FakePage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes `wait_for_selector(selector)` succeed.
    pub fn with_selector(mut self, selector: &str) -> Self {
        self.selectors.insert(selector.to_string());
        self
    }

    /// Makes `click` on `selector` report a click.
    pub fn with_clickable(mut self, selector: &str) -> Self {
        self.clickable.insert(selector.to_string());
        self
    }

    /// Text for `read_text`. `scope` is `"document"` or a section heading.
    pub fn with_text(mut self, scope: &str, selector: Option<&str>, text: &str) -> Self {
        self.texts
            .insert(text_key(scope, selector), text.to_string());
        self
    }

    /// Result for `collect_items`, after any `has` filter would apply.
    pub fn with_items(
        mut self,
        scope: &str,
        item: &str,
        text: Option<&str>,
        items: Vec<Vec<&str>>,
    ) -> Self {
        let items = items
            .into_iter()
            .map(|tokens| tokens.into_iter().map(str::to_string).collect())
            .collect();
        self.items.insert(items_key(scope, item, text), items);
        self
    }

    pub fn with_script_result(mut self, value: Value) -> Self {
        self.script_result = Some(value);
        self
    }

    /// Successive `document_height` readings; the last one repeats.
    pub fn with_heights(mut self, heights: &[u64]) -> Self {
        self.heights = heights.to_vec();
        self
    }
}

#[derive(Debug, Default)]
pub struct CallLog {
    pub cookie: Option<String>,
    pub initialized: usize,
    pub shutdowns: usize,
    pub navigations: Vec<String>,
    pub scrolls: usize,
    pub clicks: Vec<String>,
}

pub struct FakeDriver {
    pages: HashMap<String, FakePage>,
    failing_urls: HashSet<String>,
    fail_initialize: bool,
    current: Mutex<Option<String>>,
    height_reads: Mutex<usize>,
    log: Arc<Mutex<CallLog>>,
}

impl FakeDriver {
    pub fn new() -> Self {
        Self {
            pages: HashMap::new(),
            failing_urls: HashSet::new(),
            fail_initialize: false,
            current: Mutex::new(None),
            height_reads: Mutex::new(0),
            log: Arc::new(Mutex::new(CallLog::default())),
        }
    }

    pub fn with_page(mut self, url: &str, page: FakePage) -> Self {
        self.pages.insert(url.to_string(), page);
        self
    }

    /// Navigation to `url` times out.
    pub fn with_failing_url(mut self, url: &str) -> Self {
        self.failing_urls.insert(url.to_string());
        self
    }

    pub fn with_failing_initialize(mut self) -> Self {
        self.fail_initialize = true;
        self
    }

    /// Shared handle to the call log; stays readable after the driver moves.
    pub fn log(&self) -> Arc<Mutex<CallLog>> {
        Arc::clone(&self.log)
    }

    /// Points the driver at `url` without going through `navigate`.
    pub fn open(&self, url: &str) {
        *self.current.lock().expect("current lock") = Some(url.to_string());
        *self.height_reads.lock().expect("height lock") = 0;
    }

    fn page(&self) -> FakePage {
        let current = self.current.lock().expect("current lock").clone();
        current
            .and_then(|url| self.pages.get(&url).cloned())
            .unwrap_or_default()
    }
}

impl PageDriver for FakeDriver {
    async fn initialize(&mut self, session_cookie: &str) -> Result<(), ScraperError> {
        if self.fail_initialize {
            return Err(ScraperError::BrowserLaunch("chrome not found".to_string()));
        }
        let mut log = self.log.lock().expect("log lock");
        log.cookie = Some(session_cookie.to_string());
        log.initialized += 1;
        Ok(())
    }

    async fn navigate(&self, url: &str, timeout: Duration) -> Result<(), ScraperError> {
        self.log
            .lock()
            .expect("log lock")
            .navigations
            .push(url.to_string());
        if self.failing_urls.contains(url) {
            return Err(ScraperError::NavigationTimeout {
                url: url.to_string(),
                timeout_secs: timeout.as_secs(),
            });
        }
        self.open(url);
        Ok(())
    }

    async fn wait_for_selector(&self, selector: &str, _timeout: Duration) -> Result<(), ScraperError> {
        if self.page().selectors.contains(selector) {
            Ok(())
        } else {
            Err(ScraperError::SelectorNotFound {
                selector: selector.to_string(),
            })
        }
    }

    async fn scroll_to_bottom(&self) -> Result<(), ScraperError> {
        self.log.lock().expect("log lock").scrolls += 1;
        Ok(())
    }

    async fn document_height(&self) -> Result<u64, ScraperError> {
        let heights = self.page().heights;
        let mut reads = self.height_reads.lock().expect("height lock");
        let height = heights
            .get(*reads)
            .or_else(|| heights.last())
            .copied()
            .unwrap_or(0);
        *reads += 1;
        Ok(height)
    }

    async fn click(&self, target: ClickTarget<'_>, _timeout: Duration) -> Result<bool, ScraperError> {
        self.log
            .lock()
            .expect("log lock")
            .clicks
            .push(target.selector.to_string());
        Ok(self.page().clickable.contains(target.selector))
    }

    async fn read_text(
        &self,
        scope: Scope<'_>,
        selector: Option<&str>,
    ) -> Result<Option<String>, ScraperError> {
        Ok(self
            .page()
            .texts
            .get(&text_key(&scope_label(scope), selector))
            .cloned())
    }

    async fn collect_items(
        &self,
        query: ItemQuery<'_>,
    ) -> Result<Option<Vec<Vec<String>>>, ScraperError> {
        let key = items_key(&scope_label(query.scope), query.item, query.text);
        let found = self.page().items.get(&key).cloned();
        Ok(match query.scope {
            Scope::Document => Some(found.unwrap_or_default()),
            Scope::Section { .. } => found,
        })
    }

    async fn evaluate(&self, _script: &str) -> Result<Value, ScraperError> {
        Ok(self
            .page()
            .script_result
            .unwrap_or_else(|| Value::Array(Vec::new())))
    }

    async fn shutdown(&mut self) -> Result<(), ScraperError> {
        self.log.lock().expect("log lock").shutdowns += 1;
        Ok(())
    }
}
