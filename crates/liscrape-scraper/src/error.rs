use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScraperError {
    #[error("browser launch failed: {0}")]
    BrowserLaunch(String),

    #[error("browser session is not initialized")]
    SessionNotInitialized,

    #[error("could not attach session cookie: {0}")]
    Cookie(String),

    #[error("navigation to {url} timed out after {timeout_secs}s")]
    NavigationTimeout { url: String, timeout_secs: u64 },

    #[error("navigation to {url} failed: {reason}")]
    Navigation { url: String, reason: String },

    #[error("selector not found: {selector}")]
    SelectorNotFound { selector: String },

    #[error("{action} timed out")]
    Timeout { action: String },

    #[error("script evaluation failed: {reason}")]
    ScriptEvaluation { reason: String },

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid profile URL \"{url}\"")]
    InvalidProfileUrl { url: String },
}

impl ScraperError {
    /// Errors that only mean "this page's data is unavailable".
    #[must_use]
    pub fn is_page_unavailable(&self) -> bool {
        matches!(
            self,
            ScraperError::NavigationTimeout { .. }
                | ScraperError::Navigation { .. }
                | ScraperError::SelectorNotFound { .. }
        )
    }
}
