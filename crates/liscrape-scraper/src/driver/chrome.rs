//! [`PageDriver`] backed by a headless Chromium session via `chromiumoxide`.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::network::{CookieParam, SetCookiesParams};
use chromiumoxide::cdp::browser_protocol::page::NavigateParams;
use chromiumoxide::cdp::js_protocol::runtime::EvaluateParams;
use chromiumoxide::page::Page;
use futures::StreamExt;
use liscrape_core::AppConfig;
use serde::Serialize;
use tempfile::TempDir;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use super::{scripts, ClickTarget, ItemQuery, PageDriver, Scope};
use crate::error::ScraperError;

/// Name of the authentication cookie the target site reads.
pub const SESSION_COOKIE_NAME: &str = "li_at";
pub const SESSION_COOKIE_DOMAIN: &str = ".linkedin.com";

const SELECTOR_POLL_INTERVAL: Duration = Duration::from_millis(250);
const READY_POLL_INTERVAL: Duration = Duration::from_millis(100);
/// Headroom over the navigation timeout for every CDP request, so that
/// `navigate`'s own deadline is the one that fires.
const REQUEST_TIMEOUT_SLACK: Duration = Duration::from_secs(10);
const PROFILE_DIR_PREFIX: &str = "liscrape-chrome-";

#[derive(Debug, Clone)]
pub struct BrowserSettings {
    pub executable: Option<PathBuf>,
    pub headless: bool,
    pub navigation_timeout: Duration,
}

impl Default for BrowserSettings {
    fn default() -> Self {
        Self {
            executable: None,
            headless: true,
            navigation_timeout: Duration::from_secs(60),
        }
    }
}

impl BrowserSettings {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            executable: config.chrome_path.clone(),
            headless: config.headless,
            navigation_timeout: Duration::from_secs(config.navigation_timeout_secs),
        }
    }

    /// Upper bound for a single CDP request.
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        self.navigation_timeout + REQUEST_TIMEOUT_SLACK
    }
}

struct Session {
    browser: Browser,
    page: Page,
    handler: JoinHandle<()>,
    // Dropped last, after the browser has exited.
    _profile_dir: TempDir,
}

/// One Chromium process, one page, one authenticated cookie jar.
pub struct ChromeDriver {
    settings: BrowserSettings,
    session: Option<Session>,
}

impl ChromeDriver {
    #[must_use]
    pub fn new(settings: BrowserSettings) -> Self {
        Self {
            settings,
            session: None,
        }
    }

    fn page(&self) -> Result<&Page, ScraperError> {
        self.session
            .as_ref()
            .map(|s| &s.page)
            .ok_or(ScraperError::SessionNotInitialized)
    }

    /// A fresh profile directory, so concurrent browsers never share a
    /// Chromium singleton lock.
    fn profile_dir() -> Result<TempDir, ScraperError> {
        tempfile::Builder::new()
            .prefix(PROFILE_DIR_PREFIX)
            .tempdir()
            .map_err(|e| {
                ScraperError::BrowserLaunch(format!("could not create profile directory: {e}"))
            })
    }

    fn browser_config(&self, profile_dir: &Path) -> Result<BrowserConfig, ScraperError> {
        let mut builder = BrowserConfig::builder()
            .user_data_dir(profile_dir)
            .request_timeout(self.settings.request_timeout())
            .window_size(1280, 1024)
            .arg("--disable-gpu")
            .arg("--no-zygote")
            .arg("--no-sandbox")
            .arg("--disable-dev-shm-usage");

        if !self.settings.headless {
            builder = builder.with_head();
        }
        if let Some(path) = &self.settings.executable {
            builder = builder.chrome_executable(path);
        }

        builder.build().map_err(ScraperError::BrowserLaunch)
    }

    async fn attach_cookie(page: &Page, session_cookie: &str) -> Result<(), ScraperError> {
        let cookie = CookieParam::builder()
            .name(SESSION_COOKIE_NAME)
            .value(session_cookie)
            .domain(SESSION_COOKIE_DOMAIN)
            .path("/")
            .build()
            .map_err(ScraperError::Cookie)?;

        page.execute(SetCookiesParams::new(vec![cookie]))
            .await
            .map_err(|e| ScraperError::Cookie(e.to_string()))?;
        Ok(())
    }

    async fn run_script<T: serde::de::DeserializeOwned>(
        &self,
        script: String,
        context: &str,
    ) -> Result<T, ScraperError> {
        let value = self.evaluate(&script).await?;
        serde_json::from_value(value).map_err(|source| ScraperError::Deserialize {
            context: context.to_string(),
            source,
        })
    }
}

#[derive(Serialize)]
struct ReadTextArgs<'a> {
    scope: Scope<'a>,
    selector: Option<&'a str>,
}

impl PageDriver for ChromeDriver {
    async fn initialize(&mut self, session_cookie: &str) -> Result<(), ScraperError> {
        if self.session.is_some() {
            return Ok(());
        }

        let profile_dir = Self::profile_dir()?;
        tracing::info!(
            headless = self.settings.headless,
            profile_dir = %profile_dir.path().display(),
            "launching browser"
        );
        let config = self.browser_config(profile_dir.path())?;
        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| ScraperError::BrowserLaunch(e.to_string()))?;

        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    tracing::debug!(error = %e, "browser handler event error");
                }
            }
        });

        let page = match browser.new_page("about:blank").await {
            Ok(page) => page,
            Err(e) => {
                handler.abort();
                return Err(ScraperError::BrowserLaunch(format!(
                    "failed to open page: {e}"
                )));
            }
        };

        let session = Session {
            browser,
            page,
            handler,
            _profile_dir: profile_dir,
        };
        if let Err(e) = Self::attach_cookie(&session.page, session_cookie).await {
            self.session = Some(session);
            return Err(e);
        }
        tracing::debug!("session cookie attached");

        self.session = Some(session);
        Ok(())
    }

    async fn navigate(&self, url: &str, timeout: Duration) -> Result<(), ScraperError> {
        let page = self.page()?;
        tracing::info!(url, "navigating");

        let navigation_failed = |reason: String| ScraperError::Navigation {
            url: url.to_string(),
            reason,
        };
        let load = async {
            let response = page
                .execute(NavigateParams::new(url))
                .await
                .map_err(|e| navigation_failed(e.to_string()))?;
            if let Some(reason) = response.result.error_text.clone() {
                return Err(navigation_failed(reason));
            }
            // Only DOM readiness is awaited; late subresources are ignored.
            let ready = scripts::dom_ready();
            let ready_in_time = poll_until(timeout, READY_POLL_INTERVAL, || {
                self.run_script::<bool>(ready.clone(), "document ready state")
            })
            .await;
            Ok::<bool, ScraperError>(ready_in_time)
        };

        match tokio::time::timeout(timeout, load).await {
            Ok(Ok(true)) => Ok(()),
            Ok(Err(e)) => Err(e),
            Ok(Ok(false)) | Err(_) => Err(ScraperError::NavigationTimeout {
                url: url.to_string(),
                timeout_secs: timeout.as_secs(),
            }),
        }
    }

    async fn wait_for_selector(&self, selector: &str, timeout: Duration) -> Result<(), ScraperError> {
        self.page()?;
        let script = scripts::selector_present(selector)?;
        let found = poll_until(timeout, SELECTOR_POLL_INTERVAL, || {
            self.run_script::<bool>(script.clone(), selector)
        })
        .await;

        if found {
            Ok(())
        } else {
            Err(ScraperError::SelectorNotFound {
                selector: selector.to_string(),
            })
        }
    }

    async fn scroll_to_bottom(&self) -> Result<(), ScraperError> {
        self.evaluate(&scripts::scroll_to_bottom()).await.map(|_| ())
    }

    async fn document_height(&self) -> Result<u64, ScraperError> {
        let height: f64 = self
            .run_script(scripts::document_height(), "document height")
            .await?;
        // scrollHeight is a non-negative integer in practice.
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        Ok(height.max(0.0) as u64)
    }

    async fn click(&self, target: ClickTarget<'_>, timeout: Duration) -> Result<bool, ScraperError> {
        let script = scripts::click(&target)?;
        match tokio::time::timeout(timeout, self.run_script::<bool>(script, target.selector)).await
        {
            Ok(result) => result,
            Err(_) => Err(ScraperError::Timeout {
                action: format!("click on {}", target.selector),
            }),
        }
    }

    async fn read_text(
        &self,
        scope: Scope<'_>,
        selector: Option<&str>,
    ) -> Result<Option<String>, ScraperError> {
        let script = scripts::read_text(&ReadTextArgs { scope, selector })?;
        self.run_script(script, selector.unwrap_or("scope text"))
            .await
    }

    async fn collect_items(
        &self,
        query: ItemQuery<'_>,
    ) -> Result<Option<Vec<Vec<String>>>, ScraperError> {
        let script = scripts::collect_items(&query)?;
        self.run_script(script, query.item).await
    }

    async fn evaluate(&self, script: &str) -> Result<serde_json::Value, ScraperError> {
        let page = self.page()?;
        let params = EvaluateParams::builder()
            .expression(script)
            .await_promise(true)
            .return_by_value(true)
            .build()
            .map_err(|reason| ScraperError::ScriptEvaluation { reason })?;

        let result = page
            .evaluate_expression(params)
            .await
            .map_err(|e| ScraperError::ScriptEvaluation {
                reason: e.to_string(),
            })?;

        Ok(result.value().cloned().unwrap_or(serde_json::Value::Null))
    }

    async fn shutdown(&mut self) -> Result<(), ScraperError> {
        let Some(mut session) = self.session.take() else {
            return Ok(());
        };

        tracing::info!("closing browser");
        let closed = session.browser.close().await;
        if let Err(e) = session.browser.wait().await {
            tracing::debug!(error = %e, "browser process wait failed");
        }
        session.handler.abort();

        closed
            .map(|_| ())
            .map_err(|e| ScraperError::BrowserLaunch(format!("failed to close browser: {e}")))
    }
}

/// Re-runs `check` every `interval` until it reports `true` or `timeout`
/// elapses. A failed check counts as "not yet": the page may be between
/// documents, which destroys the evaluation context.
async fn poll_until<F, Fut>(timeout: Duration, interval: Duration, mut check: F) -> bool
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<bool, ScraperError>>,
{
    let deadline = Instant::now() + timeout;
    loop {
        match check().await {
            Ok(true) => return true,
            Ok(false) => {}
            Err(e) => tracing::debug!(error = %e, "page check failed, retrying"),
        }
        if Instant::now() >= deadline {
            return false;
        }
        tokio::time::sleep(interval).await;
    }
}
