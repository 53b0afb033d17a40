//! One-shot scrape from the command line.

use liscrape_core::{profile_id_from_url, ActivityFlags, AppConfig, ScrapeRequest};
use liscrape_scraper::{BrowserSettings, ChromeDriver, ProfileScraper, ScrapePolicy};
use liscrape_store::{FileStore, ProfileStore};

/// Scrapes `url` in the foreground and merges the result into `store`.
///
/// Prints the merged document, or the empty record when nothing could be
/// extracted (in which case nothing is written).
///
/// # Errors
///
/// Returns an error if the URL names no profile, the browser session cannot
/// be established, or the merged document cannot be written.
pub(crate) async fn run_scrape(
    store: &FileStore,
    config: &AppConfig,
    url: &str,
    cookie: &str,
    activities: ActivityFlags,
) -> anyhow::Result<()> {
    let profile_id = profile_id_from_url(url)
        .ok_or_else(|| anyhow::anyhow!("'{url}' does not identify a LinkedIn profile"))?;
    let cookie = cookie.trim();
    anyhow::ensure!(!cookie.is_empty(), "session cookie must not be empty");

    let request = ScrapeRequest {
        profile_url: url.trim().to_string(),
        session_cookie: cookie.to_string(),
        activities,
    };
    let driver = ChromeDriver::new(BrowserSettings::from_app_config(config));
    let scraper = ProfileScraper::new(driver, ScrapePolicy::from_app_config(config));

    tracing::info!(profile_id = %profile_id, "scraping profile");
    let record = scraper.scrape(&request).await?;

    if record.is_empty() {
        tracing::warn!(profile_id = %profile_id, "scrape returned no data; nothing saved");
        return crate::print_json(&record);
    }

    let document = store.merge_profile(&profile_id, &record).await?;
    tracing::info!(
        profile_id = %profile_id,
        path = %store.root().display(),
        "profile saved"
    );
    crate::print_json(&document)
}
