//! Background scrape tasks.

use std::sync::Arc;

use liscrape_core::{AppConfig, ScrapeRequest, TaskState};
use liscrape_scraper::{BrowserSettings, ChromeDriver, PageDriver, ProfileScraper, ScrapePolicy};
use liscrape_store::{FileStore, ProfileStore, TaskStore};
use tokio::task::JoinHandle;
use uuid::Uuid;

/// Browser and timing settings shared by every scrape the server starts.
#[derive(Debug, Clone)]
pub struct ScrapeSettings {
    pub browser: BrowserSettings,
    pub policy: ScrapePolicy,
}

impl ScrapeSettings {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            browser: BrowserSettings::from_app_config(config),
            policy: ScrapePolicy::from_app_config(config),
        }
    }
}

/// Runs one scrape on its own browser in the background.
pub fn spawn_scrape(
    store: Arc<FileStore>,
    settings: Arc<ScrapeSettings>,
    task_id: Uuid,
    profile_id: String,
    request: ScrapeRequest,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let scraper = ProfileScraper::new(
            ChromeDriver::new(settings.browser.clone()),
            settings.policy,
        );
        run_scrape_task(store.as_ref(), task_id, &profile_id, &request, scraper).await;
    })
}

/// Drives a queued task to `completed` or `error`.
///
/// The scraped record is merged into the stored profile only when it carries
/// at least one field.
pub async fn run_scrape_task<S, D>(
    store: &S,
    task_id: Uuid,
    profile_id: &str,
    request: &ScrapeRequest,
    scraper: ProfileScraper<D>,
) where
    S: ProfileStore + TaskStore,
    D: PageDriver,
{
    if let Err(e) = store.advance_task(task_id, TaskState::Running, None).await {
        tracing::error!(task_id = %task_id, error = %e, "could not start scrape task");
        return;
    }
    tracing::info!(task_id = %task_id, profile_id, "scrape started");

    let outcome = match scraper.scrape(request).await {
        Ok(record) if record.is_empty() => {
            tracing::warn!(task_id = %task_id, profile_id, "scrape returned no data; nothing saved");
            Ok(())
        }
        Ok(record) => store
            .merge_profile(profile_id, &record)
            .await
            .map(|_| ())
            .map_err(|e| e.to_string()),
        Err(e) => Err(e.to_string()),
    };

    let (state, error) = match outcome {
        Ok(()) => {
            tracing::info!(task_id = %task_id, profile_id, "scrape completed");
            (TaskState::Completed, None)
        }
        Err(message) => {
            tracing::warn!(task_id = %task_id, profile_id, error = %message, "scrape failed");
            (TaskState::Error, Some(message))
        }
    };

    if let Err(e) = store.advance_task(task_id, state, error).await {
        tracing::error!(task_id = %task_id, error = %e, "could not record scrape outcome");
    }
}

#[cfg(test)]
#[path = "jobs_test.rs"]
mod tests;
