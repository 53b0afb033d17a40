//! Runs every extraction stage for one profile on one browser session.

use liscrape_core::{ProfileRecord, ScrapeRequest, NOT_SPECIFIED};

use crate::driver::PageDriver;
use crate::error::ScraperError;
use crate::policy::ScrapePolicy;
use crate::{activity, sections};

/// Scrapes a single profile with a dedicated driver.
///
/// Stages run strictly in sequence on one page: the profile itself, the full
/// publications list, then each enabled activity feed. A failing stage is
/// logged and contributes nothing; it never aborts the stages after it.
pub struct ProfileScraper<D: PageDriver> {
    driver: D,
    policy: ScrapePolicy,
}

impl<D: PageDriver> ProfileScraper<D> {
    pub fn new(driver: D, policy: ScrapePolicy) -> Self {
        Self { driver, policy }
    }

    /// Runs the scrape and shuts the driver down.
    ///
    /// # Errors
    ///
    /// Returns the driver error only when the browser session cannot be
    /// established. Extraction failures are logged and yield partial data.
    pub async fn scrape(mut self, request: &ScrapeRequest) -> Result<ProfileRecord, ScraperError> {
        let result = self.run(request).await;
        if let Err(e) = self.driver.shutdown().await {
            tracing::warn!(error = %e, "browser shutdown failed");
        }
        result
    }

    async fn run(&mut self, request: &ScrapeRequest) -> Result<ProfileRecord, ScraperError> {
        self.driver.initialize(&request.session_cookie).await?;

        let url = request.profile_url.as_str();
        let mut record = ProfileRecord::default();

        if let Some(profile) = settle("profile", self.profile_page(url).await) {
            record.merge(profile);
        }

        if let Some(items) = settle(
            "full_publications",
            sections::full_publications(&self.driver, &self.policy, url).await,
        ) {
            if !items.is_empty() {
                record.publications = Some(items);
            }
        }

        let flags = request.activities;
        if flags.posts {
            record.posts = non_empty(settle(
                "posts",
                activity::posts(&self.driver, &self.policy, url).await,
            ))
            .or(record.posts);
        }
        if flags.comments {
            record.comments = non_empty(settle(
                "comments",
                activity::comments(&self.driver, &self.policy, url).await,
            ))
            .or(record.comments);
        }
        if flags.reactions {
            record.reactions = non_empty(settle(
                "reactions",
                activity::reactions(&self.driver, &self.policy, url).await,
            ))
            .or(record.reactions);
        }

        tracing::info!(url, empty = record.is_empty(), "scrape finished");
        Ok(record)
    }

    /// Profile root page: header plus every summary section. Only a failure
    /// to load the page or its header fails the stage; each section falls
    /// back to its default on its own.
    async fn profile_page(&self, url: &str) -> Result<ProfileRecord, ScraperError> {
        let driver = &self.driver;
        let policy = &self.policy;

        driver.navigate(url, policy.navigation_timeout).await?;
        let summary = sections::summary(driver, policy).await?;

        let mut record = ProfileRecord::default();
        if let Some(summary) = summary {
            record.first_name = Some(summary.first_name);
            record.last_name = Some(summary.last_name);
            record.headline = summary.headline;
            record.location = Some(summary.location);
        }

        record.about = Some(
            settle("about", sections::about(driver, policy).await)
                .flatten()
                .unwrap_or_default(),
        );
        record.services = Some(
            settle("services", sections::services(driver).await)
                .flatten()
                .unwrap_or_else(|| NOT_SPECIFIED.to_string()),
        );
        record.experience = Some(
            settle("experience", sections::experience(driver, policy).await)
                .flatten()
                .unwrap_or_default(),
        );
        record.publications = Some(
            settle("publications", sections::publications(driver).await)
                .flatten()
                .unwrap_or_default(),
        );
        record.languages = Some(
            settle("languages", sections::languages(driver).await)
                .flatten()
                .unwrap_or_default(),
        );
        record.education = Some(
            settle("education", sections::education(driver).await)
                .flatten()
                .unwrap_or_default(),
        );

        Ok(record)
    }
}

/// Turns a stage result into its value, logging the failure instead of
/// propagating it.
fn settle<T>(stage: &str, result: Result<T, ScraperError>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) if e.is_page_unavailable() => {
            tracing::warn!(stage, error = %e, "page unavailable, skipping stage");
            None
        }
        Err(e) => {
            tracing::warn!(stage, error = %e, "stage failed");
            None
        }
    }
}

fn non_empty<T>(items: Option<Vec<T>>) -> Option<Vec<T>> {
    items.filter(|items| !items.is_empty())
}
