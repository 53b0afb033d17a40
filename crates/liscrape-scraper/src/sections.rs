//! Extractors for the profile page and its publications details page.
//!
//! Section extractors return `Ok(None)` when the section is missing from the
//! page; the orchestrator decides what an absent section defaults to.

use liscrape_core::{
    profile_subpage, EducationItem, ExperienceItem, LanguageItem, PublicationItem, NOT_SPECIFIED,
};

use crate::driver::{click_quietly, ClickTarget, ItemQuery, PageDriver, Scope};
use crate::error::ScraperError;
use crate::parse;
use crate::policy::ScrapePolicy;
use crate::scroll;

pub const NAME_SELECTOR: &str = "h1";
pub const HEADLINE_SELECTOR: &str = "div.text-body-medium";
pub const LOCATION_SELECTOR: &str = "span.text-body-small.inline.t-black--light.break-words";
pub const LIST_ITEM: &str = "li.artdeco-list__item";
/// Screen-reader-hidden spans carry the visible text of list entries.
pub const VISIBLE_TEXT: &str = "span[aria-hidden='true']";
/// Present only in real position entries, not in grouped-role headers.
pub const EXPERIENCE_MARKER: &str = "span.t-14.t-normal.t-black--light";
pub const INLINE_SHOW_MORE: &str = "button.inline-show-more-text__button";

pub const PUBLICATIONS_PATH: &str = "details/publications/";

/// Name, headline and location from the profile header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    pub first_name: String,
    pub last_name: String,
    pub headline: Option<String>,
    pub location: String,
}

/// Reads the profile header once the name heading has rendered.
///
/// # Errors
///
/// Returns [`ScraperError::SelectorNotFound`] if the heading never appears,
/// or the driver error if reading fails.
pub async fn summary<D: PageDriver>(
    driver: &D,
    policy: &ScrapePolicy,
) -> Result<Option<Summary>, ScraperError> {
    driver
        .wait_for_selector(NAME_SELECTOR, policy.navigation_timeout)
        .await?;

    let Some(full_name) = driver.read_text(Scope::Document, Some(NAME_SELECTOR)).await? else {
        return Ok(None);
    };
    let (first_name, last_name) = parse::split_full_name(&full_name);

    let headline = driver
        .read_text(Scope::Document, Some(HEADLINE_SELECTOR))
        .await?
        .map(|text| text.trim().to_string());
    let location = driver
        .read_text(Scope::Document, Some(LOCATION_SELECTOR))
        .await?
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
        .unwrap_or_else(|| NOT_SPECIFIED.to_string());

    Ok(Some(Summary {
        first_name,
        last_name,
        headline,
        location,
    }))
}

/// # Errors
///
/// Returns the driver error if reading the section fails.
pub async fn about<D: PageDriver>(
    driver: &D,
    policy: &ScrapePolicy,
) -> Result<Option<String>, ScraperError> {
    let scope = Scope::section("About");
    click_quietly(
        driver,
        ClickTarget::new(scope, "button").with_text("See more"),
        policy.click_timeout,
    )
    .await;

    let text = driver.read_text(scope, None).await?;
    Ok(text.map(|text| parse::parse_about(&parse::split_lines(&text))))
}

/// # Errors
///
/// Returns the driver error if reading the section fails.
pub async fn services<D: PageDriver>(driver: &D) -> Result<Option<String>, ScraperError> {
    let text = driver.read_text(Scope::section("Services"), None).await?;
    Ok(text
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty()))
}

/// # Errors
///
/// Returns the driver error if querying the section fails.
pub async fn experience<D: PageDriver>(
    driver: &D,
    policy: &ScrapePolicy,
) -> Result<Option<Vec<ExperienceItem>>, ScraperError> {
    let scope = Scope::section("Experience");
    click_quietly(
        driver,
        ClickTarget::new(scope, "button").with_text("Show all"),
        policy.click_timeout,
    )
    .await;
    click_quietly(
        driver,
        ClickTarget::new(scope, INLINE_SHOW_MORE).every(),
        policy.item_click_timeout,
    )
    .await;

    let items = driver
        .collect_items(ItemQuery::texts(scope, LIST_ITEM, VISIBLE_TEXT).having(EXPERIENCE_MARKER))
        .await?;
    Ok(items.map(|items| items.into_iter().filter_map(parse::parse_experience).collect()))
}

/// # Errors
///
/// Returns the driver error if querying the section fails.
pub async fn education<D: PageDriver>(
    driver: &D,
) -> Result<Option<Vec<EducationItem>>, ScraperError> {
    let items = driver
        .collect_items(ItemQuery::texts(
            Scope::section("Education"),
            LIST_ITEM,
            VISIBLE_TEXT,
        ))
        .await?;
    Ok(items.map(|items| items.into_iter().filter_map(parse::parse_education).collect()))
}

/// # Errors
///
/// Returns the driver error if querying the section fails.
pub async fn languages<D: PageDriver>(
    driver: &D,
) -> Result<Option<Vec<LanguageItem>>, ScraperError> {
    let items = driver
        .collect_items(ItemQuery::lines(Scope::section("Languages"), "li"))
        .await?;
    Ok(items.map(|items| items.into_iter().filter_map(parse::parse_language).collect()))
}

/// Publications as listed in the profile page's own section.
///
/// # Errors
///
/// Returns the driver error if querying the section fails.
pub async fn publications<D: PageDriver>(
    driver: &D,
) -> Result<Option<Vec<PublicationItem>>, ScraperError> {
    let items = driver
        .collect_items(ItemQuery::lines(Scope::section("Publications"), LIST_ITEM))
        .await?;
    Ok(items.map(parse_publications))
}

/// The complete publications list from the details page, which the profile
/// page truncates.
///
/// # Errors
///
/// Returns a navigation or selector error when the details page is
/// unavailable, or the driver error if scrolling or querying fails.
pub async fn full_publications<D: PageDriver>(
    driver: &D,
    policy: &ScrapePolicy,
    profile_url: &str,
) -> Result<Vec<PublicationItem>, ScraperError> {
    let url = profile_subpage(profile_url, PUBLICATIONS_PATH);
    driver.navigate(&url, policy.navigation_timeout).await?;
    driver
        .wait_for_selector(LIST_ITEM, policy.selector_timeout)
        .await?;
    scroll::load_all(driver, &policy.scroll, None).await?;

    let items = driver
        .collect_items(ItemQuery::lines(Scope::Document, LIST_ITEM))
        .await?;
    let publications = items.map(parse_publications).unwrap_or_default();
    tracing::info!(count = publications.len(), "collected publications");
    Ok(publications)
}

fn parse_publications(items: Vec<Vec<String>>) -> Vec<PublicationItem> {
    items
        .into_iter()
        .filter_map(parse::parse_publication)
        .collect()
}
