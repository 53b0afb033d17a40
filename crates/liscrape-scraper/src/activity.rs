//! Extractors for the recent-activity feeds: posts, comments, reactions.

use liscrape_core::{owner_slug_from_url, profile_subpage, CommentItem, PostItem, ReactionItem};

use crate::driver::{ClickTarget, ItemQuery, PageDriver, Scope};
use crate::error::ScraperError;
use crate::parse::{self, RawComment};
use crate::policy::ScrapePolicy;
use crate::scroll;

pub const POSTS_PATH: &str = "recent-activity/all/";
pub const COMMENTS_PATH: &str = "recent-activity/comments/";
pub const REACTIONS_PATH: &str = "recent-activity/reactions/";

pub const POST_CARD: &str = "div[data-urn*='urn:li:activity:']";
pub const FEED_CARD: &str = "div.feed-shared-update-v2";
pub const CARD_TEXT: &str = ".update-components-text";
pub const REACTION_ACTOR: &str = ".feed-shared-actor__sub-description.t-12.t-normal.t-black--light";
pub const LOAD_MORE_BUTTON: &str = "button.scaffold-finite-scroll__load-button";

/// Collects every comment block on the comments feed together with the
/// context of the card it sits on. Ownership is decided afterwards by
/// [`parse::select_owner_comments`].
pub const COMMENTS_SCRIPT: &str = r#"(() => {
  const textOf = (el) => (el ? el.innerText.trim() : null);
  const results = [];
  document.querySelectorAll('div.feed-shared-update-v2').forEach((card) => {
    const postText = textOf(card.querySelector('div.update-components-text'));
    const timestamp = textOf(card.querySelector('time'));
    const postAuthor = textOf(card.querySelector(
      "div.update-components-header a[href*='/company/'], div.update-components-header a[href*='/in/']"));
    card.querySelectorAll('span.comments-comment-item__main-content').forEach((commentEl) => {
      const container = commentEl.closest('li');
      const authorHrefs = container
        ? Array.from(container.querySelectorAll("a[href*='/in/']"))
            .map((a) => a.getAttribute('href'))
            .filter((href) => !!href)
        : [];
      results.push({
        commentText: commentEl.innerText.trim(),
        authorHrefs,
        postText,
        timestamp,
        postAuthor,
      });
    });
  });
  return results;
})()"#;

/// # Errors
///
/// Returns a navigation or selector error when the feed is unavailable, or
/// the driver error if scrolling or querying fails.
pub async fn posts<D: PageDriver>(
    driver: &D,
    policy: &ScrapePolicy,
    profile_url: &str,
) -> Result<Vec<PostItem>, ScraperError> {
    open_feed(driver, policy, profile_url, POSTS_PATH, POST_CARD).await?;
    let outcome = scroll::load_all(driver, &policy.scroll, None).await?;
    tracing::debug!(rounds = outcome.rounds, settled = outcome.settled, "posts feed loaded");

    let cards = driver
        .collect_items(ItemQuery::texts(Scope::Document, POST_CARD, CARD_TEXT))
        .await?
        .unwrap_or_default();
    let posts: Vec<PostItem> = cards.into_iter().filter_map(parse::parse_post).collect();
    tracing::info!(count = posts.len(), "collected posts");
    Ok(posts)
}

/// # Errors
///
/// Returns [`ScraperError::InvalidProfileUrl`] when the owner cannot be
/// identified from `profile_url`, a navigation or selector error when the
/// feed is unavailable, or the driver error if the extraction script fails.
pub async fn comments<D: PageDriver>(
    driver: &D,
    policy: &ScrapePolicy,
    profile_url: &str,
) -> Result<Vec<CommentItem>, ScraperError> {
    let owner = owner_slug_from_url(profile_url).ok_or_else(|| ScraperError::InvalidProfileUrl {
        url: profile_url.to_string(),
    })?;

    open_feed(driver, policy, profile_url, COMMENTS_PATH, FEED_CARD).await?;
    let outcome = scroll::load_all(
        driver,
        &policy.scroll,
        Some(ClickTarget::new(Scope::Document, LOAD_MORE_BUTTON)),
    )
    .await?;
    tracing::debug!(rounds = outcome.rounds, settled = outcome.settled, "comments feed loaded");

    let value = driver.evaluate(COMMENTS_SCRIPT).await?;
    let raw: Vec<RawComment> =
        serde_json::from_value(value).map_err(|source| ScraperError::Deserialize {
            context: "comment blocks".to_string(),
            source,
        })?;
    let total = raw.len();

    let comments = parse::select_owner_comments(raw, &owner);
    tracing::info!(count = comments.len(), total, owner = %owner, "collected comments");
    Ok(comments)
}

/// Reads the reactions feed as first rendered, without scrolling, up to
/// [`ScrapePolicy::reactions_limit`] cards.
///
/// # Errors
///
/// Returns a navigation or selector error when the feed is unavailable, or
/// the driver error if querying fails.
pub async fn reactions<D: PageDriver>(
    driver: &D,
    policy: &ScrapePolicy,
    profile_url: &str,
) -> Result<Vec<ReactionItem>, ScraperError> {
    let url = profile_subpage(profile_url, REACTIONS_PATH);
    driver.navigate(&url, policy.navigation_timeout).await?;
    driver
        .wait_for_selector(FEED_CARD, policy.reactions_selector_timeout)
        .await?;

    let actors = driver
        .collect_items(ItemQuery::texts(Scope::Document, FEED_CARD, REACTION_ACTOR))
        .await?
        .unwrap_or_default();
    let contents = driver
        .collect_items(ItemQuery::texts(Scope::Document, FEED_CARD, CARD_TEXT))
        .await?
        .unwrap_or_default();

    // Both queries walk the same cards in document order.
    let cards = actors.len().max(contents.len()).min(policy.reactions_limit);
    let reactions: Vec<ReactionItem> = (0..cards)
        .filter_map(|i| {
            let actor = actors.get(i).and_then(|texts| texts.first());
            let content = contents.get(i).and_then(|texts| texts.first());
            parse::parse_reaction(actor.map(String::as_str), content.map(String::as_str))
        })
        .collect();
    tracing::info!(count = reactions.len(), "collected reactions");
    Ok(reactions)
}

async fn open_feed<D: PageDriver>(
    driver: &D,
    policy: &ScrapePolicy,
    profile_url: &str,
    path: &str,
    card_selector: &str,
) -> Result<(), ScraperError> {
    let url = profile_subpage(profile_url, path);
    driver.navigate(&url, policy.navigation_timeout).await?;
    driver
        .wait_for_selector(card_selector, policy.selector_timeout)
        .await
}
