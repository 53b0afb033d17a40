//! Text-to-record parsing for the profile and activity pages.
//!
//! Everything here is pure: the extractors fetch token lists through the
//! [`crate::PageDriver`] and hand them to these functions, which decide what
//! each token means.

use liscrape_core::{
    owner_slug_from_url, CommentItem, EducationItem, ExperienceItem, LanguageItem, PostItem,
    PublicationItem, ReactionItem, NOT_SPECIFIED,
};
use serde::Deserialize;

/// Actor phrases that mark a reaction card as "someone reacted to this".
///
/// English UI only; other locales yield content-only reactions.
pub const REACTION_PHRASES: [&str; 2] = ["likes this", "celebrates this"];

/// Splits text into trimmed, non-empty lines.
#[must_use]
pub fn split_lines(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Drops repeated lines, keeping the first occurrence of each.
///
/// Profile markup often renders a value twice (visible and screen-reader
/// copies), so `["English", "English", "Native"]` becomes
/// `["English", "Native"]`.
#[must_use]
pub fn dedup_preserving_order(lines: Vec<String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    lines
        .into_iter()
        .filter(|line| seen.insert(line.clone()))
        .collect()
}

/// Splits a display name at the first space into `(first, last)`.
#[must_use]
pub fn split_full_name(full_name: &str) -> (String, String) {
    let full_name = full_name.trim();
    match full_name.split_once(' ') {
        Some((first, rest)) => (first.to_string(), rest.trim().to_string()),
        None => (full_name.to_string(), String::new()),
    }
}

/// Extracts the biography from the About section's lines.
///
/// Lines before the `About` heading are skipped and the text ends at the
/// first line mentioning skills, which is where the section's footer begins.
#[must_use]
pub fn parse_about(lines: &[String]) -> String {
    let mut body = Vec::new();
    let mut in_body = false;

    for line in lines {
        if !in_body && line.eq_ignore_ascii_case("about") {
            in_body = true;
            continue;
        }
        if line.to_lowercase().contains("skills") {
            break;
        }
        if in_body {
            body.push(line.as_str());
        }
    }

    body.join(" ")
}

/// Whether a token is a date range or tenure (`"2019 - 2021 · 2 yrs"`)
/// rather than a location.
#[must_use]
pub fn looks_like_date_range(token: &str) -> bool {
    token.contains('·') || token.contains("yr")
}

/// Builds an experience entry from the item's tokens, in order: title,
/// company, date, optional location, then description.
#[must_use]
pub fn parse_experience(tokens: Vec<String>) -> Option<ExperienceItem> {
    let mut tokens = tokens.into_iter().peekable();
    let title = tokens.next()?;
    let company = tokens.next().unwrap_or_default();
    let date = tokens.next().unwrap_or_default();
    let location = tokens.next_if(|token| !looks_like_date_range(token));
    let description = tokens.collect::<Vec<_>>().join(" ");

    Some(ExperienceItem {
        title,
        company,
        date,
        location,
        description,
    })
}

#[must_use]
pub fn parse_education(tokens: Vec<String>) -> Option<EducationItem> {
    let mut tokens = tokens.into_iter();
    let school = tokens.next()?;
    let degree = tokens.next();
    let date = tokens.next();
    let description = tokens.collect::<Vec<_>>().join(" ");

    Some(EducationItem {
        school,
        degree,
        date,
        description,
    })
}

#[must_use]
pub fn parse_language(lines: Vec<String>) -> Option<LanguageItem> {
    let mut lines = dedup_preserving_order(lines).into_iter();
    let language = lines.next()?;
    let proficiency = lines.next().unwrap_or_else(|| NOT_SPECIFIED.to_string());
    Some(LanguageItem {
        language,
        proficiency,
    })
}

/// Recognises the "More profiles for you" recommendation blocks that share
/// list markup with real publications.
#[must_use]
pub fn is_recommendation_block(lines: &[String]) -> bool {
    let Some(first) = lines.first() else {
        return false;
    };
    first.contains("More profiles")
        || lines
            .iter()
            .skip(1)
            .take(2)
            .any(|line| line.starts_with('·'))
}

/// Builds a publication from its lines: title, publisher, date.
///
/// Returns `None` for empty items and recommendation blocks.
#[must_use]
pub fn parse_publication(lines: Vec<String>) -> Option<PublicationItem> {
    if is_recommendation_block(&lines) {
        return None;
    }
    let mut lines = lines.into_iter();
    Some(PublicationItem {
        title: lines.next()?,
        publisher: lines.next(),
        date: lines.next(),
    })
}

/// First text block is the member's own commentary; any further blocks
/// belong to the reshared post.
#[must_use]
pub fn parse_post(blocks: Vec<String>) -> Option<PostItem> {
    let mut blocks = blocks.into_iter();
    let user_commentary = blocks.next()?;
    let rest: Vec<String> = blocks.collect();
    let re_post = (!rest.is_empty()).then(|| rest.join("\n"));

    Some(PostItem {
        user_commentary,
        re_post,
    })
}

/// Builds a reaction from a card's actor line and content text.
///
/// Returns `None` when the card yields neither.
#[must_use]
pub fn parse_reaction(actor: Option<&str>, content: Option<&str>) -> Option<ReactionItem> {
    let liked_by = actor
        .filter(|text| REACTION_PHRASES.iter().any(|phrase| text.contains(phrase)))
        .and_then(|text| text.split(' ').next())
        .filter(|word| !word.is_empty())
        .map(str::to_string);
    let content = content
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(str::to_string);

    if liked_by.is_none() && content.is_none() {
        return None;
    }
    Some(ReactionItem { liked_by, content })
}

/// One comment block as reported by the comments page script, before the
/// ownership filter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawComment {
    pub comment_text: String,
    /// `href`s of the profile links in the comment's enclosing list item.
    pub author_hrefs: Vec<String>,
    pub post_text: Option<String>,
    pub timestamp: Option<String>,
    pub post_author: Option<String>,
}

/// Whether any of `hrefs` points at the `/in/<owner_slug>` profile.
#[must_use]
pub fn is_authored_by(hrefs: &[String], owner_slug: &str) -> bool {
    hrefs
        .iter()
        .filter(|href| href.contains("/in/"))
        .filter_map(|href| owner_slug_from_url(href))
        .any(|slug| slug == owner_slug)
}

/// Keeps the non-empty comments written by the profile owner.
#[must_use]
pub fn select_owner_comments(raw: Vec<RawComment>, owner_slug: &str) -> Vec<CommentItem> {
    raw.into_iter()
        .filter(|comment| is_authored_by(&comment.author_hrefs, owner_slug))
        .filter_map(|comment| {
            let comment_text = comment.comment_text.trim().to_string();
            if comment_text.is_empty() {
                return None;
            }
            Some(CommentItem {
                comment_text,
                post_text: non_blank(comment.post_text),
                timestamp: non_blank(comment.timestamp),
                post_author: non_blank(comment.post_author),
            })
        })
        .collect()
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
#[path = "parse_test.rs"]
mod tests;
