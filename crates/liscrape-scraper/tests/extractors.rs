mod support;

use std::time::{Duration, Instant};

use liscrape_core::NOT_SPECIFIED;
use liscrape_scraper::{
    activity, load_all, sections, ClickTarget, Scope, ScraperError, ScrollPolicy,
};
use serde_json::json;
use support::{fast_policy, subpage, FakeDriver, FakePage, PROFILE_URL};

const ARIA: Option<&str> = Some(sections::VISIBLE_TEXT);

fn profile_driver(page: FakePage) -> FakeDriver {
    let driver = FakeDriver::new().with_page(PROFILE_URL, page);
    driver.open(PROFILE_URL);
    driver
}

// -----------------------------------------------------------------------
// scroll loader
// -----------------------------------------------------------------------

#[tokio::test]
async fn scroll_stops_once_height_settles() {
    let driver = profile_driver(FakePage::new().with_heights(&[100, 200, 200, 200, 300]));
    let outcome = load_all(&driver, &fast_policy().scroll, None)
        .await
        .expect("scroll");

    assert_eq!(outcome.rounds, 4);
    assert_eq!(outcome.final_height, 200);
    assert!(outcome.settled);
    assert_eq!(driver.log().lock().unwrap().scrolls, 4);
}

#[tokio::test]
async fn scroll_respects_round_budget() {
    let driver = profile_driver(FakePage::new().with_heights(&[100, 200, 300, 400, 500]));
    let policy = ScrollPolicy {
        max_rounds: 3,
        ..fast_policy().scroll
    };
    let outcome = load_all(&driver, &policy, None).await.expect("scroll");

    assert_eq!(outcome.rounds, 3);
    assert_eq!(outcome.final_height, 300);
    assert!(!outcome.settled);
}

#[tokio::test]
async fn scroll_clicks_load_more_every_round() {
    // The first reading of 100 counts as growth from the initial 0.
    let driver = profile_driver(FakePage::new().with_heights(&[100, 100]));
    let target = ClickTarget::new(Scope::Document, activity::LOAD_MORE_BUTTON);
    let outcome = load_all(&driver, &fast_policy().scroll, Some(target))
        .await
        .expect("scroll");

    assert_eq!(outcome.rounds, 3);
    assert!(outcome.settled);
    let log = driver.log();
    let log = log.lock().unwrap();
    assert_eq!(log.clicks, vec![activity::LOAD_MORE_BUTTON; 3]);
}

fn paced_scroll() -> ScrollPolicy {
    ScrollPolicy {
        delay: Duration::from_millis(80),
        ..fast_policy().scroll
    }
}

#[tokio::test]
async fn scroll_waits_again_only_after_a_real_click() {
    let page = FakePage::new()
        .with_heights(&[0, 0])
        .with_clickable(activity::LOAD_MORE_BUTTON);
    let driver = profile_driver(page);
    let target = ClickTarget::new(Scope::Document, activity::LOAD_MORE_BUTTON);
    let policy = paced_scroll();

    let started = Instant::now();
    let outcome = load_all(&driver, &policy, Some(target)).await.expect("scroll");

    assert_eq!(outcome.rounds, 2);
    assert!(started.elapsed() >= policy.delay * 4);
}

#[tokio::test]
async fn scroll_skips_extra_wait_when_load_more_is_absent() {
    let driver = profile_driver(FakePage::new().with_heights(&[0, 0]));
    let target = ClickTarget::new(Scope::Document, activity::LOAD_MORE_BUTTON);
    let policy = paced_scroll();

    let started = Instant::now();
    let outcome = load_all(&driver, &policy, Some(target)).await.expect("scroll");

    assert_eq!(outcome.rounds, 2);
    assert_eq!(driver.log().lock().unwrap().clicks.len(), 2);
    assert!(started.elapsed() < policy.delay * 4);
}

// -----------------------------------------------------------------------
// profile sections
// -----------------------------------------------------------------------

#[tokio::test]
async fn summary_splits_name_and_defaults_location() {
    let driver = profile_driver(
        FakePage::new()
            .with_selector(sections::NAME_SELECTOR)
            .with_text("document", Some(sections::NAME_SELECTOR), "Jane van Doe")
            .with_text(
                "document",
                Some(sections::HEADLINE_SELECTOR),
                " Data Engineer ",
            ),
    );
    let summary = sections::summary(&driver, &fast_policy())
        .await
        .expect("summary")
        .expect("present");

    assert_eq!(summary.first_name, "Jane");
    assert_eq!(summary.last_name, "van Doe");
    assert_eq!(summary.headline.as_deref(), Some("Data Engineer"));
    assert_eq!(summary.location, NOT_SPECIFIED);
}

#[tokio::test]
async fn summary_fails_when_heading_never_renders() {
    let driver = profile_driver(FakePage::new());
    let err = sections::summary(&driver, &fast_policy())
        .await
        .expect_err("no heading");
    assert!(matches!(err, ScraperError::SelectorNotFound { .. }));
}

#[tokio::test]
async fn about_expands_and_parses_section_text() {
    let driver = profile_driver(FakePage::new().with_text(
        "About",
        None,
        "About\nI build pipelines.\n…see more\nTop skills\nRust",
    ));
    let about = sections::about(&driver, &fast_policy())
        .await
        .expect("about");

    assert_eq!(about.as_deref(), Some("I build pipelines. …see more"));
    assert_eq!(driver.log().lock().unwrap().clicks, vec!["button"]);
}

#[tokio::test]
async fn missing_sections_are_none_not_errors() {
    let driver = profile_driver(FakePage::new());
    let policy = fast_policy();

    assert!(sections::about(&driver, &policy).await.unwrap().is_none());
    assert!(sections::services(&driver).await.unwrap().is_none());
    assert!(sections::experience(&driver, &policy).await.unwrap().is_none());
    assert!(sections::education(&driver).await.unwrap().is_none());
    assert!(sections::languages(&driver).await.unwrap().is_none());
    assert!(sections::publications(&driver).await.unwrap().is_none());
}

#[tokio::test]
async fn empty_sections_yield_empty_lists() {
    let driver = profile_driver(
        FakePage::new()
            .with_items("Languages", "li", None, vec![])
            .with_items("Education", sections::LIST_ITEM, ARIA, vec![]),
    );

    assert_eq!(sections::languages(&driver).await.unwrap(), Some(vec![]));
    assert_eq!(sections::education(&driver).await.unwrap(), Some(vec![]));
}

#[tokio::test]
async fn experience_expands_items_and_parses_tokens() {
    let driver = profile_driver(FakePage::new().with_items(
        "Experience",
        sections::LIST_ITEM,
        ARIA,
        vec![
            vec!["Staff Engineer", "Acme", "2020 - Present · 4 yrs", "Berlin", "Platform"],
            vec!["Engineer", "Initech", "2016 - 2020", "4 yrs"],
            vec![],
        ],
    ));
    let items = sections::experience(&driver, &fast_policy())
        .await
        .expect("experience")
        .expect("present");

    assert_eq!(items.len(), 2);
    assert_eq!(items[0].location.as_deref(), Some("Berlin"));
    assert_eq!(items[0].description, "Platform");
    assert!(items[1].location.is_none());
    assert_eq!(items[1].description, "4 yrs");

    let log = driver.log();
    let log = log.lock().unwrap();
    assert_eq!(log.clicks, vec!["button", sections::INLINE_SHOW_MORE]);
}

#[tokio::test]
async fn languages_dedup_repeated_lines() {
    let driver = profile_driver(FakePage::new().with_items(
        "Languages",
        "li",
        None,
        vec![vec!["English", "English", "Native"], vec!["German"]],
    ));
    let items = sections::languages(&driver)
        .await
        .expect("languages")
        .expect("present");

    assert_eq!(items[0].language, "English");
    assert_eq!(items[0].proficiency, "Native");
    assert_eq!(items[1].proficiency, NOT_SPECIFIED);
}

#[tokio::test]
async fn full_publications_skip_recommendations() {
    let url = subpage(sections::PUBLICATIONS_PATH);
    let driver = FakeDriver::new().with_page(
        &url,
        FakePage::new()
            .with_selector(sections::LIST_ITEM)
            .with_heights(&[500, 500])
            .with_items(
                "document",
                sections::LIST_ITEM,
                None,
                vec![
                    vec!["Query Planning at Scale", "VLDB", "Aug 2021"],
                    vec!["More profiles for you"],
                    vec!["John Smith", "· 2nd", "Engineer"],
                    vec!["Index Tuning", "SIGMOD"],
                ],
            ),
    );
    let items = sections::full_publications(&driver, &fast_policy(), PROFILE_URL)
        .await
        .expect("publications");

    let titles: Vec<_> = items.iter().map(|p| p.title.as_str()).collect();
    assert_eq!(titles, vec!["Query Planning at Scale", "Index Tuning"]);
    assert!(items[1].date.is_none());
    assert_eq!(driver.log().lock().unwrap().navigations, vec![url]);
}

#[tokio::test]
async fn full_publications_report_missing_list() {
    let driver = FakeDriver::new();
    let err = sections::full_publications(&driver, &fast_policy(), PROFILE_URL)
        .await
        .expect_err("no list");
    assert!(err.is_page_unavailable());
}

// -----------------------------------------------------------------------
// activity feeds
// -----------------------------------------------------------------------

#[tokio::test]
async fn posts_split_commentary_and_repost() {
    let driver = FakeDriver::new().with_page(
        &subpage(activity::POSTS_PATH),
        FakePage::new()
            .with_selector(activity::POST_CARD)
            .with_heights(&[800, 800])
            .with_items(
                "document",
                activity::POST_CARD,
                Some(activity::CARD_TEXT),
                vec![
                    vec!["Shipping today!"],
                    vec![],
                    vec!["Worth a read", "Original post"],
                ],
            ),
    );
    let posts = activity::posts(&driver, &fast_policy(), PROFILE_URL)
        .await
        .expect("posts");

    assert_eq!(posts.len(), 2);
    assert!(posts[0].re_post.is_none());
    assert_eq!(posts[1].re_post.as_deref(), Some("Original post"));
}

#[tokio::test]
async fn posts_feed_without_cards_is_empty() {
    let driver = FakeDriver::new().with_page(
        &subpage(activity::POSTS_PATH),
        FakePage::new().with_selector(activity::POST_CARD),
    );
    let posts = activity::posts(&driver, &fast_policy(), PROFILE_URL)
        .await
        .expect("posts");
    assert!(posts.is_empty());
}

#[tokio::test]
async fn comments_keep_only_owner_blocks() {
    let driver = FakeDriver::new().with_page(
        &subpage(activity::COMMENTS_PATH),
        FakePage::new()
            .with_selector(activity::FEED_CARD)
            .with_heights(&[400, 400])
            .with_script_result(json!([
                {
                    "commentText": "Congrats on the launch!",
                    "authorHrefs": ["https://www.linkedin.com/in/jane-doe/"],
                    "postText": "We launched",
                    "timestamp": "3d",
                    "postAuthor": "Acme Corp"
                },
                {
                    "commentText": "Thanks Jane",
                    "authorHrefs": ["https://www.linkedin.com/in/john-smith/"],
                    "postText": "We launched",
                    "timestamp": "3d",
                    "postAuthor": "Acme Corp"
                }
            ])),
    );
    let comments = activity::comments(&driver, &fast_policy(), PROFILE_URL)
        .await
        .expect("comments");

    assert_eq!(comments.len(), 1);
    assert_eq!(comments[0].comment_text, "Congrats on the launch!");
    assert_eq!(comments[0].timestamp.as_deref(), Some("3d"));

    let log = driver.log();
    assert!(log
        .lock()
        .unwrap()
        .clicks
        .iter()
        .all(|c| c == activity::LOAD_MORE_BUTTON));
}

#[tokio::test]
async fn comments_reject_malformed_script_output() {
    let driver = FakeDriver::new().with_page(
        &subpage(activity::COMMENTS_PATH),
        FakePage::new()
            .with_selector(activity::FEED_CARD)
            .with_script_result(json!({"unexpected": true})),
    );
    let err = activity::comments(&driver, &fast_policy(), PROFILE_URL)
        .await
        .expect_err("malformed");
    assert!(matches!(err, ScraperError::Deserialize { .. }));
}

#[tokio::test]
async fn reactions_never_exceed_limit() {
    let actors: Vec<Vec<&str>> = (0..30).map(|_| vec!["Jane likes this"]).collect();
    let contents: Vec<Vec<&str>> = (0..30).map(|_| vec!["Some post"]).collect();
    let driver = FakeDriver::new().with_page(
        &subpage(activity::REACTIONS_PATH),
        FakePage::new()
            .with_selector(activity::FEED_CARD)
            .with_items(
                "document",
                activity::FEED_CARD,
                Some(activity::REACTION_ACTOR),
                actors,
            )
            .with_items(
                "document",
                activity::FEED_CARD,
                Some(activity::CARD_TEXT),
                contents,
            ),
    );
    let reactions = activity::reactions(&driver, &fast_policy(), PROFILE_URL)
        .await
        .expect("reactions");

    assert_eq!(reactions.len(), 20);
    assert!(reactions
        .iter()
        .all(|r| r.liked_by.as_deref() == Some("Jane")));
    assert_eq!(driver.log().lock().unwrap().scrolls, 0);
}

#[tokio::test]
async fn reactions_pair_actor_and_content_by_card() {
    let driver = FakeDriver::new().with_page(
        &subpage(activity::REACTIONS_PATH),
        FakePage::new()
            .with_selector(activity::FEED_CARD)
            .with_items(
                "document",
                activity::FEED_CARD,
                Some(activity::REACTION_ACTOR),
                vec![vec!["Jane celebrates this"], vec![], vec!["Promoted"]],
            )
            .with_items(
                "document",
                activity::FEED_CARD,
                Some(activity::CARD_TEXT),
                vec![vec!["Milestone"], vec!["Only content"], vec![]],
            ),
    );
    let reactions = activity::reactions(&driver, &fast_policy(), PROFILE_URL)
        .await
        .expect("reactions");

    assert_eq!(reactions.len(), 2);
    assert_eq!(reactions[0].liked_by.as_deref(), Some("Jane"));
    assert_eq!(reactions[0].content.as_deref(), Some("Milestone"));
    assert!(reactions[1].liked_by.is_none());
    assert_eq!(reactions[1].content.as_deref(), Some("Only content"));
}
