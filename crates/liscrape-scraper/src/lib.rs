pub mod activity;
pub mod driver;
pub mod error;
pub mod orchestrator;
pub mod parse;
pub mod policy;
pub mod scroll;
pub mod sections;

pub use driver::{
    chrome::{BrowserSettings, ChromeDriver},
    ClickTarget, ItemQuery, PageDriver, Scope,
};
pub use error::ScraperError;
pub use orchestrator::ProfileScraper;
pub use policy::ScrapePolicy;
pub use scroll::{load_all, ScrollOutcome, ScrollPolicy, StagnationTracker};
