pub mod app_config;
pub mod config;
pub mod profile_url;
pub mod types;

use thiserror::Error;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use profile_url::{owner_slug_from_url, profile_id_from_url, profile_subpage};
pub use types::{
    ActivityFlags, CommentItem, EducationItem, ExperienceItem, LanguageItem, PostItem,
    ProfileRecord, ProfileSummary, PublicationItem, ReactionItem, ScrapeRequest, TaskState,
    TaskStatus, NOT_SPECIFIED,
};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
