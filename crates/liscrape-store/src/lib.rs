//! Persistence for scraped profiles and scrape tasks.
//!
//! Profiles are stored as untyped JSON documents so that fields written by
//! older or newer scrapers survive a merge untouched. The `id` field is
//! derived from the storage key and injected on read; it is never persisted.

mod file;

use std::future::Future;
use std::path::PathBuf;

use liscrape_core::{ProfileRecord, ProfileSummary, TaskState, TaskStatus};
use serde_json::{Map, Value};
use thiserror::Error;
use uuid::Uuid;

pub use file::FileStore;

/// A stored profile document.
pub type ProfileDocument = Map<String, Value>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not encode {context}: {source}")]
    Serialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("corrupt document at {path}: {source}")]
    Deserialize {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid profile id \"{0}\"")]
    InvalidProfileId(String),

    #[error("task {0} not found")]
    TaskNotFound(Uuid),

    #[error("task {task_id} cannot move from {from} to {to}")]
    InvalidTaskTransition {
        task_id: Uuid,
        from: TaskState,
        to: TaskState,
    },
}

pub trait ProfileStore: Send + Sync {
    /// Returns the stored document with `id` injected, or `None` when no
    /// profile is stored under `id`.
    fn get_profile(
        &self,
        id: &str,
    ) -> impl Future<Output = Result<Option<ProfileDocument>, StoreError>> + Send;

    /// Upserts `record` into the stored document: every key `record` carries
    /// overwrites the stored value, every other stored key is kept. Returns
    /// the merged document with `id` injected.
    fn merge_profile(
        &self,
        id: &str,
        record: &ProfileRecord,
    ) -> impl Future<Output = Result<ProfileDocument, StoreError>> + Send;

    /// Summaries of every readable stored profile, ordered by id.
    fn list_profiles(&self) -> impl Future<Output = Result<Vec<ProfileSummary>, StoreError>> + Send;

    /// Profiles whose `first_name last_name headline` contains `query`,
    /// case-insensitively.
    fn search_profiles(
        &self,
        query: &str,
    ) -> impl Future<Output = Result<Vec<ProfileSummary>, StoreError>> + Send {
        let needle = query.trim().to_lowercase();
        async move {
            let profiles = self.list_profiles().await?;
            Ok(profiles
                .into_iter()
                .filter(|profile| summary_matches(profile, &needle))
                .collect())
        }
    }

    /// Verifies the backing storage is usable.
    fn check(&self) -> impl Future<Output = Result<(), StoreError>> + Send;
}

pub trait TaskStore: Send + Sync {
    /// Records a new task in the `queued` state.
    fn create_task(
        &self,
        profile_id: &str,
    ) -> impl Future<Output = Result<TaskStatus, StoreError>> + Send;

    fn get_task(
        &self,
        task_id: Uuid,
    ) -> impl Future<Output = Result<Option<TaskStatus>, StoreError>> + Send;

    /// Moves a task to `state`, recording `error` when given.
    ///
    /// Fails with [`StoreError::InvalidTaskTransition`] unless the move is
    /// allowed by [`TaskState::can_transition_to`].
    fn advance_task(
        &self,
        task_id: Uuid,
        state: TaskState,
        error: Option<String>,
    ) -> impl Future<Output = Result<TaskStatus, StoreError>> + Send;
}

/// Accepts ids produced by [`liscrape_core::profile_id_from_url`] and
/// rejects anything that could escape the data directory.
#[must_use]
pub fn is_valid_profile_id(id: &str) -> bool {
    !id.is_empty()
        && !id.chars().all(|c| c == '.')
        && id
            .chars()
            .all(|c| c.is_alphanumeric() || matches!(c, '-' | '_' | '.'))
}

/// Shallow key-overwrite merge of `record` into `document`. `id` is never
/// written into the document.
///
/// # Errors
///
/// Returns [`StoreError::Serialize`] if `record` cannot be encoded.
pub fn merge_into(document: &mut ProfileDocument, record: &ProfileRecord) -> Result<(), StoreError> {
    let encoded = serde_json::to_value(record).map_err(|source| StoreError::Serialize {
        context: "profile record".to_string(),
        source,
    })?;
    if let Value::Object(fields) = encoded {
        document.extend(fields);
    }
    document.remove("id");
    Ok(())
}

/// Builds the list/search view of a stored document.
#[must_use]
pub fn summarize(id: &str, document: &ProfileDocument) -> ProfileSummary {
    let text = |key: &str| document.get(key).and_then(Value::as_str).map(str::to_string);
    ProfileSummary {
        id: id.to_string(),
        first_name: text("first_name"),
        last_name: text("last_name"),
        headline: text("headline"),
    }
}

fn summary_matches(profile: &ProfileSummary, needle: &str) -> bool {
    let haystack = [&profile.first_name, &profile.last_name, &profile.headline]
        .into_iter()
        .filter_map(Option::as_deref)
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase();
    haystack.contains(needle)
}
