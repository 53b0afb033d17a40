//! Flat-file store: one pretty-printed JSON file per profile and per task.
//!
//! Layout under the data directory:
//!
//! ```text
//! linkedin_profile_<id>.json
//! tasks/<task-uuid>.json
//! ```
//!
//! Writes go to a sibling temp file first and are renamed into place, so a
//! reader never observes a half-written document. Concurrent writers to the
//! same profile are last-write-wins.

use std::path::{Path, PathBuf};

use chrono::Utc;
use liscrape_core::{ProfileRecord, ProfileSummary, TaskState, TaskStatus};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use crate::{
    is_valid_profile_id, merge_into, summarize, ProfileDocument, ProfileStore, StoreError,
    TaskStore,
};

const PROFILE_PREFIX: &str = "linkedin_profile_";
const JSON_SUFFIX: &str = ".json";
const TASKS_DIR: &str = "tasks";

#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn profile_path(&self, id: &str) -> Result<PathBuf, StoreError> {
        if !is_valid_profile_id(id) {
            return Err(StoreError::InvalidProfileId(id.to_string()));
        }
        Ok(self.root.join(format!("{PROFILE_PREFIX}{id}{JSON_SUFFIX}")))
    }

    fn task_path(&self, task_id: Uuid) -> PathBuf {
        self.root
            .join(TASKS_DIR)
            .join(format!("{task_id}{JSON_SUFFIX}"))
    }

    async fn read_profile(&self, path: &Path) -> Result<Option<ProfileDocument>, StoreError> {
        read_json(path).await
    }
}

impl ProfileStore for FileStore {
    async fn get_profile(&self, id: &str) -> Result<Option<ProfileDocument>, StoreError> {
        let path = self.profile_path(id)?;
        Ok(self.read_profile(&path).await?.map(|mut document| {
            document.insert("id".to_string(), Value::String(id.to_string()));
            document
        }))
    }

    async fn merge_profile(
        &self,
        id: &str,
        record: &ProfileRecord,
    ) -> Result<ProfileDocument, StoreError> {
        let path = self.profile_path(id)?;
        let mut document = self.read_profile(&path).await?.unwrap_or_default();
        merge_into(&mut document, record)?;
        write_json(&path, &document).await?;
        tracing::info!(profile_id = id, path = %path.display(), "profile saved");

        document.insert("id".to_string(), Value::String(id.to_string()));
        Ok(document)
    }

    async fn list_profiles(&self) -> Result<Vec<ProfileSummary>, StoreError> {
        let mut entries = match tokio::fs::read_dir(&self.root).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => {
                return Err(StoreError::Io {
                    path: self.root.clone(),
                    source,
                })
            }
        };

        let mut profiles = Vec::new();
        loop {
            let entry = entries.next_entry().await.map_err(|source| StoreError::Io {
                path: self.root.clone(),
                source,
            })?;
            let Some(entry) = entry else { break };

            let file_name = entry.file_name();
            let Some(id) = file_name
                .to_str()
                .and_then(|name| name.strip_prefix(PROFILE_PREFIX))
                .and_then(|name| name.strip_suffix(JSON_SUFFIX))
                .filter(|id| is_valid_profile_id(id))
            else {
                continue;
            };

            match self.read_profile(&entry.path()).await {
                Ok(Some(document)) => profiles.push(summarize(id, &document)),
                Ok(None) => {}
                Err(e) => tracing::warn!(profile_id = id, error = %e, "skipping unreadable profile"),
            }
        }

        profiles.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(profiles)
    }

    async fn check(&self) -> Result<(), StoreError> {
        let tasks = self.root.join(TASKS_DIR);
        tokio::fs::create_dir_all(&tasks)
            .await
            .map_err(|source| StoreError::Io {
                path: tasks,
                source,
            })
    }
}

impl TaskStore for FileStore {
    async fn create_task(&self, profile_id: &str) -> Result<TaskStatus, StoreError> {
        let task = TaskStatus::queued(profile_id);
        write_json(&self.task_path(task.task_id), &task).await?;
        tracing::debug!(task_id = %task.task_id, profile_id, "task queued");
        Ok(task)
    }

    async fn get_task(&self, task_id: Uuid) -> Result<Option<TaskStatus>, StoreError> {
        read_json(&self.task_path(task_id)).await
    }

    async fn advance_task(
        &self,
        task_id: Uuid,
        state: TaskState,
        error: Option<String>,
    ) -> Result<TaskStatus, StoreError> {
        let path = self.task_path(task_id);
        let mut task: TaskStatus = read_json(&path)
            .await?
            .ok_or(StoreError::TaskNotFound(task_id))?;

        if !task.state.can_transition_to(state) {
            return Err(StoreError::InvalidTaskTransition {
                task_id,
                from: task.state,
                to: state,
            });
        }

        task.state = state;
        task.updated_at = Utc::now();
        if error.is_some() {
            task.error = error;
        }
        write_json(&path, &task).await?;
        tracing::debug!(task_id = %task_id, state = %state, "task advanced");
        Ok(task)
    }
}

/// Reads and decodes a JSON file; `Ok(None)` when the file does not exist.
async fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, StoreError> {
    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(StoreError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };
    serde_json::from_slice(&bytes)
        .map(Some)
        .map_err(|source| StoreError::Deserialize {
            path: path.to_path_buf(),
            source,
        })
}

/// Writes pretty JSON through a temp file and an atomic rename.
async fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), StoreError> {
    let io_err = |path: &Path| {
        let path = path.to_path_buf();
        move |source| StoreError::Io { path, source }
    };

    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(io_err(parent))?;
    }

    let bytes = serde_json::to_vec_pretty(value).map_err(|source| StoreError::Serialize {
        context: path.display().to_string(),
        source,
    })?;

    let tmp = path.with_extension(format!("json.{}.tmp", Uuid::new_v4().simple()));
    tokio::fs::write(&tmp, &bytes).await.map_err(io_err(&tmp))?;
    if let Err(source) = tokio::fs::rename(&tmp, path).await {
        let _ = tokio::fs::remove_file(&tmp).await;
        return Err(StoreError::Io {
            path: path.to_path_buf(),
            source,
        });
    }
    Ok(())
}

#[cfg(test)]
#[path = "file_test.rs"]
mod tests;
