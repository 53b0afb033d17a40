//! Records produced by a scrape and the task bookkeeping around it.
//!
//! Every field of [`ProfileRecord`] is optional: a stage that found nothing
//! leaves its fields as `None`, which keeps them out of the serialized
//! document and therefore out of a merge into a stored profile.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Placeholder stored when a profile shows no value for a field.
pub const NOT_SPECIFIED: &str = "Not specified";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub headline: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub about: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub services: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub experience: Option<Vec<ExperienceItem>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub education: Option<Vec<EducationItem>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub languages: Option<Vec<LanguageItem>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub publications: Option<Vec<PublicationItem>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub posts: Option<Vec<PostItem>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comments: Option<Vec<CommentItem>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reactions: Option<Vec<ReactionItem>>,
}

impl ProfileRecord {
    /// Overwrites every field that `newer` carries; fields `newer` lacks keep
    /// their current value.
    pub fn merge(&mut self, newer: ProfileRecord) {
        fn take<T>(slot: &mut Option<T>, value: Option<T>) {
            if value.is_some() {
                *slot = value;
            }
        }

        take(&mut self.first_name, newer.first_name);
        take(&mut self.last_name, newer.last_name);
        take(&mut self.headline, newer.headline);
        take(&mut self.location, newer.location);
        take(&mut self.about, newer.about);
        take(&mut self.services, newer.services);
        take(&mut self.experience, newer.experience);
        take(&mut self.education, newer.education);
        take(&mut self.languages, newer.languages);
        take(&mut self.publications, newer.publications);
        take(&mut self.posts, newer.posts);
        take(&mut self.comments, newer.comments);
        take(&mut self.reactions, newer.reactions);
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExperienceItem {
    pub title: String,
    pub company: String,
    pub date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EducationItem {
    pub school: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub degree: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageItem {
    pub language: String,
    pub proficiency: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicationItem {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publisher: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostItem {
    pub user_commentary: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub re_post: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentItem {
    pub comment_text: String,
    pub post_text: Option<String>,
    pub timestamp: Option<String>,
    pub post_author: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReactionItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub liked_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

/// Minimal view of a stored profile, returned by list and search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileSummary {
    pub id: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub headline: Option<String>,
}

/// Which activity pages a scrape visits in addition to the profile itself.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityFlags {
    #[serde(default)]
    pub posts: bool,
    #[serde(default)]
    pub comments: bool,
    #[serde(default)]
    pub reactions: bool,
}

#[derive(Clone)]
pub struct ScrapeRequest {
    pub profile_url: String,
    pub session_cookie: String,
    pub activities: ActivityFlags,
}

impl std::fmt::Debug for ScrapeRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScrapeRequest")
            .field("profile_url", &self.profile_url)
            .field("session_cookie", &"[redacted]")
            .field("activities", &self.activities)
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskState {
    Queued,
    Running,
    Completed,
    Error,
}

impl TaskState {
    /// Lifecycle is `queued → running → completed | error`; nothing moves back.
    #[must_use]
    pub fn can_transition_to(self, next: TaskState) -> bool {
        matches!(
            (self, next),
            (TaskState::Queued, TaskState::Running)
                | (TaskState::Queued | TaskState::Running, TaskState::Error)
                | (TaskState::Running, TaskState::Completed)
        )
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            TaskState::Queued => "queued",
            TaskState::Running => "running",
            TaskState::Completed => "completed",
            TaskState::Error => "error",
        }
    }
}

impl std::fmt::Display for TaskState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskStatus {
    pub task_id: Uuid,
    pub state: TaskState,
    pub profile_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TaskStatus {
    #[must_use]
    pub fn queued(profile_id: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            task_id: Uuid::new_v4(),
            state: TaskState::Queued,
            profile_id: profile_id.into(),
            error: None,
            created_at: now,
            updated_at: now,
        }
    }
}
