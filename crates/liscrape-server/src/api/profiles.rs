use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use liscrape_core::{profile_id_from_url, ActivityFlags, ProfileSummary, ScrapeRequest};
use liscrape_store::{ProfileDocument, ProfileStore, TaskStore};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::jobs;
use crate::middleware::RequestId;

use super::{map_store_error, ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Deserialize)]
pub(super) struct SearchQuery {
    #[serde(default)]
    pub query: String,
}

#[derive(Debug, Deserialize)]
pub(super) struct ScrapeBody {
    #[serde(alias = "url")]
    pub profile_url: String,
    #[serde(alias = "cookie")]
    pub session_cookie: String,
    #[serde(default)]
    pub scrape_posts: bool,
    #[serde(default)]
    pub scrape_comments: bool,
    #[serde(default)]
    pub scrape_reactions: bool,
}

#[derive(Debug, Serialize)]
pub(super) struct ScrapeAccepted {
    task_id: Uuid,
    profile_id: String,
}

pub(super) async fn list_profiles(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<Vec<ProfileSummary>>>, ApiError> {
    let data = state
        .store
        .list_profiles()
        .await
        .map_err(|e| map_store_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn search_profiles(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<ApiResponse<Vec<ProfileSummary>>>, ApiError> {
    let data = state
        .store
        .search_profiles(&query.query)
        .await
        .map_err(|e| map_store_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn get_profile(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(profile_id): Path<String>,
) -> Result<Json<ApiResponse<ProfileDocument>>, ApiError> {
    let document = state
        .store
        .get_profile(&profile_id)
        .await
        .map_err(|e| map_store_error(req_id.0.clone(), &e))?
        .ok_or_else(|| {
            ApiError::new(
                req_id.0.clone(),
                "not_found",
                format!("profile {profile_id} not found"),
            )
        })?;

    Ok(Json(ApiResponse {
        data: document,
        meta: ResponseMeta::new(req_id.0),
    }))
}

/// Queues a scrape and returns immediately; progress is polled through the
/// tasks endpoint.
pub(super) async fn start_scrape(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<ScrapeBody>,
) -> Result<(StatusCode, Json<ApiResponse<ScrapeAccepted>>), ApiError> {
    let session_cookie = body.session_cookie.trim().to_string();
    if session_cookie.is_empty() {
        return Err(ApiError::new(
            req_id.0,
            "validation_error",
            "session_cookie must not be empty",
        ));
    }
    let Some(profile_id) = profile_id_from_url(&body.profile_url) else {
        return Err(ApiError::new(
            req_id.0,
            "validation_error",
            "profile_url does not identify a profile",
        ));
    };

    let task = state
        .store
        .create_task(&profile_id)
        .await
        .map_err(|e| map_store_error(req_id.0.clone(), &e))?;

    let request = ScrapeRequest {
        profile_url: body.profile_url.trim().to_string(),
        session_cookie,
        activities: ActivityFlags {
            posts: body.scrape_posts,
            comments: body.scrape_comments,
            reactions: body.scrape_reactions,
        },
    };
    tracing::info!(task_id = %task.task_id, profile_id = %profile_id, "scrape queued");
    jobs::spawn_scrape(
        state.store.clone(),
        state.scrape.clone(),
        task.task_id,
        profile_id.clone(),
        request,
    );

    Ok((
        StatusCode::ACCEPTED,
        Json(ApiResponse {
            data: ScrapeAccepted {
                task_id: task.task_id,
                profile_id,
            },
            meta: ResponseMeta::new(req_id.0),
        }),
    ))
}
