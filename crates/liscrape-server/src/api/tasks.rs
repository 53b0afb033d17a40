use axum::{
    extract::{Path, State},
    Extension, Json,
};
use liscrape_core::TaskStatus;
use liscrape_store::TaskStore;
use uuid::Uuid;

use crate::middleware::RequestId;

use super::{map_store_error, ApiError, ApiResponse, AppState, ResponseMeta};

pub(super) async fn get_task(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(task_id): Path<String>,
) -> Result<Json<ApiResponse<TaskStatus>>, ApiError> {
    let Ok(task_id) = Uuid::parse_str(&task_id) else {
        return Err(ApiError::new(
            req_id.0,
            "validation_error",
            format!("\"{task_id}\" is not a task id"),
        ));
    };

    let task = state
        .store
        .get_task(task_id)
        .await
        .map_err(|e| map_store_error(req_id.0.clone(), &e))?
        .ok_or_else(|| {
            ApiError::new(
                req_id.0.clone(),
                "not_found",
                format!("task {task_id} not found"),
            )
        })?;

    Ok(Json(ApiResponse {
        data: task,
        meta: ResponseMeta::new(req_id.0),
    }))
}
