use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
};
use drivegate_db::models::RecentFile;
use serde::{Deserialize, Serialize};

use crate::{error::ApiError, extractors::auth::AuthUser, state::AppState};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveQuery {
    pub file_id: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentFileResponse {
    pub recent_idx: String,
    pub user_idx: String,
    pub recent_file: String,
    pub created_at: String,
}

fn to_response(r: RecentFile) -> RecentFileResponse {
    RecentFileResponse {
        recent_idx: r.id.map(|id| id.to_hex()).unwrap_or_default(),
        user_idx: r.user_id.to_hex(),
        recent_file: r.file_id,
        created_at: r.created_at.try_to_rfc3339_string().unwrap_or_default(),
    }
}

pub async fn save(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(params): Query<SaveQuery>,
) -> Result<StatusCode, ApiError> {
    if params.file_id.is_empty() {
        return Err(ApiError::BadRequest("fileId must not be empty".to_string()));
    }
    state.recent.touch(auth.user_id, &params.file_id).await?;
    Ok(StatusCode::OK)
}

/// Recent files, newest first.
pub async fn show(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Vec<RecentFileResponse>>, ApiError> {
    let entries = state.recent.list(auth.user_id).await?;
    Ok(Json(entries.into_iter().map(to_response).collect()))
}
