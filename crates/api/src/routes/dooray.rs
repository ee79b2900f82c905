use axum::{
    Json,
    body::Body,
    extract::{Multipart, Query, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use bson::oid::ObjectId;
use drivegate_db::models::ApiBinding;
use drivegate_services::ResolvedBinding;
use drivegate_services::dooray::{Drive, UploadPart, UpstreamError};
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::{error::ApiError, extractors::auth::AuthUser, state::AppState};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiIdxQuery {
    pub api_idx: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberQuery {
    pub user_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadQuery {
    pub file_id: String,
    pub api_idx: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiBindingResponse {
    pub api_idx: String,
    pub api_title: String,
    pub is_connected: bool,
    pub created_at: String,
    pub last_used_at: Option<String>,
}

fn to_response(b: &ApiBinding) -> ApiBindingResponse {
    ApiBindingResponse {
        api_idx: b.id.map(|id| id.to_hex()).unwrap_or_default(),
        api_title: b.title.clone(),
        is_connected: b.is_connected,
        created_at: b.created_at.try_to_rfc3339_string().unwrap_or_default(),
        last_used_at: b
            .last_used_at
            .and_then(|t| t.try_to_rfc3339_string().ok()),
    }
}

/// One binding's drives in the `driveLoading` aggregate.
#[derive(Debug, Serialize)]
pub struct DriveLoadingEntry {
    #[serde(rename = "apiTitle")]
    pub api_title: String,
    #[serde(rename = "apiIdx")]
    pub api_idx: String,
    #[serde(rename = "apiURL")]
    pub api_url: String,
    pub drives: Vec<Drive>,
}

fn parse_api_idx(raw: &str) -> Result<ObjectId, ApiError> {
    ObjectId::parse_str(raw).map_err(|_| ApiError::BadRequest("Invalid apiIdx".to_string()))
}

/// Walks the binding's drives and marks it connected when the token works.
pub async fn drive_connect(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(params): Query<ApiIdxQuery>,
) -> Result<Json<Vec<Drive>>, ApiError> {
    let binding_id = parse_api_idx(&params.api_idx)?;
    let resolved = state.resolver.resolve(auth.user_id, binding_id).await?;

    let drives = match state.walker.full_drive(&resolved.token).await {
        Ok(drives) => drives,
        Err(e) if e.is_unauthorized() => {
            warn!(%binding_id, error = %e, "Upstream rejected api token");
            return Err(ApiError::Unauthorized(
                "Dooray API connection failed".to_string(),
            ));
        }
        Err(e) => return Err(e.into()),
    };

    state.resolver.connect(auth.user_id, binding_id).await?;
    info!(%binding_id, drives = drives.len(), "Api binding connected");
    Ok(Json(drives))
}

pub async fn drive_disconnect(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(params): Query<ApiIdxQuery>,
) -> Result<Json<bool>, ApiError> {
    let binding_id = parse_api_idx(&params.api_idx)?;
    let disconnected = state.resolver.disconnect(auth.user_id, binding_id).await?;
    Ok(Json(disconnected))
}

pub async fn api_loading(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Vec<ApiBindingResponse>>, ApiError> {
    let connected = state.resolver.connected(auth.user_id).await?;
    Ok(Json(
        connected.iter().map(|r| to_response(&r.binding)).collect(),
    ))
}

/// Drive trees of every connected binding.
///
/// A binding whose walk fails is logged and left out; the others are still
/// returned.
pub async fn drive_loading(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Vec<DriveLoadingEntry>>, ApiError> {
    let connected = state.resolver.connected(auth.user_id).await?;
    if connected.is_empty() {
        return Err(ApiError::Unauthorized("No connected api".to_string()));
    }

    let walks = connected.iter().map(|r| state.walker.full_drive(&r.token));
    let results = join_all(walks).await;

    let api_url = state.settings.dooray.base_url.trim_end_matches('/').to_string();
    let entries = connected
        .iter()
        .zip(results)
        .filter_map(|(resolved, result)| match result {
            Ok(drives) => Some(DriveLoadingEntry {
                api_title: resolved.binding.title.clone(),
                api_idx: resolved.binding.id.map(|id| id.to_hex()).unwrap_or_default(),
                api_url: api_url.clone(),
                drives,
            }),
            Err(e) => {
                warn!(
                    binding_id = ?resolved.binding.id,
                    step = %e.step(),
                    error = %e,
                    "Skipping api binding in drive loading"
                );
                None
            }
        })
        .collect();

    Ok(Json(entries))
}

/// Display name of an upstream member, `"-"` when it cannot be resolved.
pub async fn member_name(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(params): Query<MemberQuery>,
) -> Result<String, ApiError> {
    let connected = state.resolver.connected(auth.user_id).await?;
    let Some(first) = connected.first() else {
        return Ok("-".to_string());
    };

    let name = state
        .transfer
        .member_name(&first.token, &params.user_id)
        .await?;
    Ok(name.filter(|n| !n.is_empty()).unwrap_or_else(|| "-".to_string()))
}

pub async fn download_file(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(params): Query<DownloadQuery>,
) -> Result<Response, ApiError> {
    let binding_id = parse_api_idx(&params.api_idx)?;
    let resolved = state.resolver.resolve(auth.user_id, binding_id).await?;

    let file = match state.transfer.download(&resolved.token, &params.file_id).await {
        Ok(file) => file,
        Err(e) => {
            warn!(file_id = %params.file_id, step = %e.step(), error = %e, "Download failed");
            return Ok((StatusCode::INTERNAL_SERVER_ERROR, "File download failed").into_response());
        }
    };

    Response::builder()
        .header(header::CONTENT_TYPE, "application/octet-stream")
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", header_safe(&file.name)),
        )
        .body(Body::from(file.bytes))
        .map_err(|e| ApiError::Internal(format!("Failed to build response: {}", e)))
}

fn header_safe(name: &str) -> String {
    name.chars().filter(|c| *c != '"' && !c.is_control()).collect()
}

/// Upload a file via multipart form data.
/// Fields: `file` (binary), `driveId`, optional `parentId`, `apiIdx` (or legacy `apiURL`).
pub async fn upload_file(
    State(state): State<AppState>,
    auth: AuthUser,
    mut multipart: Multipart,
) -> Result<Json<serde_json::Value>, ApiError> {
    let mut upload: Option<UploadPart> = None;
    let mut drive_id: Option<String> = None;
    let mut parent_id: Option<String> = None;
    let mut api_idx: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Multipart error: {}", e)))?
    {
        let name = field.name().unwrap_or("").to_string();

        match name.as_str() {
            "file" => {
                let file_name = field.file_name().unwrap_or("unnamed").to_string();
                let content_type = field.content_type().map(|s| s.to_string());
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::BadRequest(format!("Failed to read file: {}", e)))?;
                upload = Some(UploadPart {
                    file_name,
                    content_type,
                    bytes,
                });
            }
            "driveId" => drive_id = Some(read_text(field).await?),
            "parentId" => parent_id = Some(read_text(field).await?),
            "apiIdx" => api_idx = Some(read_text(field).await?),
            "apiURL" => {
                let value = read_text(field).await?;
                api_idx.get_or_insert(value);
            }
            _ => {}
        }
    }

    let upload = upload.ok_or_else(|| ApiError::BadRequest("Missing 'file' field".to_string()))?;
    let drive_id =
        drive_id.ok_or_else(|| ApiError::BadRequest("Missing 'driveId' field".to_string()))?;
    let api_idx =
        api_idx.ok_or_else(|| ApiError::BadRequest("Missing 'apiIdx' field".to_string()))?;

    let binding_id = parse_api_idx(&api_idx)?;
    let ResolvedBinding { token, .. } = state.resolver.resolve(auth.user_id, binding_id).await?;

    let body = state
        .transfer
        .upload(&token, &drive_id, parent_id.as_deref(), &upload)
        .await
        .map_err(upload_error)?;
    Ok(Json(body))
}

async fn read_text(field: axum::extract::multipart::Field<'_>) -> Result<String, ApiError> {
    field
        .text()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Failed to read field: {}", e)))
}

fn upload_error(err: UpstreamError) -> ApiError {
    match err {
        UpstreamError::Status { status, body, .. } => {
            warn!(%status, "Upload rejected by upstream");
            ApiError::Passthrough(status, body)
        }
        other => other.into(),
    }
}
