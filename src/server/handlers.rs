use std::path::{Path, PathBuf};

use axum::{
    body::Bytes,
    extract::{Path as UrlPath, State},
    http::{header, HeaderName, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use log::info;
use serde::Serialize;
use serde_json::Value as JsonValue;
use uuid::Uuid;

use crate::data::merge::merge_sources;
use crate::data::naming::{safe_file_name, FALLBACK_FILE_NAME};
use crate::data::payload::parse_merge_request;
use crate::session::SessionRecord;

use super::error::{ApiError, ApiResult};
use super::AppState;

const CSV_CONTENT_TYPE: &str = "text/csv; charset=utf-8";
const TOTAL_ROWS_HEADER: HeaderName = HeaderName::from_static("x-total-rows");

// ---------------------------------------------------------------------------
// POST /merge
// ---------------------------------------------------------------------------

/// Merge the posted sources, store the CSV under the generated directory and
/// return it as a download.
pub async fn merge(State(state): State<AppState>, body: Bytes) -> ApiResult<Response> {
    let root: JsonValue = serde_json::from_slice(&body)
        .map_err(|e| ApiError::BadRequest(format!("Invalid JSON: {e}")))?;
    let request = parse_merge_request(&root)?;

    let file_name = safe_file_name(
        request
            .output_name
            .as_deref()
            .unwrap_or(FALLBACK_FILE_NAME),
    );
    let n_sources = request.sources.len();

    let options = state.options.clone();
    let output = tokio::task::spawn_blocking(move || merge_sources(&request.sources, &options))
        .await
        .map_err(|e| ApiError::Internal(format!("merge task failed: {e}")))??;

    let dest = store_generated(&state.generated_dir, &file_name, &output.csv_text).await?;

    info!(
        "Merged {n_sources} files, {} points -> {}",
        output.total_point_count,
        dest.display()
    );

    Ok(csv_download(
        &file_name,
        output.csv_text,
        Some(output.total_point_count),
    ))
}

/// Write `csv_text` to `dir/file_name` through a uniquely named temp file and
/// a rename, so readers and concurrent writers of the same name only ever
/// see a complete CSV.
async fn store_generated(dir: &Path, file_name: &str, csv_text: &str) -> ApiResult<PathBuf> {
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|e| ApiError::Internal(format!("creating {}: {e}", dir.display())))?;

    let dest = dir.join(file_name);
    let tmp = dir.join(format!("{file_name}.{}.tmp", Uuid::new_v4().simple()));
    if let Err(e) = tokio::fs::write(&tmp, csv_text).await {
        let _ = tokio::fs::remove_file(&tmp).await;
        return Err(ApiError::Internal(format!("writing {}: {e}", tmp.display())));
    }
    tokio::fs::rename(&tmp, &dest)
        .await
        .map_err(|e| ApiError::Internal(format!("renaming onto {}: {e}", dest.display())))?;
    Ok(dest)
}

// ---------------------------------------------------------------------------
// GET /generated/:file
// ---------------------------------------------------------------------------

/// Serve a CSV written by an earlier merge. Only bare file names resolve.
pub async fn download_generated(
    State(state): State<AppState>,
    UrlPath(file): UrlPath<String>,
) -> ApiResult<Response> {
    let not_found = || ApiError::NotFound(format!("generated file {file}"));
    if !is_plain_file_name(&file) {
        return Err(not_found());
    }

    let path = state.generated_dir.join(&file);
    match tokio::fs::read_to_string(&path).await {
        Ok(csv_text) => Ok(csv_download(&file, csv_text, None)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(not_found()),
        Err(e) => Err(ApiError::Internal(format!("reading {}: {e}", path.display()))),
    }
}

fn is_plain_file_name(name: &str) -> bool {
    !name.is_empty()
        && !name.contains('/')
        && !name.contains('\\')
        && Path::new(name).file_name().and_then(|n| n.to_str()) == Some(name)
}

fn csv_download(file_name: &str, csv_text: String, total_points: Option<usize>) -> Response {
    let disposition = format!("attachment; filename=\"{file_name}\"");
    let mut response = (
        [
            (header::CONTENT_TYPE, CSV_CONTENT_TYPE.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        csv_text,
    )
        .into_response();

    if let Some(total) = total_points {
        response
            .headers_mut()
            .insert(TOTAL_ROWS_HEADER, total.into());
    }
    response
}

// ---------------------------------------------------------------------------
// Sessions
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct SessionCreated {
    pub id: String,
    pub created_at: String,
}

/// POST /api/sessions
pub async fn create_session(
    State(state): State<AppState>,
    body: Bytes,
) -> ApiResult<(StatusCode, Json<SessionCreated>)> {
    let payload: JsonValue = serde_json::from_slice(&body)
        .map_err(|e| ApiError::BadRequest(format!("Invalid JSON: {e}")))?;
    let record = state.sessions.save(payload)?;
    Ok((
        StatusCode::CREATED,
        Json(SessionCreated {
            id: record.id.to_string(),
            created_at: record.created_at.to_rfc3339(),
        }),
    ))
}

/// GET /api/sessions/:id
pub async fn get_session(
    State(state): State<AppState>,
    UrlPath(id): UrlPath<String>,
) -> ApiResult<Json<SessionRecord>> {
    Ok(Json(state.sessions.load(&id)?))
}

// ---------------------------------------------------------------------------
// GET /health
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub module: String,
    pub version: String,
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        module: env!("CARGO_PKG_NAME").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
