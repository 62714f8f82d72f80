//! Local stand-in for the enclave API.
//!
//! Serves a directory as the data container and keeps posted logs and reports
//! in memory. Report checking covers the report name and the schema's
//! `required` keys only.

use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use base64::{engine::general_purpose, Engine as _};
use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::io;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::Mutex;

use crate::enclave::client::{FILES_PATH, FILE_PATH, LOG_PATH, REPORT_PATH, VALIDATE_PATH};
use crate::enclave::{ApiMessage, File, FileList, LogData, Report, ValidationOutcome};

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(status: StatusCode, error: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: error.into(),
        }),
    )
}

#[derive(Debug, Deserialize)]
struct DataQuery {
    file_name: Option<String>,
    sas_url: Option<String>,
}

/// Shared state behind the sandbox routes.
pub struct SandboxState {
    data_dir: PathBuf,
    logs: Mutex<Vec<LogData>>,
    reports: Mutex<Vec<Report>>,
}

impl SandboxState {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            logs: Mutex::new(Vec::new()),
            reports: Mutex::new(Vec::new()),
        }
    }

    /// Log entries posted so far, oldest first.
    pub async fn logs(&self) -> Vec<LogData> {
        self.logs.lock().await.clone()
    }

    /// Reports accepted so far, oldest first.
    pub async fn reports(&self) -> Vec<Report> {
        self.reports.lock().await.clone()
    }
}

pub fn router(state: Arc<SandboxState>) -> Router {
    Router::new()
        .route(&format!("/{}", FILES_PATH), get(list_files_handler))
        .route(&format!("/{}", FILE_PATH), get(get_file_handler))
        .route(&format!("/{}", LOG_PATH), post(post_log_handler))
        .route(&format!("/{}", REPORT_PATH), post(post_report_handler))
        .route(&format!("/{}", VALIDATE_PATH), post(validate_report_handler))
        .route("/api/health", get(health_check))
        .with_state(state)
}

/// Serve the sandbox on an already-bound listener until the task is dropped.
pub async fn serve(listener: TcpListener, state: Arc<SandboxState>) -> anyhow::Result<()> {
    let addr = listener.local_addr()?;
    info!("🌐 Enclave sandbox running on http://{}", addr);
    axum::serve(listener, router(state)).await?;
    Ok(())
}

async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "enclave-sandbox",
    }))
}

fn check_sas_url(sas_url: Option<&str>) -> Result<(), ApiError> {
    if let Some(encoded) = sas_url {
        let decoded = general_purpose::STANDARD.decode(encoded).map_err(|e| {
            api_error(
                StatusCode::BAD_REQUEST,
                format!("sas_url is not valid base64: {}", e),
            )
        })?;
        debug!("Request carries SAS URL ({} bytes)", decoded.len());
    }
    Ok(())
}

async fn list_files_handler(
    State(state): State<Arc<SandboxState>>,
    Query(query): Query<DataQuery>,
) -> Result<Json<FileList>, ApiError> {
    check_sas_url(query.sas_url.as_deref())?;

    let root = state.data_dir.clone();
    let files = tokio::task::spawn_blocking(move || list_data_dir(&root))
        .await
        .map_err(|e| api_error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?
        .map_err(|e| {
            api_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to list data directory: {}", e),
            )
        })?;

    Ok(Json(FileList { files }))
}

/// Every regular file under `root`, sorted by name.
fn list_data_dir(root: &Path) -> io::Result<Vec<File>> {
    let mut files = Vec::new();
    collect_files(root, root, &mut files)?;
    files.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(files)
}

/// Walk `dir`, adding every regular file with a `/`-separated name relative
/// to `root`. Order is whatever `read_dir` yields.
fn collect_files(root: &Path, dir: &Path, out: &mut Vec<File>) -> io::Result<()> {
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        let meta = entry.metadata()?;

        if meta.is_dir() {
            collect_files(root, &path, out)?;
        } else if meta.is_file() {
            let Ok(relative) = path.strip_prefix(root) else {
                continue;
            };
            let name = relative
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");

            out.push(File {
                name,
                size: Some(meta.len()),
                last_modified: meta
                    .modified()
                    .ok()
                    .map(|t| DateTime::<Utc>::from(t).to_rfc3339()),
            });
        }
    }
    Ok(())
}

/// Resolve a blob name inside the data directory, refusing anything that
/// could escape it.
fn resolve_blob(root: &Path, name: &str) -> Option<PathBuf> {
    if name.is_empty() || name.contains('\\') {
        return None;
    }
    let relative = Path::new(name);
    if !relative
        .components()
        .all(|c| matches!(c, Component::Normal(_)))
    {
        return None;
    }
    Some(root.join(relative))
}

async fn get_file_handler(
    State(state): State<Arc<SandboxState>>,
    Query(query): Query<DataQuery>,
) -> Result<Response, ApiError> {
    check_sas_url(query.sas_url.as_deref())?;

    let name = query
        .file_name
        .ok_or_else(|| api_error(StatusCode::BAD_REQUEST, "file_name is required"))?;

    let path = resolve_blob(&state.data_dir, &name).ok_or_else(|| {
        api_error(
            StatusCode::BAD_REQUEST,
            format!("Invalid file name: {}", name),
        )
    })?;

    let bytes = tokio::fs::read(&path).await.map_err(|e| {
        if e.kind() == io::ErrorKind::NotFound {
            api_error(StatusCode::NOT_FOUND, format!("No such file: {}", name))
        } else {
            api_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to read {}: {}", name, e),
            )
        }
    })?;

    debug!("📤 Serving {} ({} bytes)", name, bytes.len());

    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/octet-stream")],
        bytes,
    )
        .into_response())
}

async fn post_log_handler(
    State(state): State<Arc<SandboxState>>,
    Json(log): Json<LogData>,
) -> Json<ApiMessage> {
    match log.status {
        Some(status) => info!("📝 [{:?}] {}", status, log.message),
        None => info!("📝 {}", log.message),
    }
    state.logs.lock().await.push(log);

    Json(ApiMessage {
        message: Some("Log received".to_string()),
        status: Some("ok".to_string()),
    })
}

async fn validate_report_handler(Json(report): Json<Report>) -> Json<ValidationOutcome> {
    let errors = check_report(&report);
    Json(ValidationOutcome {
        valid: errors.is_empty(),
        errors,
    })
}

async fn post_report_handler(
    State(state): State<Arc<SandboxState>>,
    Json(report): Json<Report>,
) -> Result<Json<ApiMessage>, ApiError> {
    let errors = check_report(&report);
    if !errors.is_empty() {
        warn!("❌ Rejected report '{}': {}", report.name, errors.join("; "));
        return Err(api_error(
            StatusCode::UNPROCESSABLE_ENTITY,
            errors.join("; "),
        ));
    }

    info!("✅ Accepted report '{}' ({:?})", report.name, report.status);
    state.reports.lock().await.push(report);

    Ok(Json(ApiMessage {
        message: Some("Report received".to_string()),
        status: Some("ok".to_string()),
    }))
}

pub fn check_report(report: &Report) -> Vec<String> {
    let mut errors = Vec::new();
    if report.name.trim().is_empty() {
        errors.push("name must not be empty".to_string());
    }
    if let Some(schema) = &report.json_schema {
        check_required(&schema.0, &report.json_data, "$", &mut errors);
    }
    errors
}

fn check_required(schema: &Value, value: &Value, path: &str, errors: &mut Vec<String>) {
    if let Some(required) = schema.get("required").and_then(Value::as_array) {
        for key in required.iter().filter_map(Value::as_str) {
            if value.get(key).is_none() {
                errors.push(format!("{}: missing required property `{}`", path, key));
            }
        }
    }

    let properties = schema.get("properties").and_then(Value::as_object);
    if let (Some(properties), Some(object)) = (properties, value.as_object()) {
        for (key, sub_schema) in properties {
            if let Some(child) = object.get(key) {
                check_required(sub_schema, child, &format!("{}.{}", path, key), errors);
            }
        }
    }
}
