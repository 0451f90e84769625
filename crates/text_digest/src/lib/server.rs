//! # HTTP API
//!
//! Thin JSON layer over [`Digest`]: a direct-text route and a file-upload
//! route. Uploads are read in memory and only plain-text payloads are
//! accepted.

use std::sync::Arc;

use axum::{
    extract::{multipart::MultipartError, DefaultBodyLimit, Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use text_generation::Generator;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::cors::CorsLayer;

use crate::{Digest, DigestError};

/// Upper bound on request bodies, for both JSON text and uploads
pub const MAX_BODY_BYTES: usize = 25 * 1024 * 1024;

const PLAIN_TEXT_TYPES: [&str; 2] = ["text/plain", "text/markdown"];

#[derive(Debug, Deserialize)]
pub struct SummarizeRequest {
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SummarizeResponse {
    pub summary: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub summary: String,
    pub length: usize,
    pub file_name: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Digest(#[from] DigestError),
    #[error(transparent)]
    Upload(DigestError),
    #[error("Invalid multipart payload: {0}")]
    Multipart(#[from] MultipartError),
    #[error("No file uploaded")]
    NoFile,
    #[error("Unsupported file type")]
    UnsupportedFileType(String),
    #[error("Could not extract text from file.")]
    NoText,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            ApiError::Digest(e) if !e.is_client_error() => {
                tracing::error!(error = %e, "Summarization failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({
                        "error": "Summarization failed.",
                        "details": e.to_string(),
                    }),
                )
            }
            ApiError::Upload(e) if !e.is_client_error() => {
                tracing::error!(error = %e, "Failed to process uploaded file");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({
                        "error": "Error processing file",
                        "details": e.to_string(),
                    }),
                )
            }
            ApiError::UnsupportedFileType(content_type) => {
                tracing::warn!(%content_type, "Rejected upload");
                (StatusCode::BAD_REQUEST, json!({ "error": self.to_string() }))
            }
            _ => (StatusCode::BAD_REQUEST, json!({ "error": self.to_string() })),
        };

        (status, Json(body)).into_response()
    }
}

pub fn router<G>(digest: Arc<Digest<G>>) -> Router
where
    G: Generator + Send + Sync + 'static,
{
    let api = Router::new()
        .route("/summarize", post(summarize_text::<G>))
        .route("/upload", post(upload_file::<G>));

    Router::new()
        .nest("/api", api)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(CorsLayer::permissive())
        .with_state(digest)
}

/// Serves the API until `shutdown` is cancelled
pub async fn serve<G>(
    listener: TcpListener,
    digest: Arc<Digest<G>>,
    shutdown: CancellationToken,
) -> anyhow::Result<()>
where
    G: Generator + Send + Sync + 'static,
{
    tracing::info!(addr = ?listener.local_addr()?, "Server listening");

    axum::serve(listener, router(digest))
        .with_graceful_shutdown(shutdown.cancelled_owned())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

#[tracing::instrument(skip_all)]
async fn summarize_text<G>(
    State(digest): State<Arc<Digest<G>>>,
    Json(request): Json<SummarizeRequest>,
) -> Result<Json<SummarizeResponse>, ApiError>
where
    G: Generator + Send + Sync + 'static,
{
    let text = request.text.unwrap_or_default();
    let summary = digest.summarize(&text).await?;

    Ok(Json(SummarizeResponse { summary }))
}

#[tracing::instrument(skip_all)]
async fn upload_file<G>(
    State(digest): State<Arc<Digest<G>>>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError>
where
    G: Generator + Send + Sync + 'static,
{
    let mut upload = None;
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some("file") {
            continue;
        }
        let file_name = field.file_name().unwrap_or("upload").to_string();
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let bytes = field.bytes().await?;
        upload = Some((file_name, content_type, bytes));
        break;
    }

    let (file_name, content_type, bytes) = upload.ok_or(ApiError::NoFile)?;
    tracing::info!(%file_name, %content_type, bytes = bytes.len(), "Processing uploaded file");

    if !is_plain_text(&content_type) {
        return Err(ApiError::UnsupportedFileType(content_type));
    }

    let text = std::str::from_utf8(&bytes)
        .inspect_err(|e| tracing::warn!(error = %e, "Uploaded file is not valid UTF-8"))
        .map_err(|_| ApiError::NoText)?;
    if text.trim().is_empty() {
        return Err(ApiError::NoText);
    }

    let summary = digest.summarize(text).await.map_err(ApiError::Upload)?;

    Ok(Json(UploadResponse {
        summary,
        length: text.chars().count(),
        file_name,
    }))
}

fn is_plain_text(content_type: &str) -> bool {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    PLAIN_TEXT_TYPES.contains(&essence.as_str())
}
