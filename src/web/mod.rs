//! HTTP upload boundary.
//!
//! One endpoint: `POST /upload_audio` with a raw audio body. Bytes are
//! stored under a generated name in the upload directory; the pipeline
//! picks them up on its next cycle. The directory is the only thing
//! shared with the pipeline.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    routing::post,
    Router,
};
use tokio::net::TcpListener;
use tracing::{error, info};
use uuid::Uuid;

/// Accepted request content type.
pub const AUDIO_CONTENT_TYPE: &str = "audio/wav";

/// Shared state for the upload handler
pub struct UploadState {
    pub upload_dir: PathBuf,
}

pub fn router(state: Arc<UploadState>) -> Router {
    Router::new()
        .route("/upload_audio", post(upload_audio))
        .with_state(state)
}

pub async fn serve(addr: SocketAddr, state: Arc<UploadState>) -> anyhow::Result<()> {
    let app = router(state);

    info!("upload endpoint listening on {}", addr);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn upload_audio(
    State(state): State<Arc<UploadState>>,
    headers: HeaderMap,
    body: Bytes,
) -> impl IntoResponse {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok());

    if !is_supported_content_type(content_type) {
        return (
            StatusCode::UNSUPPORTED_MEDIA_TYPE,
            format!("expected {}", AUDIO_CONTENT_TYPE),
        );
    }

    if body.is_empty() {
        return (StatusCode::BAD_REQUEST, "empty audio body".to_string());
    }

    match store_audio(&state.upload_dir, &body).await {
        Ok(file_name) => {
            info!(file = %file_name, bytes = body.len(), "audio stored");
            (StatusCode::OK, file_name)
        }
        Err(e) => {
            error!(error = %e, "failed to store uploaded audio");
            (StatusCode::BAD_REQUEST, "upload failed".to_string())
        }
    }
}

fn is_supported_content_type(content_type: Option<&str>) -> bool {
    content_type
        .map(|ct| ct == AUDIO_CONTENT_TYPE || ct.starts_with("audio/wav;"))
        .unwrap_or(false)
}

/// Write audio bytes under a generated `<uuid>.wav` name and return it.
pub async fn store_audio(upload_dir: &Path, audio: &[u8]) -> std::io::Result<String> {
    let file_name = format!("{}.wav", Uuid::new_v4());
    tokio::fs::write(upload_dir.join(&file_name), audio).await?;
    Ok(file_name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn content_type_check_is_strict() {
        assert!(is_supported_content_type(Some("audio/wav")));
        assert!(is_supported_content_type(Some("audio/wav; rate=16000")));
        assert!(!is_supported_content_type(Some("audio/mpeg")));
        assert!(!is_supported_content_type(Some("application/json")));
        assert!(!is_supported_content_type(None));
    }

    #[tokio::test]
    async fn store_audio_generates_wav_name() {
        let temp = TempDir::new().unwrap();

        let name = store_audio(temp.path(), b"riff-bytes").await.unwrap();

        assert!(name.ends_with(".wav"));
        let stored = tokio::fs::read(temp.path().join(&name)).await.unwrap();
        assert_eq!(stored, b"riff-bytes");
    }

    #[tokio::test]
    async fn store_audio_names_are_unique() {
        let temp = TempDir::new().unwrap();

        let a = store_audio(temp.path(), b"one").await.unwrap();
        let b = store_audio(temp.path(), b"two").await.unwrap();

        assert_ne!(a, b);
    }
}
