//! Audio upload and deletion: a single hand-off to the hosted media store.

use axum::extract::{Multipart, State};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::warn;

use crate::error::ApiError;
use crate::AppState;

/// POST /api/audio/upload
///
/// Accepts a multipart form with an `audio` file field, forwards it
/// wholesale to the media store, and returns the media reference. No retry
/// is attempted on failure; the caller is told to try again.
pub async fn upload_audio(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<Value>, ApiError> {
    let mut upload: Option<(Vec<u8>, String, String)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Invalid multipart body: {}", e)))?
    {
        if field.name() != Some("audio") {
            continue;
        }

        let file_name = field
            .file_name()
            .unwrap_or("upload.mp3")
            .to_string();
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadRequest(format!("Failed to read audio field: {}", e)))?;

        upload = Some((bytes.to_vec(), file_name, content_type));
        break;
    }

    let Some((bytes, file_name, content_type)) = upload else {
        return Err(ApiError::BadRequest("No audio file provided".to_string()));
    };

    let media_ref = state.media.upload(bytes, &file_name, &content_type).await?;

    Ok(Json(json!({
        "success": true,
        "data": media_ref,
    })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteAudioRequest {
    pub public_id: Option<String>,
}

/// POST /api/audio/delete
///
/// Remote deletion of a stored media object.
pub async fn delete_audio(
    State(state): State<AppState>,
    Json(request): Json<DeleteAudioRequest>,
) -> Result<Json<Value>, ApiError> {
    let Some(public_id) = request.public_id.filter(|id| !id.is_empty()) else {
        return Err(ApiError::BadRequest("No public ID provided".to_string()));
    };

    if let Err(e) = state.media.destroy(&public_id).await {
        warn!("Audio delete failed for {}: {}", public_id, e);
        return Err(e.into());
    }

    Ok(Json(json!({
        "success": true,
        "message": "Audio deleted from media store",
    })))
}
