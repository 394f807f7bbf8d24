//! Image upload endpoint
//!
//! Accepts one multipart file, validates the extension against the image
//! whitelist and the size against the 5 MB cap, stores it under a
//! type-tagged directory and returns a relative URL. Files are written
//! under a generated name; the client-supplied name only contributes its
//! extension.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::routing::post;
use axum::Router;
use serde::Serialize;
use utoipa::ToSchema;

use crate::api::auth::Auth;
use crate::api::types::ApiError;
use crate::core::config::UploadsConfig;
use crate::core::constants::ALLOWED_IMAGE_EXTENSIONS;
use crate::core::storage::AppStorage;
use crate::data::types::UploadKind;

#[derive(Debug, Serialize, ToSchema)]
pub struct UploadResponse {
    /// Relative URL of the stored file
    pub url: String,
}

/// Shared state for the upload endpoint
#[derive(Clone)]
pub struct UploadsApiState {
    pub storage: Arc<AppStorage>,
    pub config: UploadsConfig,
}

/// Build upload routes
pub fn routes(storage: Arc<AppStorage>, config: UploadsConfig) -> Router<()> {
    let state = UploadsApiState { storage, config };

    Router::new()
        .route("/{kind}", post(upload_image))
        .with_state(state)
}

/// Extract a lowercase extension from a client-supplied file name
fn extension_of(file_name: &str) -> Option<String> {
    std::path::Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
}

/// Upload an image
#[utoipa::path(
    post,
    path = "/api/v1/uploads/{kind}",
    tag = "uploads",
    params(
        ("kind" = String, Path, description = "Upload kind (avatar or group)")
    ),
    responses(
        (status = 201, description = "File stored", body = UploadResponse),
        (status = 400, description = "Bad extension, oversized file, or missing file part"),
        (status = 404, description = "Uploads disabled")
    )
)]
pub async fn upload_image(
    State(state): State<UploadsApiState>,
    _auth: Auth,
    Path(kind): Path<String>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<UploadResponse>), ApiError> {
    if !state.config.enabled {
        return Err(ApiError::not_found(
            "UPLOADS_DISABLED",
            "File uploads are disabled on this server",
        ));
    }

    let kind = UploadKind::parse(&kind).ok_or_else(|| {
        ApiError::bad_request("INVALID_UPLOAD_KIND", "kind must be one of: avatar, group")
    })?;

    let field = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request("MULTIPART_ERROR", e.to_string()))?
        .ok_or_else(|| ApiError::bad_request("MISSING_FILE", "No file part in request"))?;

    let file_name = field
        .file_name()
        .map(String::from)
        .ok_or_else(|| ApiError::bad_request("MISSING_FILENAME", "File part has no name"))?;

    let ext = extension_of(&file_name).ok_or_else(|| {
        ApiError::bad_request("INVALID_EXTENSION", "File name has no extension")
    })?;

    if !ALLOWED_IMAGE_EXTENSIONS.contains(&ext.as_str()) {
        return Err(ApiError::bad_request(
            "INVALID_EXTENSION",
            format!(
                "Extension .{} not allowed; use one of: {}",
                ext,
                ALLOWED_IMAGE_EXTENSIONS.join(", ")
            ),
        ));
    }

    // The whitelist already implies an image type; keep the check so a
    // future whitelist edit cannot silently admit non-images
    let is_image = mime_guess::from_ext(&ext)
        .first()
        .is_some_and(|m| m.type_() == mime_guess::mime::IMAGE);
    if !is_image {
        return Err(ApiError::bad_request(
            "INVALID_EXTENSION",
            format!("Extension .{} is not an image type", ext),
        ));
    }

    let data = field
        .bytes()
        .await
        .map_err(|e| ApiError::bad_request("MULTIPART_ERROR", e.to_string()))?;

    if data.is_empty() {
        return Err(ApiError::bad_request("EMPTY_FILE", "Uploaded file is empty"));
    }
    if data.len() > state.config.max_bytes {
        return Err(ApiError::bad_request(
            "FILE_TOO_LARGE",
            format!(
                "File is {} bytes; the limit is {} bytes",
                data.len(),
                state.config.max_bytes
            ),
        ));
    }

    let stored_name = format!("{}.{}", cuid2::create_id(), ext);
    let dir = state.storage.upload_dir(kind);
    let path = dir.join(&stored_name);

    tokio::fs::create_dir_all(&dir)
        .await
        .map_err(|e| ApiError::internal(format!("Failed to create upload directory: {}", e)))?;
    tokio::fs::write(&path, &data)
        .await
        .map_err(|e| ApiError::internal(format!("Failed to store upload: {}", e)))?;

    tracing::info!(
        kind = kind.as_str(),
        bytes = data.len(),
        file = %stored_name,
        "Image stored"
    );

    Ok((
        StatusCode::CREATED,
        Json(UploadResponse {
            url: format!("/uploads/{}/{}", kind.as_str(), stored_name),
        }),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_of() {
        assert_eq!(extension_of("photo.JPG").as_deref(), Some("jpg"));
        assert_eq!(extension_of("a.b.png").as_deref(), Some("png"));
        assert_eq!(extension_of("noext"), None);
        assert_eq!(extension_of(".gitignore"), None);
    }

    #[test]
    fn test_allowed_extensions_are_images_only() {
        for ext in ["jpg", "jpeg", "png", "gif"] {
            assert!(ALLOWED_IMAGE_EXTENSIONS.contains(&ext));
        }
        assert!(!ALLOWED_IMAGE_EXTENSIONS.contains(&"svg"));
        assert!(!ALLOWED_IMAGE_EXTENSIONS.contains(&"exe"));
    }
}
