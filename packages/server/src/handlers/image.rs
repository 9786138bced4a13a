use axum::Json;
use axum::body::Body;
use axum::extract::{Multipart, Path, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use tracing::instrument;

use crate::error::{AppError, ErrorBody};
use crate::models::image::ImageRecord;
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/images",
    tag = "Images",
    operation_id = "listImages",
    summary = "List all images",
    description = "Returns every stored image record in ascending id order.",
    responses(
        (status = 200, description = "Image list", body = Vec<ImageRecord>),
        (status = 500, description = "Store unavailable (STORAGE_ERROR)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn list_images(State(state): State<AppState>) -> Result<Json<Vec<ImageRecord>>, AppError> {
    Ok(Json(state.images.list().await?))
}

#[utoipa::path(
    post,
    path = "/images",
    tag = "Images",
    operation_id = "uploadImage",
    summary = "Upload an image",
    description = "Stores the `image` multipart file field in the object store, then records \
        its metadata. If the content type is not declared it is guessed from the filename.",
    request_body(content_type = "multipart/form-data", description = "Multipart form with an `image` file field"),
    responses(
        (status = 201, description = "Image stored", body = ImageRecord),
        (status = 400, description = "Missing or invalid file (VALIDATION_ERROR)", body = ErrorBody),
        (status = 500, description = "Store unavailable (STORAGE_ERROR)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, multipart))]
pub async fn upload_image(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let mut upload: Option<(Option<String>, Option<String>, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Multipart error: {e}")))?
    {
        if field.name() != Some("image") {
            continue; // Ignore unknown fields.
        }
        let file_name = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("Upload read error: {e}")))?;
        upload = Some((file_name, content_type, data.to_vec()));
    }

    let (file_name, declared_type, data) =
        upload.ok_or_else(|| AppError::Validation("Missing 'image' field".into()))?;
    let file_name = file_name
        .ok_or_else(|| AppError::Validation("Image field must have a filename".into()))?;

    let limit = state.config.storage.max_upload_size;
    if data.len() as u64 > limit {
        return Err(AppError::Validation(format!(
            "Image exceeds the maximum upload size of {limit} bytes"
        )));
    }

    let content_type = declared_type
        .filter(|ct| !ct.trim().is_empty())
        .or_else(|| {
            mime_guess::from_path(&file_name)
                .first()
                .map(|m| m.to_string())
        })
        .unwrap_or_default();

    tracing::info!(filename = %file_name, size = data.len(), "Uploading image");
    let record = state.images.create(&data, &file_name, &content_type).await?;

    Ok((StatusCode::CREATED, Json(record)))
}

#[utoipa::path(
    delete,
    path = "/images/{id}",
    tag = "Images",
    operation_id = "deleteImage",
    summary = "Delete an image",
    description = "Deletes the blob, then the metadata record.",
    params(("id" = i32, Path, description = "Image ID")),
    responses(
        (status = 204, description = "Image deleted"),
        (status = 400, description = "Invalid image ID (VALIDATION_ERROR)", body = ErrorBody),
        (status = 404, description = "Image not found (NOT_FOUND)", body = ErrorBody),
        (status = 500, description = "Store unavailable (STORAGE_ERROR)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn delete_image(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let id = parse_image_id(&id)?;
    state.images.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/download/{id}",
    tag = "Images",
    operation_id = "downloadImage",
    summary = "Download an image",
    description = "Returns the raw bytes as an attachment named after the object key.",
    params(("id" = i32, Path, description = "Image ID")),
    responses(
        (status = 200, description = "Image content"),
        (status = 400, description = "Invalid image ID (VALIDATION_ERROR)", body = ErrorBody),
        (status = 404, description = "Image not found (NOT_FOUND)", body = ErrorBody),
        (status = 500, description = "Store unavailable (STORAGE_ERROR)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn download_image(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let id = parse_image_id(&id)?;
    let download = state.images.download(id).await?;

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, &download.content_type)
        .header(header::CONTENT_LENGTH, download.data.len().to_string())
        .header(
            header::CONTENT_DISPOSITION,
            content_disposition_value(&download.object_key),
        )
        .body(Body::from(download.data))
        .map_err(|e| AppError::Internal(format!("Failed to build response: {e}")))
}

fn parse_image_id(raw: &str) -> Result<i32, AppError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(AppError::Validation("Image ID is required".into()));
    }
    raw.parse()
        .map_err(|_| AppError::Validation("Invalid image ID".into()))
}

/// `attachment; filename="<key>"`, plus an RFC 5987 `filename*` when the key
/// is not plain ASCII.
fn content_disposition_value(object_key: &str) -> String {
    let ascii_name: String = object_key
        .chars()
        .map(|c| match c {
            '"' | '\\' => '_',
            c if c.is_ascii() && !c.is_ascii_control() => c,
            _ => '_',
        })
        .collect();

    if ascii_name == object_key {
        return format!("attachment; filename=\"{ascii_name}\"");
    }

    let encoded: String = object_key
        .bytes()
        .map(|b| match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~' => {
                String::from(b as char)
            }
            _ => format!("%{b:02X}"),
        })
        .collect();

    format!("attachment; filename=\"{ascii_name}\"; filename*=UTF-8''{encoded}")
}
