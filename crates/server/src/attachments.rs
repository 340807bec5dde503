//! Receipt attachment endpoints

use api_types::attachment::AttachmentView;
use axum::{
    Extension, Json,
    extract::{Multipart, Path, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use engine::{AttachmentFile, AttachmentUpload, users};

use crate::{ServerError, server::ServerState, views};

const FILE_FIELD: &str = "file";

/// Bytes, file name and content type of the `file` field of a multipart body.
pub struct UploadedFile {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

pub async fn read_file_field(mut multipart: Multipart) -> Result<UploadedFile, ServerError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| ServerError::Generic(err.body_text()))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        let file_name = field.file_name().map(ToString::to_string);
        let content_type = field.content_type().map(ToString::to_string);
        let bytes = field
            .bytes()
            .await
            .map_err(|err| ServerError::Generic(err.body_text()))?;
        return Ok(UploadedFile {
            file_name,
            content_type,
            bytes: bytes.to_vec(),
        });
    }
    Err(ServerError::Generic("missing file".to_string()))
}

/// Serve blob content inline with its stored MIME type.
pub fn file_response(file: AttachmentFile) -> Response {
    (
        [
            (header::CONTENT_TYPE, file.mime_type),
            (header::CACHE_CONTROL, "private, max-age=3600".to_string()),
        ],
        file.bytes,
    )
        .into_response()
}

pub async fn list(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Path(expense_id): Path<i64>,
) -> Result<Json<Vec<AttachmentView>>, ServerError> {
    let attachments = state
        .engine
        .list_attachments(expense_id, &user.username)
        .await?;
    Ok(Json(attachments.into_iter().map(views::attachment).collect()))
}

pub async fn upload(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Path(expense_id): Path<i64>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<AttachmentView>), ServerError> {
    let file = read_file_field(multipart).await?;
    let attachment = state
        .engine
        .add_attachment(
            expense_id,
            &user.username,
            AttachmentUpload {
                original_name: file.file_name,
                mime_type: file.content_type.unwrap_or_default(),
                bytes: file.bytes,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(views::attachment(attachment))))
}

pub async fn delete(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Path((expense_id, attachment_id)): Path<(i64, i64)>,
) -> Result<StatusCode, ServerError> {
    state
        .engine
        .delete_attachment(expense_id, attachment_id, &user.username)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn file(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Path(file_name): Path<String>,
) -> Result<Response, ServerError> {
    let file = state
        .engine
        .attachment_file(&file_name, &user.username)
        .await?;
    Ok(file_response(file))
}
