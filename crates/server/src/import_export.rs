//! Workbook import, export and the blank import template

use api_types::import::{ImportResult, RowError};
use axum::{
    Extension, Json,
    extract::{Multipart, Path, State},
    http::header,
    response::{IntoResponse, Response},
};
use engine::{ImportReport, TEMPLATE_FILE_NAME, users};

use crate::{ServerError, attachments::read_file_field, server::ServerState};

const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

fn xlsx_response(file_name: &str, bytes: Vec<u8>) -> Response {
    (
        [
            (header::CONTENT_TYPE, XLSX_CONTENT_TYPE.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!(
                    "attachment; filename=\"{}\"",
                    urlencoding::encode(file_name)
                ),
            ),
        ],
        bytes,
    )
        .into_response()
}

fn import_result(report: ImportReport) -> ImportResult {
    ImportResult {
        book_id: report.book_id,
        book_name: report.book_name,
        created: report.created,
        inserted_count: report.inserted_count,
        skipped_count: report.skipped_count,
        errors: report
            .errors
            .into_iter()
            .map(|err| RowError {
                row: err.row,
                error: err.error,
            })
            .collect(),
    }
}

pub async fn template() -> Result<Response, ServerError> {
    let bytes = engine::import_template()?;
    Ok(xlsx_response(TEMPLATE_FILE_NAME, bytes))
}

/// Rows that fail validation are reported in the body; only a workbook
/// that cannot be imported at all is an error status.
pub async fn import(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    multipart: Multipart,
) -> Result<Json<ImportResult>, ServerError> {
    let file = read_file_field(multipart).await?;
    if file.bytes.is_empty() {
        return Err(ServerError::Generic("missing file".to_string()));
    }
    let report = state
        .engine
        .import_workbook(&user.username, &file.bytes)
        .await?;
    Ok(Json(import_result(report)))
}

pub async fn export(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> Result<Response, ServerError> {
    let exported = state.engine.export_book(id, &user.username).await?;
    Ok(xlsx_response(&exported.file_name, exported.bytes))
}
