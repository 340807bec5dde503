//! Preview gate: owner controls plus the anonymous read-only mirror.
//!
//! The anonymous handlers take the secret from the path and never look at
//! credentials. Any secret that does not resolve answers with the same 401.

use api_types::{
    attachment::AttachmentView,
    book::PreviewBookView,
    expense::{ExpenseListQuery, ExpenseListResponse},
    preview::{PreviewSettings, PreviewStatus, PreviewStatusUpdate, PreviewToken},
    stats::{DailyQuery, DailyStat, SummaryStats},
};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    response::Response,
};
use engine::users;

use crate::{ServerError, attachments, expenses, server::ServerState, views};

pub async fn status(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> Result<Json<PreviewStatus>, ServerError> {
    let status = state.engine.preview_status(id, &user.username).await?;
    Ok(Json(views::preview_status(status)))
}

pub async fn set_status(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<PreviewStatusUpdate>,
) -> Result<Json<PreviewStatus>, ServerError> {
    let status = state
        .engine
        .set_preview_enabled(id, &user.username, payload.enabled)
        .await?;
    Ok(Json(views::preview_status(status)))
}

pub async fn set_settings(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<PreviewSettings>,
) -> Result<Json<PreviewStatus>, ServerError> {
    let status = state
        .engine
        .set_preview_show_receipts(id, &user.username, payload.show_receipts)
        .await?;
    Ok(Json(views::preview_status(status)))
}

pub async fn token(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> Result<Json<PreviewToken>, ServerError> {
    let preview_id = state.engine.preview_token(id, &user.username).await?;
    Ok(Json(PreviewToken { preview_id }))
}

pub async fn book(
    State(state): State<ServerState>,
    Path(preview_id): Path<String>,
) -> Result<Json<PreviewBookView>, ServerError> {
    let (book, show_receipts) = state.engine.preview_book(&preview_id).await?;
    Ok(Json(PreviewBookView {
        book: views::book(book),
        show_receipts,
    }))
}

pub async fn summary(
    State(state): State<ServerState>,
    Path(preview_id): Path<String>,
) -> Result<Json<SummaryStats>, ServerError> {
    let summary = state.engine.preview_summary(&preview_id).await?;
    Ok(Json(views::summary(summary)))
}

pub async fn daily(
    State(state): State<ServerState>,
    Path(preview_id): Path<String>,
    Query(query): Query<DailyQuery>,
) -> Result<Json<Vec<DailyStat>>, ServerError> {
    let days = state
        .engine
        .preview_daily(
            &preview_id,
            query.start_date.as_deref(),
            query.end_date.as_deref(),
        )
        .await?;
    Ok(Json(views::daily(days)))
}

/// Expense list of the shared book, labelled with the owner's channel names.
pub async fn expenses(
    State(state): State<ServerState>,
    Path(preview_id): Path<String>,
    Query(query): Query<ExpenseListQuery>,
) -> Result<Json<ExpenseListResponse>, ServerError> {
    let grant = state.engine.resolve_preview(&preview_id).await?;
    let page = state
        .engine
        .preview_expenses(&preview_id, &expenses::filter(query))
        .await?;
    let registry = state.engine.pay_channel_registry(&grant.user_id).await?;
    Ok(Json(views::expense_page(page, &registry)))
}

pub async fn attachments(
    State(state): State<ServerState>,
    Path((preview_id, expense_id)): Path<(String, i64)>,
) -> Result<Json<Vec<AttachmentView>>, ServerError> {
    let attachments = state
        .engine
        .preview_attachments(&preview_id, expense_id)
        .await?;
    Ok(Json(attachments.into_iter().map(views::attachment).collect()))
}

pub async fn attachment_file(
    State(state): State<ServerState>,
    Path((preview_id, file_name)): Path<(String, String)>,
) -> Result<Response, ServerError> {
    let file = state
        .engine
        .preview_attachment_file(&preview_id, &file_name)
        .await?;
    Ok(attachments::file_response(file))
}
