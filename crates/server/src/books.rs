//! Book API endpoints

use api_types::{
    book::{BookNew, BookUpdate, BookView},
    stats::{DailyQuery, DailyStat, LeaderboardResponse, SummaryStats},
};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use engine::users;

use crate::{ServerError, server::ServerState, views};

pub async fn list(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
) -> Result<Json<Vec<BookView>>, ServerError> {
    let books = state.engine.list_books(&user.username).await?;
    Ok(Json(books.into_iter().map(views::book).collect()))
}

pub async fn create(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<BookNew>,
) -> Result<(StatusCode, Json<BookView>), ServerError> {
    let book = state
        .engine
        .create_book(
            &user.username,
            engine::BookNew {
                name: payload.name,
                start_date: payload.start_date,
                end_date: payload.end_date,
                description: payload.description,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(views::book(book))))
}

pub async fn get(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> Result<Json<BookView>, ServerError> {
    let book = state.engine.book(id, &user.username).await?;
    Ok(Json(views::book(book)))
}

/// Partial update; see [`BookUpdate`] for the null semantics.
pub async fn update(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<BookUpdate>,
) -> Result<Json<BookView>, ServerError> {
    let patch = engine::BookPatch {
        name: payload.name,
        start_date: payload.start_date,
        end_date: payload.end_date,
        description: payload.description,
        summary: payload.summary,
    };
    if patch.is_empty() {
        return Err(ServerError::Generic("nothing to update".to_string()));
    }
    let book = state.engine.update_book(id, &user.username, patch).await?;
    Ok(Json(views::book(book)))
}

pub async fn delete(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_book(id, &user.username).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn summary(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> Result<Json<SummaryStats>, ServerError> {
    let summary = state.engine.book_summary(id, &user.username).await?;
    Ok(Json(views::summary(summary)))
}

pub async fn daily(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Query(query): Query<DailyQuery>,
) -> Result<Json<Vec<DailyStat>>, ServerError> {
    let days = state
        .engine
        .daily_stats(
            id,
            &user.username,
            query.start_date.as_deref(),
            query.end_date.as_deref(),
        )
        .await?;
    Ok(Json(views::daily(days)))
}

/// Books of the caller ranked by net spend.
pub async fn leaderboard(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
) -> Result<Json<LeaderboardResponse>, ServerError> {
    let board = state.engine.leaderboard(&user.username).await?;
    Ok(Json(views::leaderboard(board)))
}
