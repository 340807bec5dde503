//! Expense API endpoints

use api_types::expense::{ExpenseListQuery, ExpenseListResponse, ExpenseNew, ExpenseView};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use engine::{ExpenseFilter, ExpenseInput, NumberField, users};

use crate::{ServerError, server::ServerState, views};

fn expense_input(payload: ExpenseNew) -> ExpenseInput {
    ExpenseInput {
        date: payload.date,
        time_range: payload.time_range.unwrap_or_default(),
        title: payload.title,
        amount: NumberField::from_number(payload.amount),
        category: payload.category,
        duration_display: payload.duration_display.unwrap_or_default(),
        discount_amount: NumberField::from_number(payload.discount_amount),
        discount_note: payload.discount_note.unwrap_or_default(),
        currency: payload.currency.unwrap_or_default(),
        vehicle_no: payload.vehicle_no.unwrap_or_default(),
        pay_channel: payload.pay_channel.unwrap_or_default(),
        remark: payload.remark.unwrap_or_default(),
    }
}

pub fn filter(query: ExpenseListQuery) -> ExpenseFilter {
    ExpenseFilter {
        category: query.category,
        pay_channel: query.pay_channel,
        date_from: query.date_from,
        date_to: query.date_to,
        keyword: query.keyword,
        page: query.page,
        page_size: query.page_size,
    }
}

pub async fn list(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Path(book_id): Path<i64>,
    Query(query): Query<ExpenseListQuery>,
) -> Result<Json<ExpenseListResponse>, ServerError> {
    let page = state
        .engine
        .list_expenses(book_id, &user.username, &filter(query))
        .await?;
    let registry = state.engine.pay_channel_registry(&user.username).await?;
    Ok(Json(views::expense_page(page, &registry)))
}

pub async fn create(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Path(book_id): Path<i64>,
    Json(payload): Json<ExpenseNew>,
) -> Result<(StatusCode, Json<ExpenseView>), ServerError> {
    let expense = state
        .engine
        .create_expense(book_id, &user.username, &expense_input(payload))
        .await?;
    let registry = state.engine.pay_channel_registry(&user.username).await?;
    Ok((StatusCode::CREATED, Json(views::expense(expense, &registry))))
}

pub async fn get(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> Result<Json<ExpenseView>, ServerError> {
    let expense = state.engine.expense(id, &user.username).await?;
    let registry = state.engine.pay_channel_registry(&user.username).await?;
    Ok(Json(views::expense(expense, &registry)))
}

/// Full replacement of an expense.
pub async fn update(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<ExpenseNew>,
) -> Result<Json<ExpenseView>, ServerError> {
    let expense = state
        .engine
        .update_expense(id, &user.username, &expense_input(payload))
        .await?;
    let registry = state.engine.pay_channel_registry(&user.username).await?;
    Ok(Json(views::expense(expense, &registry)))
}

pub async fn delete(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_expense(id, &user.username).await?;
    Ok(StatusCode::NO_CONTENT)
}
