//! Payment channel API endpoints

use api_types::pay_channel::{PayChannelNew, PayChannelUpdate, PayChannelView};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use engine::users;

use crate::{ServerError, server::ServerState, views};

pub async fn list(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
) -> Result<Json<Vec<PayChannelView>>, ServerError> {
    let channels = state.engine.list_pay_channels(&user.username).await?;
    Ok(Json(channels.into_iter().map(views::pay_channel).collect()))
}

pub async fn create(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<PayChannelNew>,
) -> Result<(StatusCode, Json<PayChannelView>), ServerError> {
    let channel = state
        .engine
        .create_pay_channel(&user.username, &payload.value, &payload.label)
        .await?;
    Ok((StatusCode::CREATED, Json(views::pay_channel(channel))))
}

/// Only the label can change; the code is fixed once created.
pub async fn update(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<PayChannelUpdate>,
) -> Result<Json<PayChannelView>, ServerError> {
    let channel = state
        .engine
        .update_pay_channel(id, &user.username, &payload.label)
        .await?;
    Ok(Json(views::pay_channel(channel)))
}

pub async fn delete(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_pay_channel(id, &user.username).await?;
    Ok(StatusCode::NO_CONTENT)
}
