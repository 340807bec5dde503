//! The authenticated caller.

use api_types::user::Me;
use axum::{Extension, Json};
use engine::users;

/// Profile of the user behind the request credentials.
pub async fn me(Extension(user): Extension<users::Model>) -> Json<Me> {
    Json(Me {
        username: user.username,
        nickname: user.nickname,
        role: user.role,
    })
}
