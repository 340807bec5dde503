use axum::{Json, http::StatusCode, response::IntoResponse};
use engine::EngineError;

use serde::Serialize;
pub use server::{ServerOptions, router, run_with_listener, spawn_with_listener};

mod attachments;
mod books;
mod expenses;
mod import_export;
mod pay_channels;
mod previews;
mod server;
mod user;
mod views;

pub mod types {
    pub mod book {
        pub use api_types::book::{BookNew, BookUpdate, BookView, PreviewBookView};
    }

    pub mod expense {
        pub use api_types::expense::{
            ExpenseListQuery, ExpenseListResponse, ExpenseNew, ExpenseView, Pagination,
        };
    }

    pub mod attachment {
        pub use api_types::attachment::AttachmentView;
    }

    pub mod pay_channel {
        pub use api_types::pay_channel::{PayChannelNew, PayChannelUpdate, PayChannelView};
    }

    pub mod stats {
        pub use api_types::stats::{
            DailyQuery, DailyStat, GroupStat, LeaderboardItem, LeaderboardResponse, SummaryStats,
        };
    }

    pub mod import {
        pub use api_types::import::{ImportResult, RowError};
    }

    pub mod preview {
        pub use api_types::preview::{
            PreviewSettings, PreviewStatus, PreviewStatusUpdate, PreviewToken,
        };
    }

    pub mod user {
        pub use api_types::user::Me;
    }
}

pub enum ServerError {
    Engine(EngineError),
    Generic(String),
}

#[derive(Serialize)]
struct Error {
    error: String,
}

fn status_for_engine_error(err: &EngineError) -> StatusCode {
    match err {
        EngineError::Unauthorized => StatusCode::UNAUTHORIZED,
        EngineError::Forbidden(_) => StatusCode::FORBIDDEN,
        EngineError::KeyNotFound(_) => StatusCode::NOT_FOUND,
        EngineError::ExistingKey(_) => StatusCode::CONFLICT,
        EngineError::InvalidInput(_) | EngineError::InvalidWorkbook(_) => StatusCode::BAD_REQUEST,
        EngineError::Workbook(_) | EngineError::Io(_) | EngineError::Database(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

fn message_for_engine_error(err: EngineError) -> String {
    if err.is_internal() {
        tracing::error!("request failed: {err}");
        return "internal server error".to_string();
    }
    err.to_string()
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let (status, error) = match self {
            ServerError::Engine(err) => (status_for_engine_error(&err), message_for_engine_error(err)),
            ServerError::Generic(err) => (StatusCode::BAD_REQUEST, err),
        };

        (status, Json(Error { error })).into_response()
    }
}

impl From<EngineError> for ServerError {
    fn from(value: EngineError) -> Self {
        Self::Engine(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engine_forbidden_maps_to_403() {
        let res = ServerError::from(EngineError::Forbidden("hidden".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn engine_not_found_maps_to_404() {
        let res = ServerError::from(EngineError::KeyNotFound("book".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn engine_conflict_maps_to_409() {
        let res = ServerError::from(EngineError::ExistingKey("CMB".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn engine_validation_maps_to_400() {
        let res = ServerError::from(EngineError::InvalidInput("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let res =
            ServerError::from(EngineError::InvalidWorkbook("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn engine_unauthorized_maps_to_401() {
        let res = ServerError::from(EngineError::Unauthorized).into_response();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn internal_faults_map_to_500() {
        let err = std::io::Error::other("disk on fire");
        let res = ServerError::from(EngineError::Io(err)).into_response();
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn generic_maps_to_400() {
        let res = ServerError::Generic("bad".to_string()).into_response();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }
}
