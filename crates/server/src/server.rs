use axum::{
    Router,
    extract::{DefaultBodyLimit, Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::Response,
    routing::{get, post, put},
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Basic},
};
use sea_orm::{DatabaseConnection, EntityTrait};

use std::sync::Arc;

use crate::{attachments, books, expenses, import_export, pay_channels, previews, user};
use engine::{Engine, users};

/// Default upper bound for request bodies, uploads included.
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

#[derive(Clone, Copy, Debug)]
pub struct ServerOptions {
    pub max_upload_bytes: usize,
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self {
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
    pub db: DatabaseConnection,
}

async fn auth(
    auth_header: Option<TypedHeader<Authorization<Basic>>>,
    State(state): State<ServerState>,
    mut request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let Some(TypedHeader(auth_header)) = auth_header else {
        return Err(StatusCode::UNAUTHORIZED);
    };
    if auth_header.username().is_empty() || auth_header.password().is_empty() {
        return Err(StatusCode::UNAUTHORIZED);
    }

    let user = users::Entity::find_by_id(auth_header.username().to_string())
        .one(&state.db)
        .await
        .map_err(|err| {
            tracing::error!("failed to load user: {err}");
            StatusCode::INTERNAL_SERVER_ERROR
        })?
        .filter(|user| user.verify_password(auth_header.password()))
        .ok_or(StatusCode::UNAUTHORIZED)?;

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

/// Routes reachable with a preview secret alone.
fn preview_router() -> Router<ServerState> {
    Router::new()
        .route("/books/preview/books/{preview_id}", get(previews::book))
        .route(
            "/books/preview/books/{preview_id}/stats/summary",
            get(previews::summary),
        )
        .route(
            "/books/preview/books/{preview_id}/stats/daily",
            get(previews::daily),
        )
        .route(
            "/books/preview/books/{preview_id}/expenses",
            get(previews::expenses),
        )
        .route(
            "/books/preview/books/{preview_id}/expenses/{expense_id}/attachments",
            get(previews::attachments),
        )
        .route(
            "/books/preview/books/{preview_id}/expense-attachments/{file_name}",
            get(previews::attachment_file),
        )
}

fn owner_router(state: ServerState) -> Router<ServerState> {
    Router::new()
        .route("/me", get(user::me))
        .route("/books", get(books::list).post(books::create))
        .route("/books/stats/leaderboard", get(books::leaderboard))
        .route("/books/import/template", get(import_export::template))
        .route("/books/import", post(import_export::import))
        .route(
            "/books/{id}",
            get(books::get).put(books::update).delete(books::delete),
        )
        .route("/books/{id}/stats/summary", get(books::summary))
        .route("/books/{id}/stats/daily", get(books::daily))
        .route("/books/{id}/export", get(import_export::export))
        .route(
            "/books/{id}/expenses",
            get(expenses::list).post(expenses::create),
        )
        .route(
            "/books/{id}/preview-status",
            get(previews::status).put(previews::set_status),
        )
        .route("/books/{id}/preview-settings", put(previews::set_settings))
        .route("/books/{id}/preview-token", get(previews::token))
        .route(
            "/expenses/{id}",
            get(expenses::get).put(expenses::update).delete(expenses::delete),
        )
        .route(
            "/expenses/{id}/attachments",
            get(attachments::list).post(attachments::upload),
        )
        .route(
            "/expenses/{id}/attachments/{attachment_id}",
            axum::routing::delete(attachments::delete),
        )
        .route(
            "/expense-attachments/{file_name}",
            get(attachments::file),
        )
        .route(
            "/payment-channels",
            get(pay_channels::list).post(pay_channels::create),
        )
        .route(
            "/payment-channels/{id}",
            put(pay_channels::update).delete(pay_channels::delete),
        )
        .route_layer(middleware::from_fn_with_state(state, auth))
}

pub fn router(engine: Engine, db: DatabaseConnection, options: ServerOptions) -> Router {
    let state = ServerState {
        engine: Arc::new(engine),
        db,
    };

    owner_router(state.clone())
        .merge(preview_router())
        .layer(DefaultBodyLimit::max(options.max_upload_bytes))
        .with_state(state)
}

pub async fn run_with_listener(
    engine: Engine,
    db: DatabaseConnection,
    options: ServerOptions,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, router(engine, db, options)).await
}

pub fn spawn_with_listener(
    engine: Engine,
    db: DatabaseConnection,
    options: ServerOptions,
    listener: tokio::net::TcpListener,
) -> Result<std::net::SocketAddr, std::io::Error> {
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        if let Err(err) = run_with_listener(engine, db, options, listener).await {
            tracing::error!("server failed: {err}");
        }
    });

    Ok(addr)
}
