use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use base64::Engine as _;
use http_body_util::BodyExt;
use migration::MigratorTrait;
use sea_orm::{ConnectionTrait, Database, Statement};
use serde_json::{Value, json};
use tower::ServiceExt;

use engine::{AttachmentStore, Engine};
use server::ServerOptions;

async fn app(attachments: &std::path::Path) -> Router {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    for username in ["alice", "bob"] {
        db.execute(Statement::from_sql_and_values(
            db.get_database_backend(),
            "INSERT INTO users (username, password_hash, role, created_at) VALUES (?, ?, ?, ?)",
            vec![
                username.into(),
                engine::users::password_digest("password").into(),
                "user".into(),
                chrono::Utc::now().into(),
            ],
        ))
        .await
        .unwrap();
    }
    let engine = Engine::builder()
        .database(db.clone())
        .attachments(AttachmentStore::new(attachments))
        .build()
        .await
        .unwrap();
    server::router(engine, db, ServerOptions::default())
}

fn basic(username: &str, password: &str) -> String {
    let encoded =
        base64::engine::general_purpose::STANDARD.encode(format!("{username}:{password}"));
    format!("Basic {encoded}")
}

fn request(method: &str, uri: &str, user: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(user) = user {
        builder = builder.header(header::AUTHORIZATION, basic(user, "password"));
    }
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, bytes.to_vec())
}

async fn send_json(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let (status, bytes) = send(app, request).await;
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

fn multipart(file_name: &str, content_type: &str, bytes: &[u8]) -> (String, Vec<u8>) {
    let boundary = "trip-ledger-boundary";
    let mut body = format!(
        "--{boundary}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\nContent-Type: {content_type}\r\n\r\n"
    )
    .into_bytes();
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());
    (format!("multipart/form-data; boundary={boundary}"), body)
}

fn upload(uri: &str, user: &str, file_name: &str, content_type: &str, bytes: &[u8]) -> Request<Body> {
    let (content_type, body) = multipart(file_name, content_type, bytes);
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::AUTHORIZATION, basic(user, "password"))
        .header(header::CONTENT_TYPE, content_type)
        .body(Body::from(body))
        .unwrap()
}

#[tokio::test]
async fn credentials_are_required() {
    let dir = tempfile::tempdir().unwrap();
    let app = app(dir.path()).await;

    let (status, _) = send(&app, request("GET", "/books", None, None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let wrong = Request::builder()
        .uri("/books")
        .header(header::AUTHORIZATION, basic("alice", "nope"))
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(&app, wrong).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, me) = send_json(&app, request("GET", "/me", Some("alice"), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["username"], "alice");
    assert_eq!(me["role"], "user");
}

#[tokio::test]
async fn book_and_expense_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let app = app(dir.path()).await;

    let (status, book) = send_json(
        &app,
        request(
            "POST",
            "/books",
            Some("alice"),
            Some(json!({"name": " Trip ", "start_date": "2026/2/10"})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(book["name"], "Trip");
    assert_eq!(book["start_date"], "2026-02-10");
    let book_id = book["id"].as_i64().unwrap();

    let (status, _) = send(
        &app,
        request("GET", &format!("/books/{book_id}"), Some("bob"), None),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, expense) = send_json(
        &app,
        request(
            "POST",
            &format!("/books/{book_id}/expenses"),
            Some("alice"),
            Some(json!({
                "date": "2026-02-10",
                "time_range": "09:10-10:35",
                "title": "Train",
                "amount": 560,
                "discount_amount": 60,
                "category": "交通",
                "vehicle_no": "G1234",
                "pay_channel": "支付宝"
            })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(expense["category"], "TRANSPORT");
    assert_eq!(expense["pay_channel"], "ALIPAY");
    assert_eq!(expense["pay_channel_label"], "支付宝");
    assert_eq!(expense["duration_minutes"], 85);
    assert_eq!(expense["net_amount"], 500.0);

    let (status, err) = send_json(
        &app,
        request(
            "POST",
            &format!("/books/{book_id}/expenses"),
            Some("alice"),
            Some(json!({
                "date": "2026-02-10",
                "title": "Taxi",
                "amount": 30,
                "category": "TRANSPORT"
            })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        err["error"],
        "transport expenses require a vehicle or flight number"
    );

    let (status, page) = send_json(
        &app,
        request(
            "GET",
            &format!("/books/{book_id}/expenses?page_size=5&category=TRANSPORT"),
            Some("alice"),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["pagination"]["total"], 1);
    assert_eq!(page["pagination"]["page_size"], 5);

    let (status, summary) = send_json(
        &app,
        request(
            "GET",
            &format!("/books/{book_id}/stats/summary"),
            Some("alice"),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(summary["totalCount"], 1);
    assert_eq!(summary["totalSaved"], 60.0);
    assert_eq!(summary["byCategory"][0]["name"], "TRANSPORT");

    let (status, updated) = send_json(
        &app,
        request(
            "PUT",
            &format!("/books/{book_id}"),
            Some("alice"),
            Some(json!({"start_date": null, "summary": "fun"})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["start_date"], Value::Null);
    assert_eq!(updated["summary"], "fun");

    let (status, _) = send(
        &app,
        request("DELETE", &format!("/books/{book_id}"), Some("alice"), None),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn import_reports_rows_and_export_downloads() {
    let dir = tempfile::tempdir().unwrap();
    let app = app(dir.path()).await;

    let (status, template) = send(
        &app,
        request("GET", "/books/import/template", Some("alice"), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, report) = send_json(
        &app,
        upload(
            "/books/import",
            "alice",
            "template.xlsx",
            "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
            &template,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["created"], true);
    assert_eq!(report["insertedCount"], 1);
    assert_eq!(report["skippedCount"], 0);
    let book_id = report["bookId"].as_i64().unwrap();

    let (status, err) = send_json(
        &app,
        upload("/books/import", "alice", "junk.xlsx", "text/plain", b"junk"),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(err["error"].as_str().unwrap().contains("xlsx"));

    let response = app
        .clone()
        .oneshot(request(
            "GET",
            &format!("/books/{book_id}/export"),
            Some("alice"),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let disposition = response.headers()[header::CONTENT_DISPOSITION]
        .to_str()
        .unwrap()
        .to_string();
    assert!(disposition.starts_with("attachment; filename=\""));
    assert!(disposition.ends_with("-export.xlsx\""));
}

#[tokio::test]
async fn preview_links_gate_anonymous_reads() {
    let dir = tempfile::tempdir().unwrap();
    let app = app(dir.path()).await;

    let (_, book) = send_json(
        &app,
        request("POST", "/books", Some("alice"), Some(json!({"name": "Trip"}))),
    )
    .await;
    let book_id = book["id"].as_i64().unwrap();
    let (_, expense) = send_json(
        &app,
        request(
            "POST",
            &format!("/books/{book_id}/expenses"),
            Some("alice"),
            Some(json!({
                "date": "2026-02-10",
                "title": "Lunch",
                "amount": 30,
                "category": "FOOD"
            })),
        ),
    )
    .await;
    let expense_id = expense["id"].as_i64().unwrap();
    let (status, attachment) = send_json(
        &app,
        upload(
            &format!("/expenses/{expense_id}/attachments"),
            "alice",
            "receipt.png",
            "image/png",
            b"\x89PNG",
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let file_name = attachment["file_name"].as_str().unwrap().to_string();

    let (status, status_body) = send_json(
        &app,
        request(
            "PUT",
            &format!("/books/{book_id}/preview-status"),
            Some("alice"),
            Some(json!({"enabled": true})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(status_body["enabled"], true);
    let preview_id = status_body["preview_id"].as_str().unwrap().to_string();

    let base = format!("/books/preview/books/{preview_id}");
    let (status, shared) = send_json(&app, request("GET", &base, None, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(shared["name"], "Trip");
    assert_eq!(shared["show_receipts"], false);

    let (status, page) =
        send_json(&app, request("GET", &format!("{base}/expenses"), None, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["items"][0]["title"], "Lunch");

    let (status, _) = send(
        &app,
        request(
            "GET",
            &format!("{base}/expense-attachments/{file_name}"),
            None,
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    send(
        &app,
        request(
            "PUT",
            &format!("/books/{book_id}/preview-settings"),
            Some("alice"),
            Some(json!({"show_receipts": true})),
        ),
    )
    .await;
    let (status, bytes) = send(
        &app,
        request(
            "GET",
            &format!("{base}/expense-attachments/{file_name}"),
            None,
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(bytes, b"\x89PNG");

    send(
        &app,
        request(
            "PUT",
            &format!("/books/{book_id}/preview-status"),
            Some("alice"),
            Some(json!({"enabled": false})),
        ),
    )
    .await;
    let (disabled, disabled_body) = send_json(&app, request("GET", &base, None, None)).await;
    let (unknown, unknown_body) = send_json(
        &app,
        request("GET", "/books/preview/books/not-a-secret", None, None),
    )
    .await;
    assert_eq!(disabled, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown, StatusCode::UNAUTHORIZED);
    assert_eq!(disabled_body, unknown_body);

    let (_, token) = send_json(
        &app,
        request(
            "GET",
            &format!("/books/{book_id}/preview-token"),
            Some("alice"),
            None,
        ),
    )
    .await;
    assert_eq!(token["preview_id"], preview_id.as_str());
}

#[tokio::test]
async fn pay_channels_crud() {
    let dir = tempfile::tempdir().unwrap();
    let app = app(dir.path()).await;

    let (status, channel) = send_json(
        &app,
        request(
            "POST",
            "/payment-channels",
            Some("alice"),
            Some(json!({"value": "cmb", "label": "招行"})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(channel["value"], "CMB");
    let id = channel["id"].as_i64().unwrap();

    let (status, _) = send(
        &app,
        request(
            "POST",
            "/payment-channels",
            Some("alice"),
            Some(json!({"value": "CMB", "label": "again"})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, renamed) = send_json(
        &app,
        request(
            "PUT",
            &format!("/payment-channels/{id}"),
            Some("alice"),
            Some(json!({"label": "招商银行"})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(renamed["label"], "招商银行");

    let (status, _) = send(
        &app,
        request("DELETE", &format!("/payment-channels/{id}"), Some("bob"), None),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &app,
        request("DELETE", &format!("/payment-channels/{id}"), Some("alice"), None),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, channels) =
        send_json(&app, request("GET", "/payment-channels", Some("alice"), None)).await;
    assert_eq!(channels, json!([]));
}
