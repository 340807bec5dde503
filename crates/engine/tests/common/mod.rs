#![allow(dead_code)]

use chrono::Utc;
use rust_xlsxwriter::{Format, Workbook};
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Statement};

use engine::{AttachmentStore, Engine, ExpenseInput, NumberField};
use migration::MigratorTrait;

pub const ALICE: &str = "alice";
pub const BOB: &str = "bob";

pub async fn insert_user(db: &DatabaseConnection, username: &str) {
    let backend = db.get_database_backend();
    db.execute(Statement::from_sql_and_values(
        backend,
        "INSERT INTO users (username, password_hash, role, created_at) VALUES (?, ?, ?, ?)",
        vec![
            username.into(),
            "5e884898da28047151d0e56f8dc6292773603d0d6aabbdd62a11ef721d1542d8".into(),
            "user".into(),
            Utc::now().into(),
        ],
    ))
    .await
    .unwrap();
}

pub async fn engine_with_store(store: AttachmentStore) -> (Engine, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    insert_user(&db, ALICE).await;
    insert_user(&db, BOB).await;
    let engine = Engine::builder()
        .database(db.clone())
        .attachments(store)
        .build()
        .await
        .unwrap();
    (engine, db)
}

pub async fn engine_with_db() -> (Engine, DatabaseConnection) {
    let dir = std::env::temp_dir().join("trip_ledger_engine_tests");
    engine_with_store(AttachmentStore::new(dir)).await
}

pub async fn count(db: &DatabaseConnection, sql: &str) -> i64 {
    let backend = db.get_database_backend();
    db.query_one(Statement::from_string(backend, sql.to_string()))
        .await
        .unwrap()
        .unwrap()
        .try_get::<i64>("", "n")
        .unwrap()
}

/// A direct-entry expense that passes every check.
pub fn lunch(date: &str, time_range: &str, amount: f64) -> ExpenseInput {
    ExpenseInput {
        date: date.to_string(),
        time_range: time_range.to_string(),
        title: "午餐".to_string(),
        amount: NumberField::Value(amount),
        category: "餐饮".to_string(),
        ..ExpenseInput::default()
    }
}

pub enum Value<'a> {
    Text(&'a str),
    Number(f64),
    /// A serial day number formatted as a date.
    Date(f64),
}

/// Workbook with a `账本` sheet and a `花销` sheet. Row 0 of each slice is
/// the header row; `None` leaves a cell empty.
pub fn workbook(book: &[&[&str]], expenses: &[Vec<Option<Value<'_>>>]) -> Vec<u8> {
    let mut workbook = Workbook::new();

    let sheet = workbook.add_worksheet();
    sheet.set_name("账本").unwrap();
    for (row, cells) in (0u32..).zip(book) {
        for (column, text) in (0u16..).zip(cells.iter()) {
            sheet.write_string(row, column, *text).unwrap();
        }
    }

    let date_format = Format::new().set_num_format("yyyy-mm-dd");
    let sheet = workbook.add_worksheet();
    sheet.set_name("花销").unwrap();
    for (row, cells) in (0u32..).zip(expenses) {
        for (column, cell) in (0u16..).zip(cells) {
            match cell {
                Some(Value::Text(text)) => {
                    sheet.write_string(row, column, *text).unwrap();
                }
                Some(Value::Number(value)) => {
                    sheet.write_number(row, column, *value).unwrap();
                }
                Some(Value::Date(serial)) => {
                    sheet
                        .write_number_with_format(row, column, *serial, &date_format)
                        .unwrap();
                }
                None => {}
            }
        }
    }

    workbook.save_to_buffer().unwrap()
}

pub fn text(value: &str) -> Option<Value<'_>> {
    Some(Value::Text(value))
}

pub fn number<'a>(value: f64) -> Option<Value<'a>> {
    Some(Value::Number(value))
}

pub fn date_serial<'a>(serial: f64) -> Option<Value<'a>> {
    Some(Value::Date(serial))
}
