mod common;

use common::{ALICE, BOB, engine_with_db, lunch};
use engine::{BookNew, Category, EngineError, ExpenseFilter, NumberField};

async fn book(engine: &engine::Engine) -> i64 {
    engine
        .create_book(
            ALICE,
            BookNew {
                name: "Trip".to_string(),
                ..BookNew::default()
            },
        )
        .await
        .unwrap()
        .id
}

#[tokio::test]
async fn direct_entry_uses_the_import_checks() {
    let (engine, _db) = engine_with_db().await;
    let book_id = book(&engine).await;

    let mut input = lunch("2026-02-10", "12:00-13:00", 30.0);
    input.discount_amount = NumberField::Value(30.01);
    let err = engine.create_expense(book_id, ALICE, &input).await.unwrap_err();
    assert_eq!(
        err,
        EngineError::InvalidInput("discount amount exceeds amount".to_string())
    );

    input.discount_amount = NumberField::Value(30.0);
    let expense = engine.create_expense(book_id, ALICE, &input).await.unwrap();
    assert_eq!(expense.net_amount(), 0.0);
    assert_eq!(expense.duration_minutes, Some(60));
    assert_eq!(expense.category, Category::Food);

    let mut input = lunch("2026-02-10", "", 30.0);
    input.category = "transport".to_string();
    let err = engine.create_expense(book_id, ALICE, &input).await.unwrap_err();
    assert_eq!(
        err,
        EngineError::InvalidInput(
            "transport expenses require a vehicle or flight number".to_string()
        )
    );

    let mut input = lunch("2026-02-10", "noon", 30.0);
    input.pay_channel = "paypal".to_string();
    let err = engine.create_expense(book_id, ALICE, &input).await.unwrap_err();
    assert_eq!(err, EngineError::InvalidInput("invalid time range".to_string()));
}

#[tokio::test]
async fn expenses_of_other_users_are_not_found() {
    let (engine, _db) = engine_with_db().await;
    let book_id = book(&engine).await;
    let expense = engine
        .create_expense(book_id, ALICE, &lunch("2026-02-10", "", 30.0))
        .await
        .unwrap();

    let not_found = EngineError::KeyNotFound("expense".to_string());
    assert_eq!(engine.expense(expense.id, BOB).await.unwrap_err(), not_found);
    assert_eq!(
        engine
            .update_expense(expense.id, BOB, &lunch("2026-02-10", "", 1.0))
            .await
            .unwrap_err(),
        not_found
    );
    assert_eq!(
        engine.delete_expense(expense.id, BOB).await.unwrap_err(),
        not_found
    );
    assert!(
        engine
            .create_expense(book_id, BOB, &lunch("2026-02-10", "", 1.0))
            .await
            .is_err()
    );
}

#[tokio::test]
async fn update_replaces_every_field() {
    let (engine, _db) = engine_with_db().await;
    let book_id = book(&engine).await;
    let mut input = lunch("2026-02-10", "12:00-13:00", 30.0);
    input.remark = "spicy".to_string();
    let expense = engine.create_expense(book_id, ALICE, &input).await.unwrap();

    let mut replacement = lunch("2026-02-11", "", 45.5);
    replacement.title = "Dinner".to_string();
    replacement.pay_channel = "现金".to_string();
    let updated = engine
        .update_expense(expense.id, ALICE, &replacement)
        .await
        .unwrap();

    assert_eq!(updated.id, expense.id);
    assert_eq!(updated.book_id, book_id);
    assert_eq!(updated.date, "2026-02-11");
    assert_eq!(updated.title, "Dinner");
    assert_eq!(updated.time_range, None);
    assert_eq!(updated.duration_minutes, None);
    assert_eq!(updated.remark, None);
    assert_eq!(updated.pay_channel.as_deref(), Some("CASH"));
    assert_eq!(updated.created_at, expense.created_at);
}

#[tokio::test]
async fn list_orders_by_most_recent_activity() {
    let (engine, _db) = engine_with_db().await;
    let book_id = book(&engine).await;

    let titled = |date: &str, time: &str, title: &str| {
        let mut input = lunch(date, time, 10.0);
        input.title = title.to_string();
        input
    };
    for input in [
        titled("2026-02-10", "08:00-09:00", "breakfast"),
        titled("2026-02-10", "", "untimed"),
        titled("2026-02-10", "18:30-19:30", "dinner"),
        titled("2026-02-11", "07:00-07:30", "next day"),
        titled("2026-02-10", "18:30-19:00", "dessert"),
    ] {
        engine.create_expense(book_id, ALICE, &input).await.unwrap();
    }

    let page = engine
        .list_expenses(book_id, ALICE, &ExpenseFilter::default())
        .await
        .unwrap();
    let titles: Vec<&str> = page.items.iter().map(|e| e.title.as_str()).collect();
    assert_eq!(
        titles,
        vec!["next day", "dessert", "dinner", "breakfast", "untimed"]
    );
}

#[tokio::test]
async fn filters_and_pagination() {
    let (engine, _db) = engine_with_db().await;
    let book_id = book(&engine).await;

    for day in 1..=25 {
        let mut input = lunch(&format!("2026-03-{day:02}"), "", f64::from(day));
        if day % 5 == 0 {
            input.category = "购物".to_string();
            input.pay_channel = "alipay".to_string();
            input.remark = format!("souvenir {day}");
        }
        engine.create_expense(book_id, ALICE, &input).await.unwrap();
    }

    let first = engine
        .list_expenses(book_id, ALICE, &ExpenseFilter::default())
        .await
        .unwrap();
    assert_eq!(first.total, 25);
    assert_eq!(first.page, 1);
    assert_eq!(first.page_size, 20);
    assert_eq!(first.total_pages, 2);
    assert_eq!(first.items.len(), 20);

    let last = engine
        .list_expenses(
            book_id,
            ALICE,
            &ExpenseFilter {
                page: Some(2),
                ..ExpenseFilter::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(last.items.len(), 5);
    assert_eq!(last.items[4].date, "2026-03-01");

    let clamped = engine
        .list_expenses(
            book_id,
            ALICE,
            &ExpenseFilter {
                page: Some(0),
                page_size: Some(1000),
                ..ExpenseFilter::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(clamped.page, 1);
    assert_eq!(clamped.page_size, 100);
    assert_eq!(clamped.items.len(), 25);

    let shopping = engine
        .list_expenses(
            book_id,
            ALICE,
            &ExpenseFilter {
                category: Some("购物".to_string()),
                pay_channel: Some("ALIPAY".to_string()),
                ..ExpenseFilter::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(shopping.total, 5);

    let ranged = engine
        .list_expenses(
            book_id,
            ALICE,
            &ExpenseFilter {
                date_from: Some("2026-03-10".to_string()),
                date_to: Some("2026-03-12".to_string()),
                ..ExpenseFilter::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(ranged.total, 3);

    let keyword = engine
        .list_expenses(
            book_id,
            ALICE,
            &ExpenseFilter {
                keyword: Some("souvenir 20".to_string()),
                ..ExpenseFilter::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(keyword.total, 1);
    assert_eq!(keyword.items[0].date, "2026-03-20");
}
