mod common;

use common::{ALICE, BOB, engine_with_db, lunch};
use engine::{BookNew, EngineError};

#[tokio::test]
async fn create_normalizes_and_rejects_duplicates() {
    let (engine, _db) = engine_with_db().await;

    let channel = engine
        .create_pay_channel(ALICE, " cmb ", " 招行信用卡 ")
        .await
        .unwrap();
    assert_eq!(channel.value, "CMB");
    assert_eq!(channel.label, "招行信用卡");

    let err = engine
        .create_pay_channel(ALICE, "CMB", "another")
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::ExistingKey(_)));

    // Same code for another user is fine.
    engine.create_pay_channel(BOB, "cmb", "CMB").await.unwrap();

    let legacy = engine
        .create_pay_channel(ALICE, "meituan", "美团")
        .await
        .unwrap();
    assert_eq!(legacy.value, "MEITUAN_MONTHLY");

    let values: Vec<String> = engine
        .list_pay_channels(ALICE)
        .await
        .unwrap()
        .into_iter()
        .map(|channel| channel.value)
        .collect();
    assert_eq!(values, vec!["CMB", "MEITUAN_MONTHLY"]);
}

#[tokio::test]
async fn value_and_label_are_bounded() {
    let (engine, _db) = engine_with_db().await;

    assert!(matches!(
        engine.create_pay_channel(ALICE, "", "x").await,
        Err(EngineError::InvalidInput(_))
    ));
    assert!(matches!(
        engine.create_pay_channel(ALICE, "x", "  ").await,
        Err(EngineError::InvalidInput(_))
    ));
    assert!(matches!(
        engine.create_pay_channel(ALICE, &"v".repeat(51), "x").await,
        Err(EngineError::InvalidInput(_))
    ));
    // Limits count characters, not bytes.
    engine
        .create_pay_channel(ALICE, "long", &"卡".repeat(100))
        .await
        .unwrap();
}

#[tokio::test]
async fn registry_lookups_follow_user_rows() {
    let (engine, _db) = engine_with_db().await;
    engine.create_pay_channel(ALICE, "cmb", "招行").await.unwrap();
    engine.create_pay_channel(ALICE, "cash", "零钱").await.unwrap();

    assert_eq!(
        engine.resolve_pay_channel(ALICE, "招行").await.unwrap(),
        Some("CMB".to_string())
    );
    assert_eq!(
        engine.resolve_pay_channel(ALICE, "支付宝").await.unwrap(),
        Some("ALIPAY".to_string())
    );
    assert_eq!(engine.resolve_pay_channel(BOB, "招行").await.unwrap(), None);
    assert!(engine.is_pay_channel_allowed(ALICE, "cmb").await.unwrap());
    assert!(!engine.is_pay_channel_allowed(BOB, "cmb").await.unwrap());
    assert_eq!(
        engine.pay_channel_label(ALICE, Some("CASH")).await.unwrap(),
        "零钱"
    );
    assert_eq!(
        engine.pay_channel_label(BOB, Some("CASH")).await.unwrap(),
        "现金"
    );
    assert_eq!(engine.pay_channel_label(ALICE, None).await.unwrap(), "其他");
}

#[tokio::test]
async fn relabel_and_delete() {
    let (engine, _db) = engine_with_db().await;
    let channel = engine.create_pay_channel(ALICE, "cmb", "招行").await.unwrap();

    let renamed = engine
        .update_pay_channel(channel.id, ALICE, "招商银行")
        .await
        .unwrap();
    assert_eq!(renamed.value, "CMB");
    assert_eq!(renamed.label, "招商银行");

    assert_eq!(
        engine
            .update_pay_channel(channel.id, BOB, "mine")
            .await
            .unwrap_err(),
        EngineError::KeyNotFound("payment channel".to_string())
    );

    let book = engine
        .create_book(
            ALICE,
            BookNew {
                name: "Trip".to_string(),
                ..BookNew::default()
            },
        )
        .await
        .unwrap();
    let mut input = lunch("2026-02-10", "", 10.0);
    input.pay_channel = "招商银行".to_string();
    let expense = engine.create_expense(book.id, ALICE, &input).await.unwrap();
    assert_eq!(expense.pay_channel.as_deref(), Some("CMB"));

    engine.delete_pay_channel(channel.id, ALICE).await.unwrap();
    assert!(engine.list_pay_channels(ALICE).await.unwrap().is_empty());

    // Stored codes survive; new entries can no longer use the channel.
    let kept = engine.expense(expense.id, ALICE).await.unwrap();
    assert_eq!(kept.pay_channel.as_deref(), Some("CMB"));
    assert_eq!(
        engine.create_expense(book.id, ALICE, &input).await.unwrap_err(),
        EngineError::InvalidInput("invalid payment channel".to_string())
    );
}
