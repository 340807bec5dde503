//! Rewrite the short pay-channel codes `MEITUAN` and `DOUYIN` to
//! `MEITUAN_MONTHLY` and `DOUYIN_MONTHLY`.
//!
//! Expenses are rewritten first. A user's short-form channel row is dropped
//! when the `_MONTHLY` row already exists, otherwise renamed. Running it on
//! clean data changes nothing.

use sea_orm::{ConnectionTrait, DbErr, Statement};
use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

const LEGACY_CODES: [(&str, &str); 2] = [
    ("MEITUAN", "MEITUAN_MONTHLY"),
    ("DOUYIN", "DOUYIN_MONTHLY"),
];

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        let backend = db.get_database_backend();

        for (legacy, current) in LEGACY_CODES {
            db.execute(Statement::from_sql_and_values(
                backend,
                "UPDATE expenses SET pay_channel = ? WHERE UPPER(TRIM(pay_channel)) = ?;",
                vec![current.into(), legacy.into()],
            ))
            .await?;

            db.execute(Statement::from_sql_and_values(
                backend,
                "DELETE FROM payment_channels \
                 WHERE UPPER(TRIM(value)) = ? \
                 AND EXISTS (SELECT 1 FROM payment_channels AS twin \
                             WHERE twin.user_id = payment_channels.user_id AND twin.value = ?);",
                vec![legacy.into(), current.into()],
            ))
            .await?;

            db.execute(Statement::from_sql_and_values(
                backend,
                "UPDATE payment_channels SET value = ? WHERE UPPER(TRIM(value)) = ?;",
                vec![current.into(), legacy.into()],
            ))
            .await?;
        }

        Ok(())
    }

    async fn down(&self, _manager: &SchemaManager) -> Result<(), DbErr> {
        // Data fix only; there is nothing to restore.
        Ok(())
    }
}
