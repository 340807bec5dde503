//! Initial schema.
//!
//! - `users`: identities, keyed by username
//! - `books`: one ledger per trip
//! - `expenses`: expense items of a book
//! - `expense_attachments`: receipt images; the blobs live on disk
//! - `payment_channels`: per-user channel codes and labels
//! - `book_previews`: read-only sharing grant, at most one per book

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
enum Users {
    Table,
    Username,
    PasswordHash,
    Nickname,
    Role,
    CreatedAt,
}

#[derive(Iden)]
enum Books {
    Table,
    Id,
    UserId,
    Name,
    StartDate,
    EndDate,
    Description,
    Summary,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Expenses {
    Table,
    Id,
    BookId,
    Date,
    TimeRange,
    DurationMinutes,
    DurationDisplay,
    Title,
    Amount,
    DiscountAmount,
    DiscountNote,
    Currency,
    VehicleNo,
    PayChannel,
    Category,
    Remark,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum ExpenseAttachments {
    Table,
    Id,
    ExpenseId,
    FileName,
    OriginalName,
    MimeType,
    SizeBytes,
    CreatedAt,
}

#[derive(Iden)]
enum PaymentChannels {
    Table,
    Id,
    UserId,
    Value,
    Label,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum BookPreviews {
    Table,
    BookId,
    UserId,
    Secret,
    EnabledUntil,
    ShowReceipts,
    CreatedAt,
    UpdatedAt,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Users::Username)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Users::PasswordHash).string().not_null())
                    .col(ColumnDef::new(Users::Nickname).string())
                    .col(
                        ColumnDef::new(Users::Role)
                            .string()
                            .not_null()
                            .default("user"),
                    )
                    .col(ColumnDef::new(Users::CreatedAt).timestamp().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Books::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Books::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Books::UserId).string().not_null())
                    .col(ColumnDef::new(Books::Name).string().not_null())
                    .col(ColumnDef::new(Books::StartDate).string())
                    .col(ColumnDef::new(Books::EndDate).string())
                    .col(ColumnDef::new(Books::Description).text())
                    .col(ColumnDef::new(Books::Summary).text())
                    .col(ColumnDef::new(Books::CreatedAt).timestamp().not_null())
                    .col(ColumnDef::new(Books::UpdatedAt).timestamp().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-books-user_id")
                            .from(Books::Table, Books::UserId)
                            .to(Users::Table, Users::Username)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-books-user_id-name")
                    .table(Books::Table)
                    .col(Books::UserId)
                    .col(Books::Name)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Expenses::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Expenses::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Expenses::BookId).integer().not_null())
                    .col(ColumnDef::new(Expenses::Date).string().not_null())
                    .col(ColumnDef::new(Expenses::TimeRange).string())
                    .col(ColumnDef::new(Expenses::DurationMinutes).integer())
                    .col(ColumnDef::new(Expenses::DurationDisplay).string())
                    .col(ColumnDef::new(Expenses::Title).string().not_null())
                    .col(ColumnDef::new(Expenses::Amount).double().not_null())
                    .col(
                        ColumnDef::new(Expenses::DiscountAmount)
                            .double()
                            .not_null()
                            .default(0.0),
                    )
                    .col(ColumnDef::new(Expenses::DiscountNote).string())
                    .col(
                        ColumnDef::new(Expenses::Currency)
                            .string()
                            .not_null()
                            .default("CNY"),
                    )
                    .col(ColumnDef::new(Expenses::VehicleNo).string())
                    .col(ColumnDef::new(Expenses::PayChannel).string())
                    .col(ColumnDef::new(Expenses::Category).string().not_null())
                    .col(ColumnDef::new(Expenses::Remark).text())
                    .col(ColumnDef::new(Expenses::CreatedAt).timestamp().not_null())
                    .col(ColumnDef::new(Expenses::UpdatedAt).timestamp().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-expenses-book_id")
                            .from(Expenses::Table, Expenses::BookId)
                            .to(Books::Table, Books::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-expenses-book_id-date")
                    .table(Expenses::Table)
                    .col(Expenses::BookId)
                    .col(Expenses::Date)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ExpenseAttachments::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ExpenseAttachments::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ExpenseAttachments::ExpenseId)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ExpenseAttachments::FileName)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(ExpenseAttachments::OriginalName).string())
                    .col(ColumnDef::new(ExpenseAttachments::MimeType).string().not_null())
                    .col(
                        ColumnDef::new(ExpenseAttachments::SizeBytes)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ExpenseAttachments::CreatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-expense_attachments-expense_id")
                            .from(ExpenseAttachments::Table, ExpenseAttachments::ExpenseId)
                            .to(Expenses::Table, Expenses::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-expense_attachments-expense_id")
                    .table(ExpenseAttachments::Table)
                    .col(ExpenseAttachments::ExpenseId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(PaymentChannels::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PaymentChannels::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(PaymentChannels::UserId).string().not_null())
                    .col(ColumnDef::new(PaymentChannels::Value).string().not_null())
                    .col(ColumnDef::new(PaymentChannels::Label).string().not_null())
                    .col(
                        ColumnDef::new(PaymentChannels::CreatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PaymentChannels::UpdatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-payment_channels-user_id")
                            .from(PaymentChannels::Table, PaymentChannels::UserId)
                            .to(Users::Table, Users::Username)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-payment_channels-user_id-value-unique")
                    .table(PaymentChannels::Table)
                    .col(PaymentChannels::UserId)
                    .col(PaymentChannels::Value)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(BookPreviews::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(BookPreviews::BookId)
                            .integer()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(BookPreviews::UserId).string().not_null())
                    .col(ColumnDef::new(BookPreviews::Secret).string())
                    .col(
                        ColumnDef::new(BookPreviews::EnabledUntil)
                            .timestamp()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(BookPreviews::ShowReceipts)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(BookPreviews::CreatedAt).timestamp().not_null())
                    .col(ColumnDef::new(BookPreviews::UpdatedAt).timestamp().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-book_previews-book_id")
                            .from(BookPreviews::Table, BookPreviews::BookId)
                            .to(Books::Table, Books::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-book_previews-secret-unique")
                    .table(BookPreviews::Table)
                    .col(BookPreviews::Secret)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(BookPreviews::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(PaymentChannels::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ExpenseAttachments::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Expenses::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Books::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await
    }
}
