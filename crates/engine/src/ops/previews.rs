//! Read-only sharing of a book through an opaque secret.
//!
//! A book has at most one grant. Once minted, its secret never changes:
//! toggling only moves `enabled_until`, so a shared link keeps working
//! across disable/enable cycles.

use base64::Engine as _;
use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use sea_orm::{ActiveValue, ConnectionTrait, QueryFilter, TransactionTrait, prelude::*};
use serde::Serialize;

use crate::{Attachment, Book, EngineError, ResultEngine, book_previews, expenses};

use super::{
    AttachmentFile, BookSummary, DailyTotal, Engine, ExpenseFilter, ExpensePage,
    access::EXPENSE_NOT_FOUND, with_tx,
};

const SECRET_BYTES: usize = 18;
const PREVIEW_DAYS: i64 = 30;
const RECEIPTS_HIDDEN: &str = "receipt preview disabled";

fn mint_secret() -> String {
    let mut bytes = [0u8; SECRET_BYTES];
    rand::thread_rng().fill(&mut bytes);
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes)
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PreviewStatus {
    pub enabled: bool,
    pub enabled_until: Option<DateTime<Utc>>,
    pub preview_id: Option<String>,
    pub show_receipts: bool,
}

impl PreviewStatus {
    fn of(grant: Option<&book_previews::Model>, now: DateTime<Utc>) -> Self {
        match grant {
            Some(grant) => {
                let enabled = grant.is_enabled(now);
                Self {
                    enabled,
                    enabled_until: enabled.then_some(grant.enabled_until),
                    preview_id: grant.secret.clone(),
                    show_receipts: grant.show_receipts,
                }
            }
            None => Self {
                enabled: false,
                enabled_until: None,
                preview_id: None,
                show_receipts: false,
            },
        }
    }
}

/// What a valid secret unlocks.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PreviewGrant {
    pub user_id: String,
    pub book_id: i64,
    pub show_receipts: bool,
}

impl Engine {
    async fn grant_of<C: ConnectionTrait>(
        &self,
        db: &C,
        book_id: i64,
    ) -> ResultEngine<Option<book_previews::Model>> {
        Ok(book_previews::Entity::find_by_id(book_id).one(db).await?)
    }

    /// Give an existing grant a secret if it has none yet.
    async fn ensure_secret<C: ConnectionTrait>(
        &self,
        db: &C,
        grant: book_previews::Model,
    ) -> ResultEngine<book_previews::Model> {
        if grant.secret.is_some() {
            return Ok(grant);
        }
        let mut active: book_previews::ActiveModel = grant.into();
        active.secret = ActiveValue::Set(Some(mint_secret()));
        active.updated_at = ActiveValue::Set(self.now());
        Ok(active.update(db).await?)
    }

    async fn insert_grant<C: ConnectionTrait>(
        &self,
        db: &C,
        book_id: i64,
        user_id: &str,
        enabled_until: DateTime<Utc>,
        show_receipts: bool,
    ) -> ResultEngine<book_previews::Model> {
        let now = self.now();
        Ok(book_previews::ActiveModel {
            book_id: ActiveValue::Set(book_id),
            user_id: ActiveValue::Set(user_id.to_string()),
            secret: ActiveValue::Set(Some(mint_secret())),
            enabled_until: ActiveValue::Set(enabled_until),
            show_receipts: ActiveValue::Set(show_receipts),
            created_at: ActiveValue::Set(now),
            updated_at: ActiveValue::Set(now),
        }
        .insert(db)
        .await?)
    }

    /// Current grant of a book. A grant without a secret gets one here;
    /// a book that was never shared reports a disabled status with no id.
    pub async fn preview_status(&self, book_id: i64, user_id: &str) -> ResultEngine<PreviewStatus> {
        let now = self.now();
        with_tx!(self, |db_tx| {
            let book = self.require_book(&db_tx, book_id, user_id).await?;
            let grant = match self.grant_of(&db_tx, book.id).await? {
                Some(grant) => Some(self.ensure_secret(&db_tx, grant).await?),
                None => None,
            };
            Ok::<_, EngineError>(PreviewStatus::of(grant.as_ref(), now))
        })
    }

    /// Enabling opens the grant for 30 days from now; disabling moves its
    /// expiry into the past and keeps the secret.
    pub async fn set_preview_enabled(
        &self,
        book_id: i64,
        user_id: &str,
        enabled: bool,
    ) -> ResultEngine<PreviewStatus> {
        let now = self.now();
        with_tx!(self, |db_tx| {
            let book = self.require_book(&db_tx, book_id, user_id).await?;
            let grant = match (self.grant_of(&db_tx, book.id).await?, enabled) {
                (Some(grant), true) => {
                    let grant = self.ensure_secret(&db_tx, grant).await?;
                    let mut active: book_previews::ActiveModel = grant.into();
                    active.enabled_until = ActiveValue::Set(now + Duration::days(PREVIEW_DAYS));
                    active.updated_at = ActiveValue::Set(now);
                    Some(active.update(&db_tx).await?)
                }
                (Some(grant), false) => {
                    let mut active: book_previews::ActiveModel = grant.into();
                    active.enabled_until = ActiveValue::Set(now - Duration::days(1));
                    active.updated_at = ActiveValue::Set(now);
                    Some(active.update(&db_tx).await?)
                }
                (None, true) => Some(
                    self.insert_grant(
                        &db_tx,
                        book.id,
                        user_id,
                        now + Duration::days(PREVIEW_DAYS),
                        false,
                    )
                    .await?,
                ),
                (None, false) => None,
            };
            Ok::<_, EngineError>(PreviewStatus::of(grant.as_ref(), now))
        })
    }

    /// Whether receipt images are visible through the preview. Creates a
    /// disabled grant when the book has none.
    pub async fn set_preview_show_receipts(
        &self,
        book_id: i64,
        user_id: &str,
        show_receipts: bool,
    ) -> ResultEngine<PreviewStatus> {
        let now = self.now();
        with_tx!(self, |db_tx| {
            let book = self.require_book(&db_tx, book_id, user_id).await?;
            let grant = match self.grant_of(&db_tx, book.id).await? {
                Some(grant) => {
                    let mut active: book_previews::ActiveModel = grant.into();
                    active.show_receipts = ActiveValue::Set(show_receipts);
                    active.updated_at = ActiveValue::Set(now);
                    active.update(&db_tx).await?
                }
                None => {
                    self.insert_grant(&db_tx, book.id, user_id, now - Duration::days(1), show_receipts)
                        .await?
                }
            };
            Ok::<_, EngineError>(PreviewStatus::of(Some(&grant), now))
        })
    }

    /// The secret of a book, minted on first use. Does not enable anything.
    pub async fn preview_token(&self, book_id: i64, user_id: &str) -> ResultEngine<String> {
        let now = self.now();
        let grant = with_tx!(self, |db_tx| {
            let book = self.require_book(&db_tx, book_id, user_id).await?;
            let grant = match self.grant_of(&db_tx, book.id).await? {
                Some(grant) => self.ensure_secret(&db_tx, grant).await?,
                None => {
                    self.insert_grant(&db_tx, book.id, user_id, now - Duration::days(1), false)
                        .await?
                }
            };
            Ok::<_, EngineError>(grant)
        })?;
        grant
            .secret
            .ok_or_else(|| EngineError::KeyNotFound("preview".to_string()))
    }

    /// Map a secret to the book it unlocks. Unknown, expired and disabled
    /// secrets are indistinguishable.
    pub async fn resolve_preview(&self, secret: &str) -> ResultEngine<PreviewGrant> {
        let secret = secret.trim();
        if secret.is_empty() {
            return Err(EngineError::Unauthorized);
        }
        let grant = book_previews::Entity::find()
            .filter(book_previews::Column::Secret.eq(secret))
            .one(&self.database)
            .await?
            .filter(|grant| grant.is_enabled(self.now()))
            .ok_or(EngineError::Unauthorized)?;

        Ok(PreviewGrant {
            user_id: grant.user_id,
            book_id: grant.book_id,
            show_receipts: grant.show_receipts,
        })
    }

    pub async fn preview_book(&self, secret: &str) -> ResultEngine<(Book, bool)> {
        let grant = self.resolve_preview(secret).await?;
        let book = self
            .require_book(&self.database, grant.book_id, &grant.user_id)
            .await
            .map_err(|_| EngineError::Unauthorized)?;
        Ok((book.into(), grant.show_receipts))
    }

    pub async fn preview_summary(&self, secret: &str) -> ResultEngine<BookSummary> {
        let grant = self.resolve_preview(secret).await?;
        self.summary_of_book(grant.book_id).await
    }

    pub async fn preview_daily(
        &self,
        secret: &str,
        start_date: Option<&str>,
        end_date: Option<&str>,
    ) -> ResultEngine<Vec<DailyTotal>> {
        let grant = self.resolve_preview(secret).await?;
        self.daily_of_book(grant.book_id, start_date, end_date).await
    }

    pub async fn preview_expenses(
        &self,
        secret: &str,
        filter: &ExpenseFilter,
    ) -> ResultEngine<ExpensePage> {
        let grant = self.resolve_preview(secret).await?;
        self.expenses_of_book(grant.book_id, filter).await
    }

    /// Attachments of an expense in the shared book; empty when receipts
    /// are hidden.
    pub async fn preview_attachments(
        &self,
        secret: &str,
        expense_id: i64,
    ) -> ResultEngine<Vec<Attachment>> {
        let grant = self.resolve_preview(secret).await?;
        if !grant.show_receipts {
            return Ok(Vec::new());
        }
        let expense = expenses::Entity::find_by_id(expense_id)
            .filter(expenses::Column::BookId.eq(grant.book_id))
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound(EXPENSE_NOT_FOUND.to_string()))?;
        self.attachments_of_expense(expense.id).await
    }

    pub async fn preview_attachment_file(
        &self,
        secret: &str,
        file_name: &str,
    ) -> ResultEngine<AttachmentFile> {
        let grant = self.resolve_preview(secret).await?;
        if !grant.show_receipts {
            return Err(EngineError::Forbidden(RECEIPTS_HIDDEN.to_string()));
        }
        self.attachment_file_of_book(file_name, &grant.user_id, grant.book_id)
            .await
    }
}
