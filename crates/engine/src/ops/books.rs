use sea_orm::{
    ActiveValue, JoinType, QueryFilter, QueryOrder, QuerySelect, Statement, TransactionTrait,
    prelude::*,
};

use crate::{
    Book, EngineError, ResultEngine, books, expense_attachments, expenses,
    normalize::parse_date_text,
};

use super::{Engine, normalize_optional_text, normalize_required_name, with_tx};

#[derive(Clone, Debug, Default)]
pub struct BookNew {
    pub name: String,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub description: Option<String>,
}

/// Partial update. `None` leaves a field alone, `Some(None)` clears it.
#[derive(Clone, Debug, Default)]
pub struct BookPatch {
    pub name: Option<String>,
    pub start_date: Option<Option<String>>,
    pub end_date: Option<Option<String>>,
    pub description: Option<Option<String>>,
    pub summary: Option<Option<String>>,
}

impl BookPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.start_date.is_none()
            && self.end_date.is_none()
            && self.description.is_none()
            && self.summary.is_none()
    }
}

/// Blank means no date; anything else must be a date.
fn optional_date(value: Option<&str>, label: &str) -> ResultEngine<Option<String>> {
    let Some(raw) = normalize_optional_text(value) else {
        return Ok(None);
    };
    let date = parse_date_text(&raw);
    if date.is_empty() {
        return Err(EngineError::InvalidInput(format!("invalid {label}: {raw}")));
    }
    Ok(Some(date))
}

impl Engine {
    /// Books of `user_id`, newest first.
    pub async fn list_books(&self, user_id: &str) -> ResultEngine<Vec<Book>> {
        let models = books::Entity::find()
            .filter(books::Column::UserId.eq(user_id))
            .order_by_desc(books::Column::CreatedAt)
            .order_by_desc(books::Column::Id)
            .all(&self.database)
            .await?;
        Ok(models.into_iter().map(Book::from).collect())
    }

    pub async fn book(&self, book_id: i64, user_id: &str) -> ResultEngine<Book> {
        Ok(self.require_book(&self.database, book_id, user_id).await?.into())
    }

    pub async fn create_book(&self, user_id: &str, book: BookNew) -> ResultEngine<Book> {
        let name = normalize_required_name(&book.name, "book")?;
        let start_date = optional_date(book.start_date.as_deref(), "start date")?;
        let end_date = optional_date(book.end_date.as_deref(), "end date")?;
        let now = self.now();

        let model = books::ActiveModel {
            id: ActiveValue::NotSet,
            user_id: ActiveValue::Set(user_id.to_string()),
            name: ActiveValue::Set(name),
            start_date: ActiveValue::Set(start_date),
            end_date: ActiveValue::Set(end_date),
            description: ActiveValue::Set(normalize_optional_text(book.description.as_deref())),
            summary: ActiveValue::Set(None),
            created_at: ActiveValue::Set(now),
            updated_at: ActiveValue::Set(now),
        }
        .insert(&self.database)
        .await?;
        Ok(model.into())
    }

    pub async fn update_book(
        &self,
        book_id: i64,
        user_id: &str,
        patch: BookPatch,
    ) -> ResultEngine<Book> {
        let existing = self.require_book(&self.database, book_id, user_id).await?;
        if patch.is_empty() {
            return Ok(existing.into());
        }

        let mut active: books::ActiveModel = existing.into();
        if let Some(name) = patch.name {
            active.name = ActiveValue::Set(normalize_required_name(&name, "book")?);
        }
        if let Some(start_date) = patch.start_date {
            active.start_date = ActiveValue::Set(optional_date(start_date.as_deref(), "start date")?);
        }
        if let Some(end_date) = patch.end_date {
            active.end_date = ActiveValue::Set(optional_date(end_date.as_deref(), "end date")?);
        }
        if let Some(description) = patch.description {
            active.description = ActiveValue::Set(normalize_optional_text(description.as_deref()));
        }
        if let Some(summary) = patch.summary {
            active.summary = ActiveValue::Set(normalize_optional_text(summary.as_deref()));
        }
        active.updated_at = ActiveValue::Set(self.now());

        Ok(active.update(&self.database).await?.into())
    }

    /// Delete a book with its expenses, attachments and preview grant.
    ///
    /// Rows go in one transaction; blobs are removed once it has committed.
    pub async fn delete_book(&self, book_id: i64, user_id: &str) -> ResultEngine<()> {
        let blobs = with_tx!(self, |db_tx| {
            let book = self.require_book(&db_tx, book_id, user_id).await?;
            let backend = self.database.get_database_backend();

            let blobs: Vec<String> = expense_attachments::Entity::find()
                .join(
                    JoinType::InnerJoin,
                    expense_attachments::Relation::Expense.def(),
                )
                .filter(expenses::Column::BookId.eq(book.id))
                .all(&db_tx)
                .await?
                .into_iter()
                .map(|attachment| attachment.file_name)
                .collect();

            db_tx
                .execute(Statement::from_sql_and_values(
                    backend,
                    "DELETE FROM expense_attachments WHERE expense_id IN (SELECT id FROM expenses WHERE book_id = ?);",
                    vec![book.id.into()],
                ))
                .await?;

            db_tx
                .execute(Statement::from_sql_and_values(
                    backend,
                    "DELETE FROM expenses WHERE book_id = ?;",
                    vec![book.id.into()],
                ))
                .await?;

            db_tx
                .execute(Statement::from_sql_and_values(
                    backend,
                    "DELETE FROM book_previews WHERE book_id = ?;",
                    vec![book.id.into()],
                ))
                .await?;

            db_tx
                .execute(Statement::from_sql_and_values(
                    backend,
                    "DELETE FROM books WHERE id = ?;",
                    vec![book.id.into()],
                ))
                .await?;

            Ok::<_, EngineError>(blobs)
        })?;

        self.attachments.remove_all(blobs).await;
        Ok(())
    }
}
