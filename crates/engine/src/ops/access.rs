//! Ownership checks.
//!
//! Anything that is missing or belongs to another user yields the same
//! `KeyNotFound`, so callers cannot tell foreign ids from missing ones.

use sea_orm::{ConnectionTrait, JoinType, QueryFilter, QuerySelect, RelationTrait, prelude::*};

use crate::{EngineError, ResultEngine, books, expense_attachments, expenses};

use super::Engine;

pub(super) const BOOK_NOT_FOUND: &str = "book";
pub(super) const EXPENSE_NOT_FOUND: &str = "expense";
pub(super) const ATTACHMENT_NOT_FOUND: &str = "attachment";

impl Engine {
    pub(super) async fn require_book<C: ConnectionTrait>(
        &self,
        db: &C,
        book_id: i64,
        user_id: &str,
    ) -> ResultEngine<books::Model> {
        books::Entity::find_by_id(book_id)
            .filter(books::Column::UserId.eq(user_id))
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound(BOOK_NOT_FOUND.to_string()))
    }

    pub(super) async fn require_expense<C: ConnectionTrait>(
        &self,
        db: &C,
        expense_id: i64,
        user_id: &str,
    ) -> ResultEngine<expenses::Model> {
        expenses::Entity::find_by_id(expense_id)
            .join(JoinType::InnerJoin, expenses::Relation::Book.def())
            .filter(books::Column::UserId.eq(user_id))
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound(EXPENSE_NOT_FOUND.to_string()))
    }

    /// Attachment by blob name, restricted to the books of `user_id` and,
    /// when given, to one book.
    pub(super) async fn require_attachment_file<C: ConnectionTrait>(
        &self,
        db: &C,
        file_name: &str,
        user_id: &str,
        book_id: Option<i64>,
    ) -> ResultEngine<expense_attachments::Model> {
        let mut query = expense_attachments::Entity::find()
            .filter(expense_attachments::Column::FileName.eq(file_name))
            .join(
                JoinType::InnerJoin,
                expense_attachments::Relation::Expense.def(),
            )
            .join(JoinType::InnerJoin, expenses::Relation::Book.def())
            .filter(books::Column::UserId.eq(user_id));
        if let Some(book_id) = book_id {
            query = query.filter(books::Column::Id.eq(book_id));
        }

        query
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound(ATTACHMENT_NOT_FOUND.to_string()))
    }
}
