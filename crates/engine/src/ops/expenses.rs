use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveValue, Condition, ConnectionTrait, Order, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Select, Statement, TransactionTrait, prelude::*, sea_query::Expr,
};

use crate::{
    EngineError, Expense, ExpenseDraft, ExpenseInput, ResultEngine, expense_attachments, expenses,
    normalize::{normalize_category, normalize_pay_channel_code},
};

use super::{Engine, with_tx};

pub const DEFAULT_PAGE_SIZE: u64 = 20;
pub const MAX_PAGE_SIZE: u64 = 100;

// Start of the time range as a sortable `HH:MM[:SS]`, `00:00` when absent.
const START_TIME_SQL: &str = "COALESCE(time(CASE WHEN time_range IS NOT NULL AND instr(time_range, '-') > 0 \
     THEN substr(time_range, 1, instr(time_range, '-') - 1) ELSE NULL END), '00:00')";

/// Most recent activity first: date, then start of the time range, then id.
pub(super) fn in_activity_order(query: Select<expenses::Entity>) -> Select<expenses::Entity> {
    query
        .order_by_desc(expenses::Column::Date)
        .order_by(Expr::cust(START_TIME_SQL), Order::Desc)
        .order_by_desc(expenses::Column::Id)
}

#[derive(Clone, Debug, Default)]
pub struct ExpenseFilter {
    pub category: Option<String>,
    pub pay_channel: Option<String>,
    pub date_from: Option<String>,
    pub date_to: Option<String>,
    pub keyword: Option<String>,
    pub page: Option<u64>,
    pub page_size: Option<u64>,
}

impl ExpenseFilter {
    fn page(&self) -> u64 {
        self.page.unwrap_or(1).max(1)
    }

    fn page_size(&self) -> u64 {
        self.page_size
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(1, MAX_PAGE_SIZE)
    }

    fn condition(&self, book_id: i64) -> Condition {
        let mut condition = Condition::all().add(expenses::Column::BookId.eq(book_id));

        if let Some(raw) = non_blank(self.category.as_deref()) {
            let code = normalize_category(raw)
                .map(|category| category.code().to_string())
                .unwrap_or_else(|| raw.to_uppercase());
            condition = condition.add(expenses::Column::Category.eq(code));
        }
        if let Some(code) = non_blank(self.pay_channel.as_deref()).and_then(normalize_pay_channel_code)
        {
            condition = condition.add(expenses::Column::PayChannel.eq(code));
        }
        if let Some(from) = non_blank(self.date_from.as_deref()) {
            condition = condition.add(expenses::Column::Date.gte(from));
        }
        if let Some(to) = non_blank(self.date_to.as_deref()) {
            condition = condition.add(expenses::Column::Date.lte(to));
        }
        if let Some(keyword) = non_blank(self.keyword.as_deref()) {
            condition = condition.add(
                Condition::any()
                    .add(expenses::Column::Title.contains(keyword))
                    .add(expenses::Column::Remark.contains(keyword))
                    .add(expenses::Column::VehicleNo.contains(keyword)),
            );
        }
        condition
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

#[derive(Clone, Debug, PartialEq)]
pub struct ExpensePage {
    pub items: Vec<Expense>,
    pub page: u64,
    pub page_size: u64,
    pub total: u64,
    pub total_pages: u64,
}

fn draft_model(
    book_id: i64,
    draft: ExpenseDraft,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
) -> expenses::ActiveModel {
    expenses::ActiveModel {
        id: ActiveValue::NotSet,
        book_id: ActiveValue::Set(book_id),
        date: ActiveValue::Set(draft.date),
        time_range: ActiveValue::Set(draft.time_range),
        duration_minutes: ActiveValue::Set(draft.duration_minutes),
        duration_display: ActiveValue::Set(draft.duration_display),
        title: ActiveValue::Set(draft.title),
        amount: ActiveValue::Set(draft.amount),
        discount_amount: ActiveValue::Set(draft.discount_amount),
        discount_note: ActiveValue::Set(draft.discount_note),
        currency: ActiveValue::Set(draft.currency),
        vehicle_no: ActiveValue::Set(draft.vehicle_no),
        pay_channel: ActiveValue::Set(draft.pay_channel),
        category: ActiveValue::Set(draft.category.code().to_string()),
        remark: ActiveValue::Set(draft.remark),
        created_at: ActiveValue::Set(created_at),
        updated_at: ActiveValue::Set(updated_at),
    }
}

impl Engine {
    pub(super) async fn insert_draft<C: ConnectionTrait>(
        &self,
        db: &C,
        book_id: i64,
        draft: ExpenseDraft,
    ) -> ResultEngine<expenses::Model> {
        let now = self.now();
        Ok(draft_model(book_id, draft, now, now).insert(db).await?)
    }

    pub(super) async fn expenses_of_book(
        &self,
        book_id: i64,
        filter: &ExpenseFilter,
    ) -> ResultEngine<ExpensePage> {
        let page = filter.page();
        let page_size = filter.page_size();
        let query = expenses::Entity::find().filter(filter.condition(book_id));

        let total = query.clone().count(&self.database).await?;
        let items = in_activity_order(query)
            .offset((page - 1) * page_size)
            .limit(page_size)
            .all(&self.database)
            .await?;

        Ok(ExpensePage {
            items: items.into_iter().map(Expense::from).collect(),
            page,
            page_size,
            total,
            total_pages: total.div_ceil(page_size),
        })
    }

    pub async fn list_expenses(
        &self,
        book_id: i64,
        user_id: &str,
        filter: &ExpenseFilter,
    ) -> ResultEngine<ExpensePage> {
        let book = self.require_book(&self.database, book_id, user_id).await?;
        self.expenses_of_book(book.id, filter).await
    }

    pub async fn expense(&self, expense_id: i64, user_id: &str) -> ResultEngine<Expense> {
        Ok(self
            .require_expense(&self.database, expense_id, user_id)
            .await?
            .into())
    }

    /// Validate `input` the way an import row is validated, except that the
    /// time range may be left out, and store it under `book_id`.
    pub async fn create_expense(
        &self,
        book_id: i64,
        user_id: &str,
        input: &ExpenseInput,
    ) -> ResultEngine<Expense> {
        let book = self.require_book(&self.database, book_id, user_id).await?;
        let registry = self.registry_in(&self.database, user_id).await?;
        let draft = input
            .validate(&registry, false)
            .map_err(|rejection| EngineError::InvalidInput(rejection.to_string()))?;

        Ok(self.insert_draft(&self.database, book.id, draft).await?.into())
    }

    /// Replace every field of an expense.
    pub async fn update_expense(
        &self,
        expense_id: i64,
        user_id: &str,
        input: &ExpenseInput,
    ) -> ResultEngine<Expense> {
        let existing = self
            .require_expense(&self.database, expense_id, user_id)
            .await?;
        let registry = self.registry_in(&self.database, user_id).await?;
        let draft = input
            .validate(&registry, false)
            .map_err(|rejection| EngineError::InvalidInput(rejection.to_string()))?;

        let mut active = draft_model(existing.book_id, draft, existing.created_at, self.now());
        active.id = ActiveValue::Unchanged(existing.id);
        Ok(active.update(&self.database).await?.into())
    }

    pub async fn delete_expense(&self, expense_id: i64, user_id: &str) -> ResultEngine<()> {
        let blobs = with_tx!(self, |db_tx| {
            let expense = self.require_expense(&db_tx, expense_id, user_id).await?;
            let backend = self.database.get_database_backend();

            let blobs: Vec<String> = expense_attachments::Entity::find()
                .filter(expense_attachments::Column::ExpenseId.eq(expense.id))
                .select_only()
                .column(expense_attachments::Column::FileName)
                .into_tuple()
                .all(&db_tx)
                .await?;

            db_tx
                .execute(Statement::from_sql_and_values(
                    backend,
                    "DELETE FROM expense_attachments WHERE expense_id = ?;",
                    vec![expense.id.into()],
                ))
                .await?;

            db_tx
                .execute(Statement::from_sql_and_values(
                    backend,
                    "DELETE FROM expenses WHERE id = ?;",
                    vec![expense.id.into()],
                ))
                .await?;

            Ok::<_, EngineError>(blobs)
        })?;

        self.attachments.remove_all(blobs).await;
        Ok(())
    }
}
