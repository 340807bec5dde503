//! Aggregates over the expenses of a book, or over all books of a user.

use sea_orm::{ConnectionTrait, QueryResult, Statement, Value};
use serde::Serialize;

use crate::ResultEngine;

use super::Engine;

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct SpendTotals {
    pub count: i64,
    pub total_amount: f64,
    pub saved_amount: f64,
}

impl SpendTotals {
    fn from_row(row: &QueryResult) -> ResultEngine<Self> {
        Ok(Self {
            count: row.try_get("", "count")?,
            total_amount: row.try_get("", "total_amount")?,
            saved_amount: row.try_get("", "saved_amount")?,
        })
    }

    pub fn net_amount(&self) -> f64 {
        self.total_amount - self.saved_amount
    }
}

/// Totals of one category or pay channel code.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GroupTotal {
    pub name: String,
    #[serde(flatten)]
    pub totals: SpendTotals,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BookSummary {
    #[serde(flatten)]
    pub totals: SpendTotals,
    pub by_category: Vec<GroupTotal>,
    pub by_pay_channel: Vec<GroupTotal>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DailyTotal {
    pub date: String,
    #[serde(flatten)]
    pub totals: SpendTotals,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LeaderboardEntry {
    pub book_id: i64,
    pub book_name: String,
    #[serde(flatten)]
    pub totals: SpendTotals,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Leaderboard {
    pub totals: SpendTotals,
    pub items: Vec<LeaderboardEntry>,
}

// TOTAL() is always REAL, even over zero rows.
const SPEND_COLUMNS: &str =
    "COUNT(e.id) AS count, TOTAL(e.amount) AS total_amount, TOTAL(e.discount_amount) AS saved_amount";

impl Engine {
    async fn query_rows(&self, sql: &str, values: Vec<Value>) -> ResultEngine<Vec<QueryResult>> {
        let backend = self.database.get_database_backend();
        Ok(self
            .database
            .query_all(Statement::from_sql_and_values(backend, sql, values))
            .await?)
    }

    async fn group_totals(&self, book_id: i64, key: &str) -> ResultEngine<Vec<GroupTotal>> {
        let sql = format!(
            "SELECT {key} AS name, {SPEND_COLUMNS} FROM expenses e WHERE e.book_id = ? \
             GROUP BY {key} ORDER BY total_amount DESC, name ASC"
        );
        self.query_rows(&sql, vec![book_id.into()])
            .await?
            .iter()
            .map(|row| {
                Ok(GroupTotal {
                    name: row.try_get("", "name")?,
                    totals: SpendTotals::from_row(row)?,
                })
            })
            .collect()
    }

    pub(super) async fn summary_of_book(&self, book_id: i64) -> ResultEngine<BookSummary> {
        let totals = self
            .query_rows(
                &format!("SELECT {SPEND_COLUMNS} FROM expenses e WHERE e.book_id = ?"),
                vec![book_id.into()],
            )
            .await?
            .first()
            .map(SpendTotals::from_row)
            .transpose()?
            .unwrap_or_default();

        Ok(BookSummary {
            totals,
            by_category: self.group_totals(book_id, "e.category").await?,
            by_pay_channel: self
                .group_totals(book_id, "COALESCE(NULLIF(TRIM(e.pay_channel), ''), 'OTHER')")
                .await?,
        })
    }

    pub(super) async fn daily_of_book(
        &self,
        book_id: i64,
        start_date: Option<&str>,
        end_date: Option<&str>,
    ) -> ResultEngine<Vec<DailyTotal>> {
        let mut sql = format!("SELECT e.date AS date, {SPEND_COLUMNS} FROM expenses e WHERE e.book_id = ?");
        let mut values: Vec<Value> = vec![book_id.into()];
        if let Some(start) = start_date.filter(|value| !value.is_empty()) {
            sql.push_str(" AND e.date >= ?");
            values.push(start.into());
        }
        if let Some(end) = end_date.filter(|value| !value.is_empty()) {
            sql.push_str(" AND e.date <= ?");
            values.push(end.into());
        }
        sql.push_str(" GROUP BY e.date ORDER BY e.date DESC");

        self.query_rows(&sql, values)
            .await?
            .iter()
            .map(|row| {
                Ok(DailyTotal {
                    date: row.try_get("", "date")?,
                    totals: SpendTotals::from_row(row)?,
                })
            })
            .collect()
    }

    /// Summary of one book: totals plus per category and per pay channel
    /// groups, largest first. A blank pay channel counts as `OTHER`.
    pub async fn book_summary(&self, book_id: i64, user_id: &str) -> ResultEngine<BookSummary> {
        let book = self.require_book(&self.database, book_id, user_id).await?;
        self.summary_of_book(book.id).await
    }

    /// Per-day totals, newest day first. Both bounds are inclusive.
    pub async fn daily_stats(
        &self,
        book_id: i64,
        user_id: &str,
        start_date: Option<&str>,
        end_date: Option<&str>,
    ) -> ResultEngine<Vec<DailyTotal>> {
        let book = self.require_book(&self.database, book_id, user_id).await?;
        self.daily_of_book(book.id, start_date, end_date).await
    }

    /// All books of a user ranked by net spend.
    pub async fn leaderboard(&self, user_id: &str) -> ResultEngine<Leaderboard> {
        let totals = self
            .query_rows(
                &format!(
                    "SELECT {SPEND_COLUMNS} FROM expenses e \
                     JOIN books b ON e.book_id = b.id WHERE b.user_id = ?"
                ),
                vec![user_id.into()],
            )
            .await?
            .first()
            .map(SpendTotals::from_row)
            .transpose()?
            .unwrap_or_default();

        let items = self
            .query_rows(
                &format!(
                    "SELECT b.id AS book_id, b.name AS book_name, {SPEND_COLUMNS} \
                     FROM books b LEFT JOIN expenses e ON e.book_id = b.id \
                     WHERE b.user_id = ? GROUP BY b.id \
                     ORDER BY (TOTAL(e.amount) - TOTAL(e.discount_amount)) DESC, b.created_at DESC, b.id DESC"
                ),
                vec![user_id.into()],
            )
            .await?
            .iter()
            .map(|row| {
                Ok(LeaderboardEntry {
                    book_id: row.try_get("", "book_id")?,
                    book_name: row.try_get("", "book_name")?,
                    totals: SpendTotals::from_row(row)?,
                })
            })
            .collect::<ResultEngine<Vec<_>>>()?;

        Ok(Leaderboard { totals, items })
    }
}
