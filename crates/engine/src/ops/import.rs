//! Workbook import: one book sheet, one expense sheet.
//!
//! Structural problems reject the whole upload before anything is written.
//! Row problems never do: a bad row is skipped and reported, and every
//! accepted row is committed together in one transaction.

use sea_orm::{ActiveValue, ConnectionTrait, QueryFilter, QueryOrder, TransactionTrait, prelude::*};
use serde::Serialize;

use crate::{
    EngineError, ExpenseInput, NumberField, ResultEngine, books,
    columns::{
        BOOK_HEADERS, BOOK_SHEET_NAMES, BookColumn, ColumnMap, EXPENSE_HEADERS,
        EXPENSE_SHEET_NAMES, ExpenseColumn,
    },
    normalize::parse_date_cell,
    workbook::{Sheet, Workbook},
};

use super::{Engine, with_tx};

const BOOK_ROW: u32 = 2;
const FIRST_EXPENSE_ROW: u32 = 2;

/// Row-level failure. `row` is the spreadsheet row number.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RowError {
    pub row: u32,
    pub error: String,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ImportReport {
    pub book_id: i64,
    pub book_name: String,
    pub created: bool,
    pub inserted_count: u32,
    pub skipped_count: u32,
    pub errors: Vec<RowError>,
}

#[derive(Debug)]
struct BookMeta {
    name: String,
    description: Option<String>,
    start_date: Option<String>,
    end_date: Option<String>,
}

fn non_empty(value: String) -> Option<String> {
    (!value.is_empty()).then_some(value)
}

impl BookMeta {
    fn read(sheet: &Sheet) -> ResultEngine<Self> {
        let columns = ColumnMap::for_sheet(sheet, BOOK_HEADERS);
        let cell = |field| columns.cell(sheet, BOOK_ROW, field);

        let name = cell(BookColumn::Name).text();
        if name.is_empty() {
            return Err(EngineError::InvalidWorkbook(
                "book name is required".to_string(),
            ));
        }
        Ok(Self {
            name,
            description: non_empty(cell(BookColumn::Description).text()),
            start_date: non_empty(parse_date_cell(&cell(BookColumn::StartDate))),
            end_date: non_empty(parse_date_cell(&cell(BookColumn::EndDate))),
        })
    }
}

fn expense_input(sheet: &Sheet, columns: &ColumnMap<ExpenseColumn>, row: u32) -> ExpenseInput {
    let cell = |field| columns.cell(sheet, row, field);
    ExpenseInput {
        date: parse_date_cell(&cell(ExpenseColumn::Date)),
        time_range: cell(ExpenseColumn::TimeRange).text(),
        title: cell(ExpenseColumn::Title).text(),
        amount: NumberField::from_cell(&cell(ExpenseColumn::Amount)),
        category: cell(ExpenseColumn::Category).text(),
        duration_display: cell(ExpenseColumn::DurationDisplay).text(),
        discount_amount: NumberField::from_cell(&cell(ExpenseColumn::DiscountAmount)),
        discount_note: cell(ExpenseColumn::DiscountNote).text(),
        currency: cell(ExpenseColumn::Currency).text(),
        vehicle_no: cell(ExpenseColumn::VehicleNo).text(),
        pay_channel: cell(ExpenseColumn::PayChannel).text(),
        remark: cell(ExpenseColumn::Remark).text(),
    }
}

impl Engine {
    /// Find the user's book by name, or create it. An existing book only
    /// takes the non-empty values of `meta`.
    async fn merge_book<C: ConnectionTrait>(
        &self,
        db: &C,
        user_id: &str,
        meta: BookMeta,
    ) -> ResultEngine<(books::Model, bool)> {
        let now = self.now();
        let existing = books::Entity::find()
            .filter(books::Column::UserId.eq(user_id))
            .filter(books::Column::Name.eq(meta.name.as_str()))
            .order_by_asc(books::Column::Id)
            .one(db)
            .await?;

        let Some(existing) = existing else {
            let model = books::ActiveModel {
                id: ActiveValue::NotSet,
                user_id: ActiveValue::Set(user_id.to_string()),
                name: ActiveValue::Set(meta.name),
                start_date: ActiveValue::Set(meta.start_date),
                end_date: ActiveValue::Set(meta.end_date),
                description: ActiveValue::Set(meta.description),
                summary: ActiveValue::Set(None),
                created_at: ActiveValue::Set(now),
                updated_at: ActiveValue::Set(now),
            }
            .insert(db)
            .await?;
            return Ok((model, true));
        };

        let description = meta.description.or_else(|| existing.description.clone());
        let start_date = meta.start_date.or_else(|| existing.start_date.clone());
        let end_date = meta.end_date.or_else(|| existing.end_date.clone());

        let mut active: books::ActiveModel = existing.into();
        active.description = ActiveValue::Set(description);
        active.start_date = ActiveValue::Set(start_date);
        active.end_date = ActiveValue::Set(end_date);
        active.updated_at = ActiveValue::Set(now);
        Ok((active.update(db).await?, false))
    }

    async fn import_rows(
        &self,
        user_id: &str,
        meta: BookMeta,
        expense_sheet: &Sheet,
    ) -> ResultEngine<ImportReport> {
        let columns = ColumnMap::for_sheet(expense_sheet, EXPENSE_HEADERS);
        with_tx!(self, |db_tx| {
            let registry = self.registry_in(&db_tx, user_id).await?;
            let (book, created) = self.merge_book(&db_tx, user_id, meta).await?;

            let mut report = ImportReport {
                book_id: book.id,
                book_name: book.name,
                created,
                inserted_count: 0,
                skipped_count: 0,
                errors: Vec::new(),
            };

            for row in FIRST_EXPENSE_ROW..=expense_sheet.last_row() {
                if expense_sheet.row(row).iter().all(|cell| cell.is_blank()) {
                    continue;
                }
                match expense_input(expense_sheet, &columns, row).validate(&registry, true) {
                    Ok(draft) => {
                        self.insert_draft(&db_tx, book.id, draft).await?;
                        report.inserted_count += 1;
                    }
                    Err(rejection) => {
                        report.skipped_count += 1;
                        report.errors.push(RowError {
                            row,
                            error: rejection.to_string(),
                        });
                    }
                }
            }

            Ok::<_, EngineError>(report)
        })
    }

    /// Import an `.xlsx` upload into the book named on its book sheet.
    ///
    /// Fails as a whole only when the workbook cannot be read, lacks a
    /// sheet, or names no book. Any storage fault rolls every row back.
    pub async fn import_workbook(&self, user_id: &str, bytes: &[u8]) -> ResultEngine<ImportReport> {
        let workbook = Workbook::load(bytes)?;
        let (Some(book_sheet), Some(expense_sheet)) = (
            workbook.find_sheet(BOOK_SHEET_NAMES),
            workbook.find_sheet(EXPENSE_SHEET_NAMES),
        ) else {
            return Err(EngineError::InvalidWorkbook(
                "workbook must contain a book sheet and an expense sheet".to_string(),
            ));
        };
        let meta = BookMeta::read(book_sheet)?;

        match self.import_rows(user_id, meta, expense_sheet).await {
            Ok(report) => {
                tracing::info!(
                    "imported {} rows into book {} ({} skipped)",
                    report.inserted_count,
                    report.book_id,
                    report.skipped_count
                );
                Ok(report)
            }
            Err(err) => {
                if err.is_internal() {
                    tracing::error!("import rolled back: {err}");
                }
                Err(err)
            }
        }
    }
}
