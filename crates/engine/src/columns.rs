//! Header text accepted for each field of the import sheets.
//!
//! Columns are found by header text rather than position. Each field lists
//! its synonyms in priority order; when a sheet carries more than one of them
//! the earlier synonym wins.

use std::collections::HashMap;
use std::hash::Hash;

use crate::workbook::{Cell, Sheet};

/// Sheet names tried, in order, for the book metadata sheet.
pub const BOOK_SHEET_NAMES: &[&str] = &["账本", "Book", "book"];
/// Sheet names tried, in order, for the expense sheet.
pub const EXPENSE_SHEET_NAMES: &[&str] = &["花销", "花费", "Expenses", "expenses"];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BookColumn {
    Name,
    Description,
    StartDate,
    EndDate,
}

pub const BOOK_HEADERS: &[(BookColumn, &[&str])] = &[
    (BookColumn::Name, &["账本名称*", "账本名称", "name"]),
    (BookColumn::Description, &["描述", "description"]),
    (
        BookColumn::StartDate,
        &["开始日期(YYYY-MM-DD)", "开始日期", "start_date"],
    ),
    (
        BookColumn::EndDate,
        &["结束日期(YYYY-MM-DD)", "结束日期", "end_date"],
    ),
];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ExpenseColumn {
    Date,
    TimeRange,
    Title,
    Amount,
    Category,
    DurationDisplay,
    DiscountAmount,
    DiscountNote,
    Currency,
    VehicleNo,
    PayChannel,
    Remark,
}

pub const EXPENSE_HEADERS: &[(ExpenseColumn, &[&str])] = &[
    (
        ExpenseColumn::Date,
        &["日期*(YYYY-MM-DD)", "日期(YYYY-MM-DD)", "日期", "date"],
    ),
    (
        ExpenseColumn::TimeRange,
        &[
            "时间段*(HH:mm-HH:mm)",
            "时间段(HH:mm-HH:mm)",
            "时间段",
            "time_range",
        ],
    ),
    (
        ExpenseColumn::Title,
        &["项目描述*", "项目描述", "标题", "title"],
    ),
    (ExpenseColumn::Amount, &["金额*", "金额", "amount"]),
    (
        ExpenseColumn::Category,
        &[
            "分类*(可填中文或代码)",
            "分类(可填中文或代码)",
            "分类",
            "category",
        ],
    ),
    (
        ExpenseColumn::DurationDisplay,
        &["耗时显示", "duration_display"],
    ),
    (
        ExpenseColumn::DiscountAmount,
        &["优惠金额", "discount_amount"],
    ),
    (ExpenseColumn::DiscountNote, &["优惠说明", "discount_note"]),
    (
        ExpenseColumn::Currency,
        &["货币(默认CNY)", "货币", "currency"],
    ),
    (
        ExpenseColumn::VehicleNo,
        &["车次/航班号(交通必填)", "车次/航班号", "vehicle_no"],
    ),
    (
        ExpenseColumn::PayChannel,
        &["支付渠道(可填中文或代码)", "支付渠道", "pay_channel"],
    ),
    (ExpenseColumn::Remark, &["备注", "remark"]),
];

/// Field → column number for one sheet, built from its header row.
#[derive(Debug)]
pub struct ColumnMap<K> {
    columns: HashMap<K, u32>,
}

impl<K: Copy + Eq + Hash> ColumnMap<K> {
    pub fn from_headers(headers: &[(u32, String)], table: &[(K, &[&str])]) -> Self {
        // field -> (synonym priority, column)
        let mut best: HashMap<K, (usize, u32)> = HashMap::new();
        for (column, text) in headers {
            for (field, synonyms) in table {
                let Some(priority) = synonyms.iter().position(|synonym| synonym == text) else {
                    continue;
                };
                best.entry(*field)
                    .and_modify(|current| {
                        if priority < current.0 {
                            *current = (priority, *column);
                        }
                    })
                    .or_insert((priority, *column));
            }
        }

        Self {
            columns: best
                .into_iter()
                .map(|(field, (_, column))| (field, column))
                .collect(),
        }
    }

    pub fn for_sheet(sheet: &Sheet, table: &[(K, &[&str])]) -> Self {
        Self::from_headers(&sheet.header_row(), table)
    }

    pub fn column(&self, field: K) -> Option<u32> {
        self.columns.get(&field).copied()
    }

    /// Cell of `field` in `row`, empty when the sheet has no such column.
    pub fn cell(&self, sheet: &Sheet, row: u32, field: K) -> Cell {
        self.column(field)
            .map_or(Cell::Empty, |column| sheet.cell(row, column))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(names: &[&str]) -> Vec<(u32, String)> {
        names
            .iter()
            .zip(1..)
            .map(|(name, column)| (column, (*name).to_string()))
            .collect()
    }

    #[test]
    fn columns_are_found_regardless_of_order() {
        let map = ColumnMap::from_headers(
            &headers(&["amount", "备注", "日期", "title"]),
            EXPENSE_HEADERS,
        );
        assert_eq!(map.column(ExpenseColumn::Amount), Some(1));
        assert_eq!(map.column(ExpenseColumn::Remark), Some(2));
        assert_eq!(map.column(ExpenseColumn::Date), Some(3));
        assert_eq!(map.column(ExpenseColumn::Title), Some(4));
        assert_eq!(map.column(ExpenseColumn::Category), None);
    }

    #[test]
    fn earlier_synonym_wins() {
        let map = ColumnMap::from_headers(&headers(&["date", "日期*(YYYY-MM-DD)"]), EXPENSE_HEADERS);
        assert_eq!(map.column(ExpenseColumn::Date), Some(2));

        let map = ColumnMap::from_headers(&headers(&["账本名称", "name"]), BOOK_HEADERS);
        assert_eq!(map.column(BookColumn::Name), Some(1));
    }

    #[test]
    fn every_synonym_is_unique() {
        let mut seen = std::collections::HashSet::new();
        for (_, synonyms) in EXPENSE_HEADERS {
            for synonym in *synonyms {
                assert!(seen.insert(*synonym), "duplicate header {synonym}");
            }
        }
    }
}
