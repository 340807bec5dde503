//! Read-only view of an uploaded `.xlsx` workbook.
//!
//! Rows and columns are 1-based, the way they are numbered in a spreadsheet
//! application, so row numbers can be reported back to users unchanged.

use std::io::Cursor;

use calamine::{Data, Range, Reader, Xlsx};
use chrono::{NaiveDate, TimeDelta};

use crate::{EngineError, ResultEngine};

/// A typed cell value.
#[derive(Clone, Debug, PartialEq)]
pub enum Cell {
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
    Date(NaiveDate),
}

impl Cell {
    /// Cell rendered as plain text. Dates are rendered as `YYYY-MM-DD`.
    pub fn to_text(&self) -> String {
        match self {
            Cell::Empty => String::new(),
            Cell::Text(text) => text.clone(),
            Cell::Number(value) => value.to_string(),
            Cell::Bool(value) => value.to_string(),
            Cell::Date(date) => date.format("%Y-%m-%d").to_string(),
        }
    }

    /// Trimmed text form.
    pub fn text(&self) -> String {
        self.to_text().trim().to_string()
    }

    pub fn is_blank(&self) -> bool {
        self.text().is_empty()
    }
}

impl From<&Data> for Cell {
    fn from(value: &Data) -> Self {
        match value {
            Data::Empty | Data::Error(_) => Cell::Empty,
            Data::String(text) => Cell::Text(text.clone()),
            Data::Int(value) => Cell::Number(*value as f64),
            Data::Float(value) => Cell::Number(*value),
            Data::Bool(value) => Cell::Bool(*value),
            Data::DateTime(value) => excel_serial_to_date(value.as_f64())
                .map_or_else(|| Cell::Number(value.as_f64()), Cell::Date),
            Data::DateTimeIso(text) => text
                .get(..10)
                .and_then(|prefix| NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok())
                .map_or_else(|| Cell::Text(text.clone()), Cell::Date),
            Data::DurationIso(text) => Cell::Text(text.clone()),
        }
    }
}

/// Excel serial day numbers count from 1899-12-30 (the 1900 leap-year bug
/// included); the fractional part is the time of day.
fn excel_serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() {
        return None;
    }
    let days = serial.floor();
    if days < i64::MIN as f64 || days > i64::MAX as f64 {
        return None;
    }
    let base = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    base.checked_add_signed(TimeDelta::try_days(days as i64)?)
}

/// One worksheet.
#[derive(Debug)]
pub struct Sheet {
    name: String,
    range: Range<Data>,
}

impl Sheet {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of the last used row, 0 for an empty sheet.
    pub fn last_row(&self) -> u32 {
        self.range.end().map_or(0, |(row, _)| row + 1)
    }

    fn last_column(&self) -> u32 {
        self.range.end().map_or(0, |(_, column)| column + 1)
    }

    pub fn cell(&self, row: u32, column: u32) -> Cell {
        if row == 0 || column == 0 {
            return Cell::Empty;
        }
        self.range
            .get_value((row - 1, column - 1))
            .map_or(Cell::Empty, Cell::from)
    }

    /// Every cell of `row`, from column 1 up to the last used column.
    pub fn row(&self, row: u32) -> Vec<Cell> {
        (1..=self.last_column())
            .map(|column| self.cell(row, column))
            .collect()
    }

    /// Non-empty header cells of row 1 as `(column, trimmed text)`.
    pub fn header_row(&self) -> Vec<(u32, String)> {
        self.row(1)
            .into_iter()
            .zip(1..)
            .filter_map(|(cell, column)| {
                let text = cell.text();
                (!text.is_empty()).then_some((column, text))
            })
            .collect()
    }
}

/// All worksheets of a workbook, loaded eagerly.
#[derive(Debug)]
pub struct Workbook {
    sheets: Vec<Sheet>,
}

impl Workbook {
    /// Parse `.xlsx` bytes. Anything that is not a readable workbook is an
    /// [`EngineError::InvalidWorkbook`].
    pub fn load(bytes: &[u8]) -> ResultEngine<Self> {
        let unreadable = |err: calamine::XlsxError| {
            tracing::debug!("workbook rejected: {err}");
            EngineError::InvalidWorkbook("xlsx could not be parsed, check the file format".to_string())
        };

        let mut xlsx: Xlsx<_> = Xlsx::new(Cursor::new(bytes)).map_err(unreadable)?;
        let mut sheets = Vec::new();
        for name in xlsx.sheet_names() {
            let range = xlsx.worksheet_range(&name).map_err(unreadable)?;
            sheets.push(Sheet { name, range });
        }
        Ok(Self { sheets })
    }

    pub fn sheet(&self, name: &str) -> Option<&Sheet> {
        self.sheets.iter().find(|sheet| sheet.name == name)
    }

    /// First sheet whose name is in `names`, else the first sheet of the
    /// workbook.
    pub fn find_sheet(&self, names: &[&str]) -> Option<&Sheet> {
        names
            .iter()
            .find_map(|name| self.sheet(name))
            .or_else(|| self.sheets.first())
    }
}
