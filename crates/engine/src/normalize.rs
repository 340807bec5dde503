//! Pure conversions from raw spreadsheet or form values to canonical ledger
//! values.
//!
//! Every function here is total: unparseable input yields `None` (or an empty
//! string for dates) and never an error. Callers decide what a missing value
//! means for them.

use std::sync::LazyLock;

use regex::Regex;

use crate::workbook::Cell;

#[allow(clippy::expect_used)]
static DATE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{4})-(\d{1,2})-(\d{1,2})$").expect("date pattern"));

#[allow(clippy::expect_used)]
static TIME_RANGE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{1,2}):(\d{2})\s*-\s*(\d{1,2}):(\d{2})$").expect("time range pattern")
});

/// Expense category. Stored as its upper-case code.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Category {
    Transport,
    Hotel,
    Food,
    Ticket,
    Shopping,
    Other,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::Transport,
        Category::Hotel,
        Category::Food,
        Category::Ticket,
        Category::Shopping,
        Category::Other,
    ];

    pub fn code(self) -> &'static str {
        match self {
            Category::Transport => "TRANSPORT",
            Category::Hotel => "HOTEL",
            Category::Food => "FOOD",
            Category::Ticket => "TICKET",
            Category::Shopping => "SHOPPING",
            Category::Other => "OTHER",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Category::Transport => "交通",
            Category::Hotel => "住宿",
            Category::Food => "餐饮",
            Category::Ticket => "门票",
            Category::Shopping => "购物",
            Category::Other => "其他",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|category| category.code() == code)
    }

    fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|category| category.label() == label)
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// Map a Chinese label or a (case-insensitive) code to a [`Category`].
pub fn normalize_category(raw: &str) -> Option<Category> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    Category::from_label(trimmed).or_else(|| Category::from_code(&trimmed.to_uppercase()))
}

/// Canonical pay-channel code: trimmed, upper-cased, with the legacy short
/// forms `MEITUAN` and `DOUYIN` rewritten to their `_MONTHLY` codes.
pub fn normalize_pay_channel_code(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    let upper = trimmed.to_uppercase();
    let code = match upper.as_str() {
        "MEITUAN" => "MEITUAN_MONTHLY".to_string(),
        "DOUYIN" => "DOUYIN_MONTHLY".to_string(),
        _ => upper,
    };
    Some(code)
}

/// Parse a date typed as text (`2026/2/5`, `2026.02.05`, `2026-2-5`) into
/// `YYYY-MM-DD`. Returns an empty string when the text is not a date.
pub fn parse_date_text(raw: &str) -> String {
    let text = raw.trim().replace(['/', '.'], "-");
    DATE_PATTERN
        .captures(&text)
        .map(|caps| format!("{}-{:0>2}-{:0>2}", &caps[1], &caps[2], &caps[3]))
        .unwrap_or_default()
}

/// Like [`parse_date_text`], but native date cells are taken as they are.
pub fn parse_date_cell(cell: &Cell) -> String {
    match cell {
        Cell::Date(date) => date.format("%Y-%m-%d").to_string(),
        other => parse_date_text(&other.to_text()),
    }
}

/// Numeric cell or numeric text. Non-finite values count as missing.
pub fn parse_number_cell(cell: &Cell) -> Option<f64> {
    match cell {
        Cell::Number(value) => value.is_finite().then_some(*value),
        Cell::Text(text) => {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                return None;
            }
            trimmed.parse::<f64>().ok().filter(|value| value.is_finite())
        }
        Cell::Empty | Cell::Bool(_) | Cell::Date(_) => None,
    }
}

/// Split `HH:MM-HH:MM` into start and end minutes after midnight.
///
/// Only the shape is checked, a range ending before it starts is still
/// returned.
pub fn parse_time_range(raw: &str) -> Option<(u32, u32)> {
    let caps = TIME_RANGE_PATTERN.captures(raw.trim())?;
    let part = |idx: usize| caps[idx].parse::<u32>().ok();
    let start = part(1)? * 60 + part(2)?;
    let end = part(3)? * 60 + part(4)?;
    Some((start, end))
}

/// Minutes between the two halves of a time range on the same day.
pub fn compute_duration_minutes(raw: &str) -> Option<i32> {
    let (start, end) = parse_time_range(raw)?;
    if end < start {
        return None;
    }
    i32::try_from(end - start).ok()
}
