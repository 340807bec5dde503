//! Validation shared by every path that writes an expense.
//!
//! Import rows and API requests are both turned into an [`ExpenseInput`] and
//! checked by [`ExpenseInput::validate`]. The checks run in a fixed order and
//! stop at the first failure, so the same bad input always produces the same
//! [`Rejection`].

use crate::{
    normalize::{
        Category, compute_duration_minutes, normalize_category, parse_date_text,
        parse_number_cell, parse_time_range,
    },
    registry::PayChannelRegistry,
    workbook::Cell,
};

pub const DEFAULT_CURRENCY: &str = "CNY";

/// A numeric field as entered.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum NumberField {
    #[default]
    Blank,
    Invalid,
    Value(f64),
}

impl NumberField {
    pub fn from_cell(cell: &Cell) -> Self {
        if cell.is_blank() {
            return Self::Blank;
        }
        parse_number_cell(cell).map_or(Self::Invalid, Self::Value)
    }

    pub fn from_number(value: Option<f64>) -> Self {
        match value {
            None => Self::Blank,
            Some(value) if value.is_finite() => Self::Value(value),
            Some(_) => Self::Invalid,
        }
    }
}

/// Reason an expense is refused, in check order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Rejection {
    MissingRequired,
    InvalidAmount,
    InvalidDiscount,
    DiscountExceedsAmount,
    InvalidTimeRange,
    VehicleNoRequired,
    InvalidPayChannel,
}

impl Rejection {
    pub fn message(self) -> &'static str {
        match self {
            Self::MissingRequired => "date, time range, title, amount and category are required",
            Self::InvalidAmount => "invalid amount",
            Self::InvalidDiscount => "invalid discount amount",
            Self::DiscountExceedsAmount => "discount amount exceeds amount",
            Self::InvalidTimeRange => "invalid time range",
            Self::VehicleNoRequired => "transport expenses require a vehicle or flight number",
            Self::InvalidPayChannel => "invalid payment channel",
        }
    }
}

impl std::fmt::Display for Rejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message())
    }
}

/// Raw expense fields. Text fields may carry surrounding whitespace, labels
/// instead of codes, or nothing at all.
#[derive(Clone, Debug, Default)]
pub struct ExpenseInput {
    pub date: String,
    pub time_range: String,
    pub title: String,
    pub amount: NumberField,
    pub category: String,
    pub duration_display: String,
    pub discount_amount: NumberField,
    pub discount_note: String,
    pub currency: String,
    pub vehicle_no: String,
    pub pay_channel: String,
    pub remark: String,
}

/// A validated, normalized expense.
#[derive(Clone, Debug, PartialEq)]
pub struct ExpenseDraft {
    pub date: String,
    pub time_range: Option<String>,
    pub duration_minutes: Option<i32>,
    pub duration_display: Option<String>,
    pub title: String,
    pub amount: f64,
    pub discount_amount: f64,
    pub discount_note: Option<String>,
    pub currency: String,
    pub vehicle_no: Option<String>,
    pub pay_channel: Option<String>,
    pub category: Category,
    pub remark: Option<String>,
}

fn optional(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

impl ExpenseInput {
    /// Validate and normalize.
    ///
    /// With `require_time_range` a missing or malformed time range counts as
    /// a missing required field (import rows); without it a time range is
    /// optional (direct entry).
    pub fn validate(
        &self,
        registry: &PayChannelRegistry,
        require_time_range: bool,
    ) -> Result<ExpenseDraft, Rejection> {
        let date = parse_date_text(&self.date);
        let time_range = optional(&self.time_range);
        let title = self.title.trim();
        let category = normalize_category(&self.category);

        let time_range_ok = match &time_range {
            Some(range) => !require_time_range || parse_time_range(range).is_some(),
            None => !require_time_range,
        };
        let (NumberField::Value(amount), Some(category)) = (self.amount, category) else {
            return Err(Rejection::MissingRequired);
        };
        if date.is_empty() || title.is_empty() || !time_range_ok {
            return Err(Rejection::MissingRequired);
        }

        if amount < 0.0 {
            return Err(Rejection::InvalidAmount);
        }

        let discount_amount = match self.discount_amount {
            NumberField::Blank => 0.0,
            NumberField::Value(value) if value >= 0.0 => value,
            NumberField::Value(_) | NumberField::Invalid => {
                return Err(Rejection::InvalidDiscount);
            }
        };
        if discount_amount > amount {
            return Err(Rejection::DiscountExceedsAmount);
        }

        let duration_minutes = match &time_range {
            Some(range) => Some(compute_duration_minutes(range).ok_or(Rejection::InvalidTimeRange)?),
            None => None,
        };

        let vehicle_no = optional(&self.vehicle_no);
        if category == Category::Transport && vehicle_no.is_none() {
            return Err(Rejection::VehicleNoRequired);
        }

        let pay_channel = match registry.resolve(&self.pay_channel) {
            Some(code) if !registry.is_allowed(&code) => {
                return Err(Rejection::InvalidPayChannel);
            }
            other => other,
        };

        Ok(ExpenseDraft {
            date,
            time_range,
            duration_minutes,
            duration_display: optional(&self.duration_display),
            title: title.to_string(),
            amount,
            discount_amount,
            discount_note: optional(&self.discount_note),
            currency: optional(&self.currency).unwrap_or_else(|| DEFAULT_CURRENCY.to_string()),
            vehicle_no,
            pay_channel,
            category,
            remark: optional(&self.remark),
        })
    }
}
