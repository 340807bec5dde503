use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Keep `null` distinct from an absent field: absent stays `None`, `null`
/// becomes `Some(None)`.
fn deserialize_some<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    T::deserialize(deserializer).map(Some)
}

pub mod user {
    use super::*;

    /// Profile of the authenticated caller.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct Me {
        pub username: String,
        pub nickname: Option<String>,
        pub role: String,
    }
}

pub mod book {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BookNew {
        pub name: String,
        pub start_date: Option<String>,
        pub end_date: Option<String>,
        pub description: Option<String>,
    }

    /// Partial update of a book.
    ///
    /// A missing field is left untouched, an explicit `null` clears it.
    /// `name` cannot be cleared.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct BookUpdate {
        pub name: Option<String>,
        #[serde(default, deserialize_with = "deserialize_some")]
        pub start_date: Option<Option<String>>,
        #[serde(default, deserialize_with = "deserialize_some")]
        pub end_date: Option<Option<String>>,
        #[serde(default, deserialize_with = "deserialize_some")]
        pub description: Option<Option<String>>,
        #[serde(default, deserialize_with = "deserialize_some")]
        pub summary: Option<Option<String>>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BookView {
        pub id: i64,
        pub name: String,
        pub start_date: Option<String>,
        pub end_date: Option<String>,
        pub description: Option<String>,
        pub summary: Option<String>,
        pub created_at: DateTime<Utc>,
        pub updated_at: DateTime<Utc>,
    }

    /// Book as seen through a preview link.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct PreviewBookView {
        #[serde(flatten)]
        pub book: BookView,
        pub show_receipts: bool,
    }
}

pub mod expense {
    use super::*;

    /// Body of an expense create or full update.
    ///
    /// Category and pay channel accept either a code or a label.
    #[derive(Debug, Default, Serialize, Deserialize)]
    #[serde(default)]
    pub struct ExpenseNew {
        pub date: String,
        pub time_range: Option<String>,
        pub title: String,
        pub amount: Option<f64>,
        pub category: String,
        pub duration_display: Option<String>,
        pub discount_amount: Option<f64>,
        pub discount_note: Option<String>,
        pub currency: Option<String>,
        pub vehicle_no: Option<String>,
        pub pay_channel: Option<String>,
        pub remark: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenseView {
        pub id: i64,
        pub book_id: i64,
        pub date: String,
        pub time_range: Option<String>,
        pub duration_minutes: Option<i32>,
        pub duration_display: Option<String>,
        pub title: String,
        pub amount: f64,
        pub discount_amount: f64,
        pub net_amount: f64,
        pub discount_note: Option<String>,
        pub currency: String,
        pub vehicle_no: Option<String>,
        pub pay_channel: Option<String>,
        pub pay_channel_label: String,
        pub category: String,
        pub category_label: String,
        pub remark: Option<String>,
        pub created_at: DateTime<Utc>,
        pub updated_at: DateTime<Utc>,
    }

    /// Query string of `GET .../expenses`.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct ExpenseListQuery {
        pub category: Option<String>,
        pub pay_channel: Option<String>,
        pub date_from: Option<String>,
        pub date_to: Option<String>,
        pub keyword: Option<String>,
        pub page: Option<u64>,
        pub page_size: Option<u64>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct Pagination {
        pub page: u64,
        pub page_size: u64,
        pub total: u64,
        pub total_pages: u64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenseListResponse {
        pub items: Vec<ExpenseView>,
        pub pagination: Pagination,
    }
}

pub mod attachment {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AttachmentView {
        pub id: i64,
        pub expense_id: i64,
        pub file_name: String,
        pub original_name: Option<String>,
        pub mime_type: String,
        pub size_bytes: i64,
        pub created_at: DateTime<Utc>,
    }
}

pub mod pay_channel {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct PayChannelNew {
        pub value: String,
        pub label: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct PayChannelUpdate {
        pub label: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct PayChannelView {
        pub id: i64,
        pub value: String,
        pub label: String,
    }
}

pub mod stats {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct GroupStat {
        pub name: String,
        pub count: i64,
        pub total_amount: f64,
        pub saved_amount: f64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct SummaryStats {
        pub total_count: i64,
        pub total_amount: f64,
        pub total_saved: f64,
        pub net_amount: f64,
        pub by_category: Vec<GroupStat>,
        pub by_pay_channel: Vec<GroupStat>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct DailyQuery {
        pub start_date: Option<String>,
        pub end_date: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct DailyStat {
        pub date: String,
        pub count: i64,
        pub total_amount: f64,
        pub saved_amount: f64,
        pub net_amount: f64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct LeaderboardItem {
        pub book_id: i64,
        pub book_name: String,
        pub count: i64,
        pub total_amount: f64,
        pub saved_amount: f64,
        pub net_amount: f64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct LeaderboardResponse {
        pub total_count: i64,
        pub total_amount: f64,
        pub total_saved: f64,
        pub net_amount: f64,
        pub items: Vec<LeaderboardItem>,
    }
}

pub mod import {
    use super::*;

    /// One skipped row. `row` is the 1-based spreadsheet row number.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct RowError {
        pub row: u32,
        pub error: String,
    }

    /// Outcome of a workbook import. Returned with 200 even when rows were
    /// skipped.
    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ImportResult {
        pub book_id: i64,
        pub book_name: String,
        pub created: bool,
        pub inserted_count: u32,
        pub skipped_count: u32,
        pub errors: Vec<RowError>,
    }
}

pub mod preview {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct PreviewStatus {
        pub enabled: bool,
        pub enabled_until: Option<DateTime<Utc>>,
        pub preview_id: Option<String>,
        pub show_receipts: bool,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct PreviewStatusUpdate {
        pub enabled: bool,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct PreviewSettings {
        pub show_receipts: bool,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct PreviewToken {
        pub preview_id: String,
    }
}

#[cfg(test)]
mod tests {
    use super::book::BookUpdate;

    #[test]
    fn book_update_tells_null_from_absent() {
        let update: BookUpdate =
            serde_json::from_str(r#"{"end_date": null, "summary": "fun"}"#).unwrap();
        assert_eq!(update.name, None);
        assert_eq!(update.start_date, None);
        assert_eq!(update.end_date, Some(None));
        assert_eq!(update.summary, Some(Some("fun".to_string())));
    }
}
