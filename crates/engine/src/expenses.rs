//! Expense items of a book.

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::Serialize;

use crate::normalize::Category;

/// A stored expense. `amount - discount_amount` is the net cost; it is never
/// stored.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Expense {
    pub id: i64,
    pub book_id: i64,
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
    #[serde(serialize_with = "serialize_category")]
    pub category: Category,
    pub remark: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn serialize_category<S: serde::Serializer>(value: &Category, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(value.code())
}

impl Expense {
    pub fn net_amount(&self) -> f64 {
        self.amount - self.discount_amount
    }
}

impl From<Model> for Expense {
    fn from(value: Model) -> Self {
        Self {
            id: value.id,
            book_id: value.book_id,
            date: value.date,
            time_range: value.time_range,
            duration_minutes: value.duration_minutes,
            duration_display: value.duration_display,
            title: value.title,
            amount: value.amount,
            discount_amount: value.discount_amount,
            discount_note: value.discount_note,
            currency: value.currency,
            vehicle_no: value.vehicle_no,
            pay_channel: value.pay_channel,
            category: Category::from_code(&value.category).unwrap_or(Category::Other),
            remark: value.remark,
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "expenses")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub book_id: i64,
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
    pub category: String,
    pub remark: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::books::Entity",
        from = "Column::BookId",
        to = "super::books::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Book,
    #[sea_orm(has_many = "super::expense_attachments::Entity")]
    Attachments,
}

impl Related<super::books::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Book.def()
    }
}

impl Related<super::expense_attachments::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Attachments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
