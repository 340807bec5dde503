//! Preview grants: at most one per book.
//!
//! A grant is enabled while `enabled_until` lies in the future. Disabling
//! moves `enabled_until` into the past and keeps the row, so the secret
//! survives and old links work again once re-enabled.

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "book_previews")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub book_id: i64,
    pub user_id: String,
    pub secret: Option<String>,
    pub enabled_until: DateTime<Utc>,
    pub show_receipts: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Model {
    pub fn is_enabled(&self, now: DateTime<Utc>) -> bool {
        self.enabled_until > now
    }
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
}

impl Related<super::books::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Book.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
