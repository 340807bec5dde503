//! Receipt images attached to an expense. The row only references the blob;
//! the bytes live in the [`AttachmentStore`](crate::AttachmentStore).

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Attachment {
    pub id: i64,
    pub expense_id: i64,
    pub file_name: String,
    pub original_name: Option<String>,
    pub mime_type: String,
    pub size_bytes: i64,
    pub created_at: DateTime<Utc>,
}

impl From<Model> for Attachment {
    fn from(value: Model) -> Self {
        Self {
            id: value.id,
            expense_id: value.expense_id,
            file_name: value.file_name,
            original_name: value.original_name,
            mime_type: value.mime_type,
            size_bytes: value.size_bytes,
            created_at: value.created_at,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "expense_attachments")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub expense_id: i64,
    #[sea_orm(unique)]
    pub file_name: String,
    pub original_name: Option<String>,
    pub mime_type: String,
    pub size_bytes: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::expenses::Entity",
        from = "Column::ExpenseId",
        to = "super::expenses::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Expense,
}

impl Related<super::expenses::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Expense.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
