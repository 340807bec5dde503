//! User-defined payment channels.

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::Serialize;

pub const MAX_VALUE_CHARS: usize = 50;
pub const MAX_LABEL_CHARS: usize = 100;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PayChannel {
    pub id: i64,
    pub value: String,
    pub label: String,
}

impl From<Model> for PayChannel {
    fn from(value: Model) -> Self {
        Self {
            id: value.id,
            value: value.value,
            label: value.label,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "payment_channels")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub user_id: String,
    pub value: String,
    pub label: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
