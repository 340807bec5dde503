use chrono::{DateTime, Utc};
use sea_orm::DatabaseConnection;

use crate::{AttachmentStore, EngineError, ResultEngine};

mod access;
mod attachments;
mod books;
mod expenses;
mod export;
mod import;
mod pay_channels;
mod previews;
mod stats;

pub use attachments::{AttachmentFile, AttachmentUpload};
pub use books::{BookNew, BookPatch};
pub use expenses::{ExpenseFilter, ExpensePage};
pub use export::ExportedWorkbook;
pub use import::{ImportReport, RowError};
pub use previews::{PreviewGrant, PreviewStatus};
pub use stats::{BookSummary, DailyTotal, GroupTotal, Leaderboard, LeaderboardEntry, SpendTotals};

/// Run a block inside a DB transaction, committing on success and rolling back on error.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = $self.database.begin().await?;
        let result = $body;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }};
}

pub(crate) use with_tx;

const DEFAULT_ATTACHMENTS_DIR: &str = "uploads/expense_attachments";

#[derive(Debug)]
pub struct Engine {
    database: DatabaseConnection,
    attachments: AttachmentStore,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    pub fn attachments(&self) -> &AttachmentStore {
        &self.attachments
    }

    /// Server clock. Every stored timestamp is UTC.
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

fn normalize_required_name(value: &str, label: &str) -> ResultEngine<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(EngineError::InvalidInput(format!(
            "{label} name must not be empty"
        )));
    }
    Ok(trimmed.to_string())
}

fn normalize_optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    database: DatabaseConnection,
    attachments: Option<AttachmentStore>,
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Where attachment blobs are kept. Defaults to
    /// `uploads/expense_attachments` under the working directory.
    pub fn attachments(mut self, store: AttachmentStore) -> EngineBuilder {
        self.attachments = Some(store);
        self
    }

    /// Construct `Engine`
    pub async fn build(self) -> ResultEngine<Engine> {
        Ok(Engine {
            database: self.database,
            attachments: self
                .attachments
                .unwrap_or_else(|| AttachmentStore::new(DEFAULT_ATTACHMENTS_DIR)),
        })
    }
}
