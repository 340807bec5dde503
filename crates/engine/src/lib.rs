//! Travel-expense ledger engine.
//!
//! Books (one per trip) hold expense items; items can carry receipt images.
//! Workbooks can be imported into and exported from a book, and a book can be
//! shared read-only through a preview secret.

pub use books::Book;
pub use draft::{DEFAULT_CURRENCY, ExpenseDraft, ExpenseInput, NumberField, Rejection};
pub use error::EngineError;
pub use expense_attachments::Attachment;
pub use expenses::Expense;
pub use normalize::Category;
pub use ops::{
    AttachmentFile, AttachmentUpload, BookNew, BookPatch, BookSummary, DailyTotal, Engine,
    EngineBuilder, ExpenseFilter, ExpensePage, ExportedWorkbook, GroupTotal, ImportReport,
    Leaderboard, LeaderboardEntry, PreviewGrant, PreviewStatus, RowError, SpendTotals,
};
pub use payment_channels::PayChannel;
pub use registry::PayChannelRegistry;
pub use storage::AttachmentStore;
pub use template::{TEMPLATE_FILE_NAME, import_template};

pub mod columns;
pub mod normalize;
pub mod registry;
pub mod workbook;

mod book_previews;
mod books;
mod draft;
mod error;
mod expense_attachments;
mod expenses;
mod ops;
mod payment_channels;
mod storage;
mod template;
pub mod users;

type ResultEngine<T> = Result<T, EngineError>;
