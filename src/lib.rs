pub mod config;
pub mod db;
pub mod extractor;
pub mod glm;
pub mod models;
pub mod ocr;
pub mod service;

pub use config::Settings;
pub use db::Database;
pub use models::{
    ExpenseDraft, ExpenseRecord, ExtractedExpense, ExtractionInput, InputType, RawInput, RecordId,
    Tag, TagId,
};
pub use service::ExpenseService;
