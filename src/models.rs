//! Domain types for the expense-extraction pipeline.

mod extraction;
mod ids;
mod input;
mod record;
mod tag;

pub use extraction::ExtractedExpense;
pub use ids::{RecordId, TagId};
pub use input::{ExtractionInput, InputType};
pub use record::{ExpenseDraft, ExpenseRecord, RawInput};
pub use tag::Tag;
