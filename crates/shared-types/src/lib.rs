pub mod report;
pub mod types;

pub use report::{FieldComparison, FieldStatus, ReportError, StatusSummary, ValidationReport};
pub use types::{
    BuildingSummary, ListingRecord, RegistryAreaRow, RegistrySnapshot, SourceKind, SourceRecord,
};
