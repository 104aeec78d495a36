pub mod audit;
pub mod record;
pub mod request;

pub use audit::{
    cmp_missing_last, group_by_category, unique_batches, AuditLine, AuditTable, DatasetSummary,
};
pub use record::{InventoryTable, NormalizedRecord, RawRecord};
pub use request::{PageSize, ReportRequest, Selection, ALL_SENTINEL};
