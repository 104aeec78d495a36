pub mod aggregator;
pub mod filter;
pub mod loader;
pub mod normalizer;
pub mod report;

pub use aggregator::aggregate;
pub use filter::filter;
pub use loader::InventoryLoader;
pub use normalizer::{coerce_quantity, extract_brand, normalize};
pub use report::{PreparedDataset, ReportOutcome, ReportService};
