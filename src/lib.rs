pub mod api;
pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod render;
pub mod service;
pub mod store;

pub use config::AppConfig;
pub use error::{AuditError, AuditResult};
pub use render::{DocumentRenderer, RenderedDocument};
pub use service::ReportService;
pub use store::DatasetStore;
