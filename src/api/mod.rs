pub mod handlers;

pub use handlers::*;

use crate::config::AppConfig;
use crate::service::ReportService;
use crate::store::DatasetStore;
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::sync::Arc;

/// 共享状态: 报表服务 + 数据集存储
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<ReportService>,
    pub store: Arc<DatasetStore>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        Self {
            service: Arc::new(ReportService::new(&config.report)),
            store: Arc::new(DatasetStore::new()),
            config: Arc::new(config),
        }
    }
}

pub fn router(state: AppState) -> Router {
    let upload_limit = state.config.server.max_upload_bytes;

    Router::new()
        .route("/health", get(health_check))
        .route("/api/datasets", post(upload_dataset))
        .route("/api/datasets/:id", get(get_dataset).delete(delete_dataset))
        .route("/api/datasets/:id/report", post(generate_report))
        .layer(DefaultBodyLimit::max(upload_limit))
        .with_state(state)
}
