use crate::models::{AuditTable, DatasetSummary};
use chrono::{DateTime, Local};
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// 已加载的数据集快照, 创建后只读
#[derive(Debug)]
pub struct Dataset {
    pub id: u64,
    pub file_name: String,
    pub source_rows: usize,
    pub loaded_at: DateTime<Local>,
    pub table: Arc<AuditTable>,
}

impl Dataset {
    pub fn summary(&self) -> DatasetSummary {
        DatasetSummary {
            dataset_id: self.id,
            file_name: self.file_name.clone(),
            source_rows: self.source_rows,
            audit_lines: self.table.len(),
            categories: self.table.categories(),
            brands: self.table.brands(),
            unique_batches: self.table.unique_batches(),
            total_system_qty: self.table.total_system_qty(),
            loaded_at: self.loaded_at,
        }
    }
}

/// 进程内数据集存储; 并发请求各自持有 `Arc` 快照, 互不影响
#[derive(Debug, Default)]
pub struct DatasetStore {
    datasets: DashMap<u64, Arc<Dataset>>,
    next_id: AtomicU64,
}

impl DatasetStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, file_name: String, source_rows: usize, table: AuditTable) -> Arc<Dataset> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        let dataset = Arc::new(Dataset {
            id,
            file_name,
            source_rows,
            loaded_at: Local::now(),
            table: Arc::new(table),
        });
        self.datasets.insert(id, Arc::clone(&dataset));
        tracing::info!(
            "Stored dataset {} ({} audit lines), {} datasets held",
            id,
            dataset.table.len(),
            self.datasets.len()
        );
        dataset
    }

    pub fn get(&self, id: u64) -> Option<Arc<Dataset>> {
        self.datasets.get(&id).map(|entry| Arc::clone(entry.value()))
    }

    pub fn remove(&self, id: u64) -> Option<Arc<Dataset>> {
        self.datasets.remove(&id).map(|(_, dataset)| dataset)
    }

    pub fn len(&self) -> usize {
        self.datasets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.datasets.is_empty()
    }
}
