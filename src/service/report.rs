use crate::config::ReportConfig;
use crate::error::{AuditError, RenderError};
use crate::models::{AuditTable, ReportRequest};
use crate::render::{DocumentRenderer, RenderSettings, RenderedDocument};
use crate::service::{aggregator, filter, loader::InventoryLoader, normalizer};
use chrono::NaiveDateTime;

/// 加载完成的数据集: 原始行数 + 聚合后的审计表
#[derive(Debug, Clone)]
pub struct PreparedDataset {
    pub source_rows: usize,
    pub table: AuditTable,
}

/// 报表生成结果; 筛选为空不是错误
#[derive(Debug, Clone)]
pub enum ReportOutcome {
    Rendered(RenderedDocument),
    NoRowsMatch,
}

/// 报表服务: 校验 → 归一化 → 聚合 (每个数据集一次), 筛选 → 渲染 (每次请求)
#[derive(Debug, Clone, Default)]
pub struct ReportService {
    loader: InventoryLoader,
    renderer: DocumentRenderer,
}

impl ReportService {
    pub fn new(config: &ReportConfig) -> Self {
        Self {
            loader: InventoryLoader::new(),
            renderer: DocumentRenderer::new(RenderSettings::from(config)),
        }
    }

    pub fn with_parts(loader: InventoryLoader, renderer: DocumentRenderer) -> Self {
        Self { loader, renderer }
    }

    /// 从 CSV 字节构建审计表
    pub fn prepare(&self, data: &[u8]) -> Result<PreparedDataset, AuditError> {
        let inventory = self.loader.load_bytes(data)?;
        let normalized = normalizer::normalize(&inventory.records, normalizer::QUANTITY_DEFAULT);
        let table = aggregator::aggregate(&normalized);

        Ok(PreparedDataset {
            source_rows: inventory.len(),
            table,
        })
    }

    /// 按请求筛选并生成文档; 审计表只读, 失败后可直接重试
    pub fn generate(
        &self,
        table: &AuditTable,
        request: &ReportRequest,
        generated_at: NaiveDateTime,
    ) -> Result<ReportOutcome, RenderError> {
        let filtered = filter::filter(table, request);
        if filtered.is_empty() {
            tracing::info!("No audit lines match the selection, nothing to render");
            return Ok(ReportOutcome::NoRowsMatch);
        }

        let document = self
            .renderer
            .render(
                filtered.lines(),
                &request.categories,
                &request.brands,
                request.page_size,
                generated_at,
            )
            .map_err(|e| {
                tracing::error!("Audit worksheet render failed: {}", e);
                e
            })?;

        Ok(ReportOutcome::Rendered(document))
    }
}
