pub mod layout;
pub mod metrics;
pub mod pdf;

use crate::config::ReportConfig;
use crate::error::RenderError;
use crate::models::{AuditLine, PageSize, Selection};
use chrono::NaiveDateTime;
use layout::StoryContext;

/// 渲染参数
#[derive(Debug, Clone)]
pub struct RenderSettings {
    pub title: String,
    pub product_max_chars: usize,
    pub max_lines: usize,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self::from(&ReportConfig::default())
    }
}

impl From<&ReportConfig> for RenderSettings {
    fn from(config: &ReportConfig) -> Self {
        Self {
            title: config.title.clone(),
            product_max_chars: config.product_max_chars,
            max_lines: config.max_lines,
        }
    }
}

/// 生成完成的文档, 生成后不再修改, 也不缓存
#[derive(Debug, Clone)]
pub struct RenderedDocument {
    pub bytes: Vec<u8>,
    pub page_count: usize,
    pub section_count: usize,
    pub file_name: String,
}

/// 下载文件名: DC_Audit_<前两个分类或 All>_<YYYYmmdd_HHMM>.pdf
pub fn suggested_file_name(categories: &Selection, generated_at: NaiveDateTime) -> String {
    let part = match categories {
        Selection::Explicit(names) if !names.is_empty() => names
            .iter()
            .take(2)
            .map(|name| {
                name.chars()
                    .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
                    .collect::<String>()
            })
            .collect::<Vec<_>>()
            .join("_"),
        _ => "All".to_string(),
    };
    format!("DC_Audit_{}_{}.pdf", part, generated_at.format("%Y%m%d_%H%M"))
}

/// 审计工作表渲染器
#[derive(Debug, Clone, Default)]
pub struct DocumentRenderer {
    settings: RenderSettings,
}

impl DocumentRenderer {
    pub fn new(settings: RenderSettings) -> Self {
        Self { settings }
    }

    /// 渲染筛选后的审计行; 时间戳由调用方提供, 输出只取决于输入
    pub fn render(
        &self,
        lines: &[AuditLine],
        categories: &Selection,
        brands: &Selection,
        page_size: PageSize,
        generated_at: NaiveDateTime,
    ) -> Result<RenderedDocument, RenderError> {
        if lines.len() > self.settings.max_lines {
            return Err(RenderError::TooManyLines {
                lines: lines.len(),
                limit: self.settings.max_lines,
            });
        }

        let ctx = StoryContext {
            title: &self.settings.title,
            categories,
            brands,
            generated_at,
            product_max_chars: self.settings.product_max_chars,
        };
        let story = layout::compose(lines, &ctx);
        let section_count = story
            .iter()
            .filter(|block| matches!(block, layout::Block::SectionHeader { .. }))
            .count();

        let pages = layout::paginate(&story, page_size);
        let bytes = pdf::encode(&pages, page_size, &self.settings.title, generated_at)?;

        tracing::info!(
            "Rendered audit worksheet: {} lines, {} sections, {} pages, {} bytes",
            lines.len(),
            section_count,
            pages.len(),
            bytes.len()
        );

        Ok(RenderedDocument {
            bytes,
            page_count: pages.len(),
            section_count,
            file_name: suggested_file_name(categories, generated_at),
        })
    }
}
