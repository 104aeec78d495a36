use chrono::{DateTime, Local};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeSet;

/// 缺失值排在所有有值项之后
pub fn cmp_missing_last(a: Option<&str>, b: Option<&str>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// 审计行: (分类, 品牌, 商品, 批次) 唯一
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditLine {
    pub category: Option<String>,
    pub brand: String,
    pub product_name: Option<String>,
    pub batch_number: Option<String>,
    pub system_qty: i64,
}

impl AuditLine {
    /// 按 (分类, 品牌, 商品, 批次) 比较
    pub fn cmp_key(&self, other: &Self) -> Ordering {
        cmp_missing_last(self.category.as_deref(), other.category.as_deref())
            .then_with(|| self.brand.cmp(&other.brand))
            .then_with(|| {
                cmp_missing_last(self.product_name.as_deref(), other.product_name.as_deref())
            })
            .then_with(|| {
                cmp_missing_last(self.batch_number.as_deref(), other.batch_number.as_deref())
            })
    }
}

/// 聚合后的审计表, 每个数据集只计算一次, 之后只读共享
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditTable {
    lines: Vec<AuditLine>,
}

impl AuditTable {
    pub fn new(lines: Vec<AuditLine>) -> Self {
        Self { lines }
    }

    pub fn lines(&self) -> &[AuditLine] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// 已出现的分类 (去重、升序, 不含缺失值)
    pub fn categories(&self) -> Vec<String> {
        self.lines
            .iter()
            .filter_map(|l| l.category.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// 已出现的品牌 (去重、升序)
    pub fn brands(&self) -> Vec<String> {
        self.lines
            .iter()
            .map(|l| l.brand.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    pub fn unique_batches(&self) -> usize {
        unique_batches(&self.lines)
    }

    pub fn total_system_qty(&self) -> i64 {
        self.lines.iter().map(|l| l.system_qty).sum()
    }
}

/// 不同批次号的数量, 缺失批次不计
pub fn unique_batches(lines: &[AuditLine]) -> usize {
    lines
        .iter()
        .filter_map(|l| l.batch_number.as_deref())
        .collect::<BTreeSet<_>>()
        .len()
}

/// 按分类分组, 分类升序 (缺失分类最后), 组内保持原顺序
pub fn group_by_category(lines: &[AuditLine]) -> IndexMap<Option<&str>, Vec<&AuditLine>> {
    let mut sections: IndexMap<Option<&str>, Vec<&AuditLine>> = IndexMap::new();
    for line in lines {
        sections
            .entry(line.category.as_deref())
            .or_default()
            .push(line);
    }
    sections.sort_by(|a, _, b, _| cmp_missing_last(*a, *b));
    sections
}

/// 数据集概要, 供选择界面展示可选项
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetSummary {
    pub dataset_id: u64,
    pub file_name: String,
    pub source_rows: usize,
    pub audit_lines: usize,
    pub categories: Vec<String>,
    pub brands: Vec<String>,
    pub unique_batches: usize,
    pub total_system_qty: i64,
    pub loaded_at: DateTime<Local>,
}
