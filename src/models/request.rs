use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

/// 旧式多选列表中代表"全部"的哨兵值
pub const ALL_SENTINEL: &str = "All";

/// 单个维度的筛选条件
///
/// `All` 表示不过滤; `Explicit` 只保留集合内的值, 空集合表示什么都不保留。
/// 集合保持调用方给出的顺序 (用于文档抬头展示) 并去重。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Selection {
    #[default]
    All,
    Explicit(IndexSet<String>),
}

impl Selection {
    pub fn explicit<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Explicit(names.into_iter().map(Into::into).collect())
    }

    /// 从旧式列表转换: 含 "All" 即视为全部, 其余 (包括空列表) 为显式集合
    pub fn from_legacy<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: IndexSet<String> = names.into_iter().map(Into::into).collect();
        if names.contains(ALL_SENTINEL) {
            Self::All
        } else {
            Self::Explicit(names)
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, Self::All)
    }

    /// 缺失值永远不在显式集合中
    pub fn matches(&self, value: Option<&str>) -> bool {
        match self {
            Self::All => true,
            Self::Explicit(names) => value.map_or(false, |v| names.contains(v)),
        }
    }

    /// 抬头展示文本; 全部或空集合显示 `all_label`
    pub fn describe(&self, all_label: &str) -> String {
        match self {
            Self::Explicit(names) if !names.is_empty() => {
                names.iter().map(String::as_str).collect::<Vec<_>>().join(", ")
            }
            _ => all_label.to_string(),
        }
    }
}

/// 纸张尺寸
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageSize {
    #[default]
    Letter,
    A4,
}

impl PageSize {
    /// (宽, 高), 单位 pt
    pub fn dimensions(&self) -> (f32, f32) {
        match self {
            Self::Letter => (612.0, 792.0),
            Self::A4 => (595.28, 841.89),
        }
    }
}

/// 一次报表生成请求
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportRequest {
    pub categories: Selection,
    pub brands: Selection,
    pub page_size: PageSize,
}
