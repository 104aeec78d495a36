use serde::{Deserialize, Serialize};

/// 原始库存行 (只保留审计需要的四列)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    /// 数据所在行号 (表头为第 1 行)
    pub row_number: u64,
    pub product_name: Option<String>,
    pub category: Option<String>,
    pub batch_number: Option<String>,
    pub available_quantity: Option<String>,
}

/// 通过校验的输入表
#[derive(Debug, Clone)]
pub struct InventoryTable {
    pub records: Vec<RawRecord>,
}

impl InventoryTable {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// 归一化后的行: 品牌已提取, 数量已转为数值
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedRecord {
    pub category: Option<String>,
    pub brand: String,
    pub product_name: Option<String>,
    pub batch_number: Option<String>,
    pub quantity: f64,
}
