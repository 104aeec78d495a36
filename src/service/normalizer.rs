use crate::models::{NormalizedRecord, RawRecord};

/// 品牌与商品描述之间的分隔符
pub const BRAND_DELIMITER: &str = " - ";

/// 无法识别品牌时使用的值
pub const UNKNOWN_BRAND: &str = "Unknown";

/// 数量缺失或无法解析时按 0 计
pub const QUANTITY_DEFAULT: f64 = 0.0;

/// 从商品名提取品牌 (第一个 " - " 之前的部分)
///
/// 名称缺失、没有分隔符或前缀为空时返回 `Unknown`。
pub fn extract_brand(product_name: Option<&str>) -> String {
    product_name
        .map(str::trim)
        .and_then(|name| name.split_once(BRAND_DELIMITER))
        .map(|(brand, _)| brand.trim())
        .filter(|brand| !brand.is_empty())
        .unwrap_or(UNKNOWN_BRAND)
        .to_string()
}

fn parse_quantity(value: &str) -> Option<f64> {
    value.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// 数量转数值; 缺失、无法解析或非有限值时返回 `default`
pub fn coerce_quantity(value: Option<&str>, default: f64) -> f64 {
    value.and_then(parse_quantity).unwrap_or(default)
}

/// 逐行归一化, 无副作用; 无效数量取 `default_quantity`
pub fn normalize(records: &[RawRecord], default_quantity: f64) -> Vec<NormalizedRecord> {
    let mut defaulted_quantities = 0usize;
    let mut unknown_brands = 0usize;

    let normalized: Vec<NormalizedRecord> = records
        .iter()
        .map(|record| {
            let brand = extract_brand(record.product_name.as_deref());
            if brand == UNKNOWN_BRAND {
                unknown_brands += 1;
            }

            let raw_quantity = record.available_quantity.as_deref();
            if raw_quantity.and_then(parse_quantity).is_none() {
                defaulted_quantities += 1;
            }

            NormalizedRecord {
                category: record.category.clone(),
                brand,
                product_name: record.product_name.clone(),
                batch_number: record.batch_number.clone(),
                quantity: coerce_quantity(raw_quantity, default_quantity),
            }
        })
        .collect();

    if defaulted_quantities > 0 {
        tracing::warn!(
            "{} rows had a missing or non-numeric quantity, counted as {}",
            defaulted_quantities,
            default_quantity
        );
    }
    tracing::debug!(
        "Normalized {} rows, {} with unknown brand",
        normalized.len(),
        unknown_brands
    );

    normalized
}
