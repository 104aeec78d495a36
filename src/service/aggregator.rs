use crate::models::{AuditLine, AuditTable, NormalizedRecord};
use std::collections::HashMap;

/// 分组键: (分类, 品牌, 商品, 批次), 缺失值本身就是一个合法的键值
type GroupKey = (Option<String>, String, Option<String>, Option<String>);

/// 汇总数量取整: 四舍六入五成双 (round half to even)
pub fn round_quantity(total: f64) -> i64 {
    total.round_ties_even() as i64
}

/// 分组汇总并排序, 生成审计表
///
/// 组内数量先排序再求和, 保证结果与输入行顺序无关。
pub fn aggregate(records: &[NormalizedRecord]) -> AuditTable {
    let mut groups: HashMap<GroupKey, Vec<f64>> = HashMap::new();
    for record in records {
        groups
            .entry((
                record.category.clone(),
                record.brand.clone(),
                record.product_name.clone(),
                record.batch_number.clone(),
            ))
            .or_default()
            .push(record.quantity);
    }

    let mut lines: Vec<AuditLine> = groups
        .into_iter()
        .map(|((category, brand, product_name, batch_number), mut quantities)| {
            quantities.sort_by(f64::total_cmp);
            let total: f64 = quantities.iter().sum();
            AuditLine {
                category,
                brand,
                product_name,
                batch_number,
                system_qty: round_quantity(total),
            }
        })
        .collect();

    lines.sort_by(AuditLine::cmp_key);

    tracing::info!(
        "Aggregated {} rows into {} audit lines",
        records.len(),
        lines.len()
    );

    AuditTable::new(lines)
}
