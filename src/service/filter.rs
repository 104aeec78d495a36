use crate::models::{AuditLine, AuditTable, ReportRequest};

/// 按分类、品牌筛选, 两个维度取交集, 保持原有顺序
pub fn filter(table: &AuditTable, request: &ReportRequest) -> AuditTable {
    if request.categories.is_all() && request.brands.is_all() {
        return table.clone();
    }

    let lines: Vec<AuditLine> = table
        .lines()
        .iter()
        .filter(|line| request.categories.matches(line.category.as_deref()))
        .filter(|line| request.brands.matches(Some(line.brand.as_str())))
        .cloned()
        .collect();

    tracing::debug!(
        "Filter kept {} of {} audit lines",
        lines.len(),
        table.len()
    );

    AuditTable::new(lines)
}
