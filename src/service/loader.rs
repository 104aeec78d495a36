use crate::error::{AuditError, ParseError, ValidationError};
use crate::models::{InventoryTable, RawRecord};
use csv::StringRecord;

/// 视为缺失值的单元格内容 (空串之外)
const NA_MARKERS: &[&str] = &[
    "NA", "N/A", "n/a", "NaN", "nan", "null", "NULL", "None", "#N/A", "<NA>",
];

/// 必需列及其可接受的列名 (不区分大小写)
#[derive(Debug, Clone)]
pub struct ColumnMapping {
    pub product_name: Vec<String>,
    pub category: Vec<String>,
    pub batch_number: Vec<String>,
    pub available_quantity: Vec<String>,
}

impl Default for ColumnMapping {
    fn default() -> Self {
        Self {
            product_name: vec![
                "Distru Product".to_string(),
                "ProductName".to_string(),
                "Product Name".to_string(),
                "Product".to_string(),
            ],
            category: vec!["Category".to_string()],
            batch_number: vec![
                "Distru Batch Number".to_string(),
                "BatchNumber".to_string(),
                "Batch Number".to_string(),
                "Batch".to_string(),
            ],
            available_quantity: vec![
                "Available Quantity".to_string(),
                "AvailableQuantity".to_string(),
                "Quantity".to_string(),
            ],
        }
    }
}

/// 必需列在表头中的位置
#[derive(Debug, Clone, Copy)]
struct ColumnIndices {
    product_name: usize,
    category: usize,
    batch_number: usize,
    available_quantity: usize,
}

impl ColumnMapping {
    fn find(candidates: &[String], headers: &StringRecord) -> Option<usize> {
        candidates.iter().find_map(|candidate| {
            headers
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(candidate.trim()))
        })
    }

    /// 解析列位置; 缺失时返回全部缺失列的首选列名
    fn resolve(&self, headers: &StringRecord) -> Result<ColumnIndices, Vec<String>> {
        let fields = [
            &self.product_name,
            &self.category,
            &self.batch_number,
            &self.available_quantity,
        ];

        let mut found = [0usize; 4];
        let mut missing = Vec::new();
        for (slot, candidates) in found.iter_mut().zip(fields) {
            match Self::find(candidates, headers) {
                Some(idx) => *slot = idx,
                None => missing.push(candidates.first().cloned().unwrap_or_default()),
            }
        }

        if !missing.is_empty() {
            return Err(missing);
        }

        let [product_name, category, batch_number, available_quantity] = found;
        Ok(ColumnIndices {
            product_name,
            category,
            batch_number,
            available_quantity,
        })
    }
}

/// CSV 加载与校验
#[derive(Debug, Clone, Default)]
pub struct InventoryLoader {
    mapping: ColumnMapping,
}

impl InventoryLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// 解析并校验; 任何失败都不返回部分数据
    pub fn load_bytes(&self, data: &[u8]) -> Result<InventoryTable, AuditError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(data);

        let headers = reader.headers().map_err(ParseError::from)?.clone();
        if headers.is_empty() || headers.iter().all(str::is_empty) {
            return Err(ParseError::MissingHeader.into());
        }

        // 先完整解析, 再做字段校验
        let mut rows = Vec::new();
        for result in reader.records() {
            let record = result.map_err(ParseError::from)?;
            if record.len() > headers.len() {
                return Err(ParseError::FieldCount {
                    line: record.position().map(|p| p.line()).unwrap_or_default(),
                    expected: headers.len(),
                    found: record.len(),
                }
                .into());
            }
            rows.push(record);
        }

        if rows.is_empty() {
            tracing::warn!("Inventory CSV has a header but no data rows");
            return Err(ValidationError::EmptyDataset.into());
        }

        let columns = self.mapping.resolve(&headers).map_err(|missing| {
            tracing::warn!("Inventory CSV missing required columns: {:?}", missing);
            ValidationError::MissingColumns(missing)
        })?;

        let records: Vec<RawRecord> = rows
            .iter()
            .enumerate()
            .map(|(idx, row)| RawRecord {
                row_number: row
                    .position()
                    .map(|p| p.line())
                    .unwrap_or(idx as u64 + 2),
                product_name: cell(row, columns.product_name),
                category: cell(row, columns.category),
                batch_number: cell(row, columns.batch_number),
                available_quantity: cell(row, columns.available_quantity),
            })
            .collect();

        tracing::info!(
            "Loaded inventory CSV: {} rows, {} columns",
            records.len(),
            headers.len()
        );

        Ok(InventoryTable {
            records,
        })
    }
}

/// 读取单元格; 空值和 NA 标记视为缺失
fn cell(record: &StringRecord, idx: usize) -> Option<String> {
    let value = record.get(idx)?.trim();
    if value.is_empty() || NA_MARKERS.contains(&value) {
        None
    } else {
        Some(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "Distru Product,Category,Distru Batch Number,Available Quantity,Location";

    fn load(csv: &str) -> Result<InventoryTable, AuditError> {
        InventoryLoader::new().load_bytes(csv.as_bytes())
    }

    #[test]
    fn test_load_valid_csv() {
        let csv = format!(
            "{}\nAcme - Widget A,Vape,B1,5,Shelf 1\n\"Bolt - Gummies, Sour\",Edible,B2,abc,Shelf 2",
            HEADER
        );
        let table = load(&csv).unwrap();

        assert_eq!(table.len(), 2);
        assert_eq!(table.records[0].row_number, 2);
        assert_eq!(table.records[0].product_name.as_deref(), Some("Acme - Widget A"));
        assert_eq!(table.records[1].product_name.as_deref(), Some("Bolt - Gummies, Sour"));
        assert_eq!(table.records[1].available_quantity.as_deref(), Some("abc"));
    }

    #[test]
    fn test_alias_headers_case_insensitive() {
        let csv = "productname, CATEGORY ,batch,quantity\nAcme - A,Vape,B1,2";
        let table = load(csv).unwrap();
        assert_eq!(table.records[0].batch_number.as_deref(), Some("B1"));
        assert_eq!(table.records[0].available_quantity.as_deref(), Some("2"));
    }

    #[test]
    fn test_missing_cells_and_short_rows() {
        let csv = format!("{}\nAcme - A,,NA,\nAcme - B,Vape", HEADER);
        let table = load(&csv).unwrap();

        assert_eq!(table.records[0].category, None);
        assert_eq!(table.records[0].batch_number, None);
        assert_eq!(table.records[0].available_quantity, None);
        assert_eq!(table.records[1].batch_number, None);
    }

    #[test]
    fn test_reports_all_missing_columns() {
        let err = load("Distru Product,Location\nAcme - A,Shelf").unwrap_err();
        assert_eq!(
            err,
            AuditError::Validation(ValidationError::MissingColumns(vec![
                "Category".to_string(),
                "Distru Batch Number".to_string(),
                "Available Quantity".to_string(),
            ]))
        );
    }

    #[test]
    fn test_header_only_is_empty_dataset() {
        let err = load(HEADER).unwrap_err();
        assert_eq!(err, AuditError::Validation(ValidationError::EmptyDataset));
    }

    #[test]
    fn test_empty_input_is_parse_error() {
        let err = load("").unwrap_err();
        assert_eq!(err, AuditError::Parse(ParseError::MissingHeader));
    }

    #[test]
    fn test_overlong_row_is_parse_error() {
        let csv = format!("{}\nAcme - A,Vape,B1,5,Shelf,extra", HEADER);
        match load(&csv).unwrap_err() {
            AuditError::Parse(ParseError::FieldCount { line, expected, found }) => {
                assert_eq!(line, 2);
                assert_eq!(expected, 5);
                assert_eq!(found, 6);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_invalid_utf8_is_parse_error() {
        let mut data = format!("{}\n", HEADER).into_bytes();
        data.extend_from_slice(b"Acme - \xff\xfe,Vape,B1,5,Shelf\n");
        let err = InventoryLoader::new().load_bytes(&data).unwrap_err();
        assert!(matches!(err, AuditError::Parse(ParseError::Csv { .. })));
    }
}
