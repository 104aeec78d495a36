use thiserror::Error;

/// 输入不是合法的 CSV 表格 (致命, 不产生部分结果)
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("CSV has no header row")]
    MissingHeader,

    #[error("CSV parse error{}: {message}", line_suffix(.line))]
    Csv { line: Option<u64>, message: String },

    #[error("CSV parse error at line {line}: expected {expected} fields, saw {found}")]
    FieldCount {
        line: u64,
        expected: usize,
        found: usize,
    },
}

fn line_suffix(line: &Option<u64>) -> String {
    line.map(|l| format!(" at line {}", l)).unwrap_or_default()
}

impl From<csv::Error> for ParseError {
    fn from(error: csv::Error) -> Self {
        let line = error.position().map(|p| p.line());
        Self::Csv {
            line,
            message: error.to_string(),
        }
    }
}

/// 表格格式正确但内容不可用
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Dataset is empty")]
    EmptyDataset,

    #[error("Missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),
}

/// 文档生成失败; 已聚合的数据不受影响, 可直接重试
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    #[error("Report has {lines} lines, exceeding the limit of {limit}")]
    TooManyLines { lines: usize, limit: usize },

    #[error("PDF encoding failed: {0}")]
    Encode(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuditError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Render(#[from] RenderError),
}

impl AuditError {
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Parse(_) => "PARSE_ERROR",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Render(_) => "RENDER_ERROR",
        }
    }

    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::Parse(_) => 400,
            Self::Validation(_) => 422,
            Self::Render(RenderError::TooManyLines { .. }) => 413,
            Self::Render(_) => 500,
        }
    }
}

pub type AuditResult<T> = Result<T, AuditError>;
