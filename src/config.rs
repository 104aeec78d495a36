use crate::models::PageSize;
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

/// 应用配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub report: ReportConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// 上传 CSV 的大小上限 (字节)
    pub max_upload_bytes: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    pub title: String,
    /// 商品名超过此长度时截断
    pub product_max_chars: usize,
    /// 单份报表最多行数, 超出直接失败
    pub max_lines: usize,
    pub default_page_size: PageSize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            title: "HAVEN DISTRIBUTION INVENTORY AUDIT WORKSHEET".to_string(),
            product_max_chars: 60,
            max_lines: 20_000,
            default_page_size: PageSize::Letter,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
                max_upload_bytes: 16 * 1024 * 1024, // 16MB
            },
            report: ReportConfig::default(),
            logging: LoggingConfig {
                level: "info".to_string(),
            },
        }
    }
}

impl AppConfig {
    /// 加载配置: 默认值 → config/default → config/local → 环境变量
    ///
    /// 环境变量以 `AUDIT_` 开头, 层级用 `__` 分隔, 如 `AUDIT_SERVER__PORT=9000`。
    pub fn load() -> Result<Self, ConfigError> {
        Self::builder()?
            .add_source(Environment::with_prefix("AUDIT").prefix_separator("_").separator("__"))
            .build()?
            .try_deserialize()
    }

    fn builder() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        Ok(Config::builder()
            .add_source(Config::try_from(&Self::default())?)
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false)))
    }
}
