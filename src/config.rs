use std::path::Path;

use serde::Deserialize;

use crate::error::ConfigError;

/// 默认压缩阈值：30 MiB
pub const DEFAULT_COMPRESSION_THRESHOLD: u64 = 30 * 1024 * 1024;

/// 程序配置
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    /// 后端服务地址
    pub backend_url: String,
    /// 后端 API Key（通过 X-API-Key 头转发）
    pub api_key: String,
    /// 批次总大小超过该值时压缩 PDF
    pub compression_threshold_bytes: u64,
    /// 临时目录前缀
    pub temp_dir_prefix: String,
    /// 是否显示详细日志
    pub verbose_logging: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend_url: "http://localhost:8000".to_string(),
            api_key: "YOUR_API_KEY".to_string(),
            compression_threshold_bytes: DEFAULT_COMPRESSION_THRESHOLD,
            temp_dir_prefix: "pwin-".to_string(),
            verbose_logging: false,
        }
    }
}

/// 配置文件中的可选字段，缺省的保持原值
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    backend_url: Option<String>,
    api_key: Option<String>,
    compression_threshold_bytes: Option<u64>,
    temp_dir_prefix: Option<String>,
    verbose_logging: Option<bool>,
}

impl Config {
    /// 默认值叠加环境变量
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::default().with_env()
    }

    /// 加载配置：默认值 < TOML 文件 < 环境变量
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match path {
            Some(path) => Self::default().with_file(path)?,
            None => Self::default(),
        };
        config.with_env()
    }

    /// 从 TOML 文件叠加配置
    pub fn with_file(self, path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadFailed {
            path: path.display().to_string(),
            source,
        })?;
        self.with_toml_str(&content, &path.display().to_string())
    }

    fn with_toml_str(self, content: &str, origin: &str) -> Result<Self, ConfigError> {
        let file: ConfigFile = toml::from_str(content).map_err(|source| ConfigError::ParseFailed {
            path: origin.to_string(),
            source,
        })?;
        Ok(Self {
            backend_url: file.backend_url.unwrap_or(self.backend_url),
            api_key: file.api_key.unwrap_or(self.api_key),
            compression_threshold_bytes: file
                .compression_threshold_bytes
                .unwrap_or(self.compression_threshold_bytes),
            temp_dir_prefix: file.temp_dir_prefix.unwrap_or(self.temp_dir_prefix),
            verbose_logging: file.verbose_logging.unwrap_or(self.verbose_logging),
        })
    }

    /// 用环境变量覆盖
    pub fn with_env(self) -> Result<Self, ConfigError> {
        self.with_vars(|name| std::env::var(name).ok())
    }

    fn with_vars(self, var: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        Ok(Self {
            backend_url: var("BACKEND_URL").unwrap_or(self.backend_url),
            api_key: var("API_KEY").unwrap_or(self.api_key),
            compression_threshold_bytes: parse_var(
                &var,
                "COMPRESSION_THRESHOLD_BYTES",
                "u64",
                self.compression_threshold_bytes,
            )?,
            temp_dir_prefix: var("TEMP_DIR_PREFIX").unwrap_or(self.temp_dir_prefix),
            verbose_logging: parse_var(&var, "VERBOSE_LOGGING", "bool", self.verbose_logging)?,
        })
    }
}

fn parse_var<T: std::str::FromStr>(
    var: &impl Fn(&str) -> Option<String>,
    var_name: &str,
    expected_type: &str,
    default: T,
) -> Result<T, ConfigError> {
    match var(var_name) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::EnvVarParseFailed {
                var_name: var_name.to_string(),
                value,
                expected_type: expected_type.to_string(),
            }),
        None => Ok(default),
    }
}
