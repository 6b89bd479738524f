//! 配置文件加载

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)] // 配置文件没有 [terabox] 就用默认值
    pub terabox: TeraboxConfig,
    #[serde(default)] // 外部付费解析 API 代理模式（可选）
    pub api: ApiConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TeraboxConfig {
    /// 镜像域名列表，顺序即探测优先级
    #[serde(default = "default_mirrors")]
    pub mirrors: Vec<String>,
    #[serde(default = "default_http_timeout_secs")]
    pub http_timeout_secs: u64,
    /// 镜像响应中出现该标记即视为不可用（签名失效）
    #[serde(default = "default_error_marker")]
    pub error_marker: String,
}

impl Default for TeraboxConfig {
    fn default() -> Self {
        Self {
            mirrors: default_mirrors(),
            http_timeout_secs: default_http_timeout_secs(),
            error_marker: default_error_marker(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiConfig {
    /// 开启后跳过本地解析，整个请求转发给外部 API
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub endpoint: String,
    #[serde(default = "default_api_key")]
    pub api_key: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            endpoint: String::new(),
            api_key: default_api_key(),
        }
    }
}

fn default_mirrors() -> Vec<String> {
    [
        "data.terabox.com",
        "data.gibibox.com",
        "data.4funbox.com",
        "data.1024tera.com",
        "data.terabox.app",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_http_timeout_secs() -> u64 {
    30
}

fn default_error_marker() -> String {
    "sign error".to_string()
}

fn default_api_key() -> String {
    // 优先使用环境变量，没有就留空（镜像模式不需要）
    std::env::var("TERABOX_API_KEY").unwrap_or_default()
}

impl Config {
    /// 加载配置；文件不存在时回退到默认值（服务可零配置启动）
    pub fn load(path: &str) -> Result<Self> {
        if !Path::new(path).exists() {
            return Ok(Config::default());
        }
        let content = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn browser_ua() -> &'static str {
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let config = Config::load("does-not-exist.toml").unwrap();
        assert_eq!(config.terabox.mirrors.len(), 5);
        assert_eq!(config.terabox.mirrors[0], "data.terabox.com");
        assert_eq!(config.terabox.http_timeout_secs, 30);
        assert_eq!(config.terabox.error_marker, "sign error");
        assert!(!config.api.enabled);
    }

    #[test]
    fn test_parse_partial_toml() {
        let config: Config = toml::from_str(
            r#"
            [terabox]
            mirrors = ["data.example.com"]
            "#,
        )
        .unwrap();
        assert_eq!(config.terabox.mirrors, vec!["data.example.com"]);
        // 未写的字段取默认值
        assert_eq!(config.terabox.http_timeout_secs, 30);
        assert_eq!(config.terabox.error_marker, "sign error");
    }
}
