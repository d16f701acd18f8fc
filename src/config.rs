//! Client configuration module / 客户端配置模块
//!
//! Loaded from a JSON file; every field has a default, missing file means
//! all defaults / 从JSON文件加载，文件不存在时使用默认配置

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Client configuration / 客户端配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// RPC endpoint host / RPC接口地址
    #[serde(default = "default_api_host")]
    pub api_host: String,
    /// Content (upload/download) endpoint host / 内容接口地址
    #[serde(default = "default_content_host")]
    pub content_host: String,
    /// Upload stream chunk size (bytes) / 流式上传分片大小
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
    /// Transport timeout (seconds), none by default / 传输超时
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

fn default_api_host() -> String {
    "https://api.dropboxapi.com".to_string()
}

fn default_content_host() -> String {
    "https://content.dropboxapi.com".to_string()
}

fn default_chunk_size() -> usize {
    1000 * 1024
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_host: default_api_host(),
            content_host: default_content_host(),
            chunk_size: default_chunk_size(),
            timeout_secs: None,
        }
    }
}

impl ClientConfig {
    /// Transport timeout / 传输超时
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    /// Load configuration from file, or defaults if not exists / 加载配置文件，不存在则使用默认配置
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            tracing::info!("No configuration at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {:?}", path))?;
        let config: ClientConfig = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file {:?}", path))?;

        if config.chunk_size == 0 {
            anyhow::bail!("chunk_size must be greater than zero");
        }

        tracing::info!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    /// Save configuration to file / 保存配置到文件
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file {:?}", path))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.api_host, "https://api.dropboxapi.com");
        assert_eq!(config.content_host, "https://content.dropboxapi.com");
        assert_eq!(config.chunk_size, 1_024_000);
        assert!(config.timeout().is_none());
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let dir = tempdir().unwrap();
        let config = ClientConfig::load(dir.path().join("config.json")).unwrap();
        assert_eq!(config, ClientConfig::default());
    }

    #[test]
    fn test_load_partial_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"chunk_size": 4096, "timeout_secs": 30}"#).unwrap();

        let config = ClientConfig::load(&path).unwrap();
        assert_eq!(config.chunk_size, 4096);
        assert_eq!(config.timeout(), Some(Duration::from_secs(30)));
        assert_eq!(config.api_host, "https://api.dropboxapi.com");
    }

    #[test]
    fn test_load_rejects_zero_chunk() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"chunk_size": 0}"#).unwrap();

        assert!(ClientConfig::load(&path).is_err());
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        let config = ClientConfig {
            api_host: "http://127.0.0.1:8080".to_string(),
            ..ClientConfig::default()
        };

        config.save(&path).unwrap();
        assert_eq!(ClientConfig::load(&path).unwrap(), config);
    }
}
