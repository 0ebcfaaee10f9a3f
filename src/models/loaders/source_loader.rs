use crate::error::ConfigError;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;
use tokio::fs;

/// 待抓取 URL 列表文件的结构
///
/// ```toml
/// urls = [
///     "https://matesdeprimaria.es/divisiones.php?hacer-division&g=G30&n=1",
/// ]
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct SourceList {
    #[serde(default)]
    pub urls: Vec<String>,
}

/// 从 TOML 文件加载待抓取的 URL 列表
///
/// 去掉首尾空白并丢弃空字符串，重复的 URL 原样保留
pub async fn load_source_urls(path: impl AsRef<Path>) -> Result<Vec<String>> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(ConfigError::SourcesFileNotFound {
            path: path.display().to_string(),
        }
        .into());
    }

    let content = fs::read_to_string(path)
        .await
        .with_context(|| format!("无法读取URL列表文件: {}", path.display()))?;

    let list: SourceList = toml::from_str(&content).map_err(|e| ConfigError::SourcesFileInvalid {
        path: path.display().to_string(),
        source: Box::new(e),
    })?;

    let urls: Vec<String> = list
        .urls
        .into_iter()
        .map(|url| url.trim().to_string())
        .filter(|url| !url.is_empty())
        .collect();

    tracing::info!("从 {} 加载了 {} 个URL", path.display(), urls.len());

    Ok(urls)
}
