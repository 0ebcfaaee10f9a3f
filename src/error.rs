use thiserror::Error;

/// 浏览器相关错误
#[derive(Debug, Error)]
pub enum BrowserError {
    /// 启动浏览器失败
    #[error("启动无头浏览器失败: {source}")]
    LaunchFailed {
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 连接浏览器失败
    #[error("无法连接到浏览器 (端口: {port}): {source}")]
    ConnectionFailed {
        port: u16,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 导航失败
    #[error("导航到 {url} 失败: {source}")]
    NavigationFailed {
        url: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 等待元素超时
    #[error("等待元素 '{selector}' 超时 ({timeout_secs}秒)")]
    ElementTimeout { selector: String, timeout_secs: u64 },
    /// 执行脚本失败
    #[error("执行脚本失败: {source}")]
    ScriptFailed {
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// 文档存储错误
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("SQLite 操作失败: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("文档序列化失败: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("文件系统错误: {0}")]
    Io(#[from] std::io::Error),
    /// 已存储的文档无法解析
    #[error("文档 {key} 无法解析: {source}")]
    Deserialize {
        key: String,
        source: serde_json::Error,
    },
}

/// 页面字段解析错误
///
/// 字段值格式错误会中止当前解析器调用，由单个 URL 的边界捕获
#[derive(Debug, Error)]
pub enum ParseError {
    /// 字段值不是整数
    #[error("字段 {field} 的值 '{value}' 不是整数")]
    MalformedValue { field: String, value: String },
    /// 计算结果溢出
    #[error("题目 {index} 计算溢出 ({kind})")]
    Overflow { kind: String, index: u64 },
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// URL 列表文件不存在
    #[error("URL列表文件不存在: {path}")]
    SourcesFileNotFound { path: String },
    /// URL 列表文件格式错误
    #[error("URL列表文件格式错误 ({path}): {source}")]
    SourcesFileInvalid {
        path: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

// ========== 便捷构造函数 ==========

impl BrowserError {
    pub fn navigation(
        url: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        BrowserError::NavigationFailed {
            url: url.into(),
            source: Box::new(source),
        }
    }

    pub fn script(source: impl std::error::Error + Send + Sync + 'static) -> Self {
        BrowserError::ScriptFailed {
            source: Box::new(source),
        }
    }
}

impl ParseError {
    pub fn malformed(field: impl Into<String>, value: impl Into<String>) -> Self {
        ParseError::MalformedValue {
            field: field.into(),
            value: value.into(),
        }
    }
}

// ========== Result 类型别名 ==========

/// 浏览器操作结果类型
pub type BrowserResult<T> = Result<T, BrowserError>;

/// 存储层结果类型
pub type StoreResult<T> = Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_script_error_keeps_source_message() {
        let source = serde_json::from_str::<u32>("x").unwrap_err();
        let err = BrowserError::script(source);
        assert!(matches!(err, BrowserError::ScriptFailed { .. }));
        assert!(err.to_string().starts_with("执行脚本失败: "));
    }

    #[test]
    fn test_io_error_converts_into_store_error() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: StoreError = io.into();
        assert!(matches!(err, StoreError::Io(_)));
        assert_eq!(err.to_string(), "文件系统错误: denied");
    }
}
