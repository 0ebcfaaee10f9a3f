//! URL 处理上下文
//!
//! 封装"我正在处理第几个 URL"这一信息

use std::fmt::Display;

/// URL 处理上下文
#[derive(Debug, Clone)]
pub struct UrlCtx {
    /// URL 序号（从1开始，仅用于日志显示）
    pub url_index: usize,

    /// URL 总数
    pub total: usize,

    /// 练习页地址
    pub url: String,
}

impl UrlCtx {
    pub fn new(url_index: usize, total: usize, url: impl Into<String>) -> Self {
        Self {
            url_index,
            total,
            url: url.into(),
        }
    }

    /// 是否为最后一个 URL
    pub fn is_last(&self) -> bool {
        self.url_index >= self.total
    }
}

impl Display for UrlCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[URL {}/{}]", self.url_index, self.total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_prefix() {
        let ctx = UrlCtx::new(2, 9, "https://x/sumas.php");
        assert_eq!(ctx.to_string(), "[URL 2/9]");
        assert!(!ctx.is_last());
        assert!(UrlCtx::new(9, 9, "https://x").is_last());
    }
}
