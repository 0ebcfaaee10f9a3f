use std::time::Duration;

/// 程序配置
#[derive(Clone, Debug)]
pub struct Config {
    /// 浏览器调试端口；未设置时启动无头浏览器
    pub browser_debug_port: Option<u16>,
    /// 启动浏览器时是否使用无头模式
    pub headless: bool,
    /// 浏览器可执行文件路径（可选）
    pub chrome_executable: Option<String>,
    /// 每页题目数量（页面上的 `define` 下拉框）
    pub operations_per_page: u32,
    /// 等待页面元素的超时时间（秒）
    pub element_timeout_secs: u64,
    /// 页面加载或刷新后的等待时间（毫秒）
    pub settle_delay_ms: u64,
    /// 两个 URL 之间的间隔（毫秒）
    pub request_delay_ms: u64,
    /// SQLite 文档库路径
    pub db_path: String,
    /// URL 列表文件
    pub sources_file: String,
    /// 报告 JSON 输出文件
    pub report_file: String,
    /// 是否显示详细日志
    pub verbose_logging: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            browser_debug_port: None,
            headless: true,
            chrome_executable: None,
            operations_per_page: 10,
            element_timeout_secs: 10,
            settle_delay_ms: 2000,
            request_delay_ms: 1000,
            db_path: "data/matematicas_primaria.sqlite".to_string(),
            sources_file: "sources.toml".to_string(),
            report_file: "reporte_metricas.json".to_string(),
            verbose_logging: false,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// 从任意键值来源构建配置，解析失败的字段回退到默认值
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let default = Self::default();
        Self {
            browser_debug_port: lookup("BROWSER_DEBUG_PORT")
                .and_then(|v| v.parse().ok())
                .or(default.browser_debug_port),
            headless: lookup("HEADLESS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.headless),
            chrome_executable: lookup("CHROME_EXECUTABLE")
                .filter(|v| !v.is_empty())
                .or(default.chrome_executable),
            operations_per_page: lookup("OPERATIONS_PER_PAGE")
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.operations_per_page),
            element_timeout_secs: lookup("ELEMENT_TIMEOUT_SECS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.element_timeout_secs),
            settle_delay_ms: lookup("SETTLE_DELAY_MS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.settle_delay_ms),
            request_delay_ms: lookup("REQUEST_DELAY_MS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.request_delay_ms),
            db_path: lookup("DB_PATH").unwrap_or(default.db_path),
            sources_file: lookup("SOURCES_FILE").unwrap_or(default.sources_file),
            report_file: lookup("REPORT_FILE").unwrap_or(default.report_file),
            verbose_logging: lookup("VERBOSE_LOGGING")
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.verbose_logging),
        }
    }

    pub fn element_timeout(&self) -> Duration {
        Duration::from_secs(self.element_timeout_secs)
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }
}
