//! URL 分发 - 业务能力层
//!
//! 根据 URL 中的标记选择解析器（按注册顺序，先匹配先得），
//! 并从查询串中提取层级 (`n` / `nivel`) 和分组 (`g` / `grupo`)

use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::SourceContext;
use crate::services::parsers::{
    AdditionParser, DivisionParser, ExerciseParser, MultiplicationParser, SubtractionParser,
};

/// URL 中没有层级参数时的默认层级
pub const DEFAULT_LEVEL_TIER: u32 = 1;
/// URL 中没有分组参数时的默认分组
pub const DEFAULT_GROUP_ID: &str = "G1";

static LEVEL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[?&]n(?:ivel)?=(\d+)").expect("valid level regex"));
static GROUP_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[?&]g(?:rupo)?=([^&]+)").expect("valid group regex"));

/// URL 标记到解析器的映射
struct Route {
    marker: &'static str,
    parser: Box<dyn ExerciseParser>,
}

/// URL 分发器
pub struct UrlDispatcher {
    routes: Vec<Route>,
}

impl UrlDispatcher {
    /// 注册四种运算的解析器
    pub fn new() -> Self {
        Self::empty()
            .register("sumas.php", AdditionParser)
            .register("restas.php", SubtractionParser)
            .register("multiplicar", MultiplicationParser)
            .register("divisiones.php", DivisionParser)
    }

    /// 不含任何路由的分发器
    pub fn empty() -> Self {
        Self { routes: Vec::new() }
    }

    /// 追加一条路由，排在已有路由之后
    pub fn register(
        mut self,
        marker: &'static str,
        parser: impl ExerciseParser + 'static,
    ) -> Self {
        self.routes.push(Route {
            marker,
            parser: Box::new(parser),
        });
        self
    }

    /// 选择解析器；没有任何标记匹配时返回 None
    pub fn dispatch(&self, url: &str) -> Option<&dyn ExerciseParser> {
        self.routes
            .iter()
            .find(|route| url.contains(route.marker))
            .map(|route| route.parser.as_ref())
    }

    /// 构建解析所需的来源上下文
    pub fn source_context(&self, url: &str) -> SourceContext {
        SourceContext {
            url: url.to_string(),
            level_tier: extract_level_tier(url),
            group_id: extract_group_id(url),
        }
    }
}

impl Default for UrlDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

/// 从 URL 提取层级，缺失或无法解析时为 1
pub fn extract_level_tier(url: &str) -> u32 {
    LEVEL_RE
        .captures(url)
        .and_then(|caps| caps[1].parse().ok())
        .unwrap_or(DEFAULT_LEVEL_TIER)
}

/// 从 URL 提取分组，缺失时为 "G1"
pub fn extract_group_id(url: &str) -> String {
    GROUP_RE
        .captures(url)
        .map(|caps| caps[1].to_string())
        .unwrap_or_else(|| DEFAULT_GROUP_ID.to_string())
}
