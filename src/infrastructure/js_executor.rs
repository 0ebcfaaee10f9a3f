//! JS 执行器 - 基础设施层
//!
//! 持有唯一的 page 资源，对外只暴露"渲染页面"的能力：
//! 打开 URL、等待元素、执行脚本、读取隐藏字段

use std::time::Duration;

use anyhow::Result;
use chromiumoxide::Page;
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;
use tokio::time::{sleep, timeout};
use tracing::debug;

use crate::error::{BrowserError, BrowserResult};
use crate::models::RawField;

/// 收集页面上所有 `input[type="hidden"]` 的脚本
const HIDDEN_FIELDS_JS: &str = r#"
(() => Array.from(document.querySelectorAll('input[type="hidden"]')).map(input => ({
    name: input.getAttribute('name') || '',
    value: input.getAttribute('value') || ''
})))()
"#;

/// 轮询元素是否出现的间隔
const ELEMENT_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// 渲染能力
///
/// 编排层只通过这个 trait 使用浏览器，测试中可以替换为假实现
#[allow(async_fn_in_trait)]
pub trait PageRenderer {
    /// 打开 URL 并等待页面加载
    async fn open(&self, url: &str) -> Result<()>;

    /// 等待选择器对应的元素出现，超时返回错误
    async fn wait_for(&self, selector: &str, timeout: Duration) -> Result<()>;

    /// 在页面中执行脚本
    async fn run_script(&self, code: &str) -> Result<JsonValue>;

    /// 读取页面上所有非空的隐藏字段
    async fn hidden_fields(&self) -> Result<Vec<RawField>>;
}

/// JS 执行器
///
/// 职责：
/// - 持有唯一的 Page 资源
/// - 暴露 eval() 能力
/// - 不认识题目 / 解析器
/// - 不处理业务流程
pub struct JsExecutor {
    page: Page,
}

impl JsExecutor {
    /// 创建新的 JS 执行器
    pub fn new(page: Page) -> Self {
        Self { page }
    }

    /// 获取 page 的引用
    pub fn page(&self) -> &Page {
        &self.page
    }

    /// 执行 JS 代码并返回 JSON 结果
    pub async fn eval(&self, js_code: impl Into<String>) -> BrowserResult<JsonValue> {
        let result = self
            .page
            .evaluate(js_code.into())
            .await
            .map_err(BrowserError::script)?;
        let json_value = result.into_value().map_err(BrowserError::script)?;
        Ok(json_value)
    }

    /// 执行 JS 代码并反序列化为指定类型
    pub async fn eval_as<T: DeserializeOwned>(
        &self,
        js_code: impl Into<String>,
    ) -> BrowserResult<T> {
        let json_value = self.eval(js_code).await?;
        let typed_value = serde_json::from_value(json_value).map_err(BrowserError::script)?;
        Ok(typed_value)
    }
}

impl PageRenderer for JsExecutor {
    async fn open(&self, url: &str) -> Result<()> {
        debug!("导航到: {}", url);
        self.page
            .goto(url)
            .await
            .map_err(|e| BrowserError::navigation(url, e))?;
        Ok(())
    }

    async fn wait_for(&self, selector: &str, wait: Duration) -> Result<()> {
        let poll = async {
            loop {
                if self.page.find_element(selector).await.is_ok() {
                    return;
                }
                sleep(ELEMENT_POLL_INTERVAL).await;
            }
        };

        timeout(wait, poll)
            .await
            .map_err(|_| BrowserError::ElementTimeout {
                selector: selector.to_string(),
                timeout_secs: wait.as_secs(),
            })?;
        Ok(())
    }

    async fn run_script(&self, code: &str) -> Result<JsonValue> {
        Ok(self.eval(code).await?)
    }

    async fn hidden_fields(&self) -> Result<Vec<RawField>> {
        let fields: Vec<RawField> = self.eval_as(HIDDEN_FIELDS_JS).await?;
        Ok(fields
            .into_iter()
            .filter(|f| !f.name.is_empty() && !f.value.is_empty())
            .collect())
    }
}
