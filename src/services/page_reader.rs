//! 页面读取 - 业务能力层
//!
//! 打开练习页，把题目数量调整为配置值，等待题目表格渲染后读取隐藏字段

use std::time::Duration;

use anyhow::{bail, Context, Result};
use serde_json::Value as JsonValue;
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::config::Config;
use crate::infrastructure::PageRenderer;
use crate::models::RawField;

/// 题目数量下拉框
const OPERATION_COUNT_SELECTOR: &str = r#"select[name="define"]"#;
/// 题目表格的行
const EXERCISE_ROW_SELECTOR: &str = "tr";

/// 页面读取器
#[derive(Debug, Clone)]
pub struct PageReader {
    operations_per_page: u32,
    settle_delay: Duration,
    element_timeout: Duration,
}

impl PageReader {
    pub fn new(config: &Config) -> Self {
        Self {
            operations_per_page: config.operations_per_page,
            settle_delay: config.settle_delay(),
            element_timeout: config.element_timeout(),
        }
    }

    /// 读取页面上的隐藏字段
    pub async fn read<R: PageRenderer>(&self, renderer: &R, url: &str) -> Result<Vec<RawField>> {
        renderer
            .open(url)
            .await
            .with_context(|| format!("打开页面失败: {}", url))?;
        sleep(self.settle_delay).await;

        // 下拉框不存在时沿用页面默认的题目数量
        if let Err(e) = self.set_operation_count(renderer).await {
            warn!("⚠️ 设置题目数量失败，使用页面默认值: {}", e);
        } else {
            sleep(self.settle_delay).await;
        }

        renderer
            .wait_for(EXERCISE_ROW_SELECTOR, self.element_timeout)
            .await
            .context("题目表格未出现")?;

        let fields = renderer.hidden_fields().await.context("读取隐藏字段失败")?;
        debug!("读取到 {} 个隐藏字段", fields.len());
        Ok(fields)
    }

    async fn set_operation_count<R: PageRenderer>(&self, renderer: &R) -> Result<()> {
        renderer
            .wait_for(OPERATION_COUNT_SELECTOR, self.element_timeout)
            .await?;
        let applied = renderer
            .run_script(&operation_count_script(self.operations_per_page))
            .await?;
        match applied {
            JsonValue::Bool(true) => {
                debug!("题目数量已设置为 {}", self.operations_per_page);
                Ok(())
            }
            other => bail!("题目数量下拉框不可用 (脚本返回 {})", other),
        }
    }
}

/// 修改下拉框的值并触发 change 事件，让页面重新生成题目
fn operation_count_script(count: u32) -> String {
    format!(
        r#"
(() => {{
    const select = document.querySelector('select[name="define"]');
    if (!select) return false;
    select.value = '{}';
    select.dispatchEvent(new Event('change', {{ bubbles: true }}));
    return true;
}})()
"#,
        count
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// 脚本返回值可配置的假渲染器
    struct ScriptedRenderer {
        script_result: JsonValue,
        scripts_run: Mutex<usize>,
    }

    impl ScriptedRenderer {
        fn returning(script_result: JsonValue) -> Self {
            Self {
                script_result,
                scripts_run: Mutex::new(0),
            }
        }
    }

    impl PageRenderer for ScriptedRenderer {
        async fn open(&self, _url: &str) -> Result<()> {
            Ok(())
        }

        async fn wait_for(&self, _selector: &str, _timeout: Duration) -> Result<()> {
            Ok(())
        }

        async fn run_script(&self, _code: &str) -> Result<JsonValue> {
            *self.scripts_run.lock().unwrap() += 1;
            Ok(self.script_result.clone())
        }

        async fn hidden_fields(&self) -> Result<Vec<RawField>> {
            Ok(vec![
                RawField::new("sumando11", "3"),
                RawField::new("sumando12", "4"),
            ])
        }
    }

    fn fast_reader() -> PageReader {
        PageReader::new(&Config {
            settle_delay_ms: 0,
            element_timeout_secs: 1,
            ..Config::default()
        })
    }

    #[test]
    fn test_operation_count_script_sets_value() {
        let script = operation_count_script(25);
        assert!(script.contains("select.value = '25'"));
        assert!(script.contains(r#"select[name="define"]"#));
        assert!(script.contains("new Event('change'"));
    }

    #[test]
    fn test_reader_takes_durations_from_config() {
        let config = Config {
            settle_delay_ms: 0,
            element_timeout_secs: 3,
            operations_per_page: 12,
            ..Config::default()
        };
        let reader = PageReader::new(&config);
        assert_eq!(reader.settle_delay, Duration::ZERO);
        assert_eq!(reader.element_timeout, Duration::from_secs(3));
        assert_eq!(reader.operations_per_page, 12);
    }

    #[tokio::test]
    async fn test_missing_select_still_reads_fields() {
        let renderer = ScriptedRenderer::returning(JsonValue::Bool(false));
        let reader = fast_reader();

        let err = reader.set_operation_count(&renderer).await.unwrap_err();
        assert!(err.to_string().contains("false"), "{}", err);

        let fields = reader.read(&renderer, "https://x/sumas.php").await.unwrap();
        assert_eq!(fields.len(), 2);
        assert_eq!(*renderer.scripts_run.lock().unwrap(), 2);
    }

    #[tokio::test]
    async fn test_only_true_counts_as_applied() {
        let reader = fast_reader();
        assert!(reader
            .set_operation_count(&ScriptedRenderer::returning(JsonValue::Bool(true)))
            .await
            .is_ok());
        assert!(reader
            .set_operation_count(&ScriptedRenderer::returning(JsonValue::Null))
            .await
            .is_err());
    }
}
