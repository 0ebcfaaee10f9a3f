use std::path::Path;

use anyhow::Result;
use chromiumoxide::{Browser, BrowserConfig, Page};
use futures::StreamExt;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{debug, error, info};

use crate::config::Config;
use crate::error::BrowserError;

/// 启动本地浏览器（默认无头模式）并创建空白页面
pub async fn launch_headless_browser(config: &Config) -> Result<(Browser, Page, JoinHandle<()>)> {
    info!("🚀 启动{}浏览器...", if config.headless { "无头" } else { "" });

    let mut builder = if config.headless {
        BrowserConfig::builder().new_headless_mode()
    } else {
        BrowserConfig::builder().with_head()
    };
    if let Some(executable) = &config.chrome_executable {
        debug!("浏览器路径: {}", executable);
        builder = builder.chrome_executable(Path::new(executable));
    }

    let browser_config = builder
        .window_size(1920, 1080)
        .args(vec![
            "--disable-gpu",           // 无头模式下禁用 GPU
            "--no-sandbox",            // 容器内没有沙盒权限
            "--disable-dev-shm-usage", // 防止共享内存不足
        ])
        .build()
        .map_err(|e| {
            error!("配置浏览器失败: {}", e);
            BrowserError::LaunchFailed { source: e.into() }
        })?;

    let (browser, mut handler) = Browser::launch(browser_config).await.map_err(|e| {
        error!("启动浏览器失败: {}", e);
        BrowserError::LaunchFailed {
            source: Box::new(e),
        }
    })?;
    debug!("浏览器启动成功");

    // 在后台处理浏览器事件
    let handler_task = tokio::spawn(async move {
        while let Some(h) = handler.next().await {
            if h.is_err() {
                break;
            }
        }
    });

    // 添加短暂延迟以等待浏览器状态同步
    sleep(tokio::time::Duration::from_millis(300)).await;

    let page = browser.new_page("about:blank").await.map_err(|e| {
        error!("创建页面失败: {}", e);
        BrowserError::LaunchFailed {
            source: Box::new(e),
        }
    })?;

    info!("✅ 浏览器已就绪");
    Ok((browser, page, handler_task))
}
