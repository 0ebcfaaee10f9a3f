//! 浏览器会话的建立
//!
//! 配置了调试端口时连接已有浏览器，否则启动一个本地浏览器

mod connection;
mod headless;

pub use connection::connect_to_browser;
pub use headless::launch_headless_browser;

use anyhow::Result;
use chromiumoxide::{Browser, Page};
use tokio::task::JoinHandle;

use crate::config::Config;

/// 浏览器会话
pub struct BrowserSession {
    pub browser: Browser,
    pub page: Page,
    pub handler: JoinHandle<()>,
    /// 是否由本程序启动（退出时需要关闭）
    pub launched: bool,
}

/// 按配置建立浏览器会话
pub async fn open_session(config: &Config) -> Result<BrowserSession> {
    let (browser, page, handler, launched) = match config.browser_debug_port {
        Some(port) => {
            let (browser, page, handler) = connect_to_browser(port).await?;
            (browser, page, handler, false)
        }
        None => {
            let (browser, page, handler) = launch_headless_browser(config).await?;
            (browser, page, handler, true)
        }
    };

    Ok(BrowserSession {
        browser,
        page,
        handler,
        launched,
    })
}
