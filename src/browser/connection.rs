use chromiumoxide::{Browser, Page};
use futures::StreamExt;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use crate::error::BrowserError;

/// 连接到已打开的浏览器并获取页面
///
/// 浏览器需要以 `--remote-debugging-port=<port>` 启动并且已经登录门户。
/// 优先选择标题包含 `target_title` 的页面，其次是第一个已打开的页面，
/// 都没有时新建页面并打开 `target_url`。
pub async fn connect_to_browser_and_page(
    port: u16,
    target_url: Option<&str>,
    target_title: Option<&str>,
) -> Result<(Browser, Page), BrowserError> {
    let browser_url = format!("http://localhost:{}", port);
    info!("正在连接到浏览器: {}", browser_url);
    debug!("目标 URL: {:?}, 目标标题: {:?}", target_url, target_title);

    let (browser, mut handler) = Browser::connect(&browser_url).await.map_err(|source| {
        error!("连接浏览器失败，请确认浏览器已开启调试端口 {}", port);
        BrowserError::ConnectionFailed { port, source }
    })?;
    debug!("浏览器连接成功");

    // 在后台处理浏览器事件
    tokio::spawn(async move {
        while let Some(h) = handler.next().await {
            if h.is_err() {
                break;
            }
        }
    });

    // 添加短暂延迟以等待浏览器状态同步
    sleep(tokio::time::Duration::from_millis(300)).await;

    let pages = browser.pages().await?;
    debug!("获取到 {} 个页面", pages.len());

    if let Some(title) = target_title {
        debug!("正在查找标题包含 '{}' 的页面", title);
        for p in pages.iter() {
            if let Ok(Some(page_title)) = p.get_title().await {
                debug!("检查页面标题: {}", page_title);
                if page_title.contains(title) {
                    info!("✓ 找到目标页面: {}", page_title);
                    return Ok((browser, p.clone()));
                }
            }
        }
        warn!("未找到标题包含 '{}' 的页面", title);
    }

    if let Some(first) = pages.into_iter().next() {
        info!("✓ 使用已打开的页面");
        return Ok((browser, first));
    }

    let page = browser.new_page("about:blank").await?;
    if let Some(url) = target_url {
        page.goto(url)
            .await
            .map_err(|e| BrowserError::NavigationFailed {
                url: url.to_string(),
                message: e.to_string(),
            })?;
        info!("已导航到: {}", url);
    }

    Ok((browser, page))
}
