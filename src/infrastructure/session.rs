//! 会话接口
//!
//! 流程层和能力层只通过这个接口操作页面，不直接接触 chromiumoxide。

use async_trait::async_trait;
use std::time::Duration;

use crate::error::BrowserError;
use crate::models::Locator;

/// 一个已登录的浏览器会话能做的事
///
/// 所有等待都有上限；超时返回 [`BrowserError::ElementNotFound`]。
#[async_trait]
pub trait Session: Send + Sync {
    /// 等待元素出现
    async fn wait_for(&self, locator: &Locator, wait: Duration) -> Result<(), BrowserError>;

    /// 等待元素出现后点击
    async fn click(&self, locator: &Locator, wait: Duration) -> Result<(), BrowserError>;

    /// 清空输入框并填入文本
    async fn fill(&self, locator: &Locator, text: &str, wait: Duration) -> Result<(), BrowserError>;

    /// 读取元素的可见文本
    async fn read_text(&self, locator: &Locator, wait: Duration) -> Result<String, BrowserError>;

    /// 所有匹配元素的可见文本，不等待
    async fn texts(&self, locator: &Locator) -> Result<Vec<String>, BrowserError>;

    /// 在所有匹配元素中点击可见文本等于 `text` 的那个
    async fn click_text(&self, locator: &Locator, text: &str) -> Result<(), BrowserError>;

    /// 行容器下每个 tr 的单元格文本
    async fn table_rows(&self, locator: &Locator) -> Result<Vec<Vec<String>>, BrowserError>;

    /// 打开指定 URL
    async fn goto(&self, url: &str) -> Result<(), BrowserError>;
}
