//! 基于 chromiumoxide 的会话实现
//!
//! 所有页面操作都通过注入 JS 完成，定位表里的三种策略在页面内解析。

use async_trait::async_trait;
use chromiumoxide::Page;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use crate::error::BrowserError;
use crate::infrastructure::js_executor::JsExecutor;
use crate::infrastructure::session::Session;
use crate::models::{Locator, Strategy};

const TEXT_OF: &str = "(el.innerText || el.textContent || '').trim()";

/// 单个元素的 JS 表达式，找不到时为 null
fn locate_expr(locator: &Locator) -> Result<String, BrowserError> {
    let selector = serde_json::to_string(&locator.selector)?;
    Ok(match locator.strategy {
        Strategy::Css => format!("document.querySelector({})", selector),
        Strategy::Id => format!("document.getElementById({})", selector),
        Strategy::Xpath => format!(
            "document.evaluate({}, document, null, XPathResult.FIRST_ORDERED_NODE_TYPE, null).singleNodeValue",
            selector
        ),
    })
}

/// 所有匹配元素的 JS 数组表达式
fn locate_all_expr(locator: &Locator) -> Result<String, BrowserError> {
    let selector = serde_json::to_string(&locator.selector)?;
    Ok(match locator.strategy {
        Strategy::Css => format!("Array.from(document.querySelectorAll({}))", selector),
        Strategy::Id => format!("[document.getElementById({})].filter(Boolean)", selector),
        Strategy::Xpath => format!(
            r#"(() => {{
                const snap = document.evaluate({}, document, null, XPathResult.ORDERED_NODE_SNAPSHOT_TYPE, null);
                const out = [];
                for (let i = 0; i < snap.snapshotLength; i++) out.push(snap.snapshotItem(i));
                return out;
            }})()"#,
            selector
        ),
    })
}

#[derive(Debug, Deserialize)]
struct TextProbe {
    found: bool,
    text: String,
}

/// chromiumoxide 页面上的会话
pub struct CdpSession {
    executor: JsExecutor,
}

impl CdpSession {
    pub fn new(page: Page, poll_interval: Duration) -> Self {
        Self {
            executor: JsExecutor::new(page, poll_interval),
        }
    }

    /// 当前页面的 URL
    pub async fn current_url(&self) -> Result<Option<String>, BrowserError> {
        Ok(self.executor.page().url().await?)
    }

    fn not_found(locator: &Locator, wait: Duration) -> BrowserError {
        BrowserError::ElementNotFound {
            locator: locator.name.clone(),
            waited_ms: wait.as_millis(),
        }
    }

    /// 执行一次对单个元素的操作，脚本返回 false 表示元素已消失
    async fn act(&self, locator: &Locator, wait: Duration, body: &str) -> Result<(), BrowserError> {
        self.wait_for(locator, wait).await?;
        let script = format!(
            "(() => {{ const el = {}; if (!el) return false; {} return true; }})()",
            locate_expr(locator)?,
            body
        );
        if self.executor.eval_as::<bool>(script).await? {
            Ok(())
        } else {
            Err(Self::not_found(locator, wait))
        }
    }
}

#[async_trait]
impl Session for CdpSession {
    async fn wait_for(&self, locator: &Locator, wait: Duration) -> Result<(), BrowserError> {
        let probe = format!("!!({})", locate_expr(locator)?);
        if self.executor.poll_until(&probe, wait).await? {
            Ok(())
        } else {
            debug!("等待 {} 超时 ({:?})", locator.name, wait);
            Err(Self::not_found(locator, wait))
        }
    }

    async fn click(&self, locator: &Locator, wait: Duration) -> Result<(), BrowserError> {
        self.act(
            locator,
            wait,
            "el.scrollIntoView({ block: 'center' }); el.click();",
        )
        .await
    }

    async fn fill(&self, locator: &Locator, text: &str, wait: Duration) -> Result<(), BrowserError> {
        let body = format!(
            "el.focus(); el.value = ''; el.value = {}; \
             el.dispatchEvent(new Event('input', {{ bubbles: true }})); \
             el.dispatchEvent(new Event('change', {{ bubbles: true }}));",
            serde_json::to_string(text)?
        );
        self.act(locator, wait, &body).await
    }

    async fn read_text(&self, locator: &Locator, wait: Duration) -> Result<String, BrowserError> {
        self.wait_for(locator, wait).await?;
        let script = format!(
            "(() => {{ const el = {}; return el ? {{ found: true, text: {} }} : {{ found: false, text: '' }}; }})()",
            locate_expr(locator)?,
            TEXT_OF
        );
        let probe: TextProbe = self.executor.eval_as(script).await?;
        if probe.found {
            Ok(probe.text)
        } else {
            Err(Self::not_found(locator, wait))
        }
    }

    async fn texts(&self, locator: &Locator) -> Result<Vec<String>, BrowserError> {
        let script = format!("{}.map(el => {})", locate_all_expr(locator)?, TEXT_OF);
        self.executor.eval_as(script).await
    }

    async fn click_text(&self, locator: &Locator, text: &str) -> Result<(), BrowserError> {
        let script = format!(
            "(() => {{ const el = {}.find(el => {} === {}); if (!el) return false; el.click(); return true; }})()",
            locate_all_expr(locator)?,
            TEXT_OF,
            serde_json::to_string(text)?
        );
        if self.executor.eval_as::<bool>(script).await? {
            Ok(())
        } else {
            Err(BrowserError::NoMatchingText {
                locator: locator.name.clone(),
                text: text.to_string(),
            })
        }
    }

    async fn table_rows(&self, locator: &Locator) -> Result<Vec<Vec<String>>, BrowserError> {
        let script = format!(
            r#"(() => {{
                const body = {};
                if (!body) return [];
                return Array.from(body.querySelectorAll(':scope > tr, :scope > tbody > tr'))
                    .map(tr => Array.from(tr.querySelectorAll('td')).map(el => {}));
            }})()"#,
            locate_expr(locator)?,
            TEXT_OF
        );
        self.executor.eval_as(script).await
    }

    async fn goto(&self, url: &str) -> Result<(), BrowserError> {
        self.executor
            .page()
            .goto(url)
            .await
            .map_err(|e| BrowserError::NavigationFailed {
                url: url.to_string(),
                message: e.to_string(),
            })?;
        Ok(())
    }
}
