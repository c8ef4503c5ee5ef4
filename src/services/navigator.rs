//! 导航服务 - 业务能力层
//!
//! 从门户首页走到某个编号的详情页：
//!
//! ```text
//! AtLandingMenu → MenuExpanded → SearchFormOpen → SearchSubmitted → InstrumentContextOpen
//!        └──────────────── 任一步失败 ────────────────→ NavigationFailed
//! ```

use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::BrowserError;
use crate::infrastructure::Session;
use crate::models::NavigationLocators;

/// 导航状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavState {
    AtLandingMenu,
    MenuExpanded,
    SearchFormOpen,
    SearchSubmitted,
    InstrumentContextOpen,
    NavigationFailed,
}

impl NavState {
    pub fn is_terminal(self) -> bool {
        matches!(self, NavState::InstrumentContextOpen | NavState::NavigationFailed)
    }
}

/// 导航服务
///
/// 内部不做任何重试，重试策略由编排层决定。
pub struct Navigator {
    locators: NavigationLocators,
    landing_url: String,
    element_wait: Duration,
    settle_delay: Duration,
}

impl Navigator {
    pub fn new(locators: NavigationLocators, landing_url: impl Into<String>, config: &Config) -> Self {
        Self {
            locators,
            landing_url: landing_url.into(),
            element_wait: config.element_wait,
            settle_delay: config.settle_delay,
        }
    }

    /// 打开编号详情
    ///
    /// # 返回
    /// 成功时会话停在编号详情页；失败时会话状态不确定，调用方需要先回到首页
    pub async fn open_instrument(&self, session: &dyn Session, identifier: &str) -> bool {
        self.run(session, identifier).await == NavState::InstrumentContextOpen
    }

    /// 从首页开始推进状态机，直到终止状态
    pub async fn run(&self, session: &dyn Session, identifier: &str) -> NavState {
        let mut state = NavState::AtLandingMenu;
        while !state.is_terminal() {
            state = match self.advance(session, state, identifier).await {
                Ok(next) => {
                    debug!("[编号 {}] 导航 {:?} → {:?}", identifier, state, next);
                    next
                }
                Err(e) => {
                    warn!("[编号 {}] ❌ 导航在 {:?} 失败: {}", identifier, state, e);
                    NavState::NavigationFailed
                }
            };
        }
        state
    }

    async fn advance(
        &self,
        session: &dyn Session,
        state: NavState,
        identifier: &str,
    ) -> Result<NavState, BrowserError> {
        let wait = self.element_wait;
        let l = &self.locators;
        match state {
            NavState::AtLandingMenu => {
                session.click(&l.menu_toggle, wait).await?;
                Ok(NavState::MenuExpanded)
            }
            NavState::MenuExpanded => {
                session.click(&l.module_link, wait).await?;
                Ok(NavState::SearchFormOpen)
            }
            NavState::SearchFormOpen => {
                session.fill(&l.search_field, identifier, wait).await?;
                session.click(&l.search_submit, wait).await?;
                self.settle().await;
                Ok(NavState::SearchSubmitted)
            }
            NavState::SearchSubmitted => {
                session.click(&l.first_result, wait).await?;
                self.settle().await;
                Ok(NavState::InstrumentContextOpen)
            }
            terminal => Ok(terminal),
        }
    }

    /// 回到首页，并确认主菜单可用
    pub async fn reset_to_landing(&self, session: &dyn Session) -> Result<(), BrowserError> {
        info!("↩️ 返回首页: {}", self.landing_url);
        session.goto(&self.landing_url).await?;
        session.wait_for(&self.locators.menu_toggle, self.element_wait).await
    }

    async fn settle(&self) {
        if !self.settle_delay.is_zero() {
            sleep(self.settle_delay).await;
        }
    }
}
