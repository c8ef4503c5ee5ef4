//! 内存中的假门户，按定位表中的符号名响应会话操作

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use instrument_harvest::{BrowserError, InputRow, Locator, Session};

pub const PREDICTED: &str = "R$ 1.000,00";
pub const DISBURSED: &str = "R$ 400,00";
pub const REMAINING: &str = "R$ 600,00";

/// 一行 10 个单元格的拨付记录
pub fn row(order: &str, value: &str, date: &str) -> Vec<String> {
    let mut cells = vec![String::new(); 10];
    cells[3] = order.to_string();
    cells[6] = format!("R$ {}", value);
    cells[8] = "Paga".to_string();
    cells[9] = date.to_string();
    cells
}

/// 单元格不足的行
pub fn short_row() -> Vec<String> {
    vec!["x".to_string(); 5]
}

pub fn input(line: usize, id: &str) -> InputRow {
    InputRow::new(
        line,
        id,
        vec![
            ("Técnico".to_string(), format!("tecnico-{}", id)),
            ("e-mail do Técnico".to_string(), format!("{}@portal.test", id)),
        ],
    )
}

#[derive(Debug, Clone)]
pub struct FakeSection {
    pub menu: bool,
    pub detail: bool,
    pub table: bool,
    pub aggregates: HashMap<String, String>,
    pub pages: Vec<Vec<Vec<String>>>,
}

impl FakeSection {
    /// 拨付分区，汇总字段使用固定金额
    pub fn disbursements(pages: Vec<Vec<Vec<String>>>) -> Self {
        let aggregates = [
            ("disbursements.predicted", PREDICTED),
            ("disbursements.disbursed", DISBURSED),
            ("disbursements.remaining", REMAINING),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
        Self {
            menu: true,
            detail: true,
            table: true,
            aggregates,
            pages,
        }
    }

    pub fn plain(pages: Vec<Vec<Vec<String>>>) -> Self {
        Self {
            menu: true,
            detail: true,
            table: true,
            aggregates: HashMap::new(),
            pages,
        }
    }

    pub fn without_menu(mut self) -> Self {
        self.menu = false;
        self
    }

    pub fn without_detail(mut self) -> Self {
        self.detail = false;
        self
    }

    pub fn without_table(mut self) -> Self {
        self.table = false;
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct FakeInstrument {
    pub sections: HashMap<String, FakeSection>,
}

impl FakeInstrument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn section(mut self, name: &str, section: FakeSection) -> Self {
        self.sections.insert(name.to_string(), section);
        self
    }
}

#[derive(Debug, Default)]
struct State {
    instruments: HashMap<String, FakeInstrument>,
    nav_failures: HashMap<String, usize>,
    fail_goto_after: Option<usize>,

    menu_expanded: bool,
    module_open: bool,
    typed: Option<String>,
    searched: Option<String>,
    open: Option<String>,
    active_section: Option<String>,
    detail_open: bool,
    page: usize,

    searches: HashMap<String, usize>,
    gotos: usize,
}

impl State {
    fn reset(&mut self) {
        self.menu_expanded = false;
        self.module_open = false;
        self.typed = None;
        self.searched = None;
        self.open = None;
        self.active_section = None;
        self.detail_open = false;
        self.page = 0;
    }

    fn open_section(&self, name: &str) -> Option<&FakeSection> {
        let id = self.open.as_ref()?;
        self.instruments.get(id)?.sections.get(name)
    }

    fn active(&self) -> Option<&FakeSection> {
        let name = self.active_section.as_ref()?;
        self.open_section(name)
    }

    fn present(&self, name: &str) -> bool {
        match name {
            "menu_toggle" => true,
            "module_link" => self.menu_expanded,
            "search_field" | "search_submit" => self.module_open,
            "first_result" => self
                .searched
                .as_ref()
                .map(|id| self.instruments.contains_key(id))
                .unwrap_or(false),
            _ => {
                let Some((section, part)) = name.split_once('.') else {
                    return false;
                };
                let Some(sec) = self.open_section(section) else {
                    return false;
                };
                let active = self.active_section.as_deref() == Some(section);
                match part {
                    "menu" => sec.menu,
                    "detail" => active && sec.detail,
                    "rows" => active && sec.table,
                    "pagination" => active,
                    other => active && sec.aggregates.contains_key(&format!("{}.{}", section, other)),
                }
            }
        }
    }
}

/// 假门户
#[derive(Default)]
pub struct FakePortal {
    state: Mutex<State>,
}

impl FakePortal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_instrument(self, id: &str, instrument: FakeInstrument) -> Self {
        self.state
            .lock()
            .unwrap()
            .instruments
            .insert(id.to_string(), instrument);
        self
    }

    /// 打开搜索结果时失败 `times` 次
    pub fn failing_navigation(self, id: &str, times: usize) -> Self {
        self.state
            .lock()
            .unwrap()
            .nav_failures
            .insert(id.to_string(), times);
        self
    }

    /// 第 `n` 次之后的 goto 全部失败
    pub fn failing_goto_after(self, n: usize) -> Self {
        self.state.lock().unwrap().fail_goto_after = Some(n);
        self
    }

    /// 某编号被搜索的次数
    pub fn searches(&self, id: &str) -> usize {
        self.state
            .lock()
            .unwrap()
            .searches
            .get(id)
            .copied()
            .unwrap_or(0)
    }

    pub fn total_searches(&self) -> usize {
        self.state.lock().unwrap().searches.values().sum()
    }

    pub fn gotos(&self) -> usize {
        self.state.lock().unwrap().gotos
    }

    fn not_found(locator: &Locator, wait: Duration) -> BrowserError {
        BrowserError::ElementNotFound {
            locator: locator.name.clone(),
            waited_ms: wait.as_millis(),
        }
    }
}

#[async_trait]
impl Session for FakePortal {
    async fn wait_for(&self, locator: &Locator, wait: Duration) -> Result<(), BrowserError> {
        if self.state.lock().unwrap().present(&locator.name) {
            Ok(())
        } else {
            Err(Self::not_found(locator, wait))
        }
    }

    async fn click(&self, locator: &Locator, wait: Duration) -> Result<(), BrowserError> {
        let mut state = self.state.lock().unwrap();
        if !state.present(&locator.name) {
            return Err(Self::not_found(locator, wait));
        }
        match locator.name.as_str() {
            "menu_toggle" => state.menu_expanded = true,
            "module_link" => state.module_open = true,
            "search_submit" => {
                let typed = state.typed.clone();
                if let Some(id) = &typed {
                    *state.searches.entry(id.clone()).or_default() += 1;
                }
                state.searched = typed;
            }
            "first_result" => {
                let id = state.searched.clone().unwrap_or_default();
                if let Some(remaining) = state.nav_failures.get_mut(&id) {
                    if *remaining > 0 {
                        *remaining -= 1;
                        return Err(Self::not_found(locator, wait));
                    }
                }
                state.open = Some(id);
            }
            name => {
                if let Some((section, part)) = name.split_once('.') {
                    match part {
                        "menu" => {
                            state.active_section = Some(section.to_string());
                            state.detail_open = false;
                            state.page = 0;
                        }
                        "detail" => state.detail_open = true,
                        _ => {}
                    }
                }
            }
        }
        Ok(())
    }

    async fn fill(&self, locator: &Locator, text: &str, wait: Duration) -> Result<(), BrowserError> {
        let mut state = self.state.lock().unwrap();
        if !state.present(&locator.name) {
            return Err(Self::not_found(locator, wait));
        }
        state.typed = Some(text.to_string());
        Ok(())
    }

    async fn read_text(&self, locator: &Locator, wait: Duration) -> Result<String, BrowserError> {
        let state = self.state.lock().unwrap();
        state
            .active()
            .and_then(|sec| sec.aggregates.get(&locator.name).cloned())
            .ok_or_else(|| Self::not_found(locator, wait))
    }

    async fn texts(&self, _locator: &Locator) -> Result<Vec<String>, BrowserError> {
        let state = self.state.lock().unwrap();
        let pages = state.active().map(|sec| sec.pages.len()).unwrap_or(0);
        Ok((1..=pages).map(|p| p.to_string()).collect())
    }

    async fn click_text(&self, locator: &Locator, text: &str) -> Result<(), BrowserError> {
        let mut state = self.state.lock().unwrap();
        let pages = state.active().map(|sec| sec.pages.len()).unwrap_or(0);
        match text.parse::<usize>() {
            Ok(n) if n >= 1 && n <= pages => {
                state.page = n - 1;
                Ok(())
            }
            _ => Err(BrowserError::NoMatchingText {
                locator: locator.name.clone(),
                text: text.to_string(),
            }),
        }
    }

    async fn table_rows(&self, _locator: &Locator) -> Result<Vec<Vec<String>>, BrowserError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .active()
            .and_then(|sec| sec.pages.get(state.page).cloned())
            .unwrap_or_default())
    }

    async fn goto(&self, url: &str) -> Result<(), BrowserError> {
        let mut state = self.state.lock().unwrap();
        state.gotos += 1;
        if let Some(limit) = state.fail_goto_after {
            if state.gotos > limit {
                return Err(BrowserError::NavigationFailed {
                    url: url.to_string(),
                    message: "connection reset".to_string(),
                });
            }
        }
        state.reset();
        Ok(())
    }
}
