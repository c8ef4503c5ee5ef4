//! 定位表
//!
//! 门户页面不归我们所有，页面结构一变，选择器就会失效。
//! 所有选择器集中在这张带版本号的表里，通过 TOML 注入，改版时只需改一处。

use serde::{Deserialize, Serialize};
use std::fmt;

/// 定位策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    Css,
    Xpath,
    Id,
}

/// 一个元素的定位方式：符号名 + 策略 + 选择器
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Locator {
    pub name: String,
    pub strategy: Strategy,
    pub selector: String,
}

impl Locator {
    pub fn new(name: impl Into<String>, strategy: Strategy, selector: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            strategy,
            selector: selector.into(),
        }
    }

    pub fn css(name: impl Into<String>, selector: impl Into<String>) -> Self {
        Self::new(name, Strategy::Css, selector)
    }

    pub fn xpath(name: impl Into<String>, selector: impl Into<String>) -> Self {
        Self::new(name, Strategy::Xpath, selector)
    }

    pub fn id(name: impl Into<String>, selector: impl Into<String>) -> Self {
        Self::new(name, Strategy::Id, selector)
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// 从首页到编号详情的导航元素
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigationLocators {
    /// 主菜单展开按钮
    pub menu_toggle: Locator,
    /// 模块导航入口
    pub module_link: Locator,
    /// 搜索输入框
    pub search_field: Locator,
    /// 搜索提交按钮
    pub search_submit: Locator,
    /// 搜索结果第一行的详情链接
    pub first_result: Locator,
}

/// 单元格取值格式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CellFormat {
    #[default]
    Text,
    /// 去掉金额前缀
    Currency,
    /// 日/月/年
    Date,
}

/// 表格列到输出字段的映射
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDef {
    pub field: String,
    pub cell: usize,
    #[serde(default)]
    pub format: CellFormat,
}

/// 汇总字段（每一行都会重复写入）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregateDef {
    pub field: String,
    pub locator: Locator,
}

/// 一个数据分区（标签页）的完整定义
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionDef {
    /// 写入 Section 字段的名字
    pub name: String,
    /// 错误状态中使用的名字，例如 "disbursement"
    pub label: String,
    pub menu: Locator,
    #[serde(default)]
    pub detail_trigger: Option<Locator>,
    #[serde(default)]
    pub aggregates: Vec<AggregateDef>,
    /// 行容器（tbody），其下的每个 tr 是一行
    pub rows: Locator,
    #[serde(default)]
    pub pagination: Option<Locator>,
    pub min_cells: usize,
    pub columns: Vec<ColumnDef>,
}

/// 带版本号的定位表
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocatorTable {
    pub version: u32,
    pub navigation: NavigationLocators,
    #[serde(default, rename = "section")]
    pub sections: Vec<SectionDef>,
}

impl LocatorTable {
    pub fn section(&self, name: &str) -> Option<&SectionDef> {
        self.sections.iter().find(|s| s.name == name)
    }
}

impl Default for LocatorTable {
    fn default() -> Self {
        Self {
            version: 1,
            navigation: NavigationLocators {
                menu_toggle: Locator::xpath(
                    "menu_toggle",
                    "/html/body/div[1]/div[3]/div[1]/div[1]/div[1]/div[4]",
                ),
                module_link: Locator::xpath(
                    "module_link",
                    "/html[1]/body[1]/div[1]/div[3]/div[2]/div[1]/div[1]/ul[1]/li[6]/a[1]",
                ),
                search_field: Locator::xpath(
                    "search_field",
                    "/html[1]/body[1]/div[3]/div[15]/div[3]/div[1]/div[1]/form[1]/table[1]/tbody[1]/tr[2]/td[2]/input[1]",
                ),
                search_submit: Locator::xpath(
                    "search_submit",
                    "/html[1]/body[1]/div[3]/div[15]/div[3]/div[1]/div[1]/form[1]/table[1]/tbody[1]/tr[2]/td[2]/span[1]/input[1]",
                ),
                first_result: Locator::xpath(
                    "first_result",
                    "/html[1]/body[1]/div[3]/div[15]/div[3]/div[3]/table[1]/tbody[1]/tr[1]/td[1]/div[1]/a[1]",
                ),
            },
            sections: vec![disbursements()],
        }
    }
}

/// 财务拨付分区
fn disbursements() -> SectionDef {
    SectionDef {
        name: "disbursements".to_string(),
        label: "disbursement".to_string(),
        menu: Locator::xpath(
            "disbursements.menu",
            "/html/body/div[3]/div[15]/div[1]/div/div[2]/a[14]/div/span/span",
        ),
        detail_trigger: Some(Locator::css(
            "disbursements.detail",
            "#tbodyrow > tr > td:nth-child(6) > nobr > a",
        )),
        aggregates: vec![
            AggregateDef {
                field: "Predicted Amount".to_string(),
                locator: Locator::id("disbursements.predicted", "tr-inserirOBConfluxoValorPrevisto"),
            },
            AggregateDef {
                field: "Disbursed Amount".to_string(),
                locator: Locator::id("disbursements.disbursed", "tr-inserirOBConfluxoValorDesembolsado"),
            },
            AggregateDef {
                field: "Remaining Amount".to_string(),
                locator: Locator::id("disbursements.remaining", "tr-inserirOBConfluxoValorADesembolsar"),
            },
        ],
        rows: Locator::xpath("disbursements.rows", "//*[@id=\"tbodyrow\"]"),
        pagination: Some(Locator::css("disbursements.pagination", ".pagination a")),
        min_cells: 10,
        columns: vec![
            ColumnDef {
                field: "Order Number".to_string(),
                cell: 3,
                format: CellFormat::Text,
            },
            ColumnDef {
                field: "Disbursed Value".to_string(),
                cell: 6,
                format: CellFormat::Currency,
            },
            ColumnDef {
                field: "Situation".to_string(),
                cell: 8,
                format: CellFormat::Text,
            },
            ColumnDef {
                field: "Issue Date".to_string(),
                cell: 9,
                format: CellFormat::Date,
            },
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_table_has_disbursements() {
        let table = LocatorTable::default();
        let section = table.section("disbursements").unwrap();
        assert_eq!(section.min_cells, 10);
        assert_eq!(section.aggregates.len(), 3);
        assert!(section.columns.iter().all(|c| c.cell < section.min_cells));
    }

    #[test]
    fn test_table_survives_toml() {
        let table = LocatorTable::default();
        let text = toml::to_string(&table).unwrap();
        let parsed: LocatorTable = toml::from_str(&text).unwrap();
        assert_eq!(parsed, table);
    }

    #[test]
    fn test_parse_minimal_section() {
        let text = r##"
            version = 7

            [navigation]
            menu_toggle = { name = "menu_toggle", strategy = "css", selector = "#menu" }
            module_link = { name = "module_link", strategy = "css", selector = "#module" }
            search_field = { name = "search_field", strategy = "id", selector = "q" }
            search_submit = { name = "search_submit", strategy = "css", selector = "#go" }
            first_result = { name = "first_result", strategy = "xpath", selector = "//tr[1]//a" }

            [[section]]
            name = "attachments"
            label = "attachment"
            menu = { name = "attachments.menu", strategy = "css", selector = "#tab-anexos" }
            rows = { name = "attachments.rows", strategy = "css", selector = "#anexos tbody" }
            min_cells = 3
            columns = [
                { field = "File", cell = 0 },
                { field = "Uploaded", cell = 2, format = "date" },
            ]
        "##;
        let table: LocatorTable = toml::from_str(text).unwrap();
        assert_eq!(table.version, 7);
        let section = table.section("attachments").unwrap();
        assert!(section.detail_trigger.is_none());
        assert!(section.pagination.is_none());
        assert_eq!(section.columns[0].format, CellFormat::Text);
        assert_eq!(section.columns[1].format, CellFormat::Date);
        assert_eq!(table.navigation.search_field.strategy, Strategy::Id);
    }
}
