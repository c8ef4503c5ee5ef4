//! 分区采集服务 - 业务能力层
//!
//! 每个分区（拨付、调整、附件、澄清……）走同一套流程，差异全部在 [`SectionDef`] 里：
//!
//! 1. 打开分区菜单，找不到时写一条哨兵记录
//! 2. 打开详情链接（可选），找不到时写一条哨兵记录
//! 3. 读取汇总字段
//! 4. 等待行表格出现
//! 5. 逐页读取所有行，单元格不足的行跳过
//! 6. 立即写入输出文件
//!
//! 任何意外都在这里被转换成一条错误记录，不会向上抛出。

use std::time::Duration;
use tokio::time::sleep;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::error::BrowserError;
use crate::infrastructure::Session;
use crate::models::{CellFormat, Locator, RecordStatus, SectionDef, SectionRecord};
use crate::services::tabular_store::TabularStore;
use crate::utils::{normalize_date, strip_currency, truncate_text};
use crate::workflow::InstrumentCtx;

/// 写入状态列的错误信息最大长度
const MAX_ERROR_LEN: usize = 200;

/// 采集的中间结果
enum Harvest {
    Rows(Vec<SectionRecord>),
    Sentinel(RecordStatus),
}

/// 分区采集服务
pub struct SectionExtractor {
    def: SectionDef,
    element_wait: Duration,
    table_wait: Duration,
    settle_delay: Duration,
    currency_prefix: String,
}

impl SectionExtractor {
    pub fn new(def: SectionDef, config: &Config) -> Self {
        Self {
            def,
            element_wait: config.element_wait,
            table_wait: config.table_wait,
            settle_delay: config.settle_delay,
            currency_prefix: config.currency_prefix.clone(),
        }
    }

    pub fn name(&self) -> &str {
        &self.def.name
    }

    /// 采集一个编号在本分区的所有记录
    ///
    /// 前置条件：会话停在编号详情页。
    ///
    /// # 返回
    /// 采集到的行；哨兵或错误时返回那一条记录。返回的记录都已写入 `store`。
    pub async fn extract(
        &self,
        session: &dyn Session,
        ctx: &InstrumentCtx,
        store: &TabularStore,
    ) -> Vec<SectionRecord> {
        info!("{} 📂 采集分区 {}...", ctx, self.def.name);

        let records = match self.harvest(session, ctx).await {
            Ok(Harvest::Rows(rows)) => {
                info!("{} ✓ 分区 {} 采集到 {} 行", ctx, self.def.name, rows.len());
                rows
            }
            Ok(Harvest::Sentinel(status)) => {
                warn!("{} ⚠️ 分区 {}: {}", ctx, self.def.name, status);
                vec![self.sentinel(ctx, &status)]
            }
            Err(e) => {
                error!("{} ❌ 分区 {} 采集失败: {}", ctx, self.def.name, e);
                let status = RecordStatus::Error {
                    label: self.def.label.clone(),
                    message: truncate_text(&e.to_string(), MAX_ERROR_LEN),
                };
                vec![self.sentinel(ctx, &status)]
            }
        };

        ctx.persist(store, &records);
        records
    }

    async fn harvest(&self, session: &dyn Session, ctx: &InstrumentCtx) -> Result<Harvest, BrowserError> {
        let def = &self.def;

        if !self.open(session, &def.menu).await? {
            return Ok(Harvest::Sentinel(RecordStatus::MenuNotFound));
        }

        if let Some(trigger) = &def.detail_trigger {
            if !self.open(session, trigger).await? {
                return Ok(Harvest::Sentinel(RecordStatus::DetailNotFound));
            }
        }

        let mut aggregates = Vec::with_capacity(def.aggregates.len());
        for aggregate in &def.aggregates {
            let text = session.read_text(&aggregate.locator, self.element_wait).await?;
            aggregates.push((
                aggregate.field.clone(),
                strip_currency(&text, &self.currency_prefix),
            ));
        }

        session.wait_for(&def.rows, self.table_wait).await?;

        let pages = match &def.pagination {
            Some(pagination) => page_count(&session.texts(pagination).await?),
            None => 1,
        };

        let mut records = Vec::new();
        for page in 1..=pages {
            if page > 1 {
                info!("{} 处理第 {}/{} 页", ctx, page, pages);
                if let Some(pagination) = &def.pagination {
                    session.click_text(pagination, &page.to_string()).await?;
                }
                self.settle().await;
                session.wait_for(&def.rows, self.table_wait).await?;
            }

            for cells in session.table_rows(&def.rows).await? {
                if cells.len() < def.min_cells {
                    continue;
                }
                records.push(self.build_record(ctx, &aggregates, &cells));
            }
        }

        if records.is_empty() {
            return Ok(Harvest::Sentinel(RecordStatus::NoRows));
        }
        Ok(Harvest::Rows(records))
    }

    /// 点击会切换视图的元素；元素不存在返回 false，其他错误向上传递
    async fn open(&self, session: &dyn Session, locator: &Locator) -> Result<bool, BrowserError> {
        match session.click(locator, self.element_wait).await {
            Ok(()) => {
                self.settle().await;
                Ok(true)
            }
            Err(e) if e.is_not_found() => Ok(false),
            Err(e) => Err(e),
        }
    }

    fn build_record(
        &self,
        ctx: &InstrumentCtx,
        aggregates: &[(String, String)],
        cells: &[String],
    ) -> SectionRecord {
        let mut record = SectionRecord::new(&ctx.identifier, &self.def.name, &RecordStatus::Collected);
        for (field, value) in aggregates {
            record.set(field.clone(), value.clone());
        }
        for column in &self.def.columns {
            let raw = cells.get(column.cell).map(|c| c.trim()).unwrap_or_default();
            let value = match column.format {
                CellFormat::Text => raw.to_string(),
                CellFormat::Currency => strip_currency(raw, &self.currency_prefix),
                CellFormat::Date => normalize_date(raw),
            };
            record.set(column.field.clone(), value);
        }
        record.stamp(&ctx.metadata);
        record
    }

    fn sentinel(&self, ctx: &InstrumentCtx, status: &RecordStatus) -> SectionRecord {
        let mut record = SectionRecord::new(&ctx.identifier, &self.def.name, status);
        record.stamp(&ctx.metadata);
        record
    }

    async fn settle(&self) {
        if !self.settle_delay.is_zero() {
            sleep(self.settle_delay).await;
        }
    }
}

/// 分页控件中最大的页码，没有数字页码时视为单页
fn page_count(labels: &[String]) -> usize {
    labels
        .iter()
        .filter_map(|label| label.trim().parse::<usize>().ok())
        .filter(|n| *n > 0)
        .max()
        .unwrap_or(1)
}
