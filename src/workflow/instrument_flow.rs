//! 编号处理流程 - 流程层
//!
//! 核心职责：定义"一个编号"的完整处理流程
//!
//! 流程顺序：
//! 1. 从首页导航到编号详情
//! 2. 依次采集每个分区，没有任何记录的分区补一条占位记录
//! 3. 把本编号的全部记录写入输出文件

use tracing::{info, warn};

use crate::config::Config;
use crate::infrastructure::Session;
use crate::models::{LocatorTable, RecordStatus, SectionRecord};
use crate::services::{Navigator, SectionExtractor, TabularStore};
use crate::workflow::instrument_ctx::InstrumentCtx;

/// 编号处理结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowOutcome {
    /// 所有分区都已处理，附带写出的记录
    Completed(Vec<SectionRecord>),
    /// 没能打开编号详情
    NavigationFailed,
}

/// 编号处理流程
///
/// - 编排单个编号的导航和采集
/// - 不持有任何资源（page）
/// - 只依赖业务能力（services）
pub struct InstrumentFlow {
    navigator: Navigator,
    extractors: Vec<SectionExtractor>,
    store: TabularStore,
}

impl InstrumentFlow {
    pub fn new(table: &LocatorTable, landing_url: impl Into<String>, config: &Config) -> Self {
        Self {
            navigator: Navigator::new(table.navigation.clone(), landing_url, config),
            extractors: table
                .sections
                .iter()
                .cloned()
                .map(|def| SectionExtractor::new(def, config))
                .collect(),
            store: TabularStore::new(&config.output_path),
        }
    }

    pub fn navigator(&self) -> &Navigator {
        &self.navigator
    }

    pub fn store(&self) -> &TabularStore {
        &self.store
    }

    pub async fn run(&self, session: &dyn Session, ctx: &InstrumentCtx) -> FlowOutcome {
        // ========== 1. 导航 ==========
        info!("{} 🔍 搜索编号...", ctx);
        if !self.navigator.open_instrument(session, &ctx.identifier).await {
            warn!("{} ⚠️ 无法打开编号详情，加入重试列表", ctx);
            return FlowOutcome::NavigationFailed;
        }
        info!("{} ✓ 已打开编号详情", ctx);

        // ========== 2. 分区采集 ==========
        let mut records = Vec::new();
        for extractor in &self.extractors {
            let mut section = extractor.extract(session, ctx, &self.store).await;
            // 兜底：SectionExtractor 在哨兵和错误路径上也会返回那一条记录，正常情况下不会为空
            if section.is_empty() {
                let mut placeholder =
                    SectionRecord::new(&ctx.identifier, extractor.name(), &RecordStatus::NoData);
                placeholder.stamp(&ctx.metadata);
                section.push(placeholder);
            }
            records.append(&mut section);
        }

        // ========== 3. 写入 ==========
        // 分区已各自写过一次，这里相同的行会被去重
        ctx.persist(&self.store, &records);
        info!("{} ✅ 编号处理完成，共 {} 条记录", ctx, records.len());

        FlowOutcome::Completed(records)
    }
}
