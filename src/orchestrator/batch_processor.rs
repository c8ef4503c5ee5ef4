//! 批量编号处理器 - 编排层
//!
//! ## 职责
//!
//! 本模块是整个应用的入口，负责批量编号的处理和资源管理。
//!
//! ## 核心功能
//!
//! 1. **应用初始化**：加载定位表、连接浏览器、确定首页 URL
//! 2. **断点续跑**：已完成的编号直接跳过，每个编号结束后立即保存断点
//! 3. **逐个处理**：同一时间只处理一个编号，不并发
//! 4. **回到首页**：每个编号结束后无论成败都回到首页，回不去则终止整批
//! 5. **失败重试**：主循环结束后，失败的编号再尝试一次
//! 6. **输出校验**：最后对比输入编号与输出文件
//!
//! ## 设计特点
//!
//! - **顶层编排**：不处理单个编号的细节
//! - **资源所有者**：唯一持有 Browser 的模块
//! - **向下委托**：委托 InstrumentFlow 处理单个编号

use chromiumoxide::Browser;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

use crate::browser;
use crate::config::Config;
use crate::error::{AppError, AppResult, ConfigError};
use crate::infrastructure::{CdpSession, Session};
use crate::models::{load_locator_table, InputRow, LocatorTable, WorkItem};
use crate::services::output_validator::{validate, ValidationReport};
use crate::services::{read_input, Checkpoint};
use crate::utils::logging::{
    estimate_remaining, log_input_loaded, log_instrument_start, log_startup,
    log_validation_report, print_final_stats,
};
use crate::workflow::{FlowOutcome, InstrumentCtx, InstrumentFlow};

/// 应用主结构
pub struct App {
    config: Config,
    table: LocatorTable,
    landing_url: String,
    _browser: Browser,
    session: CdpSession,
}

impl App {
    /// 初始化应用
    ///
    /// 连接浏览器失败时直接返回错误，不处理任何编号
    pub async fn initialize(config: Config) -> AppResult<Self> {
        let table = load_locator_table(&config.layout_path).await?;
        log_startup(config.browser_debug_port, table.version);

        let (browser, page) = browser::connect_to_browser_and_page(
            config.browser_debug_port,
            config.landing_url.as_deref(),
            config.target_title.as_deref(),
        )
        .await
        .inspect_err(|e| error!("❌ 无法连接到浏览器，终止运行: {}", e))?;

        let session = CdpSession::new(page, config.poll_interval);

        let landing_url = match &config.landing_url {
            Some(url) => url.clone(),
            None => match session.current_url().await? {
                Some(url) if url != "about:blank" => url,
                _ => {
                    return Err(ConfigError::Invalid {
                        field: "LANDING_URL".to_string(),
                        reason: "无法从当前页面确定门户首页，请手动设置".to_string(),
                    }
                    .into())
                }
            },
        };
        info!("🏠 门户首页: {}", landing_url);

        Ok(Self {
            config,
            table,
            landing_url,
            _browser: browser,
            session,
        })
    }

    /// 运行应用主逻辑
    pub async fn run(&self) -> AppResult<RunSummary> {
        let rows = read_input(&self.config.input_path, &self.config.id_column)
            .inspect_err(|e| error!("❌ 无法读取输入文件: {}", e))?;

        if rows.is_empty() {
            warn!("⚠️ 输入文件为空，程序结束");
            return Ok(RunSummary::default());
        }

        let processor = BatchProcessor::new(&self.config, &self.table, self.landing_url.clone());
        processor.run(&self.session, rows).await
    }
}

/// 一次运行的统计
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// 输入文件的数据行数
    pub input_rows: usize,
    /// 编号有效的行数
    pub valid_rows: usize,
    /// 断点中已完成而跳过的数量
    pub skipped: usize,
    /// 本次运行完成的数量（含重试成功）
    pub completed: usize,
    /// 主循环中失败的编号
    pub failed_first_pass: Vec<String>,
    /// 重试后仍然失败的编号
    pub failed_after_retry: Vec<String>,
    /// 输出校验结果
    pub validation: Option<ValidationReport>,
}

/// 批量处理器
///
/// 与具体的浏览器实现无关，只依赖 [`Session`]
pub struct BatchProcessor {
    config: Config,
    flow: InstrumentFlow,
}

impl BatchProcessor {
    pub fn new(config: &Config, table: &LocatorTable, landing_url: impl Into<String>) -> Self {
        Self {
            config: config.clone(),
            flow: InstrumentFlow::new(table, landing_url, config),
        }
    }

    /// 处理所有输入行
    ///
    /// 只有"回不到首页"会返回错误，其余失败都记录在统计里
    pub async fn run(&self, session: &dyn Session, rows: Vec<InputRow>) -> AppResult<RunSummary> {
        let input_rows = rows.len();
        let items = WorkItem::from_rows(rows);
        let mut checkpoint = Checkpoint::load(&self.config.checkpoint_path).await;

        let already_done = items
            .iter()
            .filter(|item| checkpoint.is_processed(&item.identifier))
            .count();
        log_input_loaded(input_rows, items.len(), already_done);

        let mut summary = RunSummary {
            input_rows,
            valid_rows: items.len(),
            ..Default::default()
        };

        if items.is_empty() {
            warn!("⚠️ 没有有效的编号，程序结束");
            return Ok(summary);
        }

        let started = Instant::now();
        self.flow
            .navigator()
            .reset_to_landing(session)
            .await
            .map_err(|source| AppError::LandingUnreachable {
                context: "批处理开始前".to_string(),
                source,
            })?;

        // ========== 主循环 ==========
        let total = items.len();
        let mut attempted = 0;
        let mut failed: Vec<&WorkItem> = Vec::new();

        for (index, item) in items.iter().enumerate() {
            if checkpoint.is_processed(&item.identifier) {
                debug!("编号 {} 已处理过，跳过", item.identifier);
                summary.skipped += 1;
                continue;
            }

            let eta = estimate_remaining(started.elapsed(), attempted, total - index);
            log_instrument_start(&item.identifier, index + 1, total, eta);
            attempted += 1;

            let ctx = InstrumentCtx::new(item, index + 1, total, 1);
            if self.process(session, &mut checkpoint, &ctx).await? {
                summary.completed += 1;
            } else {
                failed.push(item);
            }
        }

        summary.failed_first_pass = failed.iter().map(|item| item.identifier.clone()).collect();
        info!("\n主循环完成: 成功 {}, 失败 {}", summary.completed, failed.len());

        // ========== 重试 ==========
        if !failed.is_empty() {
            info!("\n🔁 重新处理 {} 个失败的编号...", failed.len());
            let retry_total = failed.len();
            for (index, item) in failed.into_iter().enumerate() {
                // 重复出现的编号可能已在主循环后面成功
                if checkpoint.is_processed(&item.identifier) {
                    continue;
                }
                log_instrument_start(&item.identifier, index + 1, retry_total, None);
                let ctx = InstrumentCtx::new(item, index + 1, retry_total, 2);
                if self.process(session, &mut checkpoint, &ctx).await? {
                    summary.completed += 1;
                } else {
                    error!("{} ❌ 重试仍然失败，不再重试", ctx);
                    if !summary.failed_after_retry.contains(&item.identifier) {
                        summary.failed_after_retry.push(item.identifier.clone());
                    }
                }
            }
        }

        // ========== 校验 ==========
        summary.validation = self.validate_output(&items);

        print_final_stats(
            summary.completed,
            summary.skipped,
            &summary.failed_after_retry,
            started.elapsed(),
        );
        Ok(summary)
    }

    /// 处理单个编号，无论成败都会保存断点并回到首页
    ///
    /// # 返回
    /// 编号是否完成；回不到首页时返回错误
    async fn process(
        &self,
        session: &dyn Session,
        checkpoint: &mut Checkpoint,
        ctx: &InstrumentCtx,
    ) -> AppResult<bool> {
        let completed = match self.flow.run(session, ctx).await {
            FlowOutcome::Completed(_) => {
                checkpoint.mark_processed(&ctx.identifier);
                true
            }
            FlowOutcome::NavigationFailed => {
                checkpoint.mark_failed(&ctx.identifier);
                false
            }
        };

        if let Err(e) = checkpoint.save().await {
            error!("{} ❌ 保存断点失败: {}", ctx, e);
        }

        self.flow
            .navigator()
            .reset_to_landing(session)
            .await
            .map_err(|source| AppError::LandingUnreachable {
                context: ctx.to_string(),
                source,
            })?;

        Ok(completed)
    }

    /// 对比输入编号与输出文件
    pub fn validate_output(&self, items: &[WorkItem]) -> Option<ValidationReport> {
        match self.flow.store().read_records() {
            Ok(records) => {
                let report = validate(items.iter().map(|i| i.identifier.as_str()), &records);
                log_validation_report(&report);
                Some(report)
            }
            Err(e) => {
                error!("❌ 读取输出文件失败，无法校验: {}", e);
                None
            }
        }
    }
}
