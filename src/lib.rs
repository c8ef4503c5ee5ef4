//! # Instrument Harvest
//!
//! 从门户网站逐个采集编号（instrument）的财务拨付等分区数据，写入 CSV，支持断点续跑。
//!
//! ## 架构设计
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 持有稀缺资源（Page），只暴露能力
//! - `Session` - 上层看到的会话接口
//! - `CdpSession` - 基于 chromiumoxide 的实现
//!
//! ### ② 业务能力层（Services）
//! - `Navigator` - 从首页导航到编号详情
//! - `SectionExtractor` - 采集一个分区（含分页）
//! - `TabularStore` - 读输入、写输出（整行去重）
//! - `Checkpoint` - 断点
//! - `output_validator` - 输出校验
//!
//! ### ③ 流程层（Workflow）
//! - `InstrumentCtx` - 上下文封装（编号 + 序号 + 附加列）
//! - `InstrumentFlow` - 流程编排（导航 → 分区采集 → 写入）
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/batch_processor` - 批量处理、断点、重试、校验

pub mod browser;
pub mod config;
pub mod error;
pub mod infrastructure;
pub mod logger;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use browser::connect_to_browser_and_page;
pub use config::Config;
pub use error::{AppError, BrowserError, ConfigError, StoreError};
pub use infrastructure::{CdpSession, Session};
pub use models::{InputRow, Locator, LocatorTable, SectionRecord};
pub use orchestrator::{App, BatchProcessor, RunSummary};
pub use workflow::{FlowOutcome, InstrumentCtx, InstrumentFlow};
