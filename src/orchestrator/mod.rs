//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责批量处理和流程调度，是整个系统的"指挥中心"。
//!
//! ## 层次关系
//!
//! ```text
//! batch_processor (处理 Vec<InputRow>，断点、重试、校验)
//!     ↓
//! workflow::InstrumentFlow (处理单个编号)
//!     ↓
//! services (能力层：navigator / section_extractor / tabular_store / checkpoint)
//!     ↓
//! infrastructure (基础设施：Session / CdpSession)
//! ```
//!
//! ## 设计原则
//!
//! 1. **单一职责**：batch_processor 管批量，InstrumentFlow 管单个
//! 2. **资源隔离**：只有编排层持有 Browser
//! 3. **向下依赖**：编排层 → workflow → services → infrastructure
//! 4. **串行处理**：只有一个浏览器会话，同一时间只处理一个编号

pub mod batch_processor;

pub use batch_processor::{App, BatchProcessor, RunSummary};
