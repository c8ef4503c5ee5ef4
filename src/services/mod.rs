//! 业务能力层（Services）
//!
//! 描述"我能做什么"，每个服务只处理单个编号或单次读写，不关心批量流程。

pub mod checkpoint;
pub mod navigator;
pub mod output_validator;
pub mod section_extractor;
pub mod tabular_store;

pub use checkpoint::{Checkpoint, CheckpointDocument};
pub use navigator::{NavState, Navigator};
pub use output_validator::{validate, ValidationReport};
pub use section_extractor::SectionExtractor;
pub use tabular_store::{read_input, AppendStats, TabularStore};
