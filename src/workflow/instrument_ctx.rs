//! 编号处理上下文
//!
//! 封装"我正在处理哪个编号，第几个，第几次尝试"这一信息

use std::fmt::Display;
use tracing::{debug, error};

use crate::error::StoreError;
use crate::models::{SectionRecord, WorkItem};
use crate::services::TabularStore;

/// 编号处理上下文
#[derive(Debug, Clone)]
pub struct InstrumentCtx {
    /// 规范化后的编号
    pub identifier: String,

    /// 在本次运行中的序号（从1开始，仅用于日志显示）
    pub position: usize,

    /// 本次运行的编号总数
    pub total: usize,

    /// 第几次尝试（主循环为 1，重试为 2）
    pub attempt: usize,

    /// 输入行的附加列，写入每一条输出记录
    pub metadata: Vec<(String, String)>,
}

impl InstrumentCtx {
    pub fn new(item: &WorkItem, position: usize, total: usize, attempt: usize) -> Self {
        Self {
            identifier: item.identifier.clone(),
            position,
            total,
            attempt,
            metadata: item.row.metadata.clone(),
        }
    }

    /// 写入输出文件；失败只记录日志，这批记录会丢失
    pub fn persist(&self, store: &TabularStore, records: &[SectionRecord]) -> bool {
        if records.is_empty() {
            return true;
        }
        match store.append(records) {
            Ok(stats) => {
                debug!("{} 写入 {} 行 (新增 {})", self, records.len(), stats.added);
                true
            }
            Err(StoreError::PermissionDenied { path }) => {
                error!(
                    "{} ❌ 无法写入 {}：文件被占用，请先关闭；{} 行记录未保存",
                    self,
                    path.display(),
                    records.len()
                );
                false
            }
            Err(e) => {
                error!("{} ❌ 写入输出失败: {}；{} 行记录未保存", self, e, records.len());
                false
            }
        }
    }
}

impl Display for InstrumentCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.attempt > 1 {
            write!(
                f,
                "[编号 {} #{}/{} 重试]",
                self.identifier, self.position, self.total
            )
        } else {
            write!(f, "[编号 {} #{}/{}]", self.identifier, self.position, self.total)
        }
    }
}
