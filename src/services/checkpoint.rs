//! 断点服务 - 业务能力层
//!
//! 记录哪些编号已经处理完成、哪些还在等待重试

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{info, warn};

use crate::error::StoreError;
use crate::services::tabular_store::tmp_path;

/// 断点文件内容
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckpointDocument {
    /// 已完成的编号，运行中只增不减
    #[serde(default)]
    pub processed_instruments: BTreeSet<String>,
    /// 失败待重试的编号
    #[serde(default)]
    pub pending_retry: BTreeSet<String>,
}

/// 断点文件
pub struct Checkpoint {
    path: PathBuf,
    doc: CheckpointDocument,
}

impl Checkpoint {
    /// 加载断点，文件不存在或损坏时从空断点开始
    pub async fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let doc = match fs::read_to_string(&path).await {
            Ok(content) => match serde_json::from_str::<CheckpointDocument>(&content) {
                Ok(doc) => {
                    info!(
                        "已加载断点: {} 个已完成, {} 个待重试",
                        doc.processed_instruments.len(),
                        doc.pending_retry.len()
                    );
                    doc
                }
                Err(e) => {
                    warn!("⚠️ 断点文件 {} 解析失败: {}，从头开始", path.display(), e);
                    CheckpointDocument::default()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => CheckpointDocument::default(),
            Err(e) => {
                warn!("⚠️ 断点文件 {} 读取失败: {}，从头开始", path.display(), e);
                CheckpointDocument::default()
            }
        };
        Self { path, doc }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn document(&self) -> &CheckpointDocument {
        &self.doc
    }

    pub fn is_processed(&self, identifier: &str) -> bool {
        self.doc.processed_instruments.contains(identifier)
    }

    pub fn processed_count(&self) -> usize {
        self.doc.processed_instruments.len()
    }

    /// 标记完成，并从待重试中移除
    pub fn mark_processed(&mut self, identifier: &str) {
        self.doc.processed_instruments.insert(identifier.to_string());
        self.doc.pending_retry.remove(identifier);
    }

    /// 标记失败，已完成的编号不会回退
    pub fn mark_failed(&mut self, identifier: &str) {
        if !self.is_processed(identifier) {
            self.doc.pending_retry.insert(identifier.to_string());
        }
    }

    /// 写入磁盘（临时文件 + 改名）
    pub async fn save(&self) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(&self.doc).map_err(|source| StoreError::Json {
            path: self.path.clone(),
            source,
        })?;
        let tmp = tmp_path(&self.path);
        fs::write(&tmp, json)
            .await
            .map_err(|e| StoreError::io(&tmp, e))?;
        fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| StoreError::io(&self.path, e))?;
        info!(
            "💾 断点已保存: {} 个已完成, {} 个待重试",
            self.doc.processed_instruments.len(),
            self.doc.pending_retry.len()
        );
        Ok(())
    }
}
