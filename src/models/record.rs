use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

pub const FIELD_INSTRUMENT: &str = "Instrument";
pub const FIELD_SECTION: &str = "Section";
pub const FIELD_STATUS: &str = "Status";

/// 输出文件中排在最前面的列
pub const LEADING_FIELDS: [&str; 3] = [FIELD_INSTRUMENT, FIELD_SECTION, FIELD_STATUS];

/// 记录是怎样产生的
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordStatus {
    /// 正常采集到的一行
    Collected,
    /// 找不到分区菜单
    MenuNotFound,
    /// 找不到详情链接
    DetailNotFound,
    /// 表格已打开但没有任何有效行
    NoRows,
    /// 分区没有产出任何记录，由编排层补一条占位
    NoData,
    /// 分区采集时出现的其他错误
    Error { label: String, message: String },
}

impl fmt::Display for RecordStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordStatus::Collected => write!(f, "collected"),
            RecordStatus::MenuNotFound => write!(f, "section menu not found"),
            RecordStatus::DetailNotFound => write!(f, "detail link not found"),
            RecordStatus::NoRows => write!(f, "no rows found"),
            RecordStatus::NoData => write!(f, "no data found for this section"),
            RecordStatus::Error { label, message } => {
                write!(f, "general {}-collection error: {}", label, message)
            }
        }
    }
}

/// 分区记录：字段名 → 值 的扁平映射
///
/// 总是带有所属编号和状态。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionRecord {
    fields: BTreeMap<String, String>,
}

impl SectionRecord {
    pub fn new(instrument: &str, section: &str, status: &RecordStatus) -> Self {
        let mut record = Self::default();
        record.set(FIELD_INSTRUMENT, instrument);
        record.set(FIELD_SECTION, section);
        record.set(FIELD_STATUS, status.to_string());
        record
    }

    /// 从已有的字段构建（读取输出文件时使用）
    pub fn from_fields(fields: BTreeMap<String, String>) -> Self {
        Self { fields }
    }

    pub fn with(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(field, value);
        self
    }

    pub fn set(&mut self, field: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(field.into(), value.into());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }

    pub fn instrument(&self) -> Option<&str> {
        self.get(FIELD_INSTRUMENT)
    }

    pub fn status(&self) -> Option<&str> {
        self.get(FIELD_STATUS)
    }

    pub fn is_collected(&self) -> bool {
        self.status() == Some("collected")
    }

    /// 写入输入行携带的附加列，不覆盖已有字段
    pub fn stamp<'a>(&mut self, metadata: impl IntoIterator<Item = &'a (String, String)>) {
        for (field, value) in metadata {
            self.fields
                .entry(field.clone())
                .or_insert_with(|| value.clone());
        }
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_strings() {
        assert_eq!(RecordStatus::Collected.to_string(), "collected");
        assert_eq!(RecordStatus::MenuNotFound.to_string(), "section menu not found");
        assert_eq!(RecordStatus::DetailNotFound.to_string(), "detail link not found");
        assert_eq!(RecordStatus::NoData.to_string(), "no data found for this section");
        let err = RecordStatus::Error {
            label: "disbursement".to_string(),
            message: "table missing".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "general disbursement-collection error: table missing"
        );
    }

    #[test]
    fn test_stamp_keeps_existing_fields() {
        let mut record = SectionRecord::new("123", "disbursements", &RecordStatus::Collected);
        let metadata = vec![
            ("Técnico".to_string(), "Ana".to_string()),
            ("Status".to_string(), "overwritten?".to_string()),
        ];
        record.stamp(&metadata);
        assert_eq!(record.get("Técnico"), Some("Ana"));
        assert_eq!(record.status(), Some("collected"));
        assert!(record.is_collected());
    }
}
