//! 输出校验服务 - 业务能力层
//!
//! 对比输入编号与输出文件中出现的编号，只读，不修改任何状态

use std::collections::BTreeSet;

use crate::models::SectionRecord;

/// 校验报告
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    /// 输入中的编号数（去重后）
    pub input_count: usize,
    /// 输出文件总行数
    pub output_rows: usize,
    /// 在输入中但不在输出中
    pub missing_in_output: Vec<String>,
    /// 在输出中但不在输入中
    pub unexpected_in_output: Vec<String>,
}

impl ValidationReport {
    pub fn is_clean(&self) -> bool {
        self.missing_in_output.is_empty() && self.unexpected_in_output.is_empty()
    }
}

/// 校验输出
///
/// # 参数
/// - `input_identifiers`: 规范化后的输入编号
/// - `output`: 输出文件中的全部记录
pub fn validate<'a>(
    input_identifiers: impl IntoIterator<Item = &'a str>,
    output: &[SectionRecord],
) -> ValidationReport {
    let input: BTreeSet<&str> = input_identifiers.into_iter().collect();
    let present: BTreeSet<&str> = output.iter().filter_map(SectionRecord::instrument).collect();

    ValidationReport {
        input_count: input.len(),
        output_rows: output.len(),
        missing_in_output: input.difference(&present).map(|s| s.to_string()).collect(),
        unexpected_in_output: present.difference(&input).map(|s| s.to_string()).collect(),
    }
}
