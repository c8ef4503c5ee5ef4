use regex::Regex;
use std::sync::OnceLock;

/// 表格软件常把整数编号存成浮点数，例如 "12345.0"
fn float_suffix() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(\d+)\.0+$").expect("static regex"))
}

/// 规范化编号
///
/// 去掉首尾空白和浮点尾巴；空值和 "nan" / "none" 占位符返回 `None`。
pub fn normalize_identifier(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    let lowered = trimmed.to_lowercase();
    if lowered == "nan" || lowered == "none" {
        return None;
    }
    Some(float_suffix().replace(trimmed, "$1").into_owned())
}

/// 输入文件中的一行
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputRow {
    /// 文件中的行号（表头为第 1 行）
    pub line: usize,
    /// 编号列的原始值
    pub raw_identifier: String,
    /// 其余列，原样写入输出
    pub metadata: Vec<(String, String)>,
}

impl InputRow {
    pub fn new(line: usize, raw_identifier: impl Into<String>, metadata: Vec<(String, String)>) -> Self {
        Self {
            line,
            raw_identifier: raw_identifier.into(),
            metadata,
        }
    }

    pub fn identifier(&self) -> Option<String> {
        normalize_identifier(&self.raw_identifier)
    }
}

/// 待处理的编号及其原始输入行
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkItem {
    pub identifier: String,
    pub row: InputRow,
}

impl WorkItem {
    /// 过滤掉编号缺失或为占位符的行
    pub fn from_rows(rows: Vec<InputRow>) -> Vec<WorkItem> {
        rows.into_iter()
            .filter_map(|row| {
                let identifier = row.identifier()?;
                Some(WorkItem { identifier, row })
            })
            .collect()
    }
}
