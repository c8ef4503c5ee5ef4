//! 表格存储服务 - 业务能力层
//!
//! 读取输入（CSV 或电子表格），向输出 CSV 追加记录（整行去重）

use calamine::{open_workbook_auto, Data, Reader};
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::error::StoreError;
use crate::models::record::LEADING_FIELDS;
use crate::models::{InputRow, SectionRecord};

/// 按扩展名识别的电子表格格式
const SPREADSHEET_EXTENSIONS: [&str; 5] = ["xlsx", "xlsm", "xlsb", "xls", "ods"];

/// 读取输入文件
///
/// `.xlsx` 等电子表格读取第一个工作表，其余按 CSV 读取。
///
/// # 参数
/// - `path`: 输入文件路径
/// - `id_column`: 编号列名
///
/// # 返回
/// 所有数据行（不做过滤），编号以外的列作为附加信息保留
pub fn read_input(path: &Path, id_column: &str) -> Result<Vec<InputRow>, StoreError> {
    let (headers, records) = if is_spreadsheet(path) {
        read_spreadsheet(path)?
    } else {
        read_csv(path)?
    };
    info!("输入文件列: {:?}", headers);

    let id_index = headers
        .iter()
        .position(|h| h == id_column)
        .ok_or_else(|| StoreError::MissingColumn {
            path: path.to_path_buf(),
            column: id_column.to_string(),
        })?;

    let rows = records
        .into_iter()
        .enumerate()
        .map(|(index, record)| {
            let cell = |i: usize| record.get(i).cloned().unwrap_or_default();
            let metadata = headers
                .iter()
                .enumerate()
                .filter(|(i, _)| *i != id_index)
                .map(|(i, h)| (h.clone(), cell(i)))
                .collect();
            // 表头占第 1 行
            InputRow::new(index + 2, cell(id_index), metadata)
        })
        .collect();

    Ok(rows)
}

fn is_spreadsheet(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| SPREADSHEET_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

fn clean_header(header: &str) -> String {
    header.trim_start_matches('\u{feff}').trim().to_string()
}

type Table = (Vec<String>, Vec<Vec<String>>);

fn read_csv(path: &Path) -> Result<Table, StoreError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .map_err(|e| StoreError::csv(path, e))?;

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| StoreError::csv(path, e))?
        .iter()
        .map(clean_header)
        .collect();

    let mut records: Vec<Vec<String>> = Vec::new();
    for result in reader.records() {
        let record = result.map_err(|e| StoreError::csv(path, e))?;
        records.push(record.iter().map(str::to_string).collect());
    }
    Ok((headers, records))
}

/// 第一个工作表，第一行为表头
fn read_spreadsheet(path: &Path) -> Result<Table, StoreError> {
    let mut workbook = open_workbook_auto(path).map_err(|e| StoreError::spreadsheet(path, e))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| StoreError::spreadsheet(path, calamine::Error::Msg("工作簿中没有工作表")))?
        .map_err(|e| StoreError::spreadsheet(path, e))?;

    let mut rows = range.rows();
    let headers: Vec<String> = rows
        .next()
        .map(|row| row.iter().map(|cell| clean_header(&cell_text(cell))).collect())
        .unwrap_or_default();
    let records: Vec<Vec<String>> = rows
        .map(|row| row.iter().map(cell_text).collect())
        .collect();
    Ok((headers, records))
}

/// 单元格文本，整数值的浮点数没有小数部分（12345.0 → "12345"）
fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// 一次追加的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AppendStats {
    /// 去重后新增的行数
    pub added: usize,
    /// 写入后的总行数
    pub total: usize,
}

/// 输出数据集
///
/// 不是真正的追加：每次写入都读出全部已有行，合并去重后整体重写。
#[derive(Debug, Clone)]
pub struct TabularStore {
    path: PathBuf,
}

impl TabularStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 读取所有已写入的记录，文件不存在时返回空
    pub fn read_records(&self) -> Result<Vec<SectionRecord>, StoreError> {
        let (_, records) = self.read_existing()?;
        Ok(records)
    }

    /// 追加记录，完全相同的行只保留第一次出现的
    pub fn append(&self, new_records: &[SectionRecord]) -> Result<AppendStats, StoreError> {
        let (existing_headers, existing) = self.read_existing()?;
        let before = existing.len();

        let headers = merge_headers(existing_headers, new_records);
        let mut seen: HashSet<Vec<String>> = HashSet::new();
        let mut rows = Vec::with_capacity(before + new_records.len());
        for record in existing.iter().chain(new_records.iter()) {
            let row: Vec<String> = headers
                .iter()
                .map(|h| record.get(h).unwrap_or_default().to_string())
                .collect();
            if seen.insert(row.clone()) {
                rows.push(row);
            }
        }

        let total = rows.len();
        self.write_all(&headers, &rows)?;
        let added = total.saturating_sub(before);
        debug!("输出已更新: 新增 {} 行, 共 {} 行", added, total);
        Ok(AppendStats { added, total })
    }

    fn read_existing(&self) -> Result<(Vec<String>, Vec<SectionRecord>), StoreError> {
        if !self.path.exists() {
            return Ok((Vec::new(), Vec::new()));
        }

        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_path(&self.path)
            .map_err(|e| StoreError::csv(&self.path, e))?;
        let headers: Vec<String> = reader
            .headers()
            .map_err(|e| StoreError::csv(&self.path, e))?
            .iter()
            .map(str::to_string)
            .collect();

        let mut records = Vec::new();
        for result in reader.records() {
            let row = result.map_err(|e| StoreError::csv(&self.path, e))?;
            let fields: BTreeMap<String, String> = headers
                .iter()
                .zip(row.iter())
                .filter(|(_, v)| !v.is_empty())
                .map(|(h, v)| (h.clone(), v.to_string()))
                .collect();
            records.push(SectionRecord::from_fields(fields));
        }
        Ok((headers, records))
    }

    /// 先写临时文件再改名，进程中途退出不会留下半个文件
    fn write_all(&self, headers: &[String], rows: &[Vec<String>]) -> Result<(), StoreError> {
        let tmp = tmp_path(&self.path);
        {
            let mut writer = csv::Writer::from_path(&tmp).map_err(|e| StoreError::csv(&tmp, e))?;
            writer
                .write_record(headers)
                .map_err(|e| StoreError::csv(&tmp, e))?;
            for row in rows {
                writer.write_record(row).map_err(|e| StoreError::csv(&tmp, e))?;
            }
            writer.flush().map_err(|e| StoreError::io(&tmp, e))?;
        }
        fs::rename(&tmp, &self.path).map_err(|e| {
            let _ = fs::remove_file(&tmp);
            StoreError::io(&self.path, e)
        })
    }
}

/// 已有列在前，新字段按首次出现的顺序追加；固定列总是排在最前
fn merge_headers(existing: Vec<String>, records: &[SectionRecord]) -> Vec<String> {
    let mut headers: Vec<String> = LEADING_FIELDS.iter().map(|s| s.to_string()).collect();
    for h in existing {
        if !headers.contains(&h) {
            headers.push(h);
        }
    }
    for record in records {
        for (field, _) in record.fields() {
            if !headers.iter().any(|h| h == field) {
                headers.push(field.to_string());
            }
        }
    }
    headers
}

pub(crate) fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}
