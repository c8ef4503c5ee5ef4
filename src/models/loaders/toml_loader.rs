use crate::error::ConfigError;
use crate::models::locator::LocatorTable;
use std::path::Path;
use tokio::fs;
use tracing::info;

/// 从 TOML 文件加载定位表
///
/// 文件不存在时使用内置默认表；文件存在但无法解析则返回错误。
pub async fn load_locator_table(path: &Path) -> Result<LocatorTable, ConfigError> {
    if !fs::try_exists(path).await.unwrap_or(false) {
        info!("未找到定位表 {}，使用内置默认值", path.display());
        return Ok(LocatorTable::default());
    }

    let content = fs::read_to_string(path)
        .await
        .map_err(|source| ConfigError::LayoutRead {
            path: path.to_path_buf(),
            source,
        })?;

    let table = parse_locator_table(&content, path)?;
    info!(
        "已加载定位表 {} (版本 {}, {} 个分区)",
        path.display(),
        table.version,
        table.sections.len()
    );
    Ok(table)
}

fn parse_locator_table(content: &str, path: &Path) -> Result<LocatorTable, ConfigError> {
    let table: LocatorTable = toml::from_str(content).map_err(|source| ConfigError::LayoutParse {
        path: path.to_path_buf(),
        source,
    })?;

    if table.sections.is_empty() {
        return Err(ConfigError::Invalid {
            field: "section".to_string(),
            reason: "至少需要定义一个分区".to_string(),
        });
    }
    for section in &table.sections {
        if let Some(column) = section.columns.iter().find(|c| c.cell >= section.min_cells) {
            return Err(ConfigError::Invalid {
                field: format!("section.{}.columns", section.name),
                reason: format!(
                    "列 '{}' 的下标 {} 超出最少单元格数 {}",
                    column.field, column.cell, section.min_cells
                ),
            });
        }
    }

    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let table = load_locator_table(&dir.path().join("absent.toml")).await.unwrap();
        assert_eq!(table, LocatorTable::default());
    }

    #[tokio::test]
    async fn test_broken_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("layout.toml");
        tokio::fs::write(&path, "version = [").await.unwrap();
        let err = load_locator_table(&path).await.unwrap_err();
        assert!(matches!(err, ConfigError::LayoutParse { .. }));
    }

    #[tokio::test]
    async fn test_round_trip_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("layout.toml");
        let table = LocatorTable::default();
        tokio::fs::write(&path, toml::to_string(&table).unwrap()).await.unwrap();
        let loaded = load_locator_table(&path).await.unwrap();
        assert_eq!(loaded, table);
    }

    #[tokio::test]
    async fn test_shipped_layout_matches_defaults() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("portal_layout.toml");
        let loaded = load_locator_table(&path).await.unwrap();
        assert_eq!(loaded, LocatorTable::default());
    }

    #[test]
    fn test_column_outside_min_cells_rejected() {
        let mut table = LocatorTable::default();
        table.sections[0].columns[0].cell = 42;
        let text = toml::to_string(&table).unwrap();
        let err = parse_locator_table(&text, Path::new("layout.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));
    }
}
