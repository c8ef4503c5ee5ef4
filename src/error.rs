use std::path::PathBuf;

use thiserror::Error;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 浏览器相关错误
    #[error("浏览器错误: {0}")]
    Browser(#[from] BrowserError),
    /// 文件读写错误
    #[error("文件错误: {0}")]
    Store(#[from] StoreError),
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
    /// 无法回到门户首页，后续编号都无法处理
    #[error("{context} 无法返回首页，终止批处理: {source}")]
    LandingUnreachable {
        context: String,
        #[source]
        source: BrowserError,
    },
}

/// 浏览器相关错误
#[derive(Debug, Error)]
pub enum BrowserError {
    /// 连接浏览器失败
    #[error("无法连接到浏览器 (端口: {port}): {source}")]
    ConnectionFailed {
        port: u16,
        #[source]
        source: chromiumoxide::error::CdpError,
    },
    /// 在等待时间内没有找到元素
    #[error("元素 '{locator}' 在 {waited_ms}ms 内未出现")]
    ElementNotFound { locator: String, waited_ms: u128 },
    /// 没有找到可见文本匹配的元素
    #[error("元素 '{locator}' 中没有文本为 '{text}' 的项")]
    NoMatchingText { locator: String, text: String },
    /// 页面导航失败
    #[error("导航到 {url} 失败: {message}")]
    NavigationFailed { url: String, message: String },
    /// 执行脚本失败
    #[error("执行脚本失败: {0}")]
    Script(#[from] chromiumoxide::error::CdpError),
    /// 脚本返回值无法解析
    #[error("脚本返回值解析失败: {0}")]
    Decode(#[from] serde_json::Error),
}

impl BrowserError {
    /// 是否属于"等待超时未找到元素"
    pub fn is_not_found(&self) -> bool {
        matches!(self, BrowserError::ElementNotFound { .. })
    }
}

/// 文件读写错误
#[derive(Debug, Error)]
pub enum StoreError {
    /// 文件被其他进程占用
    #[error("文件被占用，请先关闭: {}", path.display())]
    PermissionDenied { path: PathBuf },
    #[error("读写文件失败 ({}): {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("CSV 处理失败 ({}): {source}", path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error("JSON 处理失败 ({}): {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("电子表格读取失败 ({}): {source}", path.display())]
    Spreadsheet {
        path: PathBuf,
        #[source]
        source: calamine::Error,
    },
    /// 输入文件缺少必需的列
    #[error("文件 {} 缺少列 '{column}'", path.display())]
    MissingColumn { path: PathBuf, column: String },
}

impl StoreError {
    /// 包装 IO 错误，权限问题单独归类
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::PermissionDenied {
            StoreError::PermissionDenied { path }
        } else {
            StoreError::Io { path, source }
        }
    }

    /// 包装 CSV 错误，底层是权限问题时单独归类
    pub fn csv(path: impl Into<PathBuf>, source: csv::Error) -> Self {
        let path = path.into();
        let denied = matches!(
            source.kind(),
            csv::ErrorKind::Io(e) if e.kind() == std::io::ErrorKind::PermissionDenied
        );
        if denied {
            StoreError::PermissionDenied { path }
        } else {
            StoreError::Csv { path, source }
        }
    }

    /// 包装电子表格错误，底层是权限问题时单独归类
    pub fn spreadsheet(path: impl Into<PathBuf>, source: calamine::Error) -> Self {
        let path = path.into();
        match source {
            calamine::Error::Io(e) => StoreError::io(path, e),
            source => StoreError::Spreadsheet { path, source },
        }
    }
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 布局文件读取失败
    #[error("无法读取布局文件 {}: {source}", path.display())]
    LayoutRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// 布局文件解析失败
    #[error("布局文件解析失败 {}: {source}", path.display())]
    LayoutParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    /// 配置值不合法
    #[error("配置项 {field} 不合法: {reason}")]
    Invalid { field: String, reason: String },
}

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_permission_denied_is_classified() {
        let err = StoreError::io(
            "out.csv",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "locked"),
        );
        assert!(matches!(err, StoreError::PermissionDenied { .. }));

        let err = StoreError::io(
            "out.csv",
            std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        );
        assert!(matches!(err, StoreError::Io { .. }));
    }

    #[test]
    fn test_spreadsheet_io_error_is_classified() {
        let err = StoreError::spreadsheet(
            "in.xlsx",
            calamine::Error::Io(std::io::Error::new(std::io::ErrorKind::PermissionDenied, "locked")),
        );
        assert!(matches!(err, StoreError::PermissionDenied { .. }));

        let err = StoreError::spreadsheet("in.xlsx", calamine::Error::Msg("broken"));
        assert!(matches!(err, StoreError::Spreadsheet { .. }));
    }

    #[test]
    fn test_layer_errors_convert_into_app_error() {
        fn read_layout() -> AppResult<()> {
            Err(ConfigError::Invalid {
                field: "section".to_string(),
                reason: "empty".to_string(),
            })?
        }
        fn read_rows() -> AppResult<()> {
            Err(StoreError::MissingColumn {
                path: "in.xlsx".into(),
                column: "Instrumento nº".to_string(),
            })?
        }
        fn attach() -> AppResult<()> {
            Err(BrowserError::NavigationFailed {
                url: "about:blank".to_string(),
                message: "closed".to_string(),
            })?
        }

        assert!(matches!(read_layout(), Err(AppError::Config(_))));
        assert!(matches!(read_rows(), Err(AppError::Store(StoreError::MissingColumn { .. }))));
        assert!(matches!(attach(), Err(AppError::Browser(_))));
    }

    #[test]
    fn test_not_found_detection() {
        let err = BrowserError::ElementNotFound {
            locator: "menu_toggle".to_string(),
            waited_ms: 3000,
        };
        assert!(err.is_not_found());
        assert!(err.to_string().contains("menu_toggle"));

        let err = BrowserError::NoMatchingText {
            locator: "pagination".to_string(),
            text: "2".to_string(),
        };
        assert!(!err.is_not_found());
    }
}
