use std::path::PathBuf;
use std::time::Duration;

/// 程序配置
#[derive(Clone, Debug)]
pub struct Config {
    /// 浏览器调试端口
    pub browser_debug_port: u16,
    /// 目标页面标题（用于在已打开的标签页中挑选）
    pub target_title: Option<String>,
    /// 门户首页 URL，未设置时使用连接时页面所在的 URL
    pub landing_url: Option<String>,
    /// 输入 CSV
    pub input_path: PathBuf,
    /// 输出 CSV
    pub output_path: PathBuf,
    /// 断点文件
    pub checkpoint_path: PathBuf,
    /// 定位表（TOML）
    pub layout_path: PathBuf,
    /// 输入文件中的编号列名
    pub id_column: String,
    /// 单个元素的等待时间
    pub element_wait: Duration,
    /// 数据表格的等待时间
    pub table_wait: Duration,
    /// 点击后等待页面渲染的时间
    pub settle_delay: Duration,
    /// 等待元素时的轮询间隔
    pub poll_interval: Duration,
    /// 金额前缀
    pub currency_prefix: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            browser_debug_port: 9222,
            target_title: None,
            landing_url: None,
            input_path: PathBuf::from("input.csv"),
            output_path: PathBuf::from("output.csv"),
            checkpoint_path: PathBuf::from("checkpoint.json"),
            layout_path: PathBuf::from("portal_layout.toml"),
            id_column: "Instrumento nº".to_string(),
            element_wait: Duration::from_secs(3),
            table_wait: Duration::from_secs(10),
            settle_delay: Duration::from_secs(1),
            poll_interval: Duration::from_millis(100),
            currency_prefix: "R$".to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            browser_debug_port: env_parse("BROWSER_DEBUG_PORT").unwrap_or(default.browser_debug_port),
            target_title: std::env::var("TARGET_TITLE").ok().or(default.target_title),
            landing_url: std::env::var("LANDING_URL").ok().or(default.landing_url),
            input_path: std::env::var("INPUT_PATH").map(PathBuf::from).unwrap_or(default.input_path),
            output_path: std::env::var("OUTPUT_PATH").map(PathBuf::from).unwrap_or(default.output_path),
            checkpoint_path: std::env::var("CHECKPOINT_PATH").map(PathBuf::from).unwrap_or(default.checkpoint_path),
            layout_path: std::env::var("LAYOUT_PATH").map(PathBuf::from).unwrap_or(default.layout_path),
            id_column: std::env::var("ID_COLUMN").unwrap_or(default.id_column),
            element_wait: env_millis("ELEMENT_WAIT_MS").unwrap_or(default.element_wait),
            table_wait: env_millis("TABLE_WAIT_MS").unwrap_or(default.table_wait),
            settle_delay: env_millis("SETTLE_DELAY_MS").unwrap_or(default.settle_delay),
            poll_interval: env_millis("POLL_INTERVAL_MS").unwrap_or(default.poll_interval),
            currency_prefix: std::env::var("CURRENCY_PREFIX").unwrap_or(default.currency_prefix),
        }
    }

    /// 测试用配置：不等待渲染，轮询更快
    pub fn for_tests(dir: &std::path::Path) -> Self {
        Self {
            input_path: dir.join("input.csv"),
            output_path: dir.join("output.csv"),
            checkpoint_path: dir.join("checkpoint.json"),
            layout_path: dir.join("portal_layout.toml"),
            landing_url: Some("https://portal.test/landing".to_string()),
            element_wait: Duration::from_millis(50),
            table_wait: Duration::from_millis(50),
            settle_delay: Duration::ZERO,
            poll_interval: Duration::from_millis(5),
            ..Self::default()
        }
    }
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|v| v.parse().ok())
}

fn env_millis(name: &str) -> Option<Duration> {
    env_parse::<u64>(name).map(Duration::from_millis)
}
