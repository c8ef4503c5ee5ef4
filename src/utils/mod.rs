pub mod format;
pub mod logging;

pub use format::{normalize_date, strip_currency, truncate_text};
