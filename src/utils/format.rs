/// 文本格式化工具
use chrono::NaiveDate;
use tracing::warn;

const DATE_FORMAT: &str = "%d/%m/%Y";

/// 去掉金额前缀和首尾空白，"Valor: R$ 1.234,56" → "1.234,56"
pub fn strip_currency(text: &str, prefix: &str) -> String {
    if prefix.is_empty() {
        return text.trim().to_string();
    }
    text.rsplit(prefix).next().unwrap_or(text).trim().to_string()
}

/// 规范化 日/月/年 日期，无法解析时原样返回
pub fn normalize_date(text: &str) -> String {
    let trimmed = text.trim();
    match NaiveDate::parse_from_str(trimmed, DATE_FORMAT) {
        Ok(date) => date.format(DATE_FORMAT).to_string(),
        Err(_) => {
            warn!("日期格式无效: {}", trimmed);
            trimmed.to_string()
        }
    }
}

/// 截断过长的文本（按字符计）
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_currency() {
        assert_eq!(strip_currency("R$ 1.234,56", "R$"), "1.234,56");
        assert_eq!(strip_currency("Valor Previsto: R$ 10,00 ", "R$"), "10,00");
        assert_eq!(strip_currency("  99,90 ", "R$"), "99,90");
        assert_eq!(strip_currency(" 5 ", ""), "5");
    }

    #[test]
    fn test_normalize_date() {
        assert_eq!(normalize_date("1/2/2023"), "01/02/2023");
        assert_eq!(normalize_date("15/08/2024"), "15/08/2024");
        assert_eq!(normalize_date("2024-08-15"), "2024-08-15");
        assert_eq!(normalize_date(""), "");
    }

    #[test]
    fn test_truncate_text() {
        assert_eq!(truncate_text("abcdef", 3), "abc...");
        assert_eq!(truncate_text("abc", 3), "abc");
    }
}
