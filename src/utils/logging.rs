/// 日志工具模块
///
/// 提供日志格式化和输出的辅助函数
use std::time::Duration;
use tracing::{info, warn};

use crate::services::output_validator::ValidationReport;

/// 记录程序启动信息
pub fn log_startup(port: u16, layout_version: u32) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 逐个编号采集模式");
    info!("🔌 浏览器调试端口: {}", port);
    info!("🗺️ 定位表版本: {}", layout_version);
    info!("{}", "=".repeat(60));
}

/// 记录输入加载信息
pub fn log_input_loaded(total_rows: usize, valid: usize, already_done: usize) {
    info!("✓ 输入共 {} 行，其中有效编号 {} 个", total_rows, valid);
    info!("📋 断点中已完成 {} 个，将跳过", already_done);
}

/// 估算剩余时间
///
/// # 参数
/// - `elapsed`: 已用时间
/// - `done`: 本次运行已尝试的数量
/// - `remaining`: 剩余数量
pub fn estimate_remaining(elapsed: Duration, done: usize, remaining: usize) -> Option<Duration> {
    if done == 0 {
        return None;
    }
    Some(elapsed.div_f64(done as f64).mul_f64(remaining as f64))
}

/// 记录单个编号开始处理
pub fn log_instrument_start(identifier: &str, position: usize, total: usize, eta: Option<Duration>) {
    info!("\n{}", "─".repeat(60));
    match eta {
        Some(eta) => info!(
            "📄 处理编号 {} ({}/{})，预计剩余 {}",
            identifier,
            position,
            total,
            format_duration(eta)
        ),
        None => info!("📄 处理编号 {} ({}/{})", identifier, position, total),
    }
}

/// 记录校验报告
pub fn log_validation_report(report: &ValidationReport) {
    info!("\n{}", "=".repeat(60));
    info!("🔎 输出校验");
    info!("输入编号: {} 个, 输出行: {} 行", report.input_count, report.output_rows);
    if report.is_clean() {
        info!("✅ 所有输入编号都已出现在输出中");
    }
    for id in &report.missing_in_output {
        warn!("❌ 输出中缺少编号: {}", id);
    }
    for id in &report.unexpected_in_output {
        warn!("⚠️ 输出中存在不在输入里的编号: {}", id);
    }
    info!("{}", "=".repeat(60));
}

/// 打印最终统计信息
pub fn print_final_stats(completed: usize, skipped: usize, failed: &[String], elapsed: Duration) {
    info!("\n{}", "=".repeat(60));
    info!("📊 全部处理完成统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("总耗时: {}", format_duration(elapsed));
    info!("{}", "=".repeat(60));
    info!("✅ 成功: {}", completed);
    info!("⏭️ 跳过(已完成): {}", skipped);
    info!("❌ 最终失败: {}", failed.len());
    for id in failed {
        info!("   - {}", id);
    }
    info!("{}", "=".repeat(60));
}

fn format_duration(d: Duration) -> String {
    let secs = d.as_secs();
    format!("{:02}:{:02}:{:02}", secs / 3600, (secs % 3600) / 60, secs % 60)
}
