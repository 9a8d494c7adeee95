/// 日志工具模块
///
/// 提供日志格式化和输出的辅助函数
use tracing::info;

use crate::config::Config;

/// 记录程序启动信息
pub fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!(
        "🚀 pWin.ai PDF 分析工具启动 - {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("🌐 后端地址: {}", config.backend_url);
    info!(
        "📦 压缩阈值: {:.1} MiB",
        config.compression_threshold_bytes as f64 / (1024.0 * 1024.0)
    );
    info!("{}", "=".repeat(60));
}

/// 记录阶段开始
///
/// # 参数
/// - `stage`: 阶段名称
/// - `detail`: 附加说明
pub fn log_stage_start(stage: &str, detail: &str) {
    info!("\n{}", "─".repeat(60));
    info!("▶ {} | {}", stage, detail);
}

/// 记录会话结束
pub fn log_session_end(stage: &str) {
    info!("\n{}", "=".repeat(60));
    info!(
        "📊 会话结束 - 最终阶段: {} ({})",
        stage,
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
}

/// 格式化字节数
pub fn format_bytes(bytes: u64) -> String {
    const KIB: f64 = 1024.0;
    const MIB: f64 = 1024.0 * 1024.0;
    let value = bytes as f64;
    if value >= MIB {
        format!("{:.1} MiB", value / MIB)
    } else if value >= KIB {
        format!("{:.1} KiB", value / KIB)
    } else {
        format!("{} B", bytes)
    }
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大长度
///
/// # 返回
/// 返回截断后的文本
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
    fn test_truncate_text() {
        assert_eq!(truncate_text("短文本", 10), "短文本");
        assert_eq!(truncate_text("一二三四五", 3), "一二三...");
    }

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(2048), "2.0 KiB");
        assert_eq!(format_bytes(31_457_280), "30.0 MiB");
    }
}
