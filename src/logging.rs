// ==========================================
// 日志系统初始化
// ==========================================
// 使用 tracing 和 tracing-subscriber
// 日志统一写到 stderr,stdout 留给列表/报表输出
// ==========================================

use tracing_subscriber::{fmt, EnvFilter};

/// 日志格式环境变量（text / json）
pub const LOG_FORMAT_ENV: &str = "DEVICE_STOCK_LOG_FORMAT";

/// 日志输出格式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    /// 每行一个 JSON 对象,便于日志采集
    Json,
}

impl LogFormat {
    /// 从环境变量读取,无法识别时为 Text
    pub fn from_env() -> Self {
        Self::parse(std::env::var(LOG_FORMAT_ENV).ok().as_deref())
    }

    fn parse(value: Option<&str>) -> Self {
        match value.map(|v| v.trim().to_ascii_lowercase()) {
            Some(v) if v == "json" => LogFormat::Json,
            _ => LogFormat::Text,
        }
    }
}

/// 初始化日志系统（库默认: info）
///
/// # 环境变量
/// - RUST_LOG: 日志级别过滤器,优先于默认级别
///   例如: RUST_LOG=debug 或 RUST_LOG=device_stock=trace
/// - DEVICE_STOCK_LOG_FORMAT: text（默认）或 json
///
/// # 示例
/// ```no_run
/// use device_stock::logging;
/// logging::init();
/// ```
pub fn init() {
    init_with(LogFormat::from_env(), "info");
}

/// 按指定格式与默认级别初始化
///
/// # 参数
/// - format: 输出格式
/// - default_level: RUST_LOG 未设置时使用的过滤器
pub fn init_with(format: LogFormat, default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let builder = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_line_number(true)
        .with_writer(std::io::stderr);

    // 重复初始化（例如嵌入方已安装 subscriber）时保持现状
    let result = match format {
        LogFormat::Text => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
    if let Err(e) = result {
        eprintln!("日志系统已初始化,忽略: {}", e);
    }
}

/// 初始化测试环境的日志系统
///
/// 使用更详细的日志级别,便于调试
pub fn init_test() {
    let _ = fmt()
        .with_env_filter(EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_format_parse() {
        assert_eq!(LogFormat::parse(Some("json")), LogFormat::Json);
        assert_eq!(LogFormat::parse(Some(" JSON ")), LogFormat::Json);
        assert_eq!(LogFormat::parse(Some("pretty")), LogFormat::Text);
        assert_eq!(LogFormat::parse(None), LogFormat::Text);
    }

    #[test]
    fn test_init_test_is_repeatable() {
        init_test();
        init_test();
        tracing::debug!("测试日志");
    }
}
