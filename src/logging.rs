// ==========================================
// 人事管理系统 - 日志初始化
// ==========================================
// 输出: stderr（stdout 留给 CLI 的 JSON 结果）
// 过滤: RUST_LOG 优先，否则使用默认规则
// 格式: `HR_CRITERIA_LOG_FORMAT=json` 切换为 JSON，其余为文本
// ==========================================

use tracing_subscriber::{fmt, EnvFilter};

/// 未设置 RUST_LOG 时的过滤规则
pub const DEFAULT_DIRECTIVES: &str = "info,slow_sql=warn";

pub const ENV_LOG_FORMAT: &str = "HR_CRITERIA_LOG_FORMAT";

fn json_requested(format: Option<&str>) -> bool {
    format.is_some_and(|f| f.trim().eq_ignore_ascii_case("json"))
}

fn filter_or(fallback: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback))
}

/// 文本格式日志
///
/// 例如 `RUST_LOG=hr_criteria::query=debug` 可查看渲染后的 SQL
///
/// ```no_run
/// hr_criteria::logging::init();
/// ```
pub fn init() {
    fmt()
        .with_env_filter(filter_or(DEFAULT_DIRECTIVES))
        .with_target(true)
        .with_line_number(true)
        .with_writer(std::io::stderr)
        .init();
}

/// JSON 格式日志（供日志采集使用）
pub fn init_json() {
    fmt()
        .json()
        .with_env_filter(filter_or(DEFAULT_DIRECTIVES))
        .with_current_span(false)
        .with_writer(std::io::stderr)
        .init();
}

/// 按 `HR_CRITERIA_LOG_FORMAT` 选择文本或 JSON 格式
pub fn init_from_env() {
    if json_requested(std::env::var(ENV_LOG_FORMAT).ok().as_deref()) {
        init_json();
    } else {
        init();
    }
}

/// 测试日志: 默认 debug，输出交给测试框架捕获；可重复调用
pub fn init_test() {
    let _ = fmt()
        .with_env_filter(filter_or("debug"))
        .with_test_writer()
        .try_init();
}
