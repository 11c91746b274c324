// ==========================================
// 人事管理系统 - SQL 性能追踪
// ==========================================
// 职责: 条件查询执行期间的 SQL 语句计数 + 慢查询日志
// 开关:
// - Debug 默认开启；Release 默认关闭
// - `HR_CRITERIA_PERF_SQL=1` 强制开启
// - `HR_CRITERIA_SLOW_SQL_MS=50` 慢 SQL 阈值（毫秒，0 = 不记录）
// 约束: 计数按线程统计，只在 PerfGuard 存活期间累加
// ==========================================

use rusqlite::Connection;
use std::cell::Cell;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::{Duration, Instant};

pub const ENV_PERF_SQL: &str = "HR_CRITERIA_PERF_SQL";
pub const ENV_SLOW_SQL_MS: &str = "HR_CRITERIA_SLOW_SQL_MS";

/// 慢 SQL 日志中保留的 SQL 字符数
const SQL_LOG_CHARS: usize = 420;

static ENABLED: AtomicBool = AtomicBool::new(false);
static SLOW_THRESHOLD_MS: AtomicU64 = AtomicU64::new(0);

/// 当前线程的统计快照
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct SqlTally {
    /// 嵌套的 PerfGuard 数量
    open_guards: u32,
    statements: u64,
    slow: u64,
}

thread_local! {
    static TALLY: Cell<SqlTally> = const {
        Cell::new(SqlTally { open_guards: 0, statements: 0, slow: 0 })
    };
}

fn update_tally(f: impl FnOnce(&mut SqlTally)) {
    TALLY.with(|cell| {
        let mut tally = cell.get();
        f(&mut tally);
        cell.set(tally);
    });
}

fn current_tally() -> SqlTally {
    TALLY.with(Cell::get)
}

/// 开关与阈值（来自环境变量）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PerfSettings {
    enabled: bool,
    slow_ms: u64,
}

impl PerfSettings {
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let enabled = lookup(ENV_PERF_SQL)
            .map(|v| flag_enabled(&v))
            .unwrap_or(cfg!(debug_assertions));
        let slow_ms = lookup(ENV_SLOW_SQL_MS)
            .and_then(|v| v.trim().parse::<u64>().ok())
            .unwrap_or(if cfg!(debug_assertions) { 50 } else { 200 });
        Self { enabled, slow_ms }
    }
}

fn flag_enabled(v: &str) -> bool {
    matches!(
        v.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "y" | "on"
    )
}

/// 压成单行并按字符截断
fn one_line_sql(sql: &str, max_chars: usize) -> String {
    let flat = sql.split_whitespace().collect::<Vec<_>>().join(" ");
    match flat.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}…", &flat[..cut]),
        None => flat,
    }
}

/// 覆写慢 SQL 阈值（配置加载后调用）
pub fn set_slow_sql_threshold_ms(ms: u64) {
    SLOW_THRESHOLD_MS.store(ms, Ordering::Relaxed);
}

pub fn is_enabled() -> bool {
    ENABLED.load(Ordering::Relaxed)
}

/// 按环境变量为连接安装 trace/profile 回调
pub fn install_sqlite_tracing(conn: &mut Connection) {
    let settings = PerfSettings::from_lookup(|k| std::env::var(k).ok());
    ENABLED.store(settings.enabled, Ordering::Relaxed);

    if settings.enabled {
        set_slow_sql_threshold_ms(settings.slow_ms);
        conn.trace(Some(on_statement));
        conn.profile(Some(on_profile));
    } else {
        conn.trace(None);
        conn.profile(None);
    }
}

fn on_statement(_sql: &str) {
    if is_enabled() {
        update_tally(|t| {
            if t.open_guards > 0 {
                t.statements = t.statements.saturating_add(1);
            }
        });
    }
}

fn on_profile(sql: &str, duration: Duration) {
    let threshold = SLOW_THRESHOLD_MS.load(Ordering::Relaxed);
    if !is_enabled() || threshold == 0 {
        return;
    }

    let ms = duration.as_millis() as u64;
    if ms < threshold {
        return;
    }
    tracing::warn!(
        target: "slow_sql",
        duration_ms = ms,
        threshold_ms = threshold,
        sql = %one_line_sql(sql, SQL_LOG_CHARS),
        "slow sql"
    );
    update_tally(|t| {
        if t.open_guards > 0 {
            t.slow = t.slow.saturating_add(1);
        }
    });
}

/// 操作级耗时汇总，drop 时输出 target=perf 的 info 日志
///
/// ```ignore
/// let _perf = hr_criteria::perf::PerfGuard::new("criteria_select");
/// ```
pub struct PerfGuard {
    op: &'static str,
    start: Instant,
    baseline: SqlTally,
}

impl PerfGuard {
    pub fn new(op: &'static str) -> Self {
        update_tally(|t| t.open_guards = t.open_guards.saturating_add(1));
        Self {
            op,
            start: Instant::now(),
            baseline: current_tally(),
        }
    }
}

impl Drop for PerfGuard {
    fn drop(&mut self) {
        let now = current_tally();
        if is_enabled() {
            tracing::info!(
                target: "perf",
                op = self.op,
                elapsed_ms = self.start.elapsed().as_millis() as u64,
                sql_count = now.statements.saturating_sub(self.baseline.statements),
                slow_sql_count = now.slow.saturating_sub(self.baseline.slow),
                "done"
            );
        }
        update_tally(|t| t.open_guards = t.open_guards.saturating_sub(1));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_line_sql_cuts_on_char_boundary() {
        let sql = "SELECT *\n  FROM employees\n WHERE name = '张三丰'";
        assert_eq!(
            one_line_sql(sql, 100),
            "SELECT * FROM employees WHERE name = '张三丰'"
        );
        let short = one_line_sql(sql, 40);
        assert_eq!(short.chars().count(), 41);
        assert!(short.ends_with('…'));
    }

    #[test]
    fn test_settings_from_lookup() {
        let settings = PerfSettings::from_lookup(|k| match k {
            ENV_PERF_SQL => Some(" On ".to_string()),
            ENV_SLOW_SQL_MS => Some("75".to_string()),
            _ => None,
        });
        assert_eq!(settings, PerfSettings { enabled: true, slow_ms: 75 });

        let off = PerfSettings::from_lookup(|k| (k == ENV_PERF_SQL).then(|| "0".to_string()));
        assert!(!off.enabled);
    }

    #[test]
    fn test_guard_balances_open_count() {
        let before = current_tally().open_guards;
        {
            let _outer = PerfGuard::new("outer");
            let _inner = PerfGuard::new("inner");
            assert_eq!(current_tally().open_guards, before + 2);
        }
        assert_eq!(current_tally().open_guards, before);
    }
}
