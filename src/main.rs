// ==========================================
// 人事管理系统 - 命令行入口
// ==========================================
// 用法: hr-criteria [DB_PATH]
// 日志: HR_CRITERIA_LOG_FORMAT=json 输出 JSON 日志（stderr）
// 输出: 员工在职状态统计 + 最近审计日志（JSON）
// ==========================================

use anyhow::Context;
use hr_criteria::config::ConfigManager;
use hr_criteria::query::CriteriaQueryBuilder;
use hr_criteria::repository::{
    AuditLogCriteria, AuditLogRepository, EmployeeCriteria, EmployeeRepository,
};
use hr_criteria::{db, logging, perf};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

fn main() -> anyhow::Result<()> {
    logging::init_from_env();

    let db_path = std::env::args().nth(1).unwrap_or_else(db::default_db_path);
    tracing::info!("{} v{}", hr_criteria::APP_NAME, hr_criteria::VERSION);
    tracing::info!("使用数据库: {}", db_path);

    let conn = db::open_sqlite_connection(&db_path)
        .with_context(|| format!("无法打开数据库: {}", db_path))?;
    db::init_schema(&conn).context("初始化 schema 失败")?;
    let conn = Arc::new(Mutex::new(conn));

    let config = ConfigManager::new(Arc::clone(&conn))
        .load_query_config()
        .context("加载查询配置失败")?;
    perf::set_slow_sql_threshold_ms(config.slow_sql_ms);
    let builder = CriteriaQueryBuilder::new(config);

    let employees = EmployeeRepository::new(Arc::clone(&conn), builder.clone())?;
    let by_status: BTreeMap<String, u64> = employees
        .count_by_status(&EmployeeCriteria::default())?
        .into_iter()
        .map(|(status, count)| (status.to_string(), count))
        .collect();

    let recent_page = builder.default_page();
    let audit = AuditLogRepository::new(Arc::clone(&conn), builder)?;
    let recent = audit.search(&AuditLogCriteria::default(), &recent_page)?;

    let report = serde_json::json!({
        "employees_by_status": by_status,
        "recent_audit_logs": {
            "total": recent.total,
            "items": recent.items,
        },
    });
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
