// ==========================================
// 人事管理系统 - 审计日志数据仓储
// ==========================================
// 红线: 审计日志只追加，不提供修改/删除
// ==========================================

mod core;
mod queries;


pub use core::{AuditLogRepository, AUDIT_LOG_TARGET};
pub use queries::AuditLogCriteria;
