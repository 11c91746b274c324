// ==========================================
// 人事管理系统 - 数据仓储层
// ==========================================
// 红线: Repository 不含业务逻辑
// ==========================================
// 职责: 提供数据访问接口,屏蔽数据库细节
// 约束: 所有读操作经条件查询构建器,全部参数化
// ==========================================

pub mod access_repo;
pub mod attendance_repo;
pub mod audit_log_repo;
pub mod document_repo;
pub mod employee_repo;
pub mod entity_repo;
pub mod error;
pub mod leave_repo;
pub mod mapping;
pub mod organization_repo;
pub mod payroll_repo;
pub mod review_repo;

#[cfg(test)]
pub(crate) mod test_support;

// 重导出核心仓储
pub use access_repo::{AccessRepository, PermissionCriteria, RoleCriteria};
pub use attendance_repo::{AttendanceBreakRepository, AttendanceCriteria, AttendanceRepository};
pub use audit_log_repo::{AuditLogCriteria, AuditLogRepository};
pub use document_repo::{DocumentCriteria, DocumentRepository};
pub use employee_repo::{EmployeeCriteria, EmployeeRepository};
pub use entity_repo::{Criteria, Entity, EntityRepository};
pub use error::{RepositoryError, RepositoryResult};
pub use leave_repo::{LeaveCriteria, LeaveRepository};
pub use mapping::RecordExt;
pub use organization_repo::{
    DepartmentCriteria, DepartmentRepository, PositionCriteria, PositionRepository,
};
pub use payroll_repo::{PayrollCriteria, PayrollRepository};
pub use review_repo::{ReviewCriteria, ReviewRepository};
