// ==========================================
// 人事管理系统 - 领域模型层
// ==========================================
// 职责: 定义领域实体与强类型状态
// 红线: 不含数据访问逻辑
// ==========================================

pub mod types;

pub mod access;
pub mod attendance;
pub mod audit;
pub mod document;
pub mod employee;
pub mod leave;
pub mod organization;
pub mod payroll;
pub mod review;

// 重导出核心类型
pub use access::{Role, RolePermission};
pub use attendance::{AttendanceBreak, AttendanceRecord};
pub use audit::AuditLog;
pub use document::EmployeeDocument;
pub use employee::Employee;
pub use leave::LeaveRequest;
pub use organization::{Department, Position};
pub use payroll::PayrollAdjustment;
pub use review::PerformanceReview;
pub use types::{
    AdjustmentKind, AdjustmentStatus, AttendanceStatus, AuditAction, BreakType, DocumentType,
    EmployeeStatus, LeaveStatus, LeaveType, PermissionAction, ReviewStatus,
};
