// ==========================================
// 人事管理系统 - 核心库
// ==========================================
// 技术栈: Rust + SQLite
// 核心: 条件查询构建器 (过滤字段 → 谓词 → 分页排序查询)
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 条件查询核心 - 谓词/分页/存储抽象
pub mod query;

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 配置层 - 查询配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA/schema）
pub mod db;

// 日志系统
pub mod logging;

// SQL 性能追踪
pub mod perf;

// ==========================================
// 重导出核心类型
// ==========================================

pub use query::{
    CriteriaQueryBuilder, FilterField, PageRequest, PageResult, Predicate, QueryError,
    QueryTarget, Record, SortOrder, TabularStore, Value,
};

pub use domain::{
    AuditLog, Department, Employee, EmployeeStatus, LeaveRequest, LeaveStatus, Position,
};

pub use repository::{RepositoryError, RepositoryResult};

pub use config::{ConfigManager, QueryConfig};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "人事管理系统";
