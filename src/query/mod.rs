// ==========================================
// 人事管理系统 - 条件查询层
// ==========================================
// 职责: 各实体"搜索/统计"共用的动态过滤组合引擎
// 红线:
// - 调用方输入错误在访问存储前同步报告
// - 计数与数据查询使用同一谓词
// - 分页排序以主键兜底，保证重复调用结果稳定
// ==========================================

pub mod builder;
pub mod error;
pub mod filter;
pub mod hierarchy;
pub mod memory_store;
pub mod page;
pub mod predicate;
pub mod record;
pub mod sqlite_store;
pub mod store;
pub mod target;
pub mod value;

// 重导出核心类型
pub use builder::{CriteriaQueryBuilder, Query};
pub use error::{QueryError, QueryResult};
pub use filter::{FilterField, FilterOp, Operand};
pub use hierarchy::collect_subtree;
pub use memory_store::MemoryStore;
pub use page::{PageRequest, PageResult, SortDirection, SortOrder, SortSpec};
pub use predicate::{CompareOp, Predicate};
pub use record::Record;
pub use sqlite_store::SqliteStore;
pub use store::TabularStore;
pub use target::{FieldDef, JoinDef, QueryTarget};
pub use value::{FieldKind, Value, DATETIME_FORMAT, DATE_FORMAT};
