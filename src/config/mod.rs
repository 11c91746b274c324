// ==========================================
// 人事管理系统 - 配置层
// ==========================================
// 职责: 查询配置管理,支持多级覆写
// 存储: config_kv 表 + 环境变量
// ==========================================

pub mod config_manager;
pub mod query_config;

// 重导出核心配置
pub use config_manager::{config_keys, ConfigManager, GLOBAL_SCOPE};
pub use query_config::QueryConfig;
