// ==========================================
// 人事管理系统 - 查询配置
// ==========================================
// 来源优先级（低 → 高）:
// 1. 默认值
// 2. config_kv 表 (scope_id='global')，见 ConfigManager
// 3. 环境变量 HR_CRITERIA_*
// ==========================================

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// 默认页大小
pub const DEFAULT_PAGE_SIZE: i64 = 20;

/// 页大小上限
pub const DEFAULT_MAX_PAGE_SIZE: u64 = 500;

/// 慢 SQL 阈值（毫秒）
pub const DEFAULT_SLOW_SQL_MS: u64 = 200;

pub mod env_keys {
    pub const DEFAULT_PAGE_SIZE: &str = "HR_CRITERIA_DEFAULT_PAGE_SIZE";
    pub const MAX_PAGE_SIZE: &str = "HR_CRITERIA_MAX_PAGE_SIZE";
    pub const QUERY_TIMEOUT_MS: &str = "HR_CRITERIA_QUERY_TIMEOUT_MS";
    pub const SLOW_SQL_MS: &str = "HR_CRITERIA_SLOW_SQL_MS";
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryConfig {
    pub default_page_size: i64,
    pub max_page_size: u64,
    /// 单次查询超时；None 表示不限
    pub query_timeout: Option<Duration>,
    pub slow_sql_ms: u64,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            default_page_size: DEFAULT_PAGE_SIZE,
            max_page_size: DEFAULT_MAX_PAGE_SIZE,
            query_timeout: None,
            slow_sql_ms: DEFAULT_SLOW_SQL_MS,
        }
    }
}

impl QueryConfig {
    /// 默认值 + 环境变量覆写
    pub fn from_env() -> Self {
        Self::default().with_overrides(|key| std::env::var(key).ok())
    }

    /// 使用键值来源覆写（键为环境变量名）
    ///
    /// 无法解析的值记录告警并保持原值
    pub fn with_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = parse_override::<i64>(&lookup, env_keys::DEFAULT_PAGE_SIZE) {
            self.default_page_size = v;
        }
        if let Some(v) = parse_override::<u64>(&lookup, env_keys::MAX_PAGE_SIZE) {
            self.max_page_size = v;
        }
        if let Some(v) = parse_override::<u64>(&lookup, env_keys::QUERY_TIMEOUT_MS) {
            // 0 = 不限
            self.query_timeout = (v > 0).then(|| Duration::from_millis(v));
        }
        if let Some(v) = parse_override::<u64>(&lookup, env_keys::SLOW_SQL_MS) {
            self.slow_sql_ms = v;
        }
        self
    }

    /// 校验配置自洽
    pub fn validate(&self) -> Result<(), String> {
        if self.max_page_size == 0 {
            return Err("max_page_size 必须为正整数".to_string());
        }
        if self.default_page_size <= 0 || self.default_page_size as u64 > self.max_page_size {
            return Err(format!(
                "default_page_size={} 超出范围 (1..={})",
                self.default_page_size, self.max_page_size
            ));
        }
        Ok(())
    }
}

fn parse_override<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
) -> Option<T> {
    let raw = lookup(key)?;
    match raw.trim().parse::<T>() {
        Ok(v) => Some(v),
        Err(_) => {
            tracing::warn!(config_key = key, value = %raw, "配置值解析失败，使用原值");
            None
        }
    }
}
