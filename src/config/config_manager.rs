// ==========================================
// 人事管理系统 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写管理
// 存储: config_kv 表 (key-value + scope)
// ==========================================

use super::query_config::{env_keys, QueryConfig};
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

/// 全局作用域 ID
pub const GLOBAL_SCOPE: &str = "global";

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 从已有连接创建 ConfigManager
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 从 config_kv 表读取配置值（scope_id='global'）
    ///
    /// # 返回
    /// - Some(String): 配置值
    /// - None: 配置不存在
    pub fn get_config_value(&self, key: &str) -> RepositoryResult<Option<String>> {
        let conn = self.get_conn()?;
        let value = conn
            .query_row(
                "SELECT value FROM config_kv WHERE scope_id = ?1 AND key = ?2",
                params![GLOBAL_SCOPE, key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    /// 写入配置值（存在则覆盖）
    pub fn set_config_value(&self, key: &str, value: &str) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO config_kv (scope_id, key, value, updated_at)
            VALUES (?1, ?2, ?3, datetime('now'))
            ON CONFLICT(scope_id, key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            "#,
            params![GLOBAL_SCOPE, key, value],
        )?;
        tracing::info!(config_key = key, value, "配置已更新");
        Ok(())
    }

    /// 获取全部 global 配置快照
    pub fn get_config_snapshot(&self) -> RepositoryResult<BTreeMap<String, String>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            "SELECT key, value FROM config_kv WHERE scope_id = ?1 ORDER BY key",
        )?;
        let rows = stmt.query_map(params![GLOBAL_SCOPE], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut snapshot = BTreeMap::new();
        for row in rows {
            let (key, value) = row?;
            snapshot.insert(key, value);
        }
        Ok(snapshot)
    }

    /// 加载查询配置: 默认值 → config_kv → 环境变量
    pub fn load_query_config(&self) -> RepositoryResult<QueryConfig> {
        let snapshot = self.get_config_snapshot()?;
        let config = QueryConfig::default()
            .with_overrides(|env_key| {
                config_keys::for_env_key(env_key).and_then(|k| snapshot.get(k).cloned())
            })
            .with_overrides(|env_key| std::env::var(env_key).ok());

        config.validate().map_err(RepositoryError::ValidationError)?;
        tracing::debug!(?config, "查询配置已加载");
        Ok(config)
    }
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    use super::env_keys;

    pub const DEFAULT_PAGE_SIZE: &str = "query.default_page_size";
    pub const MAX_PAGE_SIZE: &str = "query.max_page_size";
    pub const QUERY_TIMEOUT_MS: &str = "query.timeout_ms";
    pub const SLOW_SQL_MS: &str = "query.slow_sql_ms";

    /// 环境变量名 → config_kv 键
    pub fn for_env_key(env_key: &str) -> Option<&'static str> {
        match env_key {
            env_keys::DEFAULT_PAGE_SIZE => Some(DEFAULT_PAGE_SIZE),
            env_keys::MAX_PAGE_SIZE => Some(MAX_PAGE_SIZE),
            env_keys::QUERY_TIMEOUT_MS => Some(QUERY_TIMEOUT_MS),
            env_keys::SLOW_SQL_MS => Some(SLOW_SQL_MS),
            _ => None,
        }
    }
}
