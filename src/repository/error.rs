// ==========================================
// 人事管理系统 - 仓储层错误类型
// ==========================================
// 分类:
// - 条件查询错误（原样透传 QueryError）
// - SQLite 约束/繁忙错误（按扩展错误码区分）
// - 字段映射错误（携带字段路径）
// ==========================================

use crate::query::QueryError;
use rusqlite::{ffi, ErrorCode};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RepositoryError {
    #[error(transparent)]
    Query(#[from] QueryError),

    #[error("{entity} 不存在: id={id}")]
    NotFound { entity: String, id: String },

    // ===== SQLite =====
    #[error("唯一约束冲突: {0}")]
    UniqueConstraintViolation(String),

    #[error("外键约束冲突: {0}")]
    ForeignKeyViolation(String),

    /// NOT NULL / CHECK 等其他约束
    #[error("约束检查失败: {0}")]
    ConstraintViolation(String),

    #[error("数据库繁忙: {0}")]
    DatabaseBusy(String),

    #[error("SQLite 执行失败: {0}")]
    Sqlite(#[source] rusqlite::Error),

    #[error("数据库锁获取失败: {0}")]
    LockError(String),

    // ===== 数据 =====
    #[error("配置校验失败: {0}")]
    ValidationError(String),

    #[error("字段 {field} 取值无效: {message}")]
    FieldValueError { field: String, message: String },

    #[error("内部错误: {0}")]
    InternalError(String),
}

impl RepositoryError {
    pub fn not_found(entity: &str, id: &str) -> Self {
        RepositoryError::NotFound {
            entity: entity.to_string(),
            id: id.to_string(),
        }
    }

    pub fn field_value(field: &str, message: impl Into<String>) -> Self {
        RepositoryError::FieldValueError {
            field: field.to_string(),
            message: message.into(),
        }
    }

    /// 调用方输入错误（未知字段/非法条件/非法分页/非法配置）
    pub fn is_caller_error(&self) -> bool {
        match self {
            RepositoryError::Query(e) => e.is_caller_error(),
            RepositoryError::ValidationError(_) => true,
            _ => false,
        }
    }
}

/// 约束/繁忙类错误映射为专用变体；其余返回 None
fn classify_sqlite(err: &rusqlite::Error) -> Option<RepositoryError> {
    let rusqlite::Error::SqliteFailure(failure, message) = err else {
        return None;
    };
    let detail = message.clone().unwrap_or_else(|| failure.to_string());

    match failure.code {
        ErrorCode::ConstraintViolation => Some(match failure.extended_code {
            ffi::SQLITE_CONSTRAINT_UNIQUE | ffi::SQLITE_CONSTRAINT_PRIMARYKEY => {
                RepositoryError::UniqueConstraintViolation(detail)
            }
            ffi::SQLITE_CONSTRAINT_FOREIGNKEY => RepositoryError::ForeignKeyViolation(detail),
            _ => RepositoryError::ConstraintViolation(detail),
        }),
        ErrorCode::DatabaseBusy | ErrorCode::DatabaseLocked => {
            Some(RepositoryError::DatabaseBusy(detail))
        }
        _ => None,
    }
}

impl From<rusqlite::Error> for RepositoryError {
    fn from(err: rusqlite::Error) -> Self {
        classify_sqlite(&err).unwrap_or(RepositoryError::Sqlite(err))
    }
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;
