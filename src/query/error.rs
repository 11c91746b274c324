// ==========================================
// 人事管理系统 - 查询层错误类型
// ==========================================
// 工具: thiserror 派生宏
// 分类:
// - 调用方输入错误 (UnknownField / InvalidFilter / InvalidPageRequest)
//   在访问存储之前同步报告
// - 存储执行错误 (Timeout / StoreExecution)
//   原样上抛,不重试,不降级
// ==========================================

use thiserror::Error;

/// 查询层错误类型
#[derive(Error, Debug, Clone, PartialEq)]
pub enum QueryError {
    // ===== 调用方输入错误 =====
    #[error("未知字段路径: entity={entity}, path={path}")]
    UnknownField { entity: String, path: String },

    #[error("无效过滤条件 (path={path}): {message}")]
    InvalidFilter { path: String, message: String },

    #[error("无效分页请求: {0}")]
    InvalidPageRequest(String),

    // ===== 存储执行错误 =====
    #[error("查询超时: {0}")]
    Timeout(String),

    #[error("存储执行失败: {0}")]
    StoreExecution(String),
}

impl QueryError {
    pub(crate) fn unknown_field(entity: &str, path: &str) -> Self {
        QueryError::UnknownField {
            entity: entity.to_string(),
            path: path.to_string(),
        }
    }

    pub(crate) fn invalid_filter(path: &str, message: impl Into<String>) -> Self {
        QueryError::InvalidFilter {
            path: path.to_string(),
            message: message.into(),
        }
    }

    /// 是否为调用方输入错误（未触达存储）
    pub fn is_caller_error(&self) -> bool {
        matches!(
            self,
            QueryError::UnknownField { .. }
                | QueryError::InvalidFilter { .. }
                | QueryError::InvalidPageRequest(_)
        )
    }
}

/// Result 类型别名
pub type QueryResult<T> = Result<T, QueryError>;
