// ==========================================
// 人事管理系统 - 审计日志领域模型
// ==========================================
// 红线: 写操作均应留痕；日志只追加不修改
// ==========================================

use super::types::{new_id, now_seconds, AuditAction};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditLog {
    pub id: String,
    pub user_id: Option<String>, // 系统操作为 None
    pub action: AuditAction,
    pub entity_type: String,
    pub entity_id: Option<String>,
    pub ip_address: Option<String>,
    pub details: Option<JsonValue>, // 变更详情 (JSON)
    pub created_at: NaiveDateTime,
}

impl AuditLog {
    pub fn new(user_id: Option<&str>, action: AuditAction, entity_type: &str, entity_id: Option<&str>) -> Self {
        Self {
            id: new_id(),
            user_id: user_id.map(str::to_string),
            action,
            entity_type: entity_type.to_string(),
            entity_id: entity_id.map(str::to_string),
            ip_address: None,
            details: None,
            created_at: now_seconds(),
        }
    }

    pub fn with_details(mut self, details: JsonValue) -> Self {
        self.details = Some(details);
        self
    }

    pub fn from_ip(mut self, ip: &str) -> Self {
        self.ip_address = Some(ip.to_string());
        self
    }
}
