// ==========================================
// 人事管理系统 - 角色与权限领域模型
// ==========================================

use super::types::{new_id, PermissionAction};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Role {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub active: bool,
}

impl Role {
    pub fn new(name: &str) -> Self {
        Self {
            id: new_id(),
            name: name.to_string(),
            description: None,
            active: true,
        }
    }
}

// 权限 = 角色 × 资源 × 动作
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RolePermission {
    pub id: String,
    pub role_id: String,
    pub resource: String,
    pub action: PermissionAction,
}

impl RolePermission {
    pub fn new(role_id: &str, resource: &str, action: PermissionAction) -> Self {
        Self {
            id: new_id(),
            role_id: role_id.to_string(),
            resource: resource.to_string(),
            action,
        }
    }
}
