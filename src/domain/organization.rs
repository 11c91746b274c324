// ==========================================
// 人事管理系统 - 组织结构领域模型
// ==========================================
// 部门（邻接表 parent_id）与岗位
// ==========================================

use super::types::{new_id, now_seconds};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

// ==========================================
// Department - 部门
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Department {
    pub id: String,
    pub code: String,
    pub name: String,
    pub parent_id: Option<String>, // 上级部门（顶级为 None）
    pub active: bool,
    pub created_at: NaiveDateTime,
}

impl Department {
    pub fn new(code: &str, name: &str, parent_id: Option<&str>) -> Self {
        Self {
            id: new_id(),
            code: code.to_string(),
            name: name.to_string(),
            parent_id: parent_id.map(str::to_string),
            active: true,
            created_at: now_seconds(),
        }
    }
}

// ==========================================
// Position - 岗位
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub id: String,
    pub title: String,
    pub department_id: Option<String>,
    pub level: i64,
    pub min_salary: Option<f64>, // 薪资带下限
    pub max_salary: Option<f64>, // 薪资带上限
    pub active: bool,
}

impl Position {
    pub fn new(title: &str, department_id: Option<&str>, level: i64) -> Self {
        Self {
            id: new_id(),
            title: title.to_string(),
            department_id: department_id.map(str::to_string),
            level,
            min_salary: None,
            max_salary: None,
            active: true,
        }
    }

    pub fn with_salary_band(mut self, min: f64, max: f64) -> Self {
        self.min_salary = Some(min);
        self.max_salary = Some(max);
        self
    }
}
