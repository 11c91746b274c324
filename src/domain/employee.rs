// ==========================================
// 人事管理系统 - 员工领域模型
// ==========================================
// 关系以外键 id 表达（部门/岗位/直属上级），不持有反向引用
// ==========================================

use super::types::{new_id, now_seconds, EmployeeStatus};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Employee {
    pub id: String,
    pub employee_no: String,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub department_id: Option<String>,
    pub position_id: Option<String>,
    pub manager_id: Option<String>,
    pub status: EmployeeStatus,
    pub hire_date: NaiveDate,
    pub termination_date: Option<NaiveDate>,
    pub salary: f64,
    pub created_at: NaiveDateTime,
}

impl Employee {
    pub fn new(employee_no: &str, name: &str, email: &str, hire_date: NaiveDate, salary: f64) -> Self {
        Self {
            id: new_id(),
            employee_no: employee_no.to_string(),
            name: name.to_string(),
            email: email.to_string(),
            phone: None,
            department_id: None,
            position_id: None,
            manager_id: None,
            status: EmployeeStatus::Active,
            hire_date,
            termination_date: None,
            salary,
            created_at: now_seconds(),
        }
    }

    pub fn in_department(mut self, department_id: &str) -> Self {
        self.department_id = Some(department_id.to_string());
        self
    }

    pub fn reporting_to(mut self, manager_id: &str) -> Self {
        self.manager_id = Some(manager_id.to_string());
        self
    }

    pub fn with_status(mut self, status: EmployeeStatus) -> Self {
        self.status = status;
        self
    }
}
