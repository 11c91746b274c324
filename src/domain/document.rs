// ==========================================
// 人事管理系统 - 员工文档领域模型
// ==========================================

use super::types::{new_id, now_seconds, DocumentType};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmployeeDocument {
    pub id: String,
    pub employee_id: String,
    pub doc_type: DocumentType,
    pub title: String,
    pub file_path: String,
    pub verified: bool,
    pub issued_date: Option<NaiveDate>,
    pub expiry_date: Option<NaiveDate>, // None = 长期有效
    pub uploaded_at: NaiveDateTime,
}

impl EmployeeDocument {
    pub fn new(employee_id: &str, doc_type: DocumentType, title: &str, file_path: &str) -> Self {
        Self {
            id: new_id(),
            employee_id: employee_id.to_string(),
            doc_type,
            title: title.to_string(),
            file_path: file_path.to_string(),
            verified: false,
            issued_date: None,
            expiry_date: None,
            uploaded_at: now_seconds(),
        }
    }

    pub fn expires_on(mut self, date: NaiveDate) -> Self {
        self.expiry_date = Some(date);
        self
    }
}
