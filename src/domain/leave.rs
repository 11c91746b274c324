// ==========================================
// 人事管理系统 - 请假领域模型
// ==========================================

use super::types::{new_id, now_seconds, LeaveStatus, LeaveType};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaveRequest {
    pub id: String,
    pub employee_id: String,
    pub leave_type: LeaveType,
    pub start_date: NaiveDate, // 闭区间起点
    pub end_date: NaiveDate,   // 闭区间终点
    pub status: LeaveStatus,
    pub reason: Option<String>,
    pub approver_id: Option<String>,
    pub created_at: NaiveDateTime,
}

impl LeaveRequest {
    pub fn new(employee_id: &str, leave_type: LeaveType, start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self {
            id: new_id(),
            employee_id: employee_id.to_string(),
            leave_type,
            start_date,
            end_date,
            status: LeaveStatus::Pending,
            reason: None,
            approver_id: None,
            created_at: now_seconds(),
        }
    }

    /// 包含首尾两天的自然日天数
    pub fn days(&self) -> i64 {
        (self.end_date - self.start_date).num_days() + 1
    }

    /// 未被拒绝/撤销的请假占用日历
    pub fn is_active(&self) -> bool {
        !matches!(self.status, LeaveStatus::Rejected | LeaveStatus::Cancelled)
    }
}
