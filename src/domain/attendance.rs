// ==========================================
// 人事管理系统 - 考勤领域模型
// ==========================================

use super::types::{new_id, AttendanceStatus, BreakType};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

// ==========================================
// AttendanceRecord - 日考勤
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttendanceRecord {
    pub id: String,
    pub employee_id: String,
    pub work_date: NaiveDate,
    pub check_in: NaiveDateTime,
    pub check_out: Option<NaiveDateTime>, // None = 未打卡下班
    pub status: AttendanceStatus,
    pub notes: Option<String>,
}

impl AttendanceRecord {
    pub fn open(employee_id: &str, check_in: NaiveDateTime, status: AttendanceStatus) -> Self {
        Self {
            id: new_id(),
            employee_id: employee_id.to_string(),
            work_date: check_in.date(),
            check_in,
            check_out: None,
            status,
            notes: None,
        }
    }

    /// 工作时长（分钟），未打卡下班时为 None
    pub fn worked_minutes(&self) -> Option<i64> {
        self.check_out.map(|out| (out - self.check_in).num_minutes())
    }
}

// ==========================================
// AttendanceBreak - 考勤休息时段
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttendanceBreak {
    pub id: String,
    pub attendance_id: String,
    pub break_type: BreakType,
    pub break_start: NaiveDateTime,
    pub break_end: NaiveDateTime,
}

impl AttendanceBreak {
    pub fn new(
        attendance_id: &str,
        break_type: BreakType,
        break_start: NaiveDateTime,
        break_end: NaiveDateTime,
    ) -> Self {
        Self {
            id: new_id(),
            attendance_id: attendance_id.to_string(),
            break_type,
            break_start,
            break_end,
        }
    }
}
