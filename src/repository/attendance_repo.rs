// ==========================================
// 人事管理系统 - 考勤数据仓储
// ==========================================
// 日考勤 + 休息时段
// 休息时段重叠: existing.start <= cand.end AND existing.end >= cand.start
// ==========================================

mod breaks;
mod record;

#[cfg(test)]
mod tests;

pub use breaks::{AttendanceBreakRepository, BREAK_TARGET};
pub use record::{AttendanceCriteria, AttendanceRepository, ATTENDANCE_TARGET};
