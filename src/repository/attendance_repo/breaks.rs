use crate::domain::AttendanceBreak;
use crate::query::{
    CriteriaQueryBuilder, FieldDef, FieldKind, FilterField, JoinDef, Predicate, QueryTarget,
    Record, SortOrder,
};
use crate::repository::entity_repo::{Entity, EntityRepository};
use crate::repository::error::RepositoryResult;
use crate::repository::mapping::RecordExt;
use chrono::NaiveDateTime;
use rusqlite::Connection;
use std::sync::{Arc, Mutex};

static FIELDS: &[FieldDef] = &[
    FieldDef::new("id", "b", "id", FieldKind::Text),
    FieldDef::new("attendance.id", "b", "attendance_id", FieldKind::Text),
    FieldDef::new("break_type", "b", "break_type", FieldKind::Text),
    FieldDef::new("break_start", "b", "break_start", FieldKind::DateTime),
    FieldDef::new("break_end", "b", "break_end", FieldKind::DateTime),
    FieldDef::new("attendance.employee.id", "a", "employee_id", FieldKind::Text),
    FieldDef::new("attendance.work_date", "a", "work_date", FieldKind::Date),
];

pub static BREAK_TARGET: QueryTarget = QueryTarget {
    entity: "AttendanceBreak",
    table: "attendance_breaks",
    alias: "b",
    primary_key: "id",
    fields: FIELDS,
    joins: &[JoinDef {
        table: "attendance_records",
        alias: "a",
        on: "a.id = b.attendance_id",
    }],
};

impl Entity for AttendanceBreak {
    fn target() -> &'static QueryTarget {
        &BREAK_TARGET
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn from_record(record: &Record) -> RepositoryResult<Self> {
        Ok(Self {
            id: record.text("id")?,
            attendance_id: record.text("attendance.id")?,
            break_type: record.parsed("break_type")?,
            break_start: record.datetime("break_start")?,
            break_end: record.datetime("break_end")?,
        })
    }

    fn to_record(&self) -> Record {
        Record::new()
            .with("id", &self.id)
            .with("attendance.id", &self.attendance_id)
            .with("break_type", self.break_type)
            .with("break_start", self.break_start)
            .with("break_end", self.break_end)
    }
}

pub struct AttendanceBreakRepository {
    inner: EntityRepository<AttendanceBreak>,
}

impl AttendanceBreakRepository {
    pub fn new(conn: Arc<Mutex<Connection>>, builder: CriteriaQueryBuilder) -> RepositoryResult<Self> {
        Ok(Self {
            inner: EntityRepository::new(conn, builder)?,
        })
    }

    pub fn entities(&self) -> &EntityRepository<AttendanceBreak> {
        &self.inner
    }

    /// 某条考勤下的休息时段（按开始时间）
    pub fn find_by_attendance(&self, attendance_id: &str) -> RepositoryResult<Vec<AttendanceBreak>> {
        self.inner.find_all(
            &[FilterField::equals("attendance.id", Some(attendance_id))],
            vec![SortOrder::asc("break_start")],
        )
    }

    /// 员工与候选区间 [start, end] 重叠的休息时段（闭区间）
    pub fn find_overlapping(
        &self,
        employee_id: &str,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> RepositoryResult<Vec<AttendanceBreak>> {
        let predicate = self.overlap_predicate(employee_id, start, end)?;
        self.inner
            .find_where(predicate, vec![SortOrder::asc("break_start")])
    }

    pub fn has_overlapping(
        &self,
        employee_id: &str,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> RepositoryResult<bool> {
        let predicate = self.overlap_predicate(employee_id, start, end)?;
        Ok(self.inner.count_where(&predicate)? > 0)
    }

    fn overlap_predicate(
        &self,
        employee_id: &str,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> RepositoryResult<Predicate> {
        let owner = self.inner.builder().build_filter(
            &BREAK_TARGET,
            &[FilterField::equals("attendance.employee.id", Some(employee_id))],
        )?;
        let overlap = Predicate::overlaps("break_start", "break_end", start, end)?;
        Ok(owner.and(overlap))
    }
}
