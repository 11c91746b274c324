use crate::domain::{AttendanceRecord, AttendanceStatus};
use crate::query::{
    CriteriaQueryBuilder, FieldDef, FieldKind, FilterField, JoinDef, PageRequest, PageResult,
    QueryTarget, Record, SortOrder,
};
use crate::repository::entity_repo::{Criteria, Entity, EntityRepository};
use crate::repository::error::RepositoryResult;
use crate::repository::mapping::RecordExt;
use chrono::NaiveDate;
use rusqlite::Connection;
use std::sync::{Arc, Mutex};

static FIELDS: &[FieldDef] = &[
    FieldDef::new("id", "a", "id", FieldKind::Text),
    FieldDef::new("employee.id", "a", "employee_id", FieldKind::Text),
    FieldDef::new("work_date", "a", "work_date", FieldKind::Date),
    FieldDef::new("check_in", "a", "check_in", FieldKind::DateTime),
    FieldDef::new("check_out", "a", "check_out", FieldKind::DateTime),
    FieldDef::new("status", "a", "status", FieldKind::Text),
    FieldDef::new("notes", "a", "notes", FieldKind::Text),
    FieldDef::new("employee.name", "e", "name", FieldKind::Text),
    FieldDef::new("employee.department.id", "e", "department_id", FieldKind::Text),
];

pub static ATTENDANCE_TARGET: QueryTarget = QueryTarget {
    entity: "AttendanceRecord",
    table: "attendance_records",
    alias: "a",
    primary_key: "id",
    fields: FIELDS,
    joins: &[JoinDef {
        table: "employees",
        alias: "e",
        on: "e.id = a.employee_id",
    }],
};

impl Entity for AttendanceRecord {
    fn target() -> &'static QueryTarget {
        &ATTENDANCE_TARGET
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn from_record(record: &Record) -> RepositoryResult<Self> {
        Ok(Self {
            id: record.text("id")?,
            employee_id: record.text("employee.id")?,
            work_date: record.date("work_date")?,
            check_in: record.datetime("check_in")?,
            check_out: record.opt_datetime("check_out")?,
            status: record.parsed("status")?,
            notes: record.opt_text("notes")?,
        })
    }

    fn to_record(&self) -> Record {
        Record::new()
            .with("id", &self.id)
            .with("employee.id", &self.employee_id)
            .with("work_date", self.work_date)
            .with("check_in", self.check_in)
            .with("check_out", self.check_out)
            .with("status", self.status)
            .with("notes", self.notes.as_deref())
    }
}

#[derive(Debug, Clone, Default)]
pub struct AttendanceCriteria {
    pub employee_id: Option<String>,
    pub department_id: Option<String>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    pub status: Option<AttendanceStatus>,
}

impl Criteria for AttendanceCriteria {
    fn to_filters(&self) -> Vec<FilterField> {
        vec![
            FilterField::equals("employee.id", self.employee_id.as_deref()),
            FilterField::equals("employee.department.id", self.department_id.as_deref()),
            FilterField::between("work_date", self.date_from, self.date_to),
            FilterField::equals("status", self.status),
        ]
    }
}

pub struct AttendanceRepository {
    inner: EntityRepository<AttendanceRecord>,
}

impl AttendanceRepository {
    pub fn new(conn: Arc<Mutex<Connection>>, builder: CriteriaQueryBuilder) -> RepositoryResult<Self> {
        Ok(Self {
            inner: EntityRepository::new(conn, builder)?,
        })
    }

    pub fn entities(&self) -> &EntityRepository<AttendanceRecord> {
        &self.inner
    }

    pub fn search(
        &self,
        criteria: &AttendanceCriteria,
        page: &PageRequest,
    ) -> RepositoryResult<PageResult<AttendanceRecord>> {
        self.inner.search(&criteria.to_filters(), page)
    }

    pub fn count(&self, criteria: &AttendanceCriteria) -> RepositoryResult<u64> {
        self.inner.count(&criteria.to_filters())
    }

    /// 员工某日考勤
    pub fn find_for_day(&self, employee_id: &str, work_date: NaiveDate) -> RepositoryResult<Option<AttendanceRecord>> {
        self.inner.find_one(&[
            FilterField::equals("employee.id", Some(employee_id)),
            FilterField::equals("work_date", Some(work_date)),
        ])
    }

    /// 未打卡下班的记录（可选限定员工），按签到时间排序
    pub fn find_open_records(&self, employee_id: Option<&str>) -> RepositoryResult<Vec<AttendanceRecord>> {
        self.inner.find_all(
            &[
                FilterField::equals("employee.id", employee_id),
                FilterField::is_null("check_out"),
            ],
            vec![SortOrder::asc("check_in")],
        )
    }
}
