// ==========================================
// 人事管理系统 - 请假数据仓储
// ==========================================
// 冲突检测: 同一员工有效请假（排除已拒绝/已撤销）日期闭区间重叠
// ==========================================

use crate::domain::{LeaveRequest, LeaveStatus, LeaveType};
use crate::query::{
    CriteriaQueryBuilder, FieldDef, FieldKind, FilterField, JoinDef, PageRequest, PageResult,
    Predicate, QueryTarget, Record, SortOrder,
};
use crate::repository::entity_repo::{Criteria, Entity, EntityRepository};
use crate::repository::error::RepositoryResult;
use crate::repository::mapping::RecordExt;
use chrono::NaiveDate;
use rusqlite::Connection;
use std::sync::{Arc, Mutex};

/// 不占用日历的状态
const INACTIVE_STATUSES: [LeaveStatus; 2] = [LeaveStatus::Rejected, LeaveStatus::Cancelled];

static FIELDS: &[FieldDef] = &[
    FieldDef::new("id", "l", "id", FieldKind::Text),
    FieldDef::new("employee.id", "l", "employee_id", FieldKind::Text),
    FieldDef::new("leave_type", "l", "leave_type", FieldKind::Text),
    FieldDef::new("start_date", "l", "start_date", FieldKind::Date),
    FieldDef::new("end_date", "l", "end_date", FieldKind::Date),
    FieldDef::new("status", "l", "status", FieldKind::Text),
    FieldDef::new("reason", "l", "reason", FieldKind::Text),
    FieldDef::new("approver.id", "l", "approver_id", FieldKind::Text),
    FieldDef::new("created_at", "l", "created_at", FieldKind::DateTime),
    FieldDef::new("employee.name", "e", "name", FieldKind::Text),
    FieldDef::new("employee.department.id", "e", "department_id", FieldKind::Text),
];

pub static LEAVE_TARGET: QueryTarget = QueryTarget {
    entity: "LeaveRequest",
    table: "leave_requests",
    alias: "l",
    primary_key: "id",
    fields: FIELDS,
    joins: &[JoinDef {
        table: "employees",
        alias: "e",
        on: "e.id = l.employee_id",
    }],
};

impl Entity for LeaveRequest {
    fn target() -> &'static QueryTarget {
        &LEAVE_TARGET
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn from_record(record: &Record) -> RepositoryResult<Self> {
        Ok(Self {
            id: record.text("id")?,
            employee_id: record.text("employee.id")?,
            leave_type: record.parsed("leave_type")?,
            start_date: record.date("start_date")?,
            end_date: record.date("end_date")?,
            status: record.parsed("status")?,
            reason: record.opt_text("reason")?,
            approver_id: record.opt_text("approver.id")?,
            created_at: record.datetime("created_at")?,
        })
    }

    fn to_record(&self) -> Record {
        Record::new()
            .with("id", &self.id)
            .with("employee.id", &self.employee_id)
            .with("leave_type", self.leave_type)
            .with("start_date", self.start_date)
            .with("end_date", self.end_date)
            .with("status", self.status)
            .with("reason", self.reason.as_deref())
            .with("approver.id", self.approver_id.as_deref())
            .with("created_at", self.created_at)
    }
}

#[derive(Debug, Clone, Default)]
pub struct LeaveCriteria {
    pub employee_id: Option<String>,
    pub department_id: Option<String>,
    pub leave_type: Option<LeaveType>,
    pub status: Option<LeaveStatus>,
    /// 开始日期范围
    pub start_from: Option<NaiveDate>,
    pub start_to: Option<NaiveDate>,
}

impl Criteria for LeaveCriteria {
    fn to_filters(&self) -> Vec<FilterField> {
        vec![
            FilterField::equals("employee.id", self.employee_id.as_deref()),
            FilterField::equals("employee.department.id", self.department_id.as_deref()),
            FilterField::equals("leave_type", self.leave_type),
            FilterField::equals("status", self.status),
            FilterField::between("start_date", self.start_from, self.start_to),
        ]
    }
}

pub struct LeaveRepository {
    inner: EntityRepository<LeaveRequest>,
}

impl LeaveRepository {
    pub fn new(conn: Arc<Mutex<Connection>>, builder: CriteriaQueryBuilder) -> RepositoryResult<Self> {
        Ok(Self {
            inner: EntityRepository::new(conn, builder)?,
        })
    }

    pub fn entities(&self) -> &EntityRepository<LeaveRequest> {
        &self.inner
    }

    pub fn search(
        &self,
        criteria: &LeaveCriteria,
        page: &PageRequest,
    ) -> RepositoryResult<PageResult<LeaveRequest>> {
        self.inner.search(&criteria.to_filters(), page)
    }

    /// 与 [start, end] 重叠的有效请假
    ///
    /// `exclude_id`: 修改已有请假时排除自身
    pub fn find_overlapping(
        &self,
        employee_id: &str,
        start: NaiveDate,
        end: NaiveDate,
        exclude_id: Option<&str>,
    ) -> RepositoryResult<Vec<LeaveRequest>> {
        let scope = self.inner.builder().build_filter(
            &LEAVE_TARGET,
            &[
                FilterField::equals("employee.id", Some(employee_id)),
                FilterField::not_equals("id", exclude_id),
            ],
        )?;
        let inactive = self.inner.builder().build_filter(
            &LEAVE_TARGET,
            &[FilterField::in_set("status", Some(INACTIVE_STATUSES))],
        )?;
        let overlap = Predicate::overlaps("start_date", "end_date", start, end)?;

        let predicate = Predicate::all_of(vec![scope, inactive.negate(), overlap]);
        self.inner
            .find_where(predicate, vec![SortOrder::asc("start_date")])
    }

    /// 按审批状态计数
    pub fn count_by_status(&self, criteria: &LeaveCriteria) -> RepositoryResult<Vec<(LeaveStatus, u64)>> {
        self.inner
            .count_grouped("status", LeaveStatus::ALL, &criteria.to_filters())
    }
}
