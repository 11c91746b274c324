// ==========================================
// 人事管理系统 - 绩效评估数据仓储
// ==========================================

use crate::domain::{PerformanceReview, ReviewStatus};
use crate::query::{
    CriteriaQueryBuilder, FieldDef, FieldKind, FilterField, JoinDef, PageRequest, PageResult,
    QueryTarget, Record, SortOrder,
};
use crate::repository::entity_repo::{Criteria, Entity, EntityRepository};
use crate::repository::error::RepositoryResult;
use crate::repository::mapping::RecordExt;
use rusqlite::Connection;
use std::sync::{Arc, Mutex};

static FIELDS: &[FieldDef] = &[
    FieldDef::new("id", "r", "id", FieldKind::Text),
    FieldDef::new("employee.id", "r", "employee_id", FieldKind::Text),
    FieldDef::new("reviewer.id", "r", "reviewer_id", FieldKind::Text),
    FieldDef::new("period", "r", "period", FieldKind::Text),
    FieldDef::new("review_date", "r", "review_date", FieldKind::Date),
    FieldDef::new("rating", "r", "rating", FieldKind::Real),
    FieldDef::new("status", "r", "status", FieldKind::Text),
    FieldDef::new("comments", "r", "comments", FieldKind::Text),
    FieldDef::new("employee.department.id", "e", "department_id", FieldKind::Text),
    FieldDef::new("reviewer.name", "rv", "name", FieldKind::Text),
];

pub static REVIEW_TARGET: QueryTarget = QueryTarget {
    entity: "PerformanceReview",
    table: "performance_reviews",
    alias: "r",
    primary_key: "id",
    fields: FIELDS,
    joins: &[
        JoinDef {
            table: "employees",
            alias: "e",
            on: "e.id = r.employee_id",
        },
        JoinDef {
            table: "employees",
            alias: "rv",
            on: "rv.id = r.reviewer_id",
        },
    ],
};

impl Entity for PerformanceReview {
    fn target() -> &'static QueryTarget {
        &REVIEW_TARGET
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn from_record(record: &Record) -> RepositoryResult<Self> {
        Ok(Self {
            id: record.text("id")?,
            employee_id: record.text("employee.id")?,
            reviewer_id: record.opt_text("reviewer.id")?,
            period: record.text("period")?,
            review_date: record.date("review_date")?,
            rating: record.opt_real("rating")?,
            status: record.parsed("status")?,
            comments: record.opt_text("comments")?,
        })
    }

    fn to_record(&self) -> Record {
        Record::new()
            .with("id", &self.id)
            .with("employee.id", &self.employee_id)
            .with("reviewer.id", self.reviewer_id.as_deref())
            .with("period", &self.period)
            .with("review_date", self.review_date)
            .with("rating", self.rating)
            .with("status", self.status)
            .with("comments", self.comments.as_deref())
    }
}

#[derive(Debug, Clone, Default)]
pub struct ReviewCriteria {
    pub employee_id: Option<String>,
    pub reviewer_id: Option<String>,
    pub department_id: Option<String>,
    pub status: Option<ReviewStatus>,
    pub period: Option<String>,
    pub rating_min: Option<f64>,
    pub rating_max: Option<f64>,
}

impl Criteria for ReviewCriteria {
    fn to_filters(&self) -> Vec<FilterField> {
        vec![
            FilterField::equals("employee.id", self.employee_id.as_deref()),
            FilterField::equals("reviewer.id", self.reviewer_id.as_deref()),
            FilterField::equals("employee.department.id", self.department_id.as_deref()),
            FilterField::equals("status", self.status),
            FilterField::equals("period", self.period.as_deref()),
            FilterField::between("rating", self.rating_min, self.rating_max),
        ]
    }
}

pub struct ReviewRepository {
    inner: EntityRepository<PerformanceReview>,
}

impl ReviewRepository {
    pub fn new(conn: Arc<Mutex<Connection>>, builder: CriteriaQueryBuilder) -> RepositoryResult<Self> {
        Ok(Self {
            inner: EntityRepository::new(conn, builder)?,
        })
    }

    pub fn entities(&self) -> &EntityRepository<PerformanceReview> {
        &self.inner
    }

    pub fn search(
        &self,
        criteria: &ReviewCriteria,
        page: &PageRequest,
    ) -> RepositoryResult<PageResult<PerformanceReview>> {
        self.inner.search(&criteria.to_filters(), page)
    }

    /// 员工最近一次评估（评估日期最新者）
    pub fn find_latest_for_employee(&self, employee_id: &str) -> RepositoryResult<Option<PerformanceReview>> {
        let page = PageRequest::first(1).sorted_by(SortOrder::desc("review_date"));
        let result = self
            .inner
            .search(&[FilterField::equals("employee.id", Some(employee_id))], &page)?;
        Ok(result.items.into_iter().next())
    }
}
