use crate::domain::Position;
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
    FieldDef::new("id", "p", "id", FieldKind::Text),
    FieldDef::new("title", "p", "title", FieldKind::Text),
    FieldDef::new("department.id", "p", "department_id", FieldKind::Text),
    FieldDef::new("level", "p", "level", FieldKind::Integer),
    FieldDef::new("min_salary", "p", "min_salary", FieldKind::Real),
    FieldDef::new("max_salary", "p", "max_salary", FieldKind::Real),
    FieldDef::new("active", "p", "active", FieldKind::Bool),
    FieldDef::new("department.name", "d", "name", FieldKind::Text),
];

pub static POSITION_TARGET: QueryTarget = QueryTarget {
    entity: "Position",
    table: "positions",
    alias: "p",
    primary_key: "id",
    fields: FIELDS,
    joins: &[JoinDef {
        table: "departments",
        alias: "d",
        on: "d.id = p.department_id",
    }],
};

impl Entity for Position {
    fn target() -> &'static QueryTarget {
        &POSITION_TARGET
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn from_record(record: &Record) -> RepositoryResult<Self> {
        Ok(Self {
            id: record.text("id")?,
            title: record.text("title")?,
            department_id: record.opt_text("department.id")?,
            level: record.integer("level")?,
            min_salary: record.opt_real("min_salary")?,
            max_salary: record.opt_real("max_salary")?,
            active: record.boolean("active")?,
        })
    }

    fn to_record(&self) -> Record {
        Record::new()
            .with("id", &self.id)
            .with("title", &self.title)
            .with("department.id", self.department_id.as_deref())
            .with("level", self.level)
            .with("min_salary", self.min_salary)
            .with("max_salary", self.max_salary)
            .with("active", self.active)
    }
}

#[derive(Debug, Clone, Default)]
pub struct PositionCriteria {
    pub title: Option<String>,
    pub department_id: Option<String>,
    pub level_min: Option<i64>,
    pub level_max: Option<i64>,
    /// 薪资带覆盖该金额: min_salary <= amount <= max_salary
    pub salary_within_band: Option<f64>,
    pub active: Option<bool>,
}

impl Criteria for PositionCriteria {
    fn to_filters(&self) -> Vec<FilterField> {
        vec![
            FilterField::contains("title", self.title.as_deref()),
            FilterField::equals("department.id", self.department_id.as_deref()),
            FilterField::between("level", self.level_min, self.level_max),
            FilterField::less_or_equal("min_salary", self.salary_within_band),
            FilterField::greater_or_equal("max_salary", self.salary_within_band),
            FilterField::equals("active", self.active),
        ]
    }
}

pub struct PositionRepository {
    inner: EntityRepository<Position>,
}

impl PositionRepository {
    pub fn new(conn: Arc<Mutex<Connection>>, builder: CriteriaQueryBuilder) -> RepositoryResult<Self> {
        Ok(Self {
            inner: EntityRepository::new(conn, builder)?,
        })
    }

    pub fn entities(&self) -> &EntityRepository<Position> {
        &self.inner
    }

    pub fn search(
        &self,
        criteria: &PositionCriteria,
        page: &PageRequest,
    ) -> RepositoryResult<PageResult<Position>> {
        self.inner.search(&criteria.to_filters(), page)
    }

    /// 部门下岗位（职级降序）
    pub fn find_by_department(&self, department_id: &str) -> RepositoryResult<Vec<Position>> {
        self.inner.find_all(
            &[FilterField::equals("department.id", Some(department_id))],
            vec![SortOrder::desc("level")],
        )
    }
}
