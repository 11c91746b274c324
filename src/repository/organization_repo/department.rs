use crate::domain::Department;
use crate::query::{
    collect_subtree, CriteriaQueryBuilder, FieldDef, FieldKind, FilterField, JoinDef, PageRequest,
    PageResult, QueryTarget, Record, SortOrder,
};
use crate::repository::entity_repo::{Criteria, Entity, EntityRepository};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::mapping::RecordExt;
use rusqlite::Connection;
use std::sync::{Arc, Mutex};

static FIELDS: &[FieldDef] = &[
    FieldDef::new("id", "d", "id", FieldKind::Text),
    FieldDef::new("code", "d", "code", FieldKind::Text),
    FieldDef::new("name", "d", "name", FieldKind::Text),
    FieldDef::new("parent.id", "d", "parent_id", FieldKind::Text),
    FieldDef::new("active", "d", "active", FieldKind::Bool),
    FieldDef::new("created_at", "d", "created_at", FieldKind::DateTime),
    FieldDef::new("parent.name", "pd", "name", FieldKind::Text),
];

pub static DEPARTMENT_TARGET: QueryTarget = QueryTarget {
    entity: "Department",
    table: "departments",
    alias: "d",
    primary_key: "id",
    fields: FIELDS,
    joins: &[JoinDef {
        table: "departments",
        alias: "pd",
        on: "pd.id = d.parent_id",
    }],
};

impl Entity for Department {
    fn target() -> &'static QueryTarget {
        &DEPARTMENT_TARGET
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn from_record(record: &Record) -> RepositoryResult<Self> {
        Ok(Self {
            id: record.text("id")?,
            code: record.text("code")?,
            name: record.text("name")?,
            parent_id: record.opt_text("parent.id")?,
            active: record.boolean("active")?,
            created_at: record.datetime("created_at")?,
        })
    }

    fn to_record(&self) -> Record {
        Record::new()
            .with("id", &self.id)
            .with("code", &self.code)
            .with("name", &self.name)
            .with("parent.id", self.parent_id.as_deref())
            .with("active", self.active)
            .with("created_at", self.created_at)
    }
}

/// 部门检索条件（None = 不限）
#[derive(Debug, Clone, Default)]
pub struct DepartmentCriteria {
    pub name: Option<String>,
    pub code: Option<String>,
    pub parent_id: Option<String>,
    pub parent_name: Option<String>,
    pub active: Option<bool>,
    /// true: 仅顶级部门
    pub root_only: bool,
}

impl Criteria for DepartmentCriteria {
    fn to_filters(&self) -> Vec<FilterField> {
        let mut filters = vec![
            FilterField::contains("name", self.name.as_deref()),
            FilterField::equals("code", self.code.as_deref()),
            FilterField::equals("parent.id", self.parent_id.as_deref()),
            FilterField::contains("parent.name", self.parent_name.as_deref()),
            FilterField::equals("active", self.active),
        ];
        if self.root_only {
            filters.push(FilterField::is_null("parent.id"));
        }
        filters
    }
}

pub struct DepartmentRepository {
    inner: EntityRepository<Department>,
}

impl DepartmentRepository {
    pub fn new(conn: Arc<Mutex<Connection>>, builder: CriteriaQueryBuilder) -> RepositoryResult<Self> {
        Ok(Self {
            inner: EntityRepository::new(conn, builder)?,
        })
    }

    /// 通用增删改查
    pub fn entities(&self) -> &EntityRepository<Department> {
        &self.inner
    }

    pub fn search(
        &self,
        criteria: &DepartmentCriteria,
        page: &PageRequest,
    ) -> RepositoryResult<PageResult<Department>> {
        self.inner.search(&criteria.to_filters(), page)
    }

    pub fn find_by_code(&self, code: &str) -> RepositoryResult<Option<Department>> {
        self.inner.find_one(&[FilterField::equals("code", Some(code))])
    }

    /// 直接下级部门（按名称排序）
    pub fn find_children(&self, parent_id: &str) -> RepositoryResult<Vec<Department>> {
        self.inner.find_all(
            &[FilterField::equals("parent.id", Some(parent_id))],
            vec![SortOrder::asc("name")],
        )
    }

    /// root 及其全部后代部门 id（广度优先，root 在首位）
    ///
    /// root 不存在时返回 NotFound
    pub fn find_subtree_ids(&self, root_id: &str) -> RepositoryResult<Vec<String>> {
        if !self.inner.exists(&[FilterField::equals("id", Some(root_id))])? {
            return Err(RepositoryError::not_found("Department", root_id));
        }

        let conn = self.inner.get_conn()?;
        let mut stmt = conn.prepare("SELECT id, parent_id FROM departments")?;
        let edges = stmt
            .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, Option<String>>(1)?)))?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        let ids = collect_subtree(edges, &root_id.to_string());
        tracing::debug!(root_id, size = ids.len(), "部门子树已展开");
        Ok(ids)
    }
}
