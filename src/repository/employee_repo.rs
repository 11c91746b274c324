// ==========================================
// 人事管理系统 - 员工数据仓储
// ==========================================
// 关联: 部门(d) / 岗位(p) / 直属上级(m) 均为 LEFT JOIN 多对一
// 统计: 按在职状态计数与检索共用同一组过滤条件
// ==========================================

use crate::domain::{Employee, EmployeeStatus};
use crate::query::{
    CriteriaQueryBuilder, FieldDef, FieldKind, FilterField, JoinDef, PageRequest, PageResult,
    QueryTarget, Record, SortOrder,
};
use crate::repository::entity_repo::{Criteria, Entity, EntityRepository};
use crate::repository::error::RepositoryResult;
use crate::repository::mapping::RecordExt;
use crate::repository::organization_repo::DepartmentRepository;
use chrono::NaiveDate;
use rusqlite::Connection;
use std::sync::{Arc, Mutex};


static FIELDS: &[FieldDef] = &[
    FieldDef::new("id", "e", "id", FieldKind::Text),
    FieldDef::new("employee_no", "e", "employee_no", FieldKind::Text),
    FieldDef::new("name", "e", "name", FieldKind::Text),
    FieldDef::new("email", "e", "email", FieldKind::Text),
    FieldDef::new("phone", "e", "phone", FieldKind::Text),
    FieldDef::new("department.id", "e", "department_id", FieldKind::Text),
    FieldDef::new("position.id", "e", "position_id", FieldKind::Text),
    FieldDef::new("manager.id", "e", "manager_id", FieldKind::Text),
    FieldDef::new("status", "e", "status", FieldKind::Text),
    FieldDef::new("hire_date", "e", "hire_date", FieldKind::Date),
    FieldDef::new("termination_date", "e", "termination_date", FieldKind::Date),
    FieldDef::new("salary", "e", "salary", FieldKind::Real),
    FieldDef::new("created_at", "e", "created_at", FieldKind::DateTime),
    // ===== 关联字段 =====
    FieldDef::new("department.name", "d", "name", FieldKind::Text),
    FieldDef::new("department.code", "d", "code", FieldKind::Text),
    FieldDef::new("position.title", "p", "title", FieldKind::Text),
    FieldDef::new("manager.name", "m", "name", FieldKind::Text),
];

pub static EMPLOYEE_TARGET: QueryTarget = QueryTarget {
    entity: "Employee",
    table: "employees",
    alias: "e",
    primary_key: "id",
    fields: FIELDS,
    joins: &[
        JoinDef {
            table: "departments",
            alias: "d",
            on: "d.id = e.department_id",
        },
        JoinDef {
            table: "positions",
            alias: "p",
            on: "p.id = e.position_id",
        },
        JoinDef {
            table: "employees",
            alias: "m",
            on: "m.id = e.manager_id",
        },
    ],
};

impl Entity for Employee {
    fn target() -> &'static QueryTarget {
        &EMPLOYEE_TARGET
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn from_record(record: &Record) -> RepositoryResult<Self> {
        Ok(Self {
            id: record.text("id")?,
            employee_no: record.text("employee_no")?,
            name: record.text("name")?,
            email: record.text("email")?,
            phone: record.opt_text("phone")?,
            department_id: record.opt_text("department.id")?,
            position_id: record.opt_text("position.id")?,
            manager_id: record.opt_text("manager.id")?,
            status: record.parsed("status")?,
            hire_date: record.date("hire_date")?,
            termination_date: record.opt_date("termination_date")?,
            salary: record.real("salary")?,
            created_at: record.datetime("created_at")?,
        })
    }

    fn to_record(&self) -> Record {
        Record::new()
            .with("id", &self.id)
            .with("employee_no", &self.employee_no)
            .with("name", &self.name)
            .with("email", &self.email)
            .with("phone", self.phone.as_deref())
            .with("department.id", self.department_id.as_deref())
            .with("position.id", self.position_id.as_deref())
            .with("manager.id", self.manager_id.as_deref())
            .with("status", self.status)
            .with("hire_date", self.hire_date)
            .with("termination_date", self.termination_date)
            .with("salary", self.salary)
            .with("created_at", self.created_at)
    }
}

/// 员工检索条件（None = 不限）
#[derive(Debug, Clone, Default)]
pub struct EmployeeCriteria {
    pub name: Option<String>,
    pub email: Option<String>,
    pub employee_no: Option<String>,
    pub department_id: Option<String>,
    /// 部门集合（通常来自部门子树展开）
    pub department_ids: Option<Vec<String>>,
    pub department_name: Option<String>,
    pub position_id: Option<String>,
    pub manager_id: Option<String>,
    pub status: Option<EmployeeStatus>,
    pub statuses: Option<Vec<EmployeeStatus>>,
    pub hired_from: Option<NaiveDate>,
    pub hired_to: Option<NaiveDate>,
    pub salary_min: Option<f64>,
    pub salary_max: Option<f64>,
}

impl Criteria for EmployeeCriteria {
    fn to_filters(&self) -> Vec<FilterField> {
        vec![
            FilterField::contains("name", self.name.as_deref()),
            FilterField::equals("email", self.email.as_deref()),
            FilterField::equals("employee_no", self.employee_no.as_deref()),
            FilterField::equals("department.id", self.department_id.as_deref()),
            FilterField::in_set("department.id", self.department_ids.clone()),
            FilterField::contains("department.name", self.department_name.as_deref()),
            FilterField::equals("position.id", self.position_id.as_deref()),
            FilterField::equals("manager.id", self.manager_id.as_deref()),
            FilterField::equals("status", self.status),
            FilterField::in_set("status", self.statuses.clone()),
            FilterField::between("hire_date", self.hired_from, self.hired_to),
            FilterField::between("salary", self.salary_min, self.salary_max),
        ]
    }
}

pub struct EmployeeRepository {
    inner: EntityRepository<Employee>,
}

impl EmployeeRepository {
    pub fn new(conn: Arc<Mutex<Connection>>, builder: CriteriaQueryBuilder) -> RepositoryResult<Self> {
        Ok(Self {
            inner: EntityRepository::new(conn, builder)?,
        })
    }

    pub fn entities(&self) -> &EntityRepository<Employee> {
        &self.inner
    }

    pub fn search(
        &self,
        criteria: &EmployeeCriteria,
        page: &PageRequest,
    ) -> RepositoryResult<PageResult<Employee>> {
        self.inner.search(&criteria.to_filters(), page)
    }

    pub fn count(&self, criteria: &EmployeeCriteria) -> RepositoryResult<u64> {
        self.inner.count(&criteria.to_filters())
    }

    pub fn find_by_email(&self, email: &str) -> RepositoryResult<Option<Employee>> {
        self.inner.find_one(&[FilterField::equals("email", Some(email))])
    }

    pub fn exists_by_email(&self, email: &str) -> RepositoryResult<bool> {
        self.inner.exists(&[FilterField::equals("email", Some(email))])
    }

    /// 直接下属（按姓名排序）
    pub fn find_direct_reports(&self, manager_id: &str) -> RepositoryResult<Vec<Employee>> {
        self.inner.find_all(
            &[FilterField::equals("manager.id", Some(manager_id))],
            vec![SortOrder::asc("name")],
        )
    }

    /// 按在职状态计数（全部状态均出现，计数可为 0）
    pub fn count_by_status(
        &self,
        criteria: &EmployeeCriteria,
    ) -> RepositoryResult<Vec<(EmployeeStatus, u64)>> {
        self.inner
            .count_grouped("status", EmployeeStatus::ALL, &criteria.to_filters())
    }

    /// 部门子树内的员工（含 root 部门本身）
    ///
    /// 条件中已有的 department_ids 与子树取交集
    pub fn search_in_department_subtree(
        &self,
        departments: &DepartmentRepository,
        root_department_id: &str,
        criteria: &EmployeeCriteria,
        page: &PageRequest,
    ) -> RepositoryResult<PageResult<Employee>> {
        let ids = departments.find_subtree_ids(root_department_id)?;
        let mut fields = criteria.to_filters();
        fields.push(FilterField::in_set("department.id", Some(ids)));
        self.inner.search(&fields, page)
    }
}
