// ==========================================
// 人事管理系统 - 角色与权限数据仓储
// ==========================================
// 权限判定仅做存在性查询，不含鉴权逻辑
// ==========================================

use crate::domain::{PermissionAction, Role, RolePermission};
use crate::query::{
    CriteriaQueryBuilder, FieldDef, FieldKind, FilterField, JoinDef, PageRequest, PageResult,
    QueryTarget, Record, SortOrder,
};
use crate::repository::entity_repo::{Criteria, Entity, EntityRepository};
use crate::repository::error::RepositoryResult;
use crate::repository::mapping::RecordExt;
use rusqlite::Connection;
use std::sync::{Arc, Mutex};

static ROLE_FIELDS: &[FieldDef] = &[
    FieldDef::new("id", "ro", "id", FieldKind::Text),
    FieldDef::new("name", "ro", "name", FieldKind::Text),
    FieldDef::new("description", "ro", "description", FieldKind::Text),
    FieldDef::new("active", "ro", "active", FieldKind::Bool),
];

pub static ROLE_TARGET: QueryTarget = QueryTarget {
    entity: "Role",
    table: "roles",
    alias: "ro",
    primary_key: "id",
    fields: ROLE_FIELDS,
    joins: &[],
};

static PERMISSION_FIELDS: &[FieldDef] = &[
    FieldDef::new("id", "rp", "id", FieldKind::Text),
    FieldDef::new("role.id", "rp", "role_id", FieldKind::Text),
    FieldDef::new("resource", "rp", "resource", FieldKind::Text),
    FieldDef::new("action", "rp", "action", FieldKind::Text),
    FieldDef::new("role.name", "ro", "name", FieldKind::Text),
    FieldDef::new("role.active", "ro", "active", FieldKind::Bool),
];

pub static PERMISSION_TARGET: QueryTarget = QueryTarget {
    entity: "RolePermission",
    table: "role_permissions",
    alias: "rp",
    primary_key: "id",
    fields: PERMISSION_FIELDS,
    joins: &[JoinDef {
        table: "roles",
        alias: "ro",
        on: "ro.id = rp.role_id",
    }],
};

impl Entity for Role {
    fn target() -> &'static QueryTarget {
        &ROLE_TARGET
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn from_record(record: &Record) -> RepositoryResult<Self> {
        Ok(Self {
            id: record.text("id")?,
            name: record.text("name")?,
            description: record.opt_text("description")?,
            active: record.boolean("active")?,
        })
    }

    fn to_record(&self) -> Record {
        Record::new()
            .with("id", &self.id)
            .with("name", &self.name)
            .with("description", self.description.as_deref())
            .with("active", self.active)
    }
}

impl Entity for RolePermission {
    fn target() -> &'static QueryTarget {
        &PERMISSION_TARGET
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn from_record(record: &Record) -> RepositoryResult<Self> {
        Ok(Self {
            id: record.text("id")?,
            role_id: record.text("role.id")?,
            resource: record.text("resource")?,
            action: record.parsed("action")?,
        })
    }

    fn to_record(&self) -> Record {
        Record::new()
            .with("id", &self.id)
            .with("role.id", &self.role_id)
            .with("resource", &self.resource)
            .with("action", self.action)
    }
}

#[derive(Debug, Clone, Default)]
pub struct RoleCriteria {
    pub name: Option<String>,
    pub active: Option<bool>,
}

impl Criteria for RoleCriteria {
    fn to_filters(&self) -> Vec<FilterField> {
        vec![
            FilterField::contains("name", self.name.as_deref()),
            FilterField::equals("active", self.active),
        ]
    }
}

#[derive(Debug, Clone, Default)]
pub struct PermissionCriteria {
    pub role_id: Option<String>,
    pub resource: Option<String>,
    pub action: Option<PermissionAction>,
}

impl Criteria for PermissionCriteria {
    fn to_filters(&self) -> Vec<FilterField> {
        vec![
            FilterField::equals("role.id", self.role_id.as_deref()),
            FilterField::equals("resource", self.resource.as_deref()),
            FilterField::equals("action", self.action),
        ]
    }
}

pub struct AccessRepository {
    roles: EntityRepository<Role>,
    permissions: EntityRepository<RolePermission>,
}

impl AccessRepository {
    pub fn new(conn: Arc<Mutex<Connection>>, builder: CriteriaQueryBuilder) -> RepositoryResult<Self> {
        Ok(Self {
            roles: EntityRepository::new(Arc::clone(&conn), builder.clone())?,
            permissions: EntityRepository::new(conn, builder)?,
        })
    }

    pub fn roles(&self) -> &EntityRepository<Role> {
        &self.roles
    }

    pub fn permissions(&self) -> &EntityRepository<RolePermission> {
        &self.permissions
    }

    pub fn search_roles(&self, criteria: &RoleCriteria, page: &PageRequest) -> RepositoryResult<PageResult<Role>> {
        self.roles.search(&criteria.to_filters(), page)
    }

    pub fn find_role_by_name(&self, name: &str) -> RepositoryResult<Option<Role>> {
        self.roles.find_one(&[FilterField::equals("name", Some(name))])
    }

    pub fn find_permissions(&self, criteria: &PermissionCriteria) -> RepositoryResult<Vec<RolePermission>> {
        self.permissions.find_all(
            &criteria.to_filters(),
            vec![SortOrder::asc("resource"), SortOrder::asc("action")],
        )
    }

    /// 角色是否拥有 resource 上的 action 权限（停用角色视为无权限）
    pub fn role_has_permission(
        &self,
        role_id: &str,
        resource: &str,
        action: PermissionAction,
    ) -> RepositoryResult<bool> {
        let mut filters = PermissionCriteria {
            role_id: Some(role_id.to_string()),
            resource: Some(resource.to_string()),
            action: Some(action),
        }
        .to_filters();
        filters.push(FilterField::equals("role.active", Some(true)));
        self.permissions.exists(&filters)
    }
}
