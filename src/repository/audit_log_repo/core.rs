use crate::domain::AuditLog;
use crate::query::{CriteriaQueryBuilder, FieldDef, FieldKind, QueryTarget, Record, Value};
use crate::repository::entity_repo::{Entity, EntityRepository};
use crate::repository::error::RepositoryResult;
use crate::repository::mapping::RecordExt;
use rusqlite::Connection;
use std::sync::{Arc, Mutex};

static FIELDS: &[FieldDef] = &[
    FieldDef::new("id", "al", "id", FieldKind::Text),
    FieldDef::new("user.id", "al", "user_id", FieldKind::Text),
    FieldDef::new("action", "al", "action", FieldKind::Text),
    FieldDef::new("entity_type", "al", "entity_type", FieldKind::Text),
    FieldDef::new("entity_id", "al", "entity_id", FieldKind::Text),
    FieldDef::new("ip_address", "al", "ip_address", FieldKind::Text),
    FieldDef::new("details", "al", "details", FieldKind::Text),
    FieldDef::new("created_at", "al", "created_at", FieldKind::DateTime),
];

pub static AUDIT_LOG_TARGET: QueryTarget = QueryTarget {
    entity: "AuditLog",
    table: "audit_logs",
    alias: "al",
    primary_key: "id",
    fields: FIELDS,
    joins: &[],
};

impl Entity for AuditLog {
    fn target() -> &'static QueryTarget {
        &AUDIT_LOG_TARGET
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn from_record(record: &Record) -> RepositoryResult<Self> {
        Ok(Self {
            id: record.text("id")?,
            user_id: record.opt_text("user.id")?,
            action: record.parsed("action")?,
            entity_type: record.text("entity_type")?,
            entity_id: record.opt_text("entity_id")?,
            ip_address: record.opt_text("ip_address")?,
            details: record.opt_json("details")?,
            created_at: record.datetime("created_at")?,
        })
    }

    fn to_record(&self) -> Record {
        Record::new()
            .with("id", &self.id)
            .with("user.id", self.user_id.as_deref())
            .with("action", self.action)
            .with("entity_type", &self.entity_type)
            .with("entity_id", self.entity_id.as_deref())
            .with("ip_address", self.ip_address.as_deref())
            .with("details", self.details.as_ref().map(|d| Value::Text(d.to_string())))
            .with("created_at", self.created_at)
    }
}

// ==========================================
// AuditLogRepository - 审计日志仓储
// ==========================================
// 红线: Repository 不做业务逻辑,只做数据映射
pub struct AuditLogRepository {
    pub(super) inner: EntityRepository<AuditLog>,
}

impl AuditLogRepository {
    pub fn new(conn: Arc<Mutex<Connection>>, builder: CriteriaQueryBuilder) -> RepositoryResult<Self> {
        Ok(Self {
            inner: EntityRepository::new(conn, builder)?,
        })
    }

    // ==========================================
    // 写入操作
    // ==========================================

    /// 追加审计日志，返回日志 id
    pub fn insert(&self, log: &AuditLog) -> RepositoryResult<String> {
        let id = self.inner.insert(log)?;
        tracing::debug!(
            audit_id = %id,
            action = %log.action,
            entity_type = %log.entity_type,
            "审计日志已记录"
        );
        Ok(id)
    }

    /// 批量追加（单事务）
    pub fn batch_insert(&self, logs: &[AuditLog]) -> RepositoryResult<usize> {
        self.inner.insert_all(logs)
    }
}
