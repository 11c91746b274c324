use super::core::AuditLogRepository;
use crate::domain::{AuditAction, AuditLog};
use crate::query::{FilterField, PageRequest, PageResult, SortOrder};
use crate::repository::entity_repo::Criteria;
use crate::repository::error::RepositoryResult;
use chrono::NaiveDateTime;

/// 审计日志检索条件（None = 不限）
#[derive(Debug, Clone, Default)]
pub struct AuditLogCriteria {
    pub user_id: Option<String>,
    pub action: Option<AuditAction>,
    pub actions: Option<Vec<AuditAction>>,
    pub entity_type: Option<String>,
    pub entity_id: Option<String>,
    pub ip_address: Option<String>,
    pub created_from: Option<NaiveDateTime>,
    pub created_to: Option<NaiveDateTime>,
    /// 详情 JSON 文本包含（大小写不敏感）
    pub details: Option<String>,
    /// true: 仅系统操作（无 user_id）
    pub system_only: bool,
}

impl Criteria for AuditLogCriteria {
    fn to_filters(&self) -> Vec<FilterField> {
        let mut filters = vec![
            FilterField::equals("user.id", self.user_id.as_deref()),
            FilterField::equals("action", self.action),
            FilterField::in_set("action", self.actions.clone()),
            FilterField::equals("entity_type", self.entity_type.as_deref()),
            FilterField::equals("entity_id", self.entity_id.as_deref()),
            FilterField::equals("ip_address", self.ip_address.as_deref()),
            FilterField::between("created_at", self.created_from, self.created_to),
            FilterField::contains("details", self.details.as_deref()),
        ];
        if self.system_only {
            filters.push(FilterField::is_null("user.id"));
        }
        filters
    }
}

impl AuditLogRepository {
    // ==========================================
    // 查询操作
    // ==========================================

    pub fn find_by_id(&self, id: &str) -> RepositoryResult<Option<AuditLog>> {
        self.inner.find_by_id(id)
    }

    /// 条件检索；未指定排序时按时间倒序
    pub fn search(
        &self,
        criteria: &AuditLogCriteria,
        page: &PageRequest,
    ) -> RepositoryResult<PageResult<AuditLog>> {
        let page = newest_first(page);
        self.inner.search(&criteria.to_filters(), &page)
    }

    /// 某实体的变更历史（时间倒序）
    pub fn find_by_entity(
        &self,
        entity_type: &str,
        entity_id: &str,
        page: &PageRequest,
    ) -> RepositoryResult<PageResult<AuditLog>> {
        let criteria = AuditLogCriteria {
            entity_type: Some(entity_type.to_string()),
            entity_id: Some(entity_id.to_string()),
            ..Default::default()
        };
        self.search(&criteria, page)
    }

    pub fn count(&self, criteria: &AuditLogCriteria) -> RepositoryResult<u64> {
        self.inner.count(&criteria.to_filters())
    }

    /// 按动作计数（全部动作均出现）
    pub fn count_by_action(&self, criteria: &AuditLogCriteria) -> RepositoryResult<Vec<(AuditAction, u64)>> {
        self.inner
            .count_grouped("action", AuditAction::ALL, &criteria.to_filters())
    }
}

fn newest_first(page: &PageRequest) -> PageRequest {
    if page.sort.is_empty() {
        page.clone().sorted_by(SortOrder::desc("created_at"))
    } else {
        page.clone()
    }
}
