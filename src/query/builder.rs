// ==========================================
// 人事管理系统 - 条件查询构建器
// ==========================================
// 职责: 可选过滤字段 + 排序分页 → 谓词 → 单次查询 → 分页结果
// 流程:
// 1. build_filter: 校验字段路径/类型，省略未生效条件，合取为一个谓词
// 2. paginate_and_sort: 校验分页，追加主键兜底排序，计算窗口与截止时间
// 3. execute: 同一谓词上执行计数与窗口查询
// 约束:
// - 调用方输入错误必须在任何存储访问之前报告
// - 无内部状态（配置只读），不重试
// ==========================================

use super::error::{QueryError, QueryResult};
use super::filter::{FilterField, FilterOp, Operand};
use super::page::{PageRequest, PageResult, SortOrder, SortSpec};
use super::predicate::{CompareOp, Predicate};
use super::store::TabularStore;
use super::target::{FieldDef, QueryTarget};
use super::value::{FieldKind, Value};
use crate::config::QueryConfig;
use std::cmp::Ordering;
use std::time::{Duration, Instant};

#[cfg(test)]
mod tests;

/// 可执行查询
#[derive(Debug, Clone, PartialEq)]
pub struct Query<'t> {
    pub target: &'t QueryTarget,
    pub predicate: Predicate,
    /// 最终排序（已包含主键兜底）
    pub sort: SortSpec,
    pub offset: u64,
    pub limit: u64,
    pub page: u64,
    pub deadline: Option<Instant>,
}

impl<'t> Query<'t> {
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }
}

#[derive(Debug, Clone, Default)]
pub struct CriteriaQueryBuilder {
    config: QueryConfig,
}

impl CriteriaQueryBuilder {
    pub fn new(config: QueryConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &QueryConfig {
        &self.config
    }

    /// 第一页，页大小取配置的 default_page_size
    pub fn default_page(&self) -> PageRequest {
        PageRequest::first(self.config.default_page_size)
    }

    // ==========================================
    // 谓词构建
    // ==========================================

    /// 将生效的过滤字段合取为单个谓词
    ///
    /// 全部字段未生效时返回 `Predicate::All`
    pub fn build_filter(
        &self,
        target: &QueryTarget,
        fields: &[FilterField],
    ) -> QueryResult<Predicate> {
        let mut parts = Vec::with_capacity(fields.len());
        for field in fields {
            if let Some(predicate) = build_field(target, field)? {
                parts.push(predicate);
            }
        }
        Ok(Predicate::all_of(parts))
    }

    // ==========================================
    // 排序与分页
    // ==========================================

    /// 附加排序与分页窗口
    ///
    /// 排序末尾追加主键升序（若调用方未指定），保证重复分页结果稳定
    pub fn paginate_and_sort<'t>(
        &self,
        target: &'t QueryTarget,
        predicate: Predicate,
        page: &PageRequest,
    ) -> QueryResult<Query<'t>> {
        for path in predicate.paths() {
            resolve(target, path)?;
        }

        let (offset, limit) = page.window(self.config.max_page_size)?;
        let sort = stable_sort(target, &page.sort)?;

        Ok(Query {
            target,
            predicate,
            sort,
            offset,
            limit,
            page: page.page as u64,
            deadline: self.config.query_timeout.map(|t| Instant::now() + t),
        })
    }

    // ==========================================
    // 执行
    // ==========================================

    /// 执行计数 + 窗口查询
    pub fn execute<S: TabularStore>(
        &self,
        store: &S,
        query: &Query<'_>,
    ) -> QueryResult<PageResult<S::Row>> {
        check_deadline(query.deadline, query.target)?;
        let total = store.run_count(query.target, &query.predicate, query.deadline)?;

        if total == 0 || query.offset >= total {
            tracing::debug!(
                entity = query.target.entity,
                total,
                offset = query.offset,
                "窗口超出结果范围，跳过数据查询"
            );
            return Ok(PageResult::new(Vec::new(), total, query.page, query.limit));
        }

        check_deadline(query.deadline, query.target)?;
        let rows = store.run_select(
            query.target,
            &query.predicate,
            &query.sort,
            query.offset,
            query.limit,
            query.deadline,
        )?;

        tracing::debug!(
            entity = query.target.entity,
            total,
            page = query.page,
            rows = rows.len(),
            "条件查询完成"
        );

        Ok(PageResult::new(rows, total, query.page, query.limit))
    }

    /// build_filter + paginate_and_sort + execute
    pub fn search<S: TabularStore>(
        &self,
        store: &S,
        target: &QueryTarget,
        fields: &[FilterField],
        page: &PageRequest,
    ) -> QueryResult<PageResult<S::Row>> {
        let predicate = self.build_filter(target, fields)?;
        let query = self.paginate_and_sort(target, predicate, page)?;
        self.execute(store, &query)
    }

    /// 统计满足谓词的行数
    pub fn count<S: TabularStore>(
        &self,
        store: &S,
        target: &QueryTarget,
        predicate: &Predicate,
    ) -> QueryResult<u64> {
        for path in predicate.paths() {
            resolve(target, path)?;
        }
        let deadline = self.config.query_timeout.map(|t| Instant::now() + t);
        store.run_count(target, predicate, deadline)
    }

    /// 校验存储 schema 覆盖目标声明的全部字段
    pub fn verify_schema<S: TabularStore>(&self, store: &S, target: &QueryTarget) -> QueryResult<()> {
        let known = store.describe_schema(target)?;
        match target.fields.iter().find(|f| !known.contains(f.path)) {
            Some(missing) => Err(QueryError::unknown_field(target.entity, missing.path)),
            None => Ok(()),
        }
    }
}

fn resolve<'a>(target: &'a QueryTarget, path: &str) -> QueryResult<&'static FieldDef> {
    target
        .field(path)
        .ok_or_else(|| QueryError::unknown_field(target.entity, path))
}

fn check_deadline(deadline: Option<Instant>, target: &QueryTarget) -> QueryResult<()> {
    match deadline {
        Some(d) if Instant::now() >= d => Err(QueryError::Timeout(format!(
            "查询 {} 超过截止时间",
            target.entity
        ))),
        _ => Ok(()),
    }
}

fn stable_sort(target: &QueryTarget, requested: &[SortOrder]) -> QueryResult<SortSpec> {
    let mut sort = Vec::with_capacity(requested.len() + 1);
    for order in requested {
        resolve(target, &order.path)?;
        sort.push(order.clone());
    }
    if !sort.iter().any(|o| o.path == target.primary_key) {
        sort.push(SortOrder::asc(target.primary_key));
    }
    Ok(sort)
}

fn check_kind(def: &FieldDef, value: &Value) -> QueryResult<()> {
    if def.kind.accepts(value) {
        Ok(())
    } else {
        Err(QueryError::invalid_filter(
            def.path,
            format!("值类型 {} 与字段类型 {} 不匹配", value.kind_name(), def.kind),
        ))
    }
}

fn check_ordered(def: &FieldDef, op: FilterOp) -> QueryResult<()> {
    if def.kind.is_ordered() {
        Ok(())
    } else {
        Err(QueryError::invalid_filter(
            def.path,
            format!("{} 类型字段不支持 {}", def.kind, op.as_str()),
        ))
    }
}

fn build_field(target: &QueryTarget, field: &FilterField) -> QueryResult<Option<Predicate>> {
    let def = resolve(target, &field.path)?;
    if !field.is_applied() {
        return Ok(None);
    }
    let path = def.path;

    let predicate = match (field.op, field.operand.as_ref()) {
        (FilterOp::IsNull, _) => Predicate::IsNull {
            path: path.to_string(),
        },
        (FilterOp::IsNotNull, _) => Predicate::IsNotNull {
            path: path.to_string(),
        },

        (FilterOp::Contains, Some(Operand::Single(value))) => {
            if def.kind != FieldKind::Text {
                return Err(QueryError::invalid_filter(path, "contains 仅适用于文本字段"));
            }
            let needle = value
                .as_text()
                .ok_or_else(|| QueryError::invalid_filter(path, "contains 需要文本值"))?;
            Predicate::Contains {
                path: path.to_string(),
                needle: needle.to_lowercase(),
            }
        }

        (op, Some(Operand::Single(value))) => {
            let compare = match op {
                FilterOp::Equals => CompareOp::Eq,
                FilterOp::NotEquals => CompareOp::Ne,
                FilterOp::GreaterThan => CompareOp::Gt,
                FilterOp::GreaterOrEqual => CompareOp::Gte,
                FilterOp::LessThan => CompareOp::Lt,
                FilterOp::LessOrEqual => CompareOp::Lte,
                other => {
                    return Err(QueryError::invalid_filter(
                        path,
                        format!("{} 不接受单值操作数", other.as_str()),
                    ))
                }
            };
            check_kind(def, value)?;
            if !matches!(compare, CompareOp::Eq | CompareOp::Ne) {
                check_ordered(def, op)?;
            }
            Predicate::compare(path, compare, value.clone())
        }

        (FilterOp::Between, Some(Operand::Range(low, high))) => {
            check_ordered(def, FilterOp::Between)?;
            match (low, high) {
                (Some(low), Some(high)) => {
                    check_kind(def, low)?;
                    check_kind(def, high)?;
                    match low.compare(high) {
                        Some(Ordering::Greater) => {
                            return Err(QueryError::invalid_filter(
                                path,
                                format!("区间下界 {} 大于上界 {}", low, high),
                            ))
                        }
                        None => {
                            return Err(QueryError::invalid_filter(path, "区间边界不可比较"))
                        }
                        _ => Predicate::Between {
                            path: path.to_string(),
                            low: low.clone(),
                            high: high.clone(),
                        },
                    }
                }
                (Some(low), None) => {
                    check_kind(def, low)?;
                    Predicate::compare(path, CompareOp::Gte, low.clone())
                }
                (None, Some(high)) => {
                    check_kind(def, high)?;
                    Predicate::compare(path, CompareOp::Lte, high.clone())
                }
                (None, None) => return Ok(None),
            }
        }

        (FilterOp::InSet, Some(Operand::Set(values))) => {
            if values.is_empty() {
                return Err(QueryError::invalid_filter(path, "in_set 集合不能为空"));
            }
            for value in values {
                if value.is_null() {
                    return Err(QueryError::invalid_filter(path, "in_set 集合成员不能为 NULL"));
                }
                check_kind(def, value)?;
            }
            Predicate::InSet {
                path: path.to_string(),
                values: values.clone(),
            }
        }

        (op, _) => {
            return Err(QueryError::invalid_filter(
                path,
                format!("操作符 {} 的操作数形式不正确", op.as_str()),
            ))
        }
    };

    Ok(Some(predicate))
}
