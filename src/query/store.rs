// ==========================================
// 人事管理系统 - 表格存储接口 (TabularStore)
// ==========================================
// 职责: 条件查询构建器对持久层的全部依赖
// - describe_schema: 字段路径校验
// - run_count / run_select: 同一谓词上的计数与窗口查询
// 约束: 超时由存储实现负责中断并以 QueryError::Timeout 报告；不做重试
// ==========================================

use super::error::QueryResult;
use super::page::SortOrder;
use super::predicate::Predicate;
use super::target::QueryTarget;
use std::collections::BTreeSet;
use std::time::Instant;

pub trait TabularStore {
    type Row;

    /// 存储中实际存在的字段路径
    fn describe_schema(&self, target: &QueryTarget) -> QueryResult<BTreeSet<String>>;

    /// 满足谓词的行数
    fn run_count(
        &self,
        target: &QueryTarget,
        predicate: &Predicate,
        deadline: Option<Instant>,
    ) -> QueryResult<u64>;

    /// 满足谓词的窗口数据
    fn run_select(
        &self,
        target: &QueryTarget,
        predicate: &Predicate,
        sort: &[SortOrder],
        offset: u64,
        limit: u64,
        deadline: Option<Instant>,
    ) -> QueryResult<Vec<Self::Row>>;
}

impl<S: TabularStore + ?Sized> TabularStore for &S {
    type Row = S::Row;

    fn describe_schema(&self, target: &QueryTarget) -> QueryResult<BTreeSet<String>> {
        (**self).describe_schema(target)
    }

    fn run_count(
        &self,
        target: &QueryTarget,
        predicate: &Predicate,
        deadline: Option<Instant>,
    ) -> QueryResult<u64> {
        (**self).run_count(target, predicate, deadline)
    }

    fn run_select(
        &self,
        target: &QueryTarget,
        predicate: &Predicate,
        sort: &[SortOrder],
        offset: u64,
        limit: u64,
        deadline: Option<Instant>,
    ) -> QueryResult<Vec<Self::Row>> {
        (**self).run_select(target, predicate, sort, offset, limit, deadline)
    }
}
