// ==========================================
// 人事管理系统 - 内存表格存储
// ==========================================
// 职责: 在进程内对 Record 集合求值谓词（嵌入场景/测试）
// 语义与 SqliteStore 对齐:
// - NULL 比较为假，升序时 NULL 在前
// - contains 两侧统一 Unicode 小写
// ==========================================

use super::error::{QueryError, QueryResult};
use super::page::{SortDirection, SortOrder};
use super::predicate::Predicate;
use super::record::Record;
use super::store::TabularStore;
use super::target::QueryTarget;
use std::collections::BTreeSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::RwLock;
use std::time::Instant;

#[derive(Debug, Default)]
pub struct MemoryStore {
    rows: RwLock<Vec<Record>>,
    count_calls: AtomicUsize,
    select_calls: AtomicUsize,
}

impl MemoryStore {
    pub fn new(rows: Vec<Record>) -> Self {
        Self {
            rows: RwLock::new(rows),
            ..Self::default()
        }
    }

    pub fn insert(&self, record: Record) -> QueryResult<()> {
        let mut rows = self
            .rows
            .write()
            .map_err(|e| QueryError::StoreExecution(format!("内存存储锁获取失败: {}", e)))?;
        rows.push(record);
        Ok(())
    }

    /// run_count 调用次数
    pub fn count_calls(&self) -> usize {
        self.count_calls.load(Ordering::Relaxed)
    }

    /// run_select 调用次数
    pub fn select_calls(&self) -> usize {
        self.select_calls.load(Ordering::Relaxed)
    }

    fn matching(&self, predicate: &Predicate) -> QueryResult<Vec<Record>> {
        let rows = self
            .rows
            .read()
            .map_err(|e| QueryError::StoreExecution(format!("内存存储锁获取失败: {}", e)))?;
        Ok(rows.iter().filter(|r| predicate.matches(r)).cloned().collect())
    }
}

fn check_deadline(deadline: Option<Instant>) -> QueryResult<()> {
    match deadline {
        Some(d) if Instant::now() >= d => Err(QueryError::Timeout("内存查询超过截止时间".to_string())),
        _ => Ok(()),
    }
}

impl TabularStore for MemoryStore {
    type Row = Record;

    fn describe_schema(&self, target: &QueryTarget) -> QueryResult<BTreeSet<String>> {
        Ok(target.known_paths())
    }

    fn run_count(
        &self,
        _target: &QueryTarget,
        predicate: &Predicate,
        deadline: Option<Instant>,
    ) -> QueryResult<u64> {
        self.count_calls.fetch_add(1, Ordering::Relaxed);
        check_deadline(deadline)?;
        Ok(self.matching(predicate)?.len() as u64)
    }

    fn run_select(
        &self,
        _target: &QueryTarget,
        predicate: &Predicate,
        sort: &[SortOrder],
        offset: u64,
        limit: u64,
        deadline: Option<Instant>,
    ) -> QueryResult<Vec<Record>> {
        self.select_calls.fetch_add(1, Ordering::Relaxed);
        check_deadline(deadline)?;

        let mut rows = self.matching(predicate)?;
        rows.sort_by(|a, b| {
            for order in sort {
                let ord = a.get(&order.path).sort_cmp(b.get(&order.path));
                let ord = match order.direction {
                    SortDirection::Asc => ord,
                    SortDirection::Desc => ord.reverse(),
                };
                if ord != std::cmp::Ordering::Equal {
                    return ord;
                }
            }
            std::cmp::Ordering::Equal
        });

        Ok(rows
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect())
    }
}
