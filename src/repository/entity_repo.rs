// ==========================================
// 人事管理系统 - 通用实体仓储
// ==========================================
// 职责: 以 QueryTarget 描述实体，统一提供增删改查/搜索/统计
// 流程: 过滤字段 → CriteriaQueryBuilder → SqliteStore → Record → 实体
// 红线:
// - Repository 不含业务逻辑，只做数据映射
// - 读操作全部经过条件查询构建器（计数与数据同一谓词）
// ==========================================

use super::error::{RepositoryError, RepositoryResult};
use crate::query::{
    CriteriaQueryBuilder, FilterField, PageRequest, PageResult, Predicate, QueryTarget, Record,
    SortSpec, SqliteStore, Value,
};
use rusqlite::{params_from_iter, Connection};
use std::marker::PhantomData;
use std::sync::{Arc, Mutex, MutexGuard};

#[cfg(test)]
mod tests;

/// 可被通用仓储管理的实体
pub trait Entity: Sized {
    /// 实体的查询目标（静态字段表）
    fn target() -> &'static QueryTarget;

    fn id(&self) -> &str;

    /// 结果行 → 实体
    fn from_record(record: &Record) -> RepositoryResult<Self>;

    /// 实体 → 主表自有字段
    fn to_record(&self) -> Record;
}

/// 条件对象 → 过滤字段列表
pub trait Criteria {
    fn to_filters(&self) -> Vec<FilterField>;
}

pub struct EntityRepository<E> {
    conn: Arc<Mutex<Connection>>,
    store: SqliteStore,
    builder: CriteriaQueryBuilder,
    _entity: PhantomData<fn() -> E>,
}

impl<E: Entity> EntityRepository<E> {
    /// 创建仓储，并校验数据库 schema 覆盖实体声明的全部字段
    pub fn new(conn: Arc<Mutex<Connection>>, builder: CriteriaQueryBuilder) -> RepositoryResult<Self> {
        let store = SqliteStore::new(Arc::clone(&conn))?;
        builder.verify_schema(&store, E::target())?;
        Ok(Self {
            conn,
            store,
            builder,
            _entity: PhantomData,
        })
    }

    pub fn builder(&self) -> &CriteriaQueryBuilder {
        &self.builder
    }

    pub fn store(&self) -> &SqliteStore {
        &self.store
    }

    pub(crate) fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    // ==========================================
    // 写入操作
    // ==========================================

    /// 插入实体，返回主键
    pub fn insert(&self, entity: &E) -> RepositoryResult<String> {
        let target = E::target();
        let (sql, params) = insert_statement(target, &entity.to_record());

        let conn = self.get_conn()?;
        conn.execute(&sql, params_from_iter(params.iter()))?;
        tracing::debug!(entity = target.entity, id = entity.id(), "实体已插入");
        Ok(entity.id().to_string())
    }

    /// 单事务批量插入，返回插入行数
    pub fn insert_all(&self, entities: &[E]) -> RepositoryResult<usize> {
        let target = E::target();
        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;

        let mut count = 0;
        for entity in entities {
            let (sql, params) = insert_statement(target, &entity.to_record());
            tx.execute(&sql, params_from_iter(params.iter()))?;
            count += 1;
        }

        tx.commit()?;
        tracing::debug!(entity = target.entity, count, "批量插入完成");
        Ok(count)
    }

    /// 按主键整行更新；记录不存在时返回 NotFound
    pub fn update(&self, entity: &E) -> RepositoryResult<()> {
        let target = E::target();
        let pk = primary_key_column(target)?;
        let record = entity.to_record();
        let (columns, mut values) = own_columns(target, &record);

        let assignments = columns
            .iter()
            .filter(|c| **c != pk)
            .map(|c| format!("{} = ?", c))
            .collect::<Vec<_>>()
            .join(", ");
        values.retain(|(column, _)| *column != pk);
        let mut params: Vec<Value> = values.into_iter().map(|(_, v)| v).collect();
        params.push(Value::from(entity.id()));

        let sql = format!("UPDATE {} SET {} WHERE {} = ?", target.table, assignments, pk);
        let conn = self.get_conn()?;
        let affected = conn.execute(&sql, params_from_iter(params.iter()))?;
        if affected == 0 {
            return Err(RepositoryError::not_found(target.entity, entity.id()));
        }
        Ok(())
    }

    /// 按主键删除，返回是否存在被删除的记录
    pub fn delete_by_id(&self, id: &str) -> RepositoryResult<bool> {
        let target = E::target();
        let pk = primary_key_column(target)?;
        let sql = format!("DELETE FROM {} WHERE {} = ?1", target.table, pk);

        let conn = self.get_conn()?;
        let affected = conn.execute(&sql, [id])?;
        Ok(affected > 0)
    }

    // ==========================================
    // 查询操作
    // ==========================================

    pub fn find_by_id(&self, id: &str) -> RepositoryResult<Option<E>> {
        let target = E::target();
        self.find_one(&[FilterField::equals(target.primary_key, Some(id))])
    }

    /// 条件搜索（分页）
    pub fn search(&self, fields: &[FilterField], page: &PageRequest) -> RepositoryResult<PageResult<E>> {
        let predicate = self.builder.build_filter(E::target(), fields)?;
        self.search_where(predicate, page)
    }

    /// 以已构建的谓词搜索（区间重叠等组合条件）
    pub fn search_where(&self, predicate: Predicate, page: &PageRequest) -> RepositoryResult<PageResult<E>> {
        let query = self.builder.paginate_and_sort(E::target(), predicate, page)?;
        let rows = self.builder.execute(&self.store, &query)?;
        rows.try_map(|record| E::from_record(&record))
    }

    /// 全部匹配行（按最大页大小逐页读取，直到最后一页）
    pub fn find_all(&self, fields: &[FilterField], sort: SortSpec) -> RepositoryResult<Vec<E>> {
        let predicate = self.builder.build_filter(E::target(), fields)?;
        self.find_where(predicate, sort)
    }

    pub fn find_where(&self, predicate: Predicate, sort: SortSpec) -> RepositoryResult<Vec<E>> {
        let size = self.builder.config().max_page_size as i64;
        let mut request = PageRequest::new(0, size).with_sort(sort);
        let mut items = Vec::new();

        loop {
            let page = self.search_where(predicate.clone(), &request)?;
            let more = page.has_next();
            items.extend(page.items);
            if !more {
                break;
            }
            request.page += 1;
        }

        if request.page > 0 {
            tracing::debug!(
                entity = E::target().entity,
                pages = request.page + 1,
                rows = items.len(),
                "多页读取完成"
            );
        }
        Ok(items)
    }

    /// 第一条匹配行（按主键排序）
    pub fn find_one(&self, fields: &[FilterField]) -> RepositoryResult<Option<E>> {
        let page = self.search(fields, &PageRequest::first(1))?;
        Ok(page.items.into_iter().next())
    }

    pub fn count(&self, fields: &[FilterField]) -> RepositoryResult<u64> {
        let predicate = self.builder.build_filter(E::target(), fields)?;
        self.count_where(&predicate)
    }

    pub fn count_where(&self, predicate: &Predicate) -> RepositoryResult<u64> {
        Ok(self.builder.count(&self.store, E::target(), predicate)?)
    }

    pub fn exists(&self, fields: &[FilterField]) -> RepositoryResult<bool> {
        Ok(self.count(fields)? > 0)
    }

    /// 按枚举取值分组计数（每个取值一次计数查询，取值顺序保持输入顺序）
    pub fn count_grouped<K>(
        &self,
        path: &str,
        keys: &[K],
        fields: &[FilterField],
    ) -> RepositoryResult<Vec<(K, u64)>>
    where
        K: Copy + Into<Value>,
    {
        let base = self.builder.build_filter(E::target(), fields)?;
        keys.iter()
            .map(|key| {
                let keyed = self.builder.build_filter(
                    E::target(),
                    &[FilterField::equals(path, Some(*key))],
                )?;
                let predicate = Predicate::all_of(vec![base.clone(), keyed]);
                Ok((*key, self.count_where(&predicate)?))
            })
            .collect()
    }
}

fn primary_key_column(target: &QueryTarget) -> RepositoryResult<&'static str> {
    target
        .primary_key_field()
        .map(|f| f.column)
        .ok_or_else(|| {
            RepositoryError::InternalError(format!("{} 未声明主键字段 {}", target.entity, target.primary_key))
        })
}

fn insert_statement(target: &QueryTarget, record: &Record) -> (String, Vec<Value>) {
    let (columns, values) = own_columns(target, record);
    let sql = format!(
        "INSERT INTO {} ({}) VALUES ({})",
        target.table,
        columns.join(", "),
        vec!["?"; columns.len()].join(", ")
    );
    (sql, values.into_iter().map(|(_, v)| v).collect())
}

/// 主表自有列及其值
fn own_columns(target: &QueryTarget, record: &Record) -> (Vec<&'static str>, Vec<(&'static str, Value)>) {
    let mut columns = Vec::new();
    let mut values = Vec::new();
    for def in target.own_fields() {
        columns.push(def.column);
        values.push((def.column, record.get(def.path).clone()));
    }
    (columns, values)
}
