// ==========================================
// 人事管理系统 - SQLite 表格存储
// ==========================================
// 职责: 谓词 → 参数化 SQL，执行计数/窗口查询
// 约束:
// - 所有值均以参数绑定，禁止拼接字面量
// - contains 使用 hr_lower()（Rust 侧 Unicode 小写），与进程内求值一致
// - 截止时间通过 progress handler 中断执行，报告 Timeout
// ==========================================

use super::error::{QueryError, QueryResult};
use super::page::SortOrder;
use super::predicate::Predicate;
use super::record::Record;
use super::store::TabularStore;
use super::target::{FieldDef, QueryTarget};
use super::value::Value;
use crate::db::LOWER_FUNCTION;
use crate::perf::PerfGuard;
use rusqlite::{params_from_iter, Connection, ErrorCode};
use std::collections::BTreeSet;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Instant;

/// progress handler 检查间隔（虚拟机指令数）
const PROGRESS_CHECK_OPS: i32 = 1_000;

#[derive(Clone)]
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// 包装已有连接，并应用统一连接配置（幂等）
    pub fn new(conn: Arc<Mutex<Connection>>) -> QueryResult<Self> {
        {
            let guard = conn
                .lock()
                .map_err(|e| QueryError::StoreExecution(format!("数据库锁获取失败: {}", e)))?;
            crate::db::configure_sqlite_connection(&guard).map_err(map_sqlite_error)?;
        }
        Ok(Self { conn })
    }

    /// 共享连接（供仓储写入操作使用）
    pub fn connection(&self) -> Arc<Mutex<Connection>> {
        Arc::clone(&self.conn)
    }

    fn get_conn(&self) -> QueryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| QueryError::StoreExecution(format!("数据库锁获取失败: {}", e)))
    }
}

// ==========================================
// SQL 渲染
// ==========================================

fn field(target: &QueryTarget, path: &str) -> QueryResult<&'static FieldDef> {
    target
        .field(path)
        .ok_or_else(|| QueryError::unknown_field(target.entity, path))
}

/// 渲染 WHERE 条件，追加绑定参数
pub fn render_predicate(
    target: &QueryTarget,
    predicate: &Predicate,
    params: &mut Vec<Value>,
) -> QueryResult<String> {
    let sql = match predicate {
        Predicate::All => "1 = 1".to_string(),
        Predicate::Compare { path, op, value } => {
            let def = field(target, path)?;
            params.push(value.clone());
            format!("{} {} ?", def.sql_expr(), op.sql())
        }
        Predicate::Contains { path, needle } => {
            let def = field(target, path)?;
            params.push(Value::Text(needle.clone()));
            format!("instr({}({}), ?) > 0", LOWER_FUNCTION, def.sql_expr())
        }
        Predicate::Between { path, low, high } => {
            let def = field(target, path)?;
            params.push(low.clone());
            params.push(high.clone());
            format!("{} BETWEEN ? AND ?", def.sql_expr())
        }
        Predicate::InSet { path, values } => {
            let def = field(target, path)?;
            if values.is_empty() {
                return Err(QueryError::invalid_filter(path, "in_set 集合不能为空"));
            }
            params.extend(values.iter().cloned());
            let placeholders = vec!["?"; values.len()].join(", ");
            format!("{} IN ({})", def.sql_expr(), placeholders)
        }
        Predicate::IsNull { path } => format!("{} IS NULL", field(target, path)?.sql_expr()),
        Predicate::IsNotNull { path } => {
            format!("{} IS NOT NULL", field(target, path)?.sql_expr())
        }
        Predicate::And(parts) => join_parts(target, parts, " AND ", "1 = 1", params)?,
        Predicate::Or(parts) => join_parts(target, parts, " OR ", "1 = 0", params)?,
        Predicate::Not(inner) => format!("NOT ({})", render_predicate(target, inner, params)?),
    };
    Ok(sql)
}

fn join_parts(
    target: &QueryTarget,
    parts: &[Predicate],
    separator: &str,
    empty: &str,
    params: &mut Vec<Value>,
) -> QueryResult<String> {
    if parts.is_empty() {
        return Ok(empty.to_string());
    }
    let rendered = parts
        .iter()
        .map(|p| render_predicate(target, p, params))
        .collect::<QueryResult<Vec<_>>>()?;
    Ok(format!("({})", rendered.join(separator)))
}

fn render_order_by(target: &QueryTarget, sort: &[SortOrder]) -> QueryResult<String> {
    let clauses = sort
        .iter()
        .map(|o| -> QueryResult<String> {
            Ok(format!("{} {}", field(target, &o.path)?.sql_expr(), o.direction.sql()))
        })
        .collect::<QueryResult<Vec<_>>>()?;
    Ok(clauses.join(", "))
}

/// COUNT 查询
pub fn build_count_sql(
    target: &QueryTarget,
    predicate: &Predicate,
) -> QueryResult<(String, Vec<Value>)> {
    let mut params = Vec::new();
    let condition = render_predicate(target, predicate, &mut params)?;
    let sql = format!(
        "SELECT COUNT(*) FROM {} WHERE {}",
        target.from_clause(),
        condition
    );
    Ok((sql, params))
}

/// 窗口 SELECT 查询（列顺序与 target.fields 一致）
pub fn build_select_sql(
    target: &QueryTarget,
    predicate: &Predicate,
    sort: &[SortOrder],
    offset: u64,
    limit: u64,
) -> QueryResult<(String, Vec<Value>)> {
    let mut params = Vec::new();
    let columns = target
        .fields
        .iter()
        .map(FieldDef::sql_expr)
        .collect::<Vec<_>>()
        .join(", ");
    let condition = render_predicate(target, predicate, &mut params)?;

    let mut sql = format!(
        "SELECT {} FROM {} WHERE {}",
        columns,
        target.from_clause(),
        condition
    );
    if !sort.is_empty() {
        sql.push_str(" ORDER BY ");
        sql.push_str(&render_order_by(target, sort)?);
    }
    sql.push_str(" LIMIT ? OFFSET ?");
    params.push(Value::Integer(to_i64(limit)?));
    params.push(Value::Integer(to_i64(offset)?));

    Ok((sql, params))
}

fn to_i64(v: u64) -> QueryResult<i64> {
    i64::try_from(v).map_err(|_| QueryError::InvalidPageRequest(format!("窗口参数溢出: {}", v)))
}

// ==========================================
// 执行
// ==========================================

pub(crate) fn map_sqlite_error(err: rusqlite::Error) -> QueryError {
    match &err {
        rusqlite::Error::SqliteFailure(e, _) if e.code == ErrorCode::OperationInterrupted => {
            QueryError::Timeout(format!("SQL 执行被中断: {}", err))
        }
        _ => QueryError::StoreExecution(err.to_string()),
    }
}

/// 在截止时间约束下执行
fn with_deadline<T>(
    conn: &Connection,
    deadline: Option<Instant>,
    f: impl FnOnce(&Connection) -> rusqlite::Result<T>,
) -> QueryResult<T> {
    let Some(deadline) = deadline else {
        return f(conn).map_err(map_sqlite_error);
    };

    if Instant::now() >= deadline {
        return Err(QueryError::Timeout("SQL 执行前已超过截止时间".to_string()));
    }

    conn.progress_handler(PROGRESS_CHECK_OPS, Some(move || Instant::now() >= deadline));
    let result = f(conn);
    conn.progress_handler(0, None::<fn() -> bool>);

    result.map_err(map_sqlite_error)
}

impl TabularStore for SqliteStore {
    type Row = Record;

    fn describe_schema(&self, target: &QueryTarget) -> QueryResult<BTreeSet<String>> {
        let conn = self.get_conn()?;
        let mut known = BTreeSet::new();

        for def in target.fields {
            let Some(table) = target.table_for_alias(def.alias) else {
                continue;
            };
            let mut stmt = conn
                .prepare("SELECT 1 FROM pragma_table_info(?1) WHERE name = ?2")
                .map_err(map_sqlite_error)?;
            let exists = stmt
                .exists(rusqlite::params![table, def.column])
                .map_err(map_sqlite_error)?;
            if exists {
                known.insert(def.path.to_string());
            }
        }

        Ok(known)
    }

    fn run_count(
        &self,
        target: &QueryTarget,
        predicate: &Predicate,
        deadline: Option<Instant>,
    ) -> QueryResult<u64> {
        let _perf = PerfGuard::new("criteria_count");
        let (sql, params) = build_count_sql(target, predicate)?;
        tracing::debug!(entity = target.entity, sql = %sql, params = params.len(), "执行计数查询");

        let conn = self.get_conn()?;
        let count: i64 = with_deadline(&conn, deadline, |conn| {
            conn.query_row(&sql, params_from_iter(params.iter()), |row| row.get(0))
        })?;

        Ok(count.max(0) as u64)
    }

    fn run_select(
        &self,
        target: &QueryTarget,
        predicate: &Predicate,
        sort: &[SortOrder],
        offset: u64,
        limit: u64,
        deadline: Option<Instant>,
    ) -> QueryResult<Vec<Record>> {
        let _perf = PerfGuard::new("criteria_select");
        let (sql, params) = build_select_sql(target, predicate, sort, offset, limit)?;
        tracing::debug!(entity = target.entity, sql = %sql, params = params.len(), "执行窗口查询");

        let conn = self.get_conn()?;
        let raw_rows = with_deadline(&conn, deadline, |conn| {
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt.query_map(params_from_iter(params.iter()), |row| {
                let mut values = Vec::with_capacity(target.fields.len());
                for (idx, def) in target.fields.iter().enumerate() {
                    let raw = row.get_ref(idx)?;
                    values.push((def, Value::from_sql_ref(def.kind, raw)));
                }
                Ok(values)
            })?;
            rows.collect::<rusqlite::Result<Vec<_>>>()
        })?;

        raw_rows
            .into_iter()
            .map(|values| {
                values
                    .into_iter()
                    .map(|(def, decoded)| {
                        decoded.map(|v| (def.path.to_string(), v)).map_err(|msg| {
                            QueryError::StoreExecution(format!("字段 {} 解码失败: {}", def.path, msg))
                        })
                    })
                    .collect::<QueryResult<Record>>()
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::predicate::CompareOp;
    use crate::query::target::JoinDef;
    use crate::query::value::FieldKind;

    static FIELDS: &[FieldDef] = &[
        FieldDef::new("id", "e", "id", FieldKind::Text),
        FieldDef::new("name", "e", "name", FieldKind::Text),
        FieldDef::new("department.name", "d", "name", FieldKind::Text),
    ];

    static TARGET: QueryTarget = QueryTarget {
        entity: "Employee",
        table: "employees",
        alias: "e",
        primary_key: "id",
        fields: FIELDS,
        joins: &[JoinDef {
            table: "departments",
            alias: "d",
            on: "d.id = e.department_id",
        }],
    };

    #[test]
    fn test_render_select_sql() {
        let predicate = Predicate::all_of(vec![
            Predicate::compare("name", CompareOp::Eq, "Ann"),
            Predicate::Contains {
                path: "department.name".to_string(),
                needle: "eng".to_string(),
            },
        ]);
        let (sql, params) =
            build_select_sql(&TARGET, &predicate, &[SortOrder::asc("id")], 20, 10).unwrap();

        assert_eq!(
            sql,
            "SELECT e.id, e.name, d.name FROM employees e \
             LEFT JOIN departments d ON d.id = e.department_id \
             WHERE (e.name = ? AND instr(hr_lower(d.name), ?) > 0) \
             ORDER BY e.id ASC LIMIT ? OFFSET ?"
        );
        assert_eq!(
            params,
            vec![
                Value::from("Ann"),
                Value::from("eng"),
                Value::Integer(10),
                Value::Integer(20)
            ]
        );
    }

    #[test]
    fn test_render_empty_or_matches_nothing() {
        let mut params = Vec::new();
        let sql = render_predicate(&TARGET, &Predicate::Or(vec![]), &mut params).unwrap();
        assert_eq!(sql, "1 = 0");
        assert!(params.is_empty());
    }

    #[test]
    fn test_render_rejects_unknown_path() {
        let mut params = Vec::new();
        let err = render_predicate(
            &TARGET,
            &Predicate::IsNull {
                path: "salary".to_string(),
            },
            &mut params,
        )
        .unwrap_err();
        assert!(matches!(err, QueryError::UnknownField { .. }));
    }
}
