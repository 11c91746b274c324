// ==========================================
// 人事管理系统 - 谓词树 (Predicate)
// ==========================================
// 职责:
// - 表达已校验的过滤条件（字段路径均已确认存在）
// - 进程内求值（SQL NULL 语义: 与 NULL 比较恒为假）
// - 区间重叠判定（考勤休息、请假冲突检测共用）
// ==========================================

use super::error::{QueryError, QueryResult};
use super::record::Record;
use super::value::Value;
use std::cmp::Ordering;

/// 比较操作
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,
}

impl CompareOp {
    pub fn sql(&self) -> &'static str {
        match self {
            CompareOp::Eq => "=",
            CompareOp::Ne => "<>",
            CompareOp::Gt => ">",
            CompareOp::Gte => ">=",
            CompareOp::Lt => "<",
            CompareOp::Lte => "<=",
        }
    }

    fn holds(&self, ordering: Ordering) -> bool {
        match self {
            CompareOp::Eq => ordering == Ordering::Equal,
            CompareOp::Ne => ordering != Ordering::Equal,
            CompareOp::Gt => ordering == Ordering::Greater,
            CompareOp::Gte => ordering != Ordering::Less,
            CompareOp::Lt => ordering == Ordering::Less,
            CompareOp::Lte => ordering != Ordering::Greater,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// 匹配全部行
    All,
    Compare {
        path: String,
        op: CompareOp,
        value: Value,
    },
    /// 子串匹配；needle 已转小写
    Contains { path: String, needle: String },
    Between {
        path: String,
        low: Value,
        high: Value,
    },
    InSet { path: String, values: Vec<Value> },
    IsNull { path: String },
    IsNotNull { path: String },
    And(Vec<Predicate>),
    Or(Vec<Predicate>),
    Not(Box<Predicate>),
}

impl Predicate {
    pub fn compare(path: &str, op: CompareOp, value: impl Into<Value>) -> Self {
        Predicate::Compare {
            path: path.to_string(),
            op,
            value: value.into(),
        }
    }

    /// 合并为合取式；空集合 → All，单项直接返回
    pub fn all_of(mut parts: Vec<Predicate>) -> Self {
        parts.retain(|p| !matches!(p, Predicate::All));
        match parts.len() {
            0 => Predicate::All,
            1 => parts.remove(0),
            _ => Predicate::And(parts),
        }
    }

    pub fn and(self, other: Predicate) -> Self {
        Predicate::all_of(vec![self, other])
    }

    pub fn negate(self) -> Self {
        Predicate::Not(Box::new(self))
    }

    /// 区间重叠谓词
    ///
    /// 已存区间 [start_path, end_path] 与候选区间 [start, end] 在闭区间意义下相交:
    /// `existing.start <= candidate.end AND existing.end >= candidate.start`
    pub fn overlaps(
        start_path: &str,
        end_path: &str,
        start: impl Into<Value>,
        end: impl Into<Value>,
    ) -> QueryResult<Self> {
        let start = start.into();
        let end = end.into();

        if start.is_null() || end.is_null() {
            return Err(QueryError::invalid_filter(start_path, "重叠区间边界不能为空"));
        }
        match start.compare(&end) {
            Some(Ordering::Greater) => {
                return Err(QueryError::invalid_filter(
                    start_path,
                    format!("区间起点 {} 晚于终点 {}", start, end),
                ))
            }
            None => {
                return Err(QueryError::invalid_filter(
                    start_path,
                    format!("区间边界类型不一致: {} / {}", start.kind_name(), end.kind_name()),
                ))
            }
            _ => {}
        }

        Ok(Predicate::And(vec![
            Predicate::compare(start_path, CompareOp::Lte, end),
            Predicate::compare(end_path, CompareOp::Gte, start),
        ]))
    }

    /// 谓词是否为"匹配全部"
    pub fn is_match_all(&self) -> bool {
        match self {
            Predicate::All => true,
            Predicate::And(parts) => parts.iter().all(Predicate::is_match_all),
            _ => false,
        }
    }

    /// 引用到的字段路径
    pub fn paths(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_paths(&mut out);
        out
    }

    fn collect_paths<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Predicate::All => {}
            Predicate::Compare { path, .. }
            | Predicate::Contains { path, .. }
            | Predicate::Between { path, .. }
            | Predicate::InSet { path, .. }
            | Predicate::IsNull { path }
            | Predicate::IsNotNull { path } => out.push(path.as_str()),
            Predicate::And(parts) | Predicate::Or(parts) => {
                parts.iter().for_each(|p| p.collect_paths(out))
            }
            Predicate::Not(inner) => inner.collect_paths(out),
        }
    }

    /// 进程内求值
    pub fn matches(&self, record: &Record) -> bool {
        self.eval(record).unwrap_or(false)
    }

    /// 三值逻辑求值；None 表示 UNKNOWN（涉及 NULL）
    fn eval(&self, record: &Record) -> Option<bool> {
        match self {
            Predicate::All => Some(true),
            Predicate::Compare { path, op, value } => {
                let actual = record.get(path);
                actual.compare(value).map(|ord| op.holds(ord))
            }
            Predicate::Contains { path, needle } => match record.get(path) {
                Value::Null => None,
                Value::Text(s) => Some(s.to_lowercase().contains(needle.as_str())),
                other => Some(other.to_string().to_lowercase().contains(needle.as_str())),
            },
            Predicate::Between { path, low, high } => {
                let actual = record.get(path);
                let lower = actual.compare(low)?;
                let upper = actual.compare(high)?;
                Some(lower != Ordering::Less && upper != Ordering::Greater)
            }
            Predicate::InSet { path, values } => {
                let actual = record.get(path);
                if actual.is_null() {
                    return None;
                }
                Some(
                    values
                        .iter()
                        .any(|v| actual.compare(v) == Some(Ordering::Equal)),
                )
            }
            Predicate::IsNull { path } => Some(record.get(path).is_null()),
            Predicate::IsNotNull { path } => Some(!record.get(path).is_null()),
            Predicate::And(parts) => {
                let mut unknown = false;
                for part in parts {
                    match part.eval(record) {
                        Some(false) => return Some(false),
                        None => unknown = true,
                        Some(true) => {}
                    }
                }
                if unknown {
                    None
                } else {
                    Some(true)
                }
            }
            Predicate::Or(parts) => {
                let mut unknown = false;
                for part in parts {
                    match part.eval(record) {
                        Some(true) => return Some(true),
                        None => unknown = true,
                        Some(false) => {}
                    }
                }
                if unknown {
                    None
                } else {
                    Some(false)
                }
            }
            Predicate::Not(inner) => inner.eval(record).map(|b| !b),
        }
    }
}
