// ==========================================
// 人事管理系统 - 查询值与字段类型
// ==========================================
// 职责: 过滤条件/结果行共用的标量值模型
// 存储格式 (与 schema 一致):
// - 日期: TEXT "%Y-%m-%d"
// - 时间戳: TEXT "%Y-%m-%d %H:%M:%S"
// - 布尔: INTEGER 0/1
// ==========================================

use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::types::{ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// 日期存储格式
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// 时间戳存储格式
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// ==========================================
// FieldKind - 字段声明类型
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FieldKind {
    Text,
    Integer,
    Real,
    Bool,
    Date,
    DateTime,
}

impl FieldKind {
    /// 值是否可用于该类型字段的比较
    ///
    /// 说明: Real 字段接受 Integer 值（按 f64 比较）
    pub fn accepts(&self, value: &Value) -> bool {
        matches!(
            (self, value),
            (_, Value::Null)
                | (FieldKind::Text, Value::Text(_))
                | (FieldKind::Integer, Value::Integer(_))
                | (FieldKind::Real, Value::Real(_) | Value::Integer(_))
                | (FieldKind::Bool, Value::Bool(_))
                | (FieldKind::Date, Value::Date(_))
                | (FieldKind::DateTime, Value::DateTime(_))
        )
    }

    /// 是否支持大小比较（>、<、区间）
    pub fn is_ordered(&self) -> bool {
        !matches!(self, FieldKind::Bool)
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldKind::Text => write!(f, "TEXT"),
            FieldKind::Integer => write!(f, "INTEGER"),
            FieldKind::Real => write!(f, "REAL"),
            FieldKind::Bool => write!(f, "BOOL"),
            FieldKind::Date => write!(f, "DATE"),
            FieldKind::DateTime => write!(f, "DATETIME"),
        }
    }
}

// ==========================================
// Value - 标量值
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Text(String),
    Integer(i64),
    Real(f64),
    Bool(bool),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Null => "NULL",
            Value::Text(_) => "TEXT",
            Value::Integer(_) => "INTEGER",
            Value::Real(_) => "REAL",
            Value::Bool(_) => "BOOL",
            Value::Date(_) => "DATE",
            Value::DateTime(_) => "DATETIME",
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// 同类值比较（SQL 语义: 任一侧为 NULL 时不可比较）
    pub fn compare(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Text(a), Value::Text(b)) => Some(a.cmp(b)),
            (Value::Integer(a), Value::Integer(b)) => Some(a.cmp(b)),
            (Value::Real(a), Value::Real(b)) => a.partial_cmp(b),
            (Value::Integer(a), Value::Real(b)) => (*a as f64).partial_cmp(b),
            (Value::Real(a), Value::Integer(b)) => a.partial_cmp(&(*b as f64)),
            (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
            (Value::Date(a), Value::Date(b)) => Some(a.cmp(b)),
            (Value::DateTime(a), Value::DateTime(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }

    /// 排序用全序比较
    ///
    /// NULL 排在最前（与 SQLite 升序行为一致）
    pub fn sort_cmp(&self, other: &Value) -> Ordering {
        match (self, other) {
            (Value::Null, Value::Null) => Ordering::Equal,
            (Value::Null, _) => Ordering::Less,
            (_, Value::Null) => Ordering::Greater,
            _ => self
                .compare(other)
                .unwrap_or_else(|| self.rank().cmp(&other.rank())),
        }
    }

    fn rank(&self) -> u8 {
        match self {
            Value::Null => 0,
            Value::Integer(_) | Value::Real(_) | Value::Bool(_) => 1,
            Value::Text(_) | Value::Date(_) | Value::DateTime(_) => 2,
        }
    }

    /// 按字段声明类型解码 SQLite 列值
    pub fn from_sql_ref(kind: FieldKind, raw: ValueRef<'_>) -> Result<Value, String> {
        if let ValueRef::Null = raw {
            return Ok(Value::Null);
        }

        match kind {
            FieldKind::Text => match raw {
                ValueRef::Text(bytes) => std::str::from_utf8(bytes)
                    .map(|s| Value::Text(s.to_string()))
                    .map_err(|e| e.to_string()),
                ValueRef::Integer(i) => Ok(Value::Text(i.to_string())),
                ValueRef::Real(f) => Ok(Value::Text(f.to_string())),
                other => Err(format!("无法解码为 TEXT: {:?}", other.data_type())),
            },
            FieldKind::Integer => match raw {
                ValueRef::Integer(i) => Ok(Value::Integer(i)),
                other => Err(format!("无法解码为 INTEGER: {:?}", other.data_type())),
            },
            FieldKind::Real => match raw {
                ValueRef::Real(f) => Ok(Value::Real(f)),
                ValueRef::Integer(i) => Ok(Value::Real(i as f64)),
                other => Err(format!("无法解码为 REAL: {:?}", other.data_type())),
            },
            FieldKind::Bool => match raw {
                ValueRef::Integer(i) => Ok(Value::Bool(i != 0)),
                other => Err(format!("无法解码为 BOOL: {:?}", other.data_type())),
            },
            FieldKind::Date => {
                let text = raw_text(raw)?;
                // 兼容 "YYYY-MM-DD HH:MM:SS" 形式，取日期部分
                let date_part = text.get(..10).unwrap_or(text);
                NaiveDate::parse_from_str(date_part, DATE_FORMAT)
                    .map(Value::Date)
                    .map_err(|e| format!("日期格式错误 '{}': {}", text, e))
            }
            FieldKind::DateTime => {
                let text = raw_text(raw)?;
                NaiveDateTime::parse_from_str(text, DATETIME_FORMAT)
                    .or_else(|_| NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S%.f"))
                    .or_else(|_| NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f"))
                    .map(Value::DateTime)
                    .map_err(|e| format!("时间戳格式错误 '{}': {}", text, e))
            }
        }
    }
}

fn raw_text(raw: ValueRef<'_>) -> Result<&str, String> {
    match raw {
        ValueRef::Text(bytes) => std::str::from_utf8(bytes).map_err(|e| e.to_string()),
        other => Err(format!("期望 TEXT, 实际 {:?}", other.data_type())),
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "NULL"),
            Value::Text(s) => write!(f, "'{}'", s),
            Value::Integer(i) => write!(f, "{}", i),
            Value::Real(v) => write!(f, "{}", v),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Date(d) => write!(f, "{}", d.format(DATE_FORMAT)),
            Value::DateTime(dt) => write!(f, "{}", dt.format(DATETIME_FORMAT)),
        }
    }
}

impl ToSql for Value {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        use rusqlite::types::Value as SqlValue;

        Ok(match self {
            Value::Null => ToSqlOutput::Owned(SqlValue::Null),
            Value::Text(s) => ToSqlOutput::Borrowed(ValueRef::Text(s.as_bytes())),
            Value::Integer(i) => ToSqlOutput::Owned(SqlValue::Integer(*i)),
            Value::Real(v) => ToSqlOutput::Owned(SqlValue::Real(*v)),
            Value::Bool(b) => ToSqlOutput::Owned(SqlValue::Integer(i64::from(*b))),
            Value::Date(d) => ToSqlOutput::Owned(SqlValue::Text(d.format(DATE_FORMAT).to_string())),
            Value::DateTime(dt) => {
                ToSqlOutput::Owned(SqlValue::Text(dt.format(DATETIME_FORMAT).to_string()))
            }
        })
    }
}

// ==========================================
// From 转换
// ==========================================

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<&String> for Value {
    fn from(v: &String) -> Self {
        Value::Text(v.clone())
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Integer(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Integer(i64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Real(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<NaiveDate> for Value {
    fn from(v: NaiveDate) -> Self {
        Value::Date(v)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(v: NaiveDateTime) -> Self {
        Value::DateTime(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(v) => v.into(),
            None => Value::Null,
        }
    }
}
