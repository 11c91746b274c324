// ==========================================
// 人事管理系统 - Record → 实体字段映射
// ==========================================
// 职责: 从查询结果行按路径取出强类型字段
// 约束: 类型不符/必填为空 → FieldValueError（携带字段路径）
// ==========================================

use super::error::{RepositoryError, RepositoryResult};
use crate::query::{Record, Value};
use chrono::{NaiveDate, NaiveDateTime};
use serde_json::Value as JsonValue;
use std::fmt::Display;
use std::str::FromStr;

fn optional<T>(
    record: &Record,
    path: &str,
    expected: &str,
    extract: impl FnOnce(&Value) -> Option<T>,
) -> RepositoryResult<Option<T>> {
    let value = record.get(path);
    if value.is_null() {
        return Ok(None);
    }
    extract(value).map(Some).ok_or_else(|| {
        RepositoryError::field_value(path, format!("期望 {}, 实际 {}", expected, value.kind_name()))
    })
}

fn required<T>(path: &str, value: Option<T>) -> RepositoryResult<T> {
    value.ok_or_else(|| RepositoryError::field_value(path, "必填字段为空"))
}

/// 按字段路径读取强类型值
pub trait RecordExt {
    fn opt_text(&self, path: &str) -> RepositoryResult<Option<String>>;
    fn opt_integer(&self, path: &str) -> RepositoryResult<Option<i64>>;
    fn opt_real(&self, path: &str) -> RepositoryResult<Option<f64>>;
    fn opt_bool(&self, path: &str) -> RepositoryResult<Option<bool>>;
    fn opt_date(&self, path: &str) -> RepositoryResult<Option<NaiveDate>>;
    fn opt_datetime(&self, path: &str) -> RepositoryResult<Option<NaiveDateTime>>;

    fn text(&self, path: &str) -> RepositoryResult<String>;
    fn integer(&self, path: &str) -> RepositoryResult<i64>;
    fn real(&self, path: &str) -> RepositoryResult<f64>;
    fn boolean(&self, path: &str) -> RepositoryResult<bool>;
    fn date(&self, path: &str) -> RepositoryResult<NaiveDate>;
    fn datetime(&self, path: &str) -> RepositoryResult<NaiveDateTime>;

    /// 文本枚举（SCREAMING_SNAKE_CASE）
    fn parsed<T>(&self, path: &str) -> RepositoryResult<T>
    where
        T: FromStr,
        T::Err: Display;

    /// JSON 文本列
    fn opt_json(&self, path: &str) -> RepositoryResult<Option<JsonValue>>;
}

impl RecordExt for Record {
    fn opt_text(&self, path: &str) -> RepositoryResult<Option<String>> {
        optional(self, path, "TEXT", |v| v.as_text().map(str::to_string))
    }

    fn opt_integer(&self, path: &str) -> RepositoryResult<Option<i64>> {
        optional(self, path, "INTEGER", |v| match v {
            Value::Integer(i) => Some(*i),
            _ => None,
        })
    }

    fn opt_real(&self, path: &str) -> RepositoryResult<Option<f64>> {
        optional(self, path, "REAL", |v| match v {
            Value::Real(f) => Some(*f),
            Value::Integer(i) => Some(*i as f64),
            _ => None,
        })
    }

    fn opt_bool(&self, path: &str) -> RepositoryResult<Option<bool>> {
        optional(self, path, "BOOL", |v| match v {
            Value::Bool(b) => Some(*b),
            Value::Integer(i) => Some(*i != 0),
            _ => None,
        })
    }

    fn opt_date(&self, path: &str) -> RepositoryResult<Option<NaiveDate>> {
        optional(self, path, "DATE", |v| match v {
            Value::Date(d) => Some(*d),
            Value::DateTime(dt) => Some(dt.date()),
            _ => None,
        })
    }

    fn opt_datetime(&self, path: &str) -> RepositoryResult<Option<NaiveDateTime>> {
        optional(self, path, "DATETIME", |v| match v {
            Value::DateTime(dt) => Some(*dt),
            _ => None,
        })
    }

    fn text(&self, path: &str) -> RepositoryResult<String> {
        required(path, self.opt_text(path)?)
    }

    fn integer(&self, path: &str) -> RepositoryResult<i64> {
        required(path, self.opt_integer(path)?)
    }

    fn real(&self, path: &str) -> RepositoryResult<f64> {
        required(path, self.opt_real(path)?)
    }

    fn boolean(&self, path: &str) -> RepositoryResult<bool> {
        required(path, self.opt_bool(path)?)
    }

    fn date(&self, path: &str) -> RepositoryResult<NaiveDate> {
        required(path, self.opt_date(path)?)
    }

    fn datetime(&self, path: &str) -> RepositoryResult<NaiveDateTime> {
        required(path, self.opt_datetime(path)?)
    }

    fn parsed<T>(&self, path: &str) -> RepositoryResult<T>
    where
        T: FromStr,
        T::Err: Display,
    {
        let raw = self.text(path)?;
        raw.parse::<T>()
            .map_err(|e| RepositoryError::field_value(path, e.to_string()))
    }

    fn opt_json(&self, path: &str) -> RepositoryResult<Option<JsonValue>> {
        match self.opt_text(path)? {
            Some(raw) => serde_json::from_str(&raw)
                .map(Some)
                .map_err(|e| RepositoryError::field_value(path, format!("JSON 解析失败: {}", e))),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::EmployeeStatus;

    #[test]
    fn test_required_and_optional_fields() {
        let record = Record::new()
            .with("name", "Ann")
            .with("salary", 4200_i64)
            .with("phone", Value::Null);

        assert_eq!(record.text("name").unwrap(), "Ann");
        assert_eq!(record.real("salary").unwrap(), 4200.0);
        assert_eq!(record.opt_text("phone").unwrap(), None);
        assert_eq!(record.opt_text("missing").unwrap(), None);

        let err = record.text("phone").unwrap_err();
        assert!(matches!(err, RepositoryError::FieldValueError { ref field, .. } if field == "phone"));
    }

    #[test]
    fn test_type_mismatch_reports_field() {
        let record = Record::new().with("hire_date", "not-a-date").with("status", "RETIRED");

        let err = record.date("hire_date").unwrap_err();
        assert!(matches!(err, RepositoryError::FieldValueError { ref field, .. } if field == "hire_date"));

        let err = record.parsed::<EmployeeStatus>("status").unwrap_err();
        assert!(matches!(err, RepositoryError::FieldValueError { ref field, .. } if field == "status"));
    }

    #[test]
    fn test_json_column() {
        let record = Record::new().with("details", r#"{"field":"salary","old":1,"new":2}"#);
        let json = record.opt_json("details").unwrap().unwrap();
        assert_eq!(json["field"], "salary");
    }
}
