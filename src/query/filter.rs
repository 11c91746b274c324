// ==========================================
// 人事管理系统 - 过滤字段 (FilterField)
// ==========================================
// 职责: 调用方条件的类型化表达
// 约定: 操作数缺失（None 或 NULL）= 条件不生效（从谓词中省略），
//       而不是与 NULL 比较
// ==========================================

use super::value::Value;

/// 比较操作符
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    Equals,
    NotEquals,
    Contains,
    GreaterThan,
    GreaterOrEqual,
    LessThan,
    LessOrEqual,
    Between,
    InSet,
    IsNull,
    IsNotNull,
}

impl FilterOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterOp::Equals => "equals",
            FilterOp::NotEquals => "not_equals",
            FilterOp::Contains => "contains",
            FilterOp::GreaterThan => "greater_than",
            FilterOp::GreaterOrEqual => "greater_or_equal",
            FilterOp::LessThan => "less_than",
            FilterOp::LessOrEqual => "less_or_equal",
            FilterOp::Between => "between",
            FilterOp::InSet => "in_set",
            FilterOp::IsNull => "is_null",
            FilterOp::IsNotNull => "is_not_null",
        }
    }
}

/// 操作数
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Single(Value),
    /// 区间上下界（任一侧可缺失）
    Range(Option<Value>, Option<Value>),
    Set(Vec<Value>),
}

/// 过滤字段
#[derive(Debug, Clone, PartialEq)]
pub struct FilterField {
    pub path: String,
    pub op: FilterOp,
    pub operand: Option<Operand>,
}

fn single(value: Option<Value>) -> Option<Operand> {
    value.filter(|v| !v.is_null()).map(Operand::Single)
}

impl FilterField {
    fn with_single(path: &str, op: FilterOp, value: Option<Value>) -> Self {
        Self {
            path: path.to_string(),
            op,
            operand: single(value),
        }
    }

    pub fn equals<V: Into<Value>>(path: &str, value: Option<V>) -> Self {
        Self::with_single(path, FilterOp::Equals, value.map(Into::into))
    }

    pub fn not_equals<V: Into<Value>>(path: &str, value: Option<V>) -> Self {
        Self::with_single(path, FilterOp::NotEquals, value.map(Into::into))
    }

    /// 大小写不敏感的子串匹配
    pub fn contains<V: Into<Value>>(path: &str, value: Option<V>) -> Self {
        Self::with_single(path, FilterOp::Contains, value.map(Into::into))
    }

    pub fn greater_than<V: Into<Value>>(path: &str, value: Option<V>) -> Self {
        Self::with_single(path, FilterOp::GreaterThan, value.map(Into::into))
    }

    pub fn greater_or_equal<V: Into<Value>>(path: &str, value: Option<V>) -> Self {
        Self::with_single(path, FilterOp::GreaterOrEqual, value.map(Into::into))
    }

    pub fn less_than<V: Into<Value>>(path: &str, value: Option<V>) -> Self {
        Self::with_single(path, FilterOp::LessThan, value.map(Into::into))
    }

    pub fn less_or_equal<V: Into<Value>>(path: &str, value: Option<V>) -> Self {
        Self::with_single(path, FilterOp::LessOrEqual, value.map(Into::into))
    }

    /// 闭区间 [low, high]
    ///
    /// - 两端都有: low <= v <= high
    /// - 仅 low: v >= low
    /// - 仅 high: v <= high
    /// - 都缺失: 不生效
    pub fn between<V: Into<Value>>(path: &str, low: Option<V>, high: Option<V>) -> Self {
        let low = low.map(Into::into).filter(|v: &Value| !v.is_null());
        let high = high.map(Into::into).filter(|v: &Value| !v.is_null());
        let operand = if low.is_none() && high.is_none() {
            None
        } else {
            Some(Operand::Range(low, high))
        };
        Self {
            path: path.to_string(),
            op: FilterOp::Between,
            operand,
        }
    }

    /// 集合成员匹配
    ///
    /// `None` 表示不生效；`Some(空集合)` 在构建时报错
    pub fn in_set<V, I>(path: &str, values: Option<I>) -> Self
    where
        V: Into<Value>,
        I: IntoIterator<Item = V>,
    {
        Self {
            path: path.to_string(),
            op: FilterOp::InSet,
            operand: values.map(|vs| Operand::Set(vs.into_iter().map(Into::into).collect())),
        }
    }

    pub fn is_null(path: &str) -> Self {
        Self {
            path: path.to_string(),
            op: FilterOp::IsNull,
            operand: None,
        }
    }

    pub fn is_not_null(path: &str) -> Self {
        Self {
            path: path.to_string(),
            op: FilterOp::IsNotNull,
            operand: None,
        }
    }

    /// 条件是否生效
    pub fn is_applied(&self) -> bool {
        match self.op {
            FilterOp::IsNull | FilterOp::IsNotNull => true,
            _ => self.operand.is_some(),
        }
    }
}
