// ==========================================
// 人事管理系统 - 查询目标 (QueryTarget)
// ==========================================
// 职责: 描述被查询实体的属性结构
// - 字段路径 → 表别名.列名 + 类型
// - 关联字段通过显式 LEFT JOIN 解析（仅多对一/一对一关系，保证计数不膨胀）
// 约束: 所有定义均为 'static 常量，查询期间只读
// ==========================================

use super::value::FieldKind;
use std::collections::BTreeSet;

/// 字段定义
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDef {
    /// 字段路径（如 `employee.department.id`）
    pub path: &'static str,
    /// 所属表别名
    pub alias: &'static str,
    /// 列名
    pub column: &'static str,
    /// 声明类型
    pub kind: FieldKind,
}

impl FieldDef {
    pub const fn new(
        path: &'static str,
        alias: &'static str,
        column: &'static str,
        kind: FieldKind,
    ) -> Self {
        Self {
            path,
            alias,
            column,
            kind,
        }
    }

    /// SQL 列表达式（alias.column）
    pub fn sql_expr(&self) -> String {
        format!("{}.{}", self.alias, self.column)
    }
}

/// 关联定义（LEFT JOIN）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JoinDef {
    pub table: &'static str,
    pub alias: &'static str,
    /// ON 条件（使用别名书写，如 `d.id = e.department_id`）
    pub on: &'static str,
}

/// 查询目标
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryTarget {
    /// 实体名（日志/错误信息用）
    pub entity: &'static str,
    /// 主表
    pub table: &'static str,
    /// 主表别名
    pub alias: &'static str,
    /// 主键字段路径（分页排序的兜底唯一键）
    pub primary_key: &'static str,
    pub fields: &'static [FieldDef],
    pub joins: &'static [JoinDef],
}

impl QueryTarget {
    /// 按路径查找字段
    pub fn field(&self, path: &str) -> Option<&'static FieldDef> {
        self.fields.iter().find(|f| f.path == path)
    }

    /// 已知字段路径集合
    pub fn known_paths(&self) -> BTreeSet<String> {
        self.fields.iter().map(|f| f.path.to_string()).collect()
    }

    /// 主表自有字段（可写入）
    pub fn own_fields(&self) -> impl Iterator<Item = &'static FieldDef> + '_ {
        let alias = self.alias;
        self.fields.iter().filter(move |f| f.alias == alias)
    }

    /// 主键字段定义
    pub fn primary_key_field(&self) -> Option<&'static FieldDef> {
        self.field(self.primary_key)
    }

    /// FROM 子句（含全部 JOIN）
    pub fn from_clause(&self) -> String {
        let mut sql = format!("{} {}", self.table, self.alias);
        for join in self.joins {
            sql.push_str(&format!(" LEFT JOIN {} {} ON {}", join.table, join.alias, join.on));
        }
        sql
    }

    /// 表别名 → 表名
    pub fn table_for_alias(&self, alias: &str) -> Option<&'static str> {
        if alias == self.alias {
            return Some(self.table);
        }
        self.joins.iter().find(|j| j.alias == alias).map(|j| j.table)
    }
}
