use super::*;
use crate::query::target::{FieldDef, JoinDef};
use chrono::NaiveDate;

static FIELDS: &[FieldDef] = &[
    FieldDef::new("id", "e", "id", FieldKind::Text),
    FieldDef::new("name", "e", "name", FieldKind::Text),
    FieldDef::new("salary", "e", "salary", FieldKind::Real),
    FieldDef::new("level", "e", "level", FieldKind::Integer),
    FieldDef::new("active", "e", "active", FieldKind::Bool),
    FieldDef::new("hire_date", "e", "hire_date", FieldKind::Date),
    FieldDef::new("department.id", "e", "department_id", FieldKind::Text),
    FieldDef::new("department.name", "d", "name", FieldKind::Text),
];

static JOINS: &[JoinDef] = &[JoinDef {
    table: "departments",
    alias: "d",
    on: "d.id = e.department_id",
}];

static TARGET: QueryTarget = QueryTarget {
    entity: "Employee",
    table: "employees",
    alias: "e",
    primary_key: "id",
    fields: FIELDS,
    joins: JOINS,
};

fn builder() -> CriteriaQueryBuilder {
    CriteriaQueryBuilder::new(QueryConfig::default())
}

#[test]
fn test_all_absent_fields_build_match_all() {
    let fields = vec![
        FilterField::equals("name", None::<String>),
        FilterField::contains("department.name", None::<&str>),
        FilterField::between("salary", None::<f64>, None::<f64>),
        FilterField::in_set("level", None::<Vec<i64>>),
        FilterField::equals("active", Some(Value::Null)),
    ];
    let predicate = builder().build_filter(&TARGET, &fields).unwrap();
    assert_eq!(predicate, Predicate::All);
    assert!(predicate.is_match_all());
}

#[test]
fn test_unknown_path_fails_even_when_not_applied() {
    let err = builder()
        .build_filter(&TARGET, &[FilterField::equals("nonexistent.path", None::<String>)])
        .unwrap_err();
    assert!(matches!(err, QueryError::UnknownField { ref path, .. } if path == "nonexistent.path"));
}

#[test]
fn test_contains_lowercases_needle_and_requires_text() {
    let predicate = builder()
        .build_filter(&TARGET, &[FilterField::contains("name", Some("ÅSA"))])
        .unwrap();
    assert_eq!(
        predicate,
        Predicate::Contains {
            path: "name".to_string(),
            needle: "åsa".to_string()
        }
    );

    let err = builder()
        .build_filter(&TARGET, &[FilterField::contains("salary", Some(10.0))])
        .unwrap_err();
    assert!(matches!(err, QueryError::InvalidFilter { .. }));
}

#[test]
fn test_between_bounds() {
    let low = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    let high = NaiveDate::from_ymd_opt(2024, 12, 31).unwrap();

    let ok = builder()
        .build_filter(&TARGET, &[FilterField::between("hire_date", Some(low), Some(high))])
        .unwrap();
    assert!(matches!(ok, Predicate::Between { .. }));

    let err = builder()
        .build_filter(&TARGET, &[FilterField::between("hire_date", Some(high), Some(low))])
        .unwrap_err();
    assert!(matches!(err, QueryError::InvalidFilter { .. }));

    // 单侧边界退化为 >= / <=
    let half = builder()
        .build_filter(&TARGET, &[FilterField::between("salary", Some(1000.0), None)])
        .unwrap();
    assert_eq!(half, Predicate::compare("salary", CompareOp::Gte, 1000.0));
}

#[test]
fn test_in_set_rejects_empty_and_null_members() {
    let err = builder()
        .build_filter(&TARGET, &[FilterField::in_set("level", Some(Vec::<i64>::new()))])
        .unwrap_err();
    assert!(matches!(err, QueryError::InvalidFilter { .. }));

    let err = builder()
        .build_filter(
            &TARGET,
            &[FilterField::in_set("name", Some(vec![Value::from("a"), Value::Null]))],
        )
        .unwrap_err();
    assert!(matches!(err, QueryError::InvalidFilter { .. }));
}

#[test]
fn test_type_mismatch_is_invalid_filter() {
    let err = builder()
        .build_filter(&TARGET, &[FilterField::equals("level", Some("three"))])
        .unwrap_err();
    assert!(matches!(err, QueryError::InvalidFilter { .. }));

    // REAL 字段接受 INTEGER
    assert!(builder()
        .build_filter(&TARGET, &[FilterField::greater_than("salary", Some(5000i64))])
        .is_ok());

    // BOOL 不支持大小比较
    let err = builder()
        .build_filter(&TARGET, &[FilterField::greater_than("active", Some(true))])
        .unwrap_err();
    assert!(matches!(err, QueryError::InvalidFilter { .. }));
}

#[test]
fn test_paginate_appends_primary_key_tiebreak() {
    let page = PageRequest::new(2, 10).sorted_by(SortOrder::desc("salary"));
    let query = builder()
        .paginate_and_sort(&TARGET, Predicate::All, &page)
        .unwrap();

    assert_eq!(query.sort, vec![SortOrder::desc("salary"), SortOrder::asc("id")]);
    assert_eq!(query.offset, 20);
    assert_eq!(query.limit, 10);

    // 已显式按主键排序时不重复追加
    let page = PageRequest::new(0, 10).sorted_by(SortOrder::desc("id"));
    let query = builder()
        .paginate_and_sort(&TARGET, Predicate::All, &page)
        .unwrap();
    assert_eq!(query.sort, vec![SortOrder::desc("id")]);
}

#[test]
fn test_paginate_rejects_unknown_sort_and_predicate_paths() {
    let page = PageRequest::new(0, 10).sorted_by(SortOrder::asc("nope"));
    assert!(matches!(
        builder().paginate_and_sort(&TARGET, Predicate::All, &page),
        Err(QueryError::UnknownField { .. })
    ));

    let overlap = Predicate::overlaps("start", "end", 1i64, 2i64).unwrap();
    assert!(matches!(
        builder().paginate_and_sort(&TARGET, overlap, &PageRequest::new(0, 10)),
        Err(QueryError::UnknownField { .. })
    ));
}

#[test]
fn test_default_deadline_from_config() {
    let config = QueryConfig {
        query_timeout: Some(Duration::from_secs(5)),
        ..QueryConfig::default()
    };
    let query = CriteriaQueryBuilder::new(config)
        .paginate_and_sort(&TARGET, Predicate::All, &PageRequest::new(0, 10))
        .unwrap();
    assert!(query.deadline.is_some());

    let query = builder()
        .paginate_and_sort(&TARGET, Predicate::All, &PageRequest::new(0, 10))
        .unwrap();
    assert!(query.deadline.is_none());
}

#[test]
fn test_default_page_follows_config() {
    let page = builder().default_page();
    assert_eq!((page.page, page.size), (0, 20));
    assert!(page.sort.is_empty());

    let config = QueryConfig {
        default_page_size: 7,
        ..QueryConfig::default()
    };
    let page = CriteriaQueryBuilder::new(config).default_page();
    assert_eq!((page.page, page.size), (0, 7));
}
