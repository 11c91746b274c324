// ==========================================
// 条件查询构建器 - 行为测试
// ==========================================
// 测试目标: 过滤字段 → 谓词 → 分页执行 的端到端语义
// 存储: MemoryStore（进程内求值）+ 记录调用的桩存储
// ==========================================

mod test_helpers;

use hr_criteria::query::{
    FieldDef, FieldKind, FilterField, JoinDef, PageRequest, Predicate,
    MemoryStore, QueryError, QueryResult, QueryTarget, Record, SortOrder, TabularStore, Value,
};
use chrono::NaiveDate;
use std::cell::Cell;
use std::collections::BTreeSet;
use std::time::Instant;
use test_helpers::{builder, date};

static FIELDS: &[FieldDef] = &[
    FieldDef::new("id", "e", "id", FieldKind::Text),
    FieldDef::new("name", "e", "name", FieldKind::Text),
    FieldDef::new("salary", "e", "salary", FieldKind::Real),
    FieldDef::new("status", "e", "status", FieldKind::Text),
    FieldDef::new("hire_date", "e", "hire_date", FieldKind::Date),
    FieldDef::new("manager.id", "e", "manager_id", FieldKind::Text),
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

fn employee(id: usize, name: &str, salary: f64, status: &str) -> Record {
    Record::new()
        .with("id", format!("emp-{:02}", id))
        .with("name", name)
        .with("salary", salary)
        .with("status", status)
        .with("hire_date", date(2020, 1, 1 + (id as u32 % 28)))
        .with("manager.id", Value::Null)
        .with("department.name", "Engineering")
}

/// 23 名员工，工资全部相同（排序只能靠主键兜底区分）
fn same_salary_store() -> MemoryStore {
    MemoryStore::new(
        (0..23)
            .map(|i| employee(i, &format!("Person {}", i), 5000.0, "ACTIVE"))
            .collect(),
    )
}

/// 记录调用次数的桩存储
#[derive(Default)]
struct RecordingStore {
    calls: Cell<usize>,
}

impl TabularStore for RecordingStore {
    type Row = Record;

    fn describe_schema(&self, target: &QueryTarget) -> QueryResult<BTreeSet<String>> {
        self.calls.set(self.calls.get() + 1);
        Ok(target.known_paths())
    }

    fn run_count(&self, _: &QueryTarget, _: &Predicate, _: Option<Instant>) -> QueryResult<u64> {
        self.calls.set(self.calls.get() + 1);
        Ok(0)
    }

    fn run_select(
        &self,
        _: &QueryTarget,
        _: &Predicate,
        _: &[SortOrder],
        _: u64,
        _: u64,
        _: Option<Instant>,
    ) -> QueryResult<Vec<Record>> {
        self.calls.set(self.calls.get() + 1);
        Ok(Vec::new())
    }
}

// ==========================================
// 测试用例
// ==========================================

#[test]
fn test_unknown_field_fails_before_store_is_touched() {
    let store = RecordingStore::default();
    let err = builder()
        .search(
            &store,
            &TARGET,
            &[FilterField::equals("nonexistent.path", Some("x"))],
            &PageRequest::first(10),
        )
        .unwrap_err();

    assert!(matches!(err, QueryError::UnknownField { ref path, .. } if path == "nonexistent.path"));
    assert!(err.is_caller_error());
    assert_eq!(store.calls.get(), 0);
}

#[test]
fn test_unknown_sort_path_fails_before_store_is_touched() {
    let store = RecordingStore::default();
    let page = PageRequest::first(10).sorted_by(SortOrder::desc("bogus"));
    let err = builder().search(&store, &TARGET, &[], &page).unwrap_err();

    assert!(matches!(err, QueryError::UnknownField { .. }));
    assert_eq!(store.calls.get(), 0);
}

#[test]
fn test_pagination_partitions_ties_stably() {
    let store = same_salary_store();
    let b = builder();
    let mut seen = Vec::new();

    for (page, expected_len) in [(0, 10), (1, 10), (2, 3)] {
        let request = PageRequest::new(page, 10).sorted_by(SortOrder::desc("salary"));
        let result = b.search(&store, &TARGET, &[], &request).unwrap();
        assert_eq!(result.total, 23);
        assert_eq!(result.total_pages, 3);
        assert_eq!(result.items.len(), expected_len);
        seen.extend(result.items.iter().map(|r| r.get("id").clone()));
    }

    let unique: BTreeSet<String> = seen.iter().map(|v| v.to_string()).collect();
    assert_eq!(seen.len(), 23);
    assert_eq!(unique.len(), 23);

    // 重复请求结果一致
    let again = b
        .search(
            &store,
            &TARGET,
            &[],
            &PageRequest::new(1, 10).sorted_by(SortOrder::desc("salary")),
        )
        .unwrap();
    let again_ids: Vec<Value> = again.items.iter().map(|r| r.get("id").clone()).collect();
    assert_eq!(again_ids, seen[10..20].to_vec());
}

#[test]
fn test_page_beyond_total_skips_select() {
    let store = same_salary_store();
    let result = builder()
        .search(&store, &TARGET, &[], &PageRequest::new(5, 10))
        .unwrap();

    assert_eq!(result.total, 23);
    assert!(result.items.is_empty());
    assert!(!result.has_next());
    assert_eq!(store.count_calls(), 1);
    assert_eq!(store.select_calls(), 0);
}

#[test]
fn test_invalid_page_request_rejected() {
    let store = RecordingStore::default();
    for request in [PageRequest::new(0, 0), PageRequest::new(-1, 10), PageRequest::new(0, -5)] {
        let err = builder().search(&store, &TARGET, &[], &request).unwrap_err();
        assert!(matches!(err, QueryError::InvalidPageRequest(_)));
    }
    assert_eq!(store.calls.get(), 0);
}

#[test]
fn test_all_absent_filters_match_everything() {
    let store = same_salary_store();
    let fields = vec![
        FilterField::contains("name", None::<&str>),
        FilterField::between("salary", None::<f64>, None::<f64>),
        FilterField::in_set("status", None::<Vec<&str>>),
        FilterField::equals("department.name", None::<&str>),
    ];
    let result = builder()
        .search(&store, &TARGET, &fields, &PageRequest::first(50))
        .unwrap();
    assert_eq!(result.total, 23);
}

#[test]
fn test_between_is_inclusive_and_in_set_is_exact() {
    let store = MemoryStore::new(vec![
        employee(1, "Ann", 3000.0, "ACTIVE"),
        employee(2, "Bob", 4000.0, "ON_LEAVE"),
        employee(3, "Cid", 5000.0, "TERMINATED"),
        employee(4, "Dee", 6000.0, "ACTIVE"),
    ]);
    let b = builder();

    let in_band = b
        .search(
            &store,
            &TARGET,
            &[FilterField::between("salary", Some(4000.0), Some(5000.0))],
            &PageRequest::first(10),
        )
        .unwrap();
    let names: Vec<&str> = in_band.items.iter().filter_map(|r| r.get("name").as_text()).collect();
    assert_eq!(names, vec!["Bob", "Cid"]);

    let statuses = b
        .search(
            &store,
            &TARGET,
            &[FilterField::in_set("status", Some(["ON_LEAVE", "TERMINATED"]))],
            &PageRequest::first(10),
        )
        .unwrap();
    assert_eq!(statuses.total, 2);

    // 单侧区间
    let floor = b
        .search(
            &store,
            &TARGET,
            &[FilterField::between("salary", Some(5000.0), None)],
            &PageRequest::first(10),
        )
        .unwrap();
    assert_eq!(floor.total, 2);
}

#[test]
fn test_contains_is_case_insensitive_on_joined_path() {
    let store = MemoryStore::new(vec![
        employee(1, "Ann", 3000.0, "ACTIVE").with("department.name", "Research & Development"),
        employee(2, "Bob", 4000.0, "ACTIVE").with("department.name", "Sales"),
    ]);
    let result = builder()
        .search(
            &store,
            &TARGET,
            &[FilterField::contains("department.name", Some("DEVELOP"))],
            &PageRequest::first(10),
        )
        .unwrap();
    assert_eq!(result.total, 1);
    assert_eq!(result.items[0].get("name"), &Value::from("Ann"));
}

#[test]
fn test_null_never_satisfies_comparison() {
    let store = MemoryStore::new(vec![
        employee(1, "Ann", 3000.0, "ACTIVE").with("manager.id", "emp-09"),
        employee(2, "Bob", 4000.0, "ACTIVE"),
    ]);
    let b = builder();

    let not_managed_by = b
        .search(
            &store,
            &TARGET,
            &[FilterField::not_equals("manager.id", Some("emp-77"))],
            &PageRequest::first(10),
        )
        .unwrap();
    assert_eq!(not_managed_by.total, 1);

    let negated = b
        .build_filter(&TARGET, &[FilterField::equals("manager.id", Some("emp-09"))])
        .unwrap()
        .negate();
    assert_eq!(b.count(&store, &TARGET, &negated).unwrap(), 0);

    let unmanaged = b
        .search(
            &store,
            &TARGET,
            &[FilterField::is_null("manager.id")],
            &PageRequest::first(10),
        )
        .unwrap();
    assert_eq!(unmanaged.total, 1);
}

#[test]
fn test_overlap_predicate_over_store() {
    let leave = |id: &str, start: NaiveDate, end: NaiveDate| {
        Record::new()
            .with("id", id)
            .with("start_date", start)
            .with("end_date", end)
    };
    let store = MemoryStore::new(vec![
        leave("a", date(2024, 1, 10), date(2024, 1, 15)),
        leave("b", date(2024, 2, 1), date(2024, 2, 3)),
    ]);
    let check = |start: NaiveDate, end: NaiveDate| {
        let p = Predicate::overlaps("start_date", "end_date", start, end).unwrap();
        store_count(&store, &p)
    };
    assert_eq!(check(date(2024, 1, 15), date(2024, 1, 20)), 1);
    assert_eq!(check(date(2024, 1, 16), date(2024, 1, 31)), 0);
    assert_eq!(check(date(2024, 1, 1), date(2024, 3, 1)), 2);

    assert!(matches!(
        Predicate::overlaps("start_date", "end_date", date(2024, 1, 20), date(2024, 1, 10)),
        Err(QueryError::InvalidFilter { .. })
    ));
}

/// 存储层直接计数（谓词路径不经目标校验）
fn store_count(store: &MemoryStore, predicate: &Predicate) -> u64 {
    store.run_count(&TARGET, predicate, None).unwrap()
}

#[test]
fn test_expired_deadline_reports_timeout() {
    let store = same_salary_store();
    let b = builder();
    let query = b
        .paginate_and_sort(&TARGET, Predicate::All, &PageRequest::first(10))
        .unwrap()
        .with_deadline(Instant::now());

    let err = b.execute(&store, &query).unwrap_err();
    assert!(matches!(err, QueryError::Timeout(_)));
    assert!(!err.is_caller_error());
}
