use super::*;
use crate::query::{FieldDef, FieldKind, QueryError, SortOrder};
use crate::repository::mapping::RecordExt;
use crate::repository::test_support::{builder, builder_with_max_page, date};
use chrono::NaiveDate;

static NOTE_FIELDS: &[FieldDef] = &[
    FieldDef::new("id", "n", "id", FieldKind::Text),
    FieldDef::new("title", "n", "title", FieldKind::Text),
    FieldDef::new("priority", "n", "priority", FieldKind::Integer),
    FieldDef::new("due_date", "n", "due_date", FieldKind::Date),
];

static NOTE_TARGET: QueryTarget = QueryTarget {
    entity: "Note",
    table: "notes",
    alias: "n",
    primary_key: "id",
    fields: NOTE_FIELDS,
    joins: &[],
};

#[derive(Debug, Clone, PartialEq)]
struct Note {
    id: String,
    title: String,
    priority: i64,
    due_date: Option<NaiveDate>,
}

impl Entity for Note {
    fn target() -> &'static QueryTarget {
        &NOTE_TARGET
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn from_record(record: &Record) -> RepositoryResult<Self> {
        Ok(Self {
            id: record.text("id")?,
            title: record.text("title")?,
            priority: record.integer("priority")?,
            due_date: record.opt_date("due_date")?,
        })
    }

    fn to_record(&self) -> Record {
        Record::new()
            .with("id", &self.id)
            .with("title", &self.title)
            .with("priority", self.priority)
            .with("due_date", self.due_date)
    }
}

fn note(id: &str, title: &str, priority: i64) -> Note {
    Note {
        id: id.to_string(),
        title: title.to_string(),
        priority,
        due_date: None,
    }
}

fn setup_repo() -> EntityRepository<Note> {
    setup_repo_with(builder())
}

fn setup_repo_with(builder: CriteriaQueryBuilder) -> EntityRepository<Note> {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(
        r#"
        CREATE TABLE notes (
            id TEXT PRIMARY KEY,
            title TEXT NOT NULL,
            priority INTEGER NOT NULL,
            due_date TEXT
        );
        "#,
    )
    .unwrap();
    EntityRepository::new(Arc::new(Mutex::new(conn)), builder).unwrap()
}

#[test]
fn test_insert_find_update_delete() {
    let repo = setup_repo();
    let mut n = note("n1", "Quarterly review", 2);
    n.due_date = Some(date(2024, 3, 31));

    assert_eq!(repo.insert(&n).unwrap(), "n1");
    assert_eq!(repo.find_by_id("n1").unwrap(), Some(n.clone()));

    n.title = "Quarterly review (moved)".to_string();
    n.due_date = None;
    repo.update(&n).unwrap();
    assert_eq!(repo.find_by_id("n1").unwrap(), Some(n));

    assert!(repo.delete_by_id("n1").unwrap());
    assert!(!repo.delete_by_id("n1").unwrap());
    assert_eq!(repo.find_by_id("n1").unwrap(), None);
}

#[test]
fn test_update_missing_row_is_not_found() {
    let repo = setup_repo();
    let err = repo.update(&note("ghost", "x", 1)).unwrap_err();
    assert!(matches!(err, RepositoryError::NotFound { ref id, .. } if id == "ghost"));
}

#[test]
fn test_duplicate_primary_key_is_unique_violation() {
    let repo = setup_repo();
    repo.insert(&note("n1", "a", 1)).unwrap();
    let err = repo.insert(&note("n1", "b", 1)).unwrap_err();
    assert!(matches!(err, RepositoryError::UniqueConstraintViolation(_)));
}

#[test]
fn test_search_pages_are_stable_and_exact() {
    let repo = setup_repo();
    for i in 0..23 {
        repo.insert(&note(&format!("n{:02}", i), "same", i % 3)).unwrap();
    }

    let mut seen = Vec::new();
    for (page, expected) in [(0, 10), (1, 10), (2, 3)] {
        let request = PageRequest::new(page, 10).sorted_by(SortOrder::asc("priority"));
        let result = repo.search(&[], &request).unwrap();
        assert_eq!(result.total, 23);
        assert_eq!(result.items.len(), expected);
        assert_eq!(result.total_pages, 3);

        let again = repo.search(&[], &request).unwrap();
        assert_eq!(result.items, again.items);
        seen.extend(result.items.into_iter().map(|n| n.id));
    }

    seen.sort();
    seen.dedup();
    assert_eq!(seen.len(), 23);
}

#[test]
fn test_count_exists_and_grouped() {
    let repo = setup_repo();
    for i in 0..6 {
        repo.insert(&note(&format!("n{}", i), if i < 2 { "Urgent call" } else { "memo" }, i % 2))
            .unwrap();
    }

    assert_eq!(repo.count(&[]).unwrap(), 6);
    assert_eq!(repo.count(&[FilterField::contains("title", Some("URGENT"))]).unwrap(), 2);
    assert!(repo.exists(&[FilterField::equals("priority", Some(1))]).unwrap());
    assert!(!repo.exists(&[FilterField::equals("priority", Some(7))]).unwrap());

    let grouped = repo
        .count_grouped("priority", &[0_i64, 1, 2], &[FilterField::equals("title", Some("memo"))])
        .unwrap();
    assert_eq!(grouped, vec![(0, 2), (1, 2), (2, 0)]);
}

#[test]
fn test_find_all_respects_sort() {
    let repo = setup_repo();
    repo.insert(&note("a", "x", 3)).unwrap();
    repo.insert(&note("b", "x", 1)).unwrap();
    repo.insert(&note("c", "x", 2)).unwrap();

    let ids: Vec<String> = repo
        .find_all(&[], vec![SortOrder::desc("priority")])
        .unwrap()
        .into_iter()
        .map(|n| n.id)
        .collect();
    assert_eq!(ids, vec!["a", "c", "b"]);
}

#[test]
fn test_find_all_reads_every_page_beyond_max_page_size() {
    let repo = setup_repo_with(builder_with_max_page(2));
    for (id, priority) in [("a", 5), ("b", 4), ("c", 3), ("d", 2), ("e", 1)] {
        repo.insert(&note(id, "x", priority)).unwrap();
    }

    let ids: Vec<String> = repo
        .find_all(&[], vec![SortOrder::asc("priority")])
        .unwrap()
        .into_iter()
        .map(|n| n.id)
        .collect();
    assert_eq!(ids, vec!["e", "d", "c", "b", "a"]);

    // 恰好整页
    repo.delete_by_id("e").unwrap();
    assert_eq!(repo.find_all(&[], Vec::new()).unwrap().len(), 4);
}

#[test]
fn test_caller_errors_surface_as_query_errors() {
    let repo = setup_repo();
    let err = repo
        .search(&[FilterField::equals("owner.name", Some("x"))], &PageRequest::first(10))
        .unwrap_err();
    assert!(matches!(err, RepositoryError::Query(QueryError::UnknownField { .. })));
    assert!(err.is_caller_error());
}

#[test]
fn test_construction_fails_when_schema_lacks_declared_column() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch("CREATE TABLE notes (id TEXT PRIMARY KEY, title TEXT NOT NULL);")
        .unwrap();

    let result = EntityRepository::<Note>::new(Arc::new(Mutex::new(conn)), builder());
    assert!(matches!(
        result,
        Err(RepositoryError::Query(QueryError::UnknownField { ref path, .. })) if path == "priority"
    ));
}
