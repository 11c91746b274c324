use super::*;
use crate::domain::{AttendanceBreak, AttendanceRecord, AttendanceStatus, BreakType, Department, Employee};
use crate::query::{PageRequest, QueryError};
use crate::repository::employee_repo::EmployeeRepository;
use crate::repository::error::RepositoryError;
use crate::repository::organization_repo::DepartmentRepository;
use crate::repository::test_support::{builder, date, datetime, setup_test_db};

struct Fixture {
    records: AttendanceRepository,
    breaks: AttendanceBreakRepository,
    ann: Employee,
    bob: Employee,
    ops: Department,
}

fn setup() -> Fixture {
    let conn = setup_test_db();
    let departments = DepartmentRepository::new(conn.clone(), builder()).unwrap();
    let employees = EmployeeRepository::new(conn.clone(), builder()).unwrap();

    let eng = Department::new("ENG", "Engineering", None);
    let ops = Department::new("OPS", "Operations", None);
    departments.entities().insert(&eng).unwrap();
    departments.entities().insert(&ops).unwrap();

    let ann = Employee::new("E001", "Ann", "ann@example.com", date(2023, 1, 1), 1.0).in_department(&eng.id);
    let bob = Employee::new("E002", "Bob", "bob@example.com", date(2023, 1, 1), 1.0).in_department(&ops.id);
    employees.entities().insert(&ann).unwrap();
    employees.entities().insert(&bob).unwrap();

    Fixture {
        records: AttendanceRepository::new(conn.clone(), builder()).unwrap(),
        breaks: AttendanceBreakRepository::new(conn, builder()).unwrap(),
        ann,
        bob,
        ops,
    }
}

fn clock_in(f: &Fixture, employee: &Employee, day: u32, status: AttendanceStatus) -> AttendanceRecord {
    let record = AttendanceRecord::open(&employee.id, datetime(2024, 1, day, 9, 0), status);
    f.records.entities().insert(&record).unwrap();
    record
}

#[test]
fn test_open_records_and_check_out() {
    let f = setup();
    let mut monday = clock_in(&f, &f.ann, 15, AttendanceStatus::Present);
    clock_in(&f, &f.bob, 15, AttendanceStatus::Late);

    assert_eq!(f.records.find_open_records(None).unwrap().len(), 2);

    monday.check_out = Some(datetime(2024, 1, 15, 17, 30));
    f.records.entities().update(&monday).unwrap();

    let open = f.records.find_open_records(None).unwrap();
    assert_eq!(open.len(), 1);
    assert_eq!(open[0].employee_id, f.bob.id);
    assert!(f.records.find_open_records(Some(f.ann.id.as_str())).unwrap().is_empty());

    let stored = f.records.find_for_day(&f.ann.id, date(2024, 1, 15)).unwrap().unwrap();
    assert_eq!(stored.worked_minutes(), Some(510));
}

#[test]
fn test_attendance_criteria_by_department_and_date_range() {
    let f = setup();
    for day in 10..=16 {
        clock_in(&f, &f.ann, day, AttendanceStatus::Present);
        clock_in(&f, &f.bob, day, AttendanceStatus::Remote);
    }

    let criteria = AttendanceCriteria {
        department_id: Some(f.ops.id.clone()),
        date_from: Some(date(2024, 1, 12)),
        date_to: Some(date(2024, 1, 14)),
        ..Default::default()
    };
    let page = f.records.search(&criteria, &PageRequest::first(10)).unwrap();
    assert_eq!(page.total, 3);
    assert!(page.items.iter().all(|r| r.employee_id == f.bob.id));

    let inverted = AttendanceCriteria {
        date_from: Some(date(2024, 1, 14)),
        date_to: Some(date(2024, 1, 12)),
        ..Default::default()
    };
    let err = f.records.count(&inverted).unwrap_err();
    assert!(matches!(err, RepositoryError::Query(QueryError::InvalidFilter { .. })));
}

#[test]
fn test_overlapping_breaks_are_inclusive_and_scoped_to_employee() {
    let f = setup();
    let ann_day = clock_in(&f, &f.ann, 15, AttendanceStatus::Present);
    let bob_day = clock_in(&f, &f.bob, 15, AttendanceStatus::Present);

    let lunch = AttendanceBreak::new(
        &ann_day.id,
        BreakType::Lunch,
        datetime(2024, 1, 15, 12, 0),
        datetime(2024, 1, 15, 12, 45),
    );
    let bob_lunch = AttendanceBreak::new(
        &bob_day.id,
        BreakType::Lunch,
        datetime(2024, 1, 15, 12, 0),
        datetime(2024, 1, 15, 13, 0),
    );
    f.breaks.entities().insert(&lunch).unwrap();
    f.breaks.entities().insert(&bob_lunch).unwrap();

    let touching = f
        .breaks
        .find_overlapping(&f.ann.id, datetime(2024, 1, 15, 12, 45), datetime(2024, 1, 15, 13, 0))
        .unwrap();
    assert_eq!(touching, vec![lunch.clone()]);

    assert!(!f
        .breaks
        .has_overlapping(&f.ann.id, datetime(2024, 1, 15, 12, 46), datetime(2024, 1, 15, 13, 0))
        .unwrap());
    assert!(f
        .breaks
        .has_overlapping(&f.ann.id, datetime(2024, 1, 15, 11, 0), datetime(2024, 1, 15, 14, 0))
        .unwrap());

    assert_eq!(f.breaks.find_by_attendance(&ann_day.id).unwrap(), vec![lunch]);
}

#[test]
fn test_overlap_with_inverted_interval_is_rejected() {
    let f = setup();
    let err = f
        .breaks
        .find_overlapping(&f.ann.id, datetime(2024, 1, 15, 13, 0), datetime(2024, 1, 15, 12, 0))
        .unwrap_err();
    assert!(matches!(err, RepositoryError::Query(QueryError::InvalidFilter { .. })));
}
