// ==========================================
// 人事管理系统 - 薪资调整数据仓储
// ==========================================
// 扣款/奖金按员工、类型、状态、生效日期与金额区间检索
// ==========================================

use crate::domain::{AdjustmentKind, AdjustmentStatus, PayrollAdjustment};
use crate::query::{
    CriteriaQueryBuilder, FieldDef, FieldKind, FilterField, JoinDef, PageRequest, PageResult,
    QueryTarget, Record, SortOrder,
};
use crate::repository::entity_repo::{Criteria, Entity, EntityRepository};
use crate::repository::error::RepositoryResult;
use crate::repository::mapping::RecordExt;
use chrono::NaiveDate;
use rusqlite::Connection;
use std::sync::{Arc, Mutex};

static FIELDS: &[FieldDef] = &[
    FieldDef::new("id", "pa", "id", FieldKind::Text),
    FieldDef::new("employee.id", "pa", "employee_id", FieldKind::Text),
    FieldDef::new("kind", "pa", "kind", FieldKind::Text),
    FieldDef::new("category", "pa", "category", FieldKind::Text),
    FieldDef::new("status", "pa", "status", FieldKind::Text),
    FieldDef::new("amount", "pa", "amount", FieldKind::Real),
    FieldDef::new("effective_date", "pa", "effective_date", FieldKind::Date),
    FieldDef::new("description", "pa", "description", FieldKind::Text),
    FieldDef::new("employee.department.id", "e", "department_id", FieldKind::Text),
];

pub static PAYROLL_TARGET: QueryTarget = QueryTarget {
    entity: "PayrollAdjustment",
    table: "payroll_adjustments",
    alias: "pa",
    primary_key: "id",
    fields: FIELDS,
    joins: &[JoinDef {
        table: "employees",
        alias: "e",
        on: "e.id = pa.employee_id",
    }],
};

impl Entity for PayrollAdjustment {
    fn target() -> &'static QueryTarget {
        &PAYROLL_TARGET
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn from_record(record: &Record) -> RepositoryResult<Self> {
        Ok(Self {
            id: record.text("id")?,
            employee_id: record.text("employee.id")?,
            kind: record.parsed("kind")?,
            category: record.text("category")?,
            status: record.parsed("status")?,
            amount: record.real("amount")?,
            effective_date: record.date("effective_date")?,
            description: record.opt_text("description")?,
        })
    }

    fn to_record(&self) -> Record {
        Record::new()
            .with("id", &self.id)
            .with("employee.id", &self.employee_id)
            .with("kind", self.kind)
            .with("category", &self.category)
            .with("status", self.status)
            .with("amount", self.amount)
            .with("effective_date", self.effective_date)
            .with("description", self.description.as_deref())
    }
}

#[derive(Debug, Clone, Default)]
pub struct PayrollCriteria {
    pub employee_id: Option<String>,
    pub department_id: Option<String>,
    pub kind: Option<AdjustmentKind>,
    pub category: Option<String>,
    pub status: Option<AdjustmentStatus>,
    pub effective_from: Option<NaiveDate>,
    pub effective_to: Option<NaiveDate>,
    pub amount_min: Option<f64>,
    pub amount_max: Option<f64>,
}

impl Criteria for PayrollCriteria {
    fn to_filters(&self) -> Vec<FilterField> {
        vec![
            FilterField::equals("employee.id", self.employee_id.as_deref()),
            FilterField::equals("employee.department.id", self.department_id.as_deref()),
            FilterField::equals("kind", self.kind),
            FilterField::equals("category", self.category.as_deref()),
            FilterField::equals("status", self.status),
            FilterField::between("effective_date", self.effective_from, self.effective_to),
            FilterField::between("amount", self.amount_min, self.amount_max),
        ]
    }
}

pub struct PayrollRepository {
    inner: EntityRepository<PayrollAdjustment>,
}

impl PayrollRepository {
    pub fn new(conn: Arc<Mutex<Connection>>, builder: CriteriaQueryBuilder) -> RepositoryResult<Self> {
        Ok(Self {
            inner: EntityRepository::new(conn, builder)?,
        })
    }

    pub fn entities(&self) -> &EntityRepository<PayrollAdjustment> {
        &self.inner
    }

    pub fn search(
        &self,
        criteria: &PayrollCriteria,
        page: &PageRequest,
    ) -> RepositoryResult<PageResult<PayrollAdjustment>> {
        self.inner.search(&criteria.to_filters(), page)
    }

    /// 员工在 [from, to] 生效的调整（可选限定类型），按生效日期排序
    pub fn find_for_period(
        &self,
        employee_id: &str,
        from: NaiveDate,
        to: NaiveDate,
        kind: Option<AdjustmentKind>,
    ) -> RepositoryResult<Vec<PayrollAdjustment>> {
        let criteria = PayrollCriteria {
            employee_id: Some(employee_id.to_string()),
            kind,
            effective_from: Some(from),
            effective_to: Some(to),
            ..Default::default()
        };
        self.inner.find_all(
            &criteria.to_filters(),
            vec![SortOrder::asc("effective_date")],
        )
    }

    /// 期间净额（奖金为正，扣款为负；已撤销的不计）
    pub fn net_for_period(&self, employee_id: &str, from: NaiveDate, to: NaiveDate) -> RepositoryResult<f64> {
        Ok(self
            .find_for_period(employee_id, from, to, None)?
            .iter()
            .filter(|a| a.status != AdjustmentStatus::Cancelled)
            .map(PayrollAdjustment::signed_amount)
            .sum())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Employee;
    use crate::repository::employee_repo::EmployeeRepository;
    use crate::repository::test_support::{builder, builder_with_max_page, date, setup_test_db};

    fn setup() -> (PayrollRepository, Employee) {
        setup_with(builder())
    }

    fn setup_with(payroll_builder: CriteriaQueryBuilder) -> (PayrollRepository, Employee) {
        let conn = setup_test_db();
        let employees = EmployeeRepository::new(conn.clone(), builder()).unwrap();
        let ann = Employee::new("E001", "Ann", "ann@example.com", date(2023, 1, 1), 1.0);
        employees.entities().insert(&ann).unwrap();
        (PayrollRepository::new(conn, payroll_builder).unwrap(), ann)
    }

    #[test]
    fn test_period_lookup_and_net_amount() {
        let (repo, ann) = setup();
        let bonus = PayrollAdjustment::new(&ann.id, AdjustmentKind::Bonus, "PERFORMANCE", 800.0, date(2024, 3, 31));
        let tax = PayrollAdjustment::new(&ann.id, AdjustmentKind::Deduction, "TAX", 150.0, date(2024, 3, 1));
        let april = PayrollAdjustment::new(&ann.id, AdjustmentKind::Bonus, "HOLIDAY", 100.0, date(2024, 4, 1));
        let mut cancelled = PayrollAdjustment::new(&ann.id, AdjustmentKind::Deduction, "LOAN", 999.0, date(2024, 3, 15));
        cancelled.status = AdjustmentStatus::Cancelled;
        for a in [&bonus, &tax, &april, &cancelled] {
            repo.entities().insert(a).unwrap();
        }

        let march = repo
            .find_for_period(&ann.id, date(2024, 3, 1), date(2024, 3, 31), None)
            .unwrap();
        let categories: Vec<_> = march.iter().map(|a| a.category.as_str()).collect();
        assert_eq!(categories, vec!["TAX", "LOAN", "PERFORMANCE"]);

        let deductions = repo
            .find_for_period(&ann.id, date(2024, 3, 1), date(2024, 3, 31), Some(AdjustmentKind::Deduction))
            .unwrap();
        assert_eq!(deductions.len(), 2);

        let net = repo.net_for_period(&ann.id, date(2024, 3, 1), date(2024, 3, 31)).unwrap();
        assert!((net - 650.0).abs() < 1e-9);
    }

    #[test]
    fn test_amount_range_criteria() {
        let (repo, ann) = setup();
        for amount in [50.0, 100.0, 250.0, 1000.0] {
            let a = PayrollAdjustment::new(&ann.id, AdjustmentKind::Bonus, "OTHER", amount, date(2024, 1, 1));
            repo.entities().insert(&a).unwrap();
        }

        let criteria = PayrollCriteria {
            amount_min: Some(100.0),
            amount_max: Some(250.0),
            ..Default::default()
        };
        assert_eq!(repo.search(&criteria, &PageRequest::first(10)).unwrap().total, 2);
    }

    #[test]
    fn test_net_amount_spans_multiple_pages() {
        let (repo, ann) = setup_with(builder_with_max_page(2));

        for day in [5, 12, 19] {
            let a = PayrollAdjustment::new(&ann.id, AdjustmentKind::Bonus, "OTHER", 100.0, date(2024, 3, day));
            repo.entities().insert(&a).unwrap();
        }

        let net = repo.net_for_period(&ann.id, date(2024, 3, 1), date(2024, 3, 31)).unwrap();
        assert!((net - 300.0).abs() < 1e-9);
        assert_eq!(
            repo.find_for_period(&ann.id, date(2024, 3, 1), date(2024, 3, 31), None).unwrap().len(),
            3
        );
    }
}
