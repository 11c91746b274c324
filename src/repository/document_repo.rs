// ==========================================
// 人事管理系统 - 员工文档数据仓储
// ==========================================

use crate::domain::{DocumentType, EmployeeDocument};
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
    FieldDef::new("id", "doc", "id", FieldKind::Text),
    FieldDef::new("employee.id", "doc", "employee_id", FieldKind::Text),
    FieldDef::new("doc_type", "doc", "doc_type", FieldKind::Text),
    FieldDef::new("title", "doc", "title", FieldKind::Text),
    FieldDef::new("file_path", "doc", "file_path", FieldKind::Text),
    FieldDef::new("verified", "doc", "verified", FieldKind::Bool),
    FieldDef::new("issued_date", "doc", "issued_date", FieldKind::Date),
    FieldDef::new("expiry_date", "doc", "expiry_date", FieldKind::Date),
    FieldDef::new("uploaded_at", "doc", "uploaded_at", FieldKind::DateTime),
    FieldDef::new("employee.status", "e", "status", FieldKind::Text),
];

pub static DOCUMENT_TARGET: QueryTarget = QueryTarget {
    entity: "EmployeeDocument",
    table: "employee_documents",
    alias: "doc",
    primary_key: "id",
    fields: FIELDS,
    joins: &[JoinDef {
        table: "employees",
        alias: "e",
        on: "e.id = doc.employee_id",
    }],
};

impl Entity for EmployeeDocument {
    fn target() -> &'static QueryTarget {
        &DOCUMENT_TARGET
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn from_record(record: &Record) -> RepositoryResult<Self> {
        Ok(Self {
            id: record.text("id")?,
            employee_id: record.text("employee.id")?,
            doc_type: record.parsed("doc_type")?,
            title: record.text("title")?,
            file_path: record.text("file_path")?,
            verified: record.boolean("verified")?,
            issued_date: record.opt_date("issued_date")?,
            expiry_date: record.opt_date("expiry_date")?,
            uploaded_at: record.datetime("uploaded_at")?,
        })
    }

    fn to_record(&self) -> Record {
        Record::new()
            .with("id", &self.id)
            .with("employee.id", &self.employee_id)
            .with("doc_type", self.doc_type)
            .with("title", &self.title)
            .with("file_path", &self.file_path)
            .with("verified", self.verified)
            .with("issued_date", self.issued_date)
            .with("expiry_date", self.expiry_date)
            .with("uploaded_at", self.uploaded_at)
    }
}

#[derive(Debug, Clone, Default)]
pub struct DocumentCriteria {
    pub employee_id: Option<String>,
    pub doc_type: Option<DocumentType>,
    pub title: Option<String>,
    pub verified: Option<bool>,
    pub expiry_from: Option<NaiveDate>,
    pub expiry_to: Option<NaiveDate>,
}

impl Criteria for DocumentCriteria {
    fn to_filters(&self) -> Vec<FilterField> {
        vec![
            FilterField::equals("employee.id", self.employee_id.as_deref()),
            FilterField::equals("doc_type", self.doc_type),
            FilterField::contains("title", self.title.as_deref()),
            FilterField::equals("verified", self.verified),
            FilterField::between("expiry_date", self.expiry_from, self.expiry_to),
        ]
    }
}

pub struct DocumentRepository {
    inner: EntityRepository<EmployeeDocument>,
}

impl DocumentRepository {
    pub fn new(conn: Arc<Mutex<Connection>>, builder: CriteriaQueryBuilder) -> RepositoryResult<Self> {
        Ok(Self {
            inner: EntityRepository::new(conn, builder)?,
        })
    }

    pub fn entities(&self) -> &EntityRepository<EmployeeDocument> {
        &self.inner
    }

    pub fn search(
        &self,
        criteria: &DocumentCriteria,
        page: &PageRequest,
    ) -> RepositoryResult<PageResult<EmployeeDocument>> {
        self.inner.search(&criteria.to_filters(), page)
    }

    /// 到期日不晚于 `date` 的文档（含已过期），按到期日排序
    pub fn find_expiring_on_or_before(
        &self,
        date: NaiveDate,
        page: &PageRequest,
    ) -> RepositoryResult<PageResult<EmployeeDocument>> {
        let page = page.clone().sorted_by(SortOrder::asc("expiry_date"));
        self.inner
            .search(&[FilterField::less_or_equal("expiry_date", Some(date))], &page)
    }

    /// 未登记到期日的文档
    pub fn find_missing_expiry(&self, doc_type: Option<DocumentType>) -> RepositoryResult<Vec<EmployeeDocument>> {
        self.inner.find_all(
            &[
                FilterField::is_null("expiry_date"),
                FilterField::equals("doc_type", doc_type),
            ],
            Vec::new(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Employee;
    use crate::repository::employee_repo::EmployeeRepository;
    use crate::repository::test_support::{builder, date, setup_test_db};

    fn setup() -> (DocumentRepository, Employee) {
        let conn = setup_test_db();
        let employees = EmployeeRepository::new(conn.clone(), builder()).unwrap();
        let ann = Employee::new("E001", "Ann", "ann@example.com", date(2023, 1, 1), 1.0);
        employees.entities().insert(&ann).unwrap();
        (DocumentRepository::new(conn, builder()).unwrap(), ann)
    }

    #[test]
    fn test_expiry_queries() {
        let (repo, ann) = setup();
        let passport = EmployeeDocument::new(&ann.id, DocumentType::Passport, "Passport", "/docs/p.pdf")
            .expires_on(date(2024, 6, 30));
        let cert = EmployeeDocument::new(&ann.id, DocumentType::Certificate, "AWS cert", "/docs/c.pdf")
            .expires_on(date(2024, 2, 1));
        let visa = EmployeeDocument::new(&ann.id, DocumentType::Other, "Visa", "/docs/v.pdf")
            .expires_on(date(2025, 1, 1));
        let contract = EmployeeDocument::new(&ann.id, DocumentType::Contract, "Contract", "/docs/k.pdf");
        for d in [&passport, &cert, &visa, &contract] {
            repo.entities().insert(d).unwrap();
        }

        let expiring = repo
            .find_expiring_on_or_before(date(2024, 6, 30), &PageRequest::first(10))
            .unwrap();
        let titles: Vec<_> = expiring.items.iter().map(|d| d.title.as_str()).collect();
        assert_eq!(titles, vec!["AWS cert", "Passport"]);
        assert_eq!(expiring.total, 2);

        assert_eq!(repo.find_missing_expiry(None).unwrap(), vec![contract]);
        assert!(repo.find_missing_expiry(Some(DocumentType::Passport)).unwrap().is_empty());
    }

    #[test]
    fn test_title_contains_and_verified_flag() {
        let (repo, ann) = setup();
        let mut cert = EmployeeDocument::new(&ann.id, DocumentType::Certificate, "First Aid Certificate", "/c1");
        cert.verified = true;
        repo.entities().insert(&cert).unwrap();
        repo.entities()
            .insert(&EmployeeDocument::new(&ann.id, DocumentType::Certificate, "Forklift certificate", "/c2"))
            .unwrap();

        let criteria = DocumentCriteria {
            title: Some("CERTIFICATE".to_string()),
            verified: Some(false),
            ..Default::default()
        };
        let found = repo.search(&criteria, &PageRequest::first(10)).unwrap();
        assert_eq!(found.total, 1);
        assert_eq!(found.items[0].title, "Forklift certificate");
    }
}
