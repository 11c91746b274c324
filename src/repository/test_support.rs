// 仓储单元测试公共夹具

use crate::config::QueryConfig;
use crate::query::CriteriaQueryBuilder;
use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::Connection;
use std::sync::{Arc, Mutex};

/// 内存库 + 完整 schema
pub(crate) fn setup_test_db() -> Arc<Mutex<Connection>> {
    let conn = Connection::open_in_memory().unwrap();
    crate::db::configure_sqlite_connection(&conn).unwrap();
    crate::db::init_schema(&conn).unwrap();
    Arc::new(Mutex::new(conn))
}

pub(crate) fn builder() -> CriteriaQueryBuilder {
    CriteriaQueryBuilder::new(QueryConfig::default())
}

/// 最大页大小很小的构建器（用于验证多页读取）
pub(crate) fn builder_with_max_page(max_page_size: u64) -> CriteriaQueryBuilder {
    CriteriaQueryBuilder::new(QueryConfig {
        default_page_size: max_page_size as i64,
        max_page_size,
        ..QueryConfig::default()
    })
}

pub(crate) fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub(crate) fn datetime(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
    date(y, m, d).and_hms_opt(h, min, 0).unwrap()
}
