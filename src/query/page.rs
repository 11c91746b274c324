// ==========================================
// 人事管理系统 - 排序与分页
// ==========================================
// - SortSpec: 有序 (字段路径, 方向) 列表；空 = 自然顺序
// - PageRequest: 页号从 0 开始，页大小为正整数
// - PageResult: 当页数据 + 与分页无关的总数 + 派生总页数
// ==========================================

use super::error::{QueryError, QueryResult};
use serde::{Deserialize, Serialize};

/// 排序方向
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

/// 单个排序项
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortOrder {
    pub path: String,
    pub direction: SortDirection,
}

impl SortOrder {
    pub fn asc(path: &str) -> Self {
        Self {
            path: path.to_string(),
            direction: SortDirection::Asc,
        }
    }

    pub fn desc(path: &str) -> Self {
        Self {
            path: path.to_string(),
            direction: SortDirection::Desc,
        }
    }
}

pub type SortSpec = Vec<SortOrder>;

/// 分页请求
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    /// 页号（从 0 开始）
    pub page: i64,
    /// 页大小
    pub size: i64,
    #[serde(default)]
    pub sort: SortSpec,
}

impl PageRequest {
    pub fn new(page: i64, size: i64) -> Self {
        Self {
            page,
            size,
            sort: Vec::new(),
        }
    }

    pub fn first(size: i64) -> Self {
        Self::new(0, size)
    }

    pub fn sorted_by(mut self, order: SortOrder) -> Self {
        self.sort.push(order);
        self
    }

    pub fn with_sort(mut self, sort: SortSpec) -> Self {
        self.sort = sort;
        self
    }

    /// 校验并计算窗口 (offset, limit)
    pub fn window(&self, max_page_size: u64) -> QueryResult<(u64, u64)> {
        if self.size <= 0 {
            return Err(QueryError::InvalidPageRequest(format!(
                "页大小必须为正整数: size={}",
                self.size
            )));
        }
        if self.page < 0 {
            return Err(QueryError::InvalidPageRequest(format!(
                "页号不能为负数: page={}",
                self.page
            )));
        }

        let size = self.size as u64;
        if size > max_page_size {
            return Err(QueryError::InvalidPageRequest(format!(
                "页大小超过上限: size={}, max={}",
                size, max_page_size
            )));
        }

        let offset = (self.page as u64).checked_mul(size).ok_or_else(|| {
            QueryError::InvalidPageRequest(format!(
                "分页偏移溢出: page={}, size={}",
                self.page, self.size
            ))
        })?;

        Ok((offset, size))
    }
}

/// 分页结果
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageResult<T> {
    pub items: Vec<T>,
    /// 满足过滤条件的总行数（与分页无关）
    pub total: u64,
    pub page: u64,
    pub size: u64,
    pub total_pages: u64,
}

impl<T> PageResult<T> {
    pub fn new(items: Vec<T>, total: u64, page: u64, size: u64) -> Self {
        let total_pages = if size == 0 { 0 } else { total.div_ceil(size) };
        Self {
            items,
            total,
            page,
            size,
            total_pages,
        }
    }

    pub fn empty(page: u64, size: u64) -> Self {
        Self::new(Vec::new(), 0, page, size)
    }

    pub fn has_next(&self) -> bool {
        self.page + 1 < self.total_pages
    }

    pub fn map<U, F: FnMut(T) -> U>(self, f: F) -> PageResult<U> {
        PageResult {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            size: self.size,
            total_pages: self.total_pages,
        }
    }

    pub fn try_map<U, E, F: FnMut(T) -> Result<U, E>>(self, f: F) -> Result<PageResult<U>, E> {
        let items = self.items.into_iter().map(f).collect::<Result<Vec<_>, E>>()?;
        Ok(PageResult {
            items,
            total: self.total,
            page: self.page,
            size: self.size,
            total_pages: self.total_pages,
        })
    }
}
