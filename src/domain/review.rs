// ==========================================
// 人事管理系统 - 绩效评估领域模型
// ==========================================

use super::types::{new_id, ReviewStatus};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceReview {
    pub id: String,
    pub employee_id: String,
    pub reviewer_id: Option<String>,
    pub period: String, // 考核周期标识，如 2024-H1
    pub review_date: NaiveDate,
    pub rating: Option<f64>, // 1.0 ~ 5.0，草稿阶段可为空
    pub status: ReviewStatus,
    pub comments: Option<String>,
}

impl PerformanceReview {
    pub fn new(employee_id: &str, reviewer_id: Option<&str>, period: &str, review_date: NaiveDate) -> Self {
        Self {
            id: new_id(),
            employee_id: employee_id.to_string(),
            reviewer_id: reviewer_id.map(str::to_string),
            period: period.to_string(),
            review_date,
            rating: None,
            status: ReviewStatus::Draft,
            comments: None,
        }
    }

    pub fn rated(mut self, rating: f64) -> Self {
        self.rating = Some(rating);
        self
    }
}
