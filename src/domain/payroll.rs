// ==========================================
// 人事管理系统 - 薪资调整领域模型
// ==========================================
// 扣款与奖金统一为 PayrollAdjustment，以 kind 区分
// ==========================================

use super::types::{new_id, AdjustmentKind, AdjustmentStatus};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayrollAdjustment {
    pub id: String,
    pub employee_id: String,
    pub kind: AdjustmentKind,
    pub category: String, // 如 TAX / INSURANCE / PERFORMANCE
    pub status: AdjustmentStatus,
    pub amount: f64, // 始终为正，方向由 kind 决定
    pub effective_date: NaiveDate,
    pub description: Option<String>,
}

impl PayrollAdjustment {
    pub fn new(
        employee_id: &str,
        kind: AdjustmentKind,
        category: &str,
        amount: f64,
        effective_date: NaiveDate,
    ) -> Self {
        Self {
            id: new_id(),
            employee_id: employee_id.to_string(),
            kind,
            category: category.to_string(),
            status: AdjustmentStatus::Pending,
            amount,
            effective_date,
            description: None,
        }
    }

    /// 带方向的金额（扣款为负）
    pub fn signed_amount(&self) -> f64 {
        match self.kind {
            AdjustmentKind::Bonus => self.amount,
            AdjustmentKind::Deduction => -self.amount,
        }
    }
}
