// ==========================================
// 人事管理系统 - 领域类型定义
// ==========================================
// 状态/类型统一为强类型枚举
// 序列化格式: SCREAMING_SNAKE_CASE (与数据库一致)
// ==========================================

use chrono::{NaiveDateTime, Timelike, Utc};

/// 生成文本枚举: as_str / FromStr / Display / 转 Value
macro_rules! text_enum {
    (
        $(#[$meta:meta])*
        $name:ident {
            $($variant:ident => $text:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        #[serde(rename_all = "SCREAMING_SNAKE_CASE")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// 转换为字符串 (用于数据库存储)
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok($name::$variant),)+
                    other => Err(format!("未知的 {} 取值: {}", stringify!($name), other)),
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl From<$name> for crate::query::Value {
            fn from(v: $name) -> Self {
                crate::query::Value::Text(v.as_str().to_string())
            }
        }
    };
}

text_enum! {
    /// 在职状态
    EmployeeStatus {
        Active => "ACTIVE",
        OnLeave => "ON_LEAVE",
        Suspended => "SUSPENDED",
        Terminated => "TERMINATED",
    }
}

text_enum! {
    /// 考勤状态
    AttendanceStatus {
        Present => "PRESENT",
        Late => "LATE",
        Absent => "ABSENT",
        HalfDay => "HALF_DAY",
        Remote => "REMOTE",
    }
}

text_enum! {
    BreakType {
        Lunch => "LUNCH",
        Rest => "REST",
        Personal => "PERSONAL",
    }
}

text_enum! {
    LeaveType {
        Annual => "ANNUAL",
        Sick => "SICK",
        Personal => "PERSONAL",
        Maternity => "MATERNITY",
        Paternity => "PATERNITY",
        Unpaid => "UNPAID",
    }
}

text_enum! {
    /// 请假审批状态
    LeaveStatus {
        Pending => "PENDING",
        Approved => "APPROVED",
        Rejected => "REJECTED",
        Cancelled => "CANCELLED",
    }
}

text_enum! {
    /// 薪资调整方向
    AdjustmentKind {
        Deduction => "DEDUCTION",
        Bonus => "BONUS",
    }
}

text_enum! {
    AdjustmentStatus {
        Pending => "PENDING",
        Approved => "APPROVED",
        Paid => "PAID",
        Cancelled => "CANCELLED",
    }
}

text_enum! {
    DocumentType {
        Contract => "CONTRACT",
        IdCard => "ID_CARD",
        Passport => "PASSPORT",
        Certificate => "CERTIFICATE",
        TaxForm => "TAX_FORM",
        Other => "OTHER",
    }
}

text_enum! {
    ReviewStatus {
        Draft => "DRAFT",
        Submitted => "SUBMITTED",
        Acknowledged => "ACKNOWLEDGED",
        Finalized => "FINALIZED",
    }
}

text_enum! {
    PermissionAction {
        Read => "READ",
        Create => "CREATE",
        Update => "UPDATE",
        Delete => "DELETE",
        Approve => "APPROVE",
    }
}

text_enum! {
    /// 审计动作
    AuditAction {
        Create => "CREATE",
        Update => "UPDATE",
        Delete => "DELETE",
        Login => "LOGIN",
        Logout => "LOGOUT",
        Approve => "APPROVE",
        Reject => "REJECT",
        Export => "EXPORT",
    }
}

/// 新实体主键
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// 当前时间（UTC，截断到秒，与存储格式一致）
pub fn now_seconds() -> NaiveDateTime {
    let now = Utc::now().naive_utc();
    now.with_nanosecond(0).unwrap_or(now)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::Value;

    #[test]
    fn test_text_enum_round_trip_and_storage_form() {
        for status in LeaveStatus::ALL {
            assert_eq!(status.as_str().parse::<LeaveStatus>().unwrap(), *status);
        }
        assert_eq!(EmployeeStatus::OnLeave.to_string(), "ON_LEAVE");
        assert_eq!(
            Value::from(DocumentType::IdCard),
            Value::Text("ID_CARD".to_string())
        );
        assert!("on_leave".parse::<EmployeeStatus>().is_err());
    }

    #[test]
    fn test_serde_uses_screaming_snake_case() {
        let json = serde_json::to_string(&AttendanceStatus::HalfDay).unwrap();
        assert_eq!(json, "\"HALF_DAY\"");
        let back: AttendanceStatus = serde_json::from_str(&json).unwrap();
        assert_eq!(back, AttendanceStatus::HalfDay);
    }

    #[test]
    fn test_now_seconds_has_no_fraction() {
        assert_eq!(now_seconds().nanosecond(), 0);
    }
}
