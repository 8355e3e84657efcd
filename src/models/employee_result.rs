use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct EmployeeResult {
    pub id: Uuid,
    pub employee_id: Uuid,
    pub test_schedule_id: Uuid,
    /// Null once the originating attempt has been deleted.
    pub test_attempt_id: Option<Uuid>,
    pub score: Decimal,
    pub passed: bool,
    pub declared_by: Option<Uuid>,
    pub declared_at: DateTime<Utc>,
    pub remarks: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewResult {
    pub employee_id: Uuid,
    pub test_schedule_id: Uuid,
    pub test_attempt_id: Uuid,
    pub score: Decimal,
    pub passed: bool,
    pub declared_by: Uuid,
    pub declared_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultUpdate {
    pub score: Option<Decimal>,
    pub passed: Option<bool>,
    pub remarks: Option<String>,
}

impl ResultUpdate {
    pub fn is_empty(&self) -> bool {
        self.score.is_none() && self.passed.is_none() && self.remarks.is_none()
    }
}
