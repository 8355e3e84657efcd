use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct EmployeeProfile {
    pub id: Uuid,
    pub user_id: Uuid,
    pub employee_id: String,
    pub department: Option<String>,
}
