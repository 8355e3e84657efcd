use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Answer {
    pub id: Uuid,
    pub test_attempt_id: Uuid,
    pub question_id: Uuid,
    pub selected_option: Option<String>,
}

/// One row of the answer set written at submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAnswer {
    pub question_id: Uuid,
    pub selected_option: Option<String>,
}
