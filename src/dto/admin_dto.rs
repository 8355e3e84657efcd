use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::models::employee_result::{EmployeeResult, ResultUpdate};
use crate::models::question::AnswerOption;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateTechnologyPayload {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[validate(schema(function = "validate_window"))]
pub struct CreateSchedulePayload {
    pub technology_id: Uuid,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    #[validate(range(min = 1))]
    pub duration_minutes: i32,
    #[validate(range(min = 1))]
    pub total_questions: i32,
    pub is_active: Option<bool>,
}

fn validate_window(payload: &CreateSchedulePayload) -> Result<(), ValidationError> {
    if payload.start_time >= payload.end_time {
        let mut err = ValidationError::new("window");
        err.message = Some("start_time must be before end_time".into());
        return Err(err);
    }
    Ok(())
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateQuestionPayload {
    pub technology_id: Uuid,
    #[validate(length(min = 1))]
    pub question_text: String,
    #[validate(length(min = 1, max = 255))]
    pub option_a: String,
    #[validate(length(min = 1, max = 255))]
    pub option_b: String,
    #[validate(length(min = 1, max = 255))]
    pub option_c: String,
    #[validate(length(min = 1, max = 255))]
    pub option_d: String,
    pub correct_option: AnswerOption,
    #[validate(custom(function = "validate_marks"))]
    pub marks: Option<Decimal>,
}

fn validate_marks(marks: &Decimal) -> Result<(), ValidationError> {
    if marks.is_sign_negative() || *marks >= Decimal::new(1000, 0) {
        return Err(ValidationError::new("marks_range"));
    }
    Ok(())
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateTechnologyPayload {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    pub description: Option<String>,
}

/// Partial schedule edit. The window is checked by the service after the
/// edit is merged with the stored schedule.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateSchedulePayload {
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    #[validate(range(min = 1))]
    pub duration_minutes: Option<i32>,
    #[validate(range(min = 1))]
    pub total_questions: Option<i32>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateQuestionPayload {
    #[validate(length(min = 1))]
    pub question_text: Option<String>,
    #[validate(length(min = 1, max = 255))]
    pub option_a: Option<String>,
    #[validate(length(min = 1, max = 255))]
    pub option_b: Option<String>,
    #[validate(length(min = 1, max = 255))]
    pub option_c: Option<String>,
    #[validate(length(min = 1, max = 255))]
    pub option_d: Option<String>,
    pub correct_option: Option<AnswerOption>,
    #[validate(custom(function = "validate_marks"))]
    pub marks: Option<Decimal>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TechnologyFilter {
    pub technology_id: Option<Uuid>,
}

/// Body for both the declare follow-up edit and the explicit result edit.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResultUpdatePayload {
    pub score: Option<Decimal>,
    pub passed: Option<bool>,
    pub remarks: Option<String>,
}

impl From<ResultUpdatePayload> for ResultUpdate {
    fn from(p: ResultUpdatePayload) -> Self {
        ResultUpdate {
            score: p.score,
            passed: p.passed,
            remarks: p.remarks,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DeclareResultResponse {
    pub result: EmployeeResult,
    pub already_declared: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AdminDashboard {
    pub technologies: i64,
    pub schedules: i64,
    pub active_schedules: i64,
    pub questions: i64,
    pub employees: i64,
    pub attempts: i64,
    pub completed_attempts: i64,
}
