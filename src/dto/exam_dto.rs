use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::question::{AnswerOption, Question};
use crate::services::attempt_service::{AttemptView, ExamSession, LateSubmission, SubmissionOutcome};
use crate::services::scoring_service::{GradedAnswer, ScoreBreakdown};

/// A question as shown to the examinee; the correct option never leaves the server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExamQuestion {
    pub id: Uuid,
    pub question_text: String,
    pub option_a: String,
    pub option_b: String,
    pub option_c: String,
    pub option_d: String,
    pub marks: Decimal,
}

impl From<&Question> for ExamQuestion {
    fn from(q: &Question) -> Self {
        Self {
            id: q.id,
            question_text: q.question_text.clone(),
            option_a: q.option_a.clone(),
            option_b: q.option_b.clone(),
            option_c: q.option_c.clone(),
            option_d: q.option_d.clone(),
            marks: q.marks,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExamSessionResponse {
    pub attempt_id: Uuid,
    pub schedule_id: Uuid,
    pub technology_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub remaining_seconds: i64,
    pub resumed: bool,
    pub questions: Vec<ExamQuestion>,
    pub existing_answers: HashMap<Uuid, String>,
}

impl From<ExamSession> for ExamSessionResponse {
    fn from(s: ExamSession) -> Self {
        Self {
            attempt_id: s.attempt.id,
            schedule_id: s.schedule.id,
            technology_id: s.schedule.technology_id,
            started_at: s.attempt.start_time,
            expires_at: s.expires_at,
            remaining_seconds: s.remaining_seconds,
            resumed: s.resumed,
            questions: s.questions.iter().map(ExamQuestion::from).collect(),
            existing_answers: s.existing_answers,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SubmitExamRequest {
    #[serde(default)]
    pub answers: HashMap<Uuid, AnswerOption>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SubmitExamResponse {
    pub attempt_id: Uuid,
    pub score: Decimal,
    pub breakdown: ScoreBreakdown,
    pub completed_at: Option<DateTime<Utc>>,
    pub late: Option<LateSubmission>,
    pub result_url: String,
}

impl From<SubmissionOutcome> for SubmitExamResponse {
    fn from(o: SubmissionOutcome) -> Self {
        Self {
            attempt_id: o.attempt.id,
            score: o.breakdown.percentage,
            completed_at: o.attempt.end_time,
            late: o.late,
            result_url: format!("/api/results/{}", o.attempt.id),
            breakdown: o.breakdown,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AttemptResultResponse {
    pub attempt_id: Uuid,
    pub employee_id: Uuid,
    pub schedule_id: Uuid,
    pub technology_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub score: Decimal,
    pub breakdown: ScoreBreakdown,
    pub answers: Vec<GradedAnswer>,
}

impl From<AttemptView> for AttemptResultResponse {
    fn from(v: AttemptView) -> Self {
        Self {
            attempt_id: v.attempt.id,
            employee_id: v.attempt.employee_id,
            schedule_id: v.schedule.id,
            technology_id: v.schedule.technology_id,
            started_at: v.attempt.start_time,
            completed_at: v.attempt.end_time,
            score: v.attempt.score.unwrap_or(Decimal::ZERO),
            breakdown: v.breakdown,
            answers: v.answers,
        }
    }
}
