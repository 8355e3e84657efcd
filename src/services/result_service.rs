use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use crate::database::store::ExamStore;
use crate::error::{Error, Result};
use crate::models::employee_result::{EmployeeResult, NewResult, ResultUpdate};
use crate::models::test_attempt::TestAttempt;
use crate::services::scoring_service::{GradedAnswer, ScoreBreakdown, ScoringService};

/// Minimum percentage for a pass.
pub const PASS_MARK: Decimal = Decimal::from_parts(50, 0, 0, false, 0);

pub fn is_passing(score: Decimal) -> bool {
    score >= PASS_MARK
}

fn check_update(update: &ResultUpdate) -> Result<()> {
    match update.score {
        Some(score) if score < Decimal::ZERO || score > Decimal::ONE_HUNDRED => Err(
            Error::BadRequest("Score must be between 0 and 100".to_string()),
        ),
        _ => Ok(()),
    }
}

#[derive(Clone)]
pub struct ResultService {
    store: Arc<dyn ExamStore>,
}

#[derive(Debug, Clone)]
pub struct Declaration {
    pub result: EmployeeResult,
    pub already_declared: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResultDetail {
    pub result: EmployeeResult,
    pub attempt: Option<TestAttempt>,
    pub answers: Vec<GradedAnswer>,
    pub breakdown: ScoreBreakdown,
}

impl ResultService {
    pub fn new(store: Arc<dyn ExamStore>) -> Self {
        Self { store }
    }

    /// Publishes the score of a completed attempt. An existing result for the
    /// same employee and schedule is returned untouched.
    pub async fn declare(
        &self,
        attempt_id: Uuid,
        admin_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Declaration> {
        let attempt = self
            .store
            .get_attempt(attempt_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Attempt {} not found", attempt_id)))?;
        if !attempt.is_completed {
            return Err(Error::AttemptNotCompleted { attempt_id });
        }

        if let Some(existing) = self
            .store
            .find_result(attempt.employee_id, attempt.test_schedule_id)
            .await?
        {
            return Ok(Declaration {
                result: existing,
                already_declared: true,
            });
        }

        let score = attempt.score.unwrap_or(Decimal::ZERO);
        let created = self
            .store
            .create_result(NewResult {
                employee_id: attempt.employee_id,
                test_schedule_id: attempt.test_schedule_id,
                test_attempt_id: attempt.id,
                score,
                passed: is_passing(score),
                declared_by: admin_id,
                declared_at: now,
            })
            .await?;

        match created {
            Some(result) => {
                tracing::info!(
                    result_id = %result.id,
                    attempt_id = %attempt.id,
                    score = %result.score,
                    passed = result.passed,
                    "Result declared"
                );
                Ok(Declaration {
                    result,
                    already_declared: false,
                })
            }
            None => {
                // Lost a race with another declaration; report the winner.
                let result = self
                    .store
                    .find_result(attempt.employee_id, attempt.test_schedule_id)
                    .await?
                    .ok_or_else(|| Error::Internal("Result vanished after conflict".to_string()))?;
                Ok(Declaration {
                    result,
                    already_declared: true,
                })
            }
        }
    }

    /// Declares and then applies `edit`. The edit is checked before anything
    /// is written, so a rejected edit never leaves a fresh result behind.
    pub async fn declare_with_edit(
        &self,
        attempt_id: Uuid,
        admin_id: Uuid,
        now: DateTime<Utc>,
        edit: ResultUpdate,
    ) -> Result<Declaration> {
        check_update(&edit)?;
        let mut declaration = self.declare(attempt_id, admin_id, now).await?;
        if !edit.is_empty() {
            declaration.result = self.update(declaration.result.id, edit).await?;
        }
        Ok(declaration)
    }

    pub async fn update(&self, result_id: Uuid, update: ResultUpdate) -> Result<EmployeeResult> {
        check_update(&update)?;
        if update.is_empty() {
            return self.get(result_id).await;
        }

        let result = self
            .store
            .update_result(result_id, update.clone())
            .await?;
        tracing::info!(result_id = %result.id, update = ?update, "Result updated");
        Ok(result)
    }

    pub async fn get(&self, result_id: Uuid) -> Result<EmployeeResult> {
        self.store
            .get_result(result_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Result {} not found", result_id)))
    }

    /// Result with its answer breakdown. A result whose attempt is gone gets a
    /// zeroed breakdown.
    pub async fn detail(&self, result_id: Uuid) -> Result<ResultDetail> {
        let result = self.get(result_id).await?;

        let attempt = match result.test_attempt_id {
            Some(attempt_id) => self.store.get_attempt(attempt_id).await?,
            None => None,
        };
        let Some(attempt) = attempt else {
            tracing::warn!(result_id = %result.id, "Result has no linked attempt");
            return Ok(ResultDetail {
                result,
                attempt: None,
                answers: Vec::new(),
                breakdown: ScoreBreakdown::zeroed(),
            });
        };

        let schedule = self.store.get_schedule(attempt.test_schedule_id).await?;
        let questions = match schedule {
            Some(s) => self.store.list_questions(s.technology_id).await?,
            None => Vec::new(),
        };
        let answers = self.store.list_answers(attempt.id).await?;
        let (answers, breakdown) = ScoringService::grade_recorded(&questions, &answers);

        Ok(ResultDetail {
            result,
            attempt: Some(attempt),
            answers,
            breakdown,
        })
    }
}
