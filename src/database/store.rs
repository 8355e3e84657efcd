use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::error::Result;
use crate::models::answer::{Answer, NewAnswer};
use crate::models::employee_result::{EmployeeResult, NewResult, ResultUpdate};
use crate::models::question::Question;
use crate::models::test_attempt::TestAttempt;
use crate::models::test_schedule::TestSchedule;

/// Persistence the exam lifecycle and result ledger depend on.
///
/// Uniqueness of attempts, answers and results is the store's job: callers
/// rely on the conflict signals below rather than on check-then-insert.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ExamStore: Send + Sync {
    async fn get_schedule(&self, schedule_id: Uuid) -> Result<Option<TestSchedule>>;

    async fn list_questions(&self, technology_id: Uuid) -> Result<Vec<Question>>;

    async fn find_attempt(&self, employee_id: Uuid, schedule_id: Uuid) -> Result<Option<TestAttempt>>;

    async fn get_attempt(&self, attempt_id: Uuid) -> Result<Option<TestAttempt>>;

    /// Fails with `Error::DuplicateAttemptConflict` when the pair already has an attempt.
    async fn create_attempt(
        &self,
        employee_id: Uuid,
        schedule_id: Uuid,
        start_time: DateTime<Utc>,
    ) -> Result<TestAttempt>;

    async fn list_answers(&self, attempt_id: Uuid) -> Result<Vec<Answer>>;

    /// Replaces the attempt's answers and marks it completed in one atomic unit.
    /// Fails with `Error::AlreadyCompleted` if another finalization got there first.
    async fn finalize_attempt(
        &self,
        attempt_id: Uuid,
        answers: Vec<NewAnswer>,
        score: Decimal,
        end_time: DateTime<Utc>,
    ) -> Result<TestAttempt>;

    async fn find_result(&self, employee_id: Uuid, schedule_id: Uuid) -> Result<Option<EmployeeResult>>;

    async fn get_result(&self, result_id: Uuid) -> Result<Option<EmployeeResult>>;

    /// Returns `None` when a result for the (employee, schedule) pair already exists.
    async fn create_result(&self, new_result: NewResult) -> Result<Option<EmployeeResult>>;

    async fn update_result(&self, result_id: Uuid, update: ResultUpdate) -> Result<EmployeeResult>;
}
