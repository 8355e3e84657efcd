use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::store::ExamStore;
use crate::error::{is_unique_violation, Error, Result};
use crate::models::answer::{Answer, NewAnswer};
use crate::models::employee_result::{EmployeeResult, NewResult, ResultUpdate};
use crate::models::question::Question;
use crate::models::test_attempt::TestAttempt;
use crate::models::test_schedule::TestSchedule;

#[derive(Clone)]
pub struct PgExamStore {
    pool: PgPool,
}

impl PgExamStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ExamStore for PgExamStore {
    async fn get_schedule(&self, schedule_id: Uuid) -> Result<Option<TestSchedule>> {
        let schedule = sqlx::query_as::<_, TestSchedule>(
            r#"SELECT * FROM test_schedules WHERE id = $1"#
        )
        .bind(schedule_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(schedule)
    }

    async fn list_questions(&self, technology_id: Uuid) -> Result<Vec<Question>> {
        let questions = sqlx::query_as::<_, Question>(
            r#"SELECT * FROM questions WHERE technology_id = $1 ORDER BY created_at, id"#
        )
        .bind(technology_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(questions)
    }

    async fn find_attempt(&self, employee_id: Uuid, schedule_id: Uuid) -> Result<Option<TestAttempt>> {
        let attempt = sqlx::query_as::<_, TestAttempt>(
            r#"SELECT * FROM employee_test_attempts WHERE employee_id = $1 AND test_schedule_id = $2"#
        )
        .bind(employee_id)
        .bind(schedule_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(attempt)
    }

    async fn get_attempt(&self, attempt_id: Uuid) -> Result<Option<TestAttempt>> {
        let attempt = sqlx::query_as::<_, TestAttempt>(
            r#"SELECT * FROM employee_test_attempts WHERE id = $1"#
        )
        .bind(attempt_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(attempt)
    }

    async fn create_attempt(
        &self,
        employee_id: Uuid,
        schedule_id: Uuid,
        start_time: DateTime<Utc>,
    ) -> Result<TestAttempt> {
        let inserted = sqlx::query_as::<_, TestAttempt>(
            r#"
            INSERT INTO employee_test_attempts (employee_id, test_schedule_id, start_time, is_completed)
            VALUES ($1, $2, $3, FALSE)
            RETURNING *
            "#
        )
        .bind(employee_id)
        .bind(schedule_id)
        .bind(start_time)
        .fetch_one(&self.pool)
        .await;

        match inserted {
            Ok(attempt) => Ok(attempt),
            Err(e) if is_unique_violation(&e) => Err(Error::DuplicateAttemptConflict),
            Err(e) => Err(e.into()),
        }
    }

    async fn list_answers(&self, attempt_id: Uuid) -> Result<Vec<Answer>> {
        let answers = sqlx::query_as::<_, Answer>(
            r#"SELECT * FROM answers WHERE test_attempt_id = $1"#
        )
        .bind(attempt_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(answers)
    }

    async fn finalize_attempt(
        &self,
        attempt_id: Uuid,
        answers: Vec<NewAnswer>,
        score: Decimal,
        end_time: DateTime<Utc>,
    ) -> Result<TestAttempt> {
        let mut tx = self.pool.begin().await?;

        // The guarded update takes the row lock, so a concurrent finalization
        // blocks here and then sees is_completed = TRUE.
        let updated = sqlx::query_as::<_, TestAttempt>(
            r#"
            UPDATE employee_test_attempts
            SET score = $2, is_completed = TRUE, end_time = $3
            WHERE id = $1 AND is_completed = FALSE
            RETURNING *
            "#
        )
        .bind(attempt_id)
        .bind(score)
        .bind(end_time)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(attempt) = updated else {
            tx.rollback().await?;
            return Err(Error::AlreadyCompleted { attempt_id });
        };

        sqlx::query(r#"DELETE FROM answers WHERE test_attempt_id = $1"#)
            .bind(attempt_id)
            .execute(&mut *tx)
            .await?;

        if !answers.is_empty() {
            let question_ids: Vec<Uuid> = answers.iter().map(|a| a.question_id).collect();
            let selected: Vec<Option<String>> =
                answers.into_iter().map(|a| a.selected_option).collect();
            sqlx::query(
                r#"
                INSERT INTO answers (test_attempt_id, question_id, selected_option)
                SELECT $1, q, s FROM UNNEST($2::uuid[], $3::text[]) AS t(q, s)
                "#
            )
            .bind(attempt_id)
            .bind(&question_ids)
            .bind(&selected)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(attempt)
    }

    async fn find_result(&self, employee_id: Uuid, schedule_id: Uuid) -> Result<Option<EmployeeResult>> {
        let result = sqlx::query_as::<_, EmployeeResult>(
            r#"SELECT * FROM employee_results WHERE employee_id = $1 AND test_schedule_id = $2"#
        )
        .bind(employee_id)
        .bind(schedule_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(result)
    }

    async fn get_result(&self, result_id: Uuid) -> Result<Option<EmployeeResult>> {
        let result = sqlx::query_as::<_, EmployeeResult>(
            r#"SELECT * FROM employee_results WHERE id = $1"#
        )
        .bind(result_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(result)
    }

    async fn create_result(&self, new_result: NewResult) -> Result<Option<EmployeeResult>> {
        let inserted = sqlx::query_as::<_, EmployeeResult>(
            r#"
            INSERT INTO employee_results (
                employee_id, test_schedule_id, test_attempt_id, score, passed, declared_by, declared_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (employee_id, test_schedule_id) DO NOTHING
            RETURNING *
            "#
        )
        .bind(new_result.employee_id)
        .bind(new_result.test_schedule_id)
        .bind(new_result.test_attempt_id)
        .bind(new_result.score)
        .bind(new_result.passed)
        .bind(new_result.declared_by)
        .bind(new_result.declared_at)
        .fetch_optional(&self.pool)
        .await?;
        Ok(inserted)
    }

    async fn update_result(&self, result_id: Uuid, update: ResultUpdate) -> Result<EmployeeResult> {
        let result = sqlx::query_as::<_, EmployeeResult>(
            r#"
            UPDATE employee_results
            SET score = COALESCE($2, score),
                passed = COALESCE($3, passed),
                remarks = COALESCE($4, remarks)
            WHERE id = $1
            RETURNING *
            "#
        )
        .bind(result_id)
        .bind(update.score)
        .bind(update.passed)
        .bind(update.remarks)
        .fetch_one(&self.pool)
        .await?;
        Ok(result)
    }
}
