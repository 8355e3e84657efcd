use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::dto::admin_dto::AdminDashboard;
use crate::error::Result;
use crate::models::employee_profile::EmployeeProfile;
use crate::models::test_schedule::TestSchedule;

#[derive(Clone)]
pub struct ReportService {
    pool: PgPool,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct AttemptSummary {
    pub attempt_id: Uuid,
    pub schedule_id: Uuid,
    pub technology_id: Uuid,
    pub technology_name: String,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub schedule_end_time: DateTime<Utc>,
    pub score: Option<Decimal>,
    pub is_completed: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct EmployeeDashboard {
    pub employee: EmployeeProfile,
    pub available_tests: Vec<TestSchedule>,
    pub ongoing_tests: Vec<AttemptSummary>,
    pub past_attempts: Vec<AttemptSummary>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ResultSummary {
    pub result_id: Uuid,
    pub employee_id: Uuid,
    pub employee_code: String,
    pub username: String,
    pub test_schedule_id: Uuid,
    pub technology_id: Uuid,
    pub technology_name: String,
    pub test_attempt_id: Option<Uuid>,
    pub score: Decimal,
    pub passed: bool,
    pub declared_at: DateTime<Utc>,
    pub remarks: Option<String>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct CompletedAttempt {
    pub attempt_id: Uuid,
    pub employee_id: Uuid,
    pub employee_code: String,
    pub username: String,
    pub schedule_id: Uuid,
    pub technology_id: Uuid,
    pub technology_name: String,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub score: Option<Decimal>,
    pub result_id: Option<Uuid>,
}

const ATTEMPT_SUMMARY_SELECT: &str = r#"
    SELECT a.id AS attempt_id,
           s.id AS schedule_id,
           t.id AS technology_id,
           t.name AS technology_name,
           a.start_time,
           a.end_time,
           s.end_time AS schedule_end_time,
           a.score,
           a.is_completed
    FROM employee_test_attempts a
    JOIN test_schedules s ON s.id = a.test_schedule_id
    JOIN technologies t ON t.id = s.technology_id
"#;

impl ReportService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn admin_dashboard(&self) -> Result<AdminDashboard> {
        let row: (i64, i64, i64, i64, i64, i64, i64) = sqlx::query_as(
            r#"
            SELECT
                (SELECT COUNT(*) FROM technologies),
                (SELECT COUNT(*) FROM test_schedules),
                (SELECT COUNT(*) FROM test_schedules WHERE is_active),
                (SELECT COUNT(*) FROM questions),
                (SELECT COUNT(*) FROM employee_profiles),
                (SELECT COUNT(*) FROM employee_test_attempts),
                (SELECT COUNT(*) FROM employee_test_attempts WHERE is_completed)
            "#
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(AdminDashboard {
            technologies: row.0,
            schedules: row.1,
            active_schedules: row.2,
            questions: row.3,
            employees: row.4,
            attempts: row.5,
            completed_attempts: row.6,
        })
    }

    /// Open schedules the employee has not finished, attempts still running
    /// inside their window, and finished attempts newest first.
    pub async fn employee_dashboard(
        &self,
        employee: EmployeeProfile,
        now: DateTime<Utc>,
    ) -> Result<EmployeeDashboard> {
        let available_tests = sqlx::query_as::<_, TestSchedule>(
            r#"
            SELECT s.* FROM test_schedules s
            WHERE s.is_active
              AND s.start_time <= $2
              AND s.end_time >= $2
              AND NOT EXISTS (
                  SELECT 1 FROM employee_test_attempts a
                  WHERE a.test_schedule_id = s.id
                    AND a.employee_id = $1
                    AND a.is_completed
              )
            ORDER BY s.end_time
            "#
        )
        .bind(employee.id)
        .bind(now)
        .fetch_all(&self.pool)
        .await?;

        let ongoing_tests = sqlx::query_as::<_, AttemptSummary>(&format!(
            "{} WHERE a.employee_id = $1 AND NOT a.is_completed AND s.end_time >= $2 ORDER BY a.start_time",
            ATTEMPT_SUMMARY_SELECT
        ))
        .bind(employee.id)
        .bind(now)
        .fetch_all(&self.pool)
        .await?;

        let past_attempts = sqlx::query_as::<_, AttemptSummary>(&format!(
            "{} WHERE a.employee_id = $1 AND a.is_completed ORDER BY a.end_time DESC",
            ATTEMPT_SUMMARY_SELECT
        ))
        .bind(employee.id)
        .fetch_all(&self.pool)
        .await?;

        Ok(EmployeeDashboard {
            employee,
            available_tests,
            ongoing_tests,
            past_attempts,
        })
    }

    pub async fn list_results(&self, technology_id: Option<Uuid>) -> Result<Vec<ResultSummary>> {
        let items = sqlx::query_as::<_, ResultSummary>(
            r#"
            SELECT r.id AS result_id,
                   r.employee_id,
                   p.employee_id AS employee_code,
                   u.username,
                   r.test_schedule_id,
                   t.id AS technology_id,
                   t.name AS technology_name,
                   r.test_attempt_id,
                   r.score,
                   r.passed,
                   r.declared_at,
                   r.remarks
            FROM employee_results r
            JOIN employee_profiles p ON p.id = r.employee_id
            JOIN users u ON u.id = p.user_id
            JOIN test_schedules s ON s.id = r.test_schedule_id
            JOIN technologies t ON t.id = s.technology_id
            WHERE ($1::uuid IS NULL OR t.id = $1)
            ORDER BY r.declared_at DESC
            "#
        )
        .bind(technology_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(items)
    }

    /// Finished attempts across all employees, newest first. `result_id` is
    /// set once a result has been declared for the attempt.
    pub async fn list_completed_attempts(
        &self,
        technology_id: Option<Uuid>,
    ) -> Result<Vec<CompletedAttempt>> {
        let items = sqlx::query_as::<_, CompletedAttempt>(
            r#"
            SELECT a.id AS attempt_id,
                   a.employee_id,
                   p.employee_id AS employee_code,
                   u.username,
                   s.id AS schedule_id,
                   t.id AS technology_id,
                   t.name AS technology_name,
                   a.start_time,
                   a.end_time,
                   a.score,
                   r.id AS result_id
            FROM employee_test_attempts a
            JOIN employee_profiles p ON p.id = a.employee_id
            JOIN users u ON u.id = p.user_id
            JOIN test_schedules s ON s.id = a.test_schedule_id
            JOIN technologies t ON t.id = s.technology_id
            LEFT JOIN employee_results r ON r.test_attempt_id = a.id
            WHERE a.is_completed
              AND ($1::uuid IS NULL OR t.id = $1)
            ORDER BY a.end_time DESC
            "#
        )
        .bind(technology_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(items)
    }
}
