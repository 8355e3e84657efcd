use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::dto::admin_dto::{
    CreateQuestionPayload, CreateSchedulePayload, CreateTechnologyPayload, UpdateQuestionPayload,
    UpdateSchedulePayload, UpdateTechnologyPayload,
};
use crate::error::{is_unique_violation, Error, Result};
use crate::models::question::Question;
use crate::models::technology::Technology;
use crate::models::test_schedule::TestSchedule;

/// Applies a partial edit to a stored schedule and re-checks the window.
fn merge_schedule(mut schedule: TestSchedule, edit: UpdateSchedulePayload) -> Result<TestSchedule> {
    if let Some(start_time) = edit.start_time {
        schedule.start_time = start_time;
    }
    if let Some(end_time) = edit.end_time {
        schedule.end_time = end_time;
    }
    if let Some(duration_minutes) = edit.duration_minutes {
        schedule.duration_minutes = duration_minutes;
    }
    if let Some(total_questions) = edit.total_questions {
        schedule.total_questions = total_questions;
    }
    if let Some(is_active) = edit.is_active {
        schedule.is_active = is_active;
    }
    if schedule.start_time >= schedule.end_time {
        return Err(Error::BadRequest(
            "start_time must be before end_time".to_string(),
        ));
    }
    Ok(schedule)
}

#[derive(Clone)]
pub struct CatalogService {
    pool: PgPool,
}

impl CatalogService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create_technology(&self, payload: CreateTechnologyPayload) -> Result<Technology> {
        let inserted = sqlx::query_as::<_, Technology>(
            r#"
            INSERT INTO technologies (name, description)
            VALUES ($1, $2)
            RETURNING *
            "#
        )
        .bind(payload.name.trim())
        .bind(&payload.description)
        .fetch_one(&self.pool)
        .await;

        match inserted {
            Ok(tech) => {
                tracing::info!(technology_id = %tech.id, name = %tech.name, "Technology created");
                Ok(tech)
            }
            Err(e) if is_unique_violation(&e) => Err(Error::Conflict(format!(
                "Technology '{}' already exists",
                payload.name.trim()
            ))),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn list_technologies(&self) -> Result<Vec<Technology>> {
        let items = sqlx::query_as::<_, Technology>(r#"SELECT * FROM technologies ORDER BY name"#)
            .fetch_all(&self.pool)
            .await?;
        Ok(items)
    }

    pub async fn get_technology(&self, technology_id: Uuid) -> Result<Technology> {
        sqlx::query_as::<_, Technology>(r#"SELECT * FROM technologies WHERE id = $1"#)
            .bind(technology_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Technology {} not found", technology_id)))
    }

    pub async fn update_technology(
        &self,
        technology_id: Uuid,
        payload: UpdateTechnologyPayload,
    ) -> Result<Technology> {
        let name = payload.name.as_deref().map(str::trim);
        let updated = sqlx::query_as::<_, Technology>(
            r#"
            UPDATE technologies
            SET name = COALESCE($2, name),
                description = COALESCE($3, description)
            WHERE id = $1
            RETURNING *
            "#
        )
        .bind(technology_id)
        .bind(name)
        .bind(&payload.description)
        .fetch_optional(&self.pool)
        .await;

        match updated {
            Ok(Some(tech)) => {
                tracing::info!(technology_id = %tech.id, name = %tech.name, "Technology updated");
                Ok(tech)
            }
            Ok(None) => Err(Error::NotFound(format!("Technology {} not found", technology_id))),
            Err(e) if is_unique_violation(&e) => Err(Error::Conflict(format!(
                "Technology '{}' already exists",
                name.unwrap_or_default()
            ))),
            Err(e) => Err(e.into()),
        }
    }

    /// Removes the technology together with its schedules, questions and
    /// everything recorded against them.
    pub async fn delete_technology(&self, technology_id: Uuid) -> Result<()> {
        let deleted = sqlx::query(r#"DELETE FROM technologies WHERE id = $1"#)
            .bind(technology_id)
            .execute(&self.pool)
            .await?;
        if deleted.rows_affected() == 0 {
            return Err(Error::NotFound(format!("Technology {} not found", technology_id)));
        }
        tracing::info!(technology_id = %technology_id, "Technology deleted");
        Ok(())
    }

    pub async fn get_schedule(&self, schedule_id: Uuid) -> Result<TestSchedule> {
        sqlx::query_as::<_, TestSchedule>(r#"SELECT * FROM test_schedules WHERE id = $1"#)
            .bind(schedule_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Test schedule {} not found", schedule_id)))
    }

    pub async fn create_schedule(&self, payload: CreateSchedulePayload) -> Result<TestSchedule> {
        self.get_technology(payload.technology_id).await?;

        let schedule = sqlx::query_as::<_, TestSchedule>(
            r#"
            INSERT INTO test_schedules (
                technology_id, start_time, end_time, duration_minutes, total_questions, is_active
            ) VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#
        )
        .bind(payload.technology_id)
        .bind(payload.start_time)
        .bind(payload.end_time)
        .bind(payload.duration_minutes)
        .bind(payload.total_questions)
        .bind(payload.is_active.unwrap_or(true))
        .fetch_one(&self.pool)
        .await?;

        tracing::info!(
            schedule_id = %schedule.id,
            technology_id = %schedule.technology_id,
            "Test schedule created"
        );
        Ok(schedule)
    }

    pub async fn list_schedules(&self, technology_id: Option<Uuid>) -> Result<Vec<TestSchedule>> {
        let items = sqlx::query_as::<_, TestSchedule>(
            r#"
            SELECT * FROM test_schedules
            WHERE ($1::uuid IS NULL OR technology_id = $1)
            ORDER BY start_time DESC
            "#
        )
        .bind(technology_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(items)
    }

    pub async fn update_schedule(
        &self,
        schedule_id: Uuid,
        payload: UpdateSchedulePayload,
    ) -> Result<TestSchedule> {
        let merged = merge_schedule(self.get_schedule(schedule_id).await?, payload)?;

        let schedule = sqlx::query_as::<_, TestSchedule>(
            r#"
            UPDATE test_schedules
            SET start_time = $2,
                end_time = $3,
                duration_minutes = $4,
                total_questions = $5,
                is_active = $6
            WHERE id = $1
            RETURNING *
            "#
        )
        .bind(schedule_id)
        .bind(merged.start_time)
        .bind(merged.end_time)
        .bind(merged.duration_minutes)
        .bind(merged.total_questions)
        .bind(merged.is_active)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::NotFound(format!("Test schedule {} not found", schedule_id)))?;

        tracing::info!(schedule_id = %schedule.id, "Test schedule updated");
        Ok(schedule)
    }

    pub async fn delete_schedule(&self, schedule_id: Uuid) -> Result<()> {
        let deleted = sqlx::query(r#"DELETE FROM test_schedules WHERE id = $1"#)
            .bind(schedule_id)
            .execute(&self.pool)
            .await?;
        if deleted.rows_affected() == 0 {
            return Err(Error::NotFound(format!("Test schedule {} not found", schedule_id)));
        }
        tracing::info!(schedule_id = %schedule_id, "Test schedule deleted");
        Ok(())
    }

    pub async fn create_question(&self, payload: CreateQuestionPayload) -> Result<Question> {
        self.get_technology(payload.technology_id).await?;

        let question = sqlx::query_as::<_, Question>(
            r#"
            INSERT INTO questions (
                technology_id, question_text, option_a, option_b, option_c, option_d,
                correct_option, marks
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#
        )
        .bind(payload.technology_id)
        .bind(&payload.question_text)
        .bind(&payload.option_a)
        .bind(&payload.option_b)
        .bind(&payload.option_c)
        .bind(&payload.option_d)
        .bind(payload.correct_option.as_str())
        .bind(payload.marks.unwrap_or(Decimal::ONE))
        .fetch_one(&self.pool)
        .await?;
        Ok(question)
    }

    pub async fn list_questions(&self, technology_id: Option<Uuid>) -> Result<Vec<Question>> {
        let items = sqlx::query_as::<_, Question>(
            r#"
            SELECT * FROM questions
            WHERE ($1::uuid IS NULL OR technology_id = $1)
            ORDER BY created_at DESC
            "#
        )
        .bind(technology_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(items)
    }

    pub async fn update_question(
        &self,
        question_id: Uuid,
        payload: UpdateQuestionPayload,
    ) -> Result<Question> {
        sqlx::query_as::<_, Question>(
            r#"
            UPDATE questions
            SET question_text = COALESCE($2, question_text),
                option_a = COALESCE($3, option_a),
                option_b = COALESCE($4, option_b),
                option_c = COALESCE($5, option_c),
                option_d = COALESCE($6, option_d),
                correct_option = COALESCE($7, correct_option),
                marks = COALESCE($8, marks)
            WHERE id = $1
            RETURNING *
            "#
        )
        .bind(question_id)
        .bind(&payload.question_text)
        .bind(&payload.option_a)
        .bind(&payload.option_b)
        .bind(&payload.option_c)
        .bind(&payload.option_d)
        .bind(payload.correct_option.map(|o| o.as_str()))
        .bind(payload.marks)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::NotFound(format!("Question {} not found", question_id)))
    }

    /// Stored answers to the question go with it.
    pub async fn delete_question(&self, question_id: Uuid) -> Result<()> {
        let deleted = sqlx::query(r#"DELETE FROM questions WHERE id = $1"#)
            .bind(question_id)
            .execute(&self.pool)
            .await?;
        if deleted.rows_affected() == 0 {
            return Err(Error::NotFound(format!("Question {} not found", question_id)));
        }
        Ok(())
    }
}
