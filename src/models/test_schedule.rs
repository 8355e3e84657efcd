use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TestSchedule {
    pub id: Uuid,
    pub technology_id: Uuid,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub duration_minutes: i32,
    pub total_questions: i32,
    pub is_active: bool,
}

impl TestSchedule {
    /// Open iff active, well-formed (start < end) and `start <= now <= end`.
    pub fn is_open_at(&self, now: DateTime<Utc>) -> bool {
        self.is_active
            && self.start_time < self.end_time
            && self.start_time <= now
            && now <= self.end_time
    }

    pub fn duration(&self) -> Duration {
        Duration::minutes(self.duration_minutes.max(0) as i64)
    }

    pub fn sample_size(&self) -> usize {
        self.total_questions.max(0) as usize
    }
}
