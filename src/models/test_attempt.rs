use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::models::test_schedule::TestSchedule;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TestAttempt {
    pub id: Uuid,
    pub employee_id: Uuid,
    pub test_schedule_id: Uuid,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub score: Option<Decimal>,
    pub is_completed: bool,
}

impl TestAttempt {
    pub fn state(&self, schedule: &TestSchedule) -> AttemptState {
        if self.is_completed {
            AttemptState::Completed {
                attempt_id: self.id,
                score: self.score.unwrap_or(Decimal::ZERO),
                ended_at: self.end_time.unwrap_or(self.start_time),
            }
        } else {
            AttemptState::InProgress {
                attempt_id: self.id,
                started_at: self.start_time,
                deadline: self.start_time + schedule.duration(),
            }
        }
    }
}

/// Lifecycle of one employee's attempt at one schedule. `Completed` is terminal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptState {
    NotStarted,
    InProgress {
        attempt_id: Uuid,
        started_at: DateTime<Utc>,
        /// `started_at + duration_minutes`; the schedule window may cut it shorter.
        deadline: DateTime<Utc>,
    },
    Completed {
        attempt_id: Uuid,
        score: Decimal,
        ended_at: DateTime<Utc>,
    },
}

impl AttemptState {
    pub fn of(attempt: Option<&TestAttempt>, schedule: &TestSchedule) -> Self {
        match attempt {
            Some(a) => a.state(schedule),
            None => AttemptState::NotStarted,
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, AttemptState::Completed { .. })
    }
}

/// The earlier of the duration deadline and the schedule's window end.
pub fn effective_deadline(deadline: DateTime<Utc>, schedule: &TestSchedule) -> DateTime<Utc> {
    if schedule.end_time < deadline {
        schedule.end_time
    } else {
        deadline
    }
}

/// Whole seconds left before the effective deadline, never negative.
pub fn remaining_seconds(deadline: DateTime<Utc>, schedule: &TestSchedule, now: DateTime<Utc>) -> i64 {
    (effective_deadline(deadline, schedule) - now).num_seconds().max(0)
}
