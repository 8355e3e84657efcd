use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;
use uuid::Uuid;

use crate::database::store::ExamStore;
use crate::error::{Error, Result};
use crate::models::employee_profile::EmployeeProfile;
use crate::models::question::{AnswerOption, Question};
use crate::models::test_attempt::{effective_deadline, remaining_seconds, AttemptState, TestAttempt};
use crate::models::test_schedule::TestSchedule;
use crate::services::scoring_service::{GradedAnswer, ScoreBreakdown, ScoringService};

#[derive(Clone)]
pub struct AttemptService {
    store: Arc<dyn ExamStore>,
}

/// What the exam screen needs after a start or resume.
#[derive(Debug, Clone)]
pub struct ExamSession {
    pub attempt: TestAttempt,
    pub schedule: TestSchedule,
    pub questions: Vec<Question>,
    /// Previously recorded selections keyed by question id, for pre-filling.
    pub existing_answers: HashMap<Uuid, String>,
    pub remaining_seconds: i64,
    pub expires_at: DateTime<Utc>,
    pub resumed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LateSubmission {
    TimeLimitExpired,
    WindowClosed,
}

#[derive(Debug, Clone)]
pub struct SubmissionOutcome {
    pub attempt: TestAttempt,
    pub breakdown: ScoreBreakdown,
    pub late: Option<LateSubmission>,
}

#[derive(Debug, Clone)]
pub struct AttemptView {
    pub attempt: TestAttempt,
    pub schedule: TestSchedule,
    pub answers: Vec<GradedAnswer>,
    pub breakdown: ScoreBreakdown,
}

/// Uniform sample without replacement; the whole pool when it is smaller than `size`.
pub fn sample_questions<R: Rng + ?Sized>(pool: &[Question], size: usize, rng: &mut R) -> Vec<Question> {
    pool.choose_multiple(rng, size).cloned().collect()
}

impl AttemptService {
    pub fn new(store: Arc<dyn ExamStore>) -> Self {
        Self { store }
    }

    async fn load_schedule(&self, schedule_id: Uuid) -> Result<TestSchedule> {
        self.store
            .get_schedule(schedule_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Test schedule {} not found", schedule_id)))
    }

    pub async fn start_or_resume<R>(
        &self,
        employee: &EmployeeProfile,
        schedule_id: Uuid,
        now: DateTime<Utc>,
        rng: &mut R,
    ) -> Result<ExamSession>
    where
        R: Rng + Send + ?Sized,
    {
        let schedule = self.load_schedule(schedule_id).await?;
        if !schedule.is_open_at(now) {
            return Err(Error::ScheduleNotOpen { schedule_id });
        }

        let existing = self.store.find_attempt(employee.id, schedule.id).await?;
        match existing {
            Some(attempt) => self.resume(attempt, schedule, now, rng).await,
            None => match self.store.create_attempt(employee.id, schedule.id, now).await {
                Ok(attempt) => self.begin(attempt, schedule, now, rng).await,
                Err(Error::DuplicateAttemptConflict) => {
                    tracing::info!(
                        employee_id = %employee.id,
                        schedule_id = %schedule.id,
                        "Concurrent start detected, resuming existing attempt"
                    );
                    let attempt = self
                        .store
                        .find_attempt(employee.id, schedule.id)
                        .await?
                        .ok_or_else(|| {
                            Error::Internal("Attempt vanished after creation conflict".to_string())
                        })?;
                    self.resume(attempt, schedule, now, rng).await
                }
                Err(e) => Err(e),
            },
        }
    }

    async fn begin<R>(
        &self,
        attempt: TestAttempt,
        schedule: TestSchedule,
        now: DateTime<Utc>,
        rng: &mut R,
    ) -> Result<ExamSession>
    where
        R: Rng + Send + ?Sized,
    {
        let pool = self.store.list_questions(schedule.technology_id).await?;
        let mut questions = sample_questions(&pool, schedule.sample_size(), rng);
        questions.shuffle(rng);

        let deadline = attempt.start_time + schedule.duration();
        tracing::info!(
            attempt_id = %attempt.id,
            schedule_id = %schedule.id,
            questions = questions.len(),
            "Exam started"
        );

        Ok(ExamSession {
            remaining_seconds: remaining_seconds(deadline, &schedule, now),
            expires_at: effective_deadline(deadline, &schedule),
            attempt,
            schedule,
            questions,
            existing_answers: HashMap::new(),
            resumed: false,
        })
    }

    async fn resume<R>(
        &self,
        attempt: TestAttempt,
        schedule: TestSchedule,
        now: DateTime<Utc>,
        rng: &mut R,
    ) -> Result<ExamSession>
    where
        R: Rng + Send + ?Sized,
    {
        let deadline = match attempt.state(&schedule) {
            AttemptState::Completed { attempt_id, .. } => {
                return Err(Error::AlreadyCompleted { attempt_id })
            }
            AttemptState::NotStarted => return Err(Error::NoActiveAttempt),
            AttemptState::InProgress { deadline, .. } => deadline,
        };

        let remaining = remaining_seconds(deadline, &schedule, now);
        if now > deadline || remaining <= 0 {
            tracing::warn!(
                attempt_id = %attempt.id,
                schedule_id = %schedule.id,
                "Resume refused, time limit expired"
            );
            return Err(Error::TimeExpired {
                attempt_id: attempt.id,
                schedule_id: schedule.id,
            });
        }

        // No sample snapshot is stored, so every resume draws afresh.
        let pool = self.store.list_questions(schedule.technology_id).await?;
        let questions = sample_questions(&pool, schedule.sample_size(), rng);

        let existing_answers: HashMap<Uuid, String> = self
            .store
            .list_answers(attempt.id)
            .await?
            .into_iter()
            .filter_map(|a| a.selected_option.map(|opt| (a.question_id, opt)))
            .collect();

        tracing::info!(
            attempt_id = %attempt.id,
            remaining_seconds = remaining,
            "Exam resumed"
        );

        Ok(ExamSession {
            remaining_seconds: remaining,
            expires_at: effective_deadline(deadline, &schedule),
            attempt,
            schedule,
            questions,
            existing_answers,
            resumed: true,
        })
    }

    /// Finalizes the employee's in-progress attempt. Late sheets are accepted
    /// and flagged, never rejected.
    pub async fn submit(
        &self,
        employee: &EmployeeProfile,
        schedule_id: Uuid,
        answer_sheet: &HashMap<Uuid, AnswerOption>,
        now: DateTime<Utc>,
    ) -> Result<SubmissionOutcome> {
        let schedule = self.load_schedule(schedule_id).await?;
        let existing = self.store.find_attempt(employee.id, schedule.id).await?;

        let (attempt_id, deadline) = match AttemptState::of(existing.as_ref(), &schedule) {
            AttemptState::NotStarted => return Err(Error::NoActiveAttempt),
            AttemptState::Completed { attempt_id, .. } => {
                return Err(Error::AlreadyCompleted { attempt_id })
            }
            AttemptState::InProgress {
                attempt_id,
                deadline,
                ..
            } => (attempt_id, deadline),
        };

        let late = if now > deadline {
            Some(LateSubmission::TimeLimitExpired)
        } else if now > schedule.end_time {
            Some(LateSubmission::WindowClosed)
        } else {
            None
        };
        if let Some(kind) = late {
            tracing::warn!(attempt_id = %attempt_id, late = ?kind, "Accepting late submission");
        }

        // Scored against the technology's full pool, not the sample that was shown.
        let questions = self.store.list_questions(schedule.technology_id).await?;
        let (answers, breakdown) = ScoringService::grade_sheet(&questions, answer_sheet);

        let attempt = self
            .store
            .finalize_attempt(attempt_id, answers, breakdown.percentage, now)
            .await?;

        tracing::info!(
            attempt_id = %attempt.id,
            score = %breakdown.percentage,
            correct = breakdown.correct_count,
            total = breakdown.total_questions,
            "Exam submitted"
        );

        Ok(SubmissionOutcome {
            attempt,
            breakdown,
            late,
        })
    }

    /// Read-only projection of a completed attempt. With `owner` set, attempts
    /// of other employees are reported as missing.
    pub async fn attempt_view(&self, attempt_id: Uuid, owner: Option<Uuid>) -> Result<AttemptView> {
        let attempt = self
            .store
            .get_attempt(attempt_id)
            .await?
            .filter(|a| owner.map_or(true, |o| a.employee_id == o))
            .ok_or_else(|| Error::NotFound(format!("Attempt {} not found", attempt_id)))?;

        if !attempt.is_completed {
            return Err(Error::AttemptNotCompleted { attempt_id });
        }

        let schedule = self.load_schedule(attempt.test_schedule_id).await?;
        let questions = self.store.list_questions(schedule.technology_id).await?;
        let answers = self.store.list_answers(attempt.id).await?;
        let (answers, breakdown) = ScoringService::grade_recorded(&questions, &answers);

        Ok(AttemptView {
            attempt,
            schedule,
            answers,
            breakdown,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::store::MockExamStore;
    use crate::test_support::{at, employee, question_pool, schedule, MemoryStore};
    use chrono::Duration;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use rust_decimal::Decimal;
    use std::collections::HashSet;

    fn service(store: &Arc<MemoryStore>) -> AttemptService {
        AttemptService::new(store.clone())
    }

    #[tokio::test]
    async fn start_creates_attempt_and_samples_questions() {
        let store = Arc::new(MemoryStore::default());
        let sched = store.add_schedule(schedule(at(10, 0), at(11, 0), 30, 5));
        store.add_questions(question_pool(sched.technology_id, 8, Decimal::ONE));
        let emp = employee();
        let mut rng = StdRng::seed_from_u64(7);

        let session = service(&store)
            .start_or_resume(&emp, sched.id, at(10, 5), &mut rng)
            .await
            .unwrap();

        assert!(!session.resumed);
        assert_eq!(session.attempt.start_time, at(10, 5));
        assert_eq!(session.questions.len(), 5);
        let ids: HashSet<Uuid> = session.questions.iter().map(|q| q.id).collect();
        assert_eq!(ids.len(), 5);
        assert_eq!(session.remaining_seconds, 30 * 60);
        assert_eq!(session.expires_at, at(10, 35));
        assert_eq!(store.attempt_count(), 1);
    }

    #[tokio::test]
    async fn small_pool_yields_whole_pool() {
        let store = Arc::new(MemoryStore::default());
        let sched = store.add_schedule(schedule(at(10, 0), at(11, 0), 30, 50));
        store.add_questions(question_pool(sched.technology_id, 3, Decimal::ONE));
        let mut rng = StdRng::seed_from_u64(1);

        let session = service(&store)
            .start_or_resume(&employee(), sched.id, at(10, 1), &mut rng)
            .await
            .unwrap();
        assert_eq!(session.questions.len(), 3);
    }

    #[tokio::test]
    async fn closed_or_inactive_schedule_is_rejected_without_attempt() {
        let store = Arc::new(MemoryStore::default());
        let sched = store.add_schedule(schedule(at(10, 0), at(11, 0), 30, 5));
        let mut inactive = schedule(at(10, 0), at(11, 0), 30, 5);
        inactive.is_active = false;
        let inactive = store.add_schedule(inactive);
        let emp = employee();
        let mut rng = StdRng::seed_from_u64(3);
        let svc = service(&store);

        let err = svc.start_or_resume(&emp, sched.id, at(9, 59), &mut rng).await.unwrap_err();
        assert!(matches!(err, Error::ScheduleNotOpen { .. }));
        let err = svc.start_or_resume(&emp, sched.id, at(11, 1), &mut rng).await.unwrap_err();
        assert!(matches!(err, Error::ScheduleNotOpen { .. }));
        let err = svc.start_or_resume(&emp, inactive.id, at(10, 30), &mut rng).await.unwrap_err();
        assert!(matches!(err, Error::ScheduleNotOpen { .. }));
        assert_eq!(store.attempt_count(), 0);
    }

    #[tokio::test]
    async fn repeated_starts_resume_the_same_attempt() {
        let store = Arc::new(MemoryStore::default());
        let sched = store.add_schedule(schedule(at(10, 0), at(11, 0), 30, 2));
        store.add_questions(question_pool(sched.technology_id, 4, Decimal::ONE));
        let emp = employee();
        let mut rng = StdRng::seed_from_u64(11);
        let svc = service(&store);

        let first = svc.start_or_resume(&emp, sched.id, at(10, 5), &mut rng).await.unwrap();
        let second = svc.start_or_resume(&emp, sched.id, at(10, 15), &mut rng).await.unwrap();
        let third = svc.start_or_resume(&emp, sched.id, at(10, 20), &mut rng).await.unwrap();

        assert!(second.resumed && third.resumed);
        assert_eq!(first.attempt.id, second.attempt.id);
        assert_eq!(first.attempt.id, third.attempt.id);
        assert_eq!(second.remaining_seconds, 20 * 60);
        assert_eq!(third.questions.len(), 2);
        assert_eq!(store.attempt_count(), 1);
    }

    #[tokio::test]
    async fn resume_is_capped_by_window_end() {
        let store = Arc::new(MemoryStore::default());
        let sched = store.add_schedule(schedule(at(10, 0), at(11, 0), 30, 1));
        store.add_questions(question_pool(sched.technology_id, 1, Decimal::ONE));
        let emp = employee();
        let mut rng = StdRng::seed_from_u64(5);
        let svc = service(&store);

        let started = svc.start_or_resume(&emp, sched.id, at(10, 50), &mut rng).await.unwrap();
        assert_eq!(started.remaining_seconds, 10 * 60);

        let resumed = svc.start_or_resume(&emp, sched.id, at(10, 55), &mut rng).await.unwrap();
        assert!(resumed.remaining_seconds <= 5 * 60);
        assert_eq!(resumed.remaining_seconds, 5 * 60);
        assert_eq!(resumed.expires_at, at(11, 0));
    }

    #[tokio::test]
    async fn resume_after_duration_signals_time_expired() {
        let store = Arc::new(MemoryStore::default());
        let sched = store.add_schedule(schedule(at(10, 0), at(12, 0), 30, 1));
        store.add_questions(question_pool(sched.technology_id, 1, Decimal::ONE));
        let emp = employee();
        let mut rng = StdRng::seed_from_u64(5);
        let svc = service(&store);

        svc.start_or_resume(&emp, sched.id, at(10, 0), &mut rng).await.unwrap();
        let err = svc
            .start_or_resume(&emp, sched.id, at(10, 31), &mut rng)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::TimeExpired { .. }));

        let err = svc
            .start_or_resume(&emp, sched.id, at(10, 0) + Duration::minutes(30), &mut rng)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::TimeExpired { .. }));
        assert_eq!(store.attempt_count(), 1);
    }

    #[tokio::test]
    async fn resume_when_window_has_closed_signals_time_expired() {
        let store = Arc::new(MemoryStore::default());
        let sched = store.add_schedule(schedule(at(10, 0), at(11, 0), 30, 1));
        store.add_questions(question_pool(sched.technology_id, 1, Decimal::ONE));
        let emp = employee();
        let mut rng = StdRng::seed_from_u64(5);
        let svc = service(&store);

        svc.start_or_resume(&emp, sched.id, at(10, 50), &mut rng).await.unwrap();
        // Duration deadline is 11:20, but the window ends at 11:00.
        let err = svc
            .start_or_resume(&emp, sched.id, at(11, 0), &mut rng)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::TimeExpired { schedule_id, .. } if schedule_id == sched.id));
    }

    #[tokio::test]
    async fn resume_returns_recorded_answers() {
        let store = Arc::new(MemoryStore::default());
        let sched = store.add_schedule(schedule(at(10, 0), at(11, 0), 30, 2));
        let pool = store.add_questions(question_pool(sched.technology_id, 2, Decimal::ONE));
        let emp = employee();
        let mut rng = StdRng::seed_from_u64(9);
        let svc = service(&store);

        let session = svc.start_or_resume(&emp, sched.id, at(10, 5), &mut rng).await.unwrap();
        store.record_answer(session.attempt.id, pool[0].id, Some("B"));
        store.record_answer(session.attempt.id, pool[1].id, None);

        let resumed = svc.start_or_resume(&emp, sched.id, at(10, 6), &mut rng).await.unwrap();
        assert_eq!(resumed.existing_answers.len(), 1);
        assert_eq!(resumed.existing_answers.get(&pool[0].id).map(String::as_str), Some("B"));
    }

    #[tokio::test]
    async fn creation_conflict_is_resolved_as_resume() {
        let emp = employee();
        let sched = schedule(at(10, 0), at(11, 0), 30, 1);
        let winner = TestAttempt {
            id: Uuid::new_v4(),
            employee_id: emp.id,
            test_schedule_id: sched.id,
            start_time: at(10, 4),
            end_time: None,
            score: None,
            is_completed: false,
        };

        let mut mock = MockExamStore::new();
        let sched_clone = sched.clone();
        mock.expect_get_schedule()
            .returning(move |_| Ok(Some(sched_clone.clone())));
        let mut lookups = 0;
        let winner_clone = winner.clone();
        mock.expect_find_attempt().times(2).returning(move |_, _| {
            lookups += 1;
            if lookups == 1 {
                Ok(None)
            } else {
                Ok(Some(winner_clone.clone()))
            }
        });
        mock.expect_create_attempt()
            .times(1)
            .returning(|_, _, _| Err(Error::DuplicateAttemptConflict));
        mock.expect_list_questions().returning(|_| Ok(Vec::new()));
        mock.expect_list_answers().returning(|_| Ok(Vec::new()));

        let svc = AttemptService::new(Arc::new(mock));
        let mut rng = StdRng::seed_from_u64(2);
        let session = svc.start_or_resume(&emp, sched.id, at(10, 5), &mut rng).await.unwrap();

        assert!(session.resumed);
        assert_eq!(session.attempt.id, winner.id);
        assert_eq!(session.remaining_seconds, 29 * 60);
    }

    #[tokio::test]
    async fn finalization_lost_to_concurrent_submit_reports_completed() {
        let emp = employee();
        let sched = schedule(at(10, 0), at(11, 0), 30, 1);
        let attempt = TestAttempt {
            id: Uuid::new_v4(),
            employee_id: emp.id,
            test_schedule_id: sched.id,
            start_time: at(10, 1),
            end_time: None,
            score: None,
            is_completed: false,
        };

        let mut mock = MockExamStore::new();
        let sched_clone = sched.clone();
        mock.expect_get_schedule()
            .returning(move |_| Ok(Some(sched_clone.clone())));
        let attempt_clone = attempt.clone();
        mock.expect_find_attempt()
            .returning(move |_, _| Ok(Some(attempt_clone.clone())));
        mock.expect_list_questions().returning(|_| Ok(Vec::new()));
        mock.expect_finalize_attempt()
            .times(1)
            .returning(|attempt_id, _, _, _| Err(Error::AlreadyCompleted { attempt_id }));

        let err = AttemptService::new(Arc::new(mock))
            .submit(&emp, sched.id, &HashMap::new(), at(10, 5))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::AlreadyCompleted { attempt_id } if attempt_id == attempt.id));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_starts_persist_one_attempt() {
        let store = Arc::new(MemoryStore::default());
        let sched = store.add_schedule(schedule(at(10, 0), at(11, 0), 30, 3));
        store.add_questions(question_pool(sched.technology_id, 5, Decimal::ONE));
        let emp = employee();
        let svc = service(&store);

        let mut handles = Vec::new();
        for seed in 0..8u64 {
            let svc = svc.clone();
            let emp = emp.clone();
            let id = sched.id;
            handles.push(tokio::spawn(async move {
                let mut rng = StdRng::seed_from_u64(seed);
                svc.start_or_resume(&emp, id, at(10, 5), &mut rng).await
            }));
        }

        let mut ids = HashSet::new();
        for handle in handles {
            ids.insert(handle.await.unwrap().unwrap().attempt.id);
        }
        assert_eq!(ids.len(), 1);
        assert_eq!(store.attempt_count(), 1);
    }

    #[tokio::test]
    async fn submit_scores_eighty_percent() {
        let store = Arc::new(MemoryStore::default());
        let sched = store.add_schedule(schedule(at(10, 0), at(11, 0), 30, 5));
        let pool = store.add_questions(question_pool(sched.technology_id, 5, Decimal::new(2, 0)));
        let emp = employee();
        let mut rng = StdRng::seed_from_u64(4);
        let svc = service(&store);

        svc.start_or_resume(&emp, sched.id, at(10, 5), &mut rng).await.unwrap();

        let mut sheet = HashMap::new();
        for q in pool.iter().take(4) {
            sheet.insert(q.id, q.correct_option.parse::<AnswerOption>().unwrap());
        }
        let wrong = if pool[4].correct_option == "A" { AnswerOption::B } else { AnswerOption::A };
        sheet.insert(pool[4].id, wrong);

        let outcome = svc.submit(&emp, sched.id, &sheet, at(10, 10)).await.unwrap();
        assert_eq!(outcome.breakdown.percentage, Decimal::new(8000, 2));
        assert_eq!(outcome.attempt.score, Some(Decimal::new(8000, 2)));
        assert!(outcome.attempt.is_completed);
        assert_eq!(outcome.attempt.end_time, Some(at(10, 10)));
        assert!(outcome.late.is_none());
        assert_eq!(store.answers_for(outcome.attempt.id).len(), 5);
    }

    #[tokio::test]
    async fn submit_records_full_pool_including_unanswered() {
        let store = Arc::new(MemoryStore::default());
        let sched = store.add_schedule(schedule(at(10, 0), at(11, 0), 30, 2));
        let pool = store.add_questions(question_pool(sched.technology_id, 6, Decimal::ONE));
        let emp = employee();
        let mut rng = StdRng::seed_from_u64(4);
        let svc = service(&store);

        let session = svc.start_or_resume(&emp, sched.id, at(10, 5), &mut rng).await.unwrap();
        store.record_answer(session.attempt.id, pool[0].id, Some("D"));

        let mut sheet = HashMap::new();
        sheet.insert(pool[1].id, pool[1].correct_option.parse::<AnswerOption>().unwrap());
        let outcome = svc.submit(&emp, sched.id, &sheet, at(10, 20)).await.unwrap();

        let stored = store.answers_for(outcome.attempt.id);
        assert_eq!(stored.len(), 6);
        assert_eq!(stored.iter().filter(|a| a.selected_option.is_some()).count(), 1);
        assert_eq!(outcome.breakdown.total_questions, 6);
    }

    #[tokio::test]
    async fn second_submit_is_rejected_without_mutation() {
        let store = Arc::new(MemoryStore::default());
        let sched = store.add_schedule(schedule(at(10, 0), at(11, 0), 30, 1));
        let pool = store.add_questions(question_pool(sched.technology_id, 1, Decimal::ONE));
        let emp = employee();
        let mut rng = StdRng::seed_from_u64(4);
        let svc = service(&store);

        svc.start_or_resume(&emp, sched.id, at(10, 5), &mut rng).await.unwrap();
        let first = svc.submit(&emp, sched.id, &HashMap::new(), at(10, 10)).await.unwrap();

        let mut sheet = HashMap::new();
        sheet.insert(pool[0].id, pool[0].correct_option.parse::<AnswerOption>().unwrap());
        let err = svc.submit(&emp, sched.id, &sheet, at(10, 12)).await.unwrap_err();
        assert!(matches!(err, Error::AlreadyCompleted { attempt_id } if attempt_id == first.attempt.id));

        let after = store.attempt(first.attempt.id);
        assert_eq!(after.score, Some(Decimal::ZERO));
        assert_eq!(after.end_time, Some(at(10, 10)));

        let err = svc.start_or_resume(&emp, sched.id, at(10, 13), &mut rng).await.unwrap_err();
        assert!(matches!(err, Error::AlreadyCompleted { .. }));
    }

    #[tokio::test]
    async fn submit_without_attempt_fails() {
        let store = Arc::new(MemoryStore::default());
        let sched = store.add_schedule(schedule(at(10, 0), at(11, 0), 30, 1));
        let err = service(&store)
            .submit(&employee(), sched.id, &HashMap::new(), at(10, 10))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NoActiveAttempt));
    }

    #[tokio::test]
    async fn empty_pool_scores_zero() {
        let store = Arc::new(MemoryStore::default());
        let sched = store.add_schedule(schedule(at(10, 0), at(11, 0), 30, 5));
        let emp = employee();
        let mut rng = StdRng::seed_from_u64(4);
        let svc = service(&store);

        let session = svc.start_or_resume(&emp, sched.id, at(10, 5), &mut rng).await.unwrap();
        assert!(session.questions.is_empty());
        let outcome = svc.submit(&emp, sched.id, &HashMap::new(), at(10, 6)).await.unwrap();
        assert_eq!(outcome.attempt.score, Some(Decimal::ZERO));
    }

    #[tokio::test]
    async fn late_submissions_are_accepted_and_flagged() {
        let store = Arc::new(MemoryStore::default());
        let sched = store.add_schedule(schedule(at(10, 0), at(11, 0), 30, 1));
        store.add_questions(question_pool(sched.technology_id, 1, Decimal::ONE));
        let svc = service(&store);
        let mut rng = StdRng::seed_from_u64(4);

        let slow = employee();
        svc.start_or_resume(&slow, sched.id, at(10, 0), &mut rng).await.unwrap();
        let outcome = svc.submit(&slow, sched.id, &HashMap::new(), at(10, 45)).await.unwrap();
        assert_eq!(outcome.late, Some(LateSubmission::TimeLimitExpired));
        assert!(outcome.attempt.is_completed);

        let closing = employee();
        svc.start_or_resume(&closing, sched.id, at(10, 50), &mut rng).await.unwrap();
        let outcome = svc
            .submit(&closing, sched.id, &HashMap::new(), at(11, 0) + Duration::seconds(30))
            .await
            .unwrap();
        assert_eq!(outcome.late, Some(LateSubmission::WindowClosed));
    }

    #[tokio::test]
    async fn attempt_view_hides_other_employees_and_incomplete_attempts() {
        let store = Arc::new(MemoryStore::default());
        let sched = store.add_schedule(schedule(at(10, 0), at(11, 0), 30, 2));
        let pool = store.add_questions(question_pool(sched.technology_id, 2, Decimal::ONE));
        let emp = employee();
        let mut rng = StdRng::seed_from_u64(4);
        let svc = service(&store);

        let session = svc.start_or_resume(&emp, sched.id, at(10, 5), &mut rng).await.unwrap();
        let err = svc.attempt_view(session.attempt.id, Some(emp.id)).await.unwrap_err();
        assert!(matches!(err, Error::AttemptNotCompleted { .. }));

        let mut sheet = HashMap::new();
        sheet.insert(pool[0].id, pool[0].correct_option.parse::<AnswerOption>().unwrap());
        svc.submit(&emp, sched.id, &sheet, at(10, 9)).await.unwrap();

        let view = svc.attempt_view(session.attempt.id, Some(emp.id)).await.unwrap();
        assert_eq!(view.answers.len(), 2);
        assert_eq!(view.breakdown.correct_count, 1);
        assert_eq!(view.breakdown.percentage, Decimal::new(50, 0));

        let err = svc
            .attempt_view(session.attempt.id, Some(Uuid::new_v4()))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
        assert!(svc.attempt_view(session.attempt.id, None).await.is_ok());
    }
}
