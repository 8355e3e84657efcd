use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::database::store::ExamStore;
use crate::error::{Error, Result};
use crate::models::answer::{Answer, NewAnswer};
use crate::models::employee_profile::EmployeeProfile;
use crate::models::employee_result::{EmployeeResult, NewResult, ResultUpdate};
use crate::models::question::Question;
use crate::models::test_attempt::TestAttempt;
use crate::models::test_schedule::TestSchedule;

/// 2026-03-02 at `hour:minute` UTC.
pub(crate) fn at(hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 2, hour, minute, 0).unwrap()
}

pub(crate) fn employee() -> EmployeeProfile {
    let id = Uuid::new_v4();
    EmployeeProfile {
        id,
        user_id: Uuid::new_v4(),
        employee_id: format!("EMP-{}", &id.simple().to_string()[..6]),
        department: Some("Engineering".into()),
    }
}

pub(crate) fn schedule(
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    duration_minutes: i32,
    total_questions: i32,
) -> TestSchedule {
    TestSchedule {
        id: Uuid::new_v4(),
        technology_id: Uuid::new_v4(),
        start_time: start,
        end_time: end,
        duration_minutes,
        total_questions,
        is_active: true,
    }
}

pub(crate) fn question_pool(technology_id: Uuid, size: usize, marks: Decimal) -> Vec<Question> {
    const LETTERS: [&str; 4] = ["A", "B", "C", "D"];
    (0..size)
        .map(|i| Question {
            id: Uuid::new_v4(),
            technology_id,
            question_text: format!("Question {}", i + 1),
            option_a: "first".into(),
            option_b: "second".into(),
            option_c: "third".into(),
            option_d: "fourth".into(),
            correct_option: LETTERS[i % 4].to_string(),
            marks,
            created_at: at(9, 0),
        })
        .collect()
}

#[derive(Default)]
struct Tables {
    schedules: Vec<TestSchedule>,
    questions: Vec<Question>,
    attempts: Vec<TestAttempt>,
    answers: Vec<Answer>,
    results: Vec<EmployeeResult>,
}

/// `ExamStore` over in-process vectors with the same uniqueness rules as the
/// Postgres schema.
#[derive(Default)]
pub(crate) struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub(crate) fn add_schedule(&self, schedule: TestSchedule) -> TestSchedule {
        self.tables.lock().unwrap().schedules.push(schedule.clone());
        schedule
    }

    pub(crate) fn add_questions(&self, questions: Vec<Question>) -> Vec<Question> {
        self.tables
            .lock()
            .unwrap()
            .questions
            .extend(questions.iter().cloned());
        questions
    }

    pub(crate) fn attempt_count(&self) -> usize {
        self.tables.lock().unwrap().attempts.len()
    }

    pub(crate) fn result_count(&self) -> usize {
        self.tables.lock().unwrap().results.len()
    }

    pub(crate) fn attempt(&self, attempt_id: Uuid) -> TestAttempt {
        self.tables
            .lock()
            .unwrap()
            .attempts
            .iter()
            .find(|a| a.id == attempt_id)
            .cloned()
            .expect("attempt exists")
    }

    pub(crate) fn record_answer(&self, attempt_id: Uuid, question_id: Uuid, selected: Option<&str>) {
        self.tables.lock().unwrap().answers.push(Answer {
            id: Uuid::new_v4(),
            test_attempt_id: attempt_id,
            question_id,
            selected_option: selected.map(str::to_string),
        });
    }

    pub(crate) fn answers_for(&self, attempt_id: Uuid) -> Vec<Answer> {
        self.tables
            .lock()
            .unwrap()
            .answers
            .iter()
            .filter(|a| a.test_attempt_id == attempt_id)
            .cloned()
            .collect()
    }

    /// Deletes an attempt the way the schema does: answers cascade, result links go null.
    pub(crate) fn delete_attempt(&self, attempt_id: Uuid) {
        let mut tables = self.tables.lock().unwrap();
        tables.attempts.retain(|a| a.id != attempt_id);
        tables.answers.retain(|a| a.test_attempt_id != attempt_id);
        for result in tables.results.iter_mut() {
            if result.test_attempt_id == Some(attempt_id) {
                result.test_attempt_id = None;
            }
        }
    }
}

#[async_trait]
impl ExamStore for MemoryStore {
    async fn get_schedule(&self, schedule_id: Uuid) -> Result<Option<TestSchedule>> {
        let tables = self.tables.lock().unwrap();
        Ok(tables.schedules.iter().find(|s| s.id == schedule_id).cloned())
    }

    async fn list_questions(&self, technology_id: Uuid) -> Result<Vec<Question>> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .questions
            .iter()
            .filter(|q| q.technology_id == technology_id)
            .cloned()
            .collect())
    }

    async fn find_attempt(&self, employee_id: Uuid, schedule_id: Uuid) -> Result<Option<TestAttempt>> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .attempts
            .iter()
            .find(|a| a.employee_id == employee_id && a.test_schedule_id == schedule_id)
            .cloned())
    }

    async fn get_attempt(&self, attempt_id: Uuid) -> Result<Option<TestAttempt>> {
        let tables = self.tables.lock().unwrap();
        Ok(tables.attempts.iter().find(|a| a.id == attempt_id).cloned())
    }

    async fn create_attempt(
        &self,
        employee_id: Uuid,
        schedule_id: Uuid,
        start_time: DateTime<Utc>,
    ) -> Result<TestAttempt> {
        let mut tables = self.tables.lock().unwrap();
        if tables
            .attempts
            .iter()
            .any(|a| a.employee_id == employee_id && a.test_schedule_id == schedule_id)
        {
            return Err(Error::DuplicateAttemptConflict);
        }
        let attempt = TestAttempt {
            id: Uuid::new_v4(),
            employee_id,
            test_schedule_id: schedule_id,
            start_time,
            end_time: None,
            score: None,
            is_completed: false,
        };
        tables.attempts.push(attempt.clone());
        Ok(attempt)
    }

    async fn list_answers(&self, attempt_id: Uuid) -> Result<Vec<Answer>> {
        Ok(self.answers_for(attempt_id))
    }

    async fn finalize_attempt(
        &self,
        attempt_id: Uuid,
        answers: Vec<NewAnswer>,
        score: Decimal,
        end_time: DateTime<Utc>,
    ) -> Result<TestAttempt> {
        let mut tables = self.tables.lock().unwrap();
        let attempt = tables
            .attempts
            .iter_mut()
            .find(|a| a.id == attempt_id)
            .ok_or_else(|| Error::NotFound("attempt".into()))?;
        if attempt.is_completed {
            return Err(Error::AlreadyCompleted { attempt_id });
        }
        attempt.is_completed = true;
        attempt.score = Some(score);
        attempt.end_time = Some(end_time);
        let finalized = attempt.clone();

        tables.answers.retain(|a| a.test_attempt_id != attempt_id);
        tables.answers.extend(answers.into_iter().map(|a| Answer {
            id: Uuid::new_v4(),
            test_attempt_id: attempt_id,
            question_id: a.question_id,
            selected_option: a.selected_option,
        }));
        Ok(finalized)
    }

    async fn find_result(&self, employee_id: Uuid, schedule_id: Uuid) -> Result<Option<EmployeeResult>> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .results
            .iter()
            .find(|r| r.employee_id == employee_id && r.test_schedule_id == schedule_id)
            .cloned())
    }

    async fn get_result(&self, result_id: Uuid) -> Result<Option<EmployeeResult>> {
        let tables = self.tables.lock().unwrap();
        Ok(tables.results.iter().find(|r| r.id == result_id).cloned())
    }

    async fn create_result(&self, new_result: NewResult) -> Result<Option<EmployeeResult>> {
        let mut tables = self.tables.lock().unwrap();
        if tables.results.iter().any(|r| {
            r.employee_id == new_result.employee_id && r.test_schedule_id == new_result.test_schedule_id
        }) {
            return Ok(None);
        }
        let result = EmployeeResult {
            id: Uuid::new_v4(),
            employee_id: new_result.employee_id,
            test_schedule_id: new_result.test_schedule_id,
            test_attempt_id: Some(new_result.test_attempt_id),
            score: new_result.score,
            passed: new_result.passed,
            declared_by: Some(new_result.declared_by),
            declared_at: new_result.declared_at,
            remarks: None,
        };
        tables.results.push(result.clone());
        Ok(Some(result))
    }

    async fn update_result(&self, result_id: Uuid, update: ResultUpdate) -> Result<EmployeeResult> {
        let mut tables = self.tables.lock().unwrap();
        let result = tables
            .results
            .iter_mut()
            .find(|r| r.id == result_id)
            .ok_or_else(|| Error::NotFound("result".into()))?;
        if let Some(score) = update.score {
            result.score = score;
        }
        if let Some(passed) = update.passed {
            result.passed = passed;
        }
        if let Some(remarks) = update.remarks {
            result.remarks = Some(remarks);
        }
        Ok(result.clone())
    }
}
