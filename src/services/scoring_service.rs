use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use crate::models::answer::{Answer, NewAnswer};
use crate::models::question::{AnswerOption, Question};

/// Decimal places kept for percentage scores; matches NUMERIC(5, 2).
pub const SCORE_SCALE: u32 = 2;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreBreakdown {
    pub correct_count: usize,
    pub total_questions: usize,
    pub marks_obtained: Decimal,
    pub total_marks: Decimal,
    pub percentage: Decimal,
}

impl ScoreBreakdown {
    pub fn zeroed() -> Self {
        Self {
            correct_count: 0,
            total_questions: 0,
            marks_obtained: Decimal::ZERO,
            total_marks: Decimal::ZERO,
            percentage: Decimal::ZERO,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct GradedAnswer {
    pub question_id: Uuid,
    pub question_text: String,
    pub selected_option: Option<String>,
    pub correct_option: String,
    pub marks: Decimal,
    pub is_correct: bool,
}

pub struct ScoringService;

impl ScoringService {
    /// `100 * marks(correct) / marks(all)`, or zero when there are no marks to score.
    pub fn percentage<I>(pairs: I) -> Decimal
    where
        I: IntoIterator<Item = (Decimal, bool)>,
    {
        Self::breakdown(pairs).percentage
    }

    pub fn breakdown<I>(pairs: I) -> ScoreBreakdown
    where
        I: IntoIterator<Item = (Decimal, bool)>,
    {
        let mut out = ScoreBreakdown::zeroed();
        for (marks, is_correct) in pairs {
            out.total_questions += 1;
            out.total_marks += marks;
            if is_correct {
                out.correct_count += 1;
                out.marks_obtained += marks;
            }
        }
        let mut percentage = if out.total_marks > Decimal::ZERO {
            (out.marks_obtained * Decimal::ONE_HUNDRED / out.total_marks).round_dp(SCORE_SCALE)
        } else {
            Decimal::ZERO
        };
        // Fixed scale so "80" and the stored "80.00" render the same.
        percentage.rescale(SCORE_SCALE);
        out.percentage = percentage;
        out
    }

    /// Grades a submitted sheet against `questions`, producing one answer row
    /// per question. Sheet entries for other questions are ignored.
    pub fn grade_sheet(
        questions: &[Question],
        sheet: &HashMap<Uuid, AnswerOption>,
    ) -> (Vec<NewAnswer>, ScoreBreakdown) {
        let answers: Vec<NewAnswer> = questions
            .iter()
            .map(|q| NewAnswer {
                question_id: q.id,
                selected_option: sheet.get(&q.id).map(|o| o.as_str().to_string()),
            })
            .collect();

        let breakdown = Self::breakdown(
            questions
                .iter()
                .zip(answers.iter())
                .map(|(q, a)| (q.marks, q.is_correct(a.selected_option.as_deref()))),
        );
        (answers, breakdown)
    }

    /// Re-grades stored answers for display. Answers whose question no longer
    /// exists are skipped.
    pub fn grade_recorded(questions: &[Question], answers: &[Answer]) -> (Vec<GradedAnswer>, ScoreBreakdown) {
        let by_id: HashMap<Uuid, &Question> = questions.iter().map(|q| (q.id, q)).collect();

        let mut graded: Vec<GradedAnswer> = answers
            .iter()
            .filter_map(|a| {
                let q = by_id.get(&a.question_id)?;
                Some(GradedAnswer {
                    question_id: q.id,
                    question_text: q.question_text.clone(),
                    selected_option: a.selected_option.clone(),
                    correct_option: q.correct_option.clone(),
                    marks: q.marks,
                    is_correct: q.is_correct(a.selected_option.as_deref()),
                })
            })
            .collect();
        graded.sort_by_key(|g| g.question_id);

        let breakdown = Self::breakdown(graded.iter().map(|g| (g.marks, g.is_correct)));
        (graded, breakdown)
    }
}
