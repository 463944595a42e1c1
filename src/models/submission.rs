use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudentAnswer {
    pub question_id: Uuid,
    /// Selected option id for multiple choice, free text for essay.
    pub answer: Option<String>,
    pub is_correct: Option<bool>,
    /// Essay score, populated by the grading workflow after the session.
    pub score: Option<Decimal>,
}

impl StudentAnswer {
    pub fn empty(question_id: Uuid) -> Self {
        Self {
            question_id,
            answer: None,
            is_correct: None,
            score: None,
        }
    }

    /// Empty and whitespace-only answers count as unanswered.
    pub fn is_answered(&self) -> bool {
        self.answer
            .as_deref()
            .map_or(false, |a| !a.trim().is_empty())
    }
}

/// The built question order of one session, persisted alongside the
/// submission so a reload reproduces the same shuffle instead of drawing a
/// fresh one.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QuestionOrderSnapshot {
    pub question_ids: Vec<Uuid>,
    #[serde(default)]
    pub option_orders: HashMap<Uuid, Vec<String>>,
}

/// One student's single attempt at one exam. Created on entry into the
/// live state; sealed exactly once by the finalizer. Never deleted by the
/// session engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudentSubmission {
    pub id: Uuid,
    pub exam_id: Uuid,
    pub student_id: Uuid,
    pub answers: Vec<StudentAnswer>,
    pub question_order: Option<QuestionOrderSnapshot>,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub submitted_at: Option<DateTime<Utc>>,
    pub total_score: Option<Decimal>,
    pub is_graded: bool,
}

impl StudentSubmission {
    pub fn new(exam_id: Uuid, student_id: Uuid, start_time: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            exam_id,
            student_id,
            answers: Vec::new(),
            question_order: None,
            start_time,
            end_time: None,
            submitted_at: None,
            total_score: None,
            is_graded: false,
        }
    }

    /// A submission with a terminal end time is sealed: the engine only
    /// reads it back for replay.
    pub fn is_finished(&self) -> bool {
        self.end_time.is_some()
    }
}
