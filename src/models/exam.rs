use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExamStatus {
    Draft,
    PendingValidation,
    Active,
    Completed,
    Archived,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExamAccessType {
    Open,
    TokenRequired,
}

/// A question reference with the point value used in this exam, which may
/// override the question's own base points. This is the authoritative
/// scoring weight during a session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExamQuestionRef {
    pub question_id: Uuid,
    pub points: i32,
}

/// An exam definition as authored by a teacher. Immutable for the duration
/// of a session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Exam {
    pub id: Uuid,
    pub title: String,
    pub subject_id: Uuid,
    pub class_ids: Vec<Uuid>,
    pub sub_class_ids: Vec<Uuid>,
    pub creator_id: Uuid,
    pub questions: Vec<ExamQuestionRef>,
    pub duration_minutes: i32,
    pub passing_threshold: Decimal,
    pub randomize_questions: bool,
    pub randomize_answers: bool,
    pub status: ExamStatus,
    pub grades_released: bool,
    pub created_at: DateTime<Utc>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub show_prerequisites: bool,
    pub prerequisites_text: Option<String>,
    pub academic_year: String,
    pub access_type: ExamAccessType,
    pub exam_token: Option<String>,
}
