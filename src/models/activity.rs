use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The session-relevant subset of the portal's activity actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    StartExamAttempt,
    SubmitExam,
    StudentLeftExamTab,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityEvent {
    pub kind: ActivityKind,
    pub exam_id: Uuid,
    pub student_id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub detail: Option<String>,
}

impl ActivityEvent {
    pub fn new(kind: ActivityKind, exam_id: Uuid, student_id: Uuid, detail: Option<String>) -> Self {
        Self {
            kind,
            exam_id,
            student_id,
            timestamp: Utc::now(),
            detail,
        }
    }
}
