use crate::error::GateFailure;
use crate::models::exam::{Exam, ExamAccessType, ExamStatus};
use crate::models::submission::StudentSubmission;
use chrono::{DateTime, Utc};

/// Session-local gate progress. Never persisted: a reload re-runs the
/// gates from scratch.
#[derive(Debug, Clone, Copy, Default)]
pub struct GateFlags {
    pub acknowledged: bool,
    pub token_validated: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    Proceed,
    AwaitAcknowledgement,
    AwaitToken,
    Fail(GateFailure),
}

pub struct GateSequencer;

impl GateSequencer {
    /// Deterministic, side-effect-free admission check. A sealed
    /// submission short-circuits everything else; the controller turns
    /// that failure into a read-only replay.
    pub fn evaluate(
        exam: &Exam,
        submission: Option<&StudentSubmission>,
        flags: &GateFlags,
        now: DateTime<Utc>,
    ) -> GateDecision {
        if submission.map_or(false, |s| s.is_finished()) {
            return GateDecision::Fail(GateFailure::AlreadyCompleted);
        }
        if let Some(opens_at) = exam.start_time {
            if now < opens_at {
                return GateDecision::Fail(GateFailure::NotYetOpen { opens_at });
            }
        }
        if let Some(closes_at) = exam.end_time {
            if now > closes_at {
                return GateDecision::Fail(GateFailure::WindowClosed);
            }
        }
        if exam.status != ExamStatus::Active {
            return GateDecision::Fail(GateFailure::NotActive);
        }
        if exam.show_prerequisites && !flags.acknowledged {
            return GateDecision::AwaitAcknowledgement;
        }
        if exam.access_type == ExamAccessType::TokenRequired && !flags.token_validated {
            return GateDecision::AwaitToken;
        }
        GateDecision::Proceed
    }

    /// Case-sensitive comparison against the exam token. No lockout: the
    /// caller may retry indefinitely.
    pub fn token_matches(exam: &Exam, candidate: &str) -> bool {
        exam.exam_token.as_deref() == Some(candidate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use rust_decimal::Decimal;
    use uuid::Uuid;

    fn active_exam() -> Exam {
        Exam {
            id: Uuid::new_v4(),
            title: "Ulangan Harian".to_string(),
            subject_id: Uuid::new_v4(),
            class_ids: vec![],
            sub_class_ids: vec![],
            creator_id: Uuid::new_v4(),
            questions: vec![],
            duration_minutes: 60,
            passing_threshold: Decimal::from(75),
            randomize_questions: false,
            randomize_answers: false,
            status: ExamStatus::Active,
            grades_released: false,
            created_at: Utc::now(),
            start_time: None,
            end_time: None,
            show_prerequisites: false,
            prerequisites_text: None,
            academic_year: "2024/2025".to_string(),
            access_type: ExamAccessType::Open,
            exam_token: None,
        }
    }

    #[test]
    fn open_active_exam_proceeds() {
        let exam = active_exam();
        let decision = GateSequencer::evaluate(&exam, None, &GateFlags::default(), Utc::now());
        assert_eq!(decision, GateDecision::Proceed);
    }

    #[test]
    fn rejects_before_start_time() {
        let mut exam = active_exam();
        let opens_at = Utc::now() + Duration::hours(1);
        exam.start_time = Some(opens_at);
        let decision = GateSequencer::evaluate(&exam, None, &GateFlags::default(), Utc::now());
        assert_eq!(
            decision,
            GateDecision::Fail(GateFailure::NotYetOpen { opens_at })
        );
    }

    #[test]
    fn rejects_after_end_time() {
        let mut exam = active_exam();
        exam.end_time = Some(Utc::now() - Duration::minutes(5));
        let decision = GateSequencer::evaluate(&exam, None, &GateFlags::default(), Utc::now());
        assert_eq!(decision, GateDecision::Fail(GateFailure::WindowClosed));
    }

    #[test]
    fn rejects_inactive_exam() {
        let mut exam = active_exam();
        exam.status = ExamStatus::Draft;
        let decision = GateSequencer::evaluate(&exam, None, &GateFlags::default(), Utc::now());
        assert_eq!(decision, GateDecision::Fail(GateFailure::NotActive));
    }

    #[test]
    fn sealed_submission_wins_over_every_other_gate() {
        let mut exam = active_exam();
        exam.status = ExamStatus::Completed;
        exam.show_prerequisites = true;
        let mut submission =
            StudentSubmission::new(exam.id, Uuid::new_v4(), Utc::now() - Duration::hours(1));
        submission.end_time = Some(Utc::now());
        let decision =
            GateSequencer::evaluate(&exam, Some(&submission), &GateFlags::default(), Utc::now());
        assert_eq!(decision, GateDecision::Fail(GateFailure::AlreadyCompleted));
    }

    #[test]
    fn prerequisites_suspend_before_token() {
        let mut exam = active_exam();
        exam.show_prerequisites = true;
        exam.access_type = ExamAccessType::TokenRequired;
        exam.exam_token = Some("TOKEN123".to_string());

        let mut flags = GateFlags::default();
        assert_eq!(
            GateSequencer::evaluate(&exam, None, &flags, Utc::now()),
            GateDecision::AwaitAcknowledgement
        );

        flags.acknowledged = true;
        assert_eq!(
            GateSequencer::evaluate(&exam, None, &flags, Utc::now()),
            GateDecision::AwaitToken
        );

        flags.token_validated = true;
        assert_eq!(
            GateSequencer::evaluate(&exam, None, &flags, Utc::now()),
            GateDecision::Proceed
        );
    }

    #[test]
    fn token_comparison_is_case_sensitive() {
        let mut exam = active_exam();
        exam.exam_token = Some("TOKEN123".to_string());
        assert!(GateSequencer::token_matches(&exam, "TOKEN123"));
        assert!(!GateSequencer::token_matches(&exam, "token123"));
        assert!(!GateSequencer::token_matches(&exam, "WRONG1"));
    }

    #[test]
    fn missing_token_never_matches() {
        let exam = active_exam();
        assert!(!GateSequencer::token_matches(&exam, ""));
    }
}
