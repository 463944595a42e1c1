use crate::error::{Error, GateFailure, Result};
use crate::models::activity::ActivityKind;
use crate::models::exam::Exam;
use crate::models::question::Question;
use crate::models::submission::{StudentAnswer, StudentSubmission};
use crate::services::answer_service::{AnswerStore, UnansweredQuestion};
use crate::services::clock_service::Countdown;
use crate::services::gate_service::{GateDecision, GateFlags, GateSequencer};
use crate::services::grading_service::GradingService;
use crate::services::integrity_service::{self, IntegrityMonitor};
use crate::services::question_service::{BuiltQuestion, QuestionSet, QuestionTab};
use crate::utils::time;
use crate::EngineContext;
use chrono::{DateTime, Utc};
use std::fmt;
use uuid::Uuid;

/// Why a session reached its terminal write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinishReason {
    Manual,
    TimeExpired,
    ForcedTimeout,
}

/// Recoverable token-gate notice. Not an error: retries are unlimited and
/// there is no lockout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenNotice {
    InvalidToken,
}

impl fmt::Display for TokenNotice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenNotice::InvalidToken => write!(f, "Token ujian salah. Silakan coba lagi."),
        }
    }
}

/// The session states a student can observe. `Loading` is the transient
/// body of [`ExamSession::open`]; gate failures surface as errors there.
/// `InProgress -> Finished` is the only forward transition out of the live
/// state, and it is one-way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionPhase {
    AwaitingAcknowledgement,
    AwaitingToken { notice: Option<TokenNotice> },
    InProgress,
    Finished,
}

/// Advisory returned by a manual submit request. Auto-submission paths
/// never consult it.
#[derive(Debug, Clone)]
pub struct SubmitCheck {
    pub unanswered: Vec<UnansweredQuestion>,
}

impl SubmitCheck {
    pub fn all_answered(&self) -> bool {
        self.unanswered.is_empty()
    }
}

/// One student's live attempt at one exam: the state machine orchestrating
/// gates, the built question list, the answer store, the countdown, the
/// integrity monitor and the finalizer. Owns all of its state; multiple
/// sessions coexist freely.
#[derive(Debug)]
pub struct ExamSession {
    ctx: EngineContext,
    exam: Exam,
    student_id: Uuid,
    flags: GateFlags,
    phase: SessionPhase,
    submission: Option<StudentSubmission>,
    questions: Option<QuestionSet>,
    answers: AnswerStore,
    clock: Option<Countdown>,
    tab: QuestionTab,
    index: usize,
    integrity: IntegrityMonitor,
    dirty: bool,
}

impl ExamSession {
    /// Load the exam, run the gates, and either suspend at a gate, enter
    /// the live state, or replay an already-sealed submission read-only.
    pub async fn open(ctx: EngineContext, exam_id: Uuid, student_id: Uuid) -> Result<Self> {
        let exam = ctx
            .catalog
            .get_exam_by_id(exam_id)
            .await?
            .ok_or_else(|| Error::NotFound("Ujian tidak ditemukan.".to_string()))?;
        let submission = ctx.submissions.get_submission(exam_id, student_id).await?;

        let mut session = Self {
            ctx,
            exam,
            student_id,
            flags: GateFlags::default(),
            phase: SessionPhase::AwaitingAcknowledgement,
            submission,
            questions: None,
            answers: AnswerStore::default(),
            clock: None,
            tab: QuestionTab::MultipleChoice,
            index: 0,
            integrity: IntegrityMonitor::new(),
            dirty: false,
        };
        session.resolve_gates().await?;
        Ok(session)
    }

    async fn resolve_gates(&mut self) -> Result<()> {
        let decision = GateSequencer::evaluate(
            &self.exam,
            self.submission.as_ref(),
            &self.flags,
            time::now(),
        );
        match decision {
            GateDecision::Fail(GateFailure::AlreadyCompleted) => self.enter_replay().await,
            GateDecision::Fail(failure) => Err(Error::Gate(failure)),
            GateDecision::AwaitAcknowledgement => {
                self.phase = SessionPhase::AwaitingAcknowledgement;
                Ok(())
            }
            GateDecision::AwaitToken => {
                self.phase = SessionPhase::AwaitingToken { notice: None };
                Ok(())
            }
            GateDecision::Proceed => self.enter_in_progress().await,
        }
    }

    /// Read-only replay of a sealed submission: gates bypassed, persisted
    /// answers surfaced as-is.
    async fn enter_replay(&mut self) -> Result<()> {
        let submission = match self.submission.clone() {
            Some(s) => s,
            None => return Err(Error::Internal("replay without a submission".to_string())),
        };
        let catalog = self.load_catalog().await?;
        let set = match submission.question_order.as_ref() {
            Some(snapshot) => QuestionSet::from_snapshot(&self.exam, catalog, snapshot),
            None => QuestionSet::in_declaration_order(&self.exam, catalog),
        };
        self.answers = AnswerStore::from_answers(submission.answers.clone());
        self.tab = set.default_tab();
        self.index = 0;
        self.questions = Some(set);
        self.phase = SessionPhase::Finished;
        Ok(())
    }

    /// All gates resolved: fix the built order, create the submission if
    /// this is the first entry, and start the countdown from the
    /// submission's start instant.
    async fn enter_in_progress(&mut self) -> Result<()> {
        let catalog = self.load_catalog().await?;
        let now = time::now();

        let (submission, set) = match self.submission.take() {
            Some(existing) => {
                let set = match existing.question_order.as_ref() {
                    Some(snapshot) => QuestionSet::from_snapshot(&self.exam, catalog, snapshot),
                    None => QuestionSet::in_declaration_order(&self.exam, catalog),
                };
                (existing, set)
            }
            None => {
                let set = QuestionSet::build(&self.exam, catalog);
                let mut created = StudentSubmission::new(self.exam.id, self.student_id, now);
                created.question_order = Some(set.snapshot());
                created.answers = set
                    .ordered()
                    .iter()
                    .map(|b| StudentAnswer::empty(b.question.id))
                    .collect();
                self.ctx.submissions.create_submission(&created).await?;
                self.record_activity(
                    ActivityKind::StartExamAttempt,
                    Some(format!("Mulai mengerjakan ujian \"{}\".", self.exam.title)),
                )
                .await;
                (created, set)
            }
        };

        self.answers = AnswerStore::reconcile(&set, &submission.answers);
        self.clock = Some(Countdown::new(
            submission.start_time,
            self.exam.duration_minutes,
        ));
        self.tab = set.default_tab();
        self.index = 0;
        self.questions = Some(set);
        self.submission = Some(submission);
        self.phase = SessionPhase::InProgress;
        Ok(())
    }

    async fn load_catalog(&self) -> Result<Vec<Question>> {
        let ids: Vec<Uuid> = self.exam.questions.iter().map(|r| r.question_id).collect();
        self.ctx.catalog.get_questions_by_ids(&ids).await
    }

    async fn record_activity(&self, kind: ActivityKind, detail: Option<String>) {
        let event = crate::models::activity::ActivityEvent::new(
            kind,
            self.exam.id,
            self.student_id,
            detail,
        );
        if let Err(err) = self.ctx.activity_log.record(event).await {
            tracing::warn!(error = %err, exam_id = %self.exam.id, "activity log write failed");
        }
    }

    /// Explicit prerequisite acknowledgement. No timeout: the session
    /// stays suspended until this is called.
    pub async fn acknowledge_prerequisites(&mut self) -> Result<&SessionPhase> {
        if matches!(self.phase, SessionPhase::AwaitingAcknowledgement) {
            self.flags.acknowledged = true;
            self.resolve_gates().await?;
        }
        Ok(&self.phase)
    }

    /// Token submission. A mismatch keeps the session suspended with an
    /// `InvalidToken` notice; resubmission is always allowed.
    pub async fn submit_token(&mut self, candidate: &str) -> Result<&SessionPhase> {
        if matches!(self.phase, SessionPhase::AwaitingToken { .. }) {
            if GateSequencer::token_matches(&self.exam, candidate) {
                self.flags.token_validated = true;
                self.resolve_gates().await?;
            } else {
                self.phase = SessionPhase::AwaitingToken {
                    notice: Some(TokenNotice::InvalidToken),
                };
            }
        }
        Ok(&self.phase)
    }

    /// Record an answer in memory. The durable copy follows on the next
    /// autosave flush or at finalization.
    pub fn set_answer(&mut self, question_id: Uuid, value: impl Into<String>) -> Result<()> {
        if self.phase != SessionPhase::InProgress {
            return Err(Error::NotInProgress);
        }
        if self.answers.set_answer(question_id, value) {
            self.dirty = true;
        }
        Ok(())
    }

    pub fn switch_tab(&mut self, tab: QuestionTab) {
        if self.phase != SessionPhase::InProgress {
            return;
        }
        let Some(set) = self.questions.as_ref() else {
            return;
        };
        if set.has_tab(tab) && self.tab != tab {
            self.tab = tab;
            self.index = 0;
        }
    }

    /// Jump inside the active tab. Out-of-range requests are clamped,
    /// never an error.
    pub fn jump_to(&mut self, index: usize) {
        if self.phase != SessionPhase::InProgress {
            return;
        }
        let Some(set) = self.questions.as_ref() else {
            return;
        };
        let len = set.tab_len(self.tab);
        if len == 0 {
            self.index = 0;
        } else {
            self.index = index.min(len - 1);
        }
    }

    pub fn next_question(&mut self) {
        self.jump_to(self.index.saturating_add(1));
    }

    pub fn previous_question(&mut self) {
        self.jump_to(self.index.saturating_sub(1));
    }

    pub fn current_question(&self) -> Option<&BuiltQuestion> {
        self.questions
            .as_ref()
            .and_then(|set| set.tab_question(self.tab, self.index))
    }

    pub fn active_tab(&self) -> QuestionTab {
        self.tab
    }

    pub fn question_index(&self) -> usize {
        self.index
    }

    /// Manual submission request: the advisory listing still-unanswered
    /// questions, each named by its per-tab ordinal. The student may
    /// cancel (do nothing) or proceed with [`confirm_submit`].
    ///
    /// [`confirm_submit`]: ExamSession::confirm_submit
    pub fn request_submit(&self) -> Result<SubmitCheck> {
        if self.phase != SessionPhase::InProgress {
            return Err(Error::NotInProgress);
        }
        let Some(set) = self.questions.as_ref() else {
            return Err(Error::NotInProgress);
        };
        Ok(SubmitCheck {
            unanswered: self.answers.unanswered(set),
        })
    }

    /// The student confirmed: seal the attempt.
    pub async fn confirm_submit(&mut self) -> Result<()> {
        self.finalize(FinishReason::Manual).await
    }

    /// Externally forced timeout: finalize directly, no advisory.
    pub async fn force_timeout(&mut self) -> Result<()> {
        self.finalize(FinishReason::ForcedTimeout).await
    }

    /// Remaining seconds for display. Zero once finished or before the
    /// countdown starts.
    pub fn remaining_seconds(&self, now: DateTime<Utc>) -> i64 {
        match (&self.phase, self.clock.as_ref()) {
            (SessionPhase::InProgress, Some(clock)) => clock.remaining_seconds(now),
            _ => 0,
        }
    }

    /// One tick of the countdown: true when this tick crossed zero and
    /// the session must auto-submit. Fires at most once per crossing.
    pub(crate) fn poll_auto_submit(&mut self, now: DateTime<Utc>) -> bool {
        if self.phase != SessionPhase::InProgress {
            return false;
        }
        match self.clock.as_mut() {
            Some(clock) => clock.poll_auto_submit(now),
            None => false,
        }
    }

    /// The single terminal write path. Idempotent: a sealed submission is
    /// never rewritten, and a repeated call is a no-op.
    pub async fn finalize(&mut self, reason: FinishReason) -> Result<()> {
        match self.phase {
            SessionPhase::Finished => return Ok(()),
            SessionPhase::InProgress => {}
            _ => return Err(Error::NotInProgress),
        }
        let current = match self.submission.clone() {
            Some(s) => s,
            None => {
                return Err(Error::Internal(
                    "live session without a submission".to_string(),
                ))
            }
        };
        if current.is_finished() {
            self.phase = SessionPhase::Finished;
            return Ok(());
        }

        let mut answers = self.answers.to_vec();
        let score = match self.questions.as_ref() {
            Some(set) => GradingService::grade_objective(set, &mut answers),
            None => {
                return Err(Error::Internal(
                    "live session without a question list".to_string(),
                ))
            }
        };

        let now = time::now();
        let mut sealed = current;
        sealed.answers = answers;
        sealed.end_time = Some(now);
        sealed.submitted_at = Some(now);
        sealed.total_score = Some(score.earned);
        // is_graded stays false: that transition belongs to the grading
        // workflow once every essay score is in

        if let Err(err) = self.ctx.submissions.update_submission(&sealed).await {
            if let Some(clock) = self.clock.as_mut() {
                clock.rearm();
            }
            tracing::error!(error = %err, exam_id = %self.exam.id, "terminal submission write failed");
            return Err(err);
        }

        self.answers = AnswerStore::from_answers(sealed.answers.clone());
        self.submission = Some(sealed);
        self.dirty = false;
        self.phase = SessionPhase::Finished;
        tracing::info!(
            exam_id = %self.exam.id,
            student_id = %self.student_id,
            ?reason,
            score = %score.earned,
            needs_review = score.needs_review,
            "exam session finalized"
        );
        self.record_activity(
            ActivityKind::SubmitExam,
            Some(format!("Menyelesaikan ujian \"{}\".", self.exam.title)),
        )
        .await;
        Ok(())
    }

    /// Debounced autosave flush. Best-effort: a store failure keeps the
    /// in-memory answers dirty and is retried on the next window, never
    /// surfaced to the student. Returns true when nothing is left to
    /// flush.
    pub async fn flush_answers(&mut self) -> bool {
        if self.phase != SessionPhase::InProgress || !self.dirty {
            return true;
        }

        let persisted = match self
            .ctx
            .submissions
            .get_submission(self.exam.id, self.student_id)
            .await
        {
            Ok(Some(s)) => s,
            Ok(None) => {
                tracing::warn!(exam_id = %self.exam.id, "autosave skipped: submission missing");
                return true;
            }
            Err(err) => {
                tracing::warn!(error = %err, "autosave read failed; will retry");
                return false;
            }
        };
        if persisted.is_finished() {
            // terminal copy wins; late in-memory edits are not persisted
            return true;
        }

        if let Some(set) = self.questions.as_ref() {
            self.answers.annotate_answered(set);
        }

        let mut updated = persisted;
        updated.answers = self.answers.to_vec();
        match self.ctx.submissions.update_submission(&updated).await {
            Ok(()) => {
                self.submission = Some(updated);
                self.dirty = false;
                tracing::debug!(exam_id = %self.exam.id, "answers autosaved");
                true
            }
            Err(err) => {
                tracing::warn!(error = %err, "autosave failed; will retry on the next window");
                false
            }
        }
    }

    /// Page-visibility transition to hidden. Returns the one-time warning
    /// text when this transition should be surfaced; the matching audit
    /// signal is raised fire-and-forget.
    pub async fn report_hidden(&mut self) -> Option<&'static str> {
        if self.phase != SessionPhase::InProgress {
            return None;
        }
        if self.questions.as_ref().map_or(true, |s| s.is_empty()) {
            return None;
        }
        if !self.integrity.visibility_hidden() {
            return None;
        }
        self.record_activity(
            ActivityKind::StudentLeftExamTab,
            Some(format!(
                "Siswa meninggalkan tab saat mengerjakan ujian \"{}\".",
                self.exam.title
            )),
        )
        .await;
        Some(integrity_service::TAB_WARNING)
    }

    pub fn acknowledge_warning(&mut self) {
        self.integrity.acknowledge_warning();
    }

    /// Browser-level unload advisory. Advisory only, never enforced.
    pub fn unload_prompt(&self) -> Option<&'static str> {
        let live = self.phase == SessionPhase::InProgress;
        let has_questions = self.questions.as_ref().map_or(false, |s| !s.is_empty());
        if live && has_questions {
            Some(integrity_service::UNLOAD_WARNING)
        } else {
            None
        }
    }

    pub fn phase(&self) -> &SessionPhase {
        &self.phase
    }

    pub fn is_finished(&self) -> bool {
        self.phase == SessionPhase::Finished
    }

    pub fn exam(&self) -> &Exam {
        &self.exam
    }

    pub fn student_id(&self) -> Uuid {
        self.student_id
    }

    pub fn questions(&self) -> Option<&QuestionSet> {
        self.questions.as_ref()
    }

    pub fn answers(&self) -> &[StudentAnswer] {
        self.answers.answers()
    }

    pub fn submission(&self) -> Option<&StudentSubmission> {
        self.submission.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::models::exam::{ExamAccessType, ExamStatus};
    use crate::store::{MockActivityLogSink, MockExamCatalog, MockSubmissionStore};
    use mockall::predicate::eq;
    use rust_decimal::Decimal;
    use std::sync::Arc;

    fn token_exam(exam_id: Uuid) -> Exam {
        Exam {
            id: exam_id,
            title: "Ujian Terkunci".to_string(),
            subject_id: Uuid::new_v4(),
            class_ids: vec![],
            sub_class_ids: vec![],
            creator_id: Uuid::new_v4(),
            questions: vec![],
            duration_minutes: 30,
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
            access_type: ExamAccessType::TokenRequired,
            exam_token: Some("TOKEN123".to_string()),
        }
    }

    fn gated_ctx(exam_id: Uuid) -> EngineContext {
        let exam = token_exam(exam_id);

        let mut catalog = MockExamCatalog::new();
        catalog
            .expect_get_exam_by_id()
            .with(eq(exam_id))
            .returning(move |_| Ok(Some(exam.clone())));
        // the question list is never built while suspended at a gate
        catalog.expect_get_questions_by_ids().never();

        let mut submissions = MockSubmissionStore::new();
        submissions
            .expect_get_submission()
            .returning(|_, _| Ok(None));
        submissions.expect_create_submission().never();
        submissions.expect_update_submission().never();

        let mut sink = MockActivityLogSink::new();
        sink.expect_record().never();

        EngineContext::new(
            Arc::new(catalog),
            Arc::new(submissions),
            Arc::new(sink),
            Config::default(),
        )
    }

    #[tokio::test]
    async fn wrong_token_keeps_the_session_suspended() {
        let exam_id = Uuid::new_v4();
        let mut session = ExamSession::open(gated_ctx(exam_id), exam_id, Uuid::new_v4())
            .await
            .unwrap();

        assert_eq!(
            session.phase(),
            &SessionPhase::AwaitingToken { notice: None }
        );

        session.submit_token("WRONG1").await.unwrap();
        assert_eq!(
            session.phase(),
            &SessionPhase::AwaitingToken {
                notice: Some(TokenNotice::InvalidToken)
            }
        );

        // still recoverable: no store write, no error
        session.submit_token("wrong again").await.unwrap();
        assert!(matches!(
            session.phase(),
            SessionPhase::AwaitingToken { notice: Some(_) }
        ));
    }

    #[tokio::test]
    async fn autosave_is_skipped_while_a_gate_is_unresolved() {
        let exam_id = Uuid::new_v4();
        let mut session = ExamSession::open(gated_ctx(exam_id), exam_id, Uuid::new_v4())
            .await
            .unwrap();

        // nothing to flush and, per the mock expectations above, no store
        // traffic at all
        assert!(session.flush_answers().await);
        assert!(session.set_answer(Uuid::new_v4(), "a").is_err());
    }
}
