use crate::error::Result;
use crate::models::activity::ActivityEvent;
use crate::models::exam::Exam;
use crate::models::question::Question;
use crate::models::submission::StudentSubmission;
use async_trait::async_trait;
use uuid::Uuid;

pub mod memory;

pub use memory::MemoryStore;

/// Read-only lookup into the exam and question catalog. Lookups may return
/// a subset when entries are missing; the engine treats dangling question
/// references defensively instead of failing the session.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ExamCatalog: Send + Sync {
    async fn get_exam_by_id(&self, id: Uuid) -> Result<Option<Exam>>;
    async fn get_questions_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Question>>;
}

/// Durable submission records, one per (exam, student) pair.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SubmissionStore: Send + Sync {
    async fn get_submission(
        &self,
        exam_id: Uuid,
        student_id: Uuid,
    ) -> Result<Option<StudentSubmission>>;

    async fn create_submission(&self, submission: &StudentSubmission) -> Result<()>;

    /// Last-write-wins. Called by both autosave (partial) and the
    /// finalizer (terminal); callers must not assume atomicity across
    /// fields.
    async fn update_submission(&self, submission: &StudentSubmission) -> Result<()>;
}

/// Fire-and-forget audit sink. A failed write is logged by the caller and
/// never blocks the session.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ActivityLogSink: Send + Sync {
    async fn record(&self, event: ActivityEvent) -> Result<()>;
}
