use crate::error::{Error, Result};
use crate::models::activity::ActivityEvent;
use crate::models::exam::Exam;
use crate::models::question::Question;
use crate::models::submission::StudentSubmission;
use crate::store::{ActivityLogSink, ExamCatalog, SubmissionStore};
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

/// In-memory collaborator host: catalog, submission store and activity
/// log in one place. Serves as the local persistence layer for the smoke
/// binary and as the store fixture in tests.
#[derive(Default)]
pub struct MemoryStore {
    exams: RwLock<HashMap<Uuid, Exam>>,
    questions: RwLock<HashMap<Uuid, Question>>,
    submissions: RwLock<HashMap<(Uuid, Uuid), StudentSubmission>>,
    activity: RwLock<Vec<ActivityEvent>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_exam(&self, exam: Exam) {
        self.exams.write().await.insert(exam.id, exam);
    }

    pub async fn insert_question(&self, question: Question) {
        self.questions.write().await.insert(question.id, question);
    }

    pub async fn insert_questions(&self, questions: Vec<Question>) {
        let mut guard = self.questions.write().await;
        for question in questions {
            guard.insert(question.id, question);
        }
    }

    pub async fn submission(
        &self,
        exam_id: Uuid,
        student_id: Uuid,
    ) -> Option<StudentSubmission> {
        self.submissions
            .read()
            .await
            .get(&(exam_id, student_id))
            .cloned()
    }

    pub async fn activity_events(&self) -> Vec<ActivityEvent> {
        self.activity.read().await.clone()
    }
}

#[async_trait]
impl ExamCatalog for MemoryStore {
    async fn get_exam_by_id(&self, id: Uuid) -> Result<Option<Exam>> {
        Ok(self.exams.read().await.get(&id).cloned())
    }

    async fn get_questions_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Question>> {
        let guard = self.questions.read().await;
        Ok(ids.iter().filter_map(|id| guard.get(id).cloned()).collect())
    }
}

#[async_trait]
impl SubmissionStore for MemoryStore {
    async fn get_submission(
        &self,
        exam_id: Uuid,
        student_id: Uuid,
    ) -> Result<Option<StudentSubmission>> {
        Ok(self
            .submissions
            .read()
            .await
            .get(&(exam_id, student_id))
            .cloned())
    }

    async fn create_submission(&self, submission: &StudentSubmission) -> Result<()> {
        let mut guard = self.submissions.write().await;
        let key = (submission.exam_id, submission.student_id);
        if guard.contains_key(&key) {
            return Err(Error::Store(format!(
                "submission already exists for exam {} and student {}",
                submission.exam_id, submission.student_id
            )));
        }
        guard.insert(key, submission.clone());
        Ok(())
    }

    async fn update_submission(&self, submission: &StudentSubmission) -> Result<()> {
        let mut guard = self.submissions.write().await;
        let key = (submission.exam_id, submission.student_id);
        if !guard.contains_key(&key) {
            return Err(Error::Store(format!(
                "no submission to update for exam {} and student {}",
                submission.exam_id, submission.student_id
            )));
        }
        guard.insert(key, submission.clone());
        Ok(())
    }
}

#[async_trait]
impl ActivityLogSink for MemoryStore {
    async fn record(&self, event: ActivityEvent) -> Result<()> {
        self.activity.write().await.push(event);
        Ok(())
    }
}
