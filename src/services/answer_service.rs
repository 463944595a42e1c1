use crate::models::question::QuestionType;
use crate::models::submission::StudentAnswer;
use crate::services::question_service::{QuestionSet, QuestionTab};
use std::fmt;
use uuid::Uuid;

/// An unanswered question, identified the way the student sees it: by its
/// 1-based ordinal inside its tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnansweredQuestion {
    pub number: usize,
    pub tab: QuestionTab,
}

impl fmt::Display for UnansweredQuestion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Soal {} ({})", self.number, self.tab.label())
    }
}

/// In-memory answer state for one session, ordered like the built
/// question list. While the session is open this is the source of truth;
/// the persisted copy trails behind via autosave.
#[derive(Debug, Default)]
pub struct AnswerStore {
    answers: Vec<StudentAnswer>,
}

impl AnswerStore {
    /// Seed the store by reconciling the built question list with any
    /// previously persisted answers: matched entries are kept, unmatched
    /// built questions start empty, persisted answers for questions no
    /// longer in the list are dropped.
    pub fn reconcile(set: &QuestionSet, persisted: &[StudentAnswer]) -> Self {
        let answers = set
            .ordered()
            .iter()
            .map(|built| {
                persisted
                    .iter()
                    .find(|a| a.question_id == built.question.id)
                    .cloned()
                    .unwrap_or_else(|| StudentAnswer::empty(built.question.id))
            })
            .collect();
        Self { answers }
    }

    /// Take over an already-finalized answer list verbatim (replay).
    pub fn from_answers(answers: Vec<StudentAnswer>) -> Self {
        Self { answers }
    }

    /// Record an answer. Returns whether anything changed; answers for
    /// questions outside the built list are ignored.
    pub fn set_answer(&mut self, question_id: Uuid, value: impl Into<String>) -> bool {
        let value = value.into();
        let Some(entry) = self
            .answers
            .iter_mut()
            .find(|a| a.question_id == question_id)
        else {
            return false;
        };
        if entry.answer.as_deref() == Some(value.as_str()) {
            return false;
        }
        entry.answer = Some(value);
        // stale correctness from an earlier autosave; recomputed on flush
        entry.is_correct = None;
        true
    }

    pub fn answers(&self) -> &[StudentAnswer] {
        &self.answers
    }

    pub fn to_vec(&self) -> Vec<StudentAnswer> {
        self.answers.clone()
    }

    pub fn answer_for(&self, question_id: Uuid) -> Option<&StudentAnswer> {
        self.answers.iter().find(|a| a.question_id == question_id)
    }

    /// Recompute objective correctness for *answered* multiple-choice
    /// entries, as done before every autosave flush. Unanswered entries
    /// and essay scores are left untouched.
    pub fn annotate_answered(&mut self, set: &QuestionSet) {
        for entry in &mut self.answers {
            let Some(built) = set.get(entry.question_id) else {
                continue;
            };
            if built.question.question_type != QuestionType::MultipleChoice {
                continue;
            }
            if let Some(selected) = entry.answer.as_deref().filter(|v| !v.trim().is_empty()) {
                entry.is_correct = Some(
                    built
                        .question
                        .option(selected)
                        .map_or(false, |o| o.is_correct),
                );
            }
        }
    }

    /// Unanswered questions in built order, labelled per tab.
    pub fn unanswered(&self, set: &QuestionSet) -> Vec<UnansweredQuestion> {
        set.ordered()
            .iter()
            .filter(|built| {
                !self
                    .answer_for(built.question.id)
                    .map_or(false, |a| a.is_answered())
            })
            .filter_map(|built| {
                set.tab_ordinal(built.question.id)
                    .map(|(tab, number)| UnansweredQuestion { number, tab })
            })
            .collect()
    }
}
