use crate::models::exam::Exam;
use crate::models::question::{Question, QuestionType};
use crate::models::submission::QuestionOrderSnapshot;
use crate::utils::shuffle::shuffle;
use std::collections::HashMap;
use uuid::Uuid;

/// The two navigation tabs of the exam page. Only one is shown when the
/// exam has a single question type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QuestionTab {
    MultipleChoice,
    Essay,
}

impl QuestionTab {
    /// The label the student sees: "PG" (pilihan ganda) or "Esai".
    pub fn label(&self) -> &'static str {
        match self {
            QuestionTab::MultipleChoice => "PG",
            QuestionTab::Essay => "Esai",
        }
    }
}

/// A catalog question as presented in one session: options already in
/// presentation order, points taken from the exam's override.
#[derive(Debug, Clone)]
pub struct BuiltQuestion {
    pub question: Question,
    pub points: i32,
}

impl BuiltQuestion {
    pub fn tab(&self) -> QuestionTab {
        match self.question.question_type {
            QuestionType::MultipleChoice => QuestionTab::MultipleChoice,
            QuestionType::Essay => QuestionTab::Essay,
        }
    }
}

/// The session-local, order-fixed question list. Built once per session;
/// a reload rebuilds it from the persisted order snapshot instead of
/// drawing a fresh shuffle.
#[derive(Debug, Clone)]
pub struct QuestionSet {
    ordered: Vec<BuiltQuestion>,
    mcq: Vec<usize>,
    essay: Vec<usize>,
}

impl QuestionSet {
    /// Fresh build honoring the exam's randomization flags. Exam question
    /// references missing from the catalog are dropped, never fatal.
    pub fn build(exam: &Exam, catalog: Vec<Question>) -> Self {
        let mut built = Self::resolve(exam, catalog);
        if exam.randomize_questions {
            shuffle(&mut built);
        }
        if exam.randomize_answers {
            for item in &mut built {
                if item.question.question_type == QuestionType::MultipleChoice {
                    shuffle(&mut item.question.options);
                }
            }
        }
        Self::assemble(built)
    }

    /// Declaration-order build, used when no order snapshot exists (and by
    /// `build` before shuffling).
    pub fn in_declaration_order(exam: &Exam, catalog: Vec<Question>) -> Self {
        Self::assemble(Self::resolve(exam, catalog))
    }

    /// Rebuild the exact order of an earlier session from its persisted
    /// snapshot. Snapshot entries that no longer resolve are dropped.
    pub fn from_snapshot(
        exam: &Exam,
        catalog: Vec<Question>,
        snapshot: &QuestionOrderSnapshot,
    ) -> Self {
        let points: HashMap<Uuid, i32> = exam
            .questions
            .iter()
            .map(|r| (r.question_id, r.points))
            .collect();
        let mut by_id: HashMap<Uuid, Question> =
            catalog.into_iter().map(|q| (q.id, q)).collect();

        let built = snapshot
            .question_ids
            .iter()
            .filter_map(|id| {
                let mut question = by_id.remove(id)?;
                if let Some(order) = snapshot.option_orders.get(id) {
                    reorder_options(&mut question, order);
                }
                let points = points.get(id).copied().unwrap_or(question.points);
                Some(BuiltQuestion { question, points })
            })
            .collect();
        Self::assemble(built)
    }

    fn resolve(exam: &Exam, catalog: Vec<Question>) -> Vec<BuiltQuestion> {
        let mut by_id: HashMap<Uuid, Question> =
            catalog.into_iter().map(|q| (q.id, q)).collect();
        exam.questions
            .iter()
            .filter_map(|r| {
                by_id.remove(&r.question_id).map(|question| BuiltQuestion {
                    question,
                    points: r.points,
                })
            })
            .collect()
    }

    fn assemble(ordered: Vec<BuiltQuestion>) -> Self {
        let mut mcq = Vec::new();
        let mut essay = Vec::new();
        for (idx, item) in ordered.iter().enumerate() {
            match item.tab() {
                QuestionTab::MultipleChoice => mcq.push(idx),
                QuestionTab::Essay => essay.push(idx),
            }
        }
        Self {
            ordered,
            mcq,
            essay,
        }
    }

    /// The persistable order of this build: question ids plus per-question
    /// option order.
    pub fn snapshot(&self) -> QuestionOrderSnapshot {
        let question_ids = self.ordered.iter().map(|b| b.question.id).collect();
        let option_orders = self
            .ordered
            .iter()
            .filter(|b| b.question.question_type == QuestionType::MultipleChoice)
            .map(|b| {
                (
                    b.question.id,
                    b.question.options.iter().map(|o| o.id.clone()).collect(),
                )
            })
            .collect();
        QuestionOrderSnapshot {
            question_ids,
            option_orders,
        }
    }

    pub fn ordered(&self) -> &[BuiltQuestion] {
        &self.ordered
    }

    pub fn is_empty(&self) -> bool {
        self.ordered.is_empty()
    }

    pub fn len(&self) -> usize {
        self.ordered.len()
    }

    pub fn get(&self, question_id: Uuid) -> Option<&BuiltQuestion> {
        self.ordered.iter().find(|b| b.question.id == question_id)
    }

    pub fn tab_len(&self, tab: QuestionTab) -> usize {
        self.tab_indices(tab).len()
    }

    pub fn has_tab(&self, tab: QuestionTab) -> bool {
        self.tab_len(tab) > 0
    }

    /// Both tabs are exposed only when both sub-lists are non-empty.
    pub fn shows_tabs(&self) -> bool {
        !self.mcq.is_empty() && !self.essay.is_empty()
    }

    pub fn default_tab(&self) -> QuestionTab {
        if self.mcq.is_empty() && !self.essay.is_empty() {
            QuestionTab::Essay
        } else {
            QuestionTab::MultipleChoice
        }
    }

    /// The question at a 0-based position within one tab.
    pub fn tab_question(&self, tab: QuestionTab, position: usize) -> Option<&BuiltQuestion> {
        self.tab_indices(tab)
            .get(position)
            .map(|&idx| &self.ordered[idx])
    }

    /// The tab and 1-based ordinal a question is presented under.
    pub fn tab_ordinal(&self, question_id: Uuid) -> Option<(QuestionTab, usize)> {
        for tab in [QuestionTab::MultipleChoice, QuestionTab::Essay] {
            if let Some(pos) = self
                .tab_indices(tab)
                .iter()
                .position(|&idx| self.ordered[idx].question.id == question_id)
            {
                return Some((tab, pos + 1));
            }
        }
        None
    }

    fn tab_indices(&self, tab: QuestionTab) -> &[usize] {
        match tab {
            QuestionTab::MultipleChoice => &self.mcq,
            QuestionTab::Essay => &self.essay,
        }
    }
}

fn reorder_options(question: &mut Question, order: &[String]) {
    let mut remaining = std::mem::take(&mut question.options);
    let mut ordered = Vec::with_capacity(remaining.len());
    for option_id in order {
        if let Some(pos) = remaining.iter().position(|o| &o.id == option_id) {
            ordered.push(remaining.remove(pos));
        }
    }
    // options unknown to the snapshot keep their declaration order at the end
    ordered.extend(remaining);
    question.options = ordered;
}
