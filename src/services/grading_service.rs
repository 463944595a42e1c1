use crate::models::question::QuestionType;
use crate::models::submission::StudentAnswer;
use crate::services::question_service::QuestionSet;
use rust_decimal::Decimal;

/// Result of the objective grading pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObjectiveScore {
    pub earned: Decimal,
    pub max_objective: Decimal,
    /// The exam contains essay questions, so manual review still follows.
    pub needs_review: bool,
}

pub struct GradingService;

impl GradingService {
    /// Seal the objective answers: every multiple-choice entry gets a
    /// definite `is_correct` (true only if the selected option exists and
    /// is marked correct; unanswered entries become false), and earned
    /// points are summed with the per-exam override. Essay scores belong
    /// to the grading workflow and are left untouched.
    pub fn grade_objective(set: &QuestionSet, answers: &mut [StudentAnswer]) -> ObjectiveScore {
        let mut earned = Decimal::ZERO;
        let mut max_objective = Decimal::ZERO;
        let mut needs_review = false;

        for built in set.ordered() {
            let question = &built.question;
            match question.question_type {
                QuestionType::MultipleChoice => {
                    max_objective += Decimal::from(built.points);
                    let Some(entry) =
                        answers.iter_mut().find(|a| a.question_id == question.id)
                    else {
                        continue;
                    };
                    let correct = entry
                        .answer
                        .as_deref()
                        .and_then(|selected| question.option(selected))
                        .map_or(false, |o| o.is_correct);
                    entry.is_correct = Some(correct);
                    if correct {
                        earned += Decimal::from(built.points);
                    }
                }
                QuestionType::Essay => {
                    needs_review = true;
                }
            }
        }

        ObjectiveScore {
            earned,
            max_objective,
            needs_review,
        }
    }
}
