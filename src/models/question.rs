use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    MultipleChoice,
    Essay,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MultipleChoiceOption {
    pub id: String,
    pub text: String,
    pub is_correct: bool,
}

/// A bank question. The `image_url`/`audio_url`/`math_formula` strings are
/// passed through to the presentation layer unmodified.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    pub id: Uuid,
    pub subject_id: Uuid,
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    pub text: String,
    pub image_url: Option<String>,
    pub audio_url: Option<String>,
    pub math_formula: Option<String>,
    /// Empty for essay questions.
    #[serde(default)]
    pub options: Vec<MultipleChoiceOption>,
    /// Reference answer for essay questions, shown to the grader only.
    pub reference_answer: Option<String>,
    #[serde(default = "default_points")]
    pub points: i32,
    pub created_by: Uuid,
    pub is_validated: bool,
}

fn default_points() -> i32 {
    1
}

impl Question {
    pub fn option(&self, option_id: &str) -> Option<&MultipleChoiceOption> {
        self.options.iter().find(|o| o.id == option_id)
    }
}
