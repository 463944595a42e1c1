#![allow(dead_code)]

use chrono::Utc;
use rust_decimal::Decimal;
use std::sync::Arc;
use ujian_engine::config::Config;
use ujian_engine::models::exam::{Exam, ExamAccessType, ExamQuestionRef, ExamStatus};
use ujian_engine::models::question::{MultipleChoiceOption, Question, QuestionType};
use ujian_engine::store::MemoryStore;
use ujian_engine::EngineContext;
use uuid::Uuid;

/// Multiple-choice question with options a..d where "a" is correct.
pub fn mcq_question(subject_id: Uuid, text: &str, points: i32) -> Question {
    Question {
        id: Uuid::new_v4(),
        subject_id,
        question_type: QuestionType::MultipleChoice,
        text: text.to_string(),
        image_url: None,
        audio_url: None,
        math_formula: None,
        options: ["a", "b", "c", "d"]
            .iter()
            .map(|id| MultipleChoiceOption {
                id: id.to_string(),
                text: format!("Pilihan {}", id.to_uppercase()),
                is_correct: *id == "a",
            })
            .collect(),
        reference_answer: None,
        points,
        created_by: Uuid::new_v4(),
        is_validated: true,
    }
}

pub fn essay_question(subject_id: Uuid, text: &str, points: i32) -> Question {
    Question {
        id: Uuid::new_v4(),
        subject_id,
        question_type: QuestionType::Essay,
        text: text.to_string(),
        image_url: None,
        audio_url: None,
        math_formula: None,
        options: vec![],
        reference_answer: Some("Kunci jawaban.".to_string()),
        points,
        created_by: Uuid::new_v4(),
        is_validated: true,
    }
}

/// Active, openly accessible exam over the given questions, using each
/// question's own points as the exam override.
pub fn exam_for(subject_id: Uuid, questions: &[Question]) -> Exam {
    Exam {
        id: Uuid::new_v4(),
        title: "Penilaian Harian".to_string(),
        subject_id,
        class_ids: vec![Uuid::new_v4()],
        sub_class_ids: vec![],
        creator_id: Uuid::new_v4(),
        questions: questions
            .iter()
            .map(|q| ExamQuestionRef {
                question_id: q.id,
                points: q.points,
            })
            .collect(),
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
        access_type: ExamAccessType::Open,
        exam_token: None,
    }
}

/// Memory-backed context seeded with one exam and its questions.
pub async fn seeded_context(
    exam: Exam,
    questions: Vec<Question>,
) -> (EngineContext, Arc<MemoryStore>) {
    let (ctx, store) = EngineContext::with_memory_store(Config::default());
    store.insert_questions(questions).await;
    store.insert_exam(exam).await;
    (ctx, store)
}
