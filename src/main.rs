use chrono::Utc;
use rust_decimal::Decimal;
use tracing::{info, warn};
use ujian_engine::config::Config;
use ujian_engine::models::exam::{Exam, ExamAccessType, ExamQuestionRef, ExamStatus};
use ujian_engine::models::question::{MultipleChoiceOption, Question, QuestionType};
use ujian_engine::services::session_runtime::SessionRuntime;
use ujian_engine::utils::time::format_remaining;
use ujian_engine::EngineContext;
use uuid::Uuid;

/// Smoke harness: drives one scripted session against the in-memory host,
/// end to end, and logs what the engine does.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    let config = Config::from_env()?;
    let debounce = config.autosave_debounce();
    let (ctx, store) = EngineContext::with_memory_store(config);

    let teacher_id = Uuid::new_v4();
    let subject_id = Uuid::new_v4();
    let student_id = Uuid::new_v4();

    let questions = sample_questions(subject_id, teacher_id);
    let exam = sample_exam(subject_id, teacher_id, &questions);
    let exam_id = exam.id;
    store.insert_questions(questions).await;
    store.insert_exam(exam).await;

    let runtime = SessionRuntime::start(ctx, exam_id, student_id).await?;
    info!(phase = ?runtime.phase().await, "session opened");

    runtime.acknowledge_prerequisites().await?;
    let phase = runtime.submit_token("SALAH").await?;
    info!(?phase, "first token attempt rejected");
    runtime.submit_token("TOKEN123").await?;
    info!(
        remaining = %format_remaining(runtime.remaining_seconds().await),
        "token accepted, countdown running"
    );

    // answer the first multiple-choice question and the essay; the second
    // multiple-choice question is left blank on purpose
    let answer_plan: Vec<(Uuid, Option<String>, QuestionType)> = {
        let session = runtime.session().await;
        let set = session
            .questions()
            .ok_or_else(|| anyhow::anyhow!("question list missing"))?;
        set.ordered()
            .iter()
            .map(|b| {
                let correct = b
                    .question
                    .options
                    .iter()
                    .find(|o| o.is_correct)
                    .map(|o| o.id.clone());
                (b.question.id, correct, b.question.question_type)
            })
            .collect()
    };

    let mut mcq_answered = false;
    for (question_id, correct_option, question_type) in &answer_plan {
        match question_type {
            QuestionType::MultipleChoice if !mcq_answered => {
                if let Some(option_id) = correct_option {
                    runtime.set_answer(*question_id, option_id.clone()).await?;
                    mcq_answered = true;
                }
            }
            QuestionType::Essay => {
                runtime
                    .set_answer(
                        *question_id,
                        "Fotosintesis mengubah energi cahaya menjadi energi kimia.",
                    )
                    .await?;
            }
            _ => {}
        }
    }

    if let Some(warning) = runtime.report_hidden().await {
        warn!(message = warning, "integrity signal raised");
        runtime.acknowledge_warning().await;
    }

    // let the debounced autosave land once before submitting
    tokio::time::sleep(debounce + std::time::Duration::from_millis(500)).await;
    if let Some(saved) = store.submission(exam_id, student_id).await {
        info!(
            answered = saved.answers.iter().filter(|a| a.is_answered()).count(),
            "autosave persisted in-progress answers"
        );
    }

    let check = runtime.request_submit().await?;
    for item in &check.unanswered {
        info!(soal = %item, "belum dijawab");
    }
    runtime.confirm_submit().await?;

    let sealed = store
        .submission(exam_id, student_id)
        .await
        .ok_or_else(|| anyhow::anyhow!("submission missing after finalization"))?;
    info!(
        total_score = %sealed.total_score.unwrap_or_default(),
        submitted_at = ?sealed.submitted_at,
        is_graded = sealed.is_graded,
        "ujian selesai"
    );

    let events = store.activity_events().await;
    info!(count = events.len(), "activity events recorded");

    Ok(())
}

fn sample_questions(subject_id: Uuid, teacher_id: Uuid) -> Vec<Question> {
    let mcq = |text: &str, options: &[(&str, &str, bool)]| Question {
        id: Uuid::new_v4(),
        subject_id,
        question_type: QuestionType::MultipleChoice,
        text: text.to_string(),
        image_url: None,
        audio_url: None,
        math_formula: None,
        options: options
            .iter()
            .map(|(id, text, is_correct)| MultipleChoiceOption {
                id: id.to_string(),
                text: text.to_string(),
                is_correct: *is_correct,
            })
            .collect(),
        reference_answer: None,
        points: 10,
        created_by: teacher_id,
        is_validated: true,
    };

    vec![
        mcq(
            "Organel sel yang berperan dalam fotosintesis adalah...",
            &[
                ("a", "Kloroplas", true),
                ("b", "Mitokondria", false),
                ("c", "Ribosom", false),
                ("d", "Lisosom", false),
            ],
        ),
        mcq(
            "Hasil utama reaksi terang fotosintesis adalah...",
            &[
                ("a", "Glukosa", false),
                ("b", "ATP dan NADPH", true),
                ("c", "Karbon dioksida", false),
                ("d", "Amilum", false),
            ],
        ),
        Question {
            id: Uuid::new_v4(),
            subject_id,
            question_type: QuestionType::Essay,
            text: "Jelaskan proses fotosintesis secara singkat.".to_string(),
            image_url: None,
            audio_url: None,
            math_formula: Some("6CO_2 + 6H_2O \\rightarrow C_6H_{12}O_6 + 6O_2".to_string()),
            options: vec![],
            reference_answer: Some(
                "Tumbuhan mengubah air dan karbon dioksida menjadi glukosa dan oksigen."
                    .to_string(),
            ),
            points: 20,
            created_by: teacher_id,
            is_validated: true,
        },
    ]
}

fn sample_exam(subject_id: Uuid, teacher_id: Uuid, questions: &[Question]) -> Exam {
    Exam {
        id: Uuid::new_v4(),
        title: "Penilaian Harian Biologi".to_string(),
        subject_id,
        class_ids: vec![Uuid::new_v4()],
        sub_class_ids: vec![],
        creator_id: teacher_id,
        questions: questions
            .iter()
            .map(|q| ExamQuestionRef {
                question_id: q.id,
                points: q.points,
            })
            .collect(),
        duration_minutes: 45,
        passing_threshold: Decimal::from(75),
        randomize_questions: true,
        randomize_answers: true,
        status: ExamStatus::Active,
        grades_released: false,
        created_at: Utc::now(),
        start_time: None,
        end_time: None,
        show_prerequisites: true,
        prerequisites_text: Some(
            "Pastikan koneksi internet stabil dan kerjakan secara mandiri.".to_string(),
        ),
        academic_year: "2024/2025".to_string(),
        access_type: ExamAccessType::TokenRequired,
        exam_token: Some("TOKEN123".to_string()),
    }
}
