use chrono::{DateTime, Utc};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{0}")]
    NotFound(String),

    #[error(transparent)]
    Gate(#[from] GateFailure),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Session is not in progress")]
    NotInProgress,

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Terminal admission failures. The display string is what the student
/// sees, together with a single "back to the exam list" action.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GateFailure {
    #[error("Ujian ini belum dimulai. Akan dimulai pada: {}.", .opens_at.format("%d-%m-%Y %H:%M"))]
    NotYetOpen { opens_at: DateTime<Utc> },

    #[error("Waktu untuk mengerjakan ujian ini sudah berakhir.")]
    WindowClosed,

    #[error("Ujian ini tidak aktif atau sudah berakhir.")]
    NotActive,

    #[error("Anda sudah menyelesaikan ujian ini.")]
    AlreadyCompleted,
}
