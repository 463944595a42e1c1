pub mod answer_service;
pub mod clock_service;
pub mod gate_service;
pub mod grading_service;
pub mod integrity_service;
pub mod question_service;
pub mod session_runtime;
pub mod session_service;
