pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod store;
pub mod utils;

use crate::config::Config;
use crate::store::{ActivityLogSink, ExamCatalog, MemoryStore, SubmissionStore};
use std::sync::Arc;

/// Shared handles to the engine's external collaborators. The engine is
/// host-agnostic: any catalog/store/sink implementation plugs in here.
#[derive(Clone)]
pub struct EngineContext {
    pub catalog: Arc<dyn ExamCatalog>,
    pub submissions: Arc<dyn SubmissionStore>,
    pub activity_log: Arc<dyn ActivityLogSink>,
    pub config: Config,
}

impl std::fmt::Debug for EngineContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineContext")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl EngineContext {
    pub fn new(
        catalog: Arc<dyn ExamCatalog>,
        submissions: Arc<dyn SubmissionStore>,
        activity_log: Arc<dyn ActivityLogSink>,
        config: Config,
    ) -> Self {
        Self {
            catalog,
            submissions,
            activity_log,
            config,
        }
    }

    /// Context backed entirely by one in-memory store, for local runs and
    /// tests.
    pub fn with_memory_store(config: Config) -> (Self, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        let catalog: Arc<dyn ExamCatalog> = store.clone();
        let submissions: Arc<dyn SubmissionStore> = store.clone();
        let activity_log: Arc<dyn ActivityLogSink> = store.clone();
        (
            Self {
                catalog,
                submissions,
                activity_log,
                config,
            },
            store,
        )
    }
}
