use crate::error::Result;
use crate::services::session_service::{
    ExamSession, FinishReason, SessionPhase, SubmitCheck,
};
use crate::utils::time as wall;
use crate::EngineContext;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Mutex, MutexGuard};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use uuid::Uuid;

/// Owns one live session plus its two cooperative timers: the 1 Hz
/// countdown tick and the autosave debouncer. Both timers act only
/// through the shared lock, so a session keeps a single logical thread of
/// control; answer changes feed the debouncer through a channel.
pub struct SessionRuntime {
    session: Arc<Mutex<ExamSession>>,
    changes: mpsc::UnboundedSender<()>,
    clock_task: JoinHandle<()>,
    autosave_task: JoinHandle<()>,
}

impl SessionRuntime {
    pub async fn start(ctx: EngineContext, exam_id: Uuid, student_id: Uuid) -> Result<Self> {
        let config = ctx.config.clone();
        let session = Arc::new(Mutex::new(
            ExamSession::open(ctx, exam_id, student_id).await?,
        ));
        let (changes, changes_rx) = mpsc::unbounded_channel();

        let clock_task = tokio::spawn(run_clock(session.clone(), config.clock_tick()));
        let autosave_task = tokio::spawn(run_autosave(
            session.clone(),
            changes_rx,
            config.autosave_debounce(),
        ));

        Ok(Self {
            session,
            changes,
            clock_task,
            autosave_task,
        })
    }

    pub async fn phase(&self) -> SessionPhase {
        self.session.lock().await.phase().clone()
    }

    pub async fn is_finished(&self) -> bool {
        self.session.lock().await.is_finished()
    }

    pub async fn acknowledge_prerequisites(&self) -> Result<SessionPhase> {
        let mut guard = self.session.lock().await;
        Ok(guard.acknowledge_prerequisites().await?.clone())
    }

    pub async fn submit_token(&self, candidate: &str) -> Result<SessionPhase> {
        let mut guard = self.session.lock().await;
        Ok(guard.submit_token(candidate).await?.clone())
    }

    pub async fn set_answer(&self, question_id: Uuid, value: impl Into<String>) -> Result<()> {
        self.session.lock().await.set_answer(question_id, value)?;
        // wake the debouncer; a closed channel just means the task is gone
        let _ = self.changes.send(());
        Ok(())
    }

    pub async fn request_submit(&self) -> Result<SubmitCheck> {
        self.session.lock().await.request_submit()
    }

    pub async fn confirm_submit(&self) -> Result<()> {
        self.session.lock().await.confirm_submit().await
    }

    pub async fn force_timeout(&self) -> Result<()> {
        self.session.lock().await.force_timeout().await
    }

    pub async fn report_hidden(&self) -> Option<&'static str> {
        self.session.lock().await.report_hidden().await
    }

    pub async fn acknowledge_warning(&self) {
        self.session.lock().await.acknowledge_warning();
    }

    pub async fn remaining_seconds(&self) -> i64 {
        self.session.lock().await.remaining_seconds(wall::now())
    }

    /// Direct access for reads the delegating methods do not cover
    /// (navigation, built questions, the sealed submission).
    pub async fn session(&self) -> MutexGuard<'_, ExamSession> {
        self.session.lock().await
    }
}

impl Drop for SessionRuntime {
    fn drop(&mut self) {
        self.clock_task.abort();
        self.autosave_task.abort();
    }
}

async fn run_clock(session: Arc<Mutex<ExamSession>>, tick: Duration) {
    let mut ticker = tokio::time::interval(tick);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        ticker.tick().await;
        let mut guard = session.lock().await;
        if guard.is_finished() {
            break;
        }
        if guard.poll_auto_submit(wall::now()) {
            match guard.finalize(FinishReason::TimeExpired).await {
                Ok(()) => break,
                // the latch re-armed; the next tick retries the write
                Err(err) => {
                    tracing::error!(error = %err, "auto-submit failed; retrying on the next tick")
                }
            }
        }
    }
}

async fn run_autosave(
    session: Arc<Mutex<ExamSession>>,
    mut changes: mpsc::UnboundedReceiver<()>,
    debounce: Duration,
) {
    'idle: loop {
        // park until the first change after a clean flush
        if changes.recv().await.is_none() {
            break;
        }
        loop {
            tokio::select! {
                more = changes.recv() => {
                    if more.is_none() {
                        // runtime dropped mid-window: one last best effort
                        session.lock().await.flush_answers().await;
                        return;
                    }
                    // another change: the debounce window restarts
                }
                _ = tokio::time::sleep(debounce) => {
                    let mut guard = session.lock().await;
                    let clean = guard.flush_answers().await;
                    if guard.is_finished() {
                        return;
                    }
                    if clean {
                        continue 'idle;
                    }
                    // store failure: stay here and retry after another window
                }
            }
        }
    }
}
