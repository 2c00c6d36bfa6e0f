use crate::action::{Action, ActionKind, ModifierSet};
use crate::activation::WindowController;
use crate::backend::{InputSink, KeyEventKind, KeyStroke, PermissionProbe};
use crate::error::{EngineError, PERMISSION_DENIED_MESSAGE};
use crate::keymap;
use crate::session::ExecutionSession;
use crate::settings::ExecutionSettings;
use chrono::Utc;
use log::{error, info, warn};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;

pub const CANCELLED_MESSAGE: &str = "Execution cancelled";

/// Lifecycle callbacks, invoked synchronously from inside a run. Observers
/// only watch; they cannot steer the run.
pub trait ExecutionObserver: Send + Sync {
    fn on_start(&self) {}
    fn on_step_start(&self, _index: usize, _action: &Action) {}
    fn on_step_complete(&self, _index: usize) {}
    fn on_cancelled(&self, _index: usize) {}
    fn on_complete(&self, _success: bool, _message: &str) {}
}

impl ExecutionObserver for () {}

/// Writes every lifecycle event to the log.
pub struct LoggingObserver;

impl ExecutionObserver for LoggingObserver {
    fn on_start(&self) {
        info!("▶️ [Run] Started");
    }

    fn on_step_start(&self, index: usize, action: &Action) {
        info!("   Step {}: {}", index + 1, action.description);
    }

    fn on_step_complete(&self, index: usize) {
        info!("✅ Step {} done", index + 1);
    }

    fn on_cancelled(&self, index: usize) {
        warn!("🛑 [Run] Cancelled before step {}", index + 1);
    }

    fn on_complete(&self, success: bool, message: &str) {
        if success {
            info!("🏁 [Run] {}", message);
        } else {
            error!("❌ [Run] {}", message);
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Completed,
    Failed,
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunOutcome {
    pub status: RunStatus,
    pub message: String,
    /// Actions that finished before the run ended.
    pub executed: usize,
}

impl RunOutcome {
    pub fn success(&self) -> bool {
        self.status == RunStatus::Completed
    }

    pub fn is_cancelled(&self) -> bool {
        self.status == RunStatus::Cancelled
    }
}

enum StepError {
    Failed(String),
    Cancelled,
}

impl From<EngineError> for StepError {
    fn from(err: EngineError) -> Self {
        StepError::Failed(err.to_string())
    }
}

/// Runs actions one at a time, in order, against the injected backends.
pub struct SequentialExecutor {
    input: Arc<dyn InputSink>,
    permissions: Arc<dyn PermissionProbe>,
    windows: Arc<WindowController>,
}

impl SequentialExecutor {
    pub fn new(
        input: Arc<dyn InputSink>,
        permissions: Arc<dyn PermissionProbe>,
        windows: Arc<WindowController>,
    ) -> Self {
        Self {
            input,
            permissions,
            windows,
        }
    }

    pub fn windows(&self) -> &Arc<WindowController> {
        &self.windows
    }

    /// Executes `actions` and reports the outcome. Never returns an error:
    /// permission problems, step failures and cancellation all resolve to a
    /// [`RunOutcome`], and `observer.on_complete` is called exactly once.
    pub async fn run(
        &self,
        actions: &[Action],
        session: &ExecutionSession,
        settings: &ExecutionSettings,
        observer: &dyn ExecutionObserver,
    ) -> RunOutcome {
        if !self.permissions.input_permission_granted() {
            error!("⛔️ [Executor] Input permission not granted");
            session.mark_failed(PERMISSION_DENIED_MESSAGE);
            observer.on_complete(false, PERMISSION_DENIED_MESSAGE);
            return RunOutcome {
                status: RunStatus::Failed,
                message: PERMISSION_DENIED_MESSAGE.to_string(),
                executed: 0,
            };
        }

        info!(
            "[Executor] Session {} (started {}) running {} action(s)",
            session.id(),
            session.started_at().to_rfc3339(),
            actions.len()
        );
        observer.on_start();
        let token = session.cancellation_token();

        for (index, action) in actions.iter().enumerate() {
            if token.is_cancelled() {
                return Self::cancelled(index, observer);
            }

            session.set_current_step(index);
            observer.on_step_start(index, action);

            match self.execute(action, settings, &token).await {
                Ok(()) => {}
                Err(StepError::Cancelled) => return Self::cancelled(index, observer),
                Err(StepError::Failed(message)) => {
                    error!("❌ [Executor] Step {} failed: {}", index + 1, message);
                    session.mark_failed(message.clone());
                    observer.on_complete(false, &message);
                    return RunOutcome {
                        status: RunStatus::Failed,
                        message,
                        executed: index,
                    };
                }
            }

            observer.on_step_complete(index);

            if index + 1 < actions.len() {
                let pause = if action.is_app_switch() {
                    settings.app_switch_delay()
                } else {
                    settings.action_delay()
                };
                if !pause_unless_cancelled(&token, pause).await {
                    return Self::cancelled(index + 1, observer);
                }
            }
        }

        session.mark_complete();
        info!(
            "[Executor] Session {} finished in {}ms",
            session.id(),
            (Utc::now() - session.started_at()).num_milliseconds()
        );
        let message = format!("Successfully executed {} actions", actions.len());
        observer.on_complete(true, &message);
        RunOutcome {
            status: RunStatus::Completed,
            message,
            executed: actions.len(),
        }
    }

    fn cancelled(index: usize, observer: &dyn ExecutionObserver) -> RunOutcome {
        observer.on_cancelled(index);
        observer.on_complete(false, CANCELLED_MESSAGE);
        RunOutcome {
            status: RunStatus::Cancelled,
            message: CANCELLED_MESSAGE.to_string(),
            executed: index,
        }
    }

    async fn execute(
        &self,
        action: &Action,
        settings: &ExecutionSettings,
        token: &CancellationToken,
    ) -> Result<(), StepError> {
        match &action.kind {
            ActionKind::KeyPress { key, modifiers } => {
                let stroke = KeyStroke {
                    key: *key,
                    modifiers: *modifiers,
                };
                self.press(stroke, settings.key_event_delay()).await?;
            }
            ActionKind::TypeText { text } => {
                for (i, c) in text.chars().enumerate() {
                    if i > 0 {
                        pause(settings.character_delay()).await;
                    }
                    let modifiers = keymap::modifiers_for(c, ModifierSet::empty());
                    self.press(KeyStroke { key: c, modifiers }, settings.key_event_delay())
                        .await?;
                }
            }
            ActionKind::Delay { duration_ms } => {
                if !pause_unless_cancelled(token, Duration::from_millis(*duration_ms)).await {
                    return Err(StepError::Cancelled);
                }
            }
            ActionKind::SwitchApplication { target } => {
                let timeout = self.windows.timing().default_timeout;
                self.windows
                    .activate(target, timeout)
                    .await
                    .map_err(|e| StepError::Failed(e.to_string()))?;
            }
        }
        Ok(())
    }

    /// Key-down, gap, key-up. Once started the pair always completes.
    async fn press(&self, stroke: KeyStroke, gap: Duration) -> crate::error::Result<()> {
        self.input.post(stroke, KeyEventKind::Down)?;
        pause(gap).await;
        self.input.post(stroke, KeyEventKind::Up)
    }
}

async fn pause(duration: Duration) {
    if !duration.is_zero() {
        sleep(duration).await;
    }
}

/// Sleeps for `duration`; returns false if cancellation arrived first.
pub(crate) async fn pause_unless_cancelled(token: &CancellationToken, duration: Duration) -> bool {
    if token.is_cancelled() {
        return false;
    }
    tokio::select! {
        biased;
        _ = token.cancelled() => false,
        _ = sleep(duration) => true,
    }
}
