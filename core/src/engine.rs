use crate::action::{Action, ApplicationTarget};
use crate::activation::WindowController;
use crate::backend::{Backends, PermissionProbe, RunningApplication};
use crate::error::Result;
use crate::executor::{pause_unless_cancelled, ExecutionObserver, RunOutcome, SequentialExecutor};
use crate::plan::{self, GeneratedStep};
use crate::session::ExecutionSession;
use crate::settings::{ActivationTiming, ExecutionSettings};
use log::{info, warn};
use std::sync::Arc;

/// Entry point for callers: turns generated steps into actions and runs them.
pub struct ShortcutEngine {
    executor: SequentialExecutor,
    windows: Arc<WindowController>,
    permissions: Arc<dyn PermissionProbe>,
    settings: ExecutionSettings,
}

impl ShortcutEngine {
    pub fn new(backends: Backends, settings: ExecutionSettings, timing: ActivationTiming) -> Self {
        let windows = Arc::new(WindowController::new(backends.processes, timing));
        let executor = SequentialExecutor::new(backends.input, backends.permissions.clone(), windows.clone());
        Self {
            executor,
            windows,
            permissions: backends.permissions,
            settings,
        }
    }

    pub fn settings(&self) -> &ExecutionSettings {
        &self.settings
    }

    pub fn set_settings(&mut self, settings: ExecutionSettings) {
        self.settings = settings;
    }

    /// Parses `steps`, brings `previous_app` back to the front when the plan
    /// does not open with its own switch, then runs the actions.
    pub async fn execute(
        &self,
        steps: &[GeneratedStep],
        previous_app: Option<&ApplicationTarget>,
        session: &ExecutionSession,
        observer: &dyn ExecutionObserver,
    ) -> RunOutcome {
        let actions = plan::build_actions(steps);
        info!(
            "📋 [Engine] {} of {} step(s) parsed into actions",
            actions.len(),
            steps.len()
        );

        if let Some(target) = previous_app {
            let opens_with_switch = actions.first().map(Action::is_app_switch).unwrap_or(true);
            if !opens_with_switch && !session.is_cancelled() && self.has_input_permission() {
                self.restore_previous(target, session).await;
            }
        }

        self.run_actions(&actions, session, observer).await
    }

    /// Runs already-parsed actions with the current settings.
    pub async fn run_actions(
        &self,
        actions: &[Action],
        session: &ExecutionSession,
        observer: &dyn ExecutionObserver,
    ) -> RunOutcome {
        self.executor.run(actions, session, &self.settings, observer).await
    }

    pub async fn running_applications(&self) -> Result<Vec<RunningApplication>> {
        self.windows.running_applications().await
    }

    pub fn has_input_permission(&self) -> bool {
        self.permissions.input_permission_granted()
    }

    pub fn request_permission(&self) -> bool {
        self.permissions.request_input_permission()
    }

    async fn restore_previous(&self, target: &ApplicationTarget, session: &ExecutionSession) {
        info!("↩️ [Engine] Restoring previous app '{}'", target);
        match self.windows.activate(target, self.windows.timing().default_timeout).await {
            Ok(()) => {
                let token = session.cancellation_token();
                pause_unless_cancelled(&token, self.settings.app_switch_delay()).await;
            }
            Err(e) => warn!("⚠️ [Engine] Could not restore '{}': {}", target, e),
        }
    }
}
