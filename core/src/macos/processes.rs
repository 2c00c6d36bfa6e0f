use super::accessibility;
use crate::applescript::{self, ACTIVATE_LINES, FRONTMOST_PID_SCRIPT, LIST_PROCESSES_SCRIPT, UNHIDE_LINES};
use crate::backend::{ProcessDirectory, RunningApplication};
use crate::error::{EngineError, Result};
use async_trait::async_trait;
use std::time::Duration;

const SCRIPT_TIMEOUT: Duration = Duration::from_secs(5);

fn scripting(err: anyhow::Error) -> EngineError {
    EngineError::Scripting(err.to_string())
}

/// Process directory backed by System Events scripting and the
/// Accessibility API.
pub struct SystemEventsDirectory;

#[async_trait]
impl ProcessDirectory for SystemEventsDirectory {
    async fn running_applications(&self) -> Result<Vec<RunningApplication>> {
        let output = applescript::run_blocking(SCRIPT_TIMEOUT, || applescript::run(LIST_PROCESSES_SCRIPT))
            .await
            .map_err(scripting)?;
        Ok(applescript::parse_process_listing(&output))
    }

    async fn unhide(&self, app: &RunningApplication) -> Result<()> {
        let args = vec![app.pid.to_string()];
        applescript::run_blocking(SCRIPT_TIMEOUT, move || applescript::run_lines_with_args(&UNHIDE_LINES, &args))
            .await
            .map(|_| ())
            .map_err(scripting)
    }

    async fn has_minimized_windows(&self, app: &RunningApplication) -> Result<bool> {
        let pid = app.pid;
        let count = tokio::task::spawn_blocking(move || accessibility::minimized_window_count(pid))
            .await
            .map_err(|e| EngineError::Scripting(e.to_string()))??;
        Ok(count > 0)
    }

    async fn restore_minimized_windows(&self, app: &RunningApplication) -> Result<usize> {
        let pid = app.pid;
        tokio::task::spawn_blocking(move || accessibility::restore_minimized_windows(pid))
            .await
            .map_err(|e| EngineError::Scripting(e.to_string()))?
    }

    async fn activate(&self, app: &RunningApplication) -> Result<()> {
        let args = vec![app.pid.to_string()];
        applescript::run_blocking(SCRIPT_TIMEOUT, move || applescript::run_lines_with_args(&ACTIVATE_LINES, &args))
            .await
            .map(|_| ())
            .map_err(scripting)
    }

    async fn frontmost_pid(&self) -> Result<Option<i32>> {
        let output = applescript::run_blocking(SCRIPT_TIMEOUT, || applescript::run(FRONTMOST_PID_SCRIPT))
            .await
            .map_err(scripting)?;
        Ok(output.trim().parse::<i32>().ok())
    }
}
