use crate::action::ApplicationTarget;
use crate::backend::{ProcessDirectory, RunningApplication};
use crate::error::ActivationError;
use crate::settings::ActivationTiming;
use log::{debug, info, warn};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{sleep, timeout, Instant};

/// Brings applications frontmost and confirms that they got there.
pub struct WindowController {
    processes: Arc<dyn ProcessDirectory>,
    timing: ActivationTiming,
}

impl WindowController {
    pub fn new(processes: Arc<dyn ProcessDirectory>, timing: ActivationTiming) -> Self {
        Self { processes, timing }
    }

    pub fn timing(&self) -> ActivationTiming {
        self.timing
    }

    pub async fn running_applications(&self) -> crate::error::Result<Vec<RunningApplication>> {
        self.processes.running_applications().await
    }

    pub async fn resolve(&self, target: &ApplicationTarget) -> Result<RunningApplication, ActivationError> {
        let apps = self
            .processes
            .running_applications()
            .await
            .map_err(|e| ActivationError::ActivationFailed {
                name: target.name().to_string(),
                reason: e.to_string(),
            })?;
        resolve_target(&apps, target)
            .cloned()
            .ok_or_else(|| ActivationError::ApplicationNotFound(target.name().to_string()))
    }

    /// Unhides, unminimizes and activates `target`, then polls until it is
    /// frontmost or `timeout` elapses.
    pub async fn activate(&self, target: &ApplicationTarget, timeout: Duration) -> Result<(), ActivationError> {
        let app = self.resolve(target).await?;
        info!("🚀 [Activation] Activating '{}' (pid {})", app.name, app.pid);

        if app.hidden {
            match self.processes.unhide(&app).await {
                Ok(()) => debug!("[Activation] Unhid '{}'", app.name),
                Err(e) => warn!("⚠️ [Activation] Unhide failed for '{}': {}", app.name, e),
            }
            sleep(self.timing.unhide_settle).await;
        }

        let restored = match self.processes.has_minimized_windows(&app).await {
            Ok(true) => self.processes.restore_minimized_windows(&app).await,
            Ok(false) => Ok(0),
            Err(e) => Err(e),
        };
        match restored {
            Ok(0) => {}
            Ok(count) => {
                debug!("[Activation] Restored {} window(s) of '{}'", count, app.name);
                sleep(self.timing.restore_settle).await;
            }
            Err(e) => warn!("⚠️ [Activation] Could not restore windows of '{}': {}", app.name, e),
        }

        self.processes
            .activate(&app)
            .await
            .map_err(|e| ActivationError::ActivationFailed {
                name: app.name.clone(),
                reason: e.to_string(),
            })?;

        self.wait_until_frontmost(&app, timeout).await
    }

    async fn wait_until_frontmost(&self, app: &RunningApplication, limit: Duration) -> Result<(), ActivationError> {
        let deadline = Instant::now() + limit;
        loop {
            let left = deadline.saturating_duration_since(Instant::now());
            match timeout(left, self.processes.frontmost_pid()).await {
                Ok(Ok(Some(pid))) if pid == app.pid => {
                    info!("✅ [Activation] '{}' is frontmost", app.name);
                    return Ok(());
                }
                Ok(Ok(_)) => {}
                Ok(Err(e)) => debug!("[Activation] Frontmost query failed: {}", e),
                Err(_) => debug!("[Activation] Frontmost query outlived the deadline"),
            }

            let now = Instant::now();
            if now >= deadline {
                return Err(ActivationError::ActivationTimeout {
                    name: app.name.clone(),
                    timeout: limit,
                });
            }
            sleep(self.timing.poll_interval.min(deadline - now)).await;
        }
    }
}

/// Picks the running application `target` refers to.
///
/// A bundle identifier must match exactly. A bare name tries, in order: exact
/// name, name substring, bundle identifier substring (all case-insensitive).
pub fn resolve_target<'a>(apps: &'a [RunningApplication], target: &ApplicationTarget) -> Option<&'a RunningApplication> {
    if let Some(bundle_id) = target.bundle_id() {
        return apps.iter().find(|a| a.bundle_id.as_deref() == Some(bundle_id));
    }

    let needle = target.name().to_lowercase();
    apps.iter()
        .find(|a| a.name.to_lowercase() == needle)
        .or_else(|| apps.iter().find(|a| a.name.to_lowercase().contains(&needle)))
        .or_else(|| {
            apps.iter().find(|a| {
                a.bundle_id
                    .as_deref()
                    .map(|id| id.to_lowercase().contains(&needle))
                    .unwrap_or(false)
            })
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{app, FakeProcesses, FocusBehavior};

    fn apps() -> Vec<RunningApplication> {
        vec![
            app(10, "Microsoft Excel", Some("com.microsoft.Excel")),
            app(11, "Notes", Some("com.apple.Notes")),
            app(12, "Notes Helper", Some("com.example.helper")),
            app(13, "Code", Some("com.microsoft.VSCode")),
        ]
    }

    #[test]
    fn resolution_order() {
        let apps = apps();
        let pick = |t: ApplicationTarget| resolve_target(&apps, &t).map(|a| a.pid);

        assert_eq!(pick(ApplicationTarget::named("notes")), Some(11));
        assert_eq!(pick(ApplicationTarget::named("excel")), Some(10));
        assert_eq!(pick(ApplicationTarget::named("vscode")), Some(13));
        assert_eq!(pick(ApplicationTarget::named("Safari")), None);
        assert_eq!(pick(ApplicationTarget::with_bundle_id("com.example.helper", "Notes")), Some(12));
        assert_eq!(pick(ApplicationTarget::with_bundle_id("com.apple.notes", "Notes")), None);
    }

    #[tokio::test(start_paused = true)]
    async fn activates_and_confirms() {
        let fake = Arc::new(FakeProcesses::new(apps()));
        let controller = WindowController::new(fake.clone(), ActivationTiming::default());

        controller
            .activate(&ApplicationTarget::named("Notes"), Duration::from_secs(1))
            .await
            .unwrap();
        assert_eq!(fake.activated(), vec![11]);
        assert!(fake.unhidden().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn unknown_app_is_not_found() {
        let fake = Arc::new(FakeProcesses::new(apps()));
        let controller = WindowController::new(fake.clone(), ActivationTiming::default());
        let err = controller
            .activate(&ApplicationTarget::named("Safari"), Duration::from_secs(1))
            .await
            .unwrap_err();
        assert_eq!(err, ActivationError::ApplicationNotFound("Safari".to_string()));
        assert!(fake.activated().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn refused_activation_fails_immediately() {
        let fake = Arc::new(FakeProcesses::new(apps()).with_focus(FocusBehavior::Refuse));
        let controller = WindowController::new(fake, ActivationTiming::default());
        let started = Instant::now();
        let err = controller
            .activate(&ApplicationTarget::named("Notes"), Duration::from_secs(5))
            .await
            .unwrap_err();
        assert!(matches!(err, ActivationError::ActivationFailed { .. }));
        assert!(started.elapsed() < Duration::from_millis(10));
    }

    #[tokio::test(start_paused = true)]
    async fn timeout_is_bounded() {
        let timing = ActivationTiming::default();
        let fake = Arc::new(FakeProcesses::new(apps()).with_focus(FocusBehavior::Never));
        let controller = WindowController::new(fake, timing);
        let timeout = Duration::from_millis(730);

        let started = Instant::now();
        let err = controller
            .activate(&ApplicationTarget::named("Excel"), timeout)
            .await
            .unwrap_err();
        let elapsed = started.elapsed();

        assert!(matches!(err, ActivationError::ActivationTimeout { .. }));
        assert!(elapsed >= timeout, "{:?}", elapsed);
        assert!(elapsed <= timeout + timing.poll_interval, "{:?}", elapsed);
    }

    #[tokio::test(start_paused = true)]
    async fn slow_frontmost_queries_stay_within_the_timeout() {
        let timing = ActivationTiming::default();
        let fake = Arc::new(
            FakeProcesses::new(apps())
                .with_focus(FocusBehavior::Never)
                .with_query_latency(Duration::from_millis(400)),
        );
        let controller = WindowController::new(fake, timing);
        let limit = Duration::from_millis(1_000);

        let started = Instant::now();
        let err = controller
            .activate(&ApplicationTarget::named("Notes"), limit)
            .await
            .unwrap_err();
        let elapsed = started.elapsed();

        assert!(matches!(err, ActivationError::ActivationTimeout { .. }));
        assert!(elapsed >= limit, "{:?}", elapsed);
        assert!(elapsed <= limit + timing.poll_interval, "{:?}", elapsed);
    }

    #[tokio::test(start_paused = true)]
    async fn slow_apps_are_polled_until_frontmost() {
        let fake = Arc::new(FakeProcesses::new(apps()).with_focus(FocusBehavior::AfterPolls(3)));
        let controller = WindowController::new(fake.clone(), ActivationTiming::default());
        controller
            .activate(&ApplicationTarget::named("Notes"), Duration::from_secs(1))
            .await
            .unwrap();
        assert!(fake.frontmost_queries() >= 4);
    }

    #[tokio::test(start_paused = true)]
    async fn hidden_and_minimized_apps_are_restored() {
        let mut list = apps();
        list[1].hidden = true;
        let fake = Arc::new(FakeProcesses::new(list).with_minimized(11, 2));
        let controller = WindowController::new(fake.clone(), ActivationTiming::default());
        controller
            .activate(&ApplicationTarget::named("Notes"), Duration::from_secs(1))
            .await
            .unwrap();
        assert_eq!(fake.unhidden(), vec![11]);
        assert_eq!(fake.restored(), vec![11]);
        assert_eq!(fake.activated(), vec![11]);
    }

    #[tokio::test(start_paused = true)]
    async fn window_restore_failure_is_not_fatal() {
        let fake = Arc::new(FakeProcesses::new(apps()).with_window_query_failure());
        let controller = WindowController::new(fake.clone(), ActivationTiming::default());
        controller
            .activate(&ApplicationTarget::named("Code"), Duration::from_secs(1))
            .await
            .unwrap();
        assert_eq!(fake.activated(), vec![13]);
    }
}
