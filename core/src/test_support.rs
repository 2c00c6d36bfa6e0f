//! Fake backends for unit tests.

use crate::action::Action;
use crate::backend::{InputSink, KeyEventKind, KeyStroke, PermissionProbe, ProcessDirectory, RunningApplication};
use crate::error::{EngineError, Result};
use crate::executor::ExecutionObserver;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;
use tokio::time::Instant;

pub fn app(pid: i32, name: &str, bundle_id: Option<&str>) -> RunningApplication {
    RunningApplication {
        pid,
        name: name.to_string(),
        bundle_id: bundle_id.map(str::to_string),
        hidden: false,
    }
}

#[derive(Debug, Clone, Copy)]
pub enum FocusBehavior {
    /// Activated app is frontmost on the next query.
    Immediate,
    /// Frontmost only after this many unsuccessful queries.
    AfterPolls(usize),
    Never,
    Refuse,
}

#[derive(Default)]
struct ProcessState {
    frontmost: Option<i32>,
    pending: Option<(i32, usize)>,
    activated: Vec<i32>,
    unhidden: Vec<i32>,
    restored: Vec<i32>,
    frontmost_queries: usize,
}

pub struct FakeProcesses {
    apps: Vec<RunningApplication>,
    focus: FocusBehavior,
    minimized: HashMap<i32, usize>,
    window_query_fails: bool,
    query_latency: Duration,
    state: Mutex<ProcessState>,
}

impl FakeProcesses {
    pub fn new(apps: Vec<RunningApplication>) -> Self {
        Self {
            apps,
            focus: FocusBehavior::Immediate,
            minimized: HashMap::new(),
            window_query_fails: false,
            query_latency: Duration::ZERO,
            state: Mutex::new(ProcessState::default()),
        }
    }

    pub fn with_focus(mut self, focus: FocusBehavior) -> Self {
        self.focus = focus;
        self
    }

    pub fn with_minimized(mut self, pid: i32, windows: usize) -> Self {
        self.minimized.insert(pid, windows);
        self
    }

    pub fn with_window_query_failure(mut self) -> Self {
        self.window_query_fails = true;
        self
    }

    /// Each frontmost query takes this long to answer.
    pub fn with_query_latency(mut self, latency: Duration) -> Self {
        self.query_latency = latency;
        self
    }

    pub fn activated(&self) -> Vec<i32> {
        self.state.lock().unwrap().activated.clone()
    }

    pub fn unhidden(&self) -> Vec<i32> {
        self.state.lock().unwrap().unhidden.clone()
    }

    pub fn restored(&self) -> Vec<i32> {
        self.state.lock().unwrap().restored.clone()
    }

    pub fn frontmost_queries(&self) -> usize {
        self.state.lock().unwrap().frontmost_queries
    }
}

#[async_trait]
impl ProcessDirectory for FakeProcesses {
    async fn running_applications(&self) -> Result<Vec<RunningApplication>> {
        Ok(self.apps.clone())
    }

    async fn unhide(&self, app: &RunningApplication) -> Result<()> {
        self.state.lock().unwrap().unhidden.push(app.pid);
        Ok(())
    }

    async fn has_minimized_windows(&self, app: &RunningApplication) -> Result<bool> {
        if self.window_query_fails {
            return Err(EngineError::Scripting("window list not available".to_string()));
        }
        Ok(self.minimized.get(&app.pid).copied().unwrap_or(0) > 0)
    }

    async fn restore_minimized_windows(&self, app: &RunningApplication) -> Result<usize> {
        self.state.lock().unwrap().restored.push(app.pid);
        Ok(self.minimized.get(&app.pid).copied().unwrap_or(0))
    }

    async fn activate(&self, app: &RunningApplication) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.activated.push(app.pid);
        match self.focus {
            FocusBehavior::Immediate => state.frontmost = Some(app.pid),
            FocusBehavior::AfterPolls(n) => state.pending = Some((app.pid, n)),
            FocusBehavior::Never => {}
            FocusBehavior::Refuse => {
                return Err(EngineError::Scripting("activation refused".to_string()));
            }
        }
        Ok(())
    }

    async fn frontmost_pid(&self) -> Result<Option<i32>> {
        if !self.query_latency.is_zero() {
            tokio::time::sleep(self.query_latency).await;
        }
        let mut state = self.state.lock().unwrap();
        state.frontmost_queries += 1;
        if let Some((pid, remaining)) = state.pending {
            if remaining == 0 {
                state.frontmost = Some(pid);
                state.pending = None;
            } else {
                state.pending = Some((pid, remaining - 1));
            }
        }
        Ok(state.frontmost)
    }
}

#[derive(Default)]
pub struct RecordingSink {
    events: Mutex<Vec<(KeyStroke, KeyEventKind, Instant)>>,
}

impl RecordingSink {
    pub fn events(&self) -> Vec<(KeyStroke, KeyEventKind)> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .map(|(stroke, kind, _)| (*stroke, *kind))
            .collect()
    }

    pub fn timestamps(&self) -> Vec<Instant> {
        self.events.lock().unwrap().iter().map(|(_, _, at)| *at).collect()
    }
}

impl InputSink for RecordingSink {
    fn post(&self, stroke: KeyStroke, kind: KeyEventKind) -> Result<()> {
        self.events.lock().unwrap().push((stroke, kind, Instant::now()));
        Ok(())
    }
}

pub struct FixedPermission(pub bool);

impl PermissionProbe for FixedPermission {
    fn input_permission_granted(&self) -> bool {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Start,
    StepStart(usize, String),
    StepComplete(usize),
    Cancelled(usize),
    Complete(bool, String),
}

#[derive(Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<(Event, Instant)>>,
}

impl RecordingObserver {
    fn push(&self, event: Event) {
        self.events.lock().unwrap().push((event, Instant::now()));
    }

    pub fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().iter().map(|(e, _)| e.clone()).collect()
    }

    pub fn timed_events(&self) -> Vec<(Event, Instant)> {
        self.events.lock().unwrap().clone()
    }

    pub fn step_starts(&self) -> Vec<usize> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Event::StepStart(i, _) => Some(i),
                _ => None,
            })
            .collect()
    }
}

impl ExecutionObserver for RecordingObserver {
    fn on_start(&self) {
        self.push(Event::Start);
    }

    fn on_step_start(&self, index: usize, action: &Action) {
        self.push(Event::StepStart(index, action.description.clone()));
    }

    fn on_step_complete(&self, index: usize) {
        self.push(Event::StepComplete(index));
    }

    fn on_cancelled(&self, index: usize) {
        self.push(Event::Cancelled(index));
    }

    fn on_complete(&self, success: bool, message: &str) {
        self.push(Event::Complete(success, message.to_string()));
    }
}
