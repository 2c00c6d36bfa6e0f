//! Seams between the engine and the operating system.
//!
//! The executor and activation controller only talk to these traits, so
//! tests swap in fakes and other platforms can plug in their own backends.

use crate::action::ModifierSet;
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyEventKind {
    Down,
    Up,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyStroke {
    pub key: char,
    pub modifiers: ModifierSet,
}

/// Posts low-level keyboard events.
pub trait InputSink: Send + Sync {
    fn post(&self, stroke: KeyStroke, kind: KeyEventKind) -> Result<()>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunningApplication {
    pub pid: i32,
    pub name: String,
    pub bundle_id: Option<String>,
    pub hidden: bool,
}

/// Running applications and the focus operations on them.
#[async_trait]
pub trait ProcessDirectory: Send + Sync {
    /// Regular (non-background) applications currently running.
    async fn running_applications(&self) -> Result<Vec<RunningApplication>>;

    async fn unhide(&self, app: &RunningApplication) -> Result<()>;

    async fn has_minimized_windows(&self, app: &RunningApplication) -> Result<bool>;

    /// Restores every minimized window and returns how many were restored.
    async fn restore_minimized_windows(&self, app: &RunningApplication) -> Result<usize>;

    /// Asks the OS to bring `app` frontmost, ignoring other active apps.
    async fn activate(&self, app: &RunningApplication) -> Result<()>;

    async fn frontmost_pid(&self) -> Result<Option<i32>>;
}

/// Answers whether this process may inject input.
pub trait PermissionProbe: Send + Sync {
    fn input_permission_granted(&self) -> bool;

    /// Asks the user for the permission where the platform supports prompting.
    fn request_input_permission(&self) -> bool {
        self.input_permission_granted()
    }
}

#[derive(Clone)]
pub struct Backends {
    pub input: Arc<dyn InputSink>,
    pub processes: Arc<dyn ProcessDirectory>,
    pub permissions: Arc<dyn PermissionProbe>,
}
