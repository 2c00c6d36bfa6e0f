use crate::backend::{Backends, InputSink, KeyEventKind, KeyStroke, PermissionProbe, ProcessDirectory, RunningApplication};
use crate::error::{EngineError, Result};
use async_trait::async_trait;
use std::sync::Arc;

/// Backends for the platform this binary was built for.
#[cfg(target_os = "macos")]
pub fn default_backends() -> Backends {
    use crate::macos::{AccessibilityPermission, CgEventSink, SystemEventsDirectory};
    Backends {
        input: Arc::new(CgEventSink),
        processes: Arc::new(SystemEventsDirectory),
        permissions: Arc::new(AccessibilityPermission),
    }
}

#[cfg(not(target_os = "macos"))]
pub fn default_backends() -> Backends {
    unsupported_backends()
}

/// Backends that refuse everything; runs fail at the permission check.
pub fn unsupported_backends() -> Backends {
    Backends {
        input: Arc::new(Unsupported),
        processes: Arc::new(Unsupported),
        permissions: Arc::new(Unsupported),
    }
}

const REASON: &str = "keyboard automation needs macOS";

pub struct Unsupported;

impl InputSink for Unsupported {
    fn post(&self, _stroke: KeyStroke, _kind: KeyEventKind) -> Result<()> {
        Err(EngineError::Unsupported(REASON))
    }
}

impl PermissionProbe for Unsupported {
    fn input_permission_granted(&self) -> bool {
        false
    }
}

#[async_trait]
impl ProcessDirectory for Unsupported {
    async fn running_applications(&self) -> Result<Vec<RunningApplication>> {
        Err(EngineError::Unsupported(REASON))
    }

    async fn unhide(&self, _app: &RunningApplication) -> Result<()> {
        Err(EngineError::Unsupported(REASON))
    }

    async fn has_minimized_windows(&self, _app: &RunningApplication) -> Result<bool> {
        Err(EngineError::Unsupported(REASON))
    }

    async fn restore_minimized_windows(&self, _app: &RunningApplication) -> Result<usize> {
        Err(EngineError::Unsupported(REASON))
    }

    async fn activate(&self, _app: &RunningApplication) -> Result<()> {
        Err(EngineError::Unsupported(REASON))
    }

    async fn frontmost_pid(&self) -> Result<Option<i32>> {
        Err(EngineError::Unsupported(REASON))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::ModifierSet;

    #[tokio::test]
    async fn unsupported_backend_refuses() {
        let backends = unsupported_backends();
        assert!(!backends.permissions.input_permission_granted());
        assert!(!backends.permissions.request_input_permission());
        assert!(backends.processes.running_applications().await.is_err());
        let stroke = KeyStroke {
            key: 'a',
            modifiers: ModifierSet::empty(),
        };
        assert!(backends.input.post(stroke, KeyEventKind::Down).is_err());
    }
}
