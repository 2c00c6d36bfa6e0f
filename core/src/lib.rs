pub mod action;
pub mod action_parser;
pub mod activation;
pub mod applescript;
pub mod backend;
pub mod engine;
pub mod error;
pub mod executor;
pub mod keymap;
pub mod plan;
pub mod platform;
pub mod session;
pub mod settings;

#[cfg(target_os = "macos")]
pub mod macos;

#[cfg(test)]
mod test_support;

pub use action::{Action, ActionKind, ApplicationTarget, Modifier, ModifierSet};
pub use engine::ShortcutEngine;
pub use error::{ActivationError, EngineError, ParseError};
pub use executor::{ExecutionObserver, LoggingObserver, RunOutcome, RunStatus, SequentialExecutor};
pub use plan::GeneratedStep;
pub use session::{ExecutionSession, SessionSnapshot};
pub use settings::{ActivationTiming, ExecutionSettings, SpeedPreset};
