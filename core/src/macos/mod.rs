pub mod accessibility;
pub mod events;
pub mod permissions;
pub mod processes;

pub use events::CgEventSink;
pub use permissions::AccessibilityPermission;
pub use processes::SystemEventsDirectory;
