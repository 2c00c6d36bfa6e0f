// Accessibility trust is what CGEventPost needs to reach other applications.

use crate::backend::PermissionProbe;
use core_foundation::base::TCFType;
use core_foundation::boolean::CFBoolean;
use core_foundation::dictionary::CFDictionary;
use core_foundation::string::CFString;
use log::warn;

const ACCESSIBILITY_PANE: &str = "x-apple.systempreferences:com.apple.preference.security?Privacy_Accessibility";

pub struct AccessibilityPermission;

impl AccessibilityPermission {
    /// Check if Accessibility permission is granted
    pub fn check() -> bool {
        #[link(name = "ApplicationServices", kind = "framework")]
        extern "C" {
            fn AXIsProcessTrusted() -> bool;
        }
        unsafe { AXIsProcessTrusted() }
    }

    /// Request Accessibility permission with system prompt
    pub fn request() -> bool {
        #[link(name = "ApplicationServices", kind = "framework")]
        extern "C" {
            fn AXIsProcessTrustedWithOptions(options: *const std::ffi::c_void) -> bool;
        }

        let key = CFString::new("AXTrustedCheckOptionPrompt");
        let value = CFBoolean::true_value();
        let dict = CFDictionary::from_CFType_pairs(&[(key.as_CFType(), value.as_CFType())]);

        unsafe { AXIsProcessTrustedWithOptions(dict.as_concrete_TypeRef() as *const std::ffi::c_void) }
    }

    /// Open System Settings at the Accessibility privacy pane
    pub fn open_settings() {
        if let Err(e) = std::process::Command::new("open").arg(ACCESSIBILITY_PANE).spawn() {
            warn!("⚠️ Could not open System Settings: {}", e);
        }
    }
}

impl PermissionProbe for AccessibilityPermission {
    fn input_permission_granted(&self) -> bool {
        Self::check()
    }

    fn request_input_permission(&self) -> bool {
        if Self::check() {
            return true;
        }
        let granted = Self::request();
        if !granted {
            Self::open_settings();
        }
        granted
    }
}
