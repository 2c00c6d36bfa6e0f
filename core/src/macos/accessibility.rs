use crate::error::{EngineError, Result};
use accessibility_sys::{
    AXUIElementCopyAttributeValue, AXUIElementCreateApplication, AXUIElementRef,
    AXUIElementSetAttributeValue,
};
use core_foundation::array::{CFArray, CFArrayRef};
use core_foundation::base::{CFTypeRef, TCFType};
use core_foundation::boolean::{CFBoolean, CFBooleanRef};
use core_foundation::string::CFString;
use std::ptr;

// Helper to get attribute (+1 retain count on success)
fn get_attribute(element: AXUIElementRef, attribute: &str) -> Option<CFTypeRef> {
    unsafe {
        let attr_name = CFString::new(attribute);
        let mut value_ref: CFTypeRef = ptr::null_mut();
        let err = AXUIElementCopyAttributeValue(element, attr_name.as_concrete_TypeRef(), &mut value_ref);
        if err == 0 && !value_ref.is_null() {
            Some(value_ref)
        } else {
            None
        }
    }
}

// Minimal wrapper for memory safety
struct AxElement(AXUIElementRef);
impl Drop for AxElement {
    fn drop(&mut self) {
        unsafe { core_foundation::base::CFRelease(self.0 as CFTypeRef); }
    }
}

fn for_each_window<F: FnMut(AXUIElementRef)>(pid: i32, mut f: F) -> Result<()> {
    unsafe {
        let app = AxElement(AXUIElementCreateApplication(pid));
        let windows_ref = get_attribute(app.0, "AXWindows")
            .ok_or_else(|| EngineError::Scripting(format!("No window list for pid {}", pid)))?;
        let windows = CFArray::<CFTypeRef>::wrap_under_create_rule(windows_ref as CFArrayRef);
        for i in 0..windows.len() {
            let Some(window) = windows.get(i) else { continue; };
            f(*window as AXUIElementRef);
        }
    }
    Ok(())
}

fn is_minimized(window: AXUIElementRef) -> bool {
    match get_attribute(window, "AXMinimized") {
        Some(value) => unsafe { bool::from(CFBoolean::wrap_under_create_rule(value as CFBooleanRef)) },
        None => false,
    }
}

pub fn minimized_window_count(pid: i32) -> Result<usize> {
    let mut count = 0;
    for_each_window(pid, |window| {
        if is_minimized(window) {
            count += 1;
        }
    })?;
    Ok(count)
}

/// Un-minimizes every minimized window of `pid`. Windows that refuse the
/// change are skipped; the return value counts the ones restored.
pub fn restore_minimized_windows(pid: i32) -> Result<usize> {
    let mut restored = 0;
    for_each_window(pid, |window| {
        if !is_minimized(window) {
            return;
        }
        let attr = CFString::new("AXMinimized");
        let err = unsafe {
            AXUIElementSetAttributeValue(
                window,
                attr.as_concrete_TypeRef(),
                CFBoolean::false_value().as_CFTypeRef(),
            )
        };
        if err == 0 {
            restored += 1;
        }
    })?;
    Ok(restored)
}
