use crate::action::{Modifier, ModifierSet};
use crate::backend::{InputSink, KeyEventKind, KeyStroke};
use crate::error::{EngineError, Result};
use crate::keymap;
use core_graphics::event::{CGEvent, CGEventFlags, CGEventTapLocation, CGKeyCode};
use core_graphics::event_source::{CGEventSource, CGEventSourceStateID};

// Characters off the ANSI layout are sent on this key with a unicode payload
const UNICODE_CARRIER_KEY: CGKeyCode = 0;

/// Posts keyboard events into the HID stream through CoreGraphics.
pub struct CgEventSink;

impl InputSink for CgEventSink {
    fn post(&self, stroke: KeyStroke, kind: KeyEventKind) -> Result<()> {
        let source = CGEventSource::new(CGEventSourceStateID::HIDSystemState)
            .map_err(|_| EngineError::Input("Failed to create event source".to_string()))?;
        let keydown = kind == KeyEventKind::Down;

        let event = match keymap::key_code(stroke.key) {
            Some(code) => CGEvent::new_keyboard_event(source, code, keydown),
            None => CGEvent::new_keyboard_event(source, UNICODE_CARRIER_KEY, keydown).map(|event| {
                event.set_string(&stroke.key.to_string());
                event
            }),
        }
        .map_err(|_| EngineError::Input(format!("Failed to create key event for {:?}", stroke.key)))?;

        event.set_flags(flags_for(keymap::modifiers_for(stroke.key, stroke.modifiers)));
        event.post(CGEventTapLocation::HID);
        Ok(())
    }
}

fn flags_for(modifiers: ModifierSet) -> CGEventFlags {
    let mut flags = CGEventFlags::CGEventFlagNull;
    for modifier in modifiers.iter() {
        flags |= match modifier {
            Modifier::Command => CGEventFlags::CGEventFlagCommand,
            Modifier::Shift => CGEventFlags::CGEventFlagShift,
            Modifier::Option => CGEventFlags::CGEventFlagAlternate,
            Modifier::Control => CGEventFlags::CGEventFlagControl,
        };
    }
    flags
}
