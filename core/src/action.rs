use serde::{Deserialize, Serialize};
use std::fmt;

pub const KEY_RETURN: char = '\r';
pub const KEY_TAB: char = '\t';
pub const KEY_SPACE: char = ' ';
pub const KEY_ESCAPE: char = '\u{1b}';
pub const KEY_DELETE: char = '\u{8}';
pub const KEY_FORWARD_DELETE: char = '\u{7f}';
pub const KEY_LEFT: char = '←';
pub const KEY_RIGHT: char = '→';
pub const KEY_UP: char = '↑';
pub const KEY_DOWN: char = '↓';

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Modifier {
    Command,
    Shift,
    Option,
    Control,
}

impl Modifier {
    pub const ALL: [Modifier; 4] = [
        Modifier::Control,
        Modifier::Option,
        Modifier::Shift,
        Modifier::Command,
    ];

    pub fn glyph(self) -> char {
        match self {
            Modifier::Command => '⌘',
            Modifier::Shift => '⇧',
            Modifier::Option => '⌥',
            Modifier::Control => '⌃',
        }
    }

    pub fn from_glyph(c: char) -> Option<Self> {
        match c {
            '⌘' => Some(Modifier::Command),
            '⇧' => Some(Modifier::Shift),
            '⌥' => Some(Modifier::Option),
            '⌃' => Some(Modifier::Control),
            _ => None,
        }
    }

    /// Word spellings accepted next to the glyphs ("cmd", "alt", ...).
    pub fn from_word(word: &str) -> Option<Self> {
        match word.to_lowercase().as_str() {
            "cmd" | "command" => Some(Modifier::Command),
            "shift" => Some(Modifier::Shift),
            "opt" | "option" | "alt" => Some(Modifier::Option),
            "ctrl" | "control" => Some(Modifier::Control),
            _ => None,
        }
    }

    fn bit(self) -> u8 {
        match self {
            Modifier::Command => 1,
            Modifier::Shift => 1 << 1,
            Modifier::Option => 1 << 2,
            Modifier::Control => 1 << 3,
        }
    }
}

/// Unordered set of modifier keys held during a key press.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "Vec<Modifier>", into = "Vec<Modifier>")]
pub struct ModifierSet(u8);

impl ModifierSet {
    pub fn empty() -> Self {
        Self(0)
    }

    pub fn insert(&mut self, modifier: Modifier) {
        self.0 |= modifier.bit();
    }

    pub fn with(mut self, modifier: Modifier) -> Self {
        self.insert(modifier);
        self
    }

    pub fn contains(&self, modifier: Modifier) -> bool {
        self.0 & modifier.bit() != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    /// Iterates in the conventional macOS display order (⌃⌥⇧⌘).
    pub fn iter(&self) -> impl Iterator<Item = Modifier> + '_ {
        Modifier::ALL.into_iter().filter(move |m| self.contains(*m))
    }
}

impl FromIterator<Modifier> for ModifierSet {
    fn from_iter<I: IntoIterator<Item = Modifier>>(iter: I) -> Self {
        let mut set = ModifierSet::empty();
        for modifier in iter {
            set.insert(modifier);
        }
        set
    }
}

impl From<Vec<Modifier>> for ModifierSet {
    fn from(modifiers: Vec<Modifier>) -> Self {
        modifiers.into_iter().collect()
    }
}

impl From<ModifierSet> for Vec<Modifier> {
    fn from(set: ModifierSet) -> Self {
        set.iter().collect()
    }
}

/// A running application to bring frontmost. The bundle identifier is
/// optional; name-only targets are resolved by the activation controller.
#[derive(Debug, Clone, Eq, Serialize, Deserialize)]
pub struct ApplicationTarget {
    bundle_id: Option<String>,
    name: String,
}

impl ApplicationTarget {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            bundle_id: None,
            name: name.into(),
        }
    }

    pub fn with_bundle_id(bundle_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            bundle_id: Some(bundle_id.into()),
            name: name.into(),
        }
    }

    pub fn bundle_id(&self) -> Option<&str> {
        self.bundle_id.as_deref()
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl PartialEq for ApplicationTarget {
    fn eq(&self, other: &Self) -> bool {
        match (&self.bundle_id, &other.bundle_id) {
            (Some(a), Some(b)) => a == b,
            _ => self.name == other.name,
        }
    }
}

impl fmt::Display for ApplicationTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.bundle_id {
            Some(id) => write!(f, "{} ({})", self.name, id),
            None => write!(f, "{}", self.name),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ActionKind {
    KeyPress { key: char, modifiers: ModifierSet },
    TypeText { text: String },
    Delay { duration_ms: u64 },
    SwitchApplication { target: ApplicationTarget },
}

/// One executable step with the label shown to the user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    pub kind: ActionKind,
    pub description: String,
}

impl Action {
    /// Builds an action; an empty description falls back to the action's label.
    pub fn new(kind: ActionKind, description: impl Into<String>) -> Self {
        let description = description.into().trim().to_string();
        let description = if description.is_empty() {
            kind.to_string()
        } else {
            description
        };
        Self { kind, description }
    }

    pub fn key_press(key: char, modifiers: ModifierSet) -> Self {
        Self::new(ActionKind::KeyPress { key, modifiers }, "")
    }

    pub fn type_text(text: impl Into<String>) -> Self {
        Self::new(ActionKind::TypeText { text: text.into() }, "")
    }

    pub fn delay(duration_ms: u64) -> Self {
        Self::new(ActionKind::Delay { duration_ms }, "")
    }

    pub fn switch_application(target: ApplicationTarget) -> Self {
        Self::new(ActionKind::SwitchApplication { target }, "")
    }

    pub fn is_app_switch(&self) -> bool {
        matches!(self.kind, ActionKind::SwitchApplication { .. })
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.description)
    }
}

pub fn key_label(key: char) -> String {
    match key {
        KEY_RETURN => "↵".to_string(),
        KEY_TAB => "⇥".to_string(),
        KEY_SPACE => "Space".to_string(),
        KEY_ESCAPE => "⎋".to_string(),
        KEY_DELETE => "⌫".to_string(),
        KEY_FORWARD_DELETE => "⌦".to_string(),
        c => c.to_uppercase().collect(),
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionKind::KeyPress { key, modifiers } => {
                let glyphs: String = modifiers.iter().map(Modifier::glyph).collect();
                write!(f, "{}{}", glyphs, key_label(*key))
            }
            ActionKind::TypeText { text } => write!(f, "Type {:?}", text),
            ActionKind::Delay { duration_ms } => write!(f, "Wait {}ms", duration_ms),
            ActionKind::SwitchApplication { target } => write!(f, "Switch to {}", target.name()),
        }
    }
}
