use crate::action::{
    Action, ActionKind, ApplicationTarget, Modifier, ModifierSet, KEY_DELETE, KEY_DOWN,
    KEY_ESCAPE, KEY_FORWARD_DELETE, KEY_LEFT, KEY_RETURN, KEY_RIGHT, KEY_SPACE, KEY_TAB, KEY_UP,
};
use crate::error::ParseError;

const SWITCH_APP_PREFIX: &str = "SWITCH_APP:";
const DELAY_PREFIX: &str = "DELAY:";
const TEXT_PREFIX: &str = "TEXT:";
const LEGACY_TEXT_INPUT: &str = "text input";

/// Turns one generated instruction into an [`Action`].
///
/// Recognized forms, checked in order:
/// - `SWITCH_APP:<name>`
/// - `DELAY:<ms>`
/// - `TEXT:<literal>`
/// - `text input` (types `description`)
/// - a shortcut such as `⌘⇧ S`, `⌃ ⌥ ↵` or `cmd+shift+s`
///
/// `description` becomes the action's label; when empty the label is derived
/// from the action itself.
pub fn parse(raw: &str, description: &str) -> Result<Action, ParseError> {
    let instruction = raw.trim();

    if let Some(rest) = strip_prefix_ci(instruction, SWITCH_APP_PREFIX) {
        let name = rest.trim();
        if name.is_empty() {
            return Err(ParseError::EmptyApplicationName);
        }
        let target = ApplicationTarget::named(name);
        return Ok(Action::new(ActionKind::SwitchApplication { target }, description));
    }

    if let Some(rest) = strip_prefix_ci(instruction, DELAY_PREFIX) {
        let raw = rest.trim();
        let duration_ms = raw
            .parse::<u64>()
            .map_err(|_| ParseError::InvalidDelay(raw.to_string()))?;
        return Ok(Action::new(ActionKind::Delay { duration_ms }, description));
    }

    // typed text is literal, surrounding whitespace included
    if let Some(text) = strip_prefix_ci(raw.trim_start(), TEXT_PREFIX) {
        if text.is_empty() {
            return Err(ParseError::EmptyText);
        }
        let kind = ActionKind::TypeText {
            text: text.to_string(),
        };
        return Ok(Action::new(kind, description));
    }

    if instruction.eq_ignore_ascii_case(LEGACY_TEXT_INPUT) {
        let text = description.trim();
        if text.is_empty() {
            return Err(ParseError::EmptyDescription);
        }
        let kind = ActionKind::TypeText {
            text: text.to_string(),
        };
        return Ok(Action::new(kind, description));
    }

    let (key, modifiers) = parse_shortcut(instruction)?;
    Ok(Action::new(ActionKind::KeyPress { key, modifiers }, description))
}

fn strip_prefix_ci<'a>(s: &'a str, prefix: &str) -> Option<&'a str> {
    let head = s.get(..prefix.len())?;
    if head.eq_ignore_ascii_case(prefix) {
        Some(&s[prefix.len()..])
    } else {
        None
    }
}

fn parse_shortcut(instruction: &str) -> Result<(char, ModifierSet), ParseError> {
    let mut modifiers = ModifierSet::empty();
    let mut last_residual: Option<String> = None;

    for token in instruction.split_whitespace() {
        let mut residual = String::new();
        for c in token.chars() {
            match Modifier::from_glyph(c) {
                Some(modifier) => modifiers.insert(modifier),
                None => residual.push(c),
            }
        }
        if residual.is_empty() {
            continue;
        }

        for part in split_combo(&residual) {
            match Modifier::from_word(part) {
                Some(modifier) => modifiers.insert(modifier),
                None => last_residual = Some(part.to_string()),
            }
        }
    }

    let key = last_residual
        .as_deref()
        .and_then(resolve_key)
        .ok_or_else(|| ParseError::MissingKey(instruction.to_string()))?;
    Ok((key, modifiers))
}

/// Splits `cmd+shift+s` style combos. A lone `+`, or a trailing `++`, is the
/// plus key itself.
fn split_combo(residual: &str) -> Vec<&str> {
    if residual.chars().count() < 2 || !residual.contains('+') {
        return vec![residual];
    }
    let mut parts: Vec<&str> = residual.split('+').filter(|p| !p.is_empty()).collect();
    if residual.ends_with("++") {
        parts.push("+");
    }
    parts
}

fn resolve_key(residual: &str) -> Option<char> {
    let lower = residual.to_lowercase();
    let named = match lower.as_str() {
        "↵" | "⏎" | "return" | "enter" => Some(KEY_RETURN),
        "space" | "␣" => Some(KEY_SPACE),
        "tab" | "⇥" => Some(KEY_TAB),
        "escape" | "esc" | "⎋" => Some(KEY_ESCAPE),
        "delete" | "backspace" | "⌫" => Some(KEY_DELETE),
        "forwarddelete" | "⌦" => Some(KEY_FORWARD_DELETE),
        "left" => Some(KEY_LEFT),
        "right" => Some(KEY_RIGHT),
        "up" => Some(KEY_UP),
        "down" => Some(KEY_DOWN),
        _ => None,
    };
    if named.is_some() {
        return named;
    }

    let mut chars = residual.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Some(c.to_ascii_lowercase()),
        _ => None,
    }
}
