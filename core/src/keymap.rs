use crate::action::{
    Modifier, ModifierSet, KEY_DELETE, KEY_DOWN, KEY_ESCAPE, KEY_FORWARD_DELETE, KEY_LEFT, KEY_RETURN, KEY_RIGHT,
    KEY_SPACE, KEY_TAB, KEY_UP,
};

// (shifted, unshifted) pairs on an ANSI layout
const SHIFTED_PAIRS: [(char, char); 21] = [
    ('~', '`'),
    ('!', '1'),
    ('@', '2'),
    ('#', '3'),
    ('$', '4'),
    ('%', '5'),
    ('^', '6'),
    ('&', '7'),
    ('*', '8'),
    ('(', '9'),
    (')', '0'),
    ('_', '-'),
    ('+', '='),
    ('{', '['),
    ('}', ']'),
    ('|', '\\'),
    (':', ';'),
    ('"', '\''),
    ('<', ','),
    ('>', '.'),
    ('?', '/'),
];

/// True for characters typed with Shift held: uppercase letters and shifted
/// punctuation.
pub fn requires_shift(c: char) -> bool {
    c.is_ascii_uppercase() || SHIFTED_PAIRS.iter().any(|(shifted, _)| *shifted == c)
}

/// The character printed on the physical key that produces `c`.
pub fn base_key(c: char) -> char {
    if c.is_ascii_uppercase() {
        return c.to_ascii_lowercase();
    }
    SHIFTED_PAIRS
        .iter()
        .find(|(shifted, _)| *shifted == c)
        .map(|(_, base)| *base)
        .unwrap_or(c)
}

/// Modifiers to post with `key`: the requested ones, plus Shift when the key
/// is only reachable with it.
pub fn modifiers_for(key: char, requested: ModifierSet) -> ModifierSet {
    if requires_shift(key) {
        requested.with(Modifier::Shift)
    } else {
        requested
    }
}

/// macOS virtual key code for `c`, if it sits on the ANSI layout.
pub fn key_code(c: char) -> Option<u16> {
    let code = match base_key(c) {
        'a' => 0,
        's' => 1,
        'd' => 2,
        'f' => 3,
        'h' => 4,
        'g' => 5,
        'z' => 6,
        'x' => 7,
        'c' => 8,
        'v' => 9,
        'b' => 11,
        'q' => 12,
        'w' => 13,
        'e' => 14,
        'r' => 15,
        'y' => 16,
        't' => 17,
        '1' => 18,
        '2' => 19,
        '3' => 20,
        '4' => 21,
        '6' => 22,
        '5' => 23,
        '=' => 24,
        '9' => 25,
        '7' => 26,
        '-' => 27,
        '8' => 28,
        '0' => 29,
        ']' => 30,
        'o' => 31,
        'u' => 32,
        '[' => 33,
        'i' => 34,
        'p' => 35,
        KEY_RETURN | '\n' => 36,
        'l' => 37,
        'j' => 38,
        '\'' => 39,
        'k' => 40,
        ';' => 41,
        '\\' => 42,
        ',' => 43,
        '/' => 44,
        'n' => 45,
        'm' => 46,
        '.' => 47,
        KEY_TAB => 48,
        KEY_SPACE => 49,
        '`' => 50,
        KEY_DELETE => 51,
        KEY_ESCAPE => 53,
        KEY_FORWARD_DELETE => 117,
        KEY_LEFT => 123,
        KEY_RIGHT => 124,
        KEY_DOWN => 125,
        KEY_UP => 126,
        _ => return None,
    };
    Some(code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shift_detection() {
        assert!(requires_shift('A'));
        assert!(requires_shift('?'));
        assert!(requires_shift('"'));
        assert!(!requires_shift('a'));
        assert!(!requires_shift('/'));
        assert!(!requires_shift('é'));
    }

    #[test]
    fn shifted_symbols_carry_shift() {
        let cmd = ModifierSet::empty().with(Modifier::Command);
        let question = modifiers_for('?', cmd);
        assert!(question.contains(Modifier::Shift));
        assert!(question.contains(Modifier::Command));
        assert!(modifiers_for('+', cmd).contains(Modifier::Shift));
        assert_eq!(modifiers_for('/', cmd), cmd);
        assert_eq!(modifiers_for(KEY_RETURN, ModifierSet::empty()), ModifierSet::empty());
    }

    #[test]
    fn shifted_chars_share_the_base_key() {
        assert_eq!(key_code('A'), key_code('a'));
        assert_eq!(key_code('!'), key_code('1'));
        assert_eq!(key_code('c'), Some(8));
        assert_eq!(key_code(KEY_RETURN), Some(36));
        assert_eq!(key_code('é'), None);
    }
}
