//! Character classification shared by the reader, the scanner, and the
//! emitter.
//!
//! The predicates accept `Option<char>` so that `None` (end of input) falls
//! through them naturally; the `*z` variants treat end of input as a match.

pub(crate) fn is_alpha(ch: impl Into<Option<char>>) -> bool {
    match ch.into() {
        Some(ch) => ch.is_ascii_alphanumeric() || ch == '_' || ch == '-',
        None => false,
    }
}

pub(crate) fn is_space(ch: impl Into<Option<char>>) -> bool {
    ch.into() == Some(' ')
}

pub(crate) fn is_tab(ch: impl Into<Option<char>>) -> bool {
    ch.into() == Some('\t')
}

pub(crate) fn is_blank(ch: impl Into<Option<char>>) -> bool {
    let ch = ch.into();
    is_space(ch) || is_tab(ch)
}

pub(crate) fn is_break(ch: impl Into<Option<char>>) -> bool {
    matches!(
        ch.into(),
        Some('\r' | '\n' | '\u{0085}' | '\u{2028}' | '\u{2029}')
    )
}

pub(crate) fn is_breakz(ch: impl Into<Option<char>>) -> bool {
    let ch = ch.into();
    ch.is_none() || is_break(ch)
}

pub(crate) fn is_blankz(ch: impl Into<Option<char>>) -> bool {
    let ch = ch.into();
    is_blank(ch) || is_breakz(ch)
}

/// Can the character appear unescaped in emitted output?
///
/// This is the emitter's printable set; the reader enforces the slightly wider
/// accepted-input set on its own.
pub(crate) fn is_printable(ch: char) -> bool {
    match ch {
        '\u{feff}' | '\u{fffe}' | '\u{ffff}' => false,
        '\x0a'
        | '\x20'..='\x7e'
        | '\u{00a0}'..='\u{d7ff}'
        | '\u{e000}'..='\u{fffd}'
        | '\u{10000}'..='\u{10ffff}' => true,
        _ => false,
    }
}

/// Width and initial value bits of a UTF-8 sequence, read off its leading
/// octet. `None` for a continuation or invalid octet.
pub(crate) fn utf8_sequence_start(octet: u8) -> Option<(usize, u32)> {
    if octet & 0x80 == 0 {
        Some((1, u32::from(octet)))
    } else if octet & 0xe0 == 0xc0 {
        Some((2, u32::from(octet & 0x1f)))
    } else if octet & 0xf0 == 0xe0 {
        Some((3, u32::from(octet & 0x0f)))
    } else if octet & 0xf8 == 0xf0 {
        Some((4, u32::from(octet & 0x07)))
    } else {
        None
    }
}

/// Characters permitted in a tag URI besides the alphanumeric set.
pub(crate) fn is_uri_symbol(ch: char) -> bool {
    matches!(
        ch,
        ';' | '/'
            | '?'
            | ':'
            | '@'
            | '&'
            | '='
            | '+'
            | '$'
            | '.'
            | '%'
            | '!'
            | '~'
            | '*'
            | '\''
            | '('
            | ')'
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn break_set_is_yaml_1_1() {
        for ch in ['\r', '\n', '\u{0085}', '\u{2028}', '\u{2029}'] {
            assert!(is_break(ch));
        }
        assert!(!is_break('\t'));
        assert!(is_breakz(None));
        assert!(is_blankz(Some(' ')));
    }

    #[test]
    fn printable_excludes_noncharacters() {
        assert!(is_printable('å'));
        assert!(is_printable('\u{10000}'));
        assert!(!is_printable('\u{feff}'));
        assert!(!is_printable('\x07'));
    }
}
