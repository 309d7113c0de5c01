//! Conversion between byte offsets and (line, character) positions.
//!
//! Offsets are byte indices into the UTF-8 text and must lie on char
//! boundaries. Lines are delimited by `\n` only; `\r` receives no special
//! treatment and counts toward `character` like any other character.
//! Characters are counted in UTF-16 code units to match editor-widget
//! conventions.

use crate::protocol::types::Position;

/// Convert a byte offset into a position.
///
/// `offset` is clamped to the nearest char boundary at or below
/// `min(offset, text.len())`, so any index is safe to pass.
pub fn offset_to_position(text: &str, offset: usize) -> Position {
    let mut offset = offset.min(text.len());
    while !text.is_char_boundary(offset) {
        offset -= 1;
    }
    let prefix = &text[..offset];

    let line = prefix.bytes().filter(|&b| b == b'\n').count() as u32;
    let line_start = prefix.rfind('\n').map(|i| i + 1).unwrap_or(0);
    let character = prefix[line_start..].encode_utf16().count() as u32;

    Position { line, character }
}

/// Convert a position back into a byte offset.
///
/// Returns `None` when the line does not exist, the character runs past the
/// end of the line, or the character lands inside a surrogate pair.
pub fn position_to_offset(text: &str, position: Position) -> Option<usize> {
    let mut line_start = 0usize;
    for _ in 0..position.line {
        let newline = text[line_start..].find('\n')?;
        line_start += newline + 1;
    }

    if position.character == 0 {
        return Some(line_start);
    }

    let mut units = 0u32;
    let mut offset = line_start;
    for ch in text[line_start..].chars() {
        if ch == '\n' {
            break;
        }
        units += ch.len_utf16() as u32;
        offset += ch.len_utf8();
        if units == position.character {
            return Some(offset);
        }
        if units > position.character {
            return None;
        }
    }
    None
}
