//! Block-comment annotations.
//!
//! An annotation is the payload of a block comment whose first `:` starts a
//! type expression: `/*: ?->Account */`. Comments without a `:` are plain
//! comments and carry no contract.

use std::ops::Range;

use crate::segment::Scanner;

fn payload_of(inside: &str) -> Option<String> {
    let colon = inside.find(':')?;
    let payload = inside[colon + 1..].trim();
    if payload.is_empty() {
        None
    } else {
        Some(payload.to_string())
    }
}

/// The annotation immediately after a point in the declaration. Only
/// whitespace may sit between the point and the comment.
pub fn annotation_after(text: &str) -> Option<String> {
    let trimmed = text.trim_start();
    let rest = trimmed.strip_prefix("/*")?;
    let end = rest.find("*/")?;
    payload_of(&rest[..end])
}

/// The first annotation anywhere in `text`, outside strings, with the byte
/// range of the whole comment. Plain comments are scanned past.
pub fn first_annotation_in(text: &str) -> Option<(String, Range<usize>)> {
    let mut s = Scanner::new(text);
    while !s.eof() {
        if s.at_line_comment() {
            s.skip_line_comment();
            continue;
        }
        if s.at_block_comment() {
            let start = s.pos();
            if s.skip_block_comment().is_err() {
                return None;
            }
            let end = s.pos();
            let inside = &text[start + 2..end - 2];
            if let Some(payload) = payload_of(inside) {
                return Some((payload, start..end));
            }
            continue;
        }
        if s.at_string() {
            if s.skip_string().is_err() {
                return None;
            }
            continue;
        }
        s.bump();
    }
    None
}
