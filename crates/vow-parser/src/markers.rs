//! Marker grammar shared by type expressions and position keys.
//!
//! ```text
//! type-expr := '?'? wrapper? name ('|' name)*
//! pos-key   := '?'? (INT ('.' INT)* | 'return') wrapper?
//! wrapper   := ('->' | '?>')? ('[]' | '[?]')?
//! ```
//!
//! A promise wrapper may be followed by an iterable wrapper, in which case
//! the promise resolution is element-checked.

use logos::Logos;
use vow_types::Markers;

use crate::error::ExtractError;
use crate::lexer::Token;

/// Where a position key points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyTarget {
    /// The reserved return position.
    Return,
    /// A 1-based parameter path; nested fields by ordinal.
    Path(Vec<u32>),
}

/// A parsed definitions position key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedKey {
    /// Markers spelled on the key.
    pub markers: Markers,
    /// The position the key addresses.
    pub target: KeyTarget,
}

fn apply_wrapper(markers: &mut Markers, token: Token) -> bool {
    match token {
        Token::Arrow if !markers.check_promise && !markers.check_iterable => {
            markers.check_promise = true;
            true
        }
        Token::NullArrow if !markers.check_promise && !markers.check_iterable => {
            markers.check_promise = true;
            markers.is_nullable_promise = true;
            true
        }
        Token::Brackets if !markers.check_iterable => {
            markers.check_iterable = true;
            true
        }
        Token::NullBrackets if !markers.check_iterable => {
            markers.check_iterable = true;
            markers.is_nullable_iterable = true;
            true
        }
        _ => false,
    }
}

/// Parses the marker prefix of a type expression and returns the bare
/// union expression that follows.
pub fn parse_type_expr(text: &str, path: &str) -> Result<(Markers, String), ExtractError> {
    let text = text.trim();
    let bad = || ExtractError::BadTypeExpression {
        path: path.to_string(),
        text: text.to_string(),
    };

    let mut markers = Markers::default();
    let mut lex = Token::lexer(text);
    let expr_start = loop {
        let span_before = lex.span().end;
        match lex.next() {
            Some(Ok(Token::Question)) => {
                if markers.any() {
                    return Err(bad());
                }
                markers.is_nullable = true;
            }
            Some(Ok(token)) if apply_wrapper(&mut markers, token) => {}
            Some(Ok(Token::Arrow | Token::NullArrow | Token::Brackets | Token::NullBrackets)) => {
                return Err(bad())
            }
            Some(_) => break lex.span().start,
            None => break span_before,
        }
    };

    let expr = text[expr_start..].trim();
    if expr.is_empty() {
        return Err(bad());
    }
    Ok((markers, expr.to_string()))
}

/// Parses a definitions position key.
pub fn parse_position_key(key: &str, member_key: &str) -> Result<ParsedKey, ExtractError> {
    let bad = || ExtractError::BadPositionKey {
        member_key: member_key.to_string(),
        key: key.to_string(),
    };

    let mut tokens = Vec::new();
    let mut lex = Token::lexer(key);
    while let Some(token) = lex.next() {
        match token {
            Ok(t) => tokens.push((t, lex.slice().to_string())),
            Err(()) => return Err(bad()),
        }
    }

    let mut markers = Markers::default();
    let mut cursor = tokens.iter().peekable();

    if matches!(cursor.peek(), Some((Token::Question, _))) {
        markers.is_nullable = true;
        cursor.next();
    }

    let target = match cursor.next() {
        Some((Token::Return, _)) => KeyTarget::Return,
        Some((Token::Int, slice)) => {
            let mut path = vec![parse_position(slice).ok_or_else(bad)?];
            while matches!(cursor.peek(), Some((Token::Dot, _))) {
                cursor.next();
                match cursor.next() {
                    Some((Token::Int, slice)) => {
                        path.push(parse_position(slice).ok_or_else(bad)?)
                    }
                    _ => return Err(bad()),
                }
            }
            KeyTarget::Path(path)
        }
        _ => return Err(bad()),
    };

    for entry in cursor {
        if !apply_wrapper(&mut markers, entry.0) {
            return Err(bad());
        }
    }

    Ok(ParsedKey { markers, target })
}

fn parse_position(slice: &str) -> Option<u32> {
    match slice.parse::<u32>() {
        Ok(0) | Err(_) => None,
        Ok(n) => Some(n),
    }
}

/// Renders a parameter path as a 1-based dotted position.
pub fn dotted(path: &[u32]) -> String {
    path.iter()
        .map(|n| n.to_string())
        .collect::<Vec<_>>()
        .join(".")
}
