//! Declaration segmentation.
//!
//! Splits a member declaration into its parameter list, the trailer between
//! the closing parenthesis and the body, and the body itself. The scan is
//! byte-level and tracks strings, comments and delimiter depth, so a `)` in
//! a default value or a comment never ends the list early.

use crate::error::ExtractError;

/// Where a byte scan went wrong.
pub(crate) enum ScanIssue {
    UnterminatedComment(usize),
    UnterminatedString(usize),
}

impl ScanIssue {
    pub(crate) fn into_error(self, path: &str) -> ExtractError {
        match self {
            ScanIssue::UnterminatedComment(at) => ExtractError::UnterminatedComment {
                path: path.to_string(),
                at,
            },
            ScanIssue::UnterminatedString(at) => ExtractError::UnterminatedString {
                path: path.to_string(),
                at,
            },
        }
    }
}

/// Byte cursor over declaration text. All structural characters are ASCII,
/// so byte positions handed out by the scanner are always char boundaries.
pub(crate) struct Scanner<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Scanner<'a> {
    pub(crate) fn new(text: &'a str) -> Scanner<'a> {
        Scanner {
            bytes: text.as_bytes(),
            pos: 0,
        }
    }

    pub(crate) fn eof(&self) -> bool {
        self.pos >= self.bytes.len()
    }

    pub(crate) fn pos(&self) -> usize {
        self.pos
    }

    pub(crate) fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.bytes.get(self.pos + offset).copied()
    }

    pub(crate) fn bump(&mut self) {
        self.pos += 1;
    }

    pub(crate) fn at_line_comment(&self) -> bool {
        self.peek() == Some(b'/') && self.peek_at(1) == Some(b'/')
    }

    pub(crate) fn at_block_comment(&self) -> bool {
        self.peek() == Some(b'/') && self.peek_at(1) == Some(b'*')
    }

    pub(crate) fn at_string(&self) -> bool {
        matches!(self.peek(), Some(b'"' | b'\'' | b'`'))
    }

    pub(crate) fn skip_line_comment(&mut self) {
        while let Some(b) = self.peek() {
            if b == b'\n' {
                break;
            }
            self.bump();
        }
    }

    pub(crate) fn skip_block_comment(&mut self) -> Result<(), ScanIssue> {
        let start = self.pos;
        self.bump();
        self.bump();
        while !self.eof() {
            if self.peek() == Some(b'*') && self.peek_at(1) == Some(b'/') {
                self.bump();
                self.bump();
                return Ok(());
            }
            self.bump();
        }
        Err(ScanIssue::UnterminatedComment(start))
    }

    pub(crate) fn skip_string(&mut self) -> Result<(), ScanIssue> {
        let start = self.pos;
        let Some(quote) = self.peek() else {
            return Ok(());
        };
        self.bump();
        while let Some(b) = self.peek() {
            if b == b'\\' {
                self.bump();
                self.bump();
                continue;
            }
            self.bump();
            if b == quote {
                return Ok(());
            }
        }
        Err(ScanIssue::UnterminatedString(start))
    }

    /// Skips a string or comment at the cursor. Returns true if it moved.
    pub(crate) fn skip_noise(&mut self) -> Result<bool, ScanIssue> {
        if self.at_line_comment() {
            self.skip_line_comment();
            return Ok(true);
        }
        if self.at_block_comment() {
            self.skip_block_comment()?;
            return Ok(true);
        }
        if self.at_string() {
            self.skip_string()?;
            return Ok(true);
        }
        Ok(false)
    }
}

/// A declaration split at its parameter list.
#[derive(Debug, Clone, PartialEq)]
pub struct Segmented {
    /// Text strictly between the outermost parentheses.
    pub params: String,
    /// Byte offset of `params` in the declaration.
    pub params_start: usize,
    /// Text between the closing parenthesis and the body brace.
    pub trailer: String,
    /// Byte offset of `trailer` in the declaration.
    pub trailer_start: usize,
    /// The body, from its opening brace to the end. Empty when the
    /// declaration has no body.
    pub body: String,
    /// Byte offset of `body` in the declaration.
    pub body_start: usize,
}

/// Splits `text` into parameter list, trailer and body.
pub fn segment(text: &str, path: &str) -> Result<Segmented, ExtractError> {
    let mut s = Scanner::new(text);

    // Find the opening parenthesis of the parameter list.
    loop {
        if s.eof() {
            return Err(ExtractError::MissingParameterList {
                path: path.to_string(),
            });
        }
        match s.skip_noise() {
            Ok(true) => continue,
            Ok(false) => {}
            Err(issue) => return Err(issue.into_error(path)),
        }
        if s.peek() == Some(b'(') {
            break;
        }
        s.bump();
    }

    let open_at = s.pos();
    s.bump();
    let params_start = s.pos();

    let mut depth = 1u32;
    let params_end;
    loop {
        if s.eof() {
            return Err(ExtractError::UnclosedDelimiter {
                path: path.to_string(),
                open: '(',
                at: open_at,
            });
        }
        match s.skip_noise() {
            Ok(true) => continue,
            Ok(false) => {}
            Err(issue) => return Err(issue.into_error(path)),
        }
        match s.peek() {
            Some(b'(' | b'[' | b'{') => depth += 1,
            Some(b')' | b']' | b'}') => {
                depth -= 1;
                if depth == 0 {
                    if s.peek() == Some(b')') {
                        params_end = s.pos();
                        s.bump();
                        break;
                    }
                    return Err(ExtractError::UnclosedDelimiter {
                        path: path.to_string(),
                        open: '(',
                        at: open_at,
                    });
                }
            }
            _ => {}
        }
        s.bump();
    }

    let trailer_start = s.pos();
    let mut body_start = text.len();
    while !s.eof() {
        match s.skip_noise() {
            Ok(true) => continue,
            Ok(false) => {}
            Err(issue) => return Err(issue.into_error(path)),
        }
        if s.peek() == Some(b'{') {
            body_start = s.pos();
            break;
        }
        s.bump();
    }

    Ok(Segmented {
        params: text[params_start..params_end].to_string(),
        params_start,
        trailer: text[trailer_start..body_start].to_string(),
        trailer_start,
        body: text[body_start..].to_string(),
        body_start,
    })
}

/// Removes line comments, and block comments unless `keep_blocks`. String
/// literals are preserved verbatim. A removed block comment leaves a single
/// space so adjacent tokens stay separate.
pub fn strip_comments(text: &str, keep_blocks: bool) -> String {
    let mut out = String::with_capacity(text.len());
    let mut s = Scanner::new(text);
    let mut plain_start = 0;
    while !s.eof() {
        if s.at_line_comment() {
            out.push_str(&text[plain_start..s.pos()]);
            s.skip_line_comment();
            plain_start = s.pos();
        } else if s.at_block_comment() {
            out.push_str(&text[plain_start..s.pos()]);
            let start = s.pos();
            match s.skip_block_comment() {
                Ok(()) if keep_blocks => out.push_str(&text[start..s.pos()]),
                Ok(()) => out.push(' '),
                Err(_) => return out,
            }
            plain_start = s.pos();
        } else if s.at_string() {
            if s.skip_string().is_err() {
                break;
            }
        } else {
            s.bump();
        }
    }
    out.push_str(&text[plain_start..]);
    out
}

/// Collapses whitespace runs into single spaces and trims the ends.
pub fn collapse_ws(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Whether a body segment is empty once comments and whitespace are gone.
/// Declarations without a body count as empty.
pub fn body_is_empty(body: &str) -> bool {
    let stripped = strip_comments(body, false);
    let compact: String = stripped.chars().filter(|c| !c.is_whitespace()).collect();
    compact.is_empty() || compact == "{}"
}
