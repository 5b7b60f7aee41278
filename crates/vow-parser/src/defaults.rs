//! Literal evaluation of parameter defaults.
//!
//! Default expressions are checked without running the host language, so
//! only literals are supported: null, booleans, numbers, strings, and
//! array/object literals built from those. Anything else is a soft
//! failure the caller reports.

use rustc_hash::FxHashMap;
use vow_core::Value;

struct Cursor<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(text: &'a str) -> Cursor<'a> {
        Cursor {
            bytes: text.as_bytes(),
            pos: 0,
        }
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn skip_ws(&mut self) {
        while matches!(self.peek(), Some(b' ' | b'\t' | b'\r' | b'\n')) {
            self.pos += 1;
        }
    }

    fn eat(&mut self, byte: u8) -> bool {
        if self.peek() == Some(byte) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn eat_word(&mut self, word: &str) -> bool {
        let end = self.pos + word.len();
        if self.bytes.get(self.pos..end) != Some(word.as_bytes()) {
            return false;
        }
        // `nullish` must not read as `null`.
        if matches!(self.bytes.get(end), Some(b) if b.is_ascii_alphanumeric() || *b == b'_' || *b == b'$')
        {
            return false;
        }
        self.pos = end;
        true
    }

    fn value(&mut self) -> Result<Value, String> {
        self.skip_ws();
        if self.eat_word("null") {
            return Ok(Value::Null);
        }
        if self.eat_word("undefined") {
            return Ok(Value::Undefined);
        }
        if self.eat_word("true") {
            return Ok(Value::Bool(true));
        }
        if self.eat_word("false") {
            return Ok(Value::Bool(false));
        }
        match self.peek() {
            Some(b'"') | Some(b'\'') | Some(b'`') => self.string(),
            Some(b'[') => self.array(),
            Some(b'{') => self.object(),
            Some(b) if b == b'-' || b == b'+' || b.is_ascii_digit() => self.number(),
            _ => Err("not a literal".to_string()),
        }
    }

    fn string(&mut self) -> Result<Value, String> {
        let quote = self.bytes[self.pos];
        self.pos += 1;
        let mut out = String::new();
        loop {
            match self.peek() {
                None => return Err("unterminated string".to_string()),
                Some(b'\\') => {
                    self.pos += 1;
                    let Some(escaped) = self.peek() else {
                        return Err("unterminated string".to_string());
                    };
                    self.pos += 1;
                    out.push(match escaped {
                        b'n' => '\n',
                        b't' => '\t',
                        b'r' => '\r',
                        b'0' => '\0',
                        other => other as char,
                    });
                }
                Some(b) if b == quote => {
                    self.pos += 1;
                    return Ok(Value::Str(out.into()));
                }
                Some(_) => {
                    // Step over one whole character, multibyte included.
                    let start = self.pos;
                    self.pos += 1;
                    while matches!(self.bytes.get(self.pos), Some(b) if b & 0xC0 == 0x80) {
                        self.pos += 1;
                    }
                    let chunk = std::str::from_utf8(&self.bytes[start..self.pos])
                        .map_err(|_| "invalid string".to_string())?;
                    out.push_str(chunk);
                }
            }
        }
    }

    fn number(&mut self) -> Result<Value, String> {
        let start = self.pos;
        if matches!(self.peek(), Some(b'-' | b'+')) {
            self.pos += 1;
        }
        while matches!(self.peek(), Some(b) if b.is_ascii_digit() || b == b'.' || b == b'e' || b == b'E')
        {
            if matches!(self.peek(), Some(b'e' | b'E'))
                && matches!(self.bytes.get(self.pos + 1), Some(b'-' | b'+'))
            {
                self.pos += 1;
            }
            self.pos += 1;
        }
        let text = std::str::from_utf8(&self.bytes[start..self.pos])
            .map_err(|_| "invalid number".to_string())?;
        if let Ok(int) = text.parse::<i64>() {
            return Ok(Value::Int(int));
        }
        text.parse::<f64>()
            .map(Value::Float)
            .map_err(|_| format!("invalid number `{text}`"))
    }

    fn array(&mut self) -> Result<Value, String> {
        self.pos += 1;
        let mut items = Vec::new();
        loop {
            self.skip_ws();
            if self.eat(b']') {
                return Ok(Value::array(items));
            }
            items.push(self.value()?);
            self.skip_ws();
            if !self.eat(b',') && self.peek() != Some(b']') {
                return Err("expected `,` or `]`".to_string());
            }
        }
    }

    fn object(&mut self) -> Result<Value, String> {
        self.pos += 1;
        let mut props = FxHashMap::default();
        loop {
            self.skip_ws();
            if self.eat(b'}') {
                return Ok(Value::dict(props));
            }
            let key = match self.peek() {
                Some(b'"') | Some(b'\'') | Some(b'`') => match self.string()? {
                    Value::Str(s) => s.to_string(),
                    _ => unreachable!(),
                },
                Some(b) if b.is_ascii_alphabetic() || b == b'_' || b == b'$' => {
                    let start = self.pos;
                    while matches!(self.peek(), Some(b) if b.is_ascii_alphanumeric() || b == b'_' || b == b'$')
                    {
                        self.pos += 1;
                    }
                    std::str::from_utf8(&self.bytes[start..self.pos])
                        .map_err(|_| "invalid key".to_string())?
                        .to_string()
                }
                _ => return Err("expected a property key".to_string()),
            };
            self.skip_ws();
            if !self.eat(b':') {
                return Err("expected `:` after property key".to_string());
            }
            props.insert(key, self.value()?);
            self.skip_ws();
            if !self.eat(b',') && self.peek() != Some(b'}') {
                return Err("expected `,` or `}`".to_string());
            }
        }
    }
}

/// Evaluates a literal default expression to a [`Value`].
pub fn eval_literal(text: &str) -> Result<Value, String> {
    let mut cursor = Cursor::new(text);
    let value = cursor.value()?;
    cursor.skip_ws();
    if cursor.pos != cursor.bytes.len() {
        return Err("trailing content after literal".to_string());
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalars() {
        assert_eq!(eval_literal("null").unwrap(), Value::Null);
        assert_eq!(eval_literal("true").unwrap(), Value::Bool(true));
        assert_eq!(eval_literal("42").unwrap(), Value::Int(42));
        assert_eq!(eval_literal("-7").unwrap(), Value::Int(-7));
        assert_eq!(eval_literal("2.5").unwrap(), Value::Float(2.5));
        assert_eq!(eval_literal("'hi'").unwrap(), Value::str("hi"));
        assert_eq!(eval_literal("\"a\\nb\"").unwrap(), Value::str("a\nb"));
    }

    #[test]
    fn test_word_boundaries() {
        assert!(eval_literal("nullish").is_err());
        assert!(eval_literal("trueish").is_err());
    }

    #[test]
    fn test_containers() {
        let arr = eval_literal("[1, 'two', [3]]").unwrap();
        let arr = arr.as_array().expect("array");
        assert_eq!(arr.lock().len(), 3);

        let dict = eval_literal("{ a: 1, 'b c': true, }").unwrap();
        let dict = dict.as_dict().expect("dict");
        assert_eq!(dict.lock().get("a"), Some(&Value::Int(1)));
        assert_eq!(dict.lock().get("b c"), Some(&Value::Bool(true)));
    }

    #[test]
    fn test_non_literals_are_rejected() {
        assert!(eval_literal("Date.now()").is_err());
        assert!(eval_literal("1 + 2").is_err());
        assert!(eval_literal("[1] extra").is_err());
    }
}
