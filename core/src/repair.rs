//! Best-effort repair of near-valid JSON text.
//!
//! Hand-written or model-generated JSON often has small defects that a strict
//! parser rejects. [`repair_json`] rewrites the text into valid JSON while
//! keeping its meaning:
//!
//! - trailing and missing commas
//! - unquoted or single-quoted keys and strings
//! - `//` and `/* */` comments
//! - `True`/`False`/`None`/`undefined` constants
//! - unterminated strings and unclosed objects/arrays
//! - surrounding Markdown code fences
//!
//! # Examples
//!
//! ```
//! use contract_schema_core::repair_json;
//!
//! let repaired = repair_json("{name: 'Ada', tags: ['x', 'y',],}").unwrap();
//! let value: serde_json::Value = serde_json::from_str(&repaired).unwrap();
//! assert_eq!(value["name"], "Ada");
//! assert_eq!(value["tags"][1], "y");
//! ```

use thiserror::Error;

/// Text that could not be repaired.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepairError {
    /// Input contains no value at all.
    #[error("no JSON value found")]
    Empty,
    /// A character that cannot start or continue any value.
    #[error("unexpected character '{found}' at position {position}")]
    Unexpected { found: char, position: usize },
    /// Content after the top-level value.
    #[error("unexpected trailing content at position {position}")]
    TrailingCharacters { position: usize },
}

/// Repairs `text` into valid JSON.
pub fn repair_json(text: &str) -> Result<String, RepairError> {
    Repairer::new(strip_code_fence(text)).run()
}

fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the info string (e.g. "json") on the opening fence line.
    let body = match rest.find('\n') {
        Some(newline) => &rest[newline + 1..],
        None => rest,
    };
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Expect {
    Key,
    Colon,
    Value,
}

#[derive(Debug)]
enum Frame {
    Object { expect: Expect, count: usize },
    Array { count: usize },
}

struct Repairer {
    chars: Vec<char>,
    pos: usize,
    out: String,
    stack: Vec<Frame>,
    done: bool,
}

impl Repairer {
    fn new(text: &str) -> Self {
        Self {
            chars: text.chars().collect(),
            pos: 0,
            out: String::with_capacity(text.len() + 8),
            stack: Vec::new(),
            done: false,
        }
    }

    fn run(mut self) -> Result<String, RepairError> {
        loop {
            self.skip_trivia();
            let Some(c) = self.peek() else {
                break;
            };
            if self.done {
                return Err(RepairError::TrailingCharacters { position: self.pos });
            }

            match self.stack.last_mut() {
                None => self.value(c)?,
                Some(Frame::Array { count }) => match c {
                    ']' => {
                        self.pos += 1;
                        self.close();
                    }
                    ',' => self.pos += 1,
                    _ => {
                        if *count > 0 {
                            self.out.push(',');
                        }
                        *count += 1;
                        self.value(c)?;
                    }
                },
                Some(Frame::Object { expect, count }) => match (*expect, c) {
                    (Expect::Key, '}') => {
                        self.pos += 1;
                        self.close();
                    }
                    (Expect::Key, ',') => self.pos += 1,
                    (Expect::Key, _) => {
                        if *count > 0 {
                            self.out.push(',');
                        }
                        *count += 1;
                        *expect = Expect::Colon;
                        self.key(c)?;
                    }
                    (Expect::Colon, ':') => {
                        *expect = Expect::Value;
                        self.pos += 1;
                        self.out.push(':');
                    }
                    (Expect::Colon, _) => {
                        *expect = Expect::Value;
                        self.out.push(':');
                    }
                    (Expect::Value, '}') => {
                        self.out.push_str("null");
                        self.pos += 1;
                        self.close();
                    }
                    (Expect::Value, ',') => {
                        *expect = Expect::Key;
                        self.out.push_str("null");
                        self.pos += 1;
                    }
                    (Expect::Value, _) => self.value(c)?,
                },
            }
        }

        while let Some(frame) = self.stack.last() {
            if let Frame::Object { expect, .. } = frame {
                match expect {
                    Expect::Colon => self.out.push_str(":null"),
                    Expect::Value => self.out.push_str("null"),
                    Expect::Key => {}
                }
            }
            self.close();
        }

        if self.out.is_empty() {
            return Err(RepairError::Empty);
        }
        Ok(self.out)
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn skip_trivia(&mut self) {
        while let Some(c) = self.peek() {
            if c.is_whitespace() {
                self.pos += 1;
            } else if c == '/' && self.chars.get(self.pos + 1) == Some(&'/') {
                while let Some(c) = self.peek() {
                    if c == '\n' {
                        break;
                    }
                    self.pos += 1;
                }
            } else if c == '/' && self.chars.get(self.pos + 1) == Some(&'*') {
                self.pos += 2;
                while self.pos < self.chars.len() {
                    if self.chars[self.pos] == '*' && self.chars.get(self.pos + 1) == Some(&'/') {
                        self.pos += 2;
                        break;
                    }
                    self.pos += 1;
                }
            } else {
                break;
            }
        }
    }

    /// Marks the current value as complete in its parent.
    fn finish_value(&mut self) {
        match self.stack.last_mut() {
            None => self.done = true,
            Some(Frame::Object { expect, .. }) => *expect = Expect::Key,
            Some(Frame::Array { .. }) => {}
        }
    }

    fn close(&mut self) {
        match self.stack.pop() {
            Some(Frame::Object { .. }) => self.out.push('}'),
            Some(Frame::Array { .. }) => self.out.push(']'),
            None => return,
        }
        self.finish_value();
    }

    fn key(&mut self, c: char) -> Result<(), RepairError> {
        if c == '"' || c == '\'' {
            self.string(c);
            return Ok(());
        }
        let word = self.bare_word(|c| c == ':');
        if word.is_empty() {
            return Err(RepairError::Unexpected {
                found: c,
                position: self.pos,
            });
        }
        self.push_quoted(&word);
        Ok(())
    }

    fn value(&mut self, c: char) -> Result<(), RepairError> {
        match c {
            '{' => {
                self.pos += 1;
                self.out.push('{');
                self.stack.push(Frame::Object {
                    expect: Expect::Key,
                    count: 0,
                });
            }
            '[' => {
                self.pos += 1;
                self.out.push('[');
                self.stack.push(Frame::Array { count: 0 });
            }
            '"' | '\'' => {
                self.string(c);
                self.finish_value();
            }
            '-' | '+' | '.' | '0'..='9' => {
                self.number();
                self.finish_value();
            }
            '}' | ']' | ':' => {
                return Err(RepairError::Unexpected {
                    found: c,
                    position: self.pos,
                });
            }
            _ => {
                let word = self.bare_word(|_| false);
                match word.as_str() {
                    "true" | "True" | "TRUE" => self.out.push_str("true"),
                    "false" | "False" | "FALSE" => self.out.push_str("false"),
                    "null" | "None" | "NULL" | "undefined" | "NaN" | "Infinity" => {
                        self.out.push_str("null");
                    }
                    "" => {
                        return Err(RepairError::Unexpected {
                            found: c,
                            position: self.pos,
                        });
                    }
                    other => self.push_quoted(other),
                }
                self.finish_value();
            }
        }
        Ok(())
    }

    /// Reads a quoted string and emits it double-quoted. An unterminated
    /// string is closed at end of input.
    fn string(&mut self, quote: char) {
        self.pos += 1;
        self.out.push('"');
        while let Some(c) = self.peek() {
            self.pos += 1;
            match c {
                '\\' => match self.peek() {
                    Some('\'') => {
                        self.pos += 1;
                        self.out.push('\'');
                    }
                    Some(next @ ('"' | '\\' | '/' | 'b' | 'f' | 'n' | 'r' | 't' | 'u')) => {
                        self.pos += 1;
                        self.out.push('\\');
                        self.out.push(next);
                    }
                    _ => self.out.push_str("\\\\"),
                },
                c if c == quote => {
                    self.out.push('"');
                    return;
                }
                '"' => self.out.push_str("\\\""),
                '\n' => self.out.push_str("\\n"),
                '\r' => self.out.push_str("\\r"),
                '\t' => self.out.push_str("\\t"),
                c if (c as u32) < 0x20 => self.out.push_str(&format!("\\u{:04x}", c as u32)),
                c => self.out.push(c),
            }
        }
        self.out.push('"');
    }

    fn number(&mut self) {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if c.is_ascii_digit() || matches!(c, '-' | '+' | '.' | 'e' | 'E') {
                self.pos += 1;
            } else {
                break;
            }
        }
        let token: String = self.chars[start..self.pos].iter().collect();
        let token = token.strip_prefix('+').unwrap_or(&token);

        if token.parse::<serde_json::Number>().is_ok() {
            self.out.push_str(token);
            return;
        }
        let normalized = token
            .parse::<f64>()
            .ok()
            .and_then(serde_json::Number::from_f64);
        match normalized {
            Some(number) => self.out.push_str(&number.to_string()),
            None => self.push_quoted(token),
        }
    }

    /// Reads an unquoted token up to a structural character or line end.
    fn bare_word(&mut self, extra_stop: impl Fn(char) -> bool) -> String {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if matches!(c, ',' | '{' | '}' | '[' | ']' | '"' | '\n' | '\r') || extra_stop(c) {
                break;
            }
            self.pos += 1;
        }
        self.chars[start..self.pos]
            .iter()
            .collect::<String>()
            .trim()
            .to_string()
    }

    fn push_quoted(&mut self, raw: &str) {
        // serde_json escapes exactly what JSON requires.
        match serde_json::to_string(raw) {
            Ok(quoted) => self.out.push_str(&quoted),
            Err(_) => {
                self.out.push('"');
                self.out.push_str(raw);
                self.out.push('"');
            }
        }
    }
}
