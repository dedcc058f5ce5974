//! NEON structure decoder.
//!
//! Validates the document shape without building values: string
//! termination and escapes, bracket matching, block indentation, and
//! duplicate keys. Block indentation uses one character kind per document.

use std::collections::HashSet;

use super::{ConfigDecoder, DecodeError};

#[derive(Debug, Default, Clone, Copy)]
pub struct Neon;

impl ConfigDecoder for Neon {
    fn decode(&self, source: &str) -> Result<(), DecodeError> {
        let tokens = lex(source)?;
        Parser {
            tokens,
            pos: 0,
            depth: 0,
        }
        .document()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tok<'s> {
    /// Literal or quoted string; the text is used for duplicate-key checks.
    Scalar(&'s str),
    Colon,
    Equals,
    Comma,
    Dash,
    Open(u8),
    Close(u8),
    /// Start of a non-blank line, carrying its indentation.
    Newline(&'s str),
}

struct Token<'s> {
    tok: Tok<'s>,
    line: usize,
}

const ESCAPES: &[u8] = b"tnrfb\"\\/_ux";

fn is_space(b: Option<&u8>) -> bool {
    matches!(b, None | Some(b' ' | b'\t' | b'\r' | b'\n'))
}

/// `:` separates a key when followed by whitespace, end, or a closer.
fn is_key_colon(next: Option<&u8>) -> bool {
    is_space(next) || matches!(next, Some(b',' | b']' | b'}' | b')'))
}

fn lex(source: &str) -> Result<Vec<Token<'_>>, DecodeError> {
    let b = source.as_bytes();
    let mut out = Vec::new();
    let mut i = 0;
    let mut line = 1;
    let mut at_line_start = true;
    let mut indent_char: Option<u8> = None;

    while i < b.len() {
        if at_line_start {
            at_line_start = false;
            let start = i;
            while matches!(b.get(i), Some(b' ' | b'\t')) {
                i += 1;
            }
            let blank = match b.get(i) {
                None | Some(b'\n' | b'#') => true,
                Some(b'\r') => matches!(b.get(i + 1), None | Some(b'\n')),
                _ => false,
            };
            if !blank {
                let indent = &source[start..i];
                for c in indent.bytes() {
                    match indent_char {
                        None => indent_char = Some(c),
                        Some(p) if p != c => {
                            return Err(DecodeError::new(
                                "Invalid combination of tabs and spaces",
                                Some(line),
                            ))
                        }
                        _ => {}
                    }
                }
                out.push(Token {
                    tok: Tok::Newline(indent),
                    line,
                });
            }
            continue;
        }

        let c = b[i];
        let punct = match c {
            b',' => Some(Tok::Comma),
            b'=' => Some(Tok::Equals),
            b'[' | b'{' | b'(' => Some(Tok::Open(c)),
            b']' | b'}' | b')' => Some(Tok::Close(c)),
            b'-' if is_space(b.get(i + 1)) => Some(Tok::Dash),
            b':' if is_key_colon(b.get(i + 1)) => Some(Tok::Colon),
            _ => None,
        };
        if let Some(tok) = punct {
            out.push(Token { tok, line });
            i += 1;
            continue;
        }
        match c {
            b'\n' => {
                line += 1;
                i += 1;
                at_line_start = true;
            }
            b' ' | b'\t' | b'\r' => i += 1,
            b'#' => {
                while i < b.len() && b[i] != b'\n' {
                    i += 1;
                }
            }
            q @ (b'\'' | b'"') => {
                let (text, end) = string(source, i, q, line)?;
                out.push(Token {
                    tok: Tok::Scalar(text),
                    line,
                });
                line += source[i..end].bytes().filter(|c| *c == b'\n').count();
                i = end;
            }
            _ => {
                let end = literal_end(b, i);
                out.push(Token {
                    tok: Tok::Scalar(&source[i..end]),
                    line,
                });
                i = end;
            }
        }
    }
    Ok(out)
}

/// Scan a quoted string starting at `start`; returns its body and end offset.
fn string(source: &str, start: usize, quote: u8, line: usize) -> Result<(&str, usize), DecodeError> {
    let b = source.as_bytes();
    let triple = [quote; 3];
    if b[start..].starts_with(&triple) {
        let body = start + 3;
        return match b[body..].windows(3).position(|w| w == triple) {
            Some(p) => Ok((&source[body..body + p], body + p + 3)),
            None => Err(DecodeError::new(
                format!("Missing closing {}", String::from_utf8_lossy(&triple)),
                Some(line),
            )),
        };
    }
    let mut j = start + 1;
    loop {
        match b.get(j) {
            None | Some(b'\n') => return Err(DecodeError::new("Unterminated string", Some(line))),
            Some(b'\\') if quote == b'"' => {
                match b.get(j + 1) {
                    Some(c) if ESCAPES.contains(c) => {}
                    _ => {
                        let seq = source.get(j..j + 2).unwrap_or("\\");
                        return Err(DecodeError::new(
                            format!("Invalid escaping sequence {}", seq),
                            Some(line),
                        ));
                    }
                }
                j += 2;
            }
            Some(c) if *c == quote => {
                if quote == b'\'' && b.get(j + 1) == Some(&b'\'') {
                    j += 2;
                    continue;
                }
                return Ok((&source[start + 1..j], j + 1));
            }
            Some(_) => j += 1,
        }
    }
}

fn stops_literal(c: u8) -> bool {
    matches!(c, b'\n' | b',' | b'=' | b'[' | b']' | b'{' | b'}' | b'(' | b')')
}

/// End of an unquoted literal. Inner whitespace belongs to the literal unless
/// what follows it would end the literal anyway.
fn literal_end(b: &[u8], start: usize) -> usize {
    let mut i = start;
    while let Some(&c) = b.get(i) {
        if stops_literal(c) || (c == b':' && i > start && is_key_colon(b.get(i + 1))) {
            break;
        }
        if matches!(c, b' ' | b'\t' | b'\r') {
            let mut j = i;
            while matches!(b.get(j), Some(b' ' | b'\t' | b'\r')) {
                j += 1;
            }
            let ends = match b.get(j) {
                None => true,
                Some(b'#') => true,
                Some(b':') => is_key_colon(b.get(j + 1)),
                Some(&n) => stops_literal(n),
            };
            if ends {
                break;
            }
            i = j;
            continue;
        }
        i += 1;
    }
    i
}

fn describe(tok: &Tok<'_>) -> String {
    match tok {
        Tok::Scalar(s) => format!("'{}'", s),
        Tok::Colon => "':'".into(),
        Tok::Equals => "'='".into(),
        Tok::Comma => "','".into(),
        Tok::Dash => "'-'".into(),
        Tok::Open(c) | Tok::Close(c) => format!("'{}'", *c as char),
        Tok::Newline(_) => "end of line".into(),
    }
}

/// Bracket and block nesting beyond this is rejected.
const MAX_DEPTH: usize = 200;

struct Parser<'s> {
    tokens: Vec<Token<'s>>,
    pos: usize,
    depth: usize,
}

impl<'s> Parser<'s> {
    fn peek(&self) -> Option<Tok<'s>> {
        self.tokens.get(self.pos).map(|t| t.tok)
    }

    fn line(&self) -> Option<usize> {
        self.tokens
            .get(self.pos)
            .or(self.tokens.last())
            .map(|t| t.line)
    }

    fn unexpected(&self) -> DecodeError {
        match self.tokens.get(self.pos) {
            Some(t) => DecodeError::new(format!("Unexpected {}", describe(&t.tok)), Some(t.line)),
            None => DecodeError::new("Unexpected end", self.line()),
        }
    }

    fn bad_indentation(&self) -> DecodeError {
        DecodeError::new("Bad indentation", self.line())
    }

    fn descend(&mut self) -> Result<(), DecodeError> {
        if self.depth >= MAX_DEPTH {
            return Err(DecodeError::new("Too deep nesting", self.line()));
        }
        self.depth += 1;
        Ok(())
    }

    fn document(mut self) -> Result<(), DecodeError> {
        let indent = match self.peek() {
            None => return Ok(()),
            Some(Tok::Newline(ind)) => ind,
            Some(_) => return Err(self.unexpected()),
        };
        self.block(indent, &mut HashSet::new())?;
        match self.peek() {
            None => Ok(()),
            Some(Tok::Newline(_)) => Err(self.bad_indentation()),
            Some(_) => Err(self.unexpected()),
        }
    }

    /// Entries sharing `indent`. Returns at the first shallower line.
    fn block(&mut self, indent: &'s str, keys: &mut HashSet<String>) -> Result<(), DecodeError> {
        while let Some(Tok::Newline(ind)) = self.peek() {
            if ind != indent {
                if ind.len() < indent.len() && indent.starts_with(ind) {
                    return Ok(());
                }
                return Err(self.bad_indentation());
            }
            self.pos += 1;
            self.entry(indent, keys)?;
        }
        self.end_of_line()
    }

    fn entry(&mut self, indent: &'s str, keys: &mut HashSet<String>) -> Result<(), DecodeError> {
        if self.peek() == Some(Tok::Dash) {
            self.pos += 1;
            return self.list_item(indent);
        }
        let line = self.line();
        let key = self.inline_value()?;
        if matches!(self.peek(), Some(Tok::Colon | Tok::Equals)) {
            self.insert_key(key, line, keys)?;
            self.pos += 1;
            return self.value_or_nested(indent);
        }
        self.end_of_line()
    }

    fn list_item(&mut self, indent: &'s str) -> Result<(), DecodeError> {
        if matches!(self.peek(), None | Some(Tok::Newline(_))) {
            return self.nested(indent);
        }
        let line = self.line();
        let key = self.inline_value()?;
        if !matches!(self.peek(), Some(Tok::Colon | Tok::Equals)) {
            return self.end_of_line();
        }
        // `- key: value` opens a mapping continued on deeper lines
        let mut keys = HashSet::new();
        self.insert_key(key, line, &mut keys)?;
        self.pos += 1;
        self.value_or_nested(indent)?;
        if let Some(Tok::Newline(ind)) = self.peek() {
            if ind.len() > indent.len() && ind.starts_with(indent) {
                return self.block(ind, &mut keys);
            }
        }
        Ok(())
    }

    fn insert_key(
        &self,
        key: Option<&'s str>,
        line: Option<usize>,
        keys: &mut HashSet<String>,
    ) -> Result<(), DecodeError> {
        let key = key.ok_or_else(|| self.unexpected())?;
        if !keys.insert(key.to_string()) {
            return Err(DecodeError::new(format!("Duplicated key '{}'", key), line));
        }
        Ok(())
    }

    fn value_or_nested(&mut self, indent: &'s str) -> Result<(), DecodeError> {
        if matches!(self.peek(), None | Some(Tok::Newline(_))) {
            return self.nested(indent);
        }
        self.inline_value()?;
        self.end_of_line()
    }

    /// A deeper block after `key:` or `-`, or nothing (null).
    fn nested(&mut self, indent: &'s str) -> Result<(), DecodeError> {
        if let Some(Tok::Newline(ind)) = self.peek() {
            if ind.len() > indent.len() {
                if !ind.starts_with(indent) {
                    return Err(self.bad_indentation());
                }
                self.descend()?;
                self.block(ind, &mut HashSet::new())?;
                self.depth -= 1;
                return Ok(());
            }
        }
        Ok(())
    }

    fn end_of_line(&self) -> Result<(), DecodeError> {
        match self.peek() {
            None | Some(Tok::Newline(_)) => Ok(()),
            Some(_) => Err(self.unexpected()),
        }
    }

    /// Parse one inline value. Returns the scalar text when it can be a key.
    fn inline_value(&mut self) -> Result<Option<&'s str>, DecodeError> {
        match self.peek() {
            Some(Tok::Scalar(s)) => {
                self.pos += 1;
                let mut entity = false;
                loop {
                    match self.peek() {
                        Some(Tok::Open(b'(')) => {
                            self.pos += 1;
                            self.items(b')')?;
                            entity = true;
                        }
                        Some(Tok::Scalar(chain)) if entity && chain.starts_with("::") => {
                            self.pos += 1;
                        }
                        _ => break,
                    }
                }
                Ok((!entity).then_some(s))
            }
            Some(Tok::Open(open @ (b'[' | b'{'))) => {
                self.pos += 1;
                self.items(if open == b'[' { b']' } else { b'}' })?;
                Ok(None)
            }
            _ => Err(self.unexpected()),
        }
    }

    fn skip_newlines(&mut self) -> bool {
        let mut skipped = false;
        while let Some(Tok::Newline(_)) = self.peek() {
            self.pos += 1;
            skipped = true;
        }
        skipped
    }

    /// Items of `[...]`, `{...}` or entity arguments; the opener is consumed.
    fn items(&mut self, close: u8) -> Result<(), DecodeError> {
        self.descend()?;
        self.bracket_items(close)?;
        self.depth -= 1;
        Ok(())
    }

    fn bracket_items(&mut self, close: u8) -> Result<(), DecodeError> {
        let open_line = self.tokens.get(self.pos - 1).map(|t| t.line);
        let mut keys = HashSet::new();
        loop {
            self.skip_newlines();
            match self.peek() {
                None => {
                    return Err(DecodeError::new(
                        format!("Missing '{}'", close as char),
                        open_line,
                    ))
                }
                Some(Tok::Close(c)) if c == close => {
                    self.pos += 1;
                    return Ok(());
                }
                _ => {}
            }
            let line = self.line();
            let key = self.inline_value()?;
            if matches!(self.peek(), Some(Tok::Colon | Tok::Equals)) {
                self.insert_key(key, line, &mut keys)?;
                self.pos += 1;
                self.skip_newlines();
                if !matches!(self.peek(), Some(Tok::Comma | Tok::Close(_))) {
                    self.inline_value()?;
                }
            }
            let separated = self.skip_newlines();
            match self.peek() {
                Some(Tok::Comma) => self.pos += 1,
                Some(Tok::Close(c)) if c == close => {}
                None => {}
                _ if separated => {}
                _ => return Err(self.unexpected()),
            }
        }
    }
}
