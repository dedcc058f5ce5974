//! Minimal PHP lexer used by the token-aware tasks.
//!
//! The lexer only distinguishes what the checks need: comments, string
//! literal bodies, heredoc openers, whitespace, and everything else. It never
//! fails; unterminated constructs run to the end of input. Concatenating the
//! text of all tokens always reproduces the input.
//!
//! Scanning is byte-oriented. Every delimiter is ASCII and runs of non-ASCII
//! bytes are consumed whole, so token boundaries always fall on `char`
//! boundaries of the source `&str`.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Flavor of a string literal token.
pub enum StringStyle {
    /// `'...'`, quotes included.
    SingleQuoted,
    /// `"..."` without interpolation, quotes included.
    DoubleQuoted,
    /// Literal run of an interpolating string (double-quoted, backtick or
    /// heredoc), without delimiters.
    Interpolated,
    /// Body of a `<<<'ID'` nowdoc.
    Nowdoc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Comment,
    StringLiteral(StringStyle),
    HeredocStart,
    Whitespace,
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub text: &'a str,
    /// 1-based line on which the token starts.
    pub line: usize,
}

/// Tokenize PHP source, including any inline HTML around the code blocks.
pub fn tokenize(source: &str) -> Vec<Token<'_>> {
    let mut lexer = Lexer::new(source);
    lexer.run();
    lexer.tokens
}

/// Interpolations nested deeper than this end lexing; the rest of the input
/// becomes one `Other` token.
const MAX_NESTING: usize = 200;

#[derive(Clone, Copy)]
enum Closer<'l> {
    Quote(u8),
    Label(&'l [u8]),
}

struct Lexer<'a> {
    src: &'a str,
    bytes: &'a [u8],
    pos: usize,
    line: usize,
    nesting: usize,
    tokens: Vec<Token<'a>>,
}

fn is_ident_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_' || b >= 0x80
}

fn is_ident(b: u8) -> bool {
    is_ident_start(b) || b.is_ascii_digit()
}

impl<'a> Lexer<'a> {
    fn new(src: &'a str) -> Self {
        Self {
            src,
            bytes: src.as_bytes(),
            pos: 0,
            line: 1,
            nesting: 0,
            tokens: Vec::new(),
        }
    }

    fn at(&self, i: usize) -> u8 {
        self.bytes.get(i).copied().unwrap_or(0)
    }

    fn starts_with(&self, i: usize, s: &[u8]) -> bool {
        self.bytes.get(i..).is_some_and(|rest| rest.starts_with(s))
    }

    fn emit(&mut self, kind: TokenKind, end: usize) {
        let end = end.min(self.bytes.len());
        if end <= self.pos {
            return;
        }
        let text = &self.src[self.pos..end];
        self.tokens.push(Token {
            kind,
            text,
            line: self.line,
        });
        self.line += text.bytes().filter(|b| *b == b'\n').count();
        self.pos = end;
    }

    fn run(&mut self) {
        while self.pos < self.bytes.len() {
            self.inline_html();
            if self.pos < self.bytes.len() {
                self.code(false);
            }
        }
    }

    /// Emit everything up to and including the next open tag.
    fn inline_html(&mut self) {
        let mut i = self.pos;
        while i < self.bytes.len() {
            if self.starts_with(i, b"<?") {
                let tag_end = if self.starts_with(i + 2, b"=") {
                    Some(i + 3)
                } else if self.bytes.len() >= i + 5
                    && self.bytes[i + 2..i + 5].eq_ignore_ascii_case(b"php")
                    && (i + 5 == self.bytes.len() || self.at(i + 5).is_ascii_whitespace())
                {
                    Some(self.whitespace_after(i + 5))
                } else if self.at(i + 2).is_ascii_whitespace() {
                    Some(self.whitespace_after(i + 2))
                } else {
                    None
                };
                if let Some(end) = tag_end {
                    self.emit(TokenKind::Other, i);
                    self.emit(TokenKind::Other, end);
                    return;
                }
            }
            i += 1;
        }
        self.emit(TokenKind::Other, self.bytes.len());
    }

    /// Open tags swallow one following whitespace character (CRLF counts as one).
    fn whitespace_after(&self, i: usize) -> usize {
        if self.starts_with(i, b"\r\n") {
            i + 2
        } else if self.at(i).is_ascii_whitespace() {
            i + 1
        } else {
            i
        }
    }

    /// Lex code until `?>` or, when `nested`, until the `}` closing an
    /// interpolation.
    fn code(&mut self, nested: bool) {
        let mut depth = 0usize;
        while self.pos < self.bytes.len() {
            let start = self.pos;
            match self.at(start) {
                b' ' | b'\t' | b'\r' | b'\n' => {
                    let mut i = start;
                    while matches!(self.at(i), b' ' | b'\t' | b'\r' | b'\n') {
                        i += 1;
                    }
                    self.emit(TokenKind::Whitespace, i);
                }
                b'?' if !nested && self.at(start + 1) == b'>' => {
                    let mut end = start + 2;
                    if self.starts_with(end, b"\r\n") {
                        end += 2;
                    } else if self.at(end) == b'\n' {
                        end += 1;
                    }
                    self.emit(TokenKind::Other, end);
                    return;
                }
                b'#' if self.at(start + 1) == b'[' => self.emit(TokenKind::Other, start + 2),
                b'#' => self.line_comment(nested),
                b'/' if self.at(start + 1) == b'/' => self.line_comment(nested),
                b'/' if self.at(start + 1) == b'*' => {
                    let end = self.src[start + 2..]
                        .find("*/")
                        .map_or(self.bytes.len(), |i| start + 2 + i + 2);
                    self.emit(TokenKind::Comment, end);
                }
                b'\'' => self.single_quoted(),
                b'"' => self.double_quoted(),
                b'`' => {
                    self.emit(TokenKind::Other, start + 1);
                    self.interpolated(Closer::Quote(b'`'), start + 1);
                }
                b'<' if self.starts_with(start, b"<<<") => {
                    if !self.heredoc() {
                        self.emit(TokenKind::Other, start + 1);
                    }
                }
                b'{' => {
                    depth += 1;
                    self.emit(TokenKind::Other, start + 1);
                }
                b'}' => {
                    self.emit(TokenKind::Other, start + 1);
                    if depth == 0 {
                        if nested {
                            return;
                        }
                    } else {
                        depth -= 1;
                    }
                }
                b if is_ident(b) || b == b'$' || b == b'\\' => {
                    let mut i = start + 1;
                    while is_ident(self.at(i)) || matches!(self.at(i), b'$' | b'\\') {
                        i += 1;
                    }
                    self.emit(TokenKind::Other, i);
                }
                _ => self.emit(TokenKind::Other, start + 1),
            }
        }
    }

    fn line_comment(&mut self, nested: bool) {
        let mut i = self.pos;
        while i < self.bytes.len() && self.bytes[i] != b'\n' {
            if !nested && self.starts_with(i, b"?>") {
                break;
            }
            if self.starts_with(i, b"\r\n") {
                break;
            }
            i += 1;
        }
        self.emit(TokenKind::Comment, i);
    }

    fn single_quoted(&mut self) {
        let mut i = self.pos + 1;
        while i < self.bytes.len() {
            match self.bytes[i] {
                b'\\' => i += 2,
                b'\'' => {
                    i += 1;
                    break;
                }
                _ => i += 1,
            }
        }
        self.emit(TokenKind::StringLiteral(StringStyle::SingleQuoted), i);
    }

    fn double_quoted(&mut self) {
        let start = self.pos;
        let mut i = start + 1;
        loop {
            if i >= self.bytes.len() {
                self.emit(TokenKind::StringLiteral(StringStyle::DoubleQuoted), i);
                return;
            }
            match self.bytes[i] {
                b'\\' => i += 2,
                b'"' => {
                    self.emit(TokenKind::StringLiteral(StringStyle::DoubleQuoted), i + 1);
                    return;
                }
                _ if self.interpolation_at(i) => break,
                _ => i += 1,
            }
        }
        self.emit(TokenKind::Other, start + 1);
        self.interpolated(Closer::Quote(b'"'), start + 1);
    }

    fn interpolation_at(&self, i: usize) -> bool {
        match self.at(i) {
            b'$' => is_ident_start(self.at(i + 1)) || self.at(i + 1) == b'{',
            b'{' => self.at(i + 1) == b'$',
            _ => false,
        }
    }

    /// Lex the body of an interpolating string, then its closing delimiter.
    fn interpolated(&mut self, closer: Closer<'_>, body_start: usize) {
        const SEGMENT: TokenKind = TokenKind::StringLiteral(StringStyle::Interpolated);
        let mut i = self.pos;
        while i < self.bytes.len() {
            match closer {
                Closer::Quote(q) if self.bytes[i] == q => {
                    self.emit(SEGMENT, i);
                    self.emit(TokenKind::Other, i + 1);
                    return;
                }
                Closer::Label(label) if i == body_start || self.bytes[i - 1] == b'\n' => {
                    if let Some(end) = self.closing_label_at(i, label) {
                        self.emit(SEGMENT, i);
                        self.emit(TokenKind::Other, end);
                        return;
                    }
                }
                _ => {}
            }
            if self.bytes[i] == b'\\' {
                i += 2;
            } else if self.interpolation_at(i) {
                self.emit(SEGMENT, i);
                self.interpolation();
                i = self.pos;
            } else {
                i += 1;
            }
        }
        self.emit(SEGMENT, i);
    }

    fn interpolation(&mut self) {
        let start = self.pos;
        let opener = if self.at(start) == b'{' {
            Some(start + 1)
        } else if self.at(start + 1) == b'{' {
            Some(start + 2)
        } else {
            None
        };
        if let Some(end) = opener {
            if self.nesting >= MAX_NESTING {
                self.emit(TokenKind::Other, self.bytes.len());
                return;
            }
            self.emit(TokenKind::Other, end);
            self.nesting += 1;
            self.code(true);
            self.nesting -= 1;
            return;
        }
        let mut i = start + 1;
        while is_ident(self.at(i)) {
            i += 1;
        }
        if self.at(i) == b'[' {
            if let Some(close) = self.bytes[i..]
                .iter()
                .position(|b| matches!(b, b']' | b'"' | b'\n'))
                .filter(|off| self.bytes[i + off] == b']')
            {
                i += close + 1;
            }
        } else if self.starts_with(i, b"->") && is_ident_start(self.at(i + 2)) {
            i += 2;
            while is_ident(self.at(i)) {
                i += 1;
            }
        }
        self.emit(TokenKind::Other, i);
    }

    /// Returns the end of a closing heredoc label starting at line start `i`.
    fn closing_label_at(&self, i: usize, label: &[u8]) -> Option<usize> {
        let mut j = i;
        while matches!(self.at(j), b' ' | b'\t') {
            j += 1;
        }
        if self.starts_with(j, label) && !is_ident(self.at(j + label.len())) {
            Some(j + label.len())
        } else {
            None
        }
    }

    /// Lex a heredoc or nowdoc. Returns false when `<<<` does not open one.
    fn heredoc(&mut self) -> bool {
        let start = self.pos;
        let mut i = start + 3;
        while matches!(self.at(i), b' ' | b'\t') {
            i += 1;
        }
        let quote = match self.at(i) {
            q @ (b'\'' | b'"') => {
                i += 1;
                Some(q)
            }
            _ => None,
        };
        if !is_ident_start(self.at(i)) {
            return false;
        }
        let label_start = i;
        while is_ident(self.at(i)) {
            i += 1;
        }
        let label_end = i;
        if let Some(q) = quote {
            if self.at(i) != q {
                return false;
            }
            i += 1;
        }
        if self.starts_with(i, b"\r\n") {
            i += 2;
        } else if self.at(i) == b'\n' {
            i += 1;
        } else {
            return false;
        }

        let bytes = self.bytes;
        let label = &bytes[label_start..label_end];
        self.emit(TokenKind::HeredocStart, i);
        if quote == Some(b'\'') {
            self.nowdoc_body(label);
        } else {
            self.interpolated(Closer::Label(label), i);
        }
        true
    }

    fn nowdoc_body(&mut self, label: &[u8]) {
        let mut i = self.pos;
        loop {
            if let Some(end) = self.closing_label_at(i, label) {
                self.emit(TokenKind::StringLiteral(StringStyle::Nowdoc), i);
                self.emit(TokenKind::Other, end);
                return;
            }
            match self.bytes[i..].iter().position(|b| *b == b'\n') {
                Some(nl) => i += nl + 1,
                None => {
                    self.emit(
                        TokenKind::StringLiteral(StringStyle::Nowdoc),
                        self.bytes.len(),
                    );
                    return;
                }
            }
        }
    }
}
