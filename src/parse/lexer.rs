//! POSIX-mode shell word lexer over `declare -p` / `declare -f` output.
//!
//! Words are runs of letters, digits, `_` and `-` (so package identifiers such
//! as `py3-foo` stay whole), with quote removal applied. Every other unquoted
//! character is returned as a one-character punctuation token.
//!
//! Here-document bodies (`<<EOF` … `EOF`) are skipped as raw text, so an
//! apostrophe inside one does not open a quote.

use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// A word after quote removal. May be empty (`""`).
    Word,
    /// A single unquoted non-word character such as `(`, `=` or `$`.
    Punct,
    /// The body of a `$'...'` string, backslash escapes kept raw.
    AnsiC,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub text: String,
    pub kind: TokenKind,
    /// Byte offset of the first character of the token in the input.
    pub start: usize,
    /// 1-based line the token starts on.
    pub line: usize,
}

impl Token {
    /// True if this is the unquoted punctuation character `c`.
    pub fn is_punct(&self, c: char) -> bool {
        self.kind == TokenKind::Punct && self.text.starts_with(c)
    }
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '-'
}

fn is_blank(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\r' | '\n')
}

pub struct Lexer<'a> {
    input: &'a str,
    pos: usize,
    line: usize,
    pushed: Option<Token>,
    /// The last lexed token was a `$` ending at `pos`.
    after_dollar: bool,
    /// Number of adjacent `<` tokens just lexed.
    angle_run: usize,
    /// The last lexed token was a `(` punct.
    after_open_paren: bool,
    /// Paren depth inside `((`...`))` or `$((`...`))`; 0 outside.
    arith_depth: usize,
    /// End offset of the last lexed token.
    last_end: usize,
    /// Here-document delimiters whose bodies start after the next newline.
    heredocs: Vec<(String, bool)>,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            line: 1,
            pushed: None,
            after_dollar: false,
            angle_run: 0,
            after_open_paren: false,
            arith_depth: 0,
            last_end: 0,
            heredocs: Vec::new(),
        }
    }

    /// Byte offset of the next unread character (after any pushed-back token).
    pub fn offset(&self) -> usize {
        self.pos
    }

    pub fn input(&self) -> &'a str {
        self.input
    }

    /// Return a token to the stream. Only one token of lookahead is kept.
    pub fn push_back(&mut self, token: Token) {
        debug_assert!(self.pushed.is_none(), "lexer lookahead slot already full");
        self.pushed = Some(token);
    }

    /// Next token, or `None` at end of input.
    pub fn next_token(&mut self) -> Result<Option<Token>> {
        if let Some(token) = self.pushed.take() {
            return Ok(Some(token));
        }

        let token = self.lex()?;
        if let Some(token) = &token {
            self.track_context(token);
            self.last_end = self.pos;
        }
        Ok(token)
    }

    fn lex(&mut self) -> Result<Option<Token>> {
        let ansi = self.after_dollar && self.peek() == Some('\'');
        self.after_dollar = false;
        self.skip_blank();

        let start = self.pos;
        let line = self.line;
        let Some(c) = self.peek() else {
            return Ok(None);
        };

        if is_word_char(c) || matches!(c, '\'' | '"' | '\\') {
            let text = self.read_word(ansi)?;
            let kind = if ansi { TokenKind::AnsiC } else { TokenKind::Word };
            return Ok(Some(Token {
                text,
                kind,
                start,
                line,
            }));
        }

        self.advance();
        self.after_dollar = c == '$';
        Ok(Some(Token {
            text: c.to_string(),
            kind: TokenKind::Punct,
            start,
            line,
        }))
    }

    fn track_context(&mut self, token: &Token) {
        let adjacent = token.start == self.last_end;
        if token.is_punct('(') {
            if self.arith_depth > 0 {
                self.arith_depth += 1;
            } else if self.after_open_paren && adjacent {
                self.arith_depth = 2;
            }
        } else if token.is_punct(')') {
            self.arith_depth = self.arith_depth.saturating_sub(1);
        }
        self.after_open_paren = token.is_punct('(');
        self.track_heredoc(token, adjacent);
    }

    /// Register `<<WORD` / `<<-WORD` delimiters. `<<<`, `<< 2` and any `<<`
    /// inside arithmetic are shifts or here-strings, not here-documents.
    fn track_heredoc(&mut self, token: &Token, adjacent: bool) {
        if token.is_punct('<') {
            self.angle_run = if self.angle_run > 0 && adjacent {
                self.angle_run + 1
            } else {
                1
            };
            return;
        }

        if self.angle_run == 2
            && self.arith_depth == 0
            && token.kind != TokenKind::Punct
            && !token.text.chars().all(|c| c.is_ascii_digit())
        {
            let (delimiter, strip_tabs) = match token.text.strip_prefix('-') {
                Some(rest) => (rest.to_string(), true),
                None => (token.text.clone(), false),
            };
            self.heredocs.push((delimiter, strip_tabs));
        }
        self.angle_run = 0;
    }

    /// The input line containing `offset`, trimmed.
    pub fn context(&self, offset: usize) -> &'a str {
        let offset = offset.min(self.input.len());
        let begin = self.input[..offset].rfind('\n').map_or(0, |i| i + 1);
        let end = self.input[offset..]
            .find('\n')
            .map_or(self.input.len(), |i| offset + i);
        self.input[begin..end].trim()
    }

    /// Build a syntax error pointing at `token`, or at the current position.
    pub fn error(&self, message: impl Into<String>, token: Option<&Token>) -> Error {
        match token {
            Some(t) => Error::syntax(message, self.context(t.start), t.line),
            None => Error::syntax(message, self.context(self.pos), self.line),
        }
    }

    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn peek_second(&self) -> Option<char> {
        self.input[self.pos..].chars().nth(1)
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        if c == '\n' {
            self.line += 1;
        }
        Some(c)
    }

    /// A `#` only starts a comment at the beginning of a word.
    fn at_word_start(&self) -> bool {
        self.input[..self.pos].chars().next_back().is_none_or(is_blank)
    }

    fn skip_blank(&mut self) {
        while let Some(c) = self.peek() {
            if is_blank(c) {
                self.advance();
                if c == '\n' && !self.heredocs.is_empty() {
                    self.skip_heredoc_bodies();
                }
            } else if c == '\\' && self.peek_second() == Some('\n') {
                self.advance();
                self.advance();
            } else if c == '#' && self.at_word_start() {
                while self.peek().is_some_and(|c| c != '\n') {
                    self.advance();
                }
            } else {
                break;
            }
        }
    }

    fn skip_heredoc_bodies(&mut self) {
        for (delimiter, strip_tabs) in std::mem::take(&mut self.heredocs) {
            while self.pos < self.input.len() {
                let rest = &self.input[self.pos..];
                let (line, len) = match rest.find('\n') {
                    Some(i) => (&rest[..i], i + 1),
                    None => (rest, rest.len()),
                };
                let line = if strip_tabs {
                    line.trim_start_matches('\t')
                } else {
                    line
                };
                let done = line == delimiter;
                if rest[..len].ends_with('\n') {
                    self.line += 1;
                }
                self.pos += len;
                if done {
                    break;
                }
            }
        }
    }

    fn read_word(&mut self, ansi: bool) -> Result<String> {
        let mut text = String::new();
        let mut first = true;
        while let Some(c) = self.peek() {
            match c {
                '\'' => {
                    self.advance();
                    self.read_single_quoted(&mut text, ansi && first)?;
                }
                '"' => {
                    self.advance();
                    self.read_double_quoted(&mut text)?;
                }
                '\\' => {
                    self.advance();
                    match self.advance() {
                        Some('\n') => {}
                        Some(escaped) => text.push(escaped),
                        None => return Err(self.error("No escaped character", None)),
                    }
                }
                c if is_word_char(c) => {
                    self.advance();
                    text.push(c);
                }
                _ => break,
            }
            first = false;
        }
        Ok(text)
    }

    fn read_single_quoted(&mut self, text: &mut String, ansi: bool) -> Result<()> {
        loop {
            match self.advance() {
                None => return Err(self.error("No closing quotation", None)),
                Some('\'') => return Ok(()),
                Some('\\') if ansi => {
                    text.push('\\');
                    match self.advance() {
                        Some(escaped) => text.push(escaped),
                        None => return Err(self.error("No closing quotation", None)),
                    }
                }
                Some(c) => text.push(c),
            }
        }
    }

    // `\$` stays escaped here; value::decode undoes it.
    fn read_double_quoted(&mut self, text: &mut String) -> Result<()> {
        loop {
            match self.advance() {
                None => return Err(self.error("No closing quotation", None)),
                Some('"') => return Ok(()),
                Some('\\') => match self.advance() {
                    Some('\n') => {}
                    Some(escaped @ ('"' | '\\' | '`')) => text.push(escaped),
                    Some(other) => {
                        text.push('\\');
                        text.push(other);
                    }
                    None => return Err(self.error("No closing quotation", None)),
                },
                Some(c) => text.push(c),
            }
        }
    }
}
