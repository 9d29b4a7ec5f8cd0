//! Pull-based markup scanner.
//!
//! A multi-mode state machine over a [`CharSource`] with one character of
//! pushback. Each call to [`Scanner::next_token`] classifies exactly one
//! token and may switch the scanning mode. The scanner never fails: broken
//! constructs surface as [`Token::Error`] or [`Token::EndOfInput`] and
//! scanning can always continue.

use super::dialect::ScannerConfig;
use super::entities::resolve_reference;
use super::source::CharSource;
use super::token::{Token, TokenBuf};

/// Longest entity name collected after `&` before giving up.
const MAX_ENTITY_LEN: usize = 31;

// ---------------------------------------------------------------------------
// Modes
// ---------------------------------------------------------------------------

/// What the scanner is in the middle of.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Attributes of an opening tag.
    Head,
    /// Ordinary text.
    Body,
    /// Tag name right after `<`.
    Tag,
    /// Verbatim content of a raw-text element.
    RawBody,
    Comment,
    CData,
    ProcessingInstruction,
    EntityDeclaration,
    DoctypeDeclaration,
}

impl Mode {
    /// Name used in diagnostics.
    pub fn describe(self) -> &'static str {
        match self {
            Mode::Head => "tag head",
            Mode::Body => "text",
            Mode::Tag => "tag name",
            Mode::RawBody => "raw text element",
            Mode::Comment => "comment",
            Mode::CData => "CDATA section",
            Mode::ProcessingInstruction => "processing instruction",
            Mode::EntityDeclaration => "entity declaration",
            Mode::DoctypeDeclaration => "doctype declaration",
        }
    }
}

fn is_space(c: char) -> bool {
    c.is_ascii_whitespace()
}

fn is_cjk(c: char) -> bool {
    ('\u{4E00}'..='\u{9FCC}').contains(&c)
}

fn ends_with_ignore_case(text: &str, marker: &str) -> bool {
    let (t, m) = (text.as_bytes(), marker.as_bytes());
    t.len() >= m.len() && t[t.len() - m.len()..].eq_ignore_ascii_case(m)
}

// ---------------------------------------------------------------------------
// Scanner
// ---------------------------------------------------------------------------

/// Tokenizer over a borrowed or owned character source.
pub struct Scanner<S> {
    source: S,
    mode: Mode,
    /// Two-phase modes: payload emitted, closing token due next.
    tail_pending: bool,
    pending: Option<char>,
    value: String,
    attr_name: String,
    tag_name: String,
    /// Closing marker (`</name>`) of the raw-text element being scanned.
    raw_end: String,
    position: usize,
    raw_text_tags: Vec<String>,
}

impl<'a> Scanner<std::str::Chars<'a>> {
    /// Scan a string slice.
    pub fn from_text(input: &'a str, config: &ScannerConfig) -> Self {
        Self::new(input.chars(), config)
    }
}

impl<S: CharSource> Scanner<S> {
    pub fn new(source: S, config: &ScannerConfig) -> Self {
        Self {
            source,
            mode: Mode::Body,
            tail_pending: false,
            pending: None,
            value: String::new(),
            attr_name: String::new(),
            tag_name: String::new(),
            raw_end: String::new(),
            position: 0,
            raw_text_tags: config.raw_text_tags.clone(),
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Characters consumed so far, not counting a pushed-back one.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Classify the next token.
    pub fn next_token(&mut self) -> Token<'_> {
        match self.mode {
            Mode::Body => self.scan_body(),
            Mode::Head => self.scan_head(),
            Mode::Tag => self.scan_tag(),
            Mode::RawBody => self.scan_raw_body(),
            Mode::Comment => self.scan_marked(Token::CommentEnd, "-->"),
            Mode::CData => self.scan_marked(Token::CDataEnd, "]]>"),
            Mode::ProcessingInstruction => self.scan_marked(Token::ProcessingInstructionEnd, "?>"),
            Mode::EntityDeclaration => self.scan_declaration(Token::EntityDeclEnd),
            Mode::DoctypeDeclaration => self.scan_declaration(Token::DoctypeEnd),
        }
    }

    /// Drain the scanner. The result always ends with `EndOfInput`; `Error`
    /// tokens are kept and scanning continues past them.
    pub fn tokenize(&mut self) -> Vec<TokenBuf> {
        let mut out = Vec::new();
        loop {
            let tok = self.next_token().to_buf();
            let done = tok == TokenBuf::EndOfInput;
            out.push(tok);
            if done {
                return out;
            }
        }
    }

    // -----------------------------------------------------------------------
    // Character plumbing
    // -----------------------------------------------------------------------

    fn get_char(&mut self) -> Option<char> {
        let c = self.pending.take().or_else(|| self.source.next_char());
        if c.is_some() {
            self.position += 1;
        }
        c
    }

    fn push_back(&mut self, c: char) {
        debug_assert!(self.pending.is_none(), "pushback slot already full");
        self.pending = Some(c);
        self.position -= 1;
    }

    fn skip_whitespace(&mut self) -> Option<char> {
        loop {
            match self.get_char() {
                Some(c) if is_space(c) => continue,
                other => return other,
            }
        }
    }

    fn append_value(&mut self, c: char) {
        self.source.append_char(c, &mut self.value);
    }

    // -----------------------------------------------------------------------
    // Body
    // -----------------------------------------------------------------------

    fn scan_body(&mut self) -> Token<'_> {
        self.value.clear();
        let first = match self.get_char() {
            None => return Token::EndOfInput,
            Some('<') => return self.scan_tag(),
            Some('&') => self.scan_entity(),
            Some(c) => Some(c),
        };

        if let Some(c) = first {
            self.append_value(c);
            if is_space(c) {
                return Token::Space(&self.value);
            }
            if is_cjk(c) {
                return Token::Word(&self.value);
            }
        }

        loop {
            let Some(c) = self.get_char() else {
                break;
            };
            if c == '<' || c == '&' || is_space(c) {
                self.push_back(c);
                break;
            }
            self.append_value(c);
            if is_cjk(c) {
                break;
            }
        }
        Token::Word(&self.value)
    }

    /// Resolve a reference after `&`. `None` means it did not resolve and
    /// its literal text has been appended to the value buffer.
    fn scan_entity(&mut self) -> Option<char> {
        let mut name = String::new();
        let mut terminated = false;
        let mut truncated = false;
        for _ in 0..MAX_ENTITY_LEN {
            match self.get_char() {
                Some(';') => {
                    terminated = true;
                    break;
                },
                Some(c) if c.is_ascii_alphanumeric() || c == '#' => name.push(c),
                Some(c) => {
                    self.push_back(c);
                    break;
                },
                None => {
                    truncated = true;
                    break;
                },
            }
        }

        if !truncated && let Some(c) = resolve_reference(&name) {
            return Some(c);
        }
        self.value.push('&');
        self.value.push_str(&name);
        if terminated {
            self.value.push(';');
        }
        None
    }

    // -----------------------------------------------------------------------
    // Tags
    // -----------------------------------------------------------------------

    /// Called with `<` consumed.
    fn scan_tag(&mut self) -> Token<'_> {
        self.mode = Mode::Tag;
        self.tag_name.clear();
        self.attr_name.clear();
        self.value.clear();

        let mut c = self.get_char();
        let closing = c == Some('/');
        if closing {
            c = self.get_char();
        }

        while let Some(ch) = c {
            if is_space(ch) {
                c = self.skip_whitespace();
                break;
            }
            if ch == '/' || ch == '>' {
                break;
            }
            self.source.append_char(ch, &mut self.tag_name);
            if let Some(tok) = self.declaration_start() {
                return tok;
            }
            c = self.get_char();
        }

        let Some(ch) = c else {
            self.mode = Mode::Body;
            return Token::Error;
        };
        if closing {
            self.mode = Mode::Body;
            if ch == '>' {
                return Token::TagEnd(&self.tag_name);
            }
            return Token::Error;
        }
        self.push_back(ch);
        self.mode = Mode::Head;
        Token::TagStart(&self.tag_name)
    }

    /// Switch into a declaration mode when the tag name so far is one of
    /// the fixed prefixes.
    fn declaration_start(&mut self) -> Option<Token<'static>> {
        let name = self.tag_name.as_str();
        let (mode, token) = match name.len() {
            1 if name == "?" => (Mode::ProcessingInstruction, Token::ProcessingInstructionStart),
            3 if name == "!--" => (Mode::Comment, Token::CommentStart),
            7 if name == "!ENTITY" => (Mode::EntityDeclaration, Token::EntityDeclStart),
            8 if name == "![CDATA[" => (Mode::CData, Token::CDataStart),
            8 if name.eq_ignore_ascii_case("!DOCTYPE") => {
                (Mode::DoctypeDeclaration, Token::DoctypeStart)
            },
            _ => return None,
        };
        self.mode = mode;
        self.tail_pending = false;
        Some(token)
    }

    /// Attributes of an opening tag, one per call, or the tag terminator.
    fn scan_head(&mut self) -> Token<'_> {
        self.attr_name.clear();
        self.value.clear();

        let Some(mut c) = self.skip_whitespace() else {
            return Token::EndOfInput;
        };

        if c == '>' {
            if self.is_raw_text_tag() {
                self.raw_end = format!("</{}>", self.tag_name);
                self.mode = Mode::RawBody;
                self.tail_pending = false;
                return self.scan_raw_body();
            }
            self.mode = Mode::Body;
            return self.scan_body();
        }

        if c == '/' {
            return match self.get_char() {
                Some('>') => {
                    self.mode = Mode::Body;
                    Token::TagEndEmpty(&self.tag_name)
                },
                Some(other) => {
                    self.push_back(other);
                    Token::Error
                },
                None => Token::Error,
            };
        }

        // attribute name
        while c != '=' {
            if c == '>' {
                self.push_back(c);
                return self.attribute();
            }
            if is_space(c) {
                match self.skip_whitespace() {
                    Some('=') => break,
                    Some(next) => {
                        self.push_back(next);
                        return self.attribute();
                    },
                    None => return self.attribute(),
                }
            }
            if c == '<' {
                return Token::Error;
            }
            self.source.append_char(c, &mut self.attr_name);
            match self.get_char() {
                Some(next) => c = next,
                None => return Token::EndOfInput,
            }
        }

        // attribute value
        match self.skip_whitespace() {
            Some(quote @ ('"' | '\'')) => {
                while let Some(c) = self.get_char() {
                    if c == quote {
                        return self.attribute();
                    }
                    if c == '&' {
                        if let Some(resolved) = self.scan_entity() {
                            self.append_value(resolved);
                        }
                        continue;
                    }
                    self.append_value(c);
                }
                Token::Error
            },
            Some(first) => {
                let mut c = first;
                loop {
                    if is_space(c) {
                        return self.attribute();
                    }
                    if c == '>' {
                        self.push_back(c);
                        return self.attribute();
                    }
                    self.append_value(c);
                    match self.get_char() {
                        Some(next) => c = next,
                        None => return Token::Error,
                    }
                }
            },
            None => Token::Error,
        }
    }

    fn attribute(&self) -> Token<'_> {
        Token::Attribute {
            name: &self.attr_name,
            value: &self.value,
        }
    }

    fn is_raw_text_tag(&self) -> bool {
        self.raw_text_tags
            .iter()
            .any(|t| t.eq_ignore_ascii_case(&self.tag_name))
    }

    // -----------------------------------------------------------------------
    // Two-phase modes
    // -----------------------------------------------------------------------

    /// Leave a two-phase mode if its payload has already been emitted.
    fn take_tail(&mut self) -> bool {
        if !self.tail_pending {
            return false;
        }
        self.tail_pending = false;
        self.mode = Mode::Body;
        true
    }

    fn scan_raw_body(&mut self) -> Token<'_> {
        if self.take_tail() {
            return Token::TagEnd(&self.tag_name);
        }
        self.value.clear();
        loop {
            let Some(c) = self.get_char() else {
                return Token::EndOfInput;
            };
            self.append_value(c);
            if ends_with_ignore_case(&self.value, &self.raw_end) {
                let keep = self.value.len() - self.raw_end.len();
                self.value.truncate(keep);
                self.tail_pending = true;
                return Token::Data(&self.value);
            }
        }
    }

    /// Comment, CDATA and processing instruction bodies, which end at a
    /// fixed marker.
    fn scan_marked(&mut self, end: Token<'static>, marker: &str) -> Token<'_> {
        if self.take_tail() {
            return end;
        }
        self.value.clear();
        loop {
            let Some(c) = self.get_char() else {
                return Token::EndOfInput;
            };
            self.append_value(c);
            if self.value.ends_with(marker) {
                let keep = self.value.len() - marker.len();
                self.value.truncate(keep);
                self.tail_pending = true;
                return Token::Data(&self.value);
            }
        }
    }

    /// Doctype and entity declarations: `>` only ends the payload outside a
    /// double-quoted literal.
    fn scan_declaration(&mut self, end: Token<'static>) -> Token<'_> {
        if self.take_tail() {
            return end;
        }
        self.value.clear();
        let mut quotes = 0usize;
        loop {
            let Some(c) = self.get_char() else {
                return Token::EndOfInput;
            };
            if c == '"' {
                quotes += 1;
            } else if c == '>' && quotes % 2 == 0 {
                self.tail_pending = true;
                return Token::Data(&self.value);
            }
            self.append_value(c);
        }
    }
}
