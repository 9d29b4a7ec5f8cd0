//! Token model produced by the scanner.

use std::fmt;

// ------------------------------------------------------------------
// Borrowed tokens
// ------------------------------------------------------------------

/// One classified unit of markup.
///
/// Text fields borrow the scanner's buffers, so a token is only valid until
/// the next call to [`Scanner::next_token`](super::scanner::Scanner::next_token).
/// Use [`Token::to_buf`] to keep one around.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token<'a> {
    EndOfInput,
    Error,
    TagStart(&'a str),
    TagEnd(&'a str),
    TagEndEmpty(&'a str),
    Attribute { name: &'a str, value: &'a str },
    Word(&'a str),
    Space(&'a str),
    Data(&'a str),
    CommentStart,
    CommentEnd,
    CDataStart,
    CDataEnd,
    ProcessingInstructionStart,
    ProcessingInstructionEnd,
    DoctypeStart,
    DoctypeEnd,
    EntityDeclStart,
    EntityDeclEnd,
}

/// Discriminant of a [`Token`] without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    EndOfInput,
    Error,
    TagStart,
    TagEnd,
    TagEndEmpty,
    Attribute,
    Word,
    Space,
    Data,
    CommentStart,
    CommentEnd,
    CDataStart,
    CDataEnd,
    ProcessingInstructionStart,
    ProcessingInstructionEnd,
    DoctypeStart,
    DoctypeEnd,
    EntityDeclStart,
    EntityDeclEnd,
}

impl Token<'_> {
    pub fn kind(&self) -> TokenKind {
        match self {
            Token::EndOfInput => TokenKind::EndOfInput,
            Token::Error => TokenKind::Error,
            Token::TagStart(_) => TokenKind::TagStart,
            Token::TagEnd(_) => TokenKind::TagEnd,
            Token::TagEndEmpty(_) => TokenKind::TagEndEmpty,
            Token::Attribute { .. } => TokenKind::Attribute,
            Token::Word(_) => TokenKind::Word,
            Token::Space(_) => TokenKind::Space,
            Token::Data(_) => TokenKind::Data,
            Token::CommentStart => TokenKind::CommentStart,
            Token::CommentEnd => TokenKind::CommentEnd,
            Token::CDataStart => TokenKind::CDataStart,
            Token::CDataEnd => TokenKind::CDataEnd,
            Token::ProcessingInstructionStart => TokenKind::ProcessingInstructionStart,
            Token::ProcessingInstructionEnd => TokenKind::ProcessingInstructionEnd,
            Token::DoctypeStart => TokenKind::DoctypeStart,
            Token::DoctypeEnd => TokenKind::DoctypeEnd,
            Token::EntityDeclStart => TokenKind::EntityDeclStart,
            Token::EntityDeclEnd => TokenKind::EntityDeclEnd,
        }
    }

    /// Copy the token's text out of the scanner buffers.
    pub fn to_buf(&self) -> TokenBuf {
        match *self {
            Token::EndOfInput => TokenBuf::EndOfInput,
            Token::Error => TokenBuf::Error,
            Token::TagStart(name) => TokenBuf::TagStart(name.to_string()),
            Token::TagEnd(name) => TokenBuf::TagEnd(name.to_string()),
            Token::TagEndEmpty(name) => TokenBuf::TagEndEmpty(name.to_string()),
            Token::Attribute { name, value } => TokenBuf::Attribute {
                name: name.to_string(),
                value: value.to_string(),
            },
            Token::Word(text) => TokenBuf::Word(text.to_string()),
            Token::Space(text) => TokenBuf::Space(text.to_string()),
            Token::Data(text) => TokenBuf::Data(text.to_string()),
            Token::CommentStart => TokenBuf::CommentStart,
            Token::CommentEnd => TokenBuf::CommentEnd,
            Token::CDataStart => TokenBuf::CDataStart,
            Token::CDataEnd => TokenBuf::CDataEnd,
            Token::ProcessingInstructionStart => TokenBuf::ProcessingInstructionStart,
            Token::ProcessingInstructionEnd => TokenBuf::ProcessingInstructionEnd,
            Token::DoctypeStart => TokenBuf::DoctypeStart,
            Token::DoctypeEnd => TokenBuf::DoctypeEnd,
            Token::EntityDeclStart => TokenBuf::EntityDeclStart,
            Token::EntityDeclEnd => TokenBuf::EntityDeclEnd,
        }
    }
}

// ------------------------------------------------------------------
// Owned tokens
// ------------------------------------------------------------------

/// Owned counterpart of [`Token`], for collecting a token stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenBuf {
    EndOfInput,
    Error,
    TagStart(String),
    TagEnd(String),
    TagEndEmpty(String),
    Attribute { name: String, value: String },
    Word(String),
    Space(String),
    Data(String),
    CommentStart,
    CommentEnd,
    CDataStart,
    CDataEnd,
    ProcessingInstructionStart,
    ProcessingInstructionEnd,
    DoctypeStart,
    DoctypeEnd,
    EntityDeclStart,
    EntityDeclEnd,
}

impl TokenBuf {
    /// Borrow this token back as a [`Token`].
    pub fn as_token(&self) -> Token<'_> {
        match self {
            TokenBuf::EndOfInput => Token::EndOfInput,
            TokenBuf::Error => Token::Error,
            TokenBuf::TagStart(name) => Token::TagStart(name),
            TokenBuf::TagEnd(name) => Token::TagEnd(name),
            TokenBuf::TagEndEmpty(name) => Token::TagEndEmpty(name),
            TokenBuf::Attribute { name, value } => Token::Attribute { name, value },
            TokenBuf::Word(text) => Token::Word(text),
            TokenBuf::Space(text) => Token::Space(text),
            TokenBuf::Data(text) => Token::Data(text),
            TokenBuf::CommentStart => Token::CommentStart,
            TokenBuf::CommentEnd => Token::CommentEnd,
            TokenBuf::CDataStart => Token::CDataStart,
            TokenBuf::CDataEnd => Token::CDataEnd,
            TokenBuf::ProcessingInstructionStart => Token::ProcessingInstructionStart,
            TokenBuf::ProcessingInstructionEnd => Token::ProcessingInstructionEnd,
            TokenBuf::DoctypeStart => Token::DoctypeStart,
            TokenBuf::DoctypeEnd => Token::DoctypeEnd,
            TokenBuf::EntityDeclStart => Token::EntityDeclStart,
            TokenBuf::EntityDeclEnd => Token::EntityDeclEnd,
        }
    }

    pub fn kind(&self) -> TokenKind {
        self.as_token().kind()
    }
}

impl fmt::Display for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::TagStart(name) => write!(f, "TagStart({name:?})"),
            Token::TagEnd(name) => write!(f, "TagEnd({name:?})"),
            Token::TagEndEmpty(name) => write!(f, "TagEndEmpty({name:?})"),
            Token::Attribute { name, value } => write!(f, "Attribute({name:?}={value:?})"),
            Token::Word(text) => write!(f, "Word({text:?})"),
            Token::Space(text) => write!(f, "Space({text:?})"),
            Token::Data(text) => write!(f, "Data({text:?})"),
            other => write!(f, "{:?}", other.kind()),
        }
    }
}

impl fmt::Display for TokenBuf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.as_token(), f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_ignores_payload() {
        assert_eq!(Token::Word("a").kind(), TokenKind::Word);
        assert_eq!(
            Token::Attribute { name: "x", value: "" }.kind(),
            TokenKind::Attribute
        );
        assert_eq!(Token::DoctypeEnd.kind(), TokenKind::DoctypeEnd);
    }

    #[test]
    fn buf_roundtrips_through_borrow() {
        let tok = Token::Attribute {
            name: "href",
            value: "/a?b=c",
        };
        let owned = tok.to_buf();
        assert_eq!(owned.as_token(), tok);
        assert_eq!(owned.kind(), TokenKind::Attribute);
    }

    #[test]
    fn display_shows_payload() {
        assert_eq!(Token::TagStart("div").to_string(), "TagStart(\"div\")");
        assert_eq!(Token::Space("\n").to_string(), "Space(\"\\n\")");
        assert_eq!(Token::CommentEnd.to_string(), "CommentEnd");
        assert_eq!(
            TokenBuf::Attribute {
                name: "id".into(),
                value: "x".into()
            }
            .to_string(),
            "Attribute(\"id\"=\"x\")"
        );
    }
}
