//! Element tree builder.
//!
//! Consumes scanner tokens and constructs an arena [`Document`]. Recovery
//! follows the rule tables of a [`Dialect`]: wrapper synthesis, omitted end
//! tags, stop-tag rules and end-tag boundaries. Nothing here fails in
//! lenient mode; malformed input always yields a tree.

use log::{debug, trace, warn};

use super::dialect::{Dialect, ParseOptions};
use super::dom::{Document, ElementData, NodeId, NodeKind};
use super::scanner::{Mode, Scanner};
use super::source::CharSource;
use super::token::Token;
use crate::error::{Result, SprigError};

/// Non-element construct whose payload is being collected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Special {
    Comment,
    CData,
    ProcessingInstruction,
    Doctype,
    EntityDecl,
}

// ------------------------------------------------------------------
// TreeBuilder
// ------------------------------------------------------------------

/// Builds a [`Document`] from a token stream.
pub struct TreeBuilder<'d> {
    doc: Document,
    dialect: &'d Dialect,
    options: ParseOptions,
    /// Stack of open element node IDs, root first.
    open_elements: Vec<NodeId>,
    root_element: Option<NodeId>,
    body_element: Option<NodeId>,
    /// Element whose tag head is still being scanned.
    pending: Option<ElementData>,
    special: Option<Special>,
    special_text: String,
}

impl<'d> TreeBuilder<'d> {
    pub fn new(dialect: &'d Dialect, options: ParseOptions) -> Self {
        Self {
            doc: Document::new(),
            dialect,
            options,
            open_elements: Vec::new(),
            root_element: None,
            body_element: None,
            pending: None,
            special: None,
            special_text: String::new(),
        }
    }

    // =============================================================
    // Token dispatch
    // =============================================================

    pub fn process_token(&mut self, token: Token<'_>) {
        trace!("token {token}");

        if let Token::Attribute { name, value } = token {
            match &mut self.pending {
                Some(element) => element.set_attribute(self.dialect.fold_name(name), value),
                None => debug!("attribute {name:?} outside a tag head"),
            }
            return;
        }
        self.commit_pending(matches!(token, Token::TagEndEmpty(_)));

        match token {
            Token::TagStart(name) => {
                self.pending = Some(ElementData::new(self.dialect.fold_name(name)));
            },
            Token::TagEnd(name) => {
                let name = self.dialect.fold_name(name);
                self.close_element(&name);
            },
            Token::Word(text) | Token::Space(text) => self.insert_text(text),
            Token::Data(text) => match self.special {
                Some(_) => self.special_text.push_str(text),
                None => self.insert_text(text),
            },
            Token::CommentStart => self.begin_special(Special::Comment),
            Token::CDataStart => self.begin_special(Special::CData),
            Token::ProcessingInstructionStart => {
                self.begin_special(Special::ProcessingInstruction)
            },
            Token::DoctypeStart => self.begin_special(Special::Doctype),
            Token::EntityDeclStart => self.begin_special(Special::EntityDecl),
            Token::CommentEnd
            | Token::CDataEnd
            | Token::ProcessingInstructionEnd
            | Token::DoctypeEnd
            | Token::EntityDeclEnd => self.end_special(),
            Token::TagEndEmpty(_)
            | Token::Attribute { .. }
            | Token::Error
            | Token::EndOfInput => {},
        }
    }

    /// Close out the parse: commit a pending element, make sure both
    /// wrappers exist and release the parse stack.
    pub fn finish(mut self) -> Document {
        self.commit_pending(false);
        if let Some(kind) = self.special.take() {
            debug!("dropping unterminated {kind:?}");
        }
        if self.body_element.is_none() {
            self.open_body(ElementData::new(self.dialect.body_tag.clone()));
        }
        self.open_elements.clear();
        self.doc
    }

    // =============================================================
    // Elements
    // =============================================================

    fn commit_pending(&mut self, self_closing: bool) {
        let Some(data) = self.pending.take() else {
            return;
        };
        if data.name.is_empty() {
            debug!("discarding element with empty tag name");
            return;
        }

        if data.name == self.dialect.root_tag {
            if self.root_element.is_some() {
                debug!("ignoring repeated <{}>", data.name);
            } else {
                self.open_root(data);
            }
            return;
        }
        if data.name == self.dialect.body_tag {
            if self.body_element.is_some() {
                debug!("ignoring repeated <{}>", data.name);
            } else {
                self.open_body(data);
            }
            return;
        }

        self.ensure_wrappers(Some(&data.name));
        self.apply_omitted_end_rules(&data.name);
        self.apply_stop_rules(&data.name);

        let leaf = self_closing || self.dialect.is_void(&data.name);
        let parent = self.current_node();
        let id = self.doc.add_node(NodeKind::Element(data));
        self.doc.append_child(parent, id);
        if !leaf {
            self.open_elements.push(id);
        }
    }

    fn open_root(&mut self, data: ElementData) {
        let id = self.doc.add_node(NodeKind::Element(data));
        self.doc.append_child(self.doc.root, id);
        self.open_elements.push(id);
        self.root_element = Some(id);
    }

    fn ensure_root(&mut self) -> NodeId {
        match self.root_element {
            Some(id) => id,
            None => {
                self.open_root(ElementData::new(self.dialect.root_tag.clone()));
                self.open_elements[0]
            },
        }
    }

    /// Open the body under the root, closing anything else still open
    /// there (such as an exempt `head`).
    fn open_body(&mut self, data: ElementData) {
        let root = self.ensure_root();
        self.open_elements.truncate(1);
        let id = self.doc.add_node(NodeKind::Element(data));
        self.doc.append_child(root, id);
        self.open_elements.push(id);
        self.body_element = Some(id);
        self.doc.body_element = Some(id);
    }

    /// Synthesize the root and body ahead of content. `name` is the tag
    /// about to open, or `None` for text.
    fn ensure_wrappers(&mut self, name: Option<&str>) {
        self.ensure_root();
        if self.body_element.is_some() {
            return;
        }
        if let Some(name) = name
            && self.dialect.is_body_exempt(name)
        {
            return;
        }
        // Content inside an exempt element stays there.
        if self.open_elements.len() > 1 {
            return;
        }
        debug!("synthesizing <{}>", self.dialect.body_tag);
        self.open_body(ElementData::new(self.dialect.body_tag.clone()));
    }

    fn apply_omitted_end_rules(&mut self, name: &str) {
        let floor = self.floor();
        while self.open_elements.len() > floor {
            let top = self.current_node();
            let Some(open) = self.doc.name(top) else {
                break;
            };
            if !self.dialect.closes_on(open, name) {
                break;
            }
            debug!("implied </{open}> before <{name}>");
            self.open_elements.pop();
        }
    }

    fn apply_stop_rules(&mut self, name: &str) {
        if !self.dialect.is_stop_trigger(name) {
            return;
        }
        let dialect = self.dialect;
        let Some(idx) = self.find_open(|open| dialect.stop_parents(name).any(|p| p == open)) else {
            return;
        };
        let closing = self.open_elements.len() - (idx + 1);
        if closing > 0 {
            debug!("<{name}> implicitly closes {closing} element(s)");
            self.open_elements.truncate(idx + 1);
        }
    }

    fn close_element(&mut self, name: &str) {
        if self.dialect.is_void(name) {
            debug!("ignoring end tag for void <{name}>");
            return;
        }
        match self.find_open(|open| open == name) {
            Some(idx) => {
                let closing = self.open_elements.len() - idx;
                if closing > 1 {
                    debug!("</{name}> implicitly closes {} element(s)", closing - 1);
                }
                self.open_elements.truncate(idx);
            },
            None => debug!("ignoring unmatched </{name}>"),
        }
    }

    // =============================================================
    // Text and non-element content
    // =============================================================

    fn insert_text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        if self.open_elements.len() <= 1 && is_all_whitespace(text) {
            return;
        }
        self.ensure_wrappers(None);
        let parent = self.current_node();
        self.doc.append_text(parent, text);
    }

    fn insert_node(&mut self, kind: NodeKind) {
        let parent = self.current_node();
        let id = self.doc.add_node(kind);
        self.doc.append_child(parent, id);
    }

    fn begin_special(&mut self, kind: Special) {
        self.special = Some(kind);
        self.special_text.clear();
    }

    fn end_special(&mut self) {
        let Some(kind) = self.special.take() else {
            return;
        };
        let text = std::mem::take(&mut self.special_text);
        match kind {
            Special::Comment => {
                if self.options.keep_comments {
                    self.insert_node(NodeKind::Comment(text));
                }
            },
            Special::CData => self.insert_text(&text),
            Special::ProcessingInstruction => {
                if self.options.keep_processing_instructions {
                    self.insert_node(NodeKind::ProcessingInstruction(text));
                }
            },
            Special::Doctype => self.doc.doctype = Some(text.trim().to_string()),
            Special::EntityDecl => debug!("dropping entity declaration {text:?}"),
        }
    }

    // =============================================================
    // Stack helpers
    // =============================================================

    /// The node at the top of the open elements stack, or the document
    /// node if nothing is open yet.
    fn current_node(&self) -> NodeId {
        self.open_elements.last().copied().unwrap_or(self.doc.root)
    }

    /// Stack depth below which nothing is ever popped: the wrappers.
    fn floor(&self) -> usize {
        let wrappers = if self.body_element.is_some() { 2 } else { 1 };
        wrappers.min(self.open_elements.len())
    }

    /// Search open elements from the top down to the wrappers. A boundary
    /// element that does not match ends the search.
    fn find_open(&self, matches: impl Fn(&str) -> bool) -> Option<usize> {
        for idx in (self.floor()..self.open_elements.len()).rev() {
            let Some(name) = self.doc.name(self.open_elements[idx]) else {
                continue;
            };
            if matches(name) {
                return Some(idx);
            }
            if self.dialect.is_boundary(name) {
                return None;
            }
        }
        None
    }

    #[cfg(test)]
    fn open_names(&self) -> Vec<&str> {
        self.open_elements
            .iter()
            .filter_map(|&id| self.doc.name(id))
            .collect()
    }
}

/// Returns `true` if the string consists entirely of ASCII whitespace.
fn is_all_whitespace(s: &str) -> bool {
    s.bytes().all(|b| b.is_ascii_whitespace())
}

// ------------------------------------------------------------------
// Driving the scanner
// ------------------------------------------------------------------

/// Run `scanner` to the end of its input and build the tree.
///
/// In lenient mode `Error` tokens are logged and skipped and truncated
/// constructs are closed out, so this only fails when `options.strict`
/// is set.
pub fn build<S: CharSource>(
    scanner: &mut Scanner<S>,
    dialect: &Dialect,
    options: ParseOptions,
) -> Result<Document> {
    let mut builder = TreeBuilder::new(dialect, options);
    loop {
        let before = scanner.mode();
        let token = scanner.next_token();
        match token {
            Token::EndOfInput => break,
            Token::Error => {
                let position = scanner.position();
                let detail = match before {
                    Mode::Body => "malformed tag".to_string(),
                    other => format!("malformed {}", other.describe()),
                };
                if options.strict {
                    return Err(SprigError::Syntax { position, detail });
                }
                warn!("skipping {detail} at char {position}");
            },
            _ => builder.process_token(token),
        }
    }

    let mode = scanner.mode();
    if mode != Mode::Body {
        let position = scanner.position();
        if options.strict {
            return Err(SprigError::UnexpectedEof {
                position,
                construct: mode.describe(),
            });
        }
        debug!("input ended inside {} at char {position}", mode.describe());
    }
    Ok(builder.finish())
}

/// Parse a string with the given dialect and options.
pub fn parse_document(input: &str, dialect: &Dialect, options: ParseOptions) -> Result<Document> {
    let mut scanner = Scanner::from_text(input, &dialect.scanner_config());
    build(&mut scanner, dialect, options)
}

/// Parse a string as HTML, leniently.
pub fn parse(input: &str) -> Document {
    parse_document(input, &Dialect::html(), ParseOptions::default()).unwrap_or_default()
}

// ------------------------------------------------------------------
// Tests
// ------------------------------------------------------------------
