//! Markup serialization of a built tree.

use super::dialect::Dialect;
use super::dom::{Document, NodeId, NodeKind};

enum Step {
    Enter(NodeId),
    Leave(NodeId),
}

/// Serialize a document parsed with the built-in HTML dialect.
pub fn to_markup(doc: &Document) -> String {
    to_markup_with(doc, &Dialect::html())
}

/// Serialize a document, using `dialect` to decide which elements are
/// void and which hold raw text.
///
/// Every non-void element gets an explicit end tag, so re-parsing the
/// output reproduces the same tree.
pub fn to_markup_with(doc: &Document, dialect: &Dialect) -> String {
    let mut out = String::new();
    if let Some(doctype) = &doc.doctype {
        out.push_str("<!DOCTYPE ");
        out.push_str(doctype);
        out.push('>');
    }

    let mut stack: Vec<Step> = doc.children(doc.root).iter().rev().map(|&c| Step::Enter(c)).collect();
    while let Some(step) = stack.pop() {
        let id = match step {
            Step::Leave(id) => {
                if let Some(name) = doc.name(id) {
                    out.push_str("</");
                    out.push_str(name);
                    out.push('>');
                }
                continue;
            },
            Step::Enter(id) => id,
        };

        match &doc.get(id).kind {
            NodeKind::Element(e) => {
                out.push('<');
                out.push_str(&e.name);
                for attr in &e.attributes {
                    out.push(' ');
                    out.push_str(&attr.name);
                    out.push_str("=\"");
                    escape_attribute(&attr.value, &mut out);
                    out.push('"');
                }
                out.push('>');
                if dialect.is_void(&e.name) {
                    continue;
                }
                stack.push(Step::Leave(id));
                stack.extend(doc.children(id).iter().rev().map(|&c| Step::Enter(c)));
            },
            NodeKind::Text(text) => {
                let raw = doc
                    .get(id)
                    .parent
                    .and_then(|p| doc.name(p))
                    .is_some_and(|p| dialect.is_raw_text(p));
                if raw {
                    out.push_str(text);
                } else {
                    escape_text(text, &mut out);
                }
            },
            NodeKind::Comment(text) => {
                out.push_str("<!--");
                out.push_str(text);
                out.push_str("-->");
            },
            NodeKind::ProcessingInstruction(text) => {
                out.push_str("<?");
                out.push_str(text);
                out.push_str("?>");
            },
            NodeKind::Document => {},
        }
    }
    out
}

fn escape_text(text: &str, out: &mut String) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
}

fn escape_attribute(value: &str, out: &mut String) {
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '<' => out.push_str("&lt;"),
            _ => out.push(c),
        }
    }
}
