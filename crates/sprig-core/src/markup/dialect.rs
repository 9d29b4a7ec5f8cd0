//! Markup dialects: the rule tables that drive scanning and tree recovery.
//!
//! A [`Dialect`] bundles everything language-specific about a markup flavour
//! (wrapper elements, raw-text and void elements, implied-close rules).
//! The built-in HTML tables are available through [`Dialect::html`]; other
//! dialects load from TOML with every omitted field falling back to HTML.

use std::path::Path;

use serde::Deserialize;

use crate::error::{Result, SprigError};

// ------------------------------------------------------------------
// Rule types
// ------------------------------------------------------------------

/// Opening any of `triggers` implicitly closes open elements down to the
/// nearest `stop_parent`, which then receives the new element.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StopTagRule {
    pub triggers: Vec<String>,
    pub stop_parent: String,
}

/// An open `tag` is implicitly closed when one of `followers` opens.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct OmittedEndTagRule {
    pub tag: String,
    pub followers: Vec<String>,
}

// ------------------------------------------------------------------
// Dialect
// ------------------------------------------------------------------

/// Static configuration consumed by the scanner and the tree builder.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Dialect {
    #[serde(default = "default_root_tag")]
    pub root_tag: String,
    #[serde(default = "default_body_tag")]
    pub body_tag: String,
    /// Tags that may open directly under the root without forcing a body.
    #[serde(default = "default_body_exempt")]
    pub body_exempt: Vec<String>,
    #[serde(default = "default_raw_text_tags")]
    pub raw_text_tags: Vec<String>,
    #[serde(default = "default_void_tags")]
    pub void_tags: Vec<String>,
    #[serde(default = "default_stop_tags")]
    pub stop_tags: Vec<StopTagRule>,
    #[serde(default = "default_omitted_end_tags")]
    pub omitted_end_tags: Vec<OmittedEndTagRule>,
    /// Tags an end-tag or stop-parent search never walks past.
    #[serde(default = "default_end_tag_boundaries")]
    pub end_tag_boundaries: Vec<String>,
    #[serde(default)]
    pub case_sensitive: bool,
}

fn strings(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

fn default_root_tag() -> String {
    "html".to_string()
}
fn default_body_tag() -> String {
    "body".to_string()
}
fn default_body_exempt() -> Vec<String> {
    strings(&["head"])
}
fn default_raw_text_tags() -> Vec<String> {
    strings(&["script", "style"])
}
fn default_void_tags() -> Vec<String> {
    strings(&[
        "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param",
        "source", "track", "wbr",
    ])
}
fn default_end_tag_boundaries() -> Vec<String> {
    strings(&["table"])
}

fn default_stop_tags() -> Vec<StopTagRule> {
    let rule = |triggers: &[&str], stop_parent: &str| StopTagRule {
        triggers: strings(triggers),
        stop_parent: stop_parent.to_string(),
    };
    vec![
        rule(&["li"], "ul"),
        rule(&["li"], "ol"),
        rule(&["dt", "dd"], "dl"),
        rule(&["td", "th"], "tr"),
        rule(&["tr"], "table"),
        rule(&["tr"], "tbody"),
        rule(&["tr"], "thead"),
        rule(&["tr"], "tfoot"),
    ]
}

const BLOCK_TAGS: &[&str] = &[
    "address",
    "article",
    "aside",
    "blockquote",
    "div",
    "dl",
    "fieldset",
    "footer",
    "form",
    "h1",
    "h2",
    "h3",
    "h4",
    "h5",
    "h6",
    "header",
    "hr",
    "menu",
    "nav",
    "ol",
    "p",
    "pre",
    "section",
    "table",
    "ul",
];

fn default_omitted_end_tags() -> Vec<OmittedEndTagRule> {
    let rule = |tag: &str, followers: &[&str]| OmittedEndTagRule {
        tag: tag.to_string(),
        followers: strings(followers),
    };
    vec![
        rule("p", BLOCK_TAGS),
        rule("li", &["li"]),
        rule("dt", &["dt", "dd"]),
        rule("dd", &["dt", "dd"]),
        rule("td", &["td", "th", "tr"]),
        rule("th", &["td", "th", "tr"]),
        rule("tr", &["tr"]),
        rule("option", &["option", "optgroup"]),
        rule("thead", &["tbody", "tfoot"]),
        rule("tbody", &["tbody", "tfoot"]),
    ]
}

impl Default for Dialect {
    fn default() -> Self {
        Self::html()
    }
}

fn contains(list: &[String], name: &str) -> bool {
    list.iter().any(|s| s == name)
}

impl Dialect {
    /// The built-in HTML tables.
    pub fn html() -> Self {
        Self {
            root_tag: default_root_tag(),
            body_tag: default_body_tag(),
            body_exempt: default_body_exempt(),
            raw_text_tags: default_raw_text_tags(),
            void_tags: default_void_tags(),
            stop_tags: default_stop_tags(),
            omitted_end_tags: default_omitted_end_tags(),
            end_tag_boundaries: default_end_tag_boundaries(),
            case_sensitive: false,
        }
    }

    /// A dialect with wrappers and nothing else: no void, raw-text or
    /// implied-close rules.
    pub fn bare() -> Self {
        Self {
            body_exempt: Vec::new(),
            raw_text_tags: Vec::new(),
            void_tags: Vec::new(),
            stop_tags: Vec::new(),
            omitted_end_tags: Vec::new(),
            end_tag_boundaries: Vec::new(),
            ..Self::html()
        }
    }

    /// Parse a dialect from TOML. Omitted fields take their HTML defaults.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let mut dialect: Dialect = toml::from_str(text)?;
        dialect.validate()?;
        dialect.normalize();
        Ok(dialect)
    }

    /// Load a dialect file from disk.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| SprigError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&text)
    }

    fn validate(&self) -> Result<()> {
        if self.root_tag.is_empty() {
            return Err(SprigError::Config("root_tag must not be empty".into()));
        }
        if self.body_tag.is_empty() {
            return Err(SprigError::Config("body_tag must not be empty".into()));
        }
        if self.root_tag == self.body_tag {
            return Err(SprigError::Config(format!(
                "root_tag and body_tag are both '{}'",
                self.root_tag
            )));
        }
        if let Some(rule) = self.stop_tags.iter().find(|r| r.triggers.is_empty()) {
            return Err(SprigError::Config(format!(
                "stop rule for '{}' has no triggers",
                rule.stop_parent
            )));
        }
        Ok(())
    }

    /// Lowercase every table entry when names are case-insensitive, so
    /// lookups can compare folded names directly.
    fn normalize(&mut self) {
        if self.case_sensitive {
            return;
        }
        let lower = |v: &mut Vec<String>| v.iter_mut().for_each(|s| s.make_ascii_lowercase());
        self.root_tag.make_ascii_lowercase();
        self.body_tag.make_ascii_lowercase();
        lower(&mut self.body_exempt);
        lower(&mut self.raw_text_tags);
        lower(&mut self.void_tags);
        lower(&mut self.end_tag_boundaries);
        for rule in &mut self.stop_tags {
            lower(&mut rule.triggers);
            rule.stop_parent.make_ascii_lowercase();
        }
        for rule in &mut self.omitted_end_tags {
            rule.tag.make_ascii_lowercase();
            lower(&mut rule.followers);
        }
    }

    /// The slice of the dialect the scanner needs.
    pub fn scanner_config(&self) -> ScannerConfig {
        ScannerConfig {
            raw_text_tags: self.raw_text_tags.clone(),
        }
    }

    /// Fold a tag or attribute name the way this dialect compares names.
    pub fn fold_name(&self, name: &str) -> String {
        if self.case_sensitive {
            name.to_string()
        } else {
            name.to_ascii_lowercase()
        }
    }

    pub fn is_void(&self, name: &str) -> bool {
        contains(&self.void_tags, name)
    }

    pub fn is_raw_text(&self, name: &str) -> bool {
        contains(&self.raw_text_tags, name)
    }

    pub fn is_body_exempt(&self, name: &str) -> bool {
        contains(&self.body_exempt, name)
    }

    pub fn is_boundary(&self, name: &str) -> bool {
        contains(&self.end_tag_boundaries, name)
    }

    /// Whether `name` appears in any stop rule's trigger list.
    pub fn is_stop_trigger(&self, name: &str) -> bool {
        self.stop_tags.iter().any(|r| contains(&r.triggers, name))
    }

    /// Every stop parent contributed by the rules `name` triggers.
    pub fn stop_parents<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.stop_tags
            .iter()
            .filter(move |r| contains(&r.triggers, name))
            .map(|r| r.stop_parent.as_str())
    }

    /// Whether an open `open` element is implicitly closed by opening `next`.
    pub fn closes_on(&self, open: &str, next: &str) -> bool {
        self.omitted_end_tags
            .iter()
            .any(|r| r.tag == open && contains(&r.followers, next))
    }
}

// ------------------------------------------------------------------
// Scanner configuration and parse options
// ------------------------------------------------------------------

/// What the scanner needs to know about the dialect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannerConfig {
    /// Elements whose content is scanned verbatim up to `</name>`.
    pub raw_text_tags: Vec<String>,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            raw_text_tags: default_raw_text_tags(),
        }
    }
}

/// Per-parse behaviour switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    pub keep_comments: bool,
    pub keep_processing_instructions: bool,
    /// Turn `Error` tokens and truncated constructs into hard failures.
    pub strict: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            keep_comments: true,
            keep_processing_instructions: true,
            strict: false,
        }
    }
}

impl ParseOptions {
    pub fn strict() -> Self {
        Self {
            strict: true,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn default_is_html() {
        let d = Dialect::default();
        assert_eq!(d, Dialect::html());
        assert_eq!(d.root_tag, "html");
        assert_eq!(d.body_tag, "body");
        assert!(d.is_void("br"));
        assert!(!d.is_void("div"));
        assert!(d.is_raw_text("script"));
        assert!(d.is_raw_text("style"));
    }

    #[test]
    fn stop_parents_union() {
        let d = Dialect::html();
        let parents: Vec<&str> = d.stop_parents("li").collect();
        assert_eq!(parents, vec!["ul", "ol"]);
        let parents: Vec<&str> = d.stop_parents("tr").collect();
        assert_eq!(parents, vec!["table", "tbody", "thead", "tfoot"]);
        assert_eq!(d.stop_parents("span").count(), 0);
        assert!(d.is_stop_trigger("dd"));
        assert!(!d.is_stop_trigger("dl"));
    }

    #[test]
    fn omitted_end_rules() {
        let d = Dialect::html();
        assert!(d.closes_on("p", "div"));
        assert!(d.closes_on("p", "p"));
        assert!(!d.closes_on("p", "span"));
        assert!(d.closes_on("dt", "dd"));
        assert!(d.closes_on("option", "optgroup"));
    }

    #[test]
    fn bare_has_no_rules() {
        let d = Dialect::bare();
        assert_eq!(d.root_tag, "html");
        assert!(d.void_tags.is_empty());
        assert!(!d.is_stop_trigger("li"));
        assert!(!d.is_raw_text("script"));
    }

    #[test]
    fn toml_defaults_fill_missing_fields() {
        let d = Dialect::from_toml_str("root_tag = \"doc\"\nbody_tag = \"main\"\n").unwrap();
        assert_eq!(d.root_tag, "doc");
        assert_eq!(d.body_tag, "main");
        assert_eq!(d.void_tags, Dialect::html().void_tags);
        assert_eq!(d.stop_tags, Dialect::html().stop_tags);
    }

    #[test]
    fn toml_rule_tables() {
        let text = r#"
            void_tags = ["Break"]
            omitted_end_tags = []

            [[stop_tags]]
            triggers = ["item"]
            stop_parent = "List"
        "#;
        let d = Dialect::from_toml_str(text).unwrap();
        assert!(d.is_void("break"));
        assert_eq!(d.stop_parents("item").collect::<Vec<_>>(), vec!["list"]);
        assert!(d.omitted_end_tags.is_empty());
    }

    #[test]
    fn case_sensitive_tables_are_kept() {
        let d = Dialect::from_toml_str("case_sensitive = true\nvoid_tags = [\"Br\"]").unwrap();
        assert!(d.is_void("Br"));
        assert!(!d.is_void("br"));
        assert_eq!(d.fold_name("DiV"), "DiV");
        assert_eq!(Dialect::html().fold_name("DiV"), "div");
    }

    #[test]
    fn malformed_toml() {
        let err = Dialect::from_toml_str("root_tag = [").unwrap_err();
        assert!(matches!(err, SprigError::TomlParse(_)));
    }

    #[test]
    fn wrong_field_type() {
        assert!(Dialect::from_toml_str("void_tags = 3").is_err());
    }

    #[test]
    fn empty_root_tag_rejected() {
        let err = Dialect::from_toml_str("root_tag = \"\"").unwrap_err();
        assert!(matches!(err, SprigError::Config(_)));
    }

    #[test]
    fn same_root_and_body_rejected() {
        let err = Dialect::from_toml_str("body_tag = \"html\"").unwrap_err();
        assert!(format!("{err}").contains("both"));
    }

    #[test]
    fn stop_rule_without_triggers_rejected() {
        let text = "[[stop_tags]]\ntriggers = []\nstop_parent = \"ul\"\n";
        assert!(matches!(
            Dialect::from_toml_str(text),
            Err(SprigError::Config(_))
        ));
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "raw_text_tags = [\"code\"]").unwrap();
        let d = Dialect::load(file.path()).unwrap();
        assert!(d.is_raw_text("code"));
        assert!(!d.is_raw_text("script"));
        assert_eq!(d.scanner_config().raw_text_tags, vec!["code".to_string()]);
    }

    #[test]
    fn load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = Dialect::load(&dir.path().join("nope.toml")).unwrap_err();
        assert!(matches!(err, SprigError::Config(_)));
    }

    #[test]
    fn parse_options_defaults() {
        let o = ParseOptions::default();
        assert!(o.keep_comments);
        assert!(o.keep_processing_instructions);
        assert!(!o.strict);
        let strict = ParseOptions::strict();
        assert!(strict.strict);
        assert!(strict.keep_comments);
    }
}
