//! Error types for sprig.

use std::io;

/// Errors produced by the sprig markup front end.
///
/// Lenient parsing never produces `Syntax` or `UnexpectedEof`; those are
/// only surfaced when a caller opts into strict mode.
#[derive(Debug, thiserror::Error)]
pub enum SprigError {
    #[error("config error: {0}")]
    Config(String),

    #[error("syntax error at char {position}: {detail}")]
    Syntax { position: usize, detail: String },

    #[error("unexpected end of input at char {position} inside {construct}")]
    UnexpectedEof {
        position: usize,
        construct: &'static str,
    },

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, SprigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_display() {
        let e = SprigError::Config("empty root tag".into());
        assert_eq!(format!("{e}"), "config error: empty root tag");
    }

    #[test]
    fn syntax_error_display() {
        let e = SprigError::Syntax {
            position: 12,
            detail: "stray '/' in tag".into(),
        };
        assert_eq!(format!("{e}"), "syntax error at char 12: stray '/' in tag");
    }

    #[test]
    fn unexpected_eof_display() {
        let e = SprigError::UnexpectedEof {
            position: 9,
            construct: "comment",
        };
        assert_eq!(
            format!("{e}"),
            "unexpected end of input at char 9 inside comment"
        );
    }

    #[test]
    fn io_error_from_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "gone");
        let e: SprigError = io_err.into();
        let msg = format!("{e}");
        assert!(msg.contains("I/O error"));
        assert!(msg.contains("gone"));
    }

    #[test]
    fn toml_error_from_conversion() {
        let bad_toml = "this is [[[not valid toml";
        let toml_err = toml::from_str::<toml::Value>(bad_toml).unwrap_err();
        let e: SprigError = toml_err.into();
        assert!(format!("{e}").contains("TOML parse error"));
    }

    #[test]
    fn json_error_from_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("not json").unwrap_err();
        let e: SprigError = json_err.into();
        assert!(format!("{e}").contains("JSON error"));
    }

    #[test]
    fn error_is_debug() {
        let e = SprigError::Config("test".into());
        assert!(format!("{e:?}").contains("Config"));
    }

    #[test]
    fn result_alias_err() {
        let r: Result<i32> = Err(SprigError::Config("oops".into()));
        assert!(r.is_err());
    }
}
