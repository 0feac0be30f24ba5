// src/messages.rs
// Message keys, built-in English templates and `^N` substitution.

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

pub const LEX_UNEXPECTED_CHAR: &str = "lex.unexpected_char";
pub const LEX_UNTERMINATED_COMMENT: &str = "lex.unterminated_comment";
pub const LEX_UNEXPECTED_COMMENT_END: &str = "lex.unexpected_comment_end";
pub const SYNTAX_EXPECTED: &str = "syntax.expected";
pub const SYNTAX_OR: &str = "syntax.or";
pub const SYNTAX_END_OF_TEXT: &str = "syntax.end_of_text";
pub const SEMANTIC_FAILED: &str = "semantic.failed";

const DEFAULTS: &[(&str, &str)] = &[
    (LEX_UNEXPECTED_CHAR, "unexpected character ^0"),
    (LEX_UNTERMINATED_COMMENT, "unterminated comment"),
    (LEX_UNEXPECTED_COMMENT_END, "comment end without a matching start"),
    (SYNTAX_EXPECTED, "expected ^0 but read ^1"),
    (SYNTAX_OR, " or "),
    (SYNTAX_END_OF_TEXT, "end of text"),
    (SEMANTIC_FAILED, "^0"),
];

pub fn default_template(key: &str) -> Option<&'static str> {
    DEFAULTS.iter().find(|(k, _)| *k == key).map(|(_, t)| *t)
}

/// Replaces `^0`, `^1`, ... with `subs`. Unknown indices are kept verbatim.
pub fn substitute(template: &str, subs: &[&str]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(i) = rest.find('^') {
        out.push_str(&rest[..i]);
        let after = &rest[i + 1..];
        let digits = after.bytes().take_while(u8::is_ascii_digit).count();
        match after[..digits].parse::<usize>().ok().and_then(|n| subs.get(n)) {
            Some(s) => out.push_str(s),
            None => out.push_str(&rest[i..i + 1 + digits]),
        }
        rest = &after[digits..];
    }
    out.push_str(rest);
    out
}

/// Built-in rendering used by `Host::map` unless overridden. Unknown keys
/// render as the key followed by its arguments.
pub fn render(key: &str, subs: &[&str]) -> String {
    match default_template(key) {
        Some(t) => substitute(t, subs),
        None if subs.is_empty() => key.to_string(),
        None => format!("{key}: {}", subs.join(", ")),
    }
}

/// An unrendered message: key plus substitutions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub key: &'static str,
    pub args: Vec<String>,
}

impl Message {
    pub fn new(key: &'static str) -> Self {
        Self {
            key,
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, a: impl Into<String>) -> Self {
        self.args.push(a.into());
        self
    }
}

/// Per-key template overrides, e.g. a translation loaded from JSON.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Catalog {
    templates: HashMap<String, String>,
}

impl Catalog {
    pub fn from_json(data: &[u8]) -> serde_json::Result<Self> {
        let templates: HashMap<String, String> = serde_json::from_slice(data)?;
        Ok(Self { templates })
    }

    pub fn insert(&mut self, key: impl Into<String>, template: impl Into<String>) {
        self.templates.insert(key.into(), template.into());
    }

    pub fn render(&self, key: &str, subs: &[&str]) -> String {
        match self.templates.get(key) {
            Some(t) => substitute(t, subs),
            None => render(key, subs),
        }
    }
}
