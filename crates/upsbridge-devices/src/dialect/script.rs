//! Script-variable dialect: `identifier = "value";`.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, trace};

use super::{AssignmentExtractor, RawAssignment};
use crate::catalog::FieldCatalog;
use crate::error::{ParseFailure, ParseResult};

/// Single-pass tokenizer. Comments, markup tags and free-standing string
/// literals are matched so they are skipped as a whole, including tags whose
/// attributes wrap across lines. An assignment must end with `;` or the end of
/// the line, optionally followed by a line comment.
static TOKEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r#"(?m)(?P<skip>//[^\n]*|/\*(?s:.*?)\*/|<!--(?s:.*?)-->"#,
        r#"|<[!/]?[A-Za-z][A-Za-z0-9-]*(?:\s[^>]*)?/?>"#,
        r#"|"(?:[^"\\\n]|\\.)*"|'(?:[^'\\\n]|\\.)*')"#,
        r#"|(?:\b(?:var|let|const)\s+)?\b(?P<key>[A-Za-z_][A-Za-z0-9_]*)\s*=\s*"#,
        r#"(?:"(?P<dq>(?:[^"\\\n]|\\.)*)"|'(?P<sq>(?:[^'\\\n]|\\.)*)'"#,
        r#"|(?P<num>[-+]?(?:\d+\.?\d*|\.\d+)(?:[eE][-+]?\d+)?|-?Infinity))"#,
        r#"[ \t\r]*(?:;|(?://[^\n]*)?$)"#,
    ))
    .expect("script assignment pattern is valid")
});

/// Extractor for the card's script-variable payload.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScriptExtractor;

impl AssignmentExtractor for ScriptExtractor {
    fn name(&self) -> &'static str {
        "script"
    }

    fn extract(&self, text: &str, catalog: &FieldCatalog) -> ParseResult<Vec<RawAssignment>> {
        let mut matched = 0usize;
        let mut assignments = Vec::new();

        for captures in TOKEN.captures_iter(text) {
            let Some(key) = captures.name("key") else {
                continue;
            };
            matched += 1;

            if !catalog.contains(key.as_str()) {
                trace!(key = key.as_str(), "Ignoring assignment for unknown key");
                continue;
            }

            let value = if let Some(m) = captures.name("dq").or_else(|| captures.name("sq")) {
                unescape(m.as_str())
            } else if let Some(m) = captures.name("num") {
                m.as_str().to_string()
            } else {
                continue;
            };

            assignments.push(RawAssignment::new(key.as_str(), value));
        }

        if matched == 0 {
            return Err(ParseFailure::no_data_found(
                "payload contains no script variable assignments",
            ));
        }

        debug!(
            matched,
            known = assignments.len(),
            "Extracted script variable assignments"
        );
        Ok(assignments)
    }
}

fn unescape(value: &str) -> String {
    if !value.contains('\\') {
        return value.to_string();
    }
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}
