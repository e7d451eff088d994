//! Payload dialects.
//!
//! A dialect turns the card's payload text into an ordered list of
//! [`RawAssignment`]s keyed by catalog raw key. The normalizer and assembler
//! never see the payload itself, so supporting another firmware rendering
//! only means adding an extractor here.
//!
//! - [`ScriptExtractor`]: `identifier = "value";` script variables
//! - [`TableExtractor`]: `label=<TABLE>...</TABLE>` popup tables

mod script;
mod table;

pub use script::ScriptExtractor;
pub use table::TableExtractor;

use serde::{Deserialize, Serialize};

use crate::catalog::FieldCatalog;
use crate::error::ParseResult;

/// One extracted assignment. `key` is always a catalog raw key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawAssignment {
    pub key: String,
    pub value: String,
}

impl RawAssignment {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Extracts catalog assignments from a payload.
pub trait AssignmentExtractor: Send + Sync {
    /// Short dialect name for logs.
    fn name(&self) -> &'static str;

    /// Extract the assignments for known catalog keys, in payload order.
    ///
    /// Fails with `NoDataFound` only when the payload contains nothing in
    /// this dialect at all; known-key mismatches yield an empty list.
    fn extract(&self, text: &str, catalog: &FieldCatalog) -> ParseResult<Vec<RawAssignment>>;
}

/// Which payload dialect to parse.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    /// Pick per payload, see [`Dialect::detect`].
    #[default]
    Auto,
    Script,
    Table,
}

static SCRIPT: ScriptExtractor = ScriptExtractor;
static TABLE: TableExtractor = TableExtractor;

impl Dialect {
    /// Concrete dialect for a payload: tables when a `label=<TABLE` block is
    /// present, script variables otherwise.
    pub fn detect(text: &str) -> Dialect {
        if table::has_table_marker(text) {
            Dialect::Table
        } else {
            Dialect::Script
        }
    }

    /// Resolve `Auto` against the payload.
    pub fn resolve(self, text: &str) -> Dialect {
        match self {
            Dialect::Auto => Dialect::detect(text),
            other => other,
        }
    }

    /// The extractor for this dialect, resolving `Auto` against the payload.
    pub fn extractor(self, text: &str) -> &'static dyn AssignmentExtractor {
        match self.resolve(text) {
            Dialect::Table => &TABLE,
            Dialect::Script | Dialect::Auto => &SCRIPT,
        }
    }
}

impl std::fmt::Display for Dialect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Auto => write!(f, "auto"),
            Self::Script => write!(f, "script"),
            Self::Table => write!(f, "table"),
        }
    }
}

impl std::str::FromStr for Dialect {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "script" => Ok(Self::Script),
            "table" => Ok(Self::Table),
            other => Err(format!("unknown dialect '{}', expected auto|script|table", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect() {
        assert_eq!(Dialect::detect("ups_status=\"Online\";"), Dialect::Script);
        assert_eq!(
            Dialect::detect("var x; label=<TABLE><b>Battery</b></TABLE>"),
            Dialect::Table
        );
        assert_eq!(Dialect::detect("LABEL = <table>"), Dialect::Table);
        assert_eq!(Dialect::detect(""), Dialect::Script);
    }

    #[test]
    fn test_forced_dialect_is_not_resolved() {
        let text = "label=<TABLE></TABLE>";
        assert_eq!(Dialect::Script.resolve(text), Dialect::Script);
        assert_eq!(Dialect::Auto.resolve(text), Dialect::Table);
        assert_eq!(Dialect::Script.extractor(text).name(), "script");
        assert_eq!(Dialect::Auto.extractor(text).name(), "table");
    }

    #[test]
    fn test_parse_dialect() {
        assert_eq!("auto".parse::<Dialect>().unwrap(), Dialect::Auto);
        assert_eq!("Script".parse::<Dialect>().unwrap(), Dialect::Script);
        assert_eq!(" TABLE ".parse::<Dialect>().unwrap(), Dialect::Table);
        assert!("json".parse::<Dialect>().is_err());
    }
}
