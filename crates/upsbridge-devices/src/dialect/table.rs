//! Synoptic popup-table dialect.
//!
//! Older Network-MS firmware embeds each measurement group as an HTML table
//! assigned to a `label` property:
//!
//! ```text
//! label=<TABLE class="popup"><tr><td colspan=2><b>Battery</b></td></tr>
//! <tr class="popupData"><td>Remaining backup time</td><td>42 mn 39 s</td></tr>
//! </TABLE>
//! ```
//!
//! Values are already rendered for display; the normalizer accepts them as-is.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, trace};

use super::{AssignmentExtractor, RawAssignment};
use crate::catalog::FieldCatalog;
use crate::error::{ParseFailure, ParseResult};

static TABLE_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)label\s*=\s*<table\b").expect("marker pattern is valid"));

static TABLE_BLOCK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)label\s*=\s*(<table\b.*?</table>)").expect("table pattern is valid")
});

static GROUP_TITLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<b>(.*?)</b>").expect("title pattern is valid"));

static DATA_ROW: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?is)<tr\b[^>]*\bclass\s*=\s*["']?popupData\b[^>]*>(.*?)</tr>"#)
        .expect("row pattern is valid")
});

static CELL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<td\b[^>]*>(.*?)</td>").expect("cell pattern is valid"));

static TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").expect("tag pattern is valid"));

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("space pattern is valid"));

pub(super) fn has_table_marker(text: &str) -> bool {
    TABLE_MARKER.is_match(text)
}

/// Extractor for `label=<TABLE>` popup tables.
#[derive(Debug, Clone, Copy, Default)]
pub struct TableExtractor;

impl AssignmentExtractor for TableExtractor {
    fn name(&self) -> &'static str {
        "table"
    }

    fn extract(&self, text: &str, catalog: &FieldCatalog) -> ParseResult<Vec<RawAssignment>> {
        let mut tables = 0usize;
        let mut assignments = Vec::new();

        for block in TABLE_BLOCK.captures_iter(text) {
            tables += 1;
            let table = &block[1];

            let Some(group) = GROUP_TITLE.captures(table).map(|c| cell_text(&c[1])) else {
                debug!("Skipping popup table without a group title");
                continue;
            };

            for row in DATA_ROW.captures_iter(table) {
                let cells: Vec<String> = CELL
                    .captures_iter(&row[1])
                    .map(|c| cell_text(&c[1]))
                    .collect();
                if cells.len() != 2 {
                    trace!(group = %group, cells = cells.len(), "Skipping row without two cells");
                    continue;
                }

                match catalog.lookup_label(&group, &cells[0]) {
                    Some(spec) => {
                        assignments.push(RawAssignment::new(spec.raw_key, cells[1].clone()));
                    }
                    None => {
                        trace!(group = %group, label = %cells[0], "Ignoring unknown table row");
                    }
                }
            }
        }

        if tables == 0 {
            return Err(ParseFailure::no_data_found(
                "payload contains no synoptic popup tables",
            ));
        }

        debug!(tables, known = assignments.len(), "Extracted popup table rows");
        Ok(assignments)
    }
}

/// Visible text of an HTML fragment: tags stripped, entities decoded,
/// whitespace collapsed.
fn cell_text(html: &str) -> String {
    let text = TAG.replace_all(html, " ");
    let text = decode_entities(&text);
    WHITESPACE.replace_all(text.trim(), " ").into_owned()
}

fn decode_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }
    text.replace("&nbsp;", " ")
        .replace("&deg;", "°")
        .replace("&#176;", "°")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}
