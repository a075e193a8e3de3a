//! # Line Parser
//!
//! Turns a free-form text blob into an ordered, deduplicated list of
//! [`CodeEntry`] values.
//!
//! ## Accepted line formats
//!
//! Each non-blank line is trimmed and tried against these rules, first match wins:
//!
//! | Line contains | Interpretation |
//! |---------------|----------------|
//! | `,` | `item name,code` (split on the first comma) |
//! | tab | `item name<TAB>code` |
//! | `\|` | `item name \| code` |
//! | none of the above | `item words... CODE` if the last word looks like a code, else the whole line is the code |
//!
//! A delimited line whose split leaves one side empty loses every delimiter and
//! becomes a bare code. Lines that end up with no code at all are skipped.
//!
//! ## Example
//!
//! ```
//! use codesheet::parse::{parse, CodeEntry};
//!
//! let entries = parse("Widget A,12345\nWidget A,12345\nBolt M6 99887766").unwrap();
//! assert_eq!(entries, vec![
//!     CodeEntry::new("Widget A", "12345"),
//!     CodeEntry::new("Bolt M6", "99887766"),
//! ]);
//! ```

mod tabular;

pub use tabular::{flatten_csv, flatten_rows, template_csv};

use std::collections::HashSet;

use thiserror::Error;

/// Largest number of entries a single batch may carry.
pub const MAX_BATCH_SIZE: usize = 1000;

/// Number of formatted lines returned by [`preview`].
pub const PREVIEW_LIMIT: usize = 10;

/// Minimum length of a trailing word before it is taken as a code.
const MIN_TRAILING_CODE_LEN: usize = 4;

/// Delimiters in precedence order.
const DELIMITERS: [char; 3] = [',', '\t', '|'];

/// Errors raised before any rendering starts.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InputError {
    #[error("input data is empty")]
    Empty,

    #[error("no valid codes found in input data")]
    NoValidEntries,

    #[error("{count} codes exceeds the maximum of {max} per batch")]
    TooManyEntries { count: usize, max: usize },
}

/// One (item name, code) pair recovered from the input.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CodeEntry {
    /// Human-readable item name; empty when the line carried only a code
    pub item_name: String,
    /// The data to encode; never empty
    pub code: String,
}

impl CodeEntry {
    pub fn new(item_name: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            item_name: item_name.into(),
            code: code.into(),
        }
    }

    /// Whether the entry carries a non-blank item name.
    pub fn has_item_name(&self) -> bool {
        !self.item_name.trim().is_empty()
    }

    /// Canonical `item,code` form. Parsing this line yields the same entry.
    pub fn to_canonical_line(&self) -> String {
        format!("{},{}", self.item_name, self.code)
    }

    /// Preview form, `item → code`.
    pub fn preview_line(&self) -> String {
        if self.has_item_name() {
            format!("{} → {}", self.item_name, self.code)
        } else {
            format!("(No Item Name) → {}", self.code)
        }
    }
}

/// Result of interpreting a single line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineMatch {
    /// Both an item name and a code were found
    Matched { item_name: String, code: String },
    /// Only a code; the item name is empty
    Fallback(String),
    /// Nothing usable on the line
    Skip,
}

impl LineMatch {
    fn bare(code: &str) -> Self {
        let code = code.trim();
        if code.is_empty() {
            LineMatch::Skip
        } else {
            LineMatch::Fallback(code.to_string())
        }
    }

    fn into_entry(self) -> Option<CodeEntry> {
        match self {
            LineMatch::Matched { item_name, code } => Some(CodeEntry { item_name, code }),
            LineMatch::Fallback(code) => Some(CodeEntry::new("", code)),
            LineMatch::Skip => None,
        }
    }
}

/// Split on the first `delim`. `None` if the line does not contain it.
fn split_delimited(line: &str, delim: char) -> Option<LineMatch> {
    let (left, right) = line.split_once(delim)?;
    let (item_name, code) = (left.trim(), right.trim());

    if !item_name.is_empty() && !code.is_empty() {
        return Some(LineMatch::Matched {
            item_name: item_name.to_string(),
            code: code.to_string(),
        });
    }

    let stripped: String = line.chars().filter(|&c| c != delim).collect();
    Some(LineMatch::bare(&stripped))
}

fn is_code_like(token: &str) -> bool {
    token.len() >= MIN_TRAILING_CODE_LEN
        && token
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
}

/// Whitespace-separated `item words... CODE`.
fn split_words(line: &str) -> LineMatch {
    let tokens: Vec<&str> = line.split_whitespace().collect();

    match tokens.split_last() {
        Some((last, rest)) if !rest.is_empty() && is_code_like(last) => LineMatch::Matched {
            item_name: rest.join(" "),
            code: (*last).to_string(),
        },
        _ => LineMatch::bare(line),
    }
}

/// Interpret a single line.
pub fn parse_line(line: &str) -> LineMatch {
    let line = line.trim();
    if line.is_empty() {
        return LineMatch::Skip;
    }

    DELIMITERS
        .iter()
        .find_map(|&delim| split_delimited(line, delim))
        .unwrap_or_else(|| split_words(line))
}

/// Parse every line, keeping the first occurrence of each (item, code) pair.
fn collect_entries(text: &str) -> Vec<CodeEntry> {
    let mut seen = HashSet::new();

    text.lines()
        .filter_map(|line| parse_line(line).into_entry())
        .filter(|entry| seen.insert(entry.clone()))
        .collect()
}

/// Parse a text blob into deduplicated entries.
///
/// Fails with [`InputError::Empty`] for blank input and
/// [`InputError::NoValidEntries`] when no line produced a code. The batch size
/// limit is not checked here; see [`check_batch_size`].
pub fn parse(text: &str) -> Result<Vec<CodeEntry>, InputError> {
    if text.trim().is_empty() {
        return Err(InputError::Empty);
    }

    let entries = collect_entries(text);
    if entries.is_empty() {
        return Err(InputError::NoValidEntries);
    }

    Ok(entries)
}

/// Reject batches above [`MAX_BATCH_SIZE`].
pub fn check_batch_size(entries: &[CodeEntry]) -> Result<(), InputError> {
    if entries.len() > MAX_BATCH_SIZE {
        return Err(InputError::TooManyEntries {
            count: entries.len(),
            max: MAX_BATCH_SIZE,
        });
    }
    Ok(())
}

/// Render entries back to canonical `item,code` text.
pub fn to_canonical_text(entries: &[CodeEntry]) -> String {
    entries
        .iter()
        .map(CodeEntry::to_canonical_line)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Summary of what a text blob would produce, for UI feedback.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct Preview {
    /// Up to [`PREVIEW_LIMIT`] formatted `item → code` lines
    pub codes: Vec<String>,
    pub total_count: usize,
    pub has_more: bool,
}

/// Preview the first few entries. Never fails; blank input gives an empty preview.
pub fn preview(text: &str) -> Preview {
    let entries = collect_entries(text);

    Preview {
        codes: entries
            .iter()
            .take(PREVIEW_LIMIT)
            .map(CodeEntry::preview_line)
            .collect(),
        total_count: entries.len(),
        has_more: entries.len() > PREVIEW_LIMIT,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn matched(item: &str, code: &str) -> LineMatch {
        LineMatch::Matched {
            item_name: item.to_string(),
            code: code.to_string(),
        }
    }

    #[test]
    fn test_comma_splits_on_first_comma() {
        assert_eq!(parse_line("Widget A, 12,345 "), matched("Widget A", "12,345"));
    }

    #[test]
    fn test_tab_and_pipe() {
        assert_eq!(parse_line("COUPLING CPVC\t01192202500027"), matched("COUPLING CPVC", "01192202500027"));
        assert_eq!(parse_line("TEE JOINT CPVC | 01192202500026"), matched("TEE JOINT CPVC", "01192202500026"));
    }

    #[test]
    fn test_comma_wins_over_tab_and_pipe() {
        assert_eq!(parse_line("a|b\tc,12345"), matched("a|b\tc", "12345"));
    }

    #[test]
    fn test_one_sided_split_becomes_bare_code() {
        assert_eq!(parse_line(",12345"), LineMatch::Fallback("12345".into()));
        assert_eq!(parse_line("12345,"), LineMatch::Fallback("12345".into()));
        assert_eq!(parse_line("| 777 |"), LineMatch::Fallback("777".into()));
    }

    #[test]
    fn test_delimiter_only_line_is_skipped() {
        assert_eq!(parse_line(",,,"), LineMatch::Skip);
        assert_eq!(parse_line(" | "), LineMatch::Skip);
        assert_eq!(parse_line("\t"), LineMatch::Skip);
    }

    #[test]
    fn test_trailing_word_code() {
        assert_eq!(parse_line("Bolt M6 99887766"), matched("Bolt M6", "99887766"));
        assert_eq!(parse_line("VALVE BALL 1/2 01192202500031"), matched("VALVE BALL 1/2", "01192202500031"));
        assert_eq!(parse_line("test  ab-c_1.2"), matched("test", "ab-c_1.2"));
    }

    #[test]
    fn test_short_or_odd_trailing_word_keeps_whole_line() {
        assert_eq!(parse_line("Bolt M6"), LineMatch::Fallback("Bolt M6".into()));
        assert_eq!(parse_line("Pipe 12/34"), LineMatch::Fallback("Pipe 12/34".into()));
        assert_eq!(parse_line("01192202500030"), LineMatch::Fallback("01192202500030".into()));
    }

    #[test]
    fn test_dedup_keeps_first_occurrence() {
        let entries = parse("Widget A,12345\nWidget A,12345\nWidget B,67890").unwrap();
        assert_eq!(
            entries,
            vec![CodeEntry::new("Widget A", "12345"), CodeEntry::new("Widget B", "67890")]
        );
    }

    #[test]
    fn test_same_code_different_item_is_distinct() {
        let entries = parse("A,111111\nB,111111\n111111\nA,111111").unwrap();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[2], CodeEntry::new("", "111111"));
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(parse(""), Err(InputError::Empty));
        assert_eq!(parse("  \n\n "), Err(InputError::Empty));
        assert_eq!(parse(",\n|\n"), Err(InputError::NoValidEntries));
    }

    #[test]
    fn test_batch_size_limit() {
        let text: String = (0..1001).map(|i| format!("Item {i},CODE{i:05}\n")).collect();
        let entries = parse(&text).unwrap();
        assert_eq!(entries.len(), 1001);
        assert_eq!(
            check_batch_size(&entries),
            Err(InputError::TooManyEntries { count: 1001, max: MAX_BATCH_SIZE })
        );
        assert!(check_batch_size(&entries[..1000]).is_ok());
    }

    #[test]
    fn test_canonical_text_reparses_identically() {
        let text = "1/2 PIPE CPVC NIPRO,01192202500024\n\
                    TEE JOINT CPVC | 01192202500026\n\
                    COUPLING CPVC\t01192202500027\n\
                    test 01192202\n\
                    ab cd\n\
                    |4444|\n\
                    x,y,z\n\
                    01192202500030";
        let first = parse(text).unwrap();
        let second = parse(&to_canonical_text(&first)).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_preview() {
        let text: String = (0..12).map(|i| format!("Item {i},{i:06}\n")).collect();
        let text = format!("{text}99999999\n");
        let p = preview(&text);
        assert_eq!(p.total_count, 13);
        assert!(p.has_more);
        assert_eq!(p.codes.len(), PREVIEW_LIMIT);
        assert_eq!(p.codes[0], "Item 0 → 000000");

        let p = preview("99999999");
        assert_eq!(p.codes, vec!["(No Item Name) → 99999999".to_string()]);
        assert!(!p.has_more);

        assert_eq!(preview("").total_count, 0);
    }
}
