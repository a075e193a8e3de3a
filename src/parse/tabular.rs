//! Flattening of two-column tabular data into parser input.
//!
//! Spreadsheet uploads arrive as rows of `(item name, code)`. They are turned
//! into canonical `item,code` lines so they go through exactly the same parser
//! as pasted text.

use tracing::warn;

/// Header row of the upload template.
const TEMPLATE_HEADER: [&str; 2] = ["Item Name", "Barcode Number"];

/// Example rows shipped in the upload template.
const TEMPLATE_ROWS: [[&str; 2]; 5] = [
    ["1/2 PIPE CPVC NIPRO", "01192202500024"],
    ["3/4 ELBOW CPVC", "01192202500025"],
    ["TEE JOINT CPVC", "01192202500026"],
    ["COUPLING CPVC", "01192202500027"],
    ["VALVE BALL 1/2", "01192202500028"],
];

fn is_header(item: &str, code: &str) -> bool {
    item.eq_ignore_ascii_case(TEMPLATE_HEADER[0])
        && (code.eq_ignore_ascii_case(TEMPLATE_HEADER[1])
            || code.eq_ignore_ascii_case("barcode")
            || code.eq_ignore_ascii_case("code"))
}

/// Flatten `(item, code)` rows into newline-separated `item,code` text.
///
/// A leading header row is dropped and rows without a code are skipped. Commas
/// and line breaks inside item names become spaces so each row stays one
/// `item,code` line.
pub fn flatten_rows<I, S>(rows: I) -> String
where
    I: IntoIterator<Item = (S, S)>,
    S: AsRef<str>,
{
    let mut lines = Vec::new();

    for (index, (item, code)) in rows.into_iter().enumerate() {
        let (item, code) = (item.as_ref().trim(), code.as_ref().trim());
        if index == 0 && is_header(item, code) {
            continue;
        }
        if code.is_empty() {
            continue;
        }
        let item = item.replace([',', '\r', '\n'], " ");
        lines.push(format!("{item},{code}"));
    }

    lines.join("\n")
}

/// Flatten a CSV upload.
///
/// Records are read whole, so quoted fields may span lines. A leading UTF-8 BOM
/// is ignored, only the first two fields of each record are used, and records
/// the reader cannot make sense of are skipped with a warning.
pub fn flatten_csv(text: &str) -> String {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());

    let rows: Vec<(String, String)> = reader
        .records()
        .filter_map(|record| match record {
            Ok(record) => {
                let field = |i| record.get(i).unwrap_or_default().to_string();
                Some((field(0), field(1)))
            }
            Err(e) => {
                warn!(error = %e, "Skipping unreadable CSV record");
                None
            }
        })
        .collect();

    flatten_rows(rows)
}

/// The CSV upload template: header plus example rows.
pub fn template_csv() -> String {
    std::iter::once(TEMPLATE_HEADER)
        .chain(TEMPLATE_ROWS)
        .map(|[item, code]| format!("{item},{code}\n"))
        .collect()
}
