//! CSV/TSV parsing with delimiter and encoding fallback.
//!
//! Every encoding in [`ENCODINGS`] is tried in order, and under each one
//! every delimiter in [`DELIMITERS`]. The first parse producing more than one
//! column wins, which rejects single-column parses caused by the wrong
//! delimiter.

use crate::dataset::{CellValue, Column, Dataset};
use csv::ReaderBuilder;
use std::borrow::Cow;
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Delimiter {
    Comma,
    Tab,
    Semicolon,
    Pipe,
}

impl Delimiter {
    pub fn as_byte(self) -> u8 {
        match self {
            Self::Comma => b',',
            Self::Tab => b'\t',
            Self::Semicolon => b';',
            Self::Pipe => b'|',
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Comma => ",",
            Self::Tab => "\\t",
            Self::Semicolon => ";",
            Self::Pipe => "|",
        }
    }
}

/// Candidate delimiters, in trial order.
pub const DELIMITERS: [Delimiter; 4] = [
    Delimiter::Comma,
    Delimiter::Tab,
    Delimiter::Semicolon,
    Delimiter::Pipe,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextEncoding {
    Utf8,
    Latin1,
    Iso8859_1,
}

impl TextEncoding {
    pub fn label(self) -> &'static str {
        match self {
            Self::Utf8 => "utf-8",
            Self::Latin1 => "latin-1",
            Self::Iso8859_1 => "iso-8859-1",
        }
    }

    /// Decodes `raw`, or `None` if the bytes are invalid in this encoding.
    pub fn decode(self, raw: &[u8]) -> Option<Cow<'_, str>> {
        match self {
            Self::Utf8 => {
                let raw = raw.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(raw);
                std::str::from_utf8(raw).ok().map(Cow::Borrowed)
            }
            // Both labels name the same single-byte table: byte n is U+00nn.
            Self::Latin1 | Self::Iso8859_1 => {
                Some(Cow::Owned(raw.iter().copied().map(char::from).collect()))
            }
        }
    }
}

/// Standard encoding first, then the fallbacks, in trial order.
pub const ENCODINGS: [TextEncoding; 3] = [
    TextEncoding::Utf8,
    TextEncoding::Latin1,
    TextEncoding::Iso8859_1,
];

/// Cell texts read as missing values.
pub const NULL_TOKENS: &[&str] = &[
    "", "NA", "N/A", "n/a", "NaN", "nan", "null", "NULL", "None", "#N/A",
];

/// Runs the encoding x delimiter strategy chain over `raw`.
///
/// # Errors
///
/// Returns a description of the last rejection when no strategy produced a
/// dataset with more than one column.
pub fn parse(raw: &[u8]) -> Result<Dataset, String> {
    let mut last_reason = "no parsing strategy applied".to_owned();

    for encoding in ENCODINGS {
        let Some(text) = encoding.decode(raw) else {
            tracing::debug!(encoding = encoding.label(), "Bytes are not valid in encoding");
            last_reason = format!("bytes are not valid {}", encoding.label());
            continue;
        };

        for delimiter in DELIMITERS {
            match parse_with(&text, delimiter) {
                Ok(ds) if ds.column_count() > 1 => {
                    tracing::debug!(
                        encoding = encoding.label(),
                        delimiter = delimiter.as_str(),
                        "Accepted delimited parse"
                    );
                    return Ok(ds);
                }
                Ok(ds) => {
                    last_reason = format!(
                        "no candidate delimiter produced more than one column (got {})",
                        ds.column_count()
                    );
                }
                Err(reason) => {
                    tracing::debug!(
                        encoding = encoding.label(),
                        delimiter = delimiter.as_str(),
                        reason = %reason,
                        "Rejected delimited parse"
                    );
                    last_reason = reason;
                }
            }
        }
    }

    Err(last_reason)
}

/// Parses `text` with one delimiter. The first record is the header.
///
/// # Errors
///
/// Returns a reason string for empty input, malformed records, or rows with
/// more fields than the header.
pub fn parse_with(text: &str, delimiter: Delimiter) -> Result<Dataset, String> {
    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter.as_byte())
        .has_headers(true)
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| format!("unreadable header: {e}"))?
        .iter()
        .map(str::to_owned)
        .collect();

    if headers.iter().all(|h| h.trim().is_empty()) {
        return Err("no columns to parse".to_owned());
    }

    let width = headers.len();
    let mut cells: Vec<Vec<Option<String>>> = vec![Vec::new(); width];

    for (line, record) in reader.records().enumerate() {
        let record = record.map_err(|e| format!("malformed record: {e}"))?;
        if record.len() > width {
            return Err(format!(
                "row {} has {} fields, expected {width}",
                line + 1,
                record.len()
            ));
        }
        for (idx, column) in cells.iter_mut().enumerate() {
            column.push(record.get(idx).map(str::to_owned));
        }
    }

    let columns = dedupe_names(headers)
        .into_iter()
        .zip(cells)
        .map(|(name, raw)| Column::new(name, infer_column(raw)))
        .collect();

    Dataset::new(columns).map_err(|e| e.to_string())
}

/// Disambiguates repeated header names as `name.1`, `name.2`, ...
fn dedupe_names(headers: Vec<String>) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut out = Vec::with_capacity(headers.len());
    for name in headers {
        let mut candidate = name.clone();
        let mut suffix = 1;
        while seen.contains(&candidate) {
            candidate = format!("{name}.{suffix}");
            suffix += 1;
        }
        seen.insert(candidate.clone());
        out.push(candidate);
    }
    out
}

fn is_null_token(s: &str) -> bool {
    NULL_TOKENS.contains(&s.trim())
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.trim() {
        "true" | "True" | "TRUE" => Some(true),
        "false" | "False" | "FALSE" => Some(false),
        _ => None,
    }
}

/// Types a column as a whole: all-boolean, else all-integer, else all-float,
/// else text. Missing cells are null in every case.
fn infer_column(raw: Vec<Option<String>>) -> Vec<CellValue> {
    let present: Vec<&str> = raw
        .iter()
        .flatten()
        .map(String::as_str)
        .filter(|s| !is_null_token(s))
        .collect();

    let typed = |f: &dyn Fn(&str) -> CellValue| -> Vec<CellValue> {
        raw.iter()
            .map(|cell| match cell.as_deref() {
                Some(s) if !is_null_token(s) => f(s),
                _ => CellValue::Null,
            })
            .collect()
    };

    if present.is_empty() {
        return vec![CellValue::Null; raw.len()];
    }
    if present.iter().all(|s| parse_bool(s).is_some()) {
        return typed(&|s| parse_bool(s).map_or(CellValue::Null, CellValue::Boolean));
    }
    if present.iter().all(|s| s.trim().parse::<i64>().is_ok()) {
        return typed(&|s| {
            s.trim()
                .parse::<i64>()
                .map_or(CellValue::Null, CellValue::Integer)
        });
    }
    if present.iter().all(|s| s.trim().parse::<f64>().is_ok()) {
        return typed(&|s| {
            s.trim()
                .parse::<f64>()
                .map_or(CellValue::Null, CellValue::Float)
        });
    }
    typed(&|s| CellValue::Text(s.to_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_each_delimiter_yields_source_column_count() -> anyhow::Result<()> {
        for delimiter in DELIMITERS {
            let sep = char::from(delimiter.as_byte());
            let text = format!("id{sep}name{sep}score\n1{sep}ann{sep}2.5\n2{sep}bob{sep}3.0\n");
            let ds = parse(text.as_bytes()).map_err(anyhow::Error::msg)?;
            assert_eq!(ds.column_count(), 3, "delimiter {}", delimiter.as_str());
            assert_eq!(ds.row_count(), 2, "delimiter {}", delimiter.as_str());
        }
        Ok(())
    }

    #[test]
    fn test_single_column_is_rejected() {
        let result = parse(b"value\n10\n20\n30\n");
        assert!(result.is_err(), "single-column input must not be accepted");
    }

    #[test]
    fn test_wider_row_rejects_delimiter() {
        let result = parse_with("a,b\n1,2,3\n", Delimiter::Comma);
        assert!(result.is_err());
    }

    #[test]
    fn test_short_rows_are_null_padded() -> anyhow::Result<()> {
        let ds = parse(b"a,b,c\n1,2\n").map_err(anyhow::Error::msg)?;
        let c = ds.column("c").expect("column c");
        assert_eq!(c.values, vec![CellValue::Null]);
        Ok(())
    }

    #[test]
    fn test_latin1_fallback() -> anyhow::Result<()> {
        // "café" encoded as latin-1 is not valid UTF-8.
        let raw = b"name;city\ncaf\xe9;Paris\n";
        let ds = parse(raw).map_err(anyhow::Error::msg)?;
        let name = ds.column("name").expect("name column");
        assert_eq!(name.values, vec![CellValue::Text("café".to_owned())]);
        Ok(())
    }

    #[test]
    fn test_utf8_bom_is_stripped() -> anyhow::Result<()> {
        let ds = parse(b"\xEF\xBB\xBFid,val\n1,2\n").map_err(anyhow::Error::msg)?;
        assert_eq!(ds.column_names(), vec!["id", "val"]);
        Ok(())
    }

    #[test]
    fn test_column_type_inference() -> anyhow::Result<()> {
        let ds = parse(b"flag,count,ratio,label\ntrue,1,0.5,x\nFalse,,2,7\n")
            .map_err(anyhow::Error::msg)?;
        let col = |name: &str| ds.column(name).expect("column").values.clone();

        assert_eq!(col("flag"), vec![
            CellValue::Boolean(true),
            CellValue::Boolean(false)
        ]);
        assert_eq!(col("count"), vec![CellValue::Integer(1), CellValue::Null]);
        assert_eq!(col("ratio"), vec![CellValue::Float(0.5), CellValue::Float(2.0)]);
        assert_eq!(col("label"), vec![
            CellValue::Text("x".to_owned()),
            CellValue::Text("7".to_owned())
        ]);
        Ok(())
    }

    #[test]
    fn test_null_tokens() -> anyhow::Result<()> {
        let ds = parse(b"a,b\nNA,1\nnull,2\n,3\n").map_err(anyhow::Error::msg)?;
        assert_eq!(ds.column("a").expect("column a").null_count(), 3);
        Ok(())
    }

    #[test]
    fn test_duplicate_headers_are_renamed() -> anyhow::Result<()> {
        let ds = parse(b"a,a,b\n1,2,3\n").map_err(anyhow::Error::msg)?;
        assert_eq!(ds.column_names(), vec!["a", "a.1", "b"]);
        Ok(())
    }

    #[test]
    fn test_empty_input_fails() {
        assert!(parse(b"").is_err());
    }
}
