//! Dataset loading from raw object bytes.
//!
//! The format is chosen from the file extension, then each format walks an
//! ordered list of parsing strategies and keeps the first that succeeds:
//!
//! - `.csv` / `.tsv`: every delimiter in [`delimited::DELIMITERS`] under
//!   every encoding in [`delimited::ENCODINGS`]; a parse only counts when it
//!   yields more than one column.
//! - `.json`: a single JSON document, then newline-delimited JSON.
//!
//! Loading is a pure transform over the bytes it is given.

pub mod delimited;
pub mod json;

use crate::dataset::Dataset;
use crate::error::{PlatformError, Result};

/// Input formats the loader recognizes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SourceFormat {
    Delimited,
    Json,
}

impl SourceFormat {
    /// Picks the format from the lowercased extension of `filename`.
    ///
    /// # Errors
    ///
    /// Returns [`PlatformError::UnsupportedFormat`] for any other extension.
    pub fn from_filename(filename: &str) -> Result<Self> {
        let ext = file_extension(filename);
        match ext.as_str() {
            "csv" | "tsv" => Ok(Self::Delimited),
            "json" => Ok(Self::Json),
            _ => Err(PlatformError::UnsupportedFormat {
                file: filename.to_owned(),
                extension: ext,
            }),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Delimited => "delimited",
            Self::Json => "json",
        }
    }
}

fn file_extension(filename: &str) -> String {
    let base = filename.rsplit('/').next().unwrap_or(filename);
    base.rsplit_once('.')
        .map(|(_, ext)| ext.to_lowercase())
        .unwrap_or_default()
}

/// Parses `raw` into a [`Dataset`] according to the extension of `filename`.
///
/// # Errors
///
/// - [`PlatformError::UnsupportedFormat`] for unrecognized extensions
/// - [`PlatformError::ParseFailure`] when every parsing strategy fails
pub fn load(filename: &str, raw: &[u8]) -> Result<Dataset> {
    let format = SourceFormat::from_filename(filename)?;
    let parsed = match format {
        SourceFormat::Delimited => delimited::parse(raw),
        SourceFormat::Json => json::parse(raw),
    };

    parsed
        .inspect(|ds| {
            tracing::debug!(
                file = filename,
                format = format.as_str(),
                rows = ds.row_count(),
                columns = ds.column_count(),
                "Parsed object"
            );
        })
        .map_err(|reason| PlatformError::ParseFailure {
            file: filename.to_owned(),
            reason,
        })
}
