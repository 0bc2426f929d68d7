//! Errors returned by hnmapped
//!
use std::path::PathBuf;

use snafu::prelude::*;

/// Errors returned by hnmapped crate
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum HnMappedError {
    /// The requested month is not available from the data source.
    #[snafu(display("No data available for {month}"))]
    NoData { month: String },

    /// File system error while reading month data.
    #[snafu(display("i/o error {path:?}: {source}"))]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    // Http connection or timeout error
    #[cfg(feature = "http")]
    #[snafu(display("HTTP error url:{url}"))]
    Http { url: String, source: reqwest::Error },

    /// Server responded with an unexpected status.
    #[snafu(display("HTTP status {code} for {url}"))]
    HttpStatus { code: u16, url: String },

    /// A month file or month index could not be deserialized.
    /// `context` names the file or url, the source error carries the json path.
    #[snafu(display("Deserialization {context}: {source}"))]
    Deserialization {
        context: String,
        source: serde_path_to_error::Error<serde_json::Error>,
    },

    /// Month key is not of the form yyyy-mm
    #[snafu(display("invalid month \"{input}\": expected yyyy-mm"))]
    InvalidMonth { input: String },

    /// Filter key is not one of the known filter inputs
    #[snafu(display("unknown filter key \"{key}\""))]
    UnknownFilterKey { key: String },

    /// Filter value is not valid for the key
    #[snafu(display("invalid value \"{value}\" for filter {key}: {message}"))]
    InvalidFilter {
        key: String,
        value: String,
        message: String,
    },

    /// Template could not be rendered
    #[snafu(display("Template error: {message}"))]
    Template { message: String },

    /// Some other error occurred
    #[snafu(display("{message}"))]
    Other { message: String },
}

impl HnMappedError {
    /// Returns true if the error means the month simply isn't there,
    /// as opposed to a transport or parsing failure.
    pub fn is_no_data(&self) -> bool {
        matches!(self, Self::NoData { .. })
    }
}
