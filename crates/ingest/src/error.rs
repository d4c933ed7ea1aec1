//! Error types produced by the `ingest` crate.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum IngestError {
    #[error("payload did not match format {0}")]
    FormatMismatch(String),
    #[error("malformed {0} payload: {1}")]
    Malformed(String, String),
    #[error("parser {0} does not support reconstruction")]
    ReconstructUnsupported(String),
    #[error("no parser in the chain accepted the payload")]
    NoParserAccepted,
}
