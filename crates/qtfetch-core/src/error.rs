//! Crate-level error type.

use thiserror::Error;

use crate::parser::ManifestError;
use crate::resolver::ResolveError;
use crate::source::SourceError;

/// Any failure surfaced by the fetch entry points.
#[derive(Error, Debug)]
pub enum Error {
    /// Manifest retrieval failed.
    #[error(transparent)]
    Source(#[from] SourceError),

    /// The manifest could not be parsed or failed validation.
    #[error(transparent)]
    Manifest(#[from] ManifestError),

    /// Module resolution or archive expansion failed.
    #[error(transparent)]
    Resolve(#[from] ResolveError),
}

/// Result alias for the fetch entry points.
pub type Result<T> = std::result::Result<T, Error>;
