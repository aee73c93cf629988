//! Pipeline error type.

use tabmod_ingest::IngestError;
use tabmod_model::ConfigError;
use tabmod_output::OutputError;
use tabmod_transform::TransformError;
use thiserror::Error;

/// Errors raised while running a load, transform, export sequence.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Transform or export was requested before a table was loaded.
    #[error("no table loaded: load an input file first")]
    MissingInput,

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Ingest(#[from] IngestError),

    #[error(transparent)]
    Transform(#[from] TransformError),

    #[error(transparent)]
    Output(#[from] OutputError),
}

/// Result type for pipeline operations.
pub type Result<T> = std::result::Result<T, PipelineError>;
