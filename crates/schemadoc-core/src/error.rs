//! Error types for descriptor interpretation.

use thiserror::Error;

/// Errors raised while interpreting a completion response as a
/// descriptor document.
#[derive(Debug, Error)]
pub enum DescriptorError {
    /// The response text does not parse as the expected document shape.
    #[error("response is not a valid descriptor document: {0}")]
    MalformedResponse(#[source] serde_yaml::Error),

    /// The response parsed but documents no models at all.
    #[error("descriptor document contains no models")]
    MissingModels,
}
