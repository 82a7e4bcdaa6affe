//! Model-layer errors and their mapping onto the bridge taxonomy.

use thiserror::Error;

/// Errors from model construction, training, decode, and document handling.
#[derive(Debug, Clone, Error)]
pub enum ModelError {
    /// Configuration rejected by `HmmConfig::validate`.
    #[error("invalid model config: {0}")]
    InvalidConfig(String),

    /// An observation or sequence does not match the expected dimensionality.
    #[error("dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch {
        /// Dimensionality the model or corpus was configured with.
        expected: usize,
        /// Dimensionality the caller supplied.
        got: usize,
    },

    /// Decode or serialization requested before any training happened.
    #[error("model has not been trained")]
    Untrained,

    /// Training requested over a corpus with no sequences.
    #[error("training corpus is empty")]
    EmptyCorpus,

    /// A training sequence cannot support estimation.
    #[error("degenerate sequence {index}: {reason}")]
    DegenerateSequence {
        /// Caller-assigned index of the offending sequence.
        index: usize,
        /// Why estimation is impossible.
        reason: String,
    },

    /// An observation contained NaN or infinite components.
    #[error("non-finite observation component")]
    NonFiniteObservation,

    /// Estimation or filtering produced a non-finite parameter.
    #[error("numerical instability: {0}")]
    NumericalInstability(String),

    /// A persisted document carries a schema tag this build does not read.
    #[error("unsupported document schema: {0}")]
    UnsupportedSchema(String),

    /// A persisted document failed structural validation.
    #[error("malformed model document: {0}")]
    MalformedDocument(String),
}

impl From<ModelError> for motif_common::Error {
    fn from(err: ModelError) -> Self {
        let message = err.to_string();
        match err {
            ModelError::InvalidConfig(_)
            | ModelError::DimensionMismatch { .. }
            | ModelError::Untrained
            | ModelError::EmptyCorpus
            | ModelError::NonFiniteObservation => motif_common::Error::InvalidArgument(message),

            ModelError::DegenerateSequence { .. } | ModelError::NumericalInstability(_) => {
                motif_common::Error::ModelFit(message)
            }

            ModelError::UnsupportedSchema(_) | ModelError::MalformedDocument(_) => {
                motif_common::Error::Format(message)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use motif_common::ErrorCategory;

    #[test]
    fn test_argument_errors_map_to_invalid_input() {
        let err: motif_common::Error = ModelError::Untrained.into();
        assert_eq!(err.category(), ErrorCategory::InvalidInput);

        let err: motif_common::Error = ModelError::DimensionMismatch {
            expected: 2,
            got: 3,
        }
        .into();
        assert_eq!(err.category(), ErrorCategory::InvalidInput);
    }

    #[test]
    fn test_fit_errors_map_to_model_fit() {
        let err: motif_common::Error = ModelError::DegenerateSequence {
            index: 4,
            reason: "no time-steps".into(),
        }
        .into();
        assert!(matches!(err, motif_common::Error::ModelFit(_)));
        assert!(err.to_string().contains("sequence 4"));
    }

    #[test]
    fn test_document_errors_map_to_format() {
        let err: motif_common::Error =
            ModelError::UnsupportedSchema("motif.model.v9".into()).into();
        assert!(matches!(err, motif_common::Error::Format(_)));
    }
}
