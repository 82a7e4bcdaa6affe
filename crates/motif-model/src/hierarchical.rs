//! The label→sub-model hierarchy and its streaming decode surface.
//!
//! A `HierarchicalHmm` owns one sub-model per trained label plus the
//! incremental decode state used for streaming classification. Training is
//! atomic: the hierarchy is replaced only after every label trained, so a
//! failed fit leaves the previous state observable.

use crate::config::HmmConfig;
use crate::corpus::Corpus;
use crate::decode::{DecodeState, RankedResult};
use crate::document::{ModelDocument, MODEL_SCHEMA};
use crate::error::ModelError;
use crate::submodel::LabelHmm;
use motif_common::Label;
use std::collections::BTreeMap;
use tracing::debug;

/// A trainable, classifiable hierarchy of per-label sequence models.
#[derive(Debug, Clone)]
pub struct HierarchicalHmm {
    config: HmmConfig,
    dimension: Option<usize>,
    models: BTreeMap<Label, LabelHmm>,
    decode: DecodeState,
}

impl HierarchicalHmm {
    /// Create an untrained hierarchy.
    pub fn new(config: HmmConfig) -> Result<Self, ModelError> {
        config.validate()?;
        Ok(Self {
            config,
            dimension: None,
            models: BTreeMap::new(),
            decode: DecodeState::default(),
        })
    }

    /// The hierarchy configuration.
    pub fn config(&self) -> &HmmConfig {
        &self.config
    }

    /// Trained dimensionality, if any training or restore has happened.
    pub fn dimension(&self) -> Option<usize> {
        self.dimension
    }

    /// Whether the hierarchy has at least one trained sub-model.
    pub fn is_trained(&self) -> bool {
        !self.models.is_empty()
    }

    /// Known labels, in the label map's iteration order.
    pub fn labels(&self) -> Vec<Label> {
        self.models.keys().cloned().collect()
    }

    /// Fit one sub-model per label present in `corpus`.
    ///
    /// On success the label set is exactly the corpus's label set and the
    /// decode state is reset. On failure the hierarchy is untouched.
    pub fn fit(&mut self, corpus: &Corpus) -> Result<(), ModelError> {
        if corpus.is_empty() {
            return Err(ModelError::EmptyCorpus);
        }
        // The first fit establishes the input dimensionality; later fits
        // must match it.
        if let Some(expected) = self.dimension {
            if corpus.dimension() != expected {
                return Err(ModelError::DimensionMismatch {
                    expected,
                    got: corpus.dimension(),
                });
            }
        }

        let mut grouped: BTreeMap<&Label, Vec<&crate::corpus::Sequence>> = BTreeMap::new();
        for seq in corpus.sequences() {
            grouped.entry(seq.label()).or_default().push(seq);
        }

        let mut fresh = BTreeMap::new();
        for (label, sequences) in grouped {
            let sub = LabelHmm::fit(label, &sequences, &self.config)?;
            debug!(
                label = %label,
                states = sub.num_states(),
                sequences = sequences.len(),
                "sub-model trained"
            );
            fresh.insert(label.clone(), sub);
        }

        self.models = fresh;
        self.dimension = Some(corpus.dimension());
        self.reset_decode();
        Ok(())
    }

    /// Reset the decode state to its defined initial state, erasing any
    /// partial-sequence state from a previous traversal.
    pub fn reset_decode(&mut self) {
        self.decode = DecodeState::for_models(&self.models);
    }

    /// Feed one frame into the incremental decode and return the updated
    /// ranking.
    pub fn step_decode(&mut self, frame: &[f64]) -> Result<&RankedResult, ModelError> {
        let dimension = self.dimension.ok_or(ModelError::Untrained)?;
        if frame.len() != dimension {
            return Err(ModelError::DimensionMismatch {
                expected: dimension,
                got: frame.len(),
            });
        }
        if frame.iter().any(|v| !v.is_finite()) {
            return Err(ModelError::NonFiniteObservation);
        }
        self.decode.step(&self.models, frame)?;
        Ok(self.decode.result())
    }

    /// The ranking as of the last decode step.
    pub fn result(&self) -> &RankedResult {
        self.decode.result()
    }

    /// Serialize the trained hierarchy into a self-describing document.
    pub fn to_document(&self) -> Result<ModelDocument, ModelError> {
        let dimension = self.dimension.ok_or(ModelError::Untrained)?;
        Ok(ModelDocument {
            schema: MODEL_SCHEMA.to_string(),
            generated_at: chrono::Utc::now().to_rfc3339(),
            dimension,
            config: self.config.clone(),
            models: self.models.clone(),
        })
    }

    /// Reconstruct a hierarchy from a document.
    ///
    /// Validation is complete before anything is exposed: a document that
    /// fails any check yields an error and no model.
    pub fn from_document(doc: ModelDocument) -> Result<Self, ModelError> {
        if doc.schema != MODEL_SCHEMA {
            return Err(ModelError::UnsupportedSchema(doc.schema));
        }
        if doc.dimension == 0 {
            return Err(ModelError::MalformedDocument(
                "dimension must be >= 1".to_string(),
            ));
        }
        doc.config
            .validate()
            .map_err(|e| ModelError::MalformedDocument(e.to_string()))?;
        if doc.models.is_empty() {
            return Err(ModelError::MalformedDocument(
                "document contains no sub-models".to_string(),
            ));
        }
        for (key, sub) in &doc.models {
            if sub.label() != key {
                return Err(ModelError::MalformedDocument(format!(
                    "sub-model keyed '{key}' carries label '{}'",
                    sub.label()
                )));
            }
            if sub.dimension() != doc.dimension {
                return Err(ModelError::MalformedDocument(format!(
                    "sub-model '{key}' dimensionality {} != document dimensionality {}",
                    sub.dimension(),
                    doc.dimension
                )));
            }
            sub.validate()
                .map_err(|reason| ModelError::MalformedDocument(format!("sub-model '{key}': {reason}")))?;
        }

        let mut model = Self {
            config: doc.config,
            dimension: Some(doc.dimension),
            models: doc.models,
            decode: DecodeState::default(),
        };
        model.reset_decode();
        Ok(model)
    }
}
