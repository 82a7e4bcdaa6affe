//! Training corpus: labeled, variable-length sequences of feature vectors.

use crate::error::ModelError;
use motif_common::Label;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// One labeled training example: an ordered series of feature vectors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sequence {
    index: usize,
    label: Label,
    dimension: usize,
    frames: Vec<Vec<f64>>,
}

impl Sequence {
    /// Create an empty sequence with a caller-assigned identity.
    pub fn new(index: usize, label: Label, dimension: usize) -> Self {
        Self {
            index,
            label,
            dimension,
            frames: Vec::new(),
        }
    }

    /// Append one feature vector, preserving input order.
    pub fn record(&mut self, frame: Vec<f64>) -> Result<(), ModelError> {
        if frame.len() != self.dimension {
            return Err(ModelError::DimensionMismatch {
                expected: self.dimension,
                got: frame.len(),
            });
        }
        self.frames.push(frame);
        Ok(())
    }

    /// Caller-assigned identity within the corpus.
    pub fn index(&self) -> usize {
        self.index
    }

    /// The class this sequence is an example of.
    pub fn label(&self) -> &Label {
        &self.label
    }

    /// Feature-vector dimensionality.
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Number of time-steps recorded so far.
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Whether the sequence has no time-steps.
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// The recorded frames, in input order.
    pub fn frames(&self) -> &[Vec<f64>] {
        &self.frames
    }
}

/// The full set of labeled training sequences.
///
/// Sequence identities are caller-assigned; inserting at an existing index
/// replaces that entry. Every contained sequence has dimensionality exactly
/// equal to the corpus dimensionality.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Corpus {
    dimension: usize,
    column_names: Vec<String>,
    sequences: BTreeMap<usize, Sequence>,
}

impl Corpus {
    /// Create an empty corpus with the given feature dimensionality.
    pub fn new(dimension: usize) -> Result<Self, ModelError> {
        if dimension == 0 {
            return Err(ModelError::InvalidConfig(
                "corpus dimensionality must be >= 1".to_string(),
            ));
        }
        let column_names = (0..dimension).map(|i| format!("col{i}")).collect();
        Ok(Self {
            dimension,
            column_names,
            sequences: BTreeMap::new(),
        })
    }

    /// Replace the per-column names.
    pub fn set_column_names(&mut self, names: Vec<String>) -> Result<(), ModelError> {
        if names.len() != self.dimension {
            return Err(ModelError::DimensionMismatch {
                expected: self.dimension,
                got: names.len(),
            });
        }
        self.column_names = names;
        Ok(())
    }

    /// Per-column names.
    pub fn column_names(&self) -> &[String] {
        &self.column_names
    }

    /// Insert a sequence under its caller-assigned index, replacing any
    /// existing sequence with the same index.
    pub fn insert(&mut self, sequence: Sequence) -> Result<(), ModelError> {
        if sequence.dimension() != self.dimension {
            return Err(ModelError::DimensionMismatch {
                expected: self.dimension,
                got: sequence.dimension(),
            });
        }
        self.sequences.insert(sequence.index(), sequence);
        Ok(())
    }

    /// Discard every sequence. Dimensionality and column names survive.
    pub fn clear(&mut self) {
        self.sequences.clear();
    }

    /// Feature-vector dimensionality.
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Number of contained sequences.
    pub fn len(&self) -> usize {
        self.sequences.len()
    }

    /// Whether the corpus holds no sequences.
    pub fn is_empty(&self) -> bool {
        self.sequences.is_empty()
    }

    /// Iterate sequences in index order.
    pub fn sequences(&self) -> impl Iterator<Item = &Sequence> {
        self.sequences.values()
    }

    /// Look up one sequence by its caller-assigned index.
    pub fn sequence(&self, index: usize) -> Option<&Sequence> {
        self.sequences.get(&index)
    }

    /// The distinct labels present, in label order.
    pub fn labels(&self) -> Vec<Label> {
        self.sequences
            .values()
            .map(|s| s.label().clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}
