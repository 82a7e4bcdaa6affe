//! Self-describing persisted model document.
//!
//! The document carries everything needed to reconstruct a trained
//! hierarchy: schema tag, generation timestamp, dimensionality,
//! configuration, and the full per-label parameter set. It is written and
//! read in full on every save/load; there is no incremental persistence.

use crate::config::HmmConfig;
use crate::submodel::LabelHmm;
use motif_common::Label;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Schema tag this build writes and reads.
pub const MODEL_SCHEMA: &str = "motif.model.v1";

/// Versioned envelope wrapping a trained hierarchy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelDocument {
    /// Schema tag for compatibility checks.
    pub schema: String,
    /// RFC-3339 timestamp of document creation.
    pub generated_at: String,
    /// Feature-vector dimensionality the hierarchy was trained on.
    pub dimension: usize,
    /// Hierarchy configuration.
    pub config: HmmConfig,
    /// Per-label sub-models, keyed by label.
    pub models: BTreeMap<Label, LabelHmm>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::{Corpus, Sequence};
    use crate::hierarchical::HierarchicalHmm;

    fn trained() -> HierarchicalHmm {
        let mut corpus = Corpus::new(1).unwrap();
        for (i, (label, value)) in [('A', 0.0), ('B', 5.0)].iter().enumerate() {
            let mut seq = Sequence::new(i, Label::from_char(*label), 1);
            for _ in 0..4 {
                seq.record(vec![*value]).unwrap();
            }
            corpus.insert(seq).unwrap();
        }
        let mut model = HierarchicalHmm::new(HmmConfig {
            states: 2,
            ..Default::default()
        })
        .unwrap();
        model.fit(&corpus).unwrap();
        model
    }

    #[test]
    fn test_document_json_round_trip() {
        let model = trained();
        let doc = model.to_document().unwrap();
        assert_eq!(doc.schema, MODEL_SCHEMA);
        assert_eq!(doc.dimension, 1);

        let json = serde_json::to_string_pretty(&doc).unwrap();
        let parsed: ModelDocument = serde_json::from_str(&json).unwrap();
        let restored = HierarchicalHmm::from_document(parsed).unwrap();

        assert_eq!(restored.labels(), model.labels());
        assert_eq!(restored.dimension(), model.dimension());
    }

    #[test]
    fn test_document_is_self_describing() {
        let doc = trained().to_document().unwrap();
        let json = serde_json::to_value(&doc).unwrap();
        for field in ["schema", "generated_at", "dimension", "config", "models"] {
            assert!(json.get(field).is_some(), "missing field {field}");
        }
    }
}
