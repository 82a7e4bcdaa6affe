//! Motif sequence model library.
//!
//! Implements the SequenceModel capability the bridge consumes:
//! - Labeled training corpora of fixed-dimension feature-vector sequences
//! - A hierarchy of per-label left-to-right Gaussian HMM sub-models
//! - Log-domain forward filtering for streaming classification
//! - A self-describing serde document for persistence
//!
//! The bridge crate (`motif-bridge`) owns the handle/lifecycle contract;
//! this crate owns the model semantics.

pub mod config;
pub mod corpus;
pub mod decode;
pub mod document;
pub mod error;
pub mod hierarchical;
pub mod submodel;

pub use config::HmmConfig;
pub use corpus::{Corpus, Sequence};
pub use decode::{RankedLabel, RankedResult};
pub use document::{ModelDocument, MODEL_SCHEMA};
pub use error::ModelError;
pub use hierarchical::HierarchicalHmm;
pub use submodel::LabelHmm;
