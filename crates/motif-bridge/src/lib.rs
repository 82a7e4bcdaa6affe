//! Motif bridge: opaque-handle, flat-buffer access to sequence-model
//! training and streaming classification.
//!
//! Hosts that cannot construct structured objects hand the bridge raw
//! channel buffers plus shape metadata; the bridge converts them into a
//! labeled training corpus, drives training and classification on a
//! hierarchical HMM, and persists model state as a self-describing JSON
//! document. The bridge owns every model and corpus instance; callers hold
//! only opaque handles.
//!
//! # Example
//!
//! ```
//! use motif_bridge::{Bridge, SampleBatch, SampleView};
//! use motif_model::HmmConfig;
//!
//! let mut bridge = Bridge::new();
//! let model = bridge.create_model(HmmConfig::default()).unwrap();
//! let corpus = bridge.create_corpus(2).unwrap();
//!
//! let ch0 = [1.0, 1.0, 1.0];
//! let ch1 = [2.0, 2.0, 2.0];
//! let channels: [&[f64]; 2] = [&ch0, &ch1];
//! let mut batch = SampleBatch::new(2).unwrap();
//! batch.push('A', &channels, 3).unwrap();
//!
//! bridge.build_corpus(corpus, &batch).unwrap();
//! bridge.train(model, corpus).unwrap();
//!
//! let probe = SampleView::new(&channels, 3).unwrap();
//! let label = bridge.classify(model, &probe).unwrap();
//! assert_eq!(label.as_str(), "A");
//! ```

pub mod bridge;
pub mod buffer;
mod persist;
pub mod registry;

pub use bridge::Bridge;
pub use buffer::{LabeledSample, SampleBatch, SampleView};
pub use motif_common::{Error, ErrorCategory, HandleKind, Label, Result};
pub use registry::{CorpusHandle, ModelHandle};
