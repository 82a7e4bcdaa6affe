//! The caller-facing bridge: handle lifecycle, corpus building, training,
//! streaming classification, and persistence.
//!
//! All operations are synchronous and blocking; `train` and `build_corpus`
//! take time proportional to corpus size and are not cancelable. The
//! `&mut self` receivers make concurrent calls against one bridge
//! unrepresentable in safe code; distinct bridges (and therefore distinct
//! handles) are fully independent.

use crate::buffer::{SampleBatch, SampleView};
use crate::persist;
use crate::registry::{CorpusHandle, ModelHandle, Registry};
use motif_common::{Error, Label, Result};
use motif_model::{Corpus, HierarchicalHmm, HmmConfig, Sequence};
use std::path::Path;
use tracing::{debug, info};

/// Owns every model and corpus instance and exposes them through opaque
/// handles.
#[derive(Debug, Default)]
pub struct Bridge {
    registry: Registry,
}

impl Bridge {
    /// Create an empty bridge.
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a fresh, untrained model. Every call returns a new
    /// instance; handles never alias.
    pub fn create_model(&mut self, config: HmmConfig) -> Result<ModelHandle> {
        let model = HierarchicalHmm::new(config)?;
        let handle = self.registry.insert_model(model);
        debug!(model = %handle, "Model created");
        Ok(handle)
    }

    /// Allocate a fresh, empty corpus for `dimension` feature channels.
    pub fn create_corpus(&mut self, dimension: usize) -> Result<CorpusHandle> {
        let corpus = Corpus::new(dimension)?;
        let handle = self.registry.insert_corpus(corpus);
        debug!(corpus = %handle, dimension, "Corpus created");
        Ok(handle)
    }

    /// Release a model. The handle is invalid for all further operations.
    pub fn destroy_model(&mut self, handle: ModelHandle) -> Result<()> {
        self.registry.remove_model(handle)?;
        debug!(model = %handle, "Model destroyed");
        Ok(())
    }

    /// Release a corpus. The handle is invalid for all further operations.
    pub fn destroy_corpus(&mut self, handle: CorpusHandle) -> Result<()> {
        self.registry.remove_corpus(handle)?;
        debug!(corpus = %handle, "Corpus destroyed");
        Ok(())
    }

    /// Rebuild a corpus from a batch of labeled samples.
    ///
    /// The rebuild is destructive: prior corpus content is discarded
    /// unconditionally, and callers relying on accumulation across calls
    /// will lose data. Sample `j` of the batch becomes the sequence with
    /// identity `j`. Returns the number of sequences now in the corpus.
    pub fn build_corpus(&mut self, handle: CorpusHandle, batch: &SampleBatch<'_>) -> Result<usize> {
        let corpus = self.registry.corpus_mut(handle)?;
        if batch.dimension() != corpus.dimension() {
            return Err(Error::InvalidArgument(format!(
                "batch dimensionality {} != corpus dimensionality {}",
                batch.dimension(),
                corpus.dimension()
            )));
        }

        corpus.clear();
        for (index, sample) in batch.samples().iter().enumerate() {
            let mut sequence = Sequence::new(index, sample.label().clone(), batch.dimension());
            for frame in sample.view().frames() {
                if let Err(err) = sequence.record(frame) {
                    // Never leave a partial rebuild observable.
                    corpus.clear();
                    return Err(err.into());
                }
            }
            if let Err(err) = corpus.insert(sequence) {
                corpus.clear();
                return Err(err.into());
            }
        }
        debug!(corpus = %handle, sequences = corpus.len(), "Corpus rebuilt");
        Ok(corpus.len())
    }

    /// Train a model on the full contents of a corpus.
    ///
    /// On success the model's label set is exactly the corpus's label set.
    /// On failure the model is left in its pre-call state.
    pub fn train(&mut self, model: ModelHandle, corpus: CorpusHandle) -> Result<()> {
        let (hmm, data) = self.registry.model_and_corpus(model, corpus)?;
        hmm.fit(data)?;
        info!(
            model = %model,
            corpus = %corpus,
            labels = hmm.labels().len(),
            sequences = data.len(),
            "Model trained"
        );
        Ok(())
    }

    /// Classify one sequence: reset the decode state, feed every frame in
    /// order, and return the likeliest label after the final step.
    pub fn classify(&mut self, handle: ModelHandle, sample: &SampleView<'_>) -> Result<Label> {
        let model = self.registry.model_mut(handle)?;
        if !model.is_trained() {
            return Err(Error::InvalidArgument(
                "model has not been trained".to_string(),
            ));
        }
        let expected = model.dimension().unwrap_or(0);
        if sample.dimension() != expected {
            return Err(Error::InvalidArgument(format!(
                "sample dimensionality {} != trained dimensionality {expected}",
                sample.dimension()
            )));
        }
        if sample.is_empty() {
            return Err(Error::InvalidArgument(
                "sample has no time-steps".to_string(),
            ));
        }

        model.reset_decode();
        for frame in sample.frames() {
            model.step_decode(&frame)?;
        }
        let label = model
            .result()
            .likeliest()
            .cloned()
            .ok_or_else(|| Error::InvalidArgument("sample has no time-steps".to_string()))?;
        debug!(model = %handle, steps = sample.len(), label = %label, "Sequence classified");
        Ok(label)
    }

    /// Serialize a trained model into a self-describing JSON document at
    /// `path`.
    pub fn save(&self, handle: ModelHandle, path: &Path) -> Result<()> {
        let model = self.registry.model(handle)?;
        let doc = model.to_document()?;
        persist::save_document(&doc, path)?;
        info!(model = %handle, path = %path.display(), "Model saved");
        Ok(())
    }

    /// Restore a model from a document, register it under a fresh handle,
    /// and return the handle with the ordered label list.
    ///
    /// The label list is complete or the call fails outright; a partially
    /// reconstructed model is never registered.
    pub fn load(&mut self, path: &Path) -> Result<(ModelHandle, Vec<Label>)> {
        let doc = persist::load_document(path)?;
        let model = HierarchicalHmm::from_document(doc)?;
        let labels = model.labels();
        let handle = self.registry.insert_model(model);
        info!(model = %handle, labels = labels.len(), path = %path.display(), "Model restored");
        Ok((handle, labels))
    }

    /// Known labels of a model, in the label map's iteration order.
    pub fn model_labels(&self, handle: ModelHandle) -> Result<Vec<Label>> {
        Ok(self.registry.model(handle)?.labels())
    }

    /// Whether a model has been trained or restored.
    pub fn is_trained(&self, handle: ModelHandle) -> Result<bool> {
        Ok(self.registry.model(handle)?.is_trained())
    }

    /// Read-only view of a corpus.
    pub fn corpus(&self, handle: CorpusHandle) -> Result<&Corpus> {
        self.registry.corpus(handle)
    }
}
