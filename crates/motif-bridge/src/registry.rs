//! Opaque handles and the instance arena behind them.
//!
//! Every create call allocates a genuinely fresh entry under a
//! monotonically increasing id. Ids are never reused within a bridge, so a
//! handle that survives its destroy call can never alias a newer instance;
//! it simply stops resolving.

use motif_common::{Error, HandleKind, Result};
use motif_model::{Corpus, HierarchicalHmm};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Opaque reference to a bridge-owned model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModelHandle(u64);

impl fmt::Display for ModelHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque reference to a bridge-owned corpus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CorpusHandle(u64);

impl fmt::Display for CorpusHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Arena of live model and corpus instances.
#[derive(Debug, Default)]
pub(crate) struct Registry {
    models: HashMap<u64, HierarchicalHmm>,
    corpora: HashMap<u64, Corpus>,
    next_id: u64,
}

impl Registry {
    fn allocate(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    pub(crate) fn insert_model(&mut self, model: HierarchicalHmm) -> ModelHandle {
        let id = self.allocate();
        self.models.insert(id, model);
        ModelHandle(id)
    }

    pub(crate) fn insert_corpus(&mut self, corpus: Corpus) -> CorpusHandle {
        let id = self.allocate();
        self.corpora.insert(id, corpus);
        CorpusHandle(id)
    }

    pub(crate) fn model(&self, handle: ModelHandle) -> Result<&HierarchicalHmm> {
        self.models.get(&handle.0).ok_or(Error::InvalidHandle {
            kind: HandleKind::Model,
            id: handle.0,
        })
    }

    pub(crate) fn model_mut(&mut self, handle: ModelHandle) -> Result<&mut HierarchicalHmm> {
        self.models.get_mut(&handle.0).ok_or(Error::InvalidHandle {
            kind: HandleKind::Model,
            id: handle.0,
        })
    }

    pub(crate) fn corpus(&self, handle: CorpusHandle) -> Result<&Corpus> {
        self.corpora.get(&handle.0).ok_or(Error::InvalidHandle {
            kind: HandleKind::Corpus,
            id: handle.0,
        })
    }

    pub(crate) fn corpus_mut(&mut self, handle: CorpusHandle) -> Result<&mut Corpus> {
        self.corpora.get_mut(&handle.0).ok_or(Error::InvalidHandle {
            kind: HandleKind::Corpus,
            id: handle.0,
        })
    }

    /// Resolve a model mutably and a corpus immutably in one call.
    ///
    /// The two live in disjoint maps, so the borrows do not conflict.
    pub(crate) fn model_and_corpus(
        &mut self,
        model: ModelHandle,
        corpus: CorpusHandle,
    ) -> Result<(&mut HierarchicalHmm, &Corpus)> {
        let corpus_ref = self.corpora.get(&corpus.0).ok_or(Error::InvalidHandle {
            kind: HandleKind::Corpus,
            id: corpus.0,
        })?;
        let model_ref = self.models.get_mut(&model.0).ok_or(Error::InvalidHandle {
            kind: HandleKind::Model,
            id: model.0,
        })?;
        Ok((model_ref, corpus_ref))
    }

    pub(crate) fn remove_model(&mut self, handle: ModelHandle) -> Result<()> {
        self.models
            .remove(&handle.0)
            .map(|_| ())
            .ok_or(Error::InvalidHandle {
                kind: HandleKind::Model,
                id: handle.0,
            })
    }

    pub(crate) fn remove_corpus(&mut self, handle: CorpusHandle) -> Result<()> {
        self.corpora
            .remove(&handle.0)
            .map(|_| ())
            .ok_or(Error::InvalidHandle {
                kind: HandleKind::Corpus,
                id: handle.0,
            })
    }
}
