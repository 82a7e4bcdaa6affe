//! Streaming decode: per-label forward filters and ranked results.

use crate::error::ModelError;
use crate::submodel::LabelHmm;
use motif_common::Label;
use motif_math::{log_add_exp, log_sum_exp};
use serde::Serialize;
use std::collections::BTreeMap;

/// One entry of a ranked classification result.
#[derive(Debug, Clone, Serialize)]
pub struct RankedLabel {
    /// The candidate class.
    pub label: Label,
    /// Log-posterior of the class given every frame fed so far
    /// (uniform prior over trained labels).
    pub log_posterior: f64,
}

/// Per-step classification result: labels ranked most likely first.
///
/// Ordering is deterministic: descending log-posterior, ties resolved by
/// the label map's iteration order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RankedResult {
    /// Ranked candidates, best first.
    pub entries: Vec<RankedLabel>,
    /// Number of frames consumed since the last reset.
    pub steps: usize,
}

impl RankedResult {
    /// The top-ranked label, if any frames have been consumed.
    pub fn likeliest(&self) -> Option<&Label> {
        self.entries.first().map(|e| &e.label)
    }

    /// Whether no ranking exists yet.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Forward-filter state for a single label sub-model.
#[derive(Debug, Clone)]
struct LabelFilter {
    label: Label,
    /// Normalized log state distribution.
    log_alpha: Vec<f64>,
    /// Accumulated log-evidence of the frames under this sub-model.
    log_evidence: f64,
}

/// Incremental decode state across the whole hierarchy.
#[derive(Debug, Clone, Default)]
pub(crate) struct DecodeState {
    filters: Vec<LabelFilter>,
    result: RankedResult,
}

impl DecodeState {
    /// Fresh initial state: every filter starts in its entry state with no
    /// accumulated evidence and no ranking.
    pub(crate) fn for_models(models: &BTreeMap<Label, LabelHmm>) -> Self {
        let filters = models
            .iter()
            .map(|(label, model)| {
                let mut log_alpha = vec![f64::NEG_INFINITY; model.num_states()];
                log_alpha[0] = 0.0;
                LabelFilter {
                    label: label.clone(),
                    log_alpha,
                    log_evidence: 0.0,
                }
            })
            .collect();
        Self {
            filters,
            result: RankedResult::default(),
        }
    }

    /// One forward-filter update across every sub-model, then re-rank.
    pub(crate) fn step(
        &mut self,
        models: &BTreeMap<Label, LabelHmm>,
        frame: &[f64],
    ) -> Result<(), ModelError> {
        for (filter, model) in self.filters.iter_mut().zip(models.values()) {
            debug_assert_eq!(&filter.label, model.label());
            let num_states = filter.log_alpha.len();
            let mut next = vec![f64::NEG_INFINITY; num_states];
            for s in 0..num_states {
                let stay = filter.log_alpha[s] + model.log_stay(s);
                let inbound = if s > 0 {
                    log_add_exp(stay, filter.log_alpha[s - 1] + model.log_advance())
                } else {
                    stay
                };
                next[s] = inbound + model.emission_log_pdf(s, frame);
            }
            let norm = log_sum_exp(&next);
            if !norm.is_finite() {
                return Err(ModelError::NumericalInstability(
                    "forward filter lost all probability mass".to_string(),
                ));
            }
            for v in next.iter_mut() {
                *v -= norm;
            }
            filter.log_alpha = next;
            filter.log_evidence += norm;
        }

        let evidences: Vec<f64> = self.filters.iter().map(|f| f.log_evidence).collect();
        let z = log_sum_exp(&evidences);
        let mut entries: Vec<RankedLabel> = self
            .filters
            .iter()
            .map(|f| RankedLabel {
                label: f.label.clone(),
                log_posterior: f.log_evidence - z,
            })
            .collect();
        // Stable sort: equal posteriors keep the label map's order.
        entries.sort_by(|a, b| {
            b.log_posterior
                .partial_cmp(&a.log_posterior)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        self.result = RankedResult {
            entries,
            steps: self.result.steps + 1,
        };
        Ok(())
    }

    pub(crate) fn result(&self) -> &RankedResult {
        &self.result
    }
}
