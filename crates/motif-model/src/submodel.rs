//! Per-label sub-model: a left-to-right HMM with diagonal Gaussian
//! emissions.
//!
//! Training uses a flat start (uniform segmentation of each sequence across
//! the states) followed by a bounded number of Viterbi re-segmentation
//! passes. The state count adapts to the data: a label never gets more
//! states than its shortest training sequence has time-steps.

use crate::config::HmmConfig;
use crate::corpus::Sequence;
use crate::error::ModelError;
use motif_common::Label;
use motif_math::log_pdf_diag;
use serde::{Deserialize, Serialize};

/// Diagonal-covariance Gaussian emission for one hidden state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateEmission {
    means: Vec<f64>,
    vars: Vec<f64>,
}

impl StateEmission {
    /// Per-component means.
    pub fn means(&self) -> &[f64] {
        &self.means
    }

    /// Per-component variances (floored during estimation).
    pub fn vars(&self) -> &[f64] {
        &self.vars
    }

    fn log_pdf(&self, frame: &[f64]) -> f64 {
        log_pdf_diag(frame, &self.means, &self.vars)
    }
}

/// One label's trained sub-model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelHmm {
    label: Label,
    dimension: usize,
    states: Vec<StateEmission>,
    /// Probability of staying in a non-final state at each step.
    self_transition: f64,
}

impl LabelHmm {
    /// Train a sub-model from every sequence carrying `label`.
    ///
    /// Callers guarantee `sequences` is non-empty and dimensionally
    /// consistent (the corpus enforces that on insert).
    pub(crate) fn fit(
        label: &Label,
        sequences: &[&Sequence],
        config: &HmmConfig,
    ) -> Result<Self, ModelError> {
        debug_assert!(!sequences.is_empty());
        for seq in sequences {
            if seq.is_empty() {
                return Err(ModelError::DegenerateSequence {
                    index: seq.index(),
                    reason: "no time-steps".to_string(),
                });
            }
        }
        let dimension = sequences[0].dimension();
        debug_assert!(sequences.iter().all(|s| s.dimension() == dimension));

        let min_len = match sequences.iter().map(|s| s.len()).min() {
            Some(len) => len,
            None => return Err(ModelError::EmptyCorpus),
        };
        let num_states = config.states.min(min_len);

        let mut assignments: Vec<Vec<usize>> = sequences
            .iter()
            .map(|s| flat_assignment(s.len(), num_states))
            .collect();
        let states = estimate_emissions(
            sequences,
            &assignments,
            num_states,
            dimension,
            config.variance_floor,
            None,
        )?;
        let self_transition = estimate_self_transition(sequences, num_states);

        let mut model = Self {
            label: label.clone(),
            dimension,
            states,
            self_transition,
        };

        for _ in 0..config.refine_passes {
            let mut next = Vec::with_capacity(sequences.len());
            for seq in sequences {
                let path = model.viterbi_alignment(seq.frames()).map_err(|err| match err {
                    ModelError::NumericalInstability(_) => ModelError::DegenerateSequence {
                        index: seq.index(),
                        reason: "no admissible state alignment".to_string(),
                    },
                    other => other,
                })?;
                next.push(path);
            }
            if next == assignments {
                break;
            }
            let refined = estimate_emissions(
                sequences,
                &next,
                num_states,
                dimension,
                config.variance_floor,
                Some(&model.states),
            )?;
            model.states = refined;
            assignments = next;
        }

        model
            .validate()
            .map_err(ModelError::NumericalInstability)?;
        Ok(model)
    }

    /// The class this sub-model recognizes.
    pub fn label(&self) -> &Label {
        &self.label
    }

    /// Feature-vector dimensionality.
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Number of hidden states.
    pub fn num_states(&self) -> usize {
        self.states.len()
    }

    /// Probability of staying in a non-final state.
    pub fn self_transition(&self) -> f64 {
        self.self_transition
    }

    /// Log-probability of remaining in state `s`. The final state absorbs.
    pub(crate) fn log_stay(&self, s: usize) -> f64 {
        if s + 1 == self.states.len() {
            0.0
        } else {
            self.self_transition.ln()
        }
    }

    /// Log-probability of advancing to the next state.
    pub(crate) fn log_advance(&self) -> f64 {
        (1.0 - self.self_transition).ln()
    }

    /// Log-density of `frame` under state `s`'s emission.
    pub(crate) fn emission_log_pdf(&self, s: usize, frame: &[f64]) -> f64 {
        self.states[s].log_pdf(frame)
    }

    /// Align `frames` to states with a left-to-right Viterbi pass.
    ///
    /// The path starts in state 0 and may end in any state.
    fn viterbi_alignment(&self, frames: &[Vec<f64>]) -> Result<Vec<usize>, ModelError> {
        if frames.is_empty() {
            return Ok(Vec::new());
        }
        let num_states = self.states.len();
        let mut delta = vec![f64::NEG_INFINITY; num_states];
        delta[0] = self.states[0].log_pdf(&frames[0]);
        let mut back = vec![vec![0usize; num_states]; frames.len()];

        for (t, frame) in frames.iter().enumerate().skip(1) {
            let mut next = vec![f64::NEG_INFINITY; num_states];
            for (s, state) in self.states.iter().enumerate() {
                let stay = delta[s] + self.log_stay(s);
                let (inbound, from) = if s > 0 {
                    let advance = delta[s - 1] + self.log_advance();
                    if advance > stay {
                        (advance, s - 1)
                    } else {
                        (stay, s)
                    }
                } else {
                    (stay, s)
                };
                next[s] = inbound + state.log_pdf(frame);
                back[t][s] = from;
            }
            delta = next;
        }

        let mut best_state = 0;
        let mut best_score = delta[0];
        for (s, &score) in delta.iter().enumerate().skip(1) {
            if score > best_score {
                best_score = score;
                best_state = s;
            }
        }
        if best_score == f64::NEG_INFINITY {
            return Err(ModelError::NumericalInstability(
                "no admissible state alignment".to_string(),
            ));
        }

        let mut path = vec![0usize; frames.len()];
        path[frames.len() - 1] = best_state;
        for t in (1..frames.len()).rev() {
            path[t - 1] = back[t][path[t]];
        }
        Ok(path)
    }

    /// Structural and finiteness checks shared by training and document
    /// restore.
    pub(crate) fn validate(&self) -> Result<(), String> {
        if self.dimension == 0 {
            return Err("dimension must be >= 1".to_string());
        }
        if self.states.is_empty() {
            return Err("sub-model has no states".to_string());
        }
        if !(self.self_transition > 0.0 && self.self_transition < 1.0) {
            return Err(format!(
                "self_transition {} outside (0, 1)",
                self.self_transition
            ));
        }
        for (s, state) in self.states.iter().enumerate() {
            if state.means.len() != self.dimension || state.vars.len() != self.dimension {
                return Err(format!("state {s} has wrong dimensionality"));
            }
            for (d, (mean, var)) in state.means.iter().zip(&state.vars).enumerate() {
                if !mean.is_finite() {
                    return Err(format!("state {s} mean[{d}] is not finite"));
                }
                if !var.is_finite() || *var <= 0.0 {
                    return Err(format!("state {s} var[{d}] must be positive and finite"));
                }
            }
        }
        Ok(())
    }
}

/// Uniform segmentation: frame `t` of a length-`len` sequence lands in
/// state `t * num_states / len`. Surjective whenever `num_states <= len`.
fn flat_assignment(len: usize, num_states: usize) -> Vec<usize> {
    (0..len)
        .map(|t| (t * num_states / len).min(num_states - 1))
        .collect()
}

/// Gaussian MLE per state over the assigned frames.
///
/// A state left empty by re-segmentation keeps its previous parameters.
fn estimate_emissions(
    sequences: &[&Sequence],
    assignments: &[Vec<usize>],
    num_states: usize,
    dimension: usize,
    variance_floor: f64,
    previous: Option<&[StateEmission]>,
) -> Result<Vec<StateEmission>, ModelError> {
    let mut counts = vec![0usize; num_states];
    let mut sums = vec![vec![0.0f64; dimension]; num_states];
    let mut sq_sums = vec![vec![0.0f64; dimension]; num_states];

    for (seq, assignment) in sequences.iter().zip(assignments) {
        for (frame, &s) in seq.frames().iter().zip(assignment) {
            counts[s] += 1;
            for d in 0..dimension {
                sums[s][d] += frame[d];
                sq_sums[s][d] += frame[d] * frame[d];
            }
        }
    }

    let mut states = Vec::with_capacity(num_states);
    for s in 0..num_states {
        if counts[s] == 0 {
            match previous {
                Some(prev) => {
                    states.push(prev[s].clone());
                    continue;
                }
                None => {
                    return Err(ModelError::NumericalInstability(format!(
                        "state {s} received no frames during flat start"
                    )))
                }
            }
        }
        let n = counts[s] as f64;
        let mut means = Vec::with_capacity(dimension);
        let mut vars = Vec::with_capacity(dimension);
        for d in 0..dimension {
            let mean = sums[s][d] / n;
            let var = (sq_sums[s][d] / n - mean * mean).max(variance_floor);
            means.push(mean);
            vars.push(var);
        }
        states.push(StateEmission { means, vars });
    }
    Ok(states)
}

/// Moment-match the stay probability from the mean dwell time the training
/// lengths imply, clamped away from the degenerate endpoints.
fn estimate_self_transition(sequences: &[&Sequence], num_states: usize) -> f64 {
    let mean_len =
        sequences.iter().map(|s| s.len()).sum::<usize>() as f64 / sequences.len() as f64;
    let mean_dwell = (mean_len / num_states as f64).max(1.0);
    (1.0 - 1.0 / mean_dwell).clamp(0.05, 0.95)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seq(index: usize, label: char, frames: &[&[f64]]) -> Sequence {
        let mut s = Sequence::new(index, Label::from_char(label), frames[0].len());
        for f in frames {
            s.record(f.to_vec()).unwrap();
        }
        s
    }

    #[test]
    fn test_flat_assignment_covers_every_state() {
        for (len, states) in [(3, 2), (5, 5), (10, 3), (7, 1)] {
            let assignment = flat_assignment(len, states);
            assert_eq!(assignment.len(), len);
            for s in 0..states {
                assert!(assignment.contains(&s), "state {s} empty for len {len}");
            }
            // Monotone non-decreasing, left to right.
            assert!(assignment.windows(2).all(|w| w[0] <= w[1]));
        }
    }

    #[test]
    fn test_fit_clamps_states_to_shortest_sequence() {
        let s = seq(0, 'A', &[&[1.0], &[1.0], &[1.0]]);
        let config = HmmConfig::default(); // 10 states requested
        let model = LabelHmm::fit(&Label::from_char('A'), &[&s], &config).unwrap();
        assert_eq!(model.num_states(), 3);
        assert_eq!(model.dimension(), 1);
    }

    #[test]
    fn test_fit_rejects_empty_sequence() {
        let empty = Sequence::new(7, Label::from_char('A'), 1);
        let err = LabelHmm::fit(&Label::from_char('A'), &[&empty], &HmmConfig::default())
            .unwrap_err();
        assert!(matches!(
            err,
            ModelError::DegenerateSequence { index: 7, .. }
        ));
    }

    #[test]
    fn test_fit_estimates_means_from_constant_data() {
        let s = seq(0, 'A', &[&[2.0, -1.0], &[2.0, -1.0], &[2.0, -1.0], &[2.0, -1.0]]);
        let config = HmmConfig {
            states: 2,
            ..Default::default()
        };
        let model = LabelHmm::fit(&Label::from_char('A'), &[&s], &config).unwrap();
        for state in &model.states {
            assert!((state.means()[0] - 2.0).abs() < 1e-9);
            assert!((state.means()[1] + 1.0).abs() < 1e-9);
            // Zero empirical variance must hit the floor, not zero.
            assert!(state.vars().iter().all(|v| *v >= config.variance_floor));
        }
    }

    #[test]
    fn test_fit_separates_two_phases() {
        // First half near 0, second half near 10: the two states should
        // land on the two plateaus.
        let s = seq(
            0,
            'A',
            &[&[0.0], &[0.1], &[-0.1], &[0.0], &[10.0], &[10.1], &[9.9], &[10.0]],
        );
        let config = HmmConfig {
            states: 2,
            ..Default::default()
        };
        let model = LabelHmm::fit(&Label::from_char('A'), &[&s], &config).unwrap();
        assert!(model.states[0].means()[0] < 1.0);
        assert!(model.states[1].means()[0] > 9.0);
    }

    #[test]
    fn test_viterbi_path_is_monotone() {
        let s = seq(
            0,
            'A',
            &[&[0.0], &[0.0], &[5.0], &[5.0], &[10.0], &[10.0]],
        );
        let config = HmmConfig {
            states: 3,
            ..Default::default()
        };
        let model = LabelHmm::fit(&Label::from_char('A'), &[&s], &config).unwrap();
        let path = model.viterbi_alignment(s.frames()).unwrap();
        assert_eq!(path[0], 0);
        assert!(path.windows(2).all(|w| w[0] <= w[1] && w[1] - w[0] <= 1));
    }

    #[test]
    fn test_self_transition_moment_matching() {
        // Mean length 8, 2 states -> dwell 4 -> stay 0.75.
        let a = seq(0, 'A', &[&[0.0] as &[f64]; 8]);
        let p = estimate_self_transition(&[&a], 2);
        assert!((p - 0.75).abs() < 1e-9);

        // Dwell of 1 clamps to the lower bound instead of 0.
        let b = seq(1, 'A', &[&[0.0] as &[f64]; 2]);
        let p = estimate_self_transition(&[&b], 2);
        assert!((p - 0.05).abs() < 1e-9);
    }

    #[test]
    fn test_validate_catches_non_finite_parameters() {
        let s = seq(0, 'A', &[&[1.0], &[2.0]]);
        let config = HmmConfig {
            states: 1,
            ..Default::default()
        };
        let mut model = LabelHmm::fit(&Label::from_char('A'), &[&s], &config).unwrap();
        model.states[0].means[0] = f64::NAN;
        assert!(model.validate().is_err());
    }

    #[test]
    fn test_fit_is_deterministic() {
        let s0 = seq(0, 'A', &[&[0.0], &[1.0], &[2.0], &[3.0]]);
        let s1 = seq(1, 'A', &[&[0.5], &[1.5], &[2.5], &[3.5], &[4.0]]);
        let config = HmmConfig {
            states: 3,
            ..Default::default()
        };
        let m1 = LabelHmm::fit(&Label::from_char('A'), &[&s0, &s1], &config).unwrap();
        let m2 = LabelHmm::fit(&Label::from_char('A'), &[&s0, &s1], &config).unwrap();
        assert_eq!(m1, m2);
    }
}
