//! Bounds-checked views over caller-owned flat buffers.
//!
//! The host hands the bridge per-sample channel buffers with separately
//! declared lengths. These views validate the shape once at the boundary;
//! everything downstream indexes through them, never through raw offsets.
//! Callers retain ownership of the underlying buffers, which must stay
//! valid only for the duration of each call (enforced by the borrows).

use motif_common::{Error, Label, Result};

/// One sample: `dimension` channel slices, each holding at least `len`
/// time-steps. `channels[i][t]` is feature `i` at time `t`.
#[derive(Debug, Clone)]
pub struct SampleView<'a> {
    channels: Vec<&'a [f64]>,
    len: usize,
}

impl<'a> SampleView<'a> {
    /// Validate the declared shape against the actual buffers.
    pub fn new(channels: &[&'a [f64]], len: usize) -> Result<Self> {
        if channels.is_empty() {
            return Err(Error::InvalidArgument(
                "sample has no feature channels".to_string(),
            ));
        }
        for (i, channel) in channels.iter().enumerate() {
            if channel.len() < len {
                return Err(Error::InvalidArgument(format!(
                    "channel {i} holds {} time-steps but {len} were declared",
                    channel.len()
                )));
            }
        }
        Ok(Self {
            channels: channels.to_vec(),
            len,
        })
    }

    /// Number of feature channels.
    pub fn dimension(&self) -> usize {
        self.channels.len()
    }

    /// Declared number of time-steps.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the sample declares zero time-steps.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Assemble the feature vector at time-step `t`, in channel order.
    pub fn frame(&self, t: usize) -> Vec<f64> {
        debug_assert!(t < self.len);
        self.channels.iter().map(|channel| channel[t]).collect()
    }

    /// Iterate frames in time order.
    pub fn frames(&self) -> impl Iterator<Item = Vec<f64>> + '_ {
        (0..self.len).map(move |t| self.frame(t))
    }
}

/// One labeled sample within a batch.
#[derive(Debug, Clone)]
pub struct LabeledSample<'a> {
    label: Label,
    view: SampleView<'a>,
}

impl<'a> LabeledSample<'a> {
    /// The sample's class label.
    pub fn label(&self) -> &Label {
        &self.label
    }

    /// The validated buffer view.
    pub fn view(&self) -> &SampleView<'a> {
        &self.view
    }
}

/// A batch of labeled samples sharing one dimensionality.
#[derive(Debug, Clone)]
pub struct SampleBatch<'a> {
    dimension: usize,
    samples: Vec<LabeledSample<'a>>,
}

impl<'a> SampleBatch<'a> {
    /// Create an empty batch for `dimension` feature channels.
    pub fn new(dimension: usize) -> Result<Self> {
        if dimension == 0 {
            return Err(Error::InvalidArgument(
                "batch dimensionality must be >= 1".to_string(),
            ));
        }
        Ok(Self {
            dimension,
            samples: Vec::new(),
        })
    }

    /// Append one labeled sample, validating its shape.
    pub fn push(
        &mut self,
        label: impl Into<Label>,
        channels: &[&'a [f64]],
        len: usize,
    ) -> Result<()> {
        let view = SampleView::new(channels, len)?;
        if view.dimension() != self.dimension {
            return Err(Error::InvalidArgument(format!(
                "sample has {} channels but the batch dimensionality is {}",
                view.dimension(),
                self.dimension
            )));
        }
        self.samples.push(LabeledSample {
            label: label.into(),
            view,
        });
        Ok(())
    }

    /// Feature-channel count shared by every sample.
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Number of samples pushed so far.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Whether the batch holds no samples.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// The validated samples, in push order.
    pub fn samples(&self) -> &[LabeledSample<'a>] {
        &self.samples
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_view_rejects_short_channel() {
        let ch0 = [1.0, 2.0, 3.0];
        let ch1 = [4.0, 5.0];
        let err = SampleView::new(&[&ch0, &ch1], 3).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
        assert!(err.to_string().contains("channel 1"));
    }

    #[test]
    fn test_view_rejects_no_channels() {
        assert!(SampleView::new(&[], 0).is_err());
    }

    #[test]
    fn test_view_allows_longer_channels_than_declared() {
        let ch0 = [1.0, 2.0, 3.0, 4.0];
        let view = SampleView::new(&[&ch0], 2).unwrap();
        assert_eq!(view.len(), 2);
        assert_eq!(view.frames().count(), 2);
    }

    #[test]
    fn test_frame_assembles_across_channels() {
        let ch0 = [1.0, 2.0];
        let ch1 = [10.0, 20.0];
        let view = SampleView::new(&[&ch0, &ch1], 2).unwrap();
        assert_eq!(view.frame(0), vec![1.0, 10.0]);
        assert_eq!(view.frame(1), vec![2.0, 20.0]);
    }

    #[test]
    fn test_batch_rejects_zero_dimension() {
        assert!(SampleBatch::new(0).is_err());
    }

    #[test]
    fn test_batch_rejects_channel_count_mismatch() {
        let ch0 = [1.0];
        let mut batch = SampleBatch::new(2).unwrap();
        let err = batch.push('A', &[&ch0], 1).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
        assert!(batch.is_empty());
    }

    #[test]
    fn test_batch_preserves_push_order() {
        let ch = [0.0, 0.0];
        let mut batch = SampleBatch::new(1).unwrap();
        batch.push('B', &[&ch], 2).unwrap();
        batch.push('A', &[&ch], 1).unwrap();
        let labels: Vec<&str> = batch.samples().iter().map(|s| s.label().as_str()).collect();
        assert_eq!(labels, ["B", "A"]);
        assert_eq!(batch.samples()[1].view().len(), 1);
    }
}
