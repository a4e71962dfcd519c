//! Per-frame progress sampling
//!
//! The render loop calls [`FrameSampler::tick`] once per frame. Each tick
//! reads the latest published sample; `changed` tells the renderer whether
//! the header needs a new transform this frame.

use shy_core::{ProgressSampler, VisualSample};

use crate::transform::{HeaderLayout, HeaderTransform};

/// Result of one frame's sample
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Frame {
    /// Frames ticked so far, starting at 1
    pub index: u64,
    pub sample: VisualSample,
    /// Whether `sample` differs from the previous frame's
    pub changed: bool,
    pub transform: HeaderTransform,
}

/// Samples progress for one header
pub struct FrameSampler {
    sampler: ProgressSampler,
    layout: HeaderLayout,
    last: Option<VisualSample>,
    frames: u64,
    changed_frames: u64,
}

impl FrameSampler {
    pub fn new(sampler: ProgressSampler, layout: HeaderLayout) -> Self {
        Self {
            sampler,
            layout,
            last: None,
            frames: 0,
            changed_frames: 0,
        }
    }

    pub fn layout(&self) -> &HeaderLayout {
        &self.layout
    }

    /// Swap the header geometry; the next tick reports a change
    pub fn set_layout(&mut self, layout: HeaderLayout) {
        self.layout = layout;
        self.last = None;
    }

    /// Sample once for this frame
    pub fn tick(&mut self) -> Frame {
        let sample = self.sampler.sample();
        let changed = self.last != Some(sample);
        self.last = Some(sample);
        self.frames += 1;
        if changed {
            self.changed_frames += 1;
            tracing::trace!(
                "frame {}: progress {:.4} threshold {}",
                self.frames,
                sample.progress,
                sample.threshold
            );
        }

        Frame {
            index: self.frames,
            sample,
            changed,
            transform: HeaderTransform::at(&self.layout, sample.progress),
        }
    }

    /// Most recent sample, if any frame has been ticked
    pub fn last_sample(&self) -> Option<VisualSample> {
        self.last
    }

    pub fn frame_count(&self) -> u64 {
        self.frames
    }

    /// Frames whose sample differed from the previous one
    pub fn changed_frame_count(&self) -> u64 {
        self.changed_frames
    }
}
