//! Visual progress publisher
//!
//! The render layer samples progress once per frame and evaluates its own
//! transforms from it. Publishing only happens when progress or threshold
//! actually change; nothing is pushed per frame.

use tokio::sync::watch;

/// Value observed by render-layer consumers
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct VisualSample {
    /// Collapse progress, always within `[0, 1]`
    pub progress: f64,
    /// Threshold the progress is measured against
    pub threshold: f64,
}

/// Write side, owned by the coordinator
pub struct VisualProgressPublisher {
    tx: watch::Sender<VisualSample>,
}

impl VisualProgressPublisher {
    pub fn new(initial: VisualSample) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self { tx }
    }

    /// Mirror a new sample. Works with or without live samplers.
    pub fn publish(&self, sample: VisualSample) {
        let sample = VisualSample {
            progress: sample.progress.clamp(0.0, 1.0),
            ..sample
        };
        self.tx.send_if_modified(|current| {
            if *current == sample {
                return false;
            }
            *current = sample;
            true
        });
    }

    /// Latest published sample
    pub fn current(&self) -> VisualSample {
        *self.tx.borrow()
    }

    /// Connect a new consumer; it observes the latest sample immediately
    pub fn subscribe(&self) -> ProgressSampler {
        ProgressSampler {
            rx: self.tx.subscribe(),
        }
    }

    pub fn sampler_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

/// Read-only, continuously sampled view of progress
#[derive(Clone, Debug)]
pub struct ProgressSampler {
    rx: watch::Receiver<VisualSample>,
}

impl ProgressSampler {
    /// Latest sample, marking it as seen
    pub fn sample(&mut self) -> VisualSample {
        *self.rx.borrow_and_update()
    }

    /// Latest sample without marking it as seen
    pub fn peek(&self) -> VisualSample {
        *self.rx.borrow()
    }

    /// Latest progress value
    pub fn progress(&self) -> f64 {
        self.peek().progress
    }

    /// Whether a sample newer than the last `sample()` call exists
    pub fn has_changed(&self) -> bool {
        self.rx.has_changed().unwrap_or(false)
    }

    /// Wait for the next published sample.
    ///
    /// Returns `None` once the publisher has been dropped.
    pub async fn changed(&mut self) -> Option<VisualSample> {
        self.rx.changed().await.ok()?;
        Some(*self.rx.borrow_and_update())
    }
}
