//! Joint feedback ingestion.
//!
//! The transport layer publishes whole [`JointFeedback`] samples into a
//! [`FeedbackCell`]; the control thread takes one snapshot per tick. Readers
//! never wait for a sample to arrive.

use std::sync::Arc;
use std::time::{Duration, Instant};

use log::{info, warn};
use parking_lot::RwLock;

use quadpose_core::error::FeedbackError;
use quadpose_core::types::{JointFeedback, JointVector};

// ---------------------------------------------------------------------------
// FeedbackCell
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy)]
struct Sample {
    feedback: JointFeedback,
    received_at: Instant,
}

/// Latest-value cell for joint feedback. Clones share the same sample.
#[derive(Debug, Clone, Default)]
pub struct FeedbackCell {
    latest: Arc<RwLock<Option<Sample>>>,
}

/// One read of a [`FeedbackCell`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeedbackSnapshot {
    /// Last sample, if any ever arrived.
    pub feedback: Option<JointFeedback>,
    /// Time since that sample arrived.
    pub age: Option<Duration>,
}

impl FeedbackSnapshot {
    /// Joint positions to steer IK with; zeros when nothing has arrived.
    pub fn positions(&self) -> JointVector {
        self.feedback.map(|f| f.positions).unwrap_or_default()
    }
}

impl FeedbackCell {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the stored sample.
    pub fn publish(&self, feedback: JointFeedback) {
        *self.latest.write() = Some(Sample {
            feedback,
            received_at: Instant::now(),
        });
    }

    /// Validate raw message fields and publish them. Invalid messages leave
    /// the previous sample in place.
    pub fn publish_slices(
        &self,
        positions: &[f64],
        velocities: &[f64],
    ) -> Result<(), FeedbackError> {
        let feedback = JointFeedback::from_slices(positions, velocities)?;
        self.publish(feedback);
        Ok(())
    }

    pub fn snapshot(&self) -> FeedbackSnapshot {
        let sample = *self.latest.read();
        FeedbackSnapshot {
            feedback: sample.map(|s| s.feedback),
            age: sample.map(|s| s.received_at.elapsed()),
        }
    }

    pub fn has_received(&self) -> bool {
        self.latest.read().is_some()
    }
}

// ---------------------------------------------------------------------------
// StalenessMonitor
// ---------------------------------------------------------------------------

/// How current the feedback is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Freshness {
    /// Nothing has arrived yet.
    Missing,
    Fresh,
    /// Last sample is older than the timeout.
    Stale,
}

/// Classifies snapshot ages and logs each transition once.
#[derive(Debug, Clone)]
pub struct StalenessMonitor {
    timeout: Duration,
    last: Option<Freshness>,
}

impl StalenessMonitor {
    pub const fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            last: None,
        }
    }

    pub fn observe(&mut self, age: Option<Duration>) -> Freshness {
        let freshness = match age {
            None => Freshness::Missing,
            Some(age) if age > self.timeout => Freshness::Stale,
            Some(_) => Freshness::Fresh,
        };
        if self.last != Some(freshness) {
            match freshness {
                Freshness::Missing => {
                    info!("No joint feedback yet, using zero joint angles for branch selection");
                }
                Freshness::Stale => warn!(
                    "Joint feedback stale (no update for {:?}), using last known values",
                    age.unwrap_or_default()
                ),
                Freshness::Fresh => info!("Joint feedback live"),
            }
            self.last = Some(freshness);
        }
        freshness
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
