//! Mock implementations of the transport and solver seams.
//!
//! Transports record through shared handles so a test can still inspect
//! them after the runner has moved onto its own thread.

use std::sync::Arc;

use nalgebra::Vector3;
use parking_lot::Mutex;

use quadpose_control::transport::{JointCommand, JointTransport};
use quadpose_core::error::{KinematicsError, TransportError};
use quadpose_ik::LegIk;

// ---------------------------------------------------------------------------
// RecordingTransport
// ---------------------------------------------------------------------------

/// Transport that keeps every accepted command.
#[derive(Debug, Clone, Default)]
pub struct RecordingTransport {
    sent: Arc<Mutex<Vec<JointCommand>>>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of every command received so far, oldest first.
    pub fn commands(&self) -> Vec<JointCommand> {
        self.sent.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.sent.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sent.lock().is_empty()
    }

    pub fn last(&self) -> Option<JointCommand> {
        self.sent.lock().last().copied()
    }
}

impl JointTransport for RecordingTransport {
    fn send(&mut self, command: &JointCommand) -> Result<(), TransportError> {
        self.sent.lock().push(*command);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// FailingTransport
// ---------------------------------------------------------------------------

/// Transport that refuses selected sends and records the rest.
#[derive(Debug, Clone)]
pub struct FailingTransport {
    error: TransportError,
    fail_every: usize,
    attempts: Arc<Mutex<usize>>,
    inner: RecordingTransport,
}

impl FailingTransport {
    /// Fail every send with `error`.
    pub fn always(error: TransportError) -> Self {
        Self {
            error,
            fail_every: 1,
            attempts: Arc::default(),
            inner: RecordingTransport::new(),
        }
    }

    /// Fail every `n`-th send (the `n`-th, `2n`-th, ...) with
    /// [`TransportError::Full`].
    pub fn every(n: usize) -> Self {
        Self {
            fail_every: n.max(1),
            ..Self::always(TransportError::Full)
        }
    }

    pub fn attempts(&self) -> usize {
        *self.attempts.lock()
    }

    /// Commands that were accepted.
    pub fn accepted(&self) -> Vec<JointCommand> {
        self.inner.commands()
    }
}

impl JointTransport for FailingTransport {
    fn send(&mut self, command: &JointCommand) -> Result<(), TransportError> {
        let attempt = {
            let mut attempts = self.attempts.lock();
            *attempts += 1;
            *attempts
        };
        if attempt % self.fail_every == 0 {
            Err(self.error.clone())
        } else {
            self.inner.send(command)
        }
    }
}

// ---------------------------------------------------------------------------
// Solvers
// ---------------------------------------------------------------------------

/// Solver that returns the same triple for every target.
#[derive(Debug, Clone, Copy)]
pub struct FixedSolver {
    output: [f64; 3],
}

impl FixedSolver {
    pub const fn new(output: [f64; 3]) -> Self {
        Self { output }
    }
}

impl LegIk for FixedSolver {
    fn solve(
        &self,
        _foot: &Vector3<f64>,
        _current: &[f64; 3],
        _is_even_leg: bool,
    ) -> Result<[f64; 3], KinematicsError> {
        Ok(self.output)
    }
}

/// Solver that rejects every target.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnreachableSolver;

impl LegIk for UnreachableSolver {
    fn solve(
        &self,
        foot: &Vector3<f64>,
        _current: &[f64; 3],
        _is_even_leg: bool,
    ) -> Result<[f64; 3], KinematicsError> {
        Err(KinematicsError::Unreachable {
            extension: foot.norm(),
            min: 0.0,
            max: 0.0,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
