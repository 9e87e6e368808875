//! Fixed-rate control thread.
//!
//! The runner owns the controller and the transport and drives one tick per
//! period on a dedicated `pose-control` thread:
//!
//! 1. Snapshot the pose target and the joint feedback (never waits).
//! 2. Tick the controller.
//! 3. Send the joint command. A failed send drops this tick's command only.
//! 4. Stop if requested or if the operator disconnected, otherwise sleep
//!    until the next deadline.
//!
//! Ticks are never cancelled midway. A tick that overruns its period is
//! logged and the schedule restarts from the current time, so sustained
//! overruns slow the loop down instead of bunching ticks together.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use log::{debug, info, warn};

use quadpose_core::config::{ControlConfig, MotorGains};
use quadpose_core::error::QuadposeError;
use quadpose_ik::{AnalyticLegSolver, LegIk};
use quadpose_teleop::PoseCommander;

use crate::controller::{Phase, PoseController};
use crate::feedback::{FeedbackCell, StalenessMonitor};
use crate::transport::{JointCommand, JointTransport};

/// Name of the control thread.
pub const CONTROL_THREAD_NAME: &str = "pose-control";

// ---------------------------------------------------------------------------
// StopHandle
// ---------------------------------------------------------------------------

/// Shared stop flag. The loop finishes its current tick, then exits.
#[derive(Debug, Clone, Default)]
pub struct StopHandle {
    stopped: Arc<AtomicBool>,
}

impl StopHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stop(&self) {
        self.stopped.store(true, Ordering::Release);
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::Acquire)
    }
}

// ---------------------------------------------------------------------------
// Pacer
// ---------------------------------------------------------------------------

/// Deadline-based sleeper for a fixed tick period.
#[derive(Debug, Clone)]
pub struct Pacer {
    period: Duration,
    deadline: Instant,
}

impl Pacer {
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            deadline: Instant::now() + period,
        }
    }

    pub const fn period(&self) -> Duration {
        self.period
    }

    /// Sleep until the next deadline. Returns the overrun if the deadline
    /// had already passed; the schedule then restarts from now.
    pub fn wait(&mut self) -> Option<Duration> {
        let now = Instant::now();
        if now <= self.deadline {
            thread::sleep(self.deadline - now);
            self.deadline += self.period;
            None
        } else {
            let overrun = now - self.deadline;
            self.deadline = now + self.period;
            Some(overrun)
        }
    }
}

// ---------------------------------------------------------------------------
// RunSummary
// ---------------------------------------------------------------------------

/// Counters reported when the loop stops.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Ticks executed, including failed ones.
    pub ticks: u64,
    pub startup_ticks: u64,
    /// Tracking ticks where a leg had no IK solution.
    pub ik_failures: u64,
    /// Commands the transport did not accept.
    pub transport_failures: u64,
}

/// What happened on a single tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TickReport {
    Sent(JointCommand),
    /// Controller produced a command but the transport refused it.
    Dropped(JointCommand),
    /// Controller failed; nothing was sent.
    Failed,
}

// ---------------------------------------------------------------------------
// ControlRunner
// ---------------------------------------------------------------------------

pub struct ControlRunner<T, S = AnalyticLegSolver> {
    controller: PoseController<S>,
    transport: T,
    commander: PoseCommander,
    feedback: FeedbackCell,
    gains: MotorGains,
    period: Duration,
    staleness: StalenessMonitor,
    stop: StopHandle,
    tick_limit: Option<u64>,
    last_tick: Option<u64>,
    summary: RunSummary,
}

impl<T: JointTransport, S: LegIk> ControlRunner<T, S> {
    pub fn new(
        config: &ControlConfig,
        controller: PoseController<S>,
        transport: T,
        commander: PoseCommander,
        feedback: FeedbackCell,
    ) -> Self {
        Self {
            controller,
            transport,
            commander,
            feedback,
            gains: config.gains,
            period: config.tick_period(),
            staleness: StalenessMonitor::new(config.feedback_timeout()),
            stop: StopHandle::new(),
            tick_limit: None,
            last_tick: None,
            summary: RunSummary::default(),
        }
    }

    /// Stop on its own after `ticks` ticks.
    #[must_use]
    pub const fn with_tick_limit(mut self, ticks: u64) -> Self {
        self.tick_limit = Some(ticks);
        self
    }

    /// Use an externally owned stop flag.
    #[must_use]
    pub fn with_stop_handle(mut self, stop: StopHandle) -> Self {
        self.stop = stop;
        self
    }

    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    pub const fn summary(&self) -> RunSummary {
        self.summary
    }

    /// Zero-based index of the most recent tick.
    pub const fn last_tick(&self) -> Option<u64> {
        self.last_tick
    }

    pub const fn controller(&self) -> &PoseController<S> {
        &self.controller
    }

    pub const fn transport(&self) -> &T {
        &self.transport
    }

    /// Run a single tick without pacing.
    pub fn step(&mut self) -> TickReport {
        let target = self.commander.read_target();
        let snapshot = self.feedback.snapshot();
        self.staleness.observe(snapshot.age);

        let tick = self.summary.ticks;
        self.last_tick = Some(tick);
        self.summary.ticks += 1;

        let output = match self.controller.tick(&target, &snapshot.positions()) {
            Ok(output) => output,
            Err(e) => {
                self.summary.ik_failures += 1;
                warn!("Tick {tick}: {e}, skipping command");
                return TickReport::Failed;
            }
        };
        if output.phase == Phase::Startup {
            self.summary.startup_ticks += 1;
        }

        let command = JointCommand::new(output.positions, self.gains);
        match self.transport.send(&command) {
            Ok(()) => {
                debug!("Tick {tick} ({:?}): sent {:?}", output.phase, command.positions.as_array());
                TickReport::Sent(command)
            }
            Err(e) => {
                self.summary.transport_failures += 1;
                warn!("Tick {tick}: dropped joint command: {e}");
                TickReport::Dropped(command)
            }
        }
    }

    fn should_stop(&self) -> bool {
        if self.stop.is_stopped() {
            info!("Stop requested");
            return true;
        }
        if !self.commander.is_connected() {
            info!("Operator input closed, stopping");
            return true;
        }
        if self.tick_limit.is_some_and(|limit| self.summary.ticks >= limit) {
            info!("Tick limit reached");
            return true;
        }
        false
    }

    /// Run until stopped, on the calling thread.
    pub fn run(mut self) -> RunSummary {
        info!(
            "Control loop running at {:.1} Hz, {} startup steps",
            1.0 / self.period.as_secs_f64(),
            self.controller_startup_steps()
        );
        let mut pacer = Pacer::new(self.period);
        loop {
            self.step();
            if self.should_stop() {
                break;
            }
            if let Some(overrun) = pacer.wait() {
                warn!(
                    "Tick {} overran its {:?} period by {overrun:?}",
                    self.last_tick.unwrap_or_default(),
                    pacer.period()
                );
            }
        }
        info!(
            "Control loop stopped after {} ticks ({} IK failures, {} dropped commands)",
            self.summary.ticks, self.summary.ik_failures, self.summary.transport_failures
        );
        self.summary
    }

    fn controller_startup_steps(&self) -> u32 {
        if self.controller.phase() == Phase::Startup {
            self.controller.startup_steps()
        } else {
            0
        }
    }
}

impl<T, S> ControlRunner<T, S>
where
    T: JointTransport + 'static,
    S: LegIk + 'static,
{
    /// Run on a dedicated `pose-control` thread.
    pub fn spawn(self) -> Result<RunnerHandle, QuadposeError> {
        let stop = self.stop_handle();
        let handle = thread::Builder::new()
            .name(CONTROL_THREAD_NAME.to_string())
            .spawn(move || self.run())
            .map_err(|e| QuadposeError::Runtime(format!("Failed to spawn control thread: {e}")))?;
        Ok(RunnerHandle { handle, stop })
    }
}

// ---------------------------------------------------------------------------
// RunnerHandle
// ---------------------------------------------------------------------------

/// Handle to a spawned control thread.
#[derive(Debug)]
pub struct RunnerHandle {
    handle: JoinHandle<RunSummary>,
    stop: StopHandle,
}

impl RunnerHandle {
    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    pub fn stop(&self) {
        self.stop.stop();
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Wait for the loop to exit.
    pub fn join(self) -> Result<RunSummary, QuadposeError> {
        self.handle
            .join()
            .map_err(|_| QuadposeError::Runtime("Control thread panicked".into()))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
