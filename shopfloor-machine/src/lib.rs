//! Machine adapter abstraction.
//!
//! An adapter knows how to estimate a program's runtime and how to execute it
//! on a machine. During execution it cooperates with the caller through a
//! [`ControlProbe`]: at a fixed cadence it asks the probe whether to keep
//! cutting, hold, or abort. The adapter itself holds no queue or persistence
//! state.

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

mod mock;

pub use mock::MockMachineAdapter;

/// What the machine should do next, answered on every signal poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlSignal {
    /// Keep executing.
    Continue,
    /// Hold in place; the adapter keeps polling until told otherwise.
    Pause,
    /// Abort the run.
    Cancel,
}

/// Source of control signals during a run.
#[async_trait]
pub trait ControlProbe: Send + Sync {
    async fn poll(&self) -> ControlSignal;
}

/// Errors surfaced by [`MachineAdapter::execute`].
#[derive(Debug, Error)]
pub enum MachineError {
    /// The run was aborted via a [`ControlSignal::Cancel`]. Not a fault: the
    /// caller decides how to record it.
    #[error("execution canceled")]
    Canceled,

    /// The machine reported a fault.
    #[error("machine fault: {0}")]
    Fault(String),
}

/// A driver for one physical (or simulated) machine.
#[async_trait]
pub trait MachineAdapter: Send + Sync {
    /// Stable identifier of the machine, recorded on jobs it runs.
    fn machine_name(&self) -> &str;

    /// Expected runtime for a program. An explicit positive estimate is taken
    /// as-is; otherwise the duration is derived from the program text at
    /// 0.05 seconds per byte, clamped to 5..=60 seconds.
    fn estimate_duration(&self, explicit_secs: Option<i64>, code_text: &str) -> Duration;

    /// Run a program for `duration`, polling `probe` at the adapter's signal
    /// cadence. Returns `Ok(())` on completion, [`MachineError::Canceled`] on
    /// abort, or a fault.
    async fn execute(
        &self,
        duration: Duration,
        probe: &dyn ControlProbe,
    ) -> Result<(), MachineError>;
}
