//! Simulated CNC machine.

use std::time::Duration;

use async_trait::async_trait;
use tokio::time::{sleep, Instant};

use crate::{ControlProbe, ControlSignal, MachineAdapter, MachineError};

const DEFAULT_MACHINE_NAME: &str = "MockCNC-01";
const DEFAULT_SIGNAL_POLL: Duration = Duration::from_millis(500);

const SECS_PER_BYTE: f64 = 0.05;
const MIN_ESTIMATE_SECS: f64 = 5.0;
const MAX_ESTIMATE_SECS: f64 = 60.0;

/// A machine adapter that burns wall-clock time instead of steel.
///
/// Execution is a timed wait broken into signal-poll ticks. A pause holds in
/// place without extending the planned end instant, so a run that was paused
/// past its end completes immediately on resume.
#[derive(Debug, Clone)]
pub struct MockMachineAdapter {
    name: String,
    signal_poll_interval: Duration,
}

impl MockMachineAdapter {
    pub fn new() -> Self {
        Self {
            name: DEFAULT_MACHINE_NAME.to_string(),
            signal_poll_interval: DEFAULT_SIGNAL_POLL,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Override the signal poll cadence. Tests shrink this to keep wall time
    /// down.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.signal_poll_interval = interval;
        self
    }
}

impl Default for MockMachineAdapter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MachineAdapter for MockMachineAdapter {
    fn machine_name(&self) -> &str {
        &self.name
    }

    fn estimate_duration(&self, explicit_secs: Option<i64>, code_text: &str) -> Duration {
        if let Some(secs) = explicit_secs {
            if secs > 0 {
                return Duration::from_secs(secs as u64);
            }
        }
        let rough = code_text.len() as f64 * SECS_PER_BYTE;
        Duration::from_secs_f64(rough.clamp(MIN_ESTIMATE_SECS, MAX_ESTIMATE_SECS))
    }

    async fn execute(
        &self,
        duration: Duration,
        probe: &dyn ControlProbe,
    ) -> Result<(), MachineError> {
        // The end instant is fixed up front; a pause does not push it out.
        let end = Instant::now() + duration;
        tracing::debug!(machine = %self.name, duration_secs = duration.as_secs_f64(), "run started");

        while Instant::now() < end {
            match probe.poll().await {
                ControlSignal::Cancel => {
                    tracing::info!(machine = %self.name, "run canceled");
                    return Err(MachineError::Canceled);
                }
                ControlSignal::Pause => {
                    tracing::info!(machine = %self.name, "run paused, holding");
                    loop {
                        sleep(self.signal_poll_interval).await;
                        match probe.poll().await {
                            ControlSignal::Pause => continue,
                            ControlSignal::Cancel => {
                                tracing::info!(machine = %self.name, "run canceled while held");
                                return Err(MachineError::Canceled);
                            }
                            ControlSignal::Continue => {
                                tracing::info!(machine = %self.name, "run resumed");
                                break;
                            }
                        }
                    }
                }
                ControlSignal::Continue => {
                    let remaining = end.saturating_duration_since(Instant::now());
                    sleep(self.signal_poll_interval.min(remaining)).await;
                }
            }
        }

        tracing::debug!(machine = %self.name, "run finished");
        Ok(())
    }
}
