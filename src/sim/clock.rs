//! Fixed timestep loop clock
//!
//! Turns host frame timestamps into a whole number of simulation steps.

use crate::settings::{RemainderPolicy, Settings};

/// Converts frame timestamps (nanoseconds) into step counts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoopClock {
    quantum: u64,
    policy: RemainderPolicy,
    prev: Option<u64>,
    running: bool,
    total_steps: u64,
}

impl LoopClock {
    /// A stopped clock; `quantum` is raised to at least 1 ns
    pub fn new(quantum: u64, policy: RemainderPolicy) -> Self {
        Self {
            quantum: quantum.max(1),
            policy,
            prev: None,
            running: false,
            total_steps: 0,
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(settings.step_nanos, settings.remainder_policy)
    }

    pub fn quantum(&self) -> u64 {
        self.quantum
    }

    pub fn policy(&self) -> RemainderPolicy {
        self.policy
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Steps handed out since construction
    pub fn total_steps(&self) -> u64 {
        self.total_steps
    }

    /// Start ticking; a no-op when already running
    ///
    /// The first frame after a (re)start runs exactly one step.
    pub fn start(&mut self) {
        if self.running {
            return;
        }
        self.running = true;
        self.prev = None;
        log::info!("Loop started (quantum {} ns, {})", self.quantum, self.policy.as_str());
    }

    /// Stop ticking; a no-op when already stopped
    pub fn stop(&mut self) {
        if !self.running {
            return;
        }
        self.running = false;
        log::info!("Loop stopped after {} steps", self.total_steps);
    }

    /// Number of steps to run for a frame at `now`
    pub fn advance(&mut self, now: u64) -> u64 {
        if !self.running {
            return 0;
        }

        let steps = match self.prev {
            None => {
                self.prev = Some(now);
                1
            }
            Some(prev) if now < prev => {
                // Clock went backwards: re-anchor and wait for real time to pass
                self.prev = Some(now);
                0
            }
            Some(prev) => {
                let steps = (now - prev) / self.quantum;
                self.prev = Some(match self.policy {
                    RemainderPolicy::Carry => prev + steps * self.quantum,
                    RemainderPolicy::Drop => now,
                });
                steps
            }
        };

        self.total_steps += steps;
        steps
    }
}
