//! [`PeriodicActivity`] – runs a [`Stage`] at a fixed period.
//!
//! The activity is the kernel's execution context: it owns the cycle body
//! (typically a [`ControlLoop`][crate::ControlLoop]) and a run state.
//! [`PeriodicActivity::update`] runs exactly one cycle; the periodic driver
//! [`PeriodicActivity::run_cycles`] repeats it, sleeping out the remainder
//! of each period.
//!
//! A failing cycle stops the activity.  The error is kept as its
//! [`fault`][PeriodicActivity::fault] until the next successful `start`.

use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use ctrlk_types::KernelError;
use tracing::{error, info, warn};

use crate::stage::Stage;

pub struct PeriodicActivity<L> {
    name: String,
    period: Duration,
    body: L,
    running: bool,
    cycles: u64,
    overruns: u64,
    fault: Option<KernelError>,
}

impl<L: Stage> PeriodicActivity<L> {
    pub fn new(name: impl Into<String>, period: Duration, body: L) -> Self {
        Self {
            name: name.into(),
            period,
            body,
            running: false,
            cycles: 0,
            overruns: 0,
            fault: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn body(&self) -> &L {
        &self.body
    }

    pub fn body_mut(&mut self) -> &mut L {
        &mut self.body
    }

    /// Cycles completed since construction.
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    /// Cycles that took longer than the period.
    pub fn overruns(&self) -> u64 {
        self.overruns
    }

    /// The error that stopped the activity, if any.
    pub fn fault(&self) -> Option<&KernelError> {
        self.fault.as_ref()
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Returns `false` if already running.  Clears a previous fault.
    pub fn start(&mut self) -> bool {
        if self.running {
            return false;
        }
        self.running = true;
        self.fault = None;
        info!(activity = %self.name, period_ms = self.period.as_millis() as u64, "activity started");
        true
    }

    /// Returns `false` if not running.
    pub fn stop(&mut self) -> bool {
        if !self.running {
            return false;
        }
        self.running = false;
        info!(activity = %self.name, cycles = self.cycles, "activity stopped");
        true
    }

    /// Run one cycle.
    ///
    /// # Errors
    ///
    /// [`KernelError::NotRunning`] when the activity is stopped; otherwise
    /// the error of the failing stage, after which the activity is stopped.
    pub fn update(&mut self) -> Result<(), KernelError> {
        if !self.running {
            return Err(KernelError::NotRunning);
        }
        match self.body.update() {
            Ok(()) => {
                self.cycles += 1;
                Ok(())
            }
            Err(e) => {
                error!(activity = %self.name, cycle = self.cycles, error = %e, "cycle failed; stopping");
                self.running = false;
                self.fault = Some(e.clone());
                Err(e)
            }
        }
    }

    /// Run up to `n` cycles, one per period, until `n` is reached, the
    /// activity stops, or `shutdown` is raised.  Returns the number of cycles
    /// run.
    pub fn run_cycles(&mut self, n: u64, shutdown: &AtomicBool) -> Result<u64, KernelError> {
        let mut done = 0;
        while done < n && self.running && !shutdown.load(Ordering::SeqCst) {
            let started = Instant::now();
            self.update()?;
            done += 1;

            let elapsed = started.elapsed();
            if elapsed > self.period {
                self.overruns += 1;
                warn!(activity = %self.name, elapsed_us = elapsed.as_micros() as u64, "period overrun");
            } else if done < n {
                thread::sleep(self.period - elapsed);
            }
        }
        Ok(done)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Counts its runs and fails on the cycle numbered `fail_at`.
    struct Ticker {
        runs: u64,
        fail_at: Option<u64>,
    }

    impl Stage for Ticker {
        fn update(&mut self) -> Result<(), KernelError> {
            self.runs += 1;
            if self.fail_at == Some(self.runs) {
                return Err(KernelError::ChannelNotFound("K::Inputs".into()));
            }
            Ok(())
        }
    }

    fn activity(fail_at: Option<u64>) -> PeriodicActivity<Ticker> {
        PeriodicActivity::new("test", Duration::from_millis(1), Ticker { runs: 0, fail_at })
    }

    #[test]
    fn update_requires_running() {
        let mut a = activity(None);
        assert_eq!(a.update(), Err(KernelError::NotRunning));
        assert_eq!(a.body().runs, 0);
    }

    #[test]
    fn start_and_stop_are_edge_triggered() {
        let mut a = activity(None);
        assert!(!a.stop());
        assert!(a.start());
        assert!(!a.start());
        assert!(a.is_running());
        assert!(a.stop());
        assert!(!a.is_running());
    }

    #[test]
    fn run_cycles_runs_exactly_n() {
        let mut a = activity(None);
        a.start();
        let flag = AtomicBool::new(false);
        assert_eq!(a.run_cycles(5, &flag), Ok(5));
        assert_eq!(a.cycles(), 5);
        assert_eq!(a.body().runs, 5);
        assert!(a.is_running());
    }

    #[test]
    fn shutdown_flag_stops_before_first_cycle() {
        let mut a = activity(None);
        a.start();
        let flag = AtomicBool::new(true);
        assert_eq!(a.run_cycles(5, &flag), Ok(0));
    }

    #[test]
    fn failing_cycle_stops_and_records_fault() {
        let mut a = activity(Some(3));
        a.start();
        let flag = AtomicBool::new(false);
        let err = a.run_cycles(10, &flag).unwrap_err();
        assert!(matches!(err, KernelError::ChannelNotFound(_)));
        assert_eq!(a.cycles(), 2);
        assert!(!a.is_running());
        assert_eq!(a.fault(), Some(&err));

        assert!(a.start());
        assert!(a.fault().is_none());
    }

    #[test]
    fn control_loop_runs_under_an_activity() {
        use crate::control_loop::tests::loaded;
        use ctrlk_kernel::ControlKernel;

        let mut kernel = ControlKernel::new("K");
        let mut a = PeriodicActivity::new("loop", Duration::from_millis(1), loaded(&mut kernel));
        a.start();
        a.run_cycles(3, &AtomicBool::new(false)).unwrap();
        assert_eq!(a.body().cycles(), 3);
        assert_eq!(a.body().effectors.members()[0].applied.len(), 3);
    }
}
