//! Bounded cycle loop with cooperative cancellation.
//!
//! Hosts that own an event loop call [`Engine::execute_one_cycle`] from their
//! own tick. Batch hosts use [`CycleDriver`] instead: it runs cycles until a
//! limit, a cancel request, an engine stop or a handler error, whichever comes
//! first. Cancellation is checked between cycles only; a cycle in flight
//! always completes.

use std::ops::ControlFlow;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::engine::{Engine, EngineError, SinkOutputs};

/// Why a driver run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The cycle limit was reached.
    Completed,
    /// The cancel flag was raised.
    Cancelled,
    /// The engine was not running, or stopped itself.
    EngineStopped,
    /// The per-cycle callback asked to stop.
    Callback,
}

/// Summary of a driver run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DriverReport {
    /// Cycles executed during this run.
    pub cycles: u64,
    /// Why the run ended.
    pub reason: StopReason,
}

/// Runs an engine in a loop until told to stop.
#[derive(Debug, Clone, Default)]
pub struct CycleDriver {
    cancel: Arc<AtomicBool>,
}

impl CycleDriver {
    /// A driver with a fresh cancel flag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Shared cancel flag, e.g. for a Ctrl-C handler.
    pub fn cancel_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancel)
    }

    /// Requests cancellation before the next cycle.
    pub fn cancel(&self) {
        self.cancel.store(true, Ordering::SeqCst);
    }

    /// Returns true once cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancel.load(Ordering::SeqCst)
    }

    /// Clears a previous cancel request.
    pub fn reset(&self) {
        self.cancel.store(false, Ordering::SeqCst);
    }

    /// Executes cycles and hands each cycle's sink outputs to `on_cycle`.
    ///
    /// `max_cycles == None` runs until cancelled or stopped. The callback gets
    /// the zero-based cycle index within this run.
    ///
    /// # Errors
    ///
    /// Returns the first handler error; the engine has already stopped.
    pub fn run<F>(
        &self,
        engine: &mut Engine,
        max_cycles: Option<u64>,
        mut on_cycle: F,
    ) -> Result<DriverReport, EngineError>
    where
        F: FnMut(u64, &SinkOutputs) -> ControlFlow<()>,
    {
        let mut cycles = 0u64;
        let reason = loop {
            if max_cycles.is_some_and(|max| cycles >= max) {
                break StopReason::Completed;
            }
            if self.is_cancelled() {
                break StopReason::Cancelled;
            }
            let Some(sinks) = engine.execute_one_cycle()? else {
                break StopReason::EngineStopped;
            };
            let index = cycles;
            cycles += 1;
            if on_cycle(index, &sinks).is_break() {
                break StopReason::Callback;
            }
        };

        tracing::debug!("driver_run: {cycles} cycles, {reason:?}");
        Ok(DriverReport { cycles, reason })
    }
}
