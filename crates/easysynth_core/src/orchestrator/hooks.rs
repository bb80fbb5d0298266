//! Work performed between two sequences of a batch.

use std::time::Duration;

use crate::config::BatchSettings;
use crate::render::RenderDriver;

/// Runs after a sequence finished and before the next one starts.
pub trait InterJobHook {
    /// `finished` and `next` are job indices, `total` the batch size.
    fn between_jobs(
        &mut self,
        driver: &mut dyn RenderDriver,
        finished: usize,
        next: usize,
        total: usize,
    );
}

/// Reclaim renderer memory, then sleep for a settling delay.
///
/// The sleep blocks the orchestrator's thread for its whole duration. The
/// renderer leaks transient state across sequence loads unless reclamation
/// has had time to finish before the next sequence allocates.
#[derive(Debug, Clone)]
pub struct ReclaimAndSettle {
    reclaim: bool,
    delay: Duration,
}

impl ReclaimAndSettle {
    pub fn new(reclaim: bool, delay: Duration) -> Self {
        Self { reclaim, delay }
    }

    pub fn from_settings(settings: &BatchSettings) -> Self {
        Self::new(settings.reclaim_memory, settings.settle_delay())
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }
}

impl Default for ReclaimAndSettle {
    fn default() -> Self {
        Self::from_settings(&BatchSettings::default())
    }
}

impl InterJobHook for ReclaimAndSettle {
    fn between_jobs(
        &mut self,
        driver: &mut dyn RenderDriver,
        _finished: usize,
        next: usize,
        total: usize,
    ) {
        tracing::info!("Cleaning up memory before sequence {}/{}", next + 1, total);

        if self.reclaim {
            driver.reclaim_memory();
        }
        if !self.delay.is_zero() {
            std::thread::sleep(self.delay);
        }
    }
}

/// Start the next sequence straight away.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCleanup;

impl InterJobHook for NoCleanup {
    fn between_jobs(&mut self, _: &mut dyn RenderDriver, _: usize, _: usize, _: usize) {}
}
