//! Pacing between external operations.

use std::thread;

use tracing::info;

use crate::core::types::Pause;

/// Blocks the batch loop for a pause. Tests substitute a recorder.
pub trait Pacer {
    fn pause(&self, pause: Pause);
}

/// Sleeps the current thread.
pub struct ThreadPacer;

impl Pacer for ThreadPacer {
    fn pause(&self, pause: Pause) {
        if pause.duration.is_zero() {
            return;
        }
        info!(kind = ?pause.kind, secs = pause.duration.as_secs_f64(), "pausing");
        thread::sleep(pause.duration);
    }
}
