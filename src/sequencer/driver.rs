// Poll driver - thread timer feeding clock samples to a poll closure
// Only a convenience for real-time use; the engines are pure poll(now)
// functions and tests drive them with synthetic time instead

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use super::scheduler::POLL_INTERVAL;

/// Background timer that invokes a callback with the current clock time at
/// the scheduler's poll interval until stopped.
///
/// Stopping is synchronous: `stop` joins the thread, so no callback runs
/// after it returns.
pub struct PollDriver {
    stop_flag: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl PollDriver {
    /// Spawn the timer. `tick` receives the time in seconds sampled from
    /// `clock_now` just before each call.
    pub fn spawn<C, F>(clock_now: C, tick: F) -> Self
    where
        C: Fn() -> f64 + Send + 'static,
        F: FnMut(f64) + Send + 'static,
    {
        Self::spawn_with_interval(POLL_INTERVAL, clock_now, tick)
    }

    /// Spawn with a custom interval (used by tools and tests)
    pub fn spawn_with_interval<C, F>(interval: Duration, clock_now: C, mut tick: F) -> Self
    where
        C: Fn() -> f64 + Send + 'static,
        F: FnMut(f64) + Send + 'static,
    {
        let stop_flag = Arc::new(AtomicBool::new(false));
        let thread_flag = Arc::clone(&stop_flag);

        let handle = thread::spawn(move || {
            while !thread_flag.load(Ordering::Relaxed) {
                tick(clock_now());
                thread::sleep(interval);
            }
        });

        Self {
            stop_flag,
            handle: Some(handle),
        }
    }

    /// Signal the thread and wait for it to finish
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        self.stop_flag.store(true, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for PollDriver {
    fn drop(&mut self) {
        self.shutdown();
    }
}
