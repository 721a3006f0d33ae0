//! Fixed-rate beat sequencer driving a tone sink

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use atelier_core::{BeatPattern, StepCounter};
use crossbeam_channel::{bounded, select, tick, Sender};
use tracing::{debug, info, warn};

/// Anything that can sound a single percussive hit
pub trait ToneSink: Send + Sync {
    fn trigger(&self);
}

/// A running beat loop. Dropping it stops the timer.
pub struct BeatLoop {
    running: Arc<AtomicBool>,
    step: Arc<AtomicUsize>,
    stop_tx: Option<Sender<()>>,
    worker: Option<JoinHandle<()>>,
}

impl BeatLoop {
    /// Start ticking at the pattern's step interval. The first step fires
    /// one interval after start.
    pub fn start(pattern: BeatPattern, sink: Arc<dyn ToneSink>) -> Self {
        let running = Arc::new(AtomicBool::new(true));
        let step = Arc::new(AtomicUsize::new(0));
        let (stop_tx, stop_rx) = bounded::<()>(1);

        let interval = pattern.step_interval();
        info!(bpm = pattern.bpm, interval_ms = interval.as_millis() as u64, "Beat loop started");

        let worker = {
            let running = running.clone();
            let step = step.clone();
            thread::spawn(move || {
                let ticker = tick(interval);
                let mut counter = StepCounter::new();
                loop {
                    select! {
                        recv(stop_rx) -> _ => break,
                        recv(ticker) -> _ => {
                            // A tick racing with stop must stay silent
                            if !running.load(Ordering::SeqCst) {
                                break;
                            }
                            let (index, hit) = counter.advance(&pattern);
                            step.store(index, Ordering::SeqCst);
                            if hit {
                                sink.trigger();
                            }
                        }
                    }
                }
                debug!("Beat loop worker exited");
            })
        };

        Self {
            running,
            step,
            stop_tx: Some(stop_tx),
            worker: Some(worker),
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Index of the most recently played step
    pub fn current_step(&self) -> usize {
        self.step.load(Ordering::SeqCst)
    }

    /// Stop the timer and wait for the worker to exit. Idempotent.
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(tx) = self.stop_tx.take() {
            let _ = tx.try_send(());
        }
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                warn!("Beat loop worker panicked");
            }
            info!("Beat loop stopped");
        }
    }
}

impl Drop for BeatLoop {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[derive(Default)]
    struct CountingSink {
        hits: AtomicUsize,
    }

    impl ToneSink for CountingSink {
        fn trigger(&self) {
            self.hits.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn test_stop_within_first_interval_is_silent() {
        let sink = Arc::new(CountingSink::default());
        // 30 bpm -> 1s steps
        let pattern = BeatPattern::new(30.0, [true; 8]);
        let mut beat = BeatLoop::start(pattern, sink.clone());
        assert!(beat.is_running());
        beat.stop();
        assert!(!beat.is_running());
        assert_eq!(sink.hits.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_fast_pattern_triggers_onsets() {
        let sink = Arc::new(CountingSink::default());
        // 6000 bpm -> 5ms steps
        let pattern = BeatPattern::new(6000.0, [true; 8]);
        let mut beat = BeatLoop::start(pattern, sink.clone());
        thread::sleep(Duration::from_millis(200));
        beat.stop();
        assert!(sink.hits.load(Ordering::SeqCst) > 0);
    }

    #[test]
    fn test_rests_stay_silent() {
        let sink = Arc::new(CountingSink::default());
        let pattern = BeatPattern::new(6000.0, [false; 8]);
        let mut beat = BeatLoop::start(pattern, sink.clone());
        thread::sleep(Duration::from_millis(100));
        beat.stop();
        assert_eq!(sink.hits.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_stop_is_idempotent() {
        let sink = Arc::new(CountingSink::default());
        let mut beat = BeatLoop::start(BeatPattern::new(120.0, [true; 8]), sink);
        beat.stop();
        beat.stop();
        assert!(!beat.is_running());
    }
}
