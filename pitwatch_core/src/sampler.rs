//! Background polling of a `SampleSource`.
//!
//! Spawns a thread that owns the source, ticks at a fixed cadence, pushes
//! results through a bounded channel, and tracks the last-ok timestamp for
//! the "connected" indicator. The thread is the single producer feeding the
//! session; it never touches the history itself.
//!
//! Cancellation: the inter-tick wait blocks on a shutdown channel, so
//! `cancel()` (or dropping the `Poller`) ends the wait immediately. A fetch
//! already in flight finishes first (bounded by the source timeout).
use crossbeam_channel as xch;
use pitwatch_traits::SampleSource;
use pitwatch_traits::clock::Clock;
use pitwatch_traits::Sample;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use crate::error::MonitorError;
use crate::source_error::map_source_error;

/// Outcome of one poll tick.
#[derive(Debug, Clone)]
pub enum PollEvent {
    Sample(Sample),
    /// The source failed this tick; the core keeps its last state.
    Failed(MonitorError),
}

/// Sentinel for "no successful fetch yet".
const NEVER: u64 = u64::MAX;

pub struct Poller {
    rx: xch::Receiver<PollEvent>,
    last_ok: Arc<AtomicU64>,
    epoch: Instant,
    shutdown_tx: Option<xch::Sender<()>>,
    join_handle: Option<std::thread::JoinHandle<()>>,
}

impl Poller {
    /// Poll `source` every `period`, allowing `timeout` per fetch.
    pub fn spawn<S, C>(mut source: S, period: Duration, timeout: Duration, clock: C) -> Self
    where
        S: SampleSource + Send + 'static,
        C: Clock + Send + Sync + 'static,
    {
        // A few ticks of slack; a slow consumer sees the oldest ticks first.
        let (tx, rx) = xch::bounded(8);
        let (shutdown_tx, shutdown_rx) = xch::bounded::<()>(1);
        let last_ok = Arc::new(AtomicU64::new(NEVER));
        let last_ok_clone = last_ok.clone();
        let epoch = clock.now();

        let join_handle = std::thread::spawn(move || {
            loop {
                let event = match source.fetch(timeout) {
                    Ok(sample) => {
                        last_ok_clone.store(clock.ms_since(epoch), Ordering::Relaxed);
                        PollEvent::Sample(sample)
                    }
                    Err(e) => {
                        let mapped = map_source_error(e.as_ref());
                        tracing::warn!(error = %mapped, "sample source fetch failed");
                        PollEvent::Failed(mapped)
                    }
                };
                // A full channel must not block shutdown.
                xch::select! {
                    send(tx, event) -> res => {
                        if res.is_err() {
                            tracing::debug!("Poller consumer disconnected, exiting thread");
                            break;
                        }
                    }
                    recv(shutdown_rx) -> _ => {
                        tracing::debug!("Poller thread received shutdown signal");
                        break;
                    }
                }

                match shutdown_rx.recv_timeout(period) {
                    Err(xch::RecvTimeoutError::Timeout) => continue,
                    Ok(()) | Err(xch::RecvTimeoutError::Disconnected) => {
                        tracing::debug!("Poller thread received shutdown signal");
                        break;
                    }
                }
            }
            tracing::trace!("Poller thread exiting cleanly");
        });

        Self {
            rx,
            last_ok,
            epoch,
            shutdown_tx: Some(shutdown_tx),
            join_handle: Some(join_handle),
        }
    }

    /// Receiver of poll outcomes, in tick order.
    #[inline]
    pub fn events(&self) -> &xch::Receiver<PollEvent> {
        &self.rx
    }

    /// Non-blocking: next pending outcome, if any.
    pub fn try_next(&self) -> Option<PollEvent> {
        self.rx.try_recv().ok()
    }

    /// Block up to `timeout` for the next outcome.
    pub fn next_timeout(&self, timeout: Duration) -> Option<PollEvent> {
        self.rx.recv_timeout(timeout).ok()
    }

    /// Milliseconds (since spawn) of the last successful fetch.
    pub fn last_ok_ms(&self) -> Option<u64> {
        match self.last_ok.load(Ordering::Relaxed) {
            NEVER => None,
            ms => Some(ms),
        }
    }

    /// How long the source has gone without a successful fetch, in ms.
    pub fn stale_for(&self, now_ms: u64) -> u64 {
        now_ms.saturating_sub(self.last_ok_ms().unwrap_or(0))
    }

    /// Convenience helper: staleness against the real monotonic clock.
    pub fn stale_for_now(&self) -> u64 {
        let dur = Instant::now().saturating_duration_since(self.epoch);
        let now_ms = u64::try_from(dur.as_millis()).unwrap_or(u64::MAX);
        self.stale_for(now_ms)
    }

    /// Stop polling now and wait for the thread to exit.
    pub fn cancel(&mut self) {
        // Dropping the sender wakes the waiting thread with Disconnected.
        self.shutdown_tx.take();
        if let Some(handle) = self.join_handle.take() {
            match handle.join() {
                Ok(()) => {
                    tracing::trace!("Poller thread joined successfully");
                }
                Err(e) => {
                    // Thread panicked; log but don't propagate
                    tracing::warn!(?e, "Poller thread panicked during shutdown");
                }
            }
        }
    }

    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.join_handle.is_none()
    }
}

impl Drop for Poller {
    fn drop(&mut self) {
        self.cancel();
    }
}
