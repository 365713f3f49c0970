use crate::error::{MonitorError, Result as CoreResult};
use crate::sampler::{PollEvent, Poller};
use crate::session::{MonitorSession, SessionEvent};
use pitwatch_traits::clock::SystemClock;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

/// How often the run loop re-checks the shutdown flag while idle.
const SHUTDOWN_POLL: Duration = Duration::from_millis(50);

#[derive(Debug, Clone, Copy)]
pub struct RunParams {
    /// Poll cadence.
    pub period: Duration,
    /// Per-fetch timeout handed to the source.
    pub timeout: Duration,
    /// Stop after this many successful samples.
    pub max_samples: Option<u64>,
}

/// What the run loop reports to its caller per tick.
#[derive(Debug)]
pub enum RunEvent<'a> {
    Derived(&'a SessionEvent),
    /// Source failed this tick; shown as a banner, retried on the next tick.
    SourceUnreachable(&'a MonitorError),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub samples: u64,
    pub failures: u64,
    /// True when the shutdown flag ended the run.
    pub interrupted: bool,
}

/// Feed `source` into `session` one sample at a time until the shutdown flag
/// is raised or `max_samples` is reached.
///
/// Source failures never end the run, except `InvalidConfiguration`, which
/// cannot heal by retrying.
pub fn run<S, F>(
    source: S,
    session: &mut MonitorSession,
    params: RunParams,
    shutdown: Arc<AtomicBool>,
    mut on_event: F,
) -> CoreResult<RunSummary>
where
    S: pitwatch_traits::SampleSource + Send + 'static,
    F: FnMut(RunEvent<'_>),
{
    let mut poller = Poller::spawn(source, params.period, params.timeout, SystemClock::new());
    let mut summary = RunSummary::default();
    let wait = params.period.min(SHUTDOWN_POLL).max(Duration::from_millis(1));

    tracing::info!(
        period_ms = u64::try_from(params.period.as_millis()).unwrap_or(u64::MAX),
        timeout_ms = u64::try_from(params.timeout.as_millis()).unwrap_or(u64::MAX),
        "monitor start"
    );

    loop {
        if shutdown.load(Ordering::Relaxed) {
            summary.interrupted = true;
            break;
        }
        if params.max_samples.is_some_and(|max| summary.samples >= max) {
            break;
        }
        let Some(event) = poller.next_timeout(wait) else {
            continue;
        };
        match event {
            PollEvent::Sample(sample) => {
                summary.samples += 1;
                let derived = session.append(sample);
                on_event(RunEvent::Derived(&derived));
            }
            PollEvent::Failed(err) => {
                summary.failures += 1;
                on_event(RunEvent::SourceUnreachable(&err));
                if matches!(err, MonitorError::InvalidConfiguration(_)) {
                    poller.cancel();
                    return Err(err.into());
                }
            }
        }
    }

    poller.cancel();
    tracing::info!(
        samples = summary.samples,
        failures = summary.failures,
        interrupted = summary.interrupted,
        "monitor stop"
    );
    Ok(summary)
}
