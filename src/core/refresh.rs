//! Request sequencing and the periodic refresh loop used by watch mode.

use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tracing::debug;

/// Hands out increasing tokens so that only the newest request's result is
/// applied.
#[derive(Debug, Default)]
pub struct RequestSequencer {
    latest: AtomicU64,
}

impl RequestSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next(&self) -> u64 {
        self.latest.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn is_current(&self, token: u64) -> bool {
        self.latest.load(Ordering::SeqCst) == token
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadKind {
    /// First load; shows a loading indicator.
    Initial,
    /// Timer-driven reload; previous output stays until new data arrives.
    Silent,
}

pub struct Refresher {
    interval: Duration,
    sequencer: RequestSequencer,
}

impl Refresher {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            sequencer: RequestSequencer::new(),
        }
    }

    /// Runs `load` once as [`LoadKind::Initial`] and then on every tick as
    /// [`LoadKind::Silent`], passing each result to `render`. A load still in
    /// flight when the next tick fires is dropped in favour of the new one.
    /// Returns when `shutdown` completes.
    pub async fn run<T, L, Fut, R, S>(&self, mut load: L, mut render: R, shutdown: S) -> usize
    where
        L: FnMut(LoadKind) -> Fut,
        Fut: Future<Output = T>,
        R: FnMut(T, LoadKind),
        S: Future<Output = ()>,
    {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately; the initial load covers it.
        ticker.tick().await;

        tokio::pin!(shutdown);
        let mut rendered = 0;
        let mut in_flight: Option<(u64, LoadKind, Pin<Box<Fut>>)> =
            Some((self.sequencer.next(), LoadKind::Initial, Box::pin(load(LoadKind::Initial))));

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    debug!("Refresh loop stopped after {} renders", rendered);
                    return rendered;
                }
                result = async {
                    match in_flight.as_mut() {
                        Some((_, _, fut)) => fut.as_mut().await,
                        None => std::future::pending().await,
                    }
                } => {
                    if let Some((token, kind, _)) = in_flight.take()
                        && self.sequencer.is_current(token)
                    {
                        render(result, kind);
                        rendered += 1;
                    }
                }
                _ = ticker.tick() => {
                    if in_flight.is_some() {
                        debug!("Superseding in-flight refresh");
                    }
                    in_flight = Some((
                        self.sequencer.next(),
                        LoadKind::Silent,
                        Box::pin(load(LoadKind::Silent)),
                    ));
                }
            }
        }
    }
}
