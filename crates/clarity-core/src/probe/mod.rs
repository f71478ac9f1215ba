//! Backend availability prober.
//!
//! Gates a front end behind a confirmed-reachable backend:
//!
//! - **Init**: a foreground check first consults the [`ActivityCache`]; a
//!   timestamp younger than the cache duration goes straight to Ready
//!   without a network call.
//! - **Probing**: otherwise the backend is probed, retrying on a fixed delay
//!   (unbounded by default) until it answers.
//! - **Ready**: a background probe runs every cache duration. Success
//!   refreshes the cache; failure is only logged and never leaves Ready.
//! - **Unavailable**: only reachable with a bounded [`BackoffPolicy`], once
//!   the last retry fails.
//!
//! Cancelling the [`CancellationToken`] (or dropping the [`ProberHandle`])
//! stops both the retry timer and the periodic interval.

mod backoff;

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

pub use backoff::BackoffPolicy;

use crate::api::TaskBackend;
use crate::clock::{ActivityCache, Clock};
use crate::config::ClientConfig;

/// Gate state visible to the front end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Availability {
    Init,
    Probing,
    Ready,
    /// A bounded retry policy gave up.
    Unavailable,
}

impl Availability {
    #[must_use]
    pub const fn is_ready(self) -> bool {
        matches!(self, Self::Ready)
    }

    /// No further transition will happen without a new foreground check.
    #[must_use]
    pub const fn is_settled(self) -> bool {
        matches!(self, Self::Ready | Self::Unavailable)
    }
}

/// Who asked for the check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeMode {
    /// Initial, user-visible gating check; retries on failure.
    Foreground,
    /// Periodic re-validation after Ready; a single attempt, failures only logged.
    Background,
}

/// What a single check did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// Fresh cache entry, no network call made.
    CacheHit,
    /// The backend answered after `attempts` probes.
    Reachable { attempts: u32 },
    /// Background probe failed; state left untouched.
    BackgroundFailed,
    /// The retry policy ran out before the backend answered.
    Exhausted { attempts: u32 },
    /// Cancelled while waiting to retry.
    Cancelled,
}

pub struct AvailabilityProber<B, K, C> {
    backend: Arc<B>,
    cache: K,
    clock: C,
    cache_duration: Duration,
    policy: BackoffPolicy,
    state: Arc<watch::Sender<Availability>>,
}

impl<B, K, C> Clone for AvailabilityProber<B, K, C>
where
    K: Clone,
    C: Clone,
{
    fn clone(&self) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
            cache: self.cache.clone(),
            clock: self.clock.clone(),
            cache_duration: self.cache_duration,
            policy: self.policy,
            state: Arc::clone(&self.state),
        }
    }
}

impl<B, K, C> AvailabilityProber<B, K, C>
where
    B: TaskBackend + 'static,
    K: ActivityCache,
    C: Clock,
{
    pub fn new(backend: B, cache: K, clock: C, config: &ClientConfig) -> Self {
        let (state, _) = watch::channel(Availability::Init);
        Self {
            backend: Arc::new(backend),
            cache,
            clock,
            cache_duration: config.cache_duration,
            policy: BackoffPolicy::unbounded(config.retry_delay),
            state: Arc::new(state),
        }
    }

    #[must_use]
    pub const fn with_policy(mut self, policy: BackoffPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn state(&self) -> Availability {
        *self.state.borrow()
    }

    pub fn is_ready(&self) -> bool {
        self.state().is_ready()
    }

    /// Receiver that observes every state transition.
    pub fn subscribe(&self) -> watch::Receiver<Availability> {
        self.state.subscribe()
    }

    /// Whether the cached "last active" timestamp is still trusted.
    pub fn cache_is_fresh(&self) -> bool {
        let last_active = match self.cache.get() {
            Ok(value) => value,
            Err(error) => {
                tracing::warn!("Failed to read backend activity cache: {}", error);
                None
            }
        };
        let Some(last_active) = last_active else {
            return false;
        };
        let age = self.clock.now_millis().saturating_sub(last_active);
        let cache_millis = i64::try_from(self.cache_duration.as_millis()).unwrap_or(i64::MAX);
        age < cache_millis
    }

    /// Run one foreground or background check.
    pub async fn check(&self, mode: ProbeMode, cancel: &CancellationToken) -> ProbeOutcome {
        match mode {
            ProbeMode::Foreground => self.foreground_check(cancel).await,
            ProbeMode::Background => self.background_check().await,
        }
    }

    async fn foreground_check(&self, cancel: &CancellationToken) -> ProbeOutcome {
        if self.cache_is_fresh() {
            tracing::debug!("Backend seen recently, skipping health probe");
            self.set_state(Availability::Ready);
            return ProbeOutcome::CacheHit;
        }

        self.set_state(Availability::Probing);
        let mut attempts = 0u32;
        loop {
            attempts = attempts.saturating_add(1);
            match self.backend.probe().await {
                Ok(()) => {
                    self.record_activity();
                    self.set_state(Availability::Ready);
                    tracing::info!("Backend ready after {} probe(s)", attempts);
                    return ProbeOutcome::Reachable { attempts };
                }
                Err(error) => {
                    if !self.policy.allows_retry(attempts) {
                        tracing::warn!(
                            "Backend still unreachable after {} probe(s): {}",
                            attempts,
                            error
                        );
                        self.set_state(Availability::Unavailable);
                        return ProbeOutcome::Exhausted { attempts };
                    }
                    tracing::warn!(
                        "Server sleeping ({}), retrying in {}ms",
                        error,
                        self.policy.delay.as_millis()
                    );
                }
            }

            tokio::select! {
                () = cancel.cancelled() => {
                    tracing::debug!("Foreground probe cancelled");
                    return ProbeOutcome::Cancelled;
                }
                () = tokio::time::sleep(self.policy.delay) => {}
            }
        }
    }

    async fn background_check(&self) -> ProbeOutcome {
        match self.backend.probe().await {
            Ok(()) => {
                self.record_activity();
                tracing::debug!("Background ping succeeded");
                ProbeOutcome::Reachable { attempts: 1 }
            }
            Err(error) => {
                tracing::warn!("Background ping failed: {}", error);
                ProbeOutcome::BackgroundFailed
            }
        }
    }

    /// Foreground check followed by periodic background checks until cancelled.
    pub async fn run(&self, cancel: CancellationToken) {
        let outcome = self.check(ProbeMode::Foreground, &cancel).await;
        if !matches!(
            outcome,
            ProbeOutcome::CacheHit | ProbeOutcome::Reachable { .. }
        ) {
            return;
        }

        let start = tokio::time::Instant::now() + self.cache_duration;
        let mut interval = tokio::time::interval_at(start, self.cache_duration);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                () = cancel.cancelled() => {
                    tracing::debug!("Availability monitor stopped");
                    return;
                }
                _ = interval.tick() => {
                    self.check(ProbeMode::Background, &cancel).await;
                }
            }
        }
    }

    /// Run the prober on the tokio runtime.
    pub fn spawn(&self) -> ProberHandle {
        let cancel = CancellationToken::new();
        let prober = self.clone();
        let task_cancel = cancel.clone();
        let join = tokio::spawn(async move { prober.run(task_cancel).await });
        ProberHandle {
            cancel,
            join: Some(join),
            state: self.subscribe(),
        }
    }

    fn record_activity(&self) {
        if let Err(error) = self.cache.set(self.clock.now_millis()) {
            tracing::warn!("Failed to record backend activity: {}", error);
        }
    }

    fn set_state(&self, next: Availability) {
        self.state.send_if_modified(|current| {
            if *current == next {
                false
            } else {
                *current = next;
                true
            }
        });
    }
}

/// Owner of a spawned prober; dropping it tears the prober down.
pub struct ProberHandle {
    cancel: CancellationToken,
    join: Option<JoinHandle<()>>,
    state: watch::Receiver<Availability>,
}

impl ProberHandle {
    pub fn state(&self) -> Availability {
        *self.state.borrow()
    }

    /// Wait until the gate opens. Returns `false` if the retry policy gave up
    /// or every prober was dropped first.
    pub async fn wait_ready(&mut self) -> bool {
        self.state
            .wait_for(|state| state.is_settled())
            .await
            .is_ok_and(|state| state.is_ready())
    }

    /// Cancel pending timers and wait for the prober task to finish.
    pub async fn shutdown(mut self) {
        self.cancel.cancel();
        if let Some(join) = self.join.take() {
            if let Err(error) = join.await {
                tracing::warn!("Availability prober task failed: {}", error);
            }
        }
    }
}

impl Drop for ProberHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
