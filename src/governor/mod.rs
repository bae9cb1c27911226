//! Request admission governor.
//!
//! Gates every outbound platform request. Tracks a rolling request history
//! and decides, at each admission, whether to proceed immediately, delay, or
//! cool down:
//!
//! 1. wait out any active cooldown
//! 2. enforce the rolling-hour quota
//! 3. enforce minimum inter-request spacing (with jitter)
//! 4. detect rapid-fire bursts and trip a cooldown
//! 5. optionally add a human-like random delay
//!
//! The governor never fails and has no knowledge of request outcomes; it
//! only delays. Callers run `admit()` immediately before each request and
//! `record()` after each successful one.

mod clock;

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::config::GovernorConfig;

pub use clock::{Clock, TokioClock};

/// Request history entries kept for quota tracking.
const HISTORY_CAPACITY: usize = 200;
/// Rolling window the request quota applies to.
const ROLLING_WINDOW: Duration = Duration::from_secs(3600);
/// Window for burst detection.
const BURST_WINDOW: Duration = Duration::from_secs(10);
/// Jitter fraction applied to spacing waits.
const SPACING_JITTER: f64 = 0.3;
/// Bounds for the humanization delay.
const HUMANIZE_MIN_SECS: f64 = 0.5;
const HUMANIZE_MAX_SECS: f64 = 2.0;

/// Mutable governor state. Owned exclusively by the governor and only
/// touched through its methods, under the lock.
#[derive(Debug)]
struct GovernorState {
    /// Timestamps of recorded requests, oldest first.
    history: VecDeque<Instant>,
    /// Most recent recorded request.
    last_request_at: Option<Instant>,
    /// Start of the current burst-detection window.
    burst_window_start: Option<Instant>,
    /// Admissions inside the current burst window.
    burst_count: u32,
    /// While set and in the future, admissions wait it out.
    cooldown_until: Option<Instant>,
    /// Total recorded requests over the governor's lifetime.
    total_requests: u64,
}

impl GovernorState {
    fn new() -> Self {
        Self {
            history: VecDeque::with_capacity(HISTORY_CAPACITY),
            last_request_at: None,
            burst_window_start: None,
            burst_count: 0,
            cooldown_until: None,
            total_requests: 0,
        }
    }

    /// Index of the first history entry still inside the rolling window.
    /// History is appended in call order, so it is always sorted.
    fn first_recent_index(&self, now: Instant) -> usize {
        self.history
            .partition_point(|&t| now.saturating_duration_since(t) >= ROLLING_WINDOW)
    }

    /// Number of history entries inside the rolling window.
    fn recent_count(&self, now: Instant) -> usize {
        self.history.len() - self.first_recent_index(now)
    }
}

/// Read-only snapshot of governor state for reporting.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct GovernorStats {
    /// Requests recorded over the governor's lifetime.
    pub total_requests: u64,
    /// Requests recorded inside the trailing hour.
    pub requests_in_last_hour: usize,
    /// Configured rolling-hour quota.
    pub limit: u32,
    /// Quota consumed, as a percentage.
    pub utilization_percent: f64,
    /// True while a burst cooldown is pending.
    pub is_cooling_down: bool,
}

/// Admission gate for outbound platform requests.
pub struct RateGovernor {
    config: GovernorConfig,
    clock: Arc<dyn Clock>,
    state: Arc<Mutex<GovernorState>>,
}

impl RateGovernor {
    /// Create a governor with the production clock.
    pub fn new(config: GovernorConfig) -> Self {
        Self::with_clock(config, Arc::new(TokioClock))
    }

    /// Create a governor with an injected clock.
    pub fn with_clock(config: GovernorConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            config,
            clock,
            state: Arc::new(Mutex::new(GovernorState::new())),
        }
    }

    /// The configuration this governor was built with.
    pub fn config(&self) -> &GovernorConfig {
        &self.config
    }

    /// The clock this governor reads. Shared with the retry loop so all
    /// time-dependent logic follows the same source.
    pub fn clock(&self) -> Arc<dyn Clock> {
        self.clock.clone()
    }

    /// Admit one request, suspending the caller as long as needed.
    ///
    /// Must be called immediately before every outbound request. Checks run
    /// in a fixed precedence order (cooldown, quota, spacing, burst,
    /// humanization); each check that waits re-reads the clock afterwards,
    /// so later checks see the post-wait state. Never fails.
    pub async fn admit(&self) {
        self.wait_out_cooldown().await;
        self.wait_for_quota().await;
        self.wait_for_spacing().await;
        self.check_burst().await;
        self.humanize().await;
    }

    /// Register a successfully completed request.
    ///
    /// Appends the current instant to the history (evicting the oldest entry
    /// past capacity) and advances the spacing reference point. Call once
    /// per admitted request that was actually made.
    pub async fn record(&self) {
        let mut state = self.state.lock().await;
        let now = self.clock.now();

        if state.history.len() == HISTORY_CAPACITY {
            state.history.pop_front();
        }
        state.history.push_back(now);
        state.last_request_at = Some(now);
        state.total_requests += 1;
    }

    /// Snapshot current consumption relative to now. Does not mutate state.
    pub async fn stats(&self) -> GovernorStats {
        let state = self.state.lock().await;
        let now = self.clock.now();
        let recent = state.recent_count(now);

        GovernorStats {
            total_requests: state.total_requests,
            requests_in_last_hour: recent,
            limit: self.config.requests_per_hour,
            utilization_percent: recent as f64 / self.config.requests_per_hour.max(1) as f64
                * 100.0,
            is_cooling_down: state.cooldown_until.is_some_and(|until| now < until),
        }
    }

    /// Wait out an active cooldown, then clear it and reset the burst count.
    async fn wait_out_cooldown(&self) {
        loop {
            let wait = {
                let mut state = self.state.lock().await;
                match state.cooldown_until {
                    Some(until) => {
                        let now = self.clock.now();
                        if now < until {
                            Some(until - now)
                        } else {
                            state.cooldown_until = None;
                            state.burst_count = 0;
                            None
                        }
                    }
                    None => None,
                }
            };

            match wait {
                Some(wait) => {
                    warn!("Cooling down for {:.1}s after burst", wait.as_secs_f64());
                    self.clock.sleep(wait).await;
                }
                None => return,
            }
        }
    }

    /// Enforce the rolling-hour quota: once the window is full, wait until
    /// the oldest in-window request ages out.
    async fn wait_for_quota(&self) {
        loop {
            let wait = {
                let state = self.state.lock().await;
                let now = self.clock.now();
                let first_recent = state.first_recent_index(now);
                let recent = state.history.len() - first_recent;

                if recent >= self.config.requests_per_hour as usize {
                    state.history.get(first_recent).map(|&oldest| {
                        let resume_at = oldest + ROLLING_WINDOW;
                        (recent, resume_at.saturating_duration_since(now))
                    })
                } else {
                    None
                }
            };

            match wait {
                Some((recent, wait)) => {
                    warn!(
                        "Rate limit reached ({}/{}), waiting {:.1}s for window reset",
                        recent,
                        self.config.requests_per_hour,
                        wait.as_secs_f64()
                    );
                    self.clock.sleep(wait).await;
                }
                None => return,
            }
        }
    }

    /// Enforce minimum spacing since the last recorded request, jittered.
    async fn wait_for_spacing(&self) {
        let wait = {
            let state = self.state.lock().await;
            let now = self.clock.now();
            let min_delay = self.config.min_delay();

            state.last_request_at.and_then(|last| {
                let elapsed = now.saturating_duration_since(last);
                if elapsed < min_delay {
                    let base = (min_delay - elapsed).as_secs_f64();
                    let jitter = rand::thread_rng().gen_range(-SPACING_JITTER..=SPACING_JITTER);
                    let secs = (base * (1.0 + jitter)).max(0.0);
                    (secs > 0.0).then(|| Duration::from_secs_f64(secs))
                } else {
                    None
                }
            })
        };

        if let Some(wait) = wait {
            debug!("Spacing requests: waiting {:.2}s", wait.as_secs_f64());
            self.clock.sleep(wait).await;
        }
    }

    /// Track admissions inside the burst window and trip a cooldown when the
    /// window fills. Any admission landing after the window expired restarts
    /// it, so only rapid-fire sequences accumulate burst pressure.
    async fn check_burst(&self) {
        let cooldown = {
            let mut state = self.state.lock().await;
            let now = self.clock.now();
            let in_window = state
                .burst_window_start
                .is_some_and(|start| now.saturating_duration_since(start) < BURST_WINDOW);

            if !in_window {
                state.burst_window_start = Some(now);
                state.burst_count = 1;
                None
            } else {
                state.burst_count += 1;
                if state.burst_count >= self.config.burst_limit {
                    warn!(
                        "Burst detected ({} requests in {:?})",
                        state.burst_count, BURST_WINDOW
                    );
                    let cooldown = self.config.cooldown();
                    state.cooldown_until = Some(now + cooldown);
                    state.burst_count = 0;
                    Some(cooldown)
                } else {
                    None
                }
            }
        };

        if let Some(cooldown) = cooldown {
            warn!(
                "Cooling down for {:.0}s after burst",
                cooldown.as_secs_f64()
            );
            self.clock.sleep(cooldown).await;
        }
    }

    /// Add a random human-like delay, independent of the other checks.
    async fn humanize(&self) {
        if !self.config.humanize {
            return;
        }
        let secs = rand::thread_rng().gen_range(HUMANIZE_MIN_SECS..=HUMANIZE_MAX_SECS);
        self.clock.sleep(Duration::from_secs_f64(secs)).await;
    }
}

impl Clone for RateGovernor {
    fn clone(&self) -> Self {
        Self {
            config: self.config.clone(),
            clock: self.clock.clone(),
            state: self.state.clone(),
        }
    }
}
