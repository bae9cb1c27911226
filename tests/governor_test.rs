//! Timing properties of the admission governor, driven under tokio's paused
//! clock so every suspension is deterministic.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;

use gramscope::config::GovernorConfig;
use gramscope::governor::RateGovernor;

/// Config with spacing and humanization disabled so individual checks can be
/// exercised in isolation.
fn quiet_config() -> GovernorConfig {
    GovernorConfig {
        min_delay_secs: 0.0,
        humanize: false,
        ..Default::default()
    }
}

#[tokio::test(start_paused = true)]
async fn quota_admission_waits_until_oldest_entry_leaves_window() {
    let governor = RateGovernor::new(quiet_config());

    // Fill the hourly quota: one request per second, 180 total.
    for _ in 0..180 {
        governor.record().await;
        tokio::time::advance(Duration::from_secs(1)).await;
    }
    assert_eq!(governor.stats().await.requests_in_last_hour, 180);

    // The next admission must wait until the oldest entry ages out of the
    // trailing hour, and no longer than the window itself.
    let before = Instant::now();
    governor.admit().await;
    let waited = before.elapsed();

    assert!(waited > Duration::ZERO);
    assert!(waited <= Duration::from_secs(3600));
    // Oldest entry (t=0) has left the window; one slot is free again.
    assert_eq!(governor.stats().await.requests_in_last_hour, 179);
}

#[tokio::test(start_paused = true)]
async fn quota_is_never_exceeded_in_any_sliding_window() {
    let config = GovernorConfig {
        requests_per_hour: 5,
        burst_limit: 1_000,
        ..quiet_config()
    };
    let governor = RateGovernor::new(config);

    for _ in 0..20 {
        governor.admit().await;
        governor.record().await;
        let stats = governor.stats().await;
        assert!(
            stats.requests_in_last_hour <= 5,
            "window held {} requests",
            stats.requests_in_last_hour
        );
    }
    assert_eq!(governor.stats().await.total_requests, 20);
}

#[tokio::test(start_paused = true)]
async fn spacing_enforces_minimum_delay_with_bounded_jitter() {
    let config = GovernorConfig {
        min_delay_secs: 2.0,
        burst_limit: 1_000,
        ..quiet_config()
    };
    let governor = RateGovernor::new(config);

    governor.admit().await;
    governor.record().await;

    let before = Instant::now();
    governor.admit().await;
    governor.record().await;
    let waited = before.elapsed();

    // 2s +/- 30% jitter.
    assert!(waited >= Duration::from_secs_f64(1.4));
    assert!(waited <= Duration::from_secs_f64(2.6));
}

#[tokio::test(start_paused = true)]
async fn burst_trips_cooldown_and_reports_cooling() {
    let governor = Arc::new(RateGovernor::new(quiet_config()));

    // Nine rapid admissions fill the burst window without tripping it.
    for _ in 0..9 {
        governor.admit().await;
        governor.record().await;
    }
    assert!(!governor.stats().await.is_cooling_down);

    // The tenth admission reaches the burst limit and must block for the
    // full cooldown.
    let waiter = {
        let governor = governor.clone();
        tokio::spawn(async move {
            let before = Instant::now();
            governor.admit().await;
            before.elapsed()
        })
    };

    // Let the admission reach its cooldown sleep, then observe the state
    // mid-wait.
    tokio::task::yield_now().await;
    tokio::task::yield_now().await;
    assert!(governor.stats().await.is_cooling_down);

    let waited = waiter.await.unwrap();
    assert!(waited >= Duration::from_secs(60));
}

#[tokio::test(start_paused = true)]
async fn cooldown_clears_once_it_expires() {
    let governor = RateGovernor::new(quiet_config());

    // Trip the burst cooldown.
    for _ in 0..10 {
        governor.admit().await;
        governor.record().await;
    }

    // The triggering admission already waited out the cooldown, so the
    // governor is back to normal admission.
    assert!(!governor.stats().await.is_cooling_down);
    let before = Instant::now();
    governor.admit().await;
    assert!(before.elapsed() < Duration::from_secs(1));
}

#[tokio::test(start_paused = true)]
async fn slow_callers_never_accumulate_burst_pressure() {
    let config = GovernorConfig {
        burst_limit: 3,
        ..quiet_config()
    };
    let governor = RateGovernor::new(config);

    // Far more admissions than the burst limit, but each lands in a fresh
    // burst window, so no cooldown ever trips.
    for _ in 0..12 {
        let before = Instant::now();
        governor.admit().await;
        governor.record().await;
        assert!(before.elapsed() < Duration::from_secs(1));
        tokio::time::advance(Duration::from_secs(11)).await;
    }
}

#[tokio::test(start_paused = true)]
async fn humanize_adds_bounded_delay() {
    let config = GovernorConfig {
        humanize: true,
        ..quiet_config()
    };
    let governor = RateGovernor::new(config);

    let before = Instant::now();
    governor.admit().await;
    let waited = before.elapsed();

    assert!(waited >= Duration::from_secs_f64(0.5));
    assert!(waited <= Duration::from_secs_f64(2.0));
}

#[tokio::test(start_paused = true)]
async fn stats_reflect_consumption_without_mutating() {
    let governor = RateGovernor::new(quiet_config());
    for _ in 0..45 {
        governor.record().await;
    }

    let first = governor.stats().await;
    let second = governor.stats().await;
    assert_eq!(first, second);
    assert_eq!(first.requests_in_last_hour, 45);
    assert_eq!(first.limit, 180);
    assert!((first.utilization_percent - 25.0).abs() < f64::EPSILON);
}
