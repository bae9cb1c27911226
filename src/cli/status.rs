//! Status command: session state and effective governor configuration.

use console::style;

use crate::client::SessionStore;
use crate::config::{Config, Settings};

/// Show where data lives, whether a session is saved, and the request
/// budget the governor would enforce. Pure display, no requests are made.
pub fn cmd_status(settings: &Settings, config: &Config) -> anyhow::Result<()> {
    println!("{}", style("gramscope status").bold());
    println!();
    println!("Data directory:    {}", settings.data_dir.display());
    println!("Session directory: {}", settings.session_dir.display());

    let store = SessionStore::new(&settings.session_dir);
    match store.load() {
        Some(session) if session.is_authenticated() => {
            println!(
                "Session:           {} (saved {}{})",
                style("authenticated").green(),
                session.saved_at.format("%Y-%m-%d %H:%M UTC"),
                session
                    .username
                    .as_deref()
                    .map(|u| format!(", account {}", u))
                    .unwrap_or_default()
            );
        }
        Some(_) => {
            println!("Session:           {}", style("present, anonymous").yellow());
        }
        None => {
            println!("Session:           {}", style("none").yellow());
        }
    }

    println!();
    let g = &config.rate_limit;
    println!("{}", style("Request governor").bold());
    println!("  Hourly quota:    {} requests", g.requests_per_hour);
    println!("  Min spacing:     {:.1}s", g.min_delay_secs);
    println!(
        "  Burst limit:     {} requests / 10s window",
        g.burst_limit
    );
    println!("  Burst cooldown:  {}s", g.cooldown_secs);
    println!(
        "  Humanize delays: {}",
        if g.humanize { "on" } else { "off" }
    );

    let r = &config.retry;
    println!("{}", style("Retry policy").bold());
    println!("  Max attempts:    {}", r.max_attempts);
    println!(
        "  Backoff:         {:.0}s base, x{} growth, {:.0}s cap, ±{:.0}% jitter",
        r.base_delay_secs,
        r.exponential_base,
        r.max_delay_secs,
        r.jitter_fraction * 100.0
    );

    Ok(())
}
