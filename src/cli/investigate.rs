//! Investigate command: profile -> posts -> analysis -> reports.

use std::sync::Arc;
use std::time::Instant;

use anyhow::anyhow;
use chrono::Utc;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::warn;

use crate::analysis;
use crate::client::{PlatformClient, PostMetadata, ProfileMetadata, SessionStore};
use crate::config::{Config, Settings};
use crate::error::FetchError;
use crate::governor::RateGovernor;
use crate::report::{self, InvestigationReport, RunMetadata};

use super::ReportFormat;

/// Run a complete investigation of one profile.
pub async fn cmd_investigate(
    settings: &Settings,
    config: &Config,
    username: &str,
    format: ReportFormat,
) -> anyhow::Result<()> {
    settings.ensure_directories()?;
    let started = Instant::now();

    let store = SessionStore::new(&settings.session_dir);
    let session = store.load();
    if !session.as_ref().is_some_and(|s| s.is_authenticated()) {
        println!(
            "{} Not logged in - private profiles and some fields are unavailable",
            style("!").yellow()
        );
    }

    let governor = Arc::new(RateGovernor::new(config.rate_limit.clone()));
    let client = PlatformClient::new(settings, config, governor.clone(), session.as_ref());

    // Phase 1: profile
    println!("{} Phase 1/3: Profile Analysis", style("→").cyan());
    let profile = client
        .fetch_profile(username)
        .await
        .map_err(describe_failure)?;
    println!(
        "{} Profile: @{} ({} followers, {} following, {} posts)",
        style("✓").green(),
        profile.username,
        profile.followers,
        profile.following,
        profile.posts_count
    );

    // Phase 2: posts
    println!("{} Phase 2/3: Posts Analysis", style("→").cyan());
    let posts = if profile.is_private {
        println!(
            "{} Profile is private; skipping post analysis",
            style("!").yellow()
        );
        Vec::new()
    } else {
        collect_posts(&client, &profile, config.limits.max_posts).await?
    };
    println!("{} Processed {} posts", style("✓").green(), posts.len());

    // Phase 3: statistics
    println!("{} Phase 3/3: Statistical Analysis", style("→").cyan());
    let engagement = analysis::engagement_stats(&posts, &profile);
    let temporal = analysis::temporal_stats(&posts);
    let top_hashtags = analysis::hashtag_counts(&posts);
    let indicators = analysis::account_indicators(&profile, &engagement);
    let rate_limit = governor.stats().await;

    let report = InvestigationReport {
        target_username: profile.username.clone(),
        profile,
        engagement,
        temporal,
        top_hashtags,
        indicators,
        metadata: RunMetadata {
            generated_at: Utc::now(),
            duration_secs: started.elapsed().as_secs_f64(),
            posts_analyzed: posts.len(),
            max_posts: config.limits.max_posts,
            rate_limit,
        },
        posts,
    };

    report::print_summary(&report);

    if format.includes_json() {
        let path = report::write_json(&report, &settings.data_dir)?;
        println!("{} JSON: {}", style("✓").green(), style(path.display()).cyan());
    }
    if format.includes_markdown() {
        let path = report::write_markdown(&report, &settings.data_dir)?;
        println!(
            "{} Markdown: {}",
            style("✓").green(),
            style(path.display()).cyan()
        );
    }

    let stats = &report.metadata.rate_limit;
    println!(
        "\n{}",
        style(format!(
            "Rate limit: {}/{} ({:.1}%)",
            stats.requests_in_last_hour, stats.limit, stats.utilization_percent
        ))
        .dim()
    );

    Ok(())
}

/// Page through the profile's posts until the limit is reached or the feed
/// ends. A page failure after partial progress keeps what was collected.
async fn collect_posts(
    client: &PlatformClient,
    profile: &ProfileMetadata,
    max_posts: usize,
) -> anyhow::Result<Vec<PostMetadata>> {
    let mut posts: Vec<PostMetadata> = Vec::new();
    if max_posts == 0 {
        return Ok(posts);
    }

    let target = max_posts.min(profile.posts_count as usize).max(1);
    let progress = ProgressBar::new(target as u64);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:30.cyan/blue}] {pos}/{len} posts")
            .unwrap()
            .progress_chars("█▓░"),
    );

    let mut cursor: Option<String> = None;
    'pages: loop {
        let page = match client.fetch_posts_page(profile, cursor.as_deref()).await {
            Ok(page) => page,
            Err(err) if posts.is_empty() => {
                progress.finish_and_clear();
                return Err(describe_failure(err));
            }
            Err(err) => {
                warn!("Stopping post collection early: {}", err);
                break 'pages;
            }
        };

        for post in page.posts {
            posts.push(post);
            progress.inc(1);
            if posts.len() >= max_posts {
                break 'pages;
            }
        }

        cursor = page.next_cursor;
        if cursor.is_none() {
            break;
        }
    }

    progress.finish_and_clear();
    Ok(posts)
}

/// Turn a fetch error into user-facing diagnostics. Terminal failures and
/// retry exhaustion get distinct wording.
fn describe_failure(err: FetchError) -> anyhow::Error {
    match err {
        FetchError::ProfileNotFound(username) => {
            anyhow!("profile @{} does not exist", username)
        }
        FetchError::LoginRequired => {
            anyhow!("login required - save a browser session to the session directory first")
        }
        FetchError::AccessDenied(reason) => {
            anyhow!("request is fundamentally disallowed: {}", reason)
        }
        FetchError::RetryExhausted { attempts, source } => {
            anyhow!("gave up after {} attempts: {}", attempts, source)
        }
        other => anyhow::Error::new(other),
    }
}
