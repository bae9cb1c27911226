//! Markdown report rendering.

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use super::InvestigationReport;

/// Render the report as a Markdown document.
pub fn render_markdown(report: &InvestigationReport) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "# Instagram Profile Report\n");
    let _ = writeln!(out, "**Target:** @{}\n", report.target_username);
    let _ = writeln!(
        out,
        "**Generated:** {}\n",
        report.metadata.generated_at.to_rfc3339()
    );
    let _ = writeln!(out, "---\n");

    let p = &report.profile;
    let _ = writeln!(out, "## Profile Information\n");
    let _ = writeln!(out, "- **Full Name:** {}", p.full_name);
    let bio = if p.biography.is_empty() {
        "N/A".to_string()
    } else {
        p.biography.chars().take(200).collect()
    };
    let _ = writeln!(out, "- **Bio:** {}", bio);
    let _ = writeln!(out, "- **Followers:** {}", p.followers);
    let _ = writeln!(out, "- **Following:** {}", p.following);
    let _ = writeln!(out, "- **Posts:** {}", p.posts_count);
    let _ = writeln!(out, "- **Verified:** {}", yes_no(p.is_verified));
    let _ = writeln!(out, "- **Private:** {}", yes_no(p.is_private));
    let _ = writeln!(out, "- **Business:** {}\n", yes_no(p.is_business));

    let e = &report.engagement;
    if e.total_analyzed > 0 {
        let _ = writeln!(out, "## Engagement Statistics\n");
        let _ = writeln!(out, "- **Posts Analyzed:** {}", e.total_analyzed);
        let _ = writeln!(out, "- **Average Likes:** {:.1}", e.avg_likes);
        let _ = writeln!(out, "- **Average Comments:** {:.1}", e.avg_comments);
        let _ = writeln!(out, "- **Engagement Rate:** {:.3}%\n", e.engagement_rate);

        if !e.top_posts.is_empty() {
            let _ = writeln!(out, "### Top Performing Posts\n");
            for (i, post) in e.top_posts.iter().enumerate() {
                let _ = writeln!(
                    out,
                    "{}. [{} engagement]({})",
                    i + 1,
                    post.engagement,
                    post.url
                );
            }
            let _ = writeln!(out);
        }
    }

    let t = &report.temporal;
    if t.peak_posting_hour.is_some() || t.avg_post_interval_hours.is_some() {
        let _ = writeln!(out, "## Temporal Analysis\n");
        if let Some(hour) = t.peak_posting_hour {
            let _ = writeln!(out, "- **Peak Hour:** {}:00 UTC", hour);
        }
        if let Some(interval) = t.avg_post_interval_hours {
            let _ = writeln!(out, "- **Avg Post Interval:** {:.1} hours", interval);
        }
        let _ = writeln!(out);
    }

    if !report.top_hashtags.is_empty() {
        let _ = writeln!(out, "## Top Hashtags\n");
        for (tag, count) in &report.top_hashtags {
            let _ = writeln!(out, "- #{}: {} times", tag, count);
        }
        let _ = writeln!(out);
    }

    let m = &report.metadata;
    let _ = writeln!(out, "## Run Metadata\n");
    let _ = writeln!(out, "- **Duration:** {:.1}s", m.duration_secs);
    let _ = writeln!(
        out,
        "- **API Requests:** {}/{}",
        m.rate_limit.requests_in_last_hour, m.rate_limit.limit
    );
    let _ = writeln!(
        out,
        "- **Utilization:** {:.1}%\n",
        m.rate_limit.utilization_percent
    );

    let _ = writeln!(out, "---\n");
    let _ = writeln!(
        out,
        "*Generated for research purposes. Respect privacy laws and the platform's Terms of Service.*"
    );

    out
}

/// Write the report as Markdown. Returns the output path.
pub fn write_markdown(report: &InvestigationReport, output_dir: &Path) -> anyhow::Result<PathBuf> {
    fs::create_dir_all(output_dir)?;
    let path = output_dir.join(format!("{}.md", report.file_stem()));
    fs::write(&path, render_markdown(report))?;
    info!("Markdown report saved: {}", path.display());
    Ok(path)
}

fn yes_no(value: bool) -> &'static str {
    if value {
        "yes"
    } else {
        "no"
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_fixtures::sample_report;
    use super::*;

    #[test]
    fn test_render_markdown_sections() {
        let report = sample_report();
        let md = render_markdown(&report);

        assert!(md.contains("**Target:** @wildlife_watch"));
        assert!(md.contains("## Profile Information"));
        assert!(md.contains("- **Followers:** 1000"));
        assert!(md.contains("## Engagement Statistics"));
        assert!(md.contains("### Top Performing Posts"));
        assert!(md.contains("- #fox: 1 times"));
        assert!(md.contains("- **API Requests:** 2/180"));
    }

    #[test]
    fn test_write_markdown_file() {
        let dir = tempfile::tempdir().unwrap();
        let report = sample_report();
        let path = write_markdown(&report, dir.path()).unwrap();
        assert!(path
            .file_name()
            .unwrap()
            .to_str()
            .unwrap()
            .ends_with(".md"));
        assert!(fs::read_to_string(path).unwrap().contains("# Instagram"));
    }
}
