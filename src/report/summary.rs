//! Console summary of an investigation report.

use console::style;

use super::InvestigationReport;

/// Print a styled summary to stdout.
pub fn print_summary(report: &InvestigationReport) {
    let p = &report.profile;

    println!();
    println!("{}", style(format!("@{}", p.username)).bold());
    if !p.full_name.is_empty() {
        println!("{}", style(&p.full_name).dim());
    }
    if !p.biography.is_empty() {
        let bio: String = p.biography.chars().take(150).collect();
        println!("\n{}", bio);
    }

    println!(
        "\n{} {}  |  {} {}  |  {} {}",
        style("Followers:").bold(),
        style(p.followers).green(),
        style("Following:").bold(),
        style(p.following).blue(),
        style("Posts:").bold(),
        style(p.posts_count).yellow()
    );

    let mut badges = Vec::new();
    if p.is_verified {
        badges.push(format!("{}", style("verified").blue()));
    }
    if p.is_private {
        badges.push(format!("{}", style("private").yellow()));
    }
    if p.is_business {
        badges.push(format!("{}", style("business").magenta()));
    }
    if !badges.is_empty() {
        println!("\n{}", badges.join(" | "));
    }

    let e = &report.engagement;
    if e.total_analyzed > 0 {
        println!("\n{}", style("Engagement:").bold());
        println!(
            "  Avg Likes: {:.0}  |  Avg Comments: {:.0}",
            e.avg_likes, e.avg_comments
        );
        println!(
            "  Engagement Rate: {}",
            style(format!("{:.3}%", e.engagement_rate)).green()
        );
    }

    if !report.top_hashtags.is_empty() {
        println!("\n{}", style("Top Hashtags:").bold());
        let tags: Vec<String> = report
            .top_hashtags
            .iter()
            .take(5)
            .map(|(tag, _)| format!("#{}", tag))
            .collect();
        println!("  {}", tags.join(", "));
    }

    println!();
}
