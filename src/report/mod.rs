//! Investigation report assembly and export.

mod markdown;
mod summary;

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use crate::analysis::{AccountIndicators, EngagementStats, TemporalStats};
use crate::client::{PostMetadata, ProfileMetadata};
use crate::governor::GovernorStats;

pub use markdown::write_markdown;
pub use summary::print_summary;

/// Metadata about the investigation run itself.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunMetadata {
    pub generated_at: DateTime<Utc>,
    pub duration_secs: f64,
    pub posts_analyzed: usize,
    pub max_posts: usize,
    /// Governor consumption snapshot at the end of the run.
    pub rate_limit: GovernorStats,
}

/// Complete investigation report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InvestigationReport {
    pub target_username: String,
    pub profile: ProfileMetadata,
    pub posts: Vec<PostMetadata>,
    pub engagement: EngagementStats,
    pub temporal: TemporalStats,
    pub top_hashtags: Vec<(String, u64)>,
    pub indicators: AccountIndicators,
    pub metadata: RunMetadata,
}

impl InvestigationReport {
    /// Timestamped output filename stem, shared by all export formats.
    fn file_stem(&self) -> String {
        format!(
            "instagram_{}_{}",
            self.target_username,
            self.metadata.generated_at.format("%Y%m%d_%H%M%S")
        )
    }
}

/// Write the report as pretty-printed JSON. Returns the output path.
pub fn write_json(report: &InvestigationReport, output_dir: &Path) -> anyhow::Result<PathBuf> {
    fs::create_dir_all(output_dir)?;
    let path = output_dir.join(format!("{}.json", report.file_stem()));
    fs::write(&path, serde_json::to_string_pretty(report)?)?;
    info!("JSON report saved: {}", path.display());
    Ok(path)
}

#[cfg(test)]
pub(crate) mod test_fixtures {
    use super::*;
    use chrono::TimeZone;

    pub fn sample_report() -> InvestigationReport {
        let profile = ProfileMetadata {
            username: "wildlife_watch".into(),
            full_name: "Wildlife Watch".into(),
            biography: "Daily wildlife photography".into(),
            external_url: None,
            followers: 1000,
            following: 50,
            posts_count: 2,
            is_private: false,
            is_verified: true,
            is_business: false,
            business_category: None,
            profile_pic_url: String::new(),
            user_id: "1".into(),
        };
        let posts = vec![PostMetadata {
            shortcode: "abc".into(),
            url: "https://www.instagram.com/p/abc/".into(),
            caption: Some("Morning fox #fox".into()),
            likes: 100,
            comments: 20,
            timestamp: Utc.with_ymd_and_hms(2025, 6, 1, 9, 0, 0).unwrap(),
            is_video: false,
            typename: "GraphImage".into(),
            location: None,
            tagged_users: Vec::new(),
            hashtags: vec!["fox".into()],
        }];
        let engagement = crate::analysis::engagement_stats(&posts, &profile);
        let temporal = crate::analysis::temporal_stats(&posts);
        let top_hashtags = crate::analysis::hashtag_counts(&posts);
        let indicators = crate::analysis::account_indicators(&profile, &engagement);

        InvestigationReport {
            target_username: profile.username.clone(),
            profile,
            posts,
            engagement,
            temporal,
            top_hashtags,
            indicators,
            metadata: RunMetadata {
                generated_at: Utc.with_ymd_and_hms(2025, 6, 2, 12, 0, 0).unwrap(),
                duration_secs: 4.2,
                posts_analyzed: 1,
                max_posts: 50,
                rate_limit: GovernorStats {
                    total_requests: 2,
                    requests_in_last_hour: 2,
                    limit: 180,
                    utilization_percent: 1.1,
                    is_cooling_down: false,
                },
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_fixtures::sample_report;
    use super::*;

    #[test]
    fn test_write_json_report() {
        let dir = tempfile::tempdir().unwrap();
        let report = sample_report();
        let path = write_json(&report, dir.path()).unwrap();

        assert_eq!(
            path.file_name().unwrap().to_str().unwrap(),
            "instagram_wildlife_watch_20250602_120000.json"
        );

        let raw = fs::read_to_string(&path).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["target_username"], "wildlife_watch");
        assert_eq!(value["metadata"]["rate_limit"]["limit"], 180);
        assert_eq!(value["posts"][0]["shortcode"], "abc");
    }
}
