//! Engagement and temporal analysis over collected post metadata.
//!
//! Pure computations; all platform I/O happens before these run.

use std::collections::{BTreeMap, HashMap};

use chrono::{Datelike, Timelike, Weekday};
use serde::Serialize;

use crate::client::{PostMetadata, ProfileMetadata};

/// Top posts listed in engagement stats.
const TOP_POSTS: usize = 5;
/// Hashtags listed in the frequency ranking.
const TOP_HASHTAGS: usize = 10;

/// Aggregate engagement statistics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EngagementStats {
    pub total_analyzed: usize,
    pub total_likes: u64,
    pub total_comments: u64,
    pub avg_likes: f64,
    pub avg_comments: f64,
    /// Average per-post engagement relative to follower count, in percent.
    pub engagement_rate: f64,
    pub top_posts: Vec<TopPost>,
}

/// A highly engaged post.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopPost {
    pub url: String,
    pub likes: u64,
    pub comments: u64,
    pub engagement: u64,
}

/// Posting-time patterns.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TemporalStats {
    /// Hour of day (UTC) with the most posts.
    pub peak_posting_hour: Option<u32>,
    /// Posts per hour of day, index 0-23.
    pub hour_distribution: [u64; 24],
    /// Posts per weekday.
    pub day_distribution: BTreeMap<String, u64>,
    /// Mean hours between consecutive posts.
    pub avg_post_interval_hours: Option<f64>,
}

/// Coarse account shape indicators.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccountIndicators {
    pub is_private: bool,
    pub is_verified: bool,
    pub follower_following_ratio: f64,
    pub avg_engagement_rate: f64,
}

/// Compute engagement statistics for a set of posts.
pub fn engagement_stats(posts: &[PostMetadata], profile: &ProfileMetadata) -> EngagementStats {
    let total_likes: u64 = posts.iter().map(|p| p.likes).sum();
    let total_comments: u64 = posts.iter().map(|p| p.comments).sum();
    let count = posts.len();

    let (avg_likes, avg_comments) = if count > 0 {
        (
            total_likes as f64 / count as f64,
            total_comments as f64 / count as f64,
        )
    } else {
        (0.0, 0.0)
    };

    let engagement_rate = if count > 0 && profile.followers > 0 {
        ((total_likes + total_comments) as f64 / count as f64) / profile.followers as f64 * 100.0
    } else {
        0.0
    };

    let mut ranked: Vec<&PostMetadata> = posts.iter().collect();
    ranked.sort_by(|a, b| b.engagement().cmp(&a.engagement()));

    EngagementStats {
        total_analyzed: count,
        total_likes,
        total_comments,
        avg_likes,
        avg_comments,
        engagement_rate,
        top_posts: ranked
            .into_iter()
            .take(TOP_POSTS)
            .map(|p| TopPost {
                url: p.url.clone(),
                likes: p.likes,
                comments: p.comments,
                engagement: p.engagement(),
            })
            .collect(),
    }
}

/// Compute posting-time patterns.
pub fn temporal_stats(posts: &[PostMetadata]) -> TemporalStats {
    let mut hour_distribution = [0u64; 24];
    let mut day_distribution = BTreeMap::new();

    for post in posts {
        hour_distribution[post.timestamp.hour() as usize] += 1;
        *day_distribution
            .entry(weekday_name(post.timestamp.weekday()).to_string())
            .or_insert(0) += 1;
    }

    let peak_posting_hour = hour_distribution
        .iter()
        .enumerate()
        .max_by_key(|&(_, &count)| count)
        .filter(|&(_, &count)| count > 0)
        .map(|(hour, _)| hour as u32);

    let avg_post_interval_hours = if posts.len() > 1 {
        let mut timestamps: Vec<_> = posts.iter().map(|p| p.timestamp).collect();
        timestamps.sort();
        let diffs: Vec<f64> = timestamps
            .windows(2)
            .map(|pair| (pair[1] - pair[0]).num_seconds() as f64 / 3600.0)
            .collect();
        Some(diffs.iter().sum::<f64>() / diffs.len() as f64)
    } else {
        None
    };

    TemporalStats {
        peak_posting_hour,
        hour_distribution,
        day_distribution,
        avg_post_interval_hours,
    }
}

/// Rank hashtags by frequency across the analyzed posts.
pub fn hashtag_counts(posts: &[PostMetadata]) -> Vec<(String, u64)> {
    let mut counts: HashMap<&str, u64> = HashMap::new();
    for post in posts {
        for tag in &post.hashtags {
            *counts.entry(tag.as_str()).or_insert(0) += 1;
        }
    }

    let mut ranked: Vec<(String, u64)> = counts
        .into_iter()
        .map(|(tag, count)| (tag.to_string(), count))
        .collect();
    // Alphabetical tie-break keeps the ranking stable.
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    ranked.truncate(TOP_HASHTAGS);
    ranked
}

/// Derive coarse account indicators.
pub fn account_indicators(
    profile: &ProfileMetadata,
    engagement: &EngagementStats,
) -> AccountIndicators {
    AccountIndicators {
        is_private: profile.is_private,
        is_verified: profile.is_verified,
        follower_following_ratio: profile.followers as f64 / profile.following.max(1) as f64,
        avg_engagement_rate: engagement.engagement_rate,
    }
}

fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn profile(followers: u64, following: u64) -> ProfileMetadata {
        ProfileMetadata {
            username: "subject".into(),
            full_name: String::new(),
            biography: String::new(),
            external_url: None,
            followers,
            following,
            posts_count: 0,
            is_private: false,
            is_verified: true,
            is_business: false,
            business_category: None,
            profile_pic_url: String::new(),
            user_id: "1".into(),
        }
    }

    fn post(shortcode: &str, likes: u64, comments: u64, hour: u32, day: u32) -> PostMetadata {
        PostMetadata {
            shortcode: shortcode.into(),
            url: format!("https://www.instagram.com/p/{}/", shortcode),
            caption: None,
            likes,
            comments,
            timestamp: Utc.with_ymd_and_hms(2025, 6, day, hour, 0, 0).unwrap(),
            is_video: false,
            typename: "GraphImage".into(),
            location: None,
            tagged_users: Vec::new(),
            hashtags: vec!["travel".into()],
        }
    }

    #[test]
    fn test_engagement_stats() {
        let profile = profile(1000, 10);
        let posts = vec![post("a", 100, 10, 9, 2), post("b", 50, 40, 9, 3)];

        let stats = engagement_stats(&posts, &profile);
        assert_eq!(stats.total_analyzed, 2);
        assert_eq!(stats.total_likes, 150);
        assert_eq!(stats.total_comments, 50);
        assert!((stats.avg_likes - 75.0).abs() < f64::EPSILON);
        // (200 / 2 posts) / 1000 followers * 100 = 10%
        assert!((stats.engagement_rate - 10.0).abs() < f64::EPSILON);
        assert_eq!(stats.top_posts[0].url, "https://www.instagram.com/p/a/");
    }

    #[test]
    fn test_engagement_stats_empty_posts() {
        let stats = engagement_stats(&[], &profile(1000, 10));
        assert_eq!(stats.total_analyzed, 0);
        assert_eq!(stats.engagement_rate, 0.0);
        assert!(stats.top_posts.is_empty());
    }

    #[test]
    fn test_temporal_stats() {
        let posts = vec![
            post("a", 0, 0, 9, 2),
            post("b", 0, 0, 9, 3),
            post("c", 0, 0, 17, 4),
        ];

        let stats = temporal_stats(&posts);
        assert_eq!(stats.peak_posting_hour, Some(9));
        assert_eq!(stats.hour_distribution[9], 2);
        assert_eq!(stats.hour_distribution[17], 1);
        // Gaps of 24h and 32h average to 28h.
        assert!((stats.avg_post_interval_hours.unwrap() - 28.0).abs() < 1e-9);
    }

    #[test]
    fn test_temporal_stats_single_post_has_no_interval() {
        let stats = temporal_stats(&[post("a", 0, 0, 9, 2)]);
        assert_eq!(stats.avg_post_interval_hours, None);
        assert_eq!(stats.peak_posting_hour, Some(9));
    }

    #[test]
    fn test_hashtag_counts() {
        let mut a = post("a", 0, 0, 9, 2);
        a.hashtags = vec!["fox".into(), "wild".into()];
        let mut b = post("b", 0, 0, 9, 3);
        b.hashtags = vec!["fox".into()];

        let ranked = hashtag_counts(&[a, b]);
        assert_eq!(ranked[0], ("fox".to_string(), 2));
        assert_eq!(ranked[1], ("wild".to_string(), 1));
    }

    #[test]
    fn test_account_indicators_guard_zero_following() {
        let profile = profile(500, 0);
        let engagement = engagement_stats(&[], &profile);
        let indicators = account_indicators(&profile, &engagement);
        assert!((indicators.follower_following_ratio - 500.0).abs() < f64::EPSILON);
    }
}
