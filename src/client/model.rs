//! Profile and post metadata extracted from platform responses.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Profile metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileMetadata {
    pub username: String,
    pub full_name: String,
    pub biography: String,
    pub external_url: Option<String>,
    pub followers: u64,
    pub following: u64,
    pub posts_count: u64,
    pub is_private: bool,
    pub is_verified: bool,
    pub is_business: bool,
    pub business_category: Option<String>,
    pub profile_pic_url: String,
    pub user_id: String,
}

/// Post location, when the post is geotagged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostLocation {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lat: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lng: Option<f64>,
}

/// Post metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostMetadata {
    pub shortcode: String,
    pub url: String,
    pub caption: Option<String>,
    pub likes: u64,
    pub comments: u64,
    pub timestamp: DateTime<Utc>,
    pub is_video: bool,
    pub typename: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<PostLocation>,
    pub tagged_users: Vec<String>,
    pub hashtags: Vec<String>,
}

impl PostMetadata {
    /// Combined likes + comments, the engagement measure used for ranking.
    pub fn engagement(&self) -> u64 {
        self.likes + self.comments
    }
}
