//! Wire-format payloads for the platform's web profile API.
//!
//! These structs mirror the JSON shapes the endpoints actually return and
//! are converted into the public metadata types immediately after parsing.

use chrono::DateTime;
use regex::Regex;
use serde::Deserialize;

use super::model::{PostLocation, PostMetadata, ProfileMetadata};

/// Captions longer than this are truncated in extracted metadata.
const MAX_CAPTION_CHARS: usize = 500;

/// Envelope of the web_profile_info endpoint.
#[derive(Debug, Deserialize)]
pub struct ProfileEnvelope {
    pub data: ProfileData,
}

#[derive(Debug, Deserialize)]
pub struct ProfileData {
    pub user: Option<WireUser>,
}

/// Envelope of the paged timeline media query.
#[derive(Debug, Deserialize)]
pub struct MediaEnvelope {
    pub data: MediaData,
}

#[derive(Debug, Deserialize)]
pub struct MediaData {
    pub user: Option<WireMediaOwner>,
}

#[derive(Debug, Deserialize)]
pub struct WireMediaOwner {
    pub edge_owner_to_timeline_media: WireMediaConnection,
}

#[derive(Debug, Deserialize)]
pub struct WireUser {
    pub username: String,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub biography: Option<String>,
    #[serde(default)]
    pub external_url: Option<String>,
    pub edge_followed_by: WireCount,
    pub edge_follow: WireCount,
    pub is_private: bool,
    pub is_verified: bool,
    #[serde(default)]
    pub is_business_account: bool,
    #[serde(default)]
    pub category_name: Option<String>,
    #[serde(default)]
    pub profile_pic_url_hd: Option<String>,
    #[serde(default)]
    pub profile_pic_url: Option<String>,
    pub id: String,
    pub edge_owner_to_timeline_media: WireMediaConnection,
}

#[derive(Debug, Deserialize)]
pub struct WireCount {
    pub count: u64,
}

#[derive(Debug, Deserialize)]
pub struct WireMediaConnection {
    #[serde(default)]
    pub count: u64,
    pub page_info: WirePageInfo,
    #[serde(default)]
    pub edges: Vec<WireMediaEdge>,
}

#[derive(Debug, Deserialize)]
pub struct WirePageInfo {
    pub has_next_page: bool,
    #[serde(default)]
    pub end_cursor: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct WireMediaEdge {
    pub node: WireMedia,
}

#[derive(Debug, Deserialize)]
pub struct WireMedia {
    pub shortcode: String,
    #[serde(rename = "__typename", default)]
    pub typename: String,
    #[serde(default)]
    pub is_video: bool,
    pub taken_at_timestamp: i64,
    #[serde(default)]
    pub edge_media_to_caption: WireCaptionConnection,
    // Anonymous responses expose likes under edge_media_preview_like,
    // authenticated ones under edge_liked_by.
    #[serde(default)]
    pub edge_liked_by: Option<WireCount>,
    #[serde(default)]
    pub edge_media_preview_like: Option<WireCount>,
    pub edge_media_to_comment: WireCount,
    #[serde(default)]
    pub location: Option<WireLocation>,
    #[serde(default)]
    pub edge_media_to_tagged_user: Option<WireTaggedConnection>,
}

#[derive(Debug, Default, Deserialize)]
pub struct WireCaptionConnection {
    #[serde(default)]
    pub edges: Vec<WireCaptionEdge>,
}

#[derive(Debug, Deserialize)]
pub struct WireCaptionEdge {
    pub node: WireCaptionNode,
}

#[derive(Debug, Deserialize)]
pub struct WireCaptionNode {
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct WireLocation {
    pub name: String,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lng: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct WireTaggedConnection {
    #[serde(default)]
    pub edges: Vec<WireTaggedEdge>,
}

#[derive(Debug, Deserialize)]
pub struct WireTaggedEdge {
    pub node: WireTaggedNode,
}

#[derive(Debug, Deserialize)]
pub struct WireTaggedNode {
    pub user: WireTaggedUser,
}

#[derive(Debug, Deserialize)]
pub struct WireTaggedUser {
    pub username: String,
}

impl WireUser {
    /// Extract structured profile metadata.
    pub fn into_profile(self) -> ProfileMetadata {
        ProfileMetadata {
            full_name: self.full_name.unwrap_or_default(),
            biography: self.biography.unwrap_or_default(),
            external_url: self.external_url,
            followers: self.edge_followed_by.count,
            following: self.edge_follow.count,
            posts_count: self.edge_owner_to_timeline_media.count,
            is_private: self.is_private,
            is_verified: self.is_verified,
            business_category: if self.is_business_account {
                self.category_name
            } else {
                None
            },
            is_business: self.is_business_account,
            profile_pic_url: self
                .profile_pic_url_hd
                .or(self.profile_pic_url)
                .unwrap_or_default(),
            user_id: self.id,
            username: self.username,
        }
    }
}

impl WireMedia {
    /// Extract structured post metadata.
    pub fn into_post(self) -> PostMetadata {
        let caption = self
            .edge_media_to_caption
            .edges
            .into_iter()
            .next()
            .map(|edge| edge.node.text);

        let hashtags = caption.as_deref().map(extract_hashtags).unwrap_or_default();

        let tagged_users = self
            .edge_media_to_tagged_user
            .map(|conn| {
                conn.edges
                    .into_iter()
                    .map(|edge| edge.node.user.username)
                    .collect()
            })
            .unwrap_or_default();

        let likes = self
            .edge_liked_by
            .or(self.edge_media_preview_like)
            .map(|c| c.count)
            .unwrap_or(0);

        PostMetadata {
            url: format!("https://www.instagram.com/p/{}/", self.shortcode),
            shortcode: self.shortcode,
            caption: caption.map(|text| text.chars().take(MAX_CAPTION_CHARS).collect()),
            likes,
            comments: self.edge_media_to_comment.count,
            timestamp: DateTime::from_timestamp(self.taken_at_timestamp, 0)
                .unwrap_or(DateTime::UNIX_EPOCH),
            is_video: self.is_video,
            typename: self.typename,
            location: self.location.map(|loc| PostLocation {
                name: loc.name,
                lat: loc.lat,
                lng: loc.lng,
            }),
            tagged_users,
            hashtags,
        }
    }
}

/// Extract hashtags from a caption.
pub fn extract_hashtags(caption: &str) -> Vec<String> {
    match Regex::new(r"#(\w+)") {
        Ok(re) => re
            .captures_iter(caption)
            .map(|cap| cap[1].to_string())
            .collect(),
        Err(_) => Vec::new(),
    }
}
