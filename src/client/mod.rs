//! Platform client.
//!
//! Wraps a reqwest client with the admission governor and retry policy.
//! Every remote call is bracketed by `governor.admit()` before the request
//! and `governor.record()` after a successful one, and runs under the
//! backoff-driven retry orchestrator.

mod model;
mod session;
mod user_agent;
mod wire;

use std::sync::Arc;

use reqwest::cookie::Jar;
use reqwest::{Client, StatusCode, Url};
use tracing::info;

use crate::config::{Config, Settings};
use crate::error::FetchError;
use crate::governor::RateGovernor;
use crate::retry::{retry_with_backoff, BackoffPolicy};

pub use model::{PostLocation, PostMetadata, ProfileMetadata};
pub use session::{Session, SessionStore};
pub use user_agent::{resolve_user_agent, IMPERSONATE_USER_AGENTS, USER_AGENT};
pub use wire::extract_hashtags;

use wire::{MediaEnvelope, ProfileEnvelope};

/// Platform web origin.
const BASE_URL: &str = "https://www.instagram.com";
/// App id the platform's own web client sends; required by the profile API.
const WEB_APP_ID: &str = "936619743392459";
/// Stable query hash for the paged timeline media query.
const MEDIA_QUERY_HASH: &str = "69cba40317214236af40e7efa697781d";
/// Posts fetched per governed page request.
const MEDIA_PAGE_SIZE: usize = 12;

/// A page of posts plus the cursor for the next page, if any.
#[derive(Debug, Clone)]
pub struct PostPage {
    pub posts: Vec<PostMetadata>,
    pub next_cursor: Option<String>,
}

/// HTTP client for platform metadata, governed and retried.
#[derive(Clone)]
pub struct PlatformClient {
    http: Client,
    governor: Arc<RateGovernor>,
    policy: BackoffPolicy,
}

impl PlatformClient {
    /// Create a client. Session cookies, when present, are attached to the
    /// cookie jar for the platform domain.
    pub fn new(
        settings: &Settings,
        config: &Config,
        governor: Arc<RateGovernor>,
        session: Option<&Session>,
    ) -> Self {
        let base_url = Url::parse(BASE_URL).expect("valid platform base URL");

        let jar = Jar::default();
        if let Some(session) = session {
            for (name, value) in &session.cookies {
                jar.add_cookie_str(
                    &format!("{}={}; Domain=.instagram.com; Path=/", name, value),
                    &base_url,
                );
            }
            if session.is_authenticated() {
                info!("Using authenticated session");
            }
        }

        let user_agent = resolve_user_agent(config.stealth.user_agent.as_deref());
        let http = Client::builder()
            .user_agent(&user_agent)
            .timeout(settings.request_timeout())
            .gzip(true)
            .brotli(true)
            .cookie_provider(Arc::new(jar))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            http,
            governor,
            policy: BackoffPolicy::new(config.retry.clone()),
        }
    }

    /// The governor shared by this client.
    pub fn governor(&self) -> &Arc<RateGovernor> {
        &self.governor
    }

    /// Fetch profile metadata for a username.
    pub async fn fetch_profile(&self, username: &str) -> Result<ProfileMetadata, FetchError> {
        let clock = self.governor.clock();
        retry_with_backoff(&self.policy, clock.as_ref(), "fetch profile", move || async move {
            self.governor.admit().await;

            let url = format!("{}/api/v1/users/web_profile_info/", BASE_URL);
            let response = self
                .http
                .get(&url)
                .header("X-IG-App-ID", WEB_APP_ID)
                .query(&[("username", username)])
                .send()
                .await?;

            check_status(response.status(), username)?;

            let envelope: ProfileEnvelope = response.json().await?;
            let user = envelope
                .data
                .user
                .ok_or_else(|| FetchError::ProfileNotFound(username.to_string()))?;

            self.governor.record().await;
            Ok(user.into_profile())
        })
        .await
    }

    /// Fetch one page of a profile's posts. Pass the cursor returned by the
    /// previous page, or `None` for the first page.
    pub async fn fetch_posts_page(
        &self,
        profile: &ProfileMetadata,
        after: Option<&str>,
    ) -> Result<PostPage, FetchError> {
        let clock = self.governor.clock();
        let variables = serde_json::json!({
            "id": profile.user_id,
            "first": MEDIA_PAGE_SIZE,
            "after": after,
        })
        .to_string();

        retry_with_backoff(&self.policy, clock.as_ref(), "fetch posts", move || {
            let variables = variables.clone();
            async move {
                self.governor.admit().await;

                let url = format!("{}/graphql/query/", BASE_URL);
                let response = self
                    .http
                    .get(&url)
                    .header("X-IG-App-ID", WEB_APP_ID)
                    .query(&[
                        ("query_hash", MEDIA_QUERY_HASH),
                        ("variables", variables.as_str()),
                    ])
                    .send()
                    .await?;

                check_status(response.status(), &profile.username)?;

                let envelope: MediaEnvelope = response.json().await?;
                let media = envelope
                    .data
                    .user
                    .ok_or_else(|| {
                        FetchError::Parse("missing user in media response".to_string())
                    })?
                    .edge_owner_to_timeline_media;

                self.governor.record().await;

                let next_cursor = if media.page_info.has_next_page {
                    media.page_info.end_cursor
                } else {
                    None
                };

                Ok(PostPage {
                    posts: media
                        .edges
                        .into_iter()
                        .map(|edge| edge.node.into_post())
                        .collect(),
                    next_cursor,
                })
            }
        })
        .await
    }
}

/// Map an HTTP status to a fetch error, or pass success through.
fn check_status(status: StatusCode, username: &str) -> Result<(), FetchError> {
    if status.is_success() {
        return Ok(());
    }
    match status.as_u16() {
        404 => Err(FetchError::ProfileNotFound(username.to_string())),
        401 => Err(FetchError::LoginRequired),
        403 => Err(FetchError::AccessDenied(
            "the platform refused this request".to_string(),
        )),
        code => Err(FetchError::Http(code)),
    }
}
