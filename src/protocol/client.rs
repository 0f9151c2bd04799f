use crate::auth::Token;
use crate::core::{LaunchpadError, LaunchpadResult};
use crate::di::ConfigProvider;
use crate::protocol::envelope::{build_download_request, extract_download_urls, DownloadRequest};
use chrono::Utc;
use reqwest::{header, Client};
use tracing::{debug, warn};
use uuid::Uuid;

/// Client for the update service
///
/// Holds no session state: the token travels with each request, so one
/// instance can serve anonymous and authenticated callers concurrently.
#[derive(Clone)]
pub struct ProtocolClient {
    http: Client,
    endpoint: String,
    trusted_prefix: String,
}

impl ProtocolClient {
    pub fn new(http: Client, endpoint: impl Into<String>, trusted_prefix: impl Into<String>) -> Self {
        Self {
            http,
            endpoint: endpoint.into(),
            trusted_prefix: trusted_prefix.into(),
        }
    }

    pub fn from_config(http: Client, config: &dyn ConfigProvider) -> Self {
        Self::new(
            http,
            config.update_endpoint(),
            config.trusted_download_prefix(),
        )
    }

    /// Resolve an update identity and revision to a trusted download URL
    ///
    /// Fails with `BadIdentity` when the response holds no URL under the
    /// trusted prefix (a SOAP fault included), and with `Network` when the
    /// exchange itself fails.
    pub async fn resolve_download_url(
        &self,
        update_id: &str,
        revision: &str,
        token: Option<&Token>,
    ) -> LaunchpadResult<String> {
        let message_id = Uuid::new_v4().to_string();
        let body = build_download_request(&DownloadRequest {
            endpoint: &self.endpoint,
            update_id,
            revision,
            token,
            message_id: &message_id,
            now: Utc::now(),
        });

        let response = self
            .http
            .post(&self.endpoint)
            .header(header::CONTENT_TYPE, "application/soap+xml; charset=utf-8")
            .body(body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            warn!(
                "Update service answered {} for update identity {} revision {}",
                status, update_id, revision
            );
        }
        debug!(
            "Download URL response for update identity {}, revision {}:\n{}",
            update_id, revision, text
        );

        let urls = extract_download_urls(&text)?;
        select_trusted(&urls, &self.trusted_prefix)
            .map(str::to_string)
            .ok_or_else(|| LaunchpadError::BadIdentity {
                id: update_id.to_string(),
                revision: revision.to_string(),
            })
    }
}

/// First candidate under the trusted prefix
fn select_trusted<'a>(urls: &'a [String], trusted_prefix: &str) -> Option<&'a str> {
    urls.iter()
        .map(String::as_str)
        .find(|url| url.starts_with(trusted_prefix))
}
