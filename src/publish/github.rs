// GitHub contents API client
//
// The repository doubles as a static file host: media blobs and the JSON
// feed index both land through the create-or-update-file endpoint.

use std::time::Duration;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use reqwest::header::ACCEPT;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

use super::errors::PublishError;
use crate::config::PublishConfig;

const API_VERSION: &str = "2022-11-28";

/// Uploads carry whole media blobs; give them room
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// A file as returned by the contents endpoint
pub struct RemoteFile {
    pub content: Vec<u8>,
    pub sha: String,
}

pub struct GithubClient {
    client: Client,
    config: PublishConfig,
}

#[derive(Serialize)]
struct PutPayload<'a> {
    message: &'a str,
    content: String,
    branch: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    sha: Option<&'a str>,
}

#[derive(Deserialize)]
struct ContentsResponse {
    content: Option<String>,
    sha: Option<String>,
}

#[derive(Deserialize)]
struct PutResponse {
    content: PutContent,
}

#[derive(Deserialize)]
struct PutContent {
    sha: String,
}

impl GithubClient {
    pub fn new(config: PublishConfig) -> Self {
        Self {
            client: Client::builder()
                .user_agent("reel-publisher")
                .timeout(REQUEST_TIMEOUT)
                .build()
                .unwrap_or_default(),
            config,
        }
    }

    pub fn config(&self) -> &PublishConfig {
        &self.config
    }

    fn contents_url(&self, path: &str) -> String {
        format!(
            "https://api.github.com/repos/{}/{}/contents/{}",
            self.config.owner, self.config.repo, path
        )
    }

    /// Raw-hosting URL for a published path
    pub fn raw_url(&self, path: &str) -> String {
        format!(
            "https://raw.githubusercontent.com/{}/{}/{}/{}",
            self.config.owner, self.config.repo, self.config.branch, path
        )
    }

    /// Fetch a file and its version token; `None` when the path does not
    /// exist on the branch
    pub async fn get_file(&self, path: &str) -> Result<Option<RemoteFile>, PublishError> {
        let response = self
            .client
            .get(self.contents_url(path))
            .query(&[("ref", self.config.branch.as_str())])
            .bearer_auth(&self.config.token)
            .header(ACCEPT, "application/vnd.github+json")
            .header("X-GitHub-Api-Version", API_VERSION)
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let status = response.status().as_u16();
        if status >= 400 {
            return Err(PublishError::Api {
                status,
                message: response.text().await.unwrap_or_default(),
            });
        }

        let body: ContentsResponse = response
            .json()
            .await
            .map_err(|e| PublishError::InvalidResponse(e.to_string()))?;
        let sha = body
            .sha
            .ok_or_else(|| PublishError::InvalidResponse("missing sha".to_string()))?;
        let content = match body.content {
            // GitHub wraps the base64 payload at 60 columns.
            Some(encoded) => BASE64
                .decode(encoded.replace(['\n', ' '], ""))
                .map_err(|e| PublishError::InvalidResponse(format!("bad base64: {}", e)))?,
            None => Vec::new(),
        };

        Ok(Some(RemoteFile { content, sha }))
    }

    /// Create or update a file; pass the current sha to update. Returns the
    /// new version token.
    pub async fn put_file(
        &self,
        path: &str,
        message: &str,
        bytes: &[u8],
        sha: Option<&str>,
    ) -> Result<String, PublishError> {
        let payload = PutPayload {
            message,
            content: BASE64.encode(bytes),
            branch: &self.config.branch,
            sha,
        };

        let response = self
            .client
            .put(self.contents_url(path))
            .bearer_auth(&self.config.token)
            .header(ACCEPT, "application/vnd.github+json")
            .header("X-GitHub-Api-Version", API_VERSION)
            .json(&payload)
            .send()
            .await?;

        let status = response.status().as_u16();
        if status >= 400 {
            return Err(PublishError::Api {
                status,
                message: response.text().await.unwrap_or_default(),
            });
        }

        let body: PutResponse = response
            .json()
            .await
            .map_err(|e| PublishError::InvalidResponse(e.to_string()))?;
        Ok(body.content.sha)
    }
}
