//! GitHub REST API release host.

use async_trait::async_trait;
use reqwest::StatusCode;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use url::Url;

use super::host::{AssetUpload, HostedAsset, HostedRelease, NewRelease, ReleaseHost};
use crate::error::{GitHubError, Result};

const API_VERSION: &str = "2022-11-28";
const GITHUB_JSON: &str = "application/vnd.github+json";

/// Release host backed by `api.github.com` (or a GitHub Enterprise root)
#[derive(Debug, Clone)]
pub struct GitHubClient {
    http: reqwest::Client,
    api_url: Url,
    owner: String,
    repo: String,
    token: String,
}

impl GitHubClient {
    /// Create a client for `owner/repo`
    pub fn new(api_url: &str, owner: &str, repo: &str, token: String) -> Result<Self> {
        if token.trim().is_empty() {
            return Err(GitHubError::MissingToken.into());
        }

        let api_url = Url::parse(api_url).map_err(|e| GitHubError::Network {
            operation: "parse api url".to_string(),
            reason: e.to_string(),
        })?;

        let http = reqwest::Client::builder()
            .user_agent(concat!("initiative_release/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| GitHubError::Network {
                operation: "client init".to_string(),
                reason: e.to_string(),
            })?;

        Ok(Self {
            http,
            api_url,
            owner: owner.to_string(),
            repo: repo.to_string(),
            token,
        })
    }

    /// `{api}/repos/{owner}/{repo}/releases` followed by `segments`
    fn releases_url(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.api_url.clone();
        {
            let mut path = url.path_segments_mut().map_err(|_| GitHubError::Network {
                operation: "build url".to_string(),
                reason: format!("{} cannot be a base URL", self.api_url),
            })?;
            path.pop_if_empty()
                .extend(["repos", self.owner.as_str(), self.repo.as_str(), "releases"])
                .extend(segments);
        }
        Ok(url)
    }

    fn request(&self, method: reqwest::Method, url: Url) -> reqwest::RequestBuilder {
        self.http
            .request(method, url)
            .bearer_auth(&self.token)
            .header(ACCEPT, GITHUB_JSON)
            .header("X-GitHub-Api-Version", API_VERSION)
    }

    async fn send(
        &self,
        operation: &str,
        request: reqwest::RequestBuilder,
    ) -> Result<reqwest::Response> {
        log::debug!("GitHub {}", operation);
        request.send().await.map_err(|e| {
            GitHubError::Network {
                operation: operation.to_string(),
                reason: e.to_string(),
            }
            .into()
        })
    }

    async fn decode<T: serde::de::DeserializeOwned>(
        operation: &str,
        response: reqwest::Response,
    ) -> Result<T> {
        response.json::<T>().await.map_err(|e| {
            GitHubError::Network {
                operation: operation.to_string(),
                reason: format!("invalid response body: {}", e),
            }
            .into()
        })
    }
}

/// Error for a non-success response, with the body as message
async fn api_error(operation: &str, response: reqwest::Response) -> GitHubError {
    let status = response.status().as_u16();
    let message = response
        .text()
        .await
        .unwrap_or_else(|e| format!("<unreadable body: {}>", e));
    GitHubError::Api {
        operation: operation.to_string(),
        status,
        message,
    }
}

/// Resolve GitHub's `upload_url` template into a concrete upload URL
pub(crate) fn expand_upload_url(template: &str, asset: &AssetUpload) -> Result<Url> {
    let base = template.split('{').next().unwrap_or(template);
    let mut url = Url::parse(base).map_err(|e| GitHubError::Network {
        operation: "parse upload url".to_string(),
        reason: e.to_string(),
    })?;
    {
        let mut query = url.query_pairs_mut();
        query.append_pair("name", &asset.name);
        if let Some(label) = &asset.label {
            query.append_pair("label", label);
        }
    }
    Ok(url)
}

#[async_trait]
impl ReleaseHost for GitHubClient {
    async fn create_release(&self, release: &NewRelease) -> Result<HostedRelease> {
        let operation = "create release";
        let url = self.releases_url(&[])?;
        let response = self
            .send(operation, self.request(reqwest::Method::POST, url).json(release))
            .await?;

        match response.status() {
            status if status.is_success() => Self::decode(operation, response).await,
            StatusCode::UNPROCESSABLE_ENTITY => Err(GitHubError::ReleaseConflict {
                tag: release.tag_name.clone(),
            }
            .into()),
            _ => Err(api_error(operation, response).await.into()),
        }
    }

    async fn upload_asset(
        &self,
        release: &HostedRelease,
        asset: &AssetUpload,
    ) -> Result<HostedAsset> {
        let operation = "upload asset";
        let url = if release.upload_url.is_empty() {
            let mut url = self.releases_url(&[&release.id.to_string(), "assets"])?;
            url.set_host(Some("uploads.github.com"))
                .map_err(|e| GitHubError::Network {
                    operation: operation.to_string(),
                    reason: e.to_string(),
                })?;
            let template = url.to_string();
            expand_upload_url(&template, asset)?
        } else {
            expand_upload_url(&release.upload_url, asset)?
        };

        let request = self
            .request(reqwest::Method::POST, url)
            .header(CONTENT_TYPE, &asset.content_type)
            .body(asset.content.clone());
        let response = self.send(operation, request).await?;

        match response.status() {
            status if status.is_success() => Self::decode(operation, response).await,
            StatusCode::UNPROCESSABLE_ENTITY => Err(GitHubError::AssetConflict {
                release_id: release.id,
                name: asset.name.clone(),
            }
            .into()),
            _ => Err(api_error(operation, response).await.into()),
        }
    }

    async fn publish_release(&self, release_id: u64) -> Result<HostedRelease> {
        let operation = "publish release";
        let url = self.releases_url(&[&release_id.to_string()])?;
        let request = self
            .request(reqwest::Method::PATCH, url)
            .json(&serde_json::json!({ "draft": false }));
        let response = self.send(operation, request).await?;

        match response.status() {
            status if status.is_success() => Self::decode(operation, response).await,
            StatusCode::NOT_FOUND => Err(GitHubError::ReleaseNotFound { release_id }.into()),
            _ => Err(api_error(operation, response).await.into()),
        }
    }

    async fn release_by_tag(&self, tag: &str) -> Result<Option<HostedRelease>> {
        let operation = "get release by tag";
        let url = self.releases_url(&["tags", tag])?;
        let response = self
            .send(operation, self.request(reqwest::Method::GET, url))
            .await?;

        match response.status() {
            status if status.is_success() => Self::decode(operation, response).await.map(Some),
            StatusCode::NOT_FOUND => Ok(None),
            _ => Err(api_error(operation, response).await.into()),
        }
    }
}
