// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! GitHub REST API provider.

use crate::{
    provider::{ProviderError, RepositoryProvider, Result},
    settings::GitHubSettings,
};

use reqwest::{
    header::{HeaderMap, ACCEPT},
    Client, Response, StatusCode,
};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, instrument, warn};

const USER_AGENT: &str = concat!("dotlens/", env!("CARGO_PKG_VERSION"));
const API_VERSION: &str = "2022-11-28";
const RAW_MEDIA_TYPE: &str = "application/vnd.github.raw";
const JSON_MEDIA_TYPE: &str = "application/vnd.github+json";

/// Read repository contents through GitHub REST API.
#[derive(Debug, Clone)]
pub struct GitHubProvider {
    client: Client,
    api_url: String,
    owner: String,
    name: String,
    reference: String,
    token: Option<String>,
}

impl GitHubProvider {
    /// Construct new GitHub provider.
    ///
    /// # Errors
    ///
    /// - Return [`ProviderError::Http`] if HTTP client cannot be built.
    pub fn new(settings: &GitHubSettings) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .connect_timeout(Duration::from_secs(15))
            .timeout(Duration::from_secs(60))
            .build()?;

        Ok(Self {
            client,
            api_url: settings.api_url.trim_end_matches('/').to_string(),
            owner: settings.owner.clone(),
            name: settings.name.clone(),
            reference: settings.reference.clone(),
            token: settings.token.clone(),
        })
    }

    fn repo_url(&self) -> String {
        format!("{}/repos/{}/{}", self.api_url, self.owner, self.name)
    }

    async fn send(&self, request: reqwest::RequestBuilder, path: &str) -> Result<Response> {
        let request = request.header("X-GitHub-Api-Version", API_VERSION);
        let request = match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        };

        let response = request.send().await?;
        check_status(response, path)
    }
}

impl RepositoryProvider for GitHubProvider {
    #[instrument(skip(self), fields(repo = %self.name), level = "debug")]
    async fn read_file(&self, path: &str) -> Result<String> {
        let mut request = self
            .client
            .get(format!("{}/contents", self.repo_url()))
            .query(&[("ref", self.reference.as_str())])
            .header(ACCEPT, RAW_MEDIA_TYPE)
            .build()?;

        // INVARIANT: Percent-encode every segment of file path.
        if let Ok(mut segments) = request.url_mut().path_segments_mut() {
            segments.extend(path.split('/'));
        }

        let request = reqwest::RequestBuilder::from_parts(self.client.clone(), request);
        let response = self.send(request, path).await?;
        let bytes = response.bytes().await?;
        debug!("read {} bytes", bytes.len());

        String::from_utf8(bytes.to_vec()).map_err(|_| ProviderError::NotText(path.to_string()))
    }

    #[instrument(skip(self), fields(repo = %self.name), level = "debug")]
    async fn list_files(&self) -> Result<Vec<String>> {
        let request = self
            .client
            .get(format!("{}/git/trees/{}", self.repo_url(), self.reference))
            .query(&[("recursive", "1")])
            .header(ACCEPT, JSON_MEDIA_TYPE);

        let response = self.send(request, &self.reference).await?;
        let tree: TreeResponse = response.json().await?;
        if tree.truncated {
            warn!(
                "tree listing of {}/{} is truncated, some files will be missing",
                self.owner, self.name
            );
        }

        let files = tree
            .tree
            .into_iter()
            .filter(|item| item.kind == "blob")
            .map(|item| item.path)
            .collect::<Vec<_>>();
        debug!("listed {} files", files.len());

        Ok(files)
    }
}

#[derive(Debug, Deserialize)]
struct TreeResponse {
    tree: Vec<TreeItem>,

    #[serde(default)]
    truncated: bool,
}

#[derive(Debug, Deserialize)]
struct TreeItem {
    path: String,

    #[serde(rename = "type")]
    kind: String,
}

fn check_status(response: Response, path: &str) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    if matches!(status, StatusCode::FORBIDDEN | StatusCode::TOO_MANY_REQUESTS)
        && rate_limit_exhausted(response.headers())
    {
        return Err(ProviderError::RateLimited);
    }

    if status == StatusCode::NOT_FOUND {
        return Err(ProviderError::NotFound(path.to_string()));
    }

    Err(ProviderError::Status {
        status: status.as_u16(),
        path: path.to_string(),
    })
}

fn rate_limit_exhausted(headers: &HeaderMap) -> bool {
    headers
        .get("x-ratelimit-remaining")
        .is_some_and(|remaining| remaining.as_bytes() == b"0")
}
