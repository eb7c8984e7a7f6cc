// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

use dotlens::{
    provider::{GitHubProvider, ProviderError, RepositoryProvider},
    settings::GitHubSettings,
};

use anyhow::Result;
use axum::{
    extract::{Path, Query},
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::{collections::HashMap, net::SocketAddr};
use tokio::net::TcpListener;

async fn spawn(app: Router) -> Result<SocketAddr> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move { axum::serve(listener, app).await });

    Ok(addr)
}

fn settings(addr: SocketAddr, token: Option<&str>) -> GitHubSettings {
    GitHubSettings {
        owner: "awkless".into(),
        name: "dotfiles".into(),
        reference: "main".into(),
        token: token.map(Into::into),
        api_url: format!("http://{addr}/"),
    }
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get(AUTHORIZATION)
        .is_some_and(|value| value.as_bytes() == b"Bearer secret")
}

async fn tree(
    Path((owner, repo, reference)): Path<(String, String, String)>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> impl IntoResponse {
    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }

    assert_eq!((owner.as_str(), repo.as_str(), reference.as_str()), ("awkless", "dotfiles", "main"));
    assert_eq!(query.get("recursive").map(String::as_str), Some("1"));
    Json(json!({
        "sha": "blah",
        "tree": [
            { "path": "dot_bashrc", "type": "blob" },
            { "path": "dot_config", "type": "tree" },
            { "path": "dot_config/git/dot_gitconfig", "type": "blob" },
            { "path": "vendor/plugin", "type": "commit" },
        ],
        "truncated": false,
    }))
    .into_response()
}

async fn contents(
    Path((_, _, path)): Path<(String, String, String)>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> impl IntoResponse {
    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }

    assert_eq!(query.get("ref").map(String::as_str), Some("main"));
    match path.as_str() {
        "dot_bashrc" => "alias ll='ls -l'\n".into_response(),
        "dot_config/git/dot_gitconfig" => "[user]\n".into_response(),
        _ => StatusCode::NOT_FOUND.into_response(),
    }
}

fn github_api() -> Router {
    Router::new()
        .route("/repos/:owner/:repo/git/trees/:reference", get(tree))
        .route("/repos/:owner/:repo/contents/*path", get(contents))
}

#[tokio::test]
async fn list_only_blobs() -> Result<()> {
    let addr = spawn(github_api()).await?;
    let provider = GitHubProvider::new(&settings(addr, Some("secret")))?;

    let result = provider.list_files().await?;
    assert_eq!(result, vec!["dot_bashrc", "dot_config/git/dot_gitconfig"]);

    Ok(())
}

#[tokio::test]
async fn read_raw_contents() -> Result<()> {
    let addr = spawn(github_api()).await?;
    let provider = GitHubProvider::new(&settings(addr, Some("secret")))?;

    assert_eq!(provider.read_file("dot_bashrc").await?, "alias ll='ls -l'\n");
    assert_eq!(
        provider.read_file("dot_config/git/dot_gitconfig").await?,
        "[user]\n"
    );
    assert!(matches!(
        provider.read_file("missing").await,
        Err(ProviderError::NotFound(path)) if path == "missing"
    ));

    Ok(())
}

#[tokio::test]
async fn report_unexpected_status() -> Result<()> {
    let addr = spawn(github_api()).await?;
    let provider = GitHubProvider::new(&settings(addr, None))?;

    assert!(matches!(
        provider.list_files().await,
        Err(ProviderError::Status { status: 401, .. })
    ));

    Ok(())
}

#[tokio::test]
async fn report_rate_limiting() -> Result<()> {
    let limited = || async {
        (
            StatusCode::FORBIDDEN,
            [("x-ratelimit-remaining", "0")],
            "API rate limit exceeded",
        )
    };
    let forbidden = || async { StatusCode::FORBIDDEN };
    let app = Router::new()
        .route("/repos/:owner/:repo/git/trees/:reference", get(limited))
        .route("/repos/:owner/:repo/contents/*path", get(forbidden));
    let addr = spawn(app).await?;
    let provider = GitHubProvider::new(&settings(addr, None))?;

    assert!(matches!(
        provider.list_files().await,
        Err(ProviderError::RateLimited)
    ));
    assert!(matches!(
        provider.read_file("dot_bashrc").await,
        Err(ProviderError::Status { status: 403, .. })
    ));

    Ok(())
}
