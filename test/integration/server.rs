// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

use crate::MemoryProvider;

use dotlens::{
    dashboard::{Dashboard, SourceLayout},
    platform::Platform,
    server::router,
};

use anyhow::Result;
use axum::{
    body::{to_bytes, Body},
    http::{header::CONTENT_TYPE, Request, StatusCode},
    Router,
};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use tower::ServiceExt;

fn app(provider: MemoryProvider) -> Router {
    router(
        Dashboard::new(provider, SourceLayout::default()),
        Platform::Windows,
    )
}

async fn call(app: Router, request: Request<Body>) -> Result<(StatusCode, Value)> {
    let response = app.oneshot(request).await?;
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await?;

    Ok((status, serde_json::from_slice(&body)?))
}

fn get(uri: &str) -> Result<Request<Body>> {
    Ok(Request::get(uri).body(Body::empty())?)
}

fn post_json(uri: &str, body: &str) -> Result<Request<Body>> {
    Ok(Request::post(uri)
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))?)
}

#[tokio::test]
async fn health_check() -> Result<()> {
    let response = app(MemoryProvider::new()).oneshot(get("/health")?).await?;
    assert_eq!(response.status(), StatusCode::OK);

    let body = to_bytes(response.into_body(), usize::MAX).await?;
    assert_eq!(&body[..], b"OK");

    Ok(())
}

#[tokio::test]
async fn deployment_uses_default_platform() -> Result<()> {
    let (status, body) = call(app(MemoryProvider::dotfiles()), get("/api/deployment")?).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["platform"], json!("windows"));
    assert_eq!(body["total"], json!(2));
    assert_eq!(
        body["files"][0]["deployPath"],
        json!("~/Documents/PowerShell/Microsoft.PowerShell_profile.ps1")
    );
    assert_eq!(body["files"][0]["requiredModules"], json!(["powershell"]));

    let (status, body) = call(
        app(MemoryProvider::dotfiles()),
        get("/api/deployment?platform=linux")?,
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["platform"], json!("linux"));
    assert_eq!(body["total"], json!(3));

    Ok(())
}

#[tokio::test]
async fn tree_flattens_disposition() -> Result<()> {
    let (status, body) = call(
        app(MemoryProvider::dotfiles()),
        get("/api/tree?platform=linux")?,
    )
    .await?;
    assert_eq!(status, StatusCode::OK);

    let entries = body["entries"].as_array().cloned().unwrap_or_default();
    let readme = entries
        .iter()
        .find(|entry| entry["sourcePath"] == json!("README.md"));
    assert_eq!(
        readme,
        Some(&json!({ "sourcePath": "README.md", "status": "structural" }))
    );

    let gitconfig = entries
        .iter()
        .find(|entry| entry["sourcePath"] == json!("dot_gitconfig.tmpl"));
    assert_eq!(
        gitconfig,
        Some(&json!({ "sourcePath": "dot_gitconfig.tmpl", "status": "disabled", "modules": ["git"] }))
    );

    Ok(())
}

#[tokio::test]
async fn simulate_reports_diff() -> Result<()> {
    let request = post_json(
        "/api/simulate",
        r#"{ "platform": "linux", "modules": { "git": true } }"#,
    )?;
    let (status, body) = call(app(MemoryProvider::dotfiles()), request).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["totalBefore"], json!(3));
    assert_eq!(body["totalAfter"], json!(4));
    assert_eq!(body["added"][0]["deployPath"], json!("~/.gitconfig"));
    assert_eq!(body["removed"], json!([]));
    assert_eq!(
        body["request"],
        json!({ "platform": "linux", "modules": { "git": true } })
    );

    Ok(())
}

#[tokio::test]
async fn overview_reports_modules() -> Result<()> {
    let (status, body) = call(app(MemoryProvider::dotfiles()), get("/api/overview")?).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["gitUser"], json!({ "name": "John Doe", "email": "john@doe.com" }));
    assert_eq!(body["modules"][0]["name"], json!("shell"));
    assert_eq!(body["modules"][0]["enabled"], json!(true));
    assert_eq!(body["warnings"], json!([]));

    Ok(())
}

#[tokio::test]
async fn malformed_requests_are_rejected() -> Result<()> {
    // Nothing to fetch, so any 400 was decided before fetching.
    let (status, body) = call(
        app(MemoryProvider::new()),
        get("/api/deployment?platform=beos")?,
    )
    .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let (status, _) = call(
        app(MemoryProvider::new()),
        post_json("/api/simulate", r#"{ "platform": "linux" }"#)?,
    )
    .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = call(
        app(MemoryProvider::new()),
        post_json("/api/simulate", r#"{ "platform": "linux", "modules": { "git": "yes" } }"#)?,
    )
    .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = call(
        app(MemoryProvider::new()),
        post_json("/api/simulate", "not json")?,
    )
    .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    Ok(())
}

#[tokio::test]
async fn fetch_failure_is_server_error() -> Result<()> {
    let (status, body) = call(app(MemoryProvider::new()), get("/api/deployment")?).await?;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

    let message = body["error"].as_str().unwrap_or_default();
    assert!(message.contains(".chezmoi"), "unexpected message {message:?}");

    Ok(())
}
