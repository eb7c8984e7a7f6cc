// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! HTTP API over dashboard views.
//!
//! | Route                          | Response                          |
//! |--------------------------------|-----------------------------------|
//! | `GET /health`                  | `OK`                              |
//! | `GET /api/overview`            | [`Overview`]                      |
//! | `GET /api/deployment?platform` | [`Deployment`]                    |
//! | `GET /api/tree?platform`       | [`SourceTree`]                    |
//! | `POST /api/simulate`           | [`SimulationResult`]              |
//!
//! Requests are validated before anything is fetched. Bad requests answer
//! `400`, failures to fetch or parse repository contents answer `500`. Both
//! carry a JSON body of the form `{"error": "<message>"}`.

use crate::{
    dashboard::{Dashboard, DashboardError, Deployment, Overview, SourceTree},
    deploy::{SimulationRequest, SimulationResult},
    platform::Platform,
    provider::RepositoryProvider,
};

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tracing::{error, info, instrument, warn};

/// Shared handler state.
#[derive(Debug)]
pub struct AppState<P> {
    dashboard: Arc<Dashboard<P>>,
    default_platform: Platform,
}

impl<P> Clone for AppState<P> {
    fn clone(&self) -> Self {
        Self {
            dashboard: Arc::clone(&self.dashboard),
            default_platform: self.default_platform,
        }
    }
}

/// Build API router.
///
/// Requests that leave out a platform use `default_platform`.
pub fn router<P>(dashboard: Dashboard<P>, default_platform: Platform) -> Router
where
    P: RepositoryProvider,
{
    let state = AppState {
        dashboard: Arc::new(dashboard),
        default_platform,
    };

    Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/api/overview", get(overview::<P>))
        .route("/api/deployment", get(deployment::<P>))
        .route("/api/tree", get(tree::<P>))
        .route("/api/simulate", post(simulate::<P>))
        .with_state(state)
}

/// Serve API until ctrl-c is received.
///
/// # Errors
///
/// - Return [`std::io::Error`] if bind address cannot be listened on.
pub async fn serve<P>(
    bind: SocketAddr,
    dashboard: Dashboard<P>,
    default_platform: Platform,
) -> std::io::Result<()>
where
    P: RepositoryProvider,
{
    let listener = TcpListener::bind(bind).await?;
    info!("listening on http://{}", listener.local_addr()?);

    axum::serve(listener, router(dashboard, default_platform))
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("shutting down"),
        Err(error) => {
            warn!("cannot listen for ctrl-c, graceful shutdown disabled: {error}");
            std::future::pending::<()>().await;
        }
    }
}

#[derive(Debug, Deserialize)]
struct PlatformQuery {
    platform: Option<Platform>,
}

impl<P> AppState<P> {
    fn platform(&self, query: Result<Query<PlatformQuery>, QueryRejection>) -> Result<Platform> {
        let Query(query) = query.map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;
        Ok(query.platform.unwrap_or(self.default_platform))
    }
}

#[instrument(skip_all, level = "debug")]
async fn overview<P: RepositoryProvider>(State(state): State<AppState<P>>) -> Result<Json<Overview>> {
    Ok(Json(state.dashboard.overview().await?))
}

#[instrument(skip_all, level = "debug")]
async fn deployment<P: RepositoryProvider>(
    State(state): State<AppState<P>>,
    query: Result<Query<PlatformQuery>, QueryRejection>,
) -> Result<Json<Deployment>> {
    let platform = state.platform(query)?;
    Ok(Json(state.dashboard.deployment(platform).await?))
}

#[instrument(skip_all, level = "debug")]
async fn tree<P: RepositoryProvider>(
    State(state): State<AppState<P>>,
    query: Result<Query<PlatformQuery>, QueryRejection>,
) -> Result<Json<SourceTree>> {
    let platform = state.platform(query)?;
    Ok(Json(state.dashboard.source_tree(platform).await?))
}

#[instrument(skip_all, level = "debug")]
async fn simulate<P: RepositoryProvider>(
    State(state): State<AppState<P>>,
    request: Result<Json<SimulationRequest>, JsonRejection>,
) -> Result<Json<SimulationResult>> {
    let Json(request) = request.map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;
    Ok(Json(state.dashboard.simulate(request).await?))
}

/// API error types.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Request is malformed.
    #[error("{0}")]
    BadRequest(String),

    /// Dashboard view could not be produced.
    #[error(transparent)]
    Dashboard(#[from] DashboardError),
}

impl ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Dashboard(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        match &self {
            Self::BadRequest(message) => warn!("reject request: {message}"),
            Self::Dashboard(error) => error!("{error}"),
        }

        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

/// Friendly result alias :3
pub type Result<T, E = ApiError> = std::result::Result<T, E>;
