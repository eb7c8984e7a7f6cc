// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Dotlens settings layout.
//!
//! Specify the layout of the TOML settings file that tells Dotlens which
//! dotfile repository to inspect, and how to serve it. File I/O is left to the
//! caller to figure out.
//!
//! # General Layout
//!
//! ```toml
//! [server]
//! bind = "127.0.0.1:8080"
//! default_platform = "linux"
//!
//! [repository]
//! provider = "github"
//! owner = "awkless"
//! name = "dotfiles"
//! reference = "main"
//! token = "$GITHUB_TOKEN"
//!
//! [files]
//! root = "home"
//! config = ".chezmoi.yaml"
//! ignore = ".chezmoiignore"
//! ```
//!
//! Only `[repository]` is mandatory.

use crate::{dashboard::SourceLayout, platform::Platform};

use serde::{Deserialize, Serialize};
use std::{
    fmt::{Display, Error as FmtError, Formatter, Result as FmtResult},
    net::{Ipv4Addr, SocketAddr},
    path::PathBuf,
    str::FromStr,
};

/// Default GitHub REST API endpoint.
pub const GITHUB_API_URL: &str = "https://api.github.com";

/// Top-level settings.
#[derive(Debug, PartialEq, Eq, Clone, Deserialize, Serialize)]
pub struct Settings {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerSettings,

    /// Repository to inspect.
    pub repository: RepositorySettings,

    /// Layout of source files inside the repository.
    #[serde(default)]
    pub files: SourceLayout,
}

impl FromStr for Settings {
    type Err = SettingsError;

    fn from_str(data: &str) -> Result<Self, Self::Err> {
        let mut settings: Settings = toml::de::from_str(data).map_err(SettingsError::Deserialize)?;

        // INVARIANT: Perform shell expansion on secrets and paths.
        match &mut settings.repository {
            RepositorySettings::GitHub(github) => {
                if let Some(token) = github.token.as_mut() {
                    *token = expand(token)?;
                }
            }
            RepositorySettings::Local(local) => {
                local.path = PathBuf::from(expand(local.path.to_string_lossy().as_ref())?);
            }
        }

        Ok(settings)
    }
}

impl Display for Settings {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        fmt.write_str(
            toml::ser::to_string_pretty(self)
                .map_err(SettingsError::Serialize)?
                .as_str(),
        )
    }
}

fn expand(value: &str) -> Result<String> {
    Ok(shellexpand::full(value)
        .map_err(SettingsError::ShellExpansion)?
        .into_owned())
}

/// HTTP server settings.
#[derive(Debug, PartialEq, Eq, Clone, Deserialize, Serialize)]
pub struct ServerSettings {
    /// Socket address to listen on.
    #[serde(default = "default_bind")]
    pub bind: SocketAddr,

    /// Platform used when a request does not name one.
    #[serde(default)]
    pub default_platform: Platform,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            default_platform: Platform::default(),
        }
    }
}

fn default_bind() -> SocketAddr {
    SocketAddr::from((Ipv4Addr::LOCALHOST, 8080))
}

/// Where repository contents come from.
#[derive(Debug, PartialEq, Eq, Clone, Deserialize, Serialize)]
#[serde(tag = "provider", rename_all = "lowercase")]
pub enum RepositorySettings {
    /// Remote repository hosted on GitHub.
    #[serde(rename = "github")]
    GitHub(GitHubSettings),

    /// Repository on local disk.
    Local(LocalSettings),
}

/// GitHub repository settings.
#[derive(Debug, PartialEq, Eq, Clone, Deserialize, Serialize)]
pub struct GitHubSettings {
    /// User or organization that owns the repository.
    pub owner: String,

    /// Name of the repository.
    pub name: String,

    /// Branch, tag, or commit to read from.
    #[serde(default = "default_github_reference")]
    pub reference: String,

    /// Personal access token. Anonymous access is heavily rate limited.
    pub token: Option<String>,

    /// Base URL of GitHub REST API.
    #[serde(default = "default_api_url")]
    pub api_url: String,
}

fn default_github_reference() -> String {
    "main".into()
}

fn default_api_url() -> String {
    GITHUB_API_URL.into()
}

/// Local repository settings.
#[derive(Debug, PartialEq, Eq, Clone, Deserialize, Serialize)]
pub struct LocalSettings {
    /// Path to bare or normal repository.
    pub path: PathBuf,

    /// Revision to read from, `HEAD` if absent.
    pub reference: Option<String>,
}

/// Settings error types.
#[derive(Clone, Debug, thiserror::Error)]
pub enum SettingsError {
    /// Failed to deserialize settings.
    #[error(transparent)]
    Deserialize(#[from] toml::de::Error),

    /// Failed to serialize settings.
    #[error(transparent)]
    Serialize(#[from] toml::ser::Error),

    /// Failed to perform shell expansion on settings.
    #[error(transparent)]
    ShellExpansion(#[from] shellexpand::LookupError<std::env::VarError>),
}

impl From<SettingsError> for FmtError {
    fn from(_: SettingsError) -> Self {
        FmtError
    }
}

/// Friendly result alias :3
type Result<T, E = SettingsError> = std::result::Result<T, E>;
