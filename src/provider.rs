// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Repository content providers.
//!
//! A provider hands out the contents of a dotfile repository at a fixed
//! revision: the list of tracked file paths, and the text of individual
//! files. Paths are always relative to the top-level of the repository and
//! use `/` as separator.
//!
//! Providers do not cache and do not retry. Every call goes to the backing
//! repository.

pub mod github;
pub mod local;

pub use github::GitHubProvider;
pub use local::LocalProvider;

use crate::settings::RepositorySettings;

use std::future::Future;

/// Source of repository contents.
pub trait RepositoryProvider: Send + Sync + 'static {
    /// Read text of file at path.
    fn read_file(&self, path: &str) -> impl Future<Output = Result<String>> + Send;

    /// List paths of all tracked files.
    fn list_files(&self) -> impl Future<Output = Result<Vec<String>>> + Send;
}

/// Provider selected at runtime from settings.
#[derive(Debug, Clone)]
pub enum AnyProvider {
    GitHub(GitHubProvider),
    Local(LocalProvider),
}

impl AnyProvider {
    /// Construct provider described by repository settings.
    ///
    /// # Errors
    ///
    /// - Return [`ProviderError::Http`] if HTTP client cannot be built.
    pub fn from_settings(settings: &RepositorySettings) -> Result<Self> {
        match settings {
            RepositorySettings::GitHub(github) => Ok(Self::GitHub(GitHubProvider::new(github)?)),
            RepositorySettings::Local(local) => Ok(Self::Local(LocalProvider::new(
                &local.path,
                local.reference.clone(),
            ))),
        }
    }
}

impl RepositoryProvider for AnyProvider {
    async fn read_file(&self, path: &str) -> Result<String> {
        match self {
            Self::GitHub(provider) => provider.read_file(path).await,
            Self::Local(provider) => provider.read_file(path).await,
        }
    }

    async fn list_files(&self) -> Result<Vec<String>> {
        match self {
            Self::GitHub(provider) => provider.list_files().await,
            Self::Local(provider) => provider.list_files().await,
        }
    }
}

/// Repository provider error types.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// HTTP transport failed, or response body could not be decoded.
    #[error(transparent)]
    Http(#[from] reqwest::Error),

    /// Remote answered with an unexpected status.
    #[error("repository host answered {status} for {path:?}")]
    Status { status: u16, path: String },

    /// Remote refused to serve more requests for now.
    #[error("repository host rate limit exhausted")]
    RateLimited,

    /// File does not exist at configured revision.
    #[error("file {0:?} not found in repository")]
    NotFound(String),

    /// File is not UTF-8 text.
    #[error("file {0:?} is not valid UTF-8 text")]
    NotText(String),

    /// Local repository could not be read.
    #[error(transparent)]
    Git2(#[from] git2::Error),

    /// Blocking task panicked or was cancelled.
    #[error(transparent)]
    Join(#[from] tokio::task::JoinError),
}

/// Friendly result alias :3
pub type Result<T, E = ProviderError> = std::result::Result<T, E>;
