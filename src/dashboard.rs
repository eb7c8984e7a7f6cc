// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Dashboard views over a dotfile repository.
//!
//! The dashboard glues a [`RepositoryProvider`] to the deployment model. Every
//! view takes a fresh [`Snapshot`] of the repository, so nothing is cached
//! between calls and a failed fetch never leaves a half computed answer
//! behind.

use crate::{
    catalog::{self, Category},
    config::{Config, ConfigError, ConfigWarning, GitUser},
    deploy::{
        resolve_deployment, simulate, Disposition, FileMapping, MatchPolicy, Resolver,
        SimulationRequest, SimulationResult,
    },
    platform::Platform,
    provider::{ProviderError, RepositoryProvider},
};

use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

/// Location of source files inside a repository.
///
/// Configuration and ignore file paths are relative to `root`.
#[derive(Debug, PartialEq, Eq, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SourceLayout {
    /// Directory holding source state, empty for repository top-level.
    pub root: String,

    /// Path to YAML configuration.
    pub config: String,

    /// Path to ignore file.
    pub ignore: String,
}

impl Default for SourceLayout {
    fn default() -> Self {
        Self {
            root: String::new(),
            config: ".chezmoi.yaml".into(),
            ignore: ".chezmoiignore".into(),
        }
    }
}

impl SourceLayout {
    /// Repository path of file relative to source root.
    pub fn repo_path(&self, path: impl AsRef<str>) -> String {
        match self.root.trim_matches('/') {
            "" => path.as_ref().to_string(),
            root => format!("{root}/{}", path.as_ref()),
        }
    }

    /// Source path of repository file, or nothing if file lies outside
    /// source root.
    pub fn source_path<'a>(&self, repo_path: &'a str) -> Option<&'a str> {
        match self.root.trim_matches('/') {
            "" => Some(repo_path),
            root => repo_path.strip_prefix(root)?.strip_prefix('/'),
        }
    }
}

/// Everything needed to resolve deployment, fetched in one go.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub config: Config,
    pub ignore_text: String,
    pub sources: Vec<String>,
    pub warnings: Vec<ConfigWarning>,
}

/// Files deployed on a platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Deployment {
    pub platform: Platform,
    pub total: usize,
    pub files: Vec<FileMapping>,
}

/// Every source file with what happens to it on a platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceTree {
    pub platform: Platform,
    pub entries: Vec<TreeEntry>,
}

/// Source file in tree view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeEntry {
    pub source_path: String,

    #[serde(flatten)]
    pub disposition: Disposition,
}

/// Summary of repository configuration.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Overview {
    pub git_user: GitUser,
    pub platform: Option<Platform>,
    pub modules: Vec<ModuleOverview>,
    pub warnings: Vec<String>,
}

/// Module as shown in overview.
///
/// Configured modules come first in configuration order, followed by catalog
/// modules the configuration leaves out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleOverview {
    pub name: String,
    pub enabled: bool,
    pub configured: bool,
    pub description: Option<&'static str>,
    pub category: Option<Category>,
    pub dependencies: Vec<&'static str>,
    pub platforms: Vec<Platform>,
}

impl ModuleOverview {
    fn new(name: impl Into<String>, enabled: bool, configured: bool) -> Self {
        let name = name.into();
        let info = catalog::lookup(&name);

        Self {
            enabled,
            configured,
            description: info.map(|info| info.description),
            category: info.map(|info| info.category),
            dependencies: info.map(|info| info.dependencies.to_vec()).unwrap_or_default(),
            platforms: info
                .map(|info| info.platforms.to_vec())
                .unwrap_or_else(|| Platform::ALL.to_vec()),
            name,
        }
    }
}

/// Views over a dotfile repository.
#[derive(Debug, Clone)]
pub struct Dashboard<P> {
    provider: P,
    layout: SourceLayout,
}

impl<P> Dashboard<P>
where
    P: RepositoryProvider,
{
    /// Construct new dashboard.
    pub fn new(provider: P, layout: SourceLayout) -> Self {
        Self { provider, layout }
    }

    /// Layout of source files.
    pub fn layout(&self) -> &SourceLayout {
        &self.layout
    }

    /// Fetch and parse current repository state.
    ///
    /// Configuration, ignore file, and file listing are fetched concurrently.
    ///
    /// # Errors
    ///
    /// - Return [`DashboardError::Fetch`] if any fetch fails.
    /// - Return [`DashboardError::Config`] if configuration cannot be parsed.
    #[instrument(skip(self), level = "debug")]
    pub async fn snapshot(&self) -> Result<Snapshot> {
        let config_path = self.layout.repo_path(&self.layout.config);
        let ignore_path = self.layout.repo_path(&self.layout.ignore);

        let (config_text, ignore_text, listing) = futures::try_join!(
            self.provider.read_file(&config_path),
            self.provider.read_file(&ignore_path),
            self.provider.list_files(),
        )?;

        let config: Config = config_text.parse()?;
        let warnings = config.validate();
        for warning in &warnings {
            warn!("{warning}");
        }

        let sources = listing
            .iter()
            .filter_map(|path| self.layout.source_path(path))
            .map(ToString::to_string)
            .collect::<Vec<_>>();
        info!("fetched {} source files", sources.len());

        Ok(Snapshot {
            config,
            ignore_text,
            sources,
            warnings,
        })
    }

    /// Files deployed on platform.
    pub async fn deployment(&self, platform: Platform) -> Result<Deployment> {
        let snapshot = self.snapshot().await?;
        let files = resolve_deployment(
            &snapshot.sources,
            &snapshot.config,
            &snapshot.ignore_text,
            platform,
        );

        Ok(Deployment {
            platform,
            total: files.len(),
            files,
        })
    }

    /// Every source file with its disposition on platform.
    pub async fn source_tree(&self, platform: Platform) -> Result<SourceTree> {
        let snapshot = self.snapshot().await?;
        let resolver = Resolver::new(
            &snapshot.config,
            &snapshot.ignore_text,
            platform,
            MatchPolicy::SOURCE_TREE,
        );
        let entries = snapshot
            .sources
            .iter()
            .map(|source| TreeEntry {
                source_path: source.clone(),
                disposition: resolver.disposition(source),
            })
            .collect();

        Ok(SourceTree { platform, entries })
    }

    /// Simulate toggling modules against current configuration.
    pub async fn simulate(&self, request: SimulationRequest) -> Result<SimulationResult> {
        let snapshot = self.snapshot().await?;
        Ok(simulate(
            &snapshot.sources,
            &snapshot.config,
            &snapshot.ignore_text,
            request,
        ))
    }

    /// Summary of configuration with module metadata.
    pub async fn overview(&self) -> Result<Overview> {
        let snapshot = self.snapshot().await?;
        let data = &snapshot.config.data;

        let mut modules = data
            .modules
            .iter()
            .map(|(name, state)| ModuleOverview::new(name, state.is_enabled(), true))
            .collect::<Vec<_>>();
        modules.extend(
            catalog::KNOWN_MODULES
                .iter()
                .filter(|info| !data.modules.contains_key(info.name))
                .map(|info| ModuleOverview::new(info.name, false, false)),
        );

        Ok(Overview {
            git_user: data.git_user.clone(),
            platform: snapshot.config.platform(),
            modules,
            warnings: snapshot.warnings.iter().map(ToString::to_string).collect(),
        })
    }
}

/// Dashboard error types.
#[derive(Debug, thiserror::Error)]
pub enum DashboardError {
    /// Repository contents could not be fetched.
    #[error("failed to fetch repository contents: {0}")]
    Fetch(#[from] ProviderError),

    /// Repository configuration is unusable.
    #[error("failed to parse repository configuration: {0}")]
    Config(#[from] ConfigError),
}

/// Friendly result alias :3
pub type Result<T, E = DashboardError> = std::result::Result<T, E>;
