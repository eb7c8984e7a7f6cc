// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Deployment resolution.
//!
//! Decide which source files end up deployed for a given configuration and
//! platform. Each source path goes through the following filters in order:
//!
//! 1. Structural exclusion of repository plumbing, e.g., `README.md`.
//! 2. Active ignore patterns from the ignore file.
//! 3. Platform support of the file.
//! 4. Modules required by the file being enabled.
//!
//! Whatever survives becomes a [`FileMapping`].
//!
//! # Match Policy
//!
//! Ignore patterns are matched differently depending on who asks. Deployment
//! views match against the target path under the home directory and require
//! the whole path to match. The source tree browser matches against the raw
//! source path and accepts prefix matches, so a directory pattern hides its
//! entire subtree. See [`MatchPolicy`].

use crate::{
    config::Config,
    deploy::{
        glob::{Anchor, IgnoreMatcher},
        ignore::resolve_patterns,
        infer::{infer_modules, infer_platforms},
        mapping::FileMapping,
    },
    platform::Platform,
};

use serde::Serialize;
use std::collections::BTreeSet;
use tracing::{debug, instrument};

/// Exact source paths that never deploy.
const EXCLUDED_FILES: &[&str] = &[
    ".gitignore",
    ".gitattributes",
    ".gitmodules",
    "LICENSE",
    "LICENSE.md",
    "README.md",
    "CHANGELOG.md",
    "CONTRIBUTING.md",
    "package.json",
    "package-lock.json",
    "tsconfig.json",
    ".eslintrc.json",
    ".prettierrc",
    ".editorconfig",
    ".pre-commit-config.yaml",
    ".chezmoiignore",
    ".chezmoiroot",
    ".chezmoiversion",
    ".chezmoi.yaml",
    ".chezmoi.yaml.tmpl",
    ".chezmoi.toml.tmpl",
    ".chezmoidata.yaml",
];

/// Source directories whose contents never deploy.
const EXCLUDED_DIRS: &[&str] = &[".git/", ".github/", ".vscode/", "docs/", "node_modules/"];

/// Check if source path is repository plumbing rather than a dotfile.
pub fn is_structural(source: impl AsRef<str>) -> bool {
    let source = source.as_ref();
    EXCLUDED_FILES.contains(&source) || EXCLUDED_DIRS.iter().any(|dir| source.starts_with(dir))
}

/// Path that ignore patterns are matched against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreSubject {
    /// Deploy path with the `~/` marker stripped.
    Target,

    /// Raw repository relative source path.
    Source,
}

/// How ignore patterns are applied to a candidate file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchPolicy {
    pub subject: IgnoreSubject,
    pub anchor: Anchor,
}

impl MatchPolicy {
    /// Policy of deployment views and simulations, `^pattern$` on target path.
    pub const DEPLOYMENT: Self = Self {
        subject: IgnoreSubject::Target,
        anchor: Anchor::Full,
    };

    /// Policy of source tree browsing, `^pattern` on source path.
    pub const SOURCE_TREE: Self = Self {
        subject: IgnoreSubject::Source,
        anchor: Anchor::Start,
    };
}

/// Source file handed to the resolver.
///
/// Gating metadata left out is inferred from the source path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceFile {
    pub path: String,
    pub required_modules: Option<BTreeSet<String>>,
    pub platforms: Option<BTreeSet<Platform>>,
}

impl SourceFile {
    /// Construct new source file with inferred metadata.
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Default::default()
        }
    }

    /// Set required modules explicitly.
    pub fn with_modules(mut self, modules: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.required_modules = Some(modules.into_iter().map(Into::into).collect());
        self
    }

    /// Set supported platforms explicitly.
    pub fn with_platforms(mut self, platforms: impl IntoIterator<Item = Platform>) -> Self {
        self.platforms = Some(platforms.into_iter().collect());
        self
    }

    fn to_mapping(&self) -> FileMapping {
        let required_modules = self
            .required_modules
            .clone()
            .unwrap_or_else(|| infer_modules(&self.path));
        let platforms = self
            .platforms
            .clone()
            .unwrap_or_else(|| infer_platforms(&self.path));

        FileMapping::new(self.path.clone(), required_modules, platforms)
    }
}

impl From<&str> for SourceFile {
    fn from(path: &str) -> Self {
        Self::new(path)
    }
}

impl From<String> for SourceFile {
    fn from(path: String) -> Self {
        Self::new(path)
    }
}

impl From<&String> for SourceFile {
    fn from(path: &String) -> Self {
        Self::new(path.clone())
    }
}

/// Verdict on a single source file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum Disposition {
    /// File is deployed.
    Deployed { mapping: FileMapping },

    /// File is repository plumbing.
    Structural,

    /// File matched an active ignore pattern.
    Ignored { pattern: String },

    /// File does not apply to target platform.
    Unsupported { platforms: BTreeSet<Platform> },

    /// File requires modules that are not enabled.
    Disabled { modules: BTreeSet<String> },
}

impl Disposition {
    /// Mapping of file if it is deployed.
    pub fn deployed(self) -> Option<FileMapping> {
        match self {
            Self::Deployed { mapping } => Some(mapping),
            _ => None,
        }
    }

    /// File is deployed.
    pub fn is_deployed(&self) -> bool {
        matches!(self, Self::Deployed { .. })
    }
}

/// Resolve deployed files for a configuration and platform.
///
/// Ignore patterns are resolved and compiled once per resolver.
#[derive(Debug)]
pub struct Resolver<'a> {
    config: &'a Config,
    platform: Platform,
    policy: MatchPolicy,
    ignores: IgnoreMatcher,
}

impl<'a> Resolver<'a> {
    /// Construct new resolver.
    pub fn new(
        config: &'a Config,
        ignore_text: &str,
        platform: Platform,
        policy: MatchPolicy,
    ) -> Self {
        let patterns = resolve_patterns(ignore_text, config, platform);
        debug!("{} active ignore patterns on {platform}", patterns.len());
        let ignores = IgnoreMatcher::new(patterns, policy.anchor);

        Self {
            config,
            platform,
            policy,
            ignores,
        }
    }

    /// Determine what happens to a single source file.
    pub fn disposition(&self, source: impl Into<SourceFile>) -> Disposition {
        let source = source.into();
        if is_structural(&source.path) {
            return Disposition::Structural;
        }

        let mapping = source.to_mapping();
        let subject = match self.policy.subject {
            IgnoreSubject::Target => mapping.target_path(),
            IgnoreSubject::Source => mapping.source_path.as_str(),
        };
        if let Some(pattern) = self.ignores.first_match(subject) {
            return Disposition::Ignored {
                pattern: pattern.as_str().to_string(),
            };
        }

        if !mapping.platforms.contains(&self.platform) {
            return Disposition::Unsupported {
                platforms: mapping.platforms,
            };
        }

        let disabled = mapping
            .required_modules
            .iter()
            .filter(|module| !self.config.is_enabled(module))
            .cloned()
            .collect::<BTreeSet<_>>();
        if !disabled.is_empty() {
            return Disposition::Disabled { modules: disabled };
        }

        Disposition::Deployed { mapping }
    }

    /// Resolve deployed files, keeping order of sources.
    ///
    /// Entries are not deduplicated by deploy path.
    #[instrument(skip(self, sources), fields(platform = %self.platform), level = "debug")]
    pub fn resolve(
        &self,
        sources: impl IntoIterator<Item = impl Into<SourceFile>>,
    ) -> Vec<FileMapping> {
        let deployed = sources
            .into_iter()
            .filter_map(|source| self.disposition(source).deployed())
            .collect::<Vec<_>>();
        debug!("resolved {} deployed files", deployed.len());

        deployed
    }
}

/// Resolve deployed files under deployment match policy.
pub fn resolve_deployment(
    sources: impl IntoIterator<Item = impl Into<SourceFile>>,
    config: &Config,
    ignore_text: &str,
    platform: Platform,
) -> Vec<FileMapping> {
    Resolver::new(config, ignore_text, platform, MatchPolicy::DEPLOYMENT).resolve(sources)
}
