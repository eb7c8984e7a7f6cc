// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Module toggle simulation.
//!
//! Show what would change if some modules were switched on or off, without
//! touching the configuration itself. Nothing about a simulation is kept
//! around after it returns.

use crate::{
    config::Config,
    deploy::{
        mapping::FileMapping,
        resolve::{MatchPolicy, Resolver, SourceFile},
    },
    platform::Platform,
};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{info, instrument};

/// Modules to toggle on a target platform.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SimulationRequest {
    /// Platform to resolve deployment on.
    pub platform: Platform,

    /// Desired `enabled` state keyed by module name. Only changed modules need
    /// to be listed.
    pub modules: IndexMap<String, bool>,
}

/// Deployment difference caused by a simulation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationResult {
    /// Request that produced this result.
    pub request: SimulationRequest,

    /// Files deployed only under simulated configuration.
    pub added: Vec<FileMapping>,

    /// Files deployed only under base configuration.
    pub removed: Vec<FileMapping>,

    /// Number of files deployed under base configuration.
    pub total_before: usize,

    /// Number of files deployed under simulated configuration.
    pub total_after: usize,
}

/// Simulate toggling modules against a base configuration.
///
/// Files are compared by deploy path. Totals count resolved files as is,
/// duplicates included.
#[instrument(skip(sources, base, ignore_text), fields(platform = %request.platform), level = "debug")]
pub fn simulate<S>(
    sources: impl IntoIterator<Item = S>,
    base: &Config,
    ignore_text: &str,
    request: SimulationRequest,
) -> SimulationResult
where
    S: Into<SourceFile>,
{
    let sources = sources.into_iter().map(Into::into).collect::<Vec<SourceFile>>();
    let simulated = base.with_module_overrides(&request.modules);

    let before = resolve(&sources, base, ignore_text, request.platform);
    let after = resolve(&sources, &simulated, ignore_text, request.platform);

    let result = SimulationResult {
        added: difference(&after, &before),
        removed: difference(&before, &after),
        total_before: before.len(),
        total_after: after.len(),
        request,
    };
    info!(
        "simulation adds {} and removes {} files",
        result.added.len(),
        result.removed.len()
    );

    result
}

fn resolve(
    sources: &[SourceFile],
    config: &Config,
    ignore_text: &str,
    platform: Platform,
) -> Vec<FileMapping> {
    Resolver::new(config, ignore_text, platform, MatchPolicy::DEPLOYMENT)
        .resolve(sources.iter().cloned())
}

/// Entries of `from` whose deploy path is absent in `other`.
fn difference(from: &[FileMapping], other: &[FileMapping]) -> Vec<FileMapping> {
    let other = other
        .iter()
        .map(|mapping| mapping.deploy_path.as_str())
        .collect::<HashSet<_>>();

    from.iter()
        .filter(|mapping| !other.contains(mapping.deploy_path.as_str()))
        .cloned()
        .collect()
}
