// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Source path to deploy path mapping.
//!
//! Source files in a dotfile repository encode attributes of their target in
//! their names. Only three markers are understood here:
//!
//! - `dot_` at the start of any segment becomes a literal `.`.
//! - `executable_` at the start of the file name marks the target as
//!   executable.
//! - `.tmpl` at the end of the file name marks the source as a template.
//!
//! Mapping is one way. Feeding a deploy path back into [`map_path`] is not
//! expected to give the same path back.

use crate::platform::Platform;

use serde::Serialize;
use std::collections::BTreeSet;

const DOT_PREFIX: &str = "dot_";
const EXECUTABLE_PREFIX: &str = "executable_";
const TEMPLATE_SUFFIX: &str = ".tmpl";

/// Prefix marking a deploy path as relative to the user's home directory.
pub const HOME_PREFIX: &str = "~/";

/// Deploy path and intrinsic flags of a single source path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappedPath {
    pub deploy_path: String,
    pub is_template: bool,
    pub is_executable: bool,
}

/// Map source path to its home relative deploy path.
///
/// Markers are only stripped from the final segment, but `dot_` is replaced
/// in every segment. Any input is accepted, and empty or odd segments are
/// carried through as is.
pub fn map_path(source: impl AsRef<str>) -> MappedPath {
    let mut segments = source.as_ref().split('/').collect::<Vec<_>>();
    let mut is_template = false;
    let mut is_executable = false;

    let mut file_name = segments.pop().unwrap_or_default();
    if let Some(stripped) = file_name.strip_prefix(EXECUTABLE_PREFIX) {
        file_name = stripped;
        is_executable = true;
    }
    if let Some(stripped) = file_name.strip_suffix(TEMPLATE_SUFFIX) {
        file_name = stripped;
        is_template = true;
    }
    segments.push(file_name);

    let deploy_path = segments
        .into_iter()
        .map(undot_segment)
        .collect::<Vec<_>>()
        .join("/");

    MappedPath {
        deploy_path: format!("{HOME_PREFIX}{deploy_path}"),
        is_template,
        is_executable,
    }
}

fn undot_segment(segment: &str) -> String {
    match segment.strip_prefix(DOT_PREFIX) {
        Some(rest) => format!(".{rest}"),
        None => segment.to_string(),
    }
}

/// A source file that survived deployment resolution.
///
/// Built fresh for every resolution and never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileMapping {
    /// Repository relative path of the source file.
    pub source_path: String,

    /// Home relative destination, always starting with `~/`.
    pub deploy_path: String,

    /// Source had a `.tmpl` suffix.
    pub is_template: bool,

    /// Source had an `executable_` prefix.
    pub is_executable: bool,

    /// Modules that must be enabled for the file to be deployed.
    pub required_modules: BTreeSet<String>,

    /// Platforms the file applies to.
    pub platforms: BTreeSet<Platform>,
}

impl FileMapping {
    /// Construct new file mapping from source path and its gating metadata.
    pub fn new(
        source: impl Into<String>,
        required_modules: BTreeSet<String>,
        platforms: BTreeSet<Platform>,
    ) -> Self {
        let source_path = source.into();
        let mapped = map_path(&source_path);

        Self {
            source_path,
            deploy_path: mapped.deploy_path,
            is_template: mapped.is_template,
            is_executable: mapped.is_executable,
            required_modules,
            platforms,
        }
    }

    /// Deploy path without the leading home marker.
    pub fn target_path(&self) -> &str {
        self.deploy_path
            .strip_prefix(HOME_PREFIX)
            .unwrap_or(&self.deploy_path)
    }
}
