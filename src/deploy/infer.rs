// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Module and platform inference from source paths.
//!
//! Fallback heuristics for source files that come without explicit gating
//! metadata. Rules are plain substring tests against the source path.

use crate::platform::Platform;

use std::collections::BTreeSet;

/// Path fragments that tie a source file to a module.
///
/// Every rule that matches contributes its module.
const MODULE_RULES: &[(&[&str], &str)] = &[
    (&["shell/", "dot_bashrc", "dot_zshrc"], "shell"),
    (&["Code/User/"], "vscode"),
    (&["PowerShell/"], "powershell"),
    (&["start_menu"], "start_menu"),
    (&["gitconfig"], "git"),
    (&["smart-search", "smart_search"], "smart_search"),
];

/// Path fragments that restrict a source file to some platforms.
///
/// First matching rule wins.
const PLATFORM_RULES: &[(&[&str], &[Platform])] = &[
    (&["PowerShell/"], &[Platform::Windows]),
    (&["dot_bashrc", "dot_zshrc"], &Platform::UNIX),
    (&["bin/executable_", "scripts/"], &Platform::UNIX),
];

/// Infer names of modules a source file depends on.
pub fn infer_modules(source: impl AsRef<str>) -> BTreeSet<String> {
    let source = source.as_ref();
    MODULE_RULES
        .iter()
        .filter(|(fragments, _)| fragments.iter().any(|fragment| source.contains(fragment)))
        .map(|(_, module)| (*module).to_string())
        .collect()
}

/// Infer platforms a source file supports.
pub fn infer_platforms(source: impl AsRef<str>) -> BTreeSet<Platform> {
    let source = source.as_ref();
    let platforms = PLATFORM_RULES
        .iter()
        .find(|(fragments, _)| fragments.iter().any(|fragment| source.contains(fragment)))
        .map(|(_, platforms)| *platforms)
        .unwrap_or(&Platform::ALL);

    Platform::set(platforms.iter().copied())
}
