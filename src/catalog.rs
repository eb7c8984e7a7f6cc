// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Catalog of well known modules.
//!
//! Metadata for modules that a dotfile repository is recommended to carry.
//! The catalog exists for display purposes. Deployment never consults it, so
//! module names outside the catalog work just as well, and dependencies listed
//! here are never enforced.

use crate::platform::Platform;

use serde::Serialize;

/// Display metadata of a known module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ModuleInfo {
    pub name: &'static str,
    pub description: &'static str,
    pub category: Category,
    pub dependencies: &'static [&'static str],
    pub platforms: &'static [Platform],
}

/// Grouping used to lay out modules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Core,
    Shell,
    Editor,
    Desktop,
    Tooling,
}

/// Modules every configuration is expected to list.
pub const KNOWN_MODULES: &[ModuleInfo] = &[
    ModuleInfo {
        name: "shell",
        description: "Bash and Zsh startup files, aliases and prompt",
        category: Category::Shell,
        dependencies: &[],
        platforms: &Platform::UNIX,
    },
    ModuleInfo {
        name: "git",
        description: "Global git configuration and ignore rules",
        category: Category::Core,
        dependencies: &[],
        platforms: &Platform::ALL,
    },
    ModuleInfo {
        name: "vscode",
        description: "Visual Studio Code user settings and keybindings",
        category: Category::Editor,
        dependencies: &[],
        platforms: &Platform::ALL,
    },
    ModuleInfo {
        name: "powershell",
        description: "PowerShell profile and modules",
        category: Category::Shell,
        dependencies: &[],
        platforms: &[Platform::Windows],
    },
    ModuleInfo {
        name: "start_menu",
        description: "Start menu shortcuts",
        category: Category::Desktop,
        dependencies: &[],
        platforms: &[Platform::Windows],
    },
    ModuleInfo {
        name: "smart_search",
        description: "Fuzzy file and history search helpers",
        category: Category::Tooling,
        dependencies: &["shell"],
        platforms: &Platform::UNIX,
    },
    ModuleInfo {
        name: "ssh",
        description: "SSH client configuration",
        category: Category::Core,
        dependencies: &[],
        platforms: &Platform::ALL,
    },
];

/// Lookup metadata of known module.
pub fn lookup(name: impl AsRef<str>) -> Option<&'static ModuleInfo> {
    KNOWN_MODULES
        .iter()
        .find(|module| module.name == name.as_ref())
}
