// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Dashboard for chezmoi style dotfile repositories.
//!
//! Dotlens reads a dotfile repository, either through the GitHub REST API or
//! straight from a local Git repository, and answers two questions about it:
//!
//! 1. Which files get deployed to a given platform with the modules that the
//!    repository configuration currently enables?
//! 2. What would change if some of those modules were toggled?
//!
//! Nothing is ever written back. The repository is only read.

pub mod catalog;
pub mod config;
pub mod dashboard;
pub mod deploy;
pub mod path;
pub mod platform;
pub mod provider;
pub mod server;
pub mod settings;

pub use config::Config;
pub use dashboard::{Dashboard, SourceLayout};
pub use platform::Platform;
pub use provider::{AnyProvider, RepositoryProvider};
pub use settings::Settings;
