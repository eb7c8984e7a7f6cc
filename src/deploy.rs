// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Deployment model of a chezmoi style dotfile repository.
//!
//! Source files in a dotfile repository do not live where they end up. Their
//! names carry __attributes__ instead, e.g., `dot_` for a leading dot,
//! `executable_` for the executable bit, or a `.tmpl` suffix for templates.
//! Dotlens never deploys anything itself. It only reasons about what _would_
//! be deployed, and why, given a repository configuration and a target
//! platform.
//!
//! # Pipeline
//!
//! 1. [`mapping`] turns a source path into its deploy path.
//! 2. [`infer`] guesses which modules and platforms a file belongs to.
//! 3. [`ignore`] resolves the conditional ignore file into active patterns,
//!    evaluating conditions through [`expr`].
//! 4. [`glob`] compiles those patterns into matchers.
//! 5. [`resolve`] filters source files into the deployed set.
//! 6. [`simulate`] diffs two deployed sets after toggling modules.
//!
//! # See Also
//!
//! 1. [chezmoi - Source state attributes](https://www.chezmoi.io/reference/source-state-attributes/)

pub mod expr;
pub mod glob;
pub mod ignore;
pub mod infer;
pub mod mapping;
pub mod resolve;
pub mod simulate;

pub use expr::{evaluate, Expr};
pub use glob::{Anchor, GlobError, GlobPattern, IgnoreMatcher};
pub use ignore::{resolve_patterns, unknown_conditions};
pub use mapping::{map_path, FileMapping, MappedPath};
pub use resolve::{resolve_deployment, Disposition, MatchPolicy, Resolver, SourceFile};
pub use simulate::{simulate, SimulationRequest, SimulationResult};
