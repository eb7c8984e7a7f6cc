// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Target platforms.
//!
//! Every deployed file applies to some subset of the platforms that a dotfile
//! repository supports. Platform names follow the operating system names that
//! chezmoi exposes through `.chezmoi.os`.

use serde::{Deserialize, Serialize};
use std::{
    collections::BTreeSet,
    fmt::{Display, Formatter, Result as FmtResult},
    str::FromStr,
};

/// Operating system a dotfile can be deployed on.
#[derive(
    Default, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize,
)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum Platform {
    #[default]
    Linux,
    Darwin,
    Windows,
}

impl Platform {
    /// Every supported platform in canonical order.
    pub const ALL: [Platform; 3] = [Platform::Linux, Platform::Darwin, Platform::Windows];

    /// Unix-like platforms.
    pub const UNIX: [Platform; 2] = [Platform::Linux, Platform::Darwin];

    /// Name of platform as reported by `.chezmoi.os`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Linux => "linux",
            Self::Darwin => "darwin",
            Self::Windows => "windows",
        }
    }

    /// Check if platform goes by given name, ignoring case.
    pub fn is_named(&self, name: impl AsRef<str>) -> bool {
        name.as_ref()
            .parse::<Platform>()
            .map(|platform| platform == *self)
            .unwrap_or(false)
    }

    /// Collect platforms into an ordered set.
    pub fn set(platforms: impl IntoIterator<Item = Platform>) -> BTreeSet<Platform> {
        platforms.into_iter().collect()
    }
}

impl Display for Platform {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        fmt.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = UnknownPlatform;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name.trim().to_ascii_lowercase().as_str() {
            "linux" => Ok(Self::Linux),
            "darwin" | "macos" | "osx" => Ok(Self::Darwin),
            "windows" => Ok(Self::Windows),
            _ => Err(UnknownPlatform(name.to_string())),
        }
    }
}

impl TryFrom<String> for Platform {
    type Error = UnknownPlatform;

    fn try_from(name: String) -> Result<Self, Self::Error> {
        name.parse()
    }
}

/// Platform name is not recognized.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("unknown platform {0:?}, expected one of linux, darwin, windows")]
pub struct UnknownPlatform(pub String);
