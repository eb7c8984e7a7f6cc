// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Restricted glob matching for ignore patterns.
//!
//! Ignore patterns are compiled into regular expressions as follows:
//!
//! - `**` matches any sequence, path separators included.
//! - `*` matches any sequence without path separators.
//! - `?` matches exactly one character.
//! - `[...]` is a character class, `[!...]` its negation.
//! - Everything else, dots included, matches literally.
//!
//! Compiled patterns are always anchored at the start of the candidate path.
//! Whether they are anchored at the end too depends on [`Anchor`].

use regex::Regex;
use tracing::warn;

/// Anchoring of compiled patterns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    /// Pattern must match the whole path, `^pattern$`.
    Full,

    /// Pattern must match a prefix of the path, `^pattern`.
    Start,
}

/// Compiled glob pattern.
#[derive(Debug, Clone)]
pub struct GlobPattern {
    pattern: String,
    regex: Regex,
}

impl GlobPattern {
    /// Compile glob pattern.
    ///
    /// # Errors
    ///
    /// - Return [`GlobError::Compile`] if translated pattern is not a valid
    ///   regular expression, e.g., unbalanced character class.
    pub fn compile(pattern: impl Into<String>, anchor: Anchor) -> Result<Self> {
        let pattern = pattern.into();
        let regex = Regex::new(&translate(&pattern, anchor)).map_err(|err| GlobError::Compile {
            source: err,
            pattern: pattern.clone(),
        })?;

        Ok(Self { pattern, regex })
    }

    /// Match path against pattern.
    pub fn matches(&self, path: impl AsRef<str>) -> bool {
        self.regex.is_match(path.as_ref())
    }

    /// Pattern as originally written.
    pub fn as_str(&self) -> &str {
        &self.pattern
    }
}

fn translate(pattern: &str, anchor: Anchor) -> String {
    let mut translated = String::from("^");
    let mut chars = pattern.chars().peekable();
    let mut in_class = false;

    while let Some(ch) = chars.next() {
        if in_class {
            if ch == ']' {
                in_class = false;
            }
            if ch == '\\' {
                translated.push_str("\\\\");
            } else {
                translated.push(ch);
            }
            continue;
        }

        match ch {
            '*' if chars.peek() == Some(&'*') => {
                chars.next();
                translated.push_str(".*");
            }
            '*' => translated.push_str("[^/]*"),
            '?' => translated.push('.'),
            '[' => {
                in_class = true;
                translated.push('[');
                if chars.peek() == Some(&'!') {
                    chars.next();
                    translated.push('^');
                }
            }
            ']' => translated.push_str("\\]"),
            ch => translated.push_str(&regex::escape(ch.encode_utf8(&mut [0; 4]))),
        }
    }

    if anchor == Anchor::Full {
        translated.push('$');
    }

    translated
}

/// Compile and match a single pattern.
///
/// Invalid patterns never match.
pub fn matches(path: impl AsRef<str>, pattern: impl Into<String>, anchor: Anchor) -> bool {
    match GlobPattern::compile(pattern, anchor) {
        Ok(pattern) => pattern.matches(path),
        Err(error) => {
            warn!("{error}");
            false
        }
    }
}

/// Check if any pattern matches path.
pub fn should_ignore(
    path: impl AsRef<str>,
    patterns: impl IntoIterator<Item = impl Into<String>>,
    anchor: Anchor,
) -> bool {
    IgnoreMatcher::new(patterns, anchor).should_ignore(path)
}

/// Set of precompiled ignore patterns.
///
/// Patterns that fail to compile are left out with a warning, so they
/// contribute no ignores while the rest still apply.
#[derive(Debug, Clone, Default)]
pub struct IgnoreMatcher {
    patterns: Vec<GlobPattern>,
}

impl IgnoreMatcher {
    /// Construct new ignore matcher.
    pub fn new(patterns: impl IntoIterator<Item = impl Into<String>>, anchor: Anchor) -> Self {
        let patterns = patterns
            .into_iter()
            .filter_map(|pattern| match GlobPattern::compile(pattern, anchor) {
                Ok(pattern) => Some(pattern),
                Err(error) => {
                    warn!("{error}");
                    None
                }
            })
            .collect();

        Self { patterns }
    }

    /// First pattern that matches path.
    pub fn first_match(&self, path: impl AsRef<str>) -> Option<&GlobPattern> {
        let path = path.as_ref();
        self.patterns.iter().find(|pattern| pattern.matches(path))
    }

    /// Check if any pattern matches path.
    pub fn should_ignore(&self, path: impl AsRef<str>) -> bool {
        self.first_match(path).is_some()
    }

    /// Number of usable patterns.
    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    /// No usable patterns.
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

/// Glob pattern error types.
#[derive(Debug, thiserror::Error)]
pub enum GlobError {
    /// Pattern does not translate into a valid regular expression.
    #[error("invalid ignore pattern {pattern:?}, it will never match")]
    Compile {
        #[source]
        source: regex::Error,
        pattern: String,
    },
}

/// Friendly result alias :3
pub type Result<T, E = GlobError> = std::result::Result<T, E>;
