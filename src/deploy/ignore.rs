// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Ignore file resolution.
//!
//! An ignore file is a line oriented list of glob patterns that may be wrapped
//! in template conditional blocks:
//!
//! ```text
//! # Editors
//! {{- if ne .chezmoi.os "windows" }}
//! Documents/PowerShell/**
//! {{- else }}
//! .config/shell/**
//! {{- end }}
//! ```
//!
//! Resolving an ignore file against a configuration and platform yields the flat
//! list of patterns that are active. Comments and blank lines never count as
//! patterns.

use crate::{config::Config, deploy::expr::Expr, platform::Platform};

use tracing::{debug, warn};

/// Conditional block marker on a single line.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Marker<'a> {
    If(&'a str),
    ElseIf(&'a str),
    Else,
    End,
}

impl<'a> Marker<'a> {
    fn parse(line: &'a str) -> Option<Self> {
        let inner = line.strip_prefix("{{")?;
        let inner = inner.strip_prefix('-').unwrap_or(inner);
        let inner = inner.strip_suffix("}}").unwrap_or(inner);
        let inner = inner.strip_suffix('-').unwrap_or(inner).trim();

        let (keyword, rest) = inner
            .split_once(char::is_whitespace)
            .map(|(keyword, rest)| (keyword, rest.trim()))
            .unwrap_or((inner, ""));

        match keyword {
            "if" => Some(Self::If(rest)),
            "else" => match rest.strip_prefix("if") {
                Some(condition) if condition.starts_with(char::is_whitespace) => {
                    Some(Self::ElseIf(condition.trim()))
                }
                _ => Some(Self::Else),
            },
            "end" => Some(Self::End),
            _ => None,
        }
    }
}

/// State of one open conditional block.
#[derive(Debug, Clone, Copy)]
struct Frame {
    /// Lines of the current branch are included.
    included: bool,

    /// Some branch of the block already evaluated to true.
    taken: bool,
}

/// Stack of open conditional blocks.
///
/// The root frame is always included and is never popped.
#[derive(Debug)]
struct BlockStack {
    frames: Vec<Frame>,
}

impl BlockStack {
    fn new() -> Self {
        Self {
            frames: vec![Frame {
                included: true,
                taken: true,
            }],
        }
    }

    fn is_included(&self) -> bool {
        self.frames.last().is_some_and(|frame| frame.included)
    }

    fn parent_included(&self) -> bool {
        match self.frames.len() {
            0 | 1 => true,
            len => self.frames[len - 2].included,
        }
    }

    fn has_open_block(&self) -> bool {
        self.frames.len() > 1
    }

    fn open(&mut self, condition: bool) {
        let parent = self.is_included();
        self.frames.push(Frame {
            included: parent && condition,
            taken: condition,
        });
    }

    fn branch(&mut self, condition: bool) {
        let parent = self.parent_included();
        if let Some(frame) = self.frames.last_mut() {
            frame.included = parent && !frame.taken && condition;
            frame.taken |= condition;
        }
    }

    fn close(&mut self) {
        self.frames.pop();
    }
}

/// Resolve ignore file into active glob patterns.
///
/// Patterns are returned trimmed and in the order they appear. Unbalanced
/// `else` and `end` markers are ignored.
pub fn resolve_patterns(ignore_text: &str, config: &Config, platform: Platform) -> Vec<String> {
    let mut stack = BlockStack::new();
    let mut patterns = Vec::new();

    for (index, line) in ignore_text.lines().enumerate() {
        let line = line.trim();
        match Marker::parse(line) {
            Some(Marker::If(condition)) => {
                stack.open(Expr::parse(condition).evaluate(config, platform));
            }
            Some(Marker::ElseIf(condition)) if stack.has_open_block() => {
                stack.branch(Expr::parse(condition).evaluate(config, platform));
            }
            Some(Marker::Else) if stack.has_open_block() => stack.branch(true),
            Some(Marker::End) if stack.has_open_block() => stack.close(),
            Some(marker) => warn!("unbalanced {marker:?} on ignore line {}", index + 1),
            None if line.is_empty() || line.starts_with('#') => continue,
            None if stack.is_included() => patterns.push(line.to_string()),
            None => debug!("skip inactive ignore pattern {line:?}"),
        }
    }

    if stack.has_open_block() {
        warn!("ignore file ends with unclosed conditional block");
    }

    patterns
}

/// Conditions in ignore file that fall outside the understood grammar.
///
/// Each entry pairs a one-based line number with the raw condition. These
/// conditions always count as true while resolving.
pub fn unknown_conditions(ignore_text: &str) -> Vec<(usize, &str)> {
    ignore_text
        .lines()
        .enumerate()
        .filter_map(|(index, line)| match Marker::parse(line.trim()) {
            Some(Marker::If(condition) | Marker::ElseIf(condition))
                if Expr::parse(condition).is_unknown() =>
            {
                Some((index + 1, condition))
            }
            _ => None,
        })
        .collect()
}
