// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Local Git repository provider.
//!
//! Reads committed contents straight out of the object database, so bare
//! repositories work just as well as normal ones, and uncommitted changes in a
//! working tree are never seen.

use crate::provider::{ProviderError, RepositoryProvider, Result};

use git2::{ErrorCode, ObjectType, Repository, Tree};
use std::{
    collections::VecDeque,
    path::{Path, PathBuf},
};
use tokio::task::spawn_blocking;
use tracing::{debug, instrument};

/// Read repository contents from local Git repository.
///
/// Repository is reopened on every call. [`Repository`] is not [`Sync`], and
/// reopening keeps each call on a fresh view of the references.
#[derive(Debug, Clone)]
pub struct LocalProvider {
    path: PathBuf,
    reference: String,
}

impl LocalProvider {
    /// Construct new local provider.
    ///
    /// Reads from `HEAD` if no reference is given.
    pub fn new(path: impl Into<PathBuf>, reference: Option<String>) -> Self {
        Self {
            path: path.into(),
            reference: reference.unwrap_or_else(|| "HEAD".into()),
        }
    }
}

impl RepositoryProvider for LocalProvider {
    #[instrument(skip(self), fields(repo = %self.path.display()), level = "debug")]
    async fn read_file(&self, path: &str) -> Result<String> {
        let repo_path = self.path.clone();
        let reference = self.reference.clone();
        let path = path.to_string();

        spawn_blocking(move || {
            let repo = Repository::open(&repo_path)?;
            let tree = peel_tree(&repo, &reference)?;
            let entry = match tree.get_path(Path::new(&path)) {
                Ok(entry) => entry,
                Err(error) if error.code() == ErrorCode::NotFound => {
                    return Err(ProviderError::NotFound(path));
                }
                Err(error) => return Err(error.into()),
            };

            let blob = entry
                .to_object(&repo)?
                .into_blob()
                .map_err(|_| ProviderError::NotFound(path.clone()))?;
            debug!("read {} bytes", blob.size());

            String::from_utf8(blob.content().to_vec()).map_err(|_| ProviderError::NotText(path))
        })
        .await?
    }

    #[instrument(skip(self), fields(repo = %self.path.display()), level = "debug")]
    async fn list_files(&self) -> Result<Vec<String>> {
        let repo_path = self.path.clone();
        let reference = self.reference.clone();

        spawn_blocking(move || {
            let repo = Repository::open(&repo_path)?;
            let tree = peel_tree(&repo, &reference)?;
            let files = list_file_paths(&repo, tree)?;
            debug!("listed {} files", files.len());

            Ok(files)
        })
        .await?
    }
}

fn peel_tree<'repo>(repo: &'repo Repository, reference: &str) -> Result<Tree<'repo>> {
    Ok(repo.revparse_single(reference)?.peel_to_tree()?)
}

// Thank you Eric at https://www.hydrogen18.com/blog/list-all-files-git-repo-pygit2.html.
fn list_file_paths(repo: &Repository, tree: Tree<'_>) -> Result<Vec<String>> {
    let mut entries = Vec::new();
    let mut trees_and_paths = VecDeque::new();
    trees_and_paths.push_front((tree, String::new()));

    // Use DFS to traverse commit tree.
    while let Some((tree, prefix)) = trees_and_paths.pop_front() {
        for tree_entry in &tree {
            let full_path = format!("{prefix}{}", String::from_utf8_lossy(tree_entry.name_bytes()));
            match tree_entry.kind() {
                // INVARIANT: Hit a tree? Traverse it!
                Some(ObjectType::Tree) => {
                    let next_tree = repo.find_tree(tree_entry.id())?;
                    trees_and_paths.push_front((next_tree, format!("{full_path}/")));
                }
                // INVARIANT: Hit a blob? Record our current path!
                Some(ObjectType::Blob) => entries.push(full_path),
                _ => continue,
            }
        }
    }

    entries.sort();
    Ok(entries)
}
