// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

use crate::{RepoFixture, RepoKind, CONFIG, IGNORE};

use dotlens::{
    dashboard::{Dashboard, SourceLayout},
    platform::Platform,
    provider::{AnyProvider, LocalProvider, ProviderError, RepositoryProvider},
    settings::{LocalSettings, RepositorySettings},
};

use anyhow::Result;
use pretty_assertions::assert_eq;
use tempfile::TempDir;

#[tokio::test]
async fn list_committed_files() -> Result<()> {
    let dir = TempDir::new()?;
    let fixture = RepoFixture::new(dir.path(), RepoKind::Bare)?;
    fixture.stage_and_commit("dot_bashrc", "blah")?;
    fixture.stage_and_commit("dot_config/git/dot_gitconfig", "blah")?;
    fixture.stage_and_commit("README.md", "blah")?;

    let provider = LocalProvider::new(dir.path(), None);
    let result = provider.list_files().await?;
    assert_eq!(
        result,
        vec!["README.md", "dot_bashrc", "dot_config/git/dot_gitconfig"]
    );

    Ok(())
}

#[tokio::test]
async fn read_committed_file() -> Result<()> {
    let dir = TempDir::new()?;
    let fixture = RepoFixture::new(dir.path(), RepoKind::Normal)?;
    fixture.stage_and_commit("dot_config/git/dot_gitconfig", "[user]\n")?;

    let provider = LocalProvider::new(dir.path(), None);
    assert_eq!(
        provider.read_file("dot_config/git/dot_gitconfig").await?,
        "[user]\n"
    );
    assert!(matches!(
        provider.read_file("dot_vimrc").await,
        Err(ProviderError::NotFound(path)) if path == "dot_vimrc"
    ));
    assert!(matches!(
        provider.read_file("dot_config/git").await,
        Err(ProviderError::NotFound(_))
    ));

    Ok(())
}

#[tokio::test]
async fn read_from_older_revision() -> Result<()> {
    let dir = TempDir::new()?;
    let fixture = RepoFixture::new(dir.path(), RepoKind::Bare)?;
    let first = fixture.stage_and_commit("dot_bashrc", "first")?;
    fixture.stage_and_commit("dot_bashrc", "second")?;
    fixture.stage_and_commit("dot_zshrc", "blah")?;

    let provider = LocalProvider::new(dir.path(), Some(first.to_string()));
    assert_eq!(provider.read_file("dot_bashrc").await?, "first");
    assert_eq!(provider.list_files().await?, vec!["dot_bashrc"]);

    let provider = LocalProvider::new(dir.path(), None);
    assert_eq!(provider.read_file("dot_bashrc").await?, "second");

    Ok(())
}

#[tokio::test]
async fn missing_repository_fails() {
    let provider = LocalProvider::new("/definitely/not/a/repo", None);
    assert!(matches!(
        provider.list_files().await,
        Err(ProviderError::Git2(_))
    ));
}

#[tokio::test]
async fn dashboard_over_local_repository() -> Result<()> {
    let dir = TempDir::new()?;
    let fixture = RepoFixture::new(dir.path(), RepoKind::Bare)?;
    fixture.stage_and_commit(".chezmoi.yaml", CONFIG)?;
    fixture.stage_and_commit(".chezmoiignore", IGNORE)?;
    fixture.stage_and_commit("dot_bashrc", "blah")?;
    fixture.stage_and_commit("Documents/PowerShell/profile.ps1", "blah")?;

    let settings = RepositorySettings::Local(LocalSettings {
        path: dir.path().to_path_buf(),
        reference: None,
    });
    let provider = AnyProvider::from_settings(&settings)?;
    let dashboard = Dashboard::new(provider, SourceLayout::default());

    let result = dashboard.deployment(Platform::Linux).await?;
    let paths = result
        .files
        .iter()
        .map(|mapping| mapping.deploy_path.as_str())
        .collect::<Vec<_>>();
    assert_eq!(paths, vec!["~/.bashrc"]);

    let result = dashboard.deployment(Platform::Windows).await?;
    assert_eq!(result.total, 1);
    assert_eq!(result.files[0].deploy_path, "~/Documents/PowerShell/profile.ps1");

    Ok(())
}
