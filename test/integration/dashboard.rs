// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

use crate::{MemoryProvider, CONFIG, IGNORE};

use dotlens::{
    config::ConfigError,
    dashboard::{Dashboard, DashboardError, SourceLayout},
    deploy::{Disposition, FileMapping, SimulationRequest},
    platform::Platform,
    provider::ProviderError,
};

use anyhow::Result;
use indexmap::IndexMap;
use pretty_assertions::assert_eq;
use std::collections::BTreeSet;

fn dashboard(provider: MemoryProvider) -> Dashboard<MemoryProvider> {
    Dashboard::new(provider, SourceLayout::default())
}

fn deploy_paths(mappings: &[FileMapping]) -> Vec<&str> {
    mappings
        .iter()
        .map(|mapping| mapping.deploy_path.as_str())
        .collect()
}

fn request(platform: Platform, modules: &[(&str, bool)]) -> SimulationRequest {
    SimulationRequest {
        platform,
        modules: modules
            .iter()
            .map(|(name, enabled)| (name.to_string(), *enabled))
            .collect::<IndexMap<_, _>>(),
    }
}

#[tokio::test]
async fn deployment_per_platform() -> Result<()> {
    let dashboard = dashboard(MemoryProvider::dotfiles());

    let result = dashboard.deployment(Platform::Linux).await?;
    assert_eq!(
        deploy_paths(&result.files),
        vec!["~/bin/backup", "~/.bashrc", "~/.config/Code/User/settings.json"]
    );
    assert_eq!(result.total, 3);
    assert!(result.files[0].is_executable);

    let result = dashboard.deployment(Platform::Windows).await?;
    assert_eq!(
        deploy_paths(&result.files),
        vec![
            "~/Documents/PowerShell/Microsoft.PowerShell_profile.ps1",
            "~/.config/Code/User/settings.json"
        ]
    );

    Ok(())
}

#[tokio::test]
async fn simulate_enabling_and_disabling_modules() -> Result<()> {
    let dashboard = dashboard(MemoryProvider::dotfiles());

    let result = dashboard
        .simulate(request(Platform::Linux, &[("git", true), ("smart_search", true)]))
        .await?;
    assert_eq!(
        deploy_paths(&result.added),
        vec!["~/.config/shell/smart_search.zsh", "~/.gitconfig"]
    );
    assert_eq!(result.removed, vec![]);
    assert_eq!((result.total_before, result.total_after), (3, 5));
    assert!(result.added[1].is_template);

    let result = dashboard
        .simulate(request(Platform::Linux, &[("vscode", false)]))
        .await?;
    assert_eq!(result.added, vec![]);
    assert_eq!(
        deploy_paths(&result.removed),
        vec!["~/.config/Code/User/settings.json"]
    );
    assert_eq!((result.total_before, result.total_after), (3, 2));

    Ok(())
}

#[tokio::test]
async fn source_tree_explains_every_file() -> Result<()> {
    let dashboard = dashboard(MemoryProvider::dotfiles());
    let tree = dashboard.source_tree(Platform::Linux).await?;
    assert_eq!(tree.entries.len(), 9);

    let lookup = |path: &str| {
        tree.entries
            .iter()
            .find(|entry| entry.source_path == path)
            .map(|entry| entry.disposition.clone())
    };
    assert_eq!(lookup(".chezmoi.yaml"), Some(Disposition::Structural));
    assert_eq!(
        lookup("Documents/PowerShell/Microsoft.PowerShell_profile.ps1"),
        Some(Disposition::Ignored {
            pattern: "Documents/**".into()
        })
    );
    assert_eq!(
        lookup("dot_gitconfig.tmpl"),
        Some(Disposition::Disabled {
            modules: BTreeSet::from(["git".to_string()])
        })
    );
    assert!(lookup("dot_bashrc").is_some_and(|disposition| disposition.is_deployed()));

    let tree = dashboard.source_tree(Platform::Windows).await?;
    let result = tree
        .entries
        .iter()
        .find(|entry| entry.source_path == "dot_bashrc")
        .map(|entry| &entry.disposition);
    assert_eq!(
        result,
        Some(&Disposition::Unsupported {
            platforms: Platform::set(Platform::UNIX)
        })
    );

    Ok(())
}

#[tokio::test]
async fn overview_lists_configured_and_missing_modules() -> Result<()> {
    let result = dashboard(MemoryProvider::dotfiles()).overview().await?;
    assert_eq!(result.git_user.name, "John Doe");
    assert_eq!(result.platform, Some(Platform::Linux));
    assert_eq!(result.modules.len(), 7);
    assert!(result.modules.iter().all(|module| module.configured));
    assert!(result.warnings.is_empty());

    let config = "data:\n  modules:\n    shell:\n      enabled: true\n    emacs: {}\n";
    let provider = MemoryProvider::new()
        .with_file(".chezmoi.yaml", config)
        .with_file(".chezmoiignore", "");
    let result = dashboard(provider).overview().await?;

    let names = result
        .modules
        .iter()
        .map(|module| module.name.as_str())
        .collect::<Vec<_>>();
    assert_eq!(
        names,
        vec!["shell", "emacs", "git", "vscode", "powershell", "start_menu", "smart_search", "ssh"]
    );
    assert!(result.modules[1].configured && !result.modules[1].enabled);
    assert!(!result.modules[2].configured);
    assert_eq!(result.warnings.len(), 9);

    Ok(())
}

#[tokio::test]
async fn unknown_config_platform_only_warns() -> Result<()> {
    let config = "data:\n  platform: wsl\n  modules:\n    shell:\n      enabled: true\n";
    let provider = MemoryProvider::new()
        .with_file(".chezmoi.yaml", config)
        .with_file(".chezmoiignore", "")
        .with_file("dot_bashrc", "blah");
    let dashboard = dashboard(provider);

    let result = dashboard.overview().await?;
    assert_eq!(result.platform, None);
    assert!(result.warnings.iter().any(|warning| warning.contains("\"wsl\"")));

    let result = dashboard.deployment(Platform::Linux).await?;
    assert_eq!(deploy_paths(&result.files), vec!["~/.bashrc"]);

    Ok(())
}

#[tokio::test]
async fn snapshot_strips_source_root() -> Result<()> {
    let provider = MemoryProvider::new()
        .with_file("README.md", "blah")
        .with_file("install.sh", "blah")
        .with_file("home/.chezmoi.yaml", CONFIG)
        .with_file("home/.chezmoiignore", IGNORE)
        .with_file("home/dot_bashrc", "blah");
    let layout = SourceLayout {
        root: "home".into(),
        ..Default::default()
    };
    let dashboard = Dashboard::new(provider, layout);

    let snapshot = dashboard.snapshot().await?;
    assert_eq!(
        snapshot.sources,
        vec![".chezmoi.yaml", ".chezmoiignore", "dot_bashrc"]
    );

    let result = dashboard.deployment(Platform::Darwin).await?;
    assert_eq!(deploy_paths(&result.files), vec!["~/.bashrc"]);

    Ok(())
}

#[tokio::test]
async fn fetch_and_config_failures_abort() {
    let provider = MemoryProvider::new().with_file(".chezmoi.yaml", CONFIG);
    let result = dashboard(provider).deployment(Platform::Linux).await;
    assert!(matches!(
        result,
        Err(DashboardError::Fetch(ProviderError::NotFound(path))) if path == ".chezmoiignore"
    ));

    let provider = MemoryProvider::new()
        .with_file(".chezmoi.yaml", "data: []\n")
        .with_file(".chezmoiignore", IGNORE);
    let result = dashboard(provider).deployment(Platform::Linux).await;
    assert!(matches!(
        result,
        Err(DashboardError::Config(ConfigError::Shape("data")))
    ));
}
