//! Hook installation handler

use crate::cli::commands::InitArgs;
use crate::core::config::Config;
use crate::core::git::GitRepository;
use crate::core::hooks::{install_hook, HookKind, HookOptions, HookOutcome, SUGGEST_CONFIG_KEY};
use crate::error::Result;
use std::path::Path;

/// Handle the init command
pub fn handle_init(args: InitArgs) -> Result<()> {
    let repo = GitRepository::open_current_dir()?;
    let config = Config::load()?;
    let hooks_dir = repo.hooks_dir()?;

    let options = HookOptions {
        executable: std::env::current_exe()?,
        ai: config.llm.enabled,
        personality: Some(config.moai.personality.clone()).filter(|p| !p.trim().is_empty()),
        history: config.suggest.history,
        full_diff: config.suggest.full_diff,
    };

    println!("Installing noidea hooks in {}", hooks_dir.display());
    println!();

    for line in install_all(&hooks_dir, &options) {
        println!("{}", line);
    }

    let suggest = !args.no_suggest;
    repo.set_local_config_bool(SUGGEST_CONFIG_KEY, suggest)?;

    println!();
    if suggest {
        println!("Commit message suggestions are enabled.");
        println!("  Disable with: git config {} false", SUGGEST_CONFIG_KEY);
    } else {
        println!("Commit message suggestions are disabled.");
        println!("  Enable with: git config {} true", SUGGEST_CONFIG_KEY);
    }

    if !config.llm.enabled {
        println!();
        println!("AI feedback is off. Turn it on with:");
        println!("  noidea config set ai-enabled true");
        println!("  noidea config set api-key <your key>");
    }

    println!();
    println!("🗿 The Moai is watching your commits.");
    Ok(())
}

/// Install every hook, turning per-hook failures into warning lines
fn install_all(hooks_dir: &Path, options: &HookOptions) -> Vec<String> {
    [HookKind::PostCommit, HookKind::PrepareCommitMsg]
        .into_iter()
        .map(|kind| match install_hook(hooks_dir, kind, options) {
            Ok(outcome) => {
                let status = match outcome {
                    HookOutcome::Installed => "installed",
                    HookOutcome::Appended => "added to existing Husky hook",
                    HookOutcome::AlreadyPresent => "already present",
                };
                format!("  ✓ {} {}", kind.file_name(), status)
            }
            Err(e) => {
                tracing::warn!("Skipping {} hook: {}", kind.file_name(), e);
                format!("  Warning: skipped {}: {}", kind.file_name(), e)
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;

    fn options() -> HookOptions {
        HookOptions {
            executable: PathBuf::from("/usr/local/bin/noidea"),
            ai: false,
            personality: None,
            history: 10,
            full_diff: false,
        }
    }

    #[test]
    fn test_install_all_writes_both_hooks() {
        let dir = tempfile::tempdir().unwrap();
        let hooks = dir.path().join("hooks");
        let lines = install_all(&hooks, &options());

        assert_eq!(lines.len(), 2);
        assert!(lines.iter().all(|l| l.contains("✓")));
        assert!(hooks.join("post-commit").exists());
        assert!(hooks.join("prepare-commit-msg").exists());
    }

    #[test]
    fn test_install_all_warns_when_hooks_path_is_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let hooks = dir.path().join("hooks");
        fs::write(&hooks, "not a directory").unwrap();

        let lines = install_all(&hooks, &options());

        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("Warning: skipped post-commit"));
        assert!(lines[1].contains("Warning: skipped prepare-commit-msg"));
    }
}
