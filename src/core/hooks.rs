//! Git hook installation
//!
//! Writes POSIX shell hooks that call back into noidea:
//! - `post-commit` runs `noidea moai` on the new commit
//! - `prepare-commit-msg` runs `noidea suggest --file` when suggestions are enabled
//!
//! Husky-managed directories keep their existing scripts; the noidea block is
//! appended once. Every script exits 0 so a failing command never blocks git.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{NoideaError, Result};

/// Git config key toggling the prepare-commit-msg suggestion
pub const SUGGEST_CONFIG_KEY: &str = "noidea.suggest";

/// Which hook to install
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookKind {
    PostCommit,
    PrepareCommitMsg,
}

impl HookKind {
    pub fn file_name(&self) -> &'static str {
        match self {
            HookKind::PostCommit => "post-commit",
            HookKind::PrepareCommitMsg => "prepare-commit-msg",
        }
    }

    /// Comment line identifying the noidea block inside a script
    fn marker(&self) -> String {
        format!("# noidea - {} hook", self.file_name())
    }
}

/// Values baked into the generated scripts
#[derive(Debug, Clone)]
pub struct HookOptions {
    /// Absolute path of the noidea binary
    pub executable: PathBuf,
    /// Pass `--ai` to moai
    pub ai: bool,
    pub personality: Option<String>,
    /// Commit messages sent as suggestion context
    pub history: usize,
    pub full_diff: bool,
}

/// What happened to a hook file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookOutcome {
    Installed,
    /// Block appended to an existing Husky script
    Appended,
    AlreadyPresent,
}

/// Install one hook into `hooks_dir`
pub fn install_hook(hooks_dir: &Path, kind: HookKind, options: &HookOptions) -> Result<HookOutcome> {
    fs::create_dir_all(hooks_dir)
        .map_err(|e| NoideaError::Hook(format!("{}: {}", hooks_dir.display(), e)))?;

    let path = hooks_dir.join(kind.file_name());
    let block = hook_block(kind, options);

    let outcome = if is_husky_dir(hooks_dir) {
        match fs::read_to_string(&path) {
            Ok(existing) if existing.contains(&kind.marker()) => {
                return Ok(HookOutcome::AlreadyPresent);
            }
            Ok(existing) => {
                let mut updated = existing;
                if !updated.ends_with('\n') {
                    updated.push('\n');
                }
                updated.push('\n');
                updated.push_str(&block);
                write_script(&path, &updated)?;
                HookOutcome::Appended
            }
            Err(_) => {
                let script = format!(
                    "#!/usr/bin/env sh\n. \"$(dirname \"$0\")/_/husky.sh\"\n\n{}",
                    block
                );
                write_script(&path, &script)?;
                HookOutcome::Installed
            }
        }
    } else {
        let script = format!("#!/bin/sh\n#\n{}\nexit 0\n", block);
        write_script(&path, &script)?;
        HookOutcome::Installed
    };

    tracing::debug!("{} hook at {}: {:?}", kind.file_name(), path.display(), outcome);
    Ok(outcome)
}

/// Whether `dir` looks like a Husky hooks directory
pub fn is_husky_dir(dir: &Path) -> bool {
    dir.file_name().is_some_and(|n| n == ".husky") || dir.join("_").join("husky.sh").exists()
}

fn hook_block(kind: HookKind, options: &HookOptions) -> String {
    let exe = shell_quote(&options.executable.to_string_lossy());
    match kind {
        HookKind::PostCommit => {
            let mut flags = String::new();
            if options.ai {
                flags.push_str(" --ai");
            }
            if let Some(personality) = options.personality.as_deref().filter(|p| !p.is_empty()) {
                flags.push_str(&format!(" --personality {}", shell_quote(personality)));
            }
            format!(
                "{marker}\n\
                 # Shows a moai with feedback on the commit that was just made.\n\
                 {exe} moai{flags} || true\n",
                marker = kind.marker(),
                exe = exe,
                flags = flags
            )
        }
        HookKind::PrepareCommitMsg => {
            let diff_flag = if options.full_diff { " --full-diff" } else { "" };
            format!(
                "{marker}\n\
                 # Disable with: git config {key} false\n\
                 COMMIT_MSG_FILE=\"$1\"\n\
                 COMMIT_SOURCE=\"$2\"\n\
                 \n\
                 if [ \"$(git config --get {key})\" = \"true\" ] && [ -z \"$COMMIT_SOURCE\" ]; then\n\
                 \x20   if ! grep -v '^#' \"$COMMIT_MSG_FILE\" 2>/dev/null | grep -q '[^[:space:]]'; then\n\
                 \x20       {exe} suggest --history {history}{diff_flag} --quiet --file \"$COMMIT_MSG_FILE\" || true\n\
                 \x20   fi\n\
                 fi\n",
                marker = kind.marker(),
                key = SUGGEST_CONFIG_KEY,
                exe = exe,
                history = options.history,
                diff_flag = diff_flag
            )
        }
    }
}

fn write_script(path: &Path, content: &str) -> Result<()> {
    fs::write(path, content).map_err(|e| NoideaError::Hook(format!("{}: {}", path.display(), e)))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mut perms = fs::metadata(path)?.permissions();
        perms.set_mode(0o755);
        fs::set_permissions(path, perms)?;
    }

    Ok(())
}

/// Single-quote a value for POSIX sh
fn shell_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', r"'\''"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options() -> HookOptions {
        HookOptions {
            executable: PathBuf::from("/usr/local/bin/noidea"),
            ai: true,
            personality: Some("git_expert".to_string()),
            history: 10,
            full_diff: false,
        }
    }

    #[test]
    fn test_standard_post_commit_hook() {
        let dir = tempfile::tempdir().unwrap();
        let outcome = install_hook(dir.path(), HookKind::PostCommit, &options()).unwrap();
        assert_eq!(outcome, HookOutcome::Installed);

        let script = fs::read_to_string(dir.path().join("post-commit")).unwrap();
        assert!(script.starts_with("#!/bin/sh"));
        assert!(script.contains("'/usr/local/bin/noidea' moai --ai --personality 'git_expert'"));
        assert!(script.trim_end().ends_with("exit 0"));

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = fs::metadata(dir.path().join("post-commit"))
                .unwrap()
                .permissions()
                .mode();
            assert_eq!(mode & 0o777, 0o755);
        }
    }

    #[test]
    fn test_prepare_commit_msg_hook() {
        let dir = tempfile::tempdir().unwrap();
        let mut opts = options();
        opts.full_diff = true;
        install_hook(dir.path(), HookKind::PrepareCommitMsg, &opts).unwrap();

        let script = fs::read_to_string(dir.path().join("prepare-commit-msg")).unwrap();
        assert!(script.contains("git config --get noidea.suggest"));
        assert!(script.contains("suggest --history 10 --full-diff --quiet --file \"$COMMIT_MSG_FILE\""));
        assert!(script.trim_end().ends_with("exit 0"));
    }

    #[test]
    fn test_standard_hook_reinstall_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        install_hook(dir.path(), HookKind::PostCommit, &options()).unwrap();
        let mut opts = options();
        opts.ai = false;
        install_hook(dir.path(), HookKind::PostCommit, &opts).unwrap();

        let script = fs::read_to_string(dir.path().join("post-commit")).unwrap();
        assert_eq!(script.matches("# noidea - post-commit hook").count(), 1);
        assert!(!script.contains("--ai"));
    }

    #[test]
    fn test_husky_new_hook() {
        let root = tempfile::tempdir().unwrap();
        let husky = root.path().join(".husky");
        assert!(is_husky_dir(&husky));

        let outcome = install_hook(&husky, HookKind::PostCommit, &options()).unwrap();
        assert_eq!(outcome, HookOutcome::Installed);
        let script = fs::read_to_string(husky.join("post-commit")).unwrap();
        assert!(script.contains("_/husky.sh"));
        assert!(script.contains("moai"));
    }

    #[test]
    fn test_husky_append_is_idempotent() {
        let root = tempfile::tempdir().unwrap();
        let husky = root.path().join(".husky");
        fs::create_dir_all(&husky).unwrap();
        fs::write(husky.join("prepare-commit-msg"), "#!/usr/bin/env sh\nnpx lint-staged").unwrap();

        let first = install_hook(&husky, HookKind::PrepareCommitMsg, &options()).unwrap();
        let second = install_hook(&husky, HookKind::PrepareCommitMsg, &options()).unwrap();
        assert_eq!(first, HookOutcome::Appended);
        assert_eq!(second, HookOutcome::AlreadyPresent);

        let script = fs::read_to_string(husky.join("prepare-commit-msg")).unwrap();
        assert!(script.starts_with("#!/usr/bin/env sh\nnpx lint-staged\n"));
        assert_eq!(script.matches("# noidea - prepare-commit-msg hook").count(), 1);
    }

    #[test]
    fn test_shell_quote() {
        assert_eq!(shell_quote("/a b/noidea"), "'/a b/noidea'");
        assert_eq!(shell_quote("it's"), r"'it'\''s'");
    }
}
