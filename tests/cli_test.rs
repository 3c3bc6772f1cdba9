use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// Command running in an empty directory with an isolated config location
fn noidea(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("noidea").unwrap();
    cmd.current_dir(home.path())
        .env("HOME", home.path())
        .env("XDG_CONFIG_HOME", home.path().join(".config"))
        .env("NOIDEA_LLM_ENABLED", "false")
        .env_remove("NOIDEA_PROVIDER")
        .env_remove("NOIDEA_MODEL")
        .env_remove("NOIDEA_PERSONALITY")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn help_flag_shows_commands() {
    let home = TempDir::new().unwrap();
    noidea(&home)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("moai"))
        .stdout(predicate::str::contains("suggest"))
        .stdout(predicate::str::contains("github-auth"));
}

#[test]
fn version_flag_shows_version() {
    let home = TempDir::new().unwrap();
    noidea(&home)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn moai_without_ai_echoes_message() {
    let home = TempDir::new().unwrap();
    noidea(&home)
        .args(["moai", "fix", "the", "login", "bug"])
        .assert()
        .success()
        .stdout(predicate::str::contains("🗿"))
        .stdout(predicate::str::contains("fix the login bug"));
}

#[test]
fn moai_outside_repository_uses_placeholder() {
    let home = TempDir::new().unwrap();
    noidea(&home)
        .arg("moai")
        .assert()
        .success()
        .stdout(predicate::str::contains("unknown commit"));
}

#[test]
fn moai_lists_personalities() {
    let home = TempDir::new().unwrap();
    noidea(&home)
        .args(["moai", "--list-personalities"])
        .assert()
        .success()
        .stdout(predicate::str::contains("snarky_reviewer (default)"))
        .stdout(predicate::str::contains("noidea moai --ai --personality=<name>"));
}

#[test]
fn suggest_outside_repository_fails() {
    let home = TempDir::new().unwrap();
    noidea(&home)
        .arg("suggest")
        .assert()
        .failure()
        .stderr(predicate::str::contains("not a git repository"));
}

#[test]
fn config_get_shows_default_provider() {
    let home = TempDir::new().unwrap();
    noidea(&home)
        .args(["config", "get", "provider"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Provider: openai"));
}

#[test]
fn config_rejects_unknown_key() {
    let home = TempDir::new().unwrap();
    noidea(&home)
        .args(["config", "get", "colour"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown config key"));
}
