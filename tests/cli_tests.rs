use std::process::Command;

fn keeper() -> Command {
    Command::new(env!("CARGO_BIN_EXE_helios-cron-keeper"))
}

#[test]
fn test_cli_help() {
    let output = keeper()
        .arg("--help")
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success());

    let help_text = String::from_utf8_lossy(&output.stdout);
    assert!(help_text.contains("create-cron"));
    assert!(help_text.contains("deploy"));

    println!("✅ CLI help command works correctly");
}

#[test]
fn test_cli_invalid_command() {
    let output = keeper()
        .arg("invalid-command")
        .output()
        .expect("Failed to execute command");

    assert!(!output.status.success());

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("error"));

    println!("✅ CLI correctly rejects invalid commands");
}

#[test]
fn test_cli_rejects_conflicting_artifact_sources() {
    let output = keeper()
        .args(["deploy", "--artifact", "a.json", "--solc-source", "a.sol"])
        .output()
        .expect("Failed to execute command");

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("cannot be used with"));
}

#[test]
fn test_cli_missing_config_fails_with_hint() {
    let output = keeper()
        .args(["--config", "configs/does_not_exist.toml", "create-cron", "--dry-run"])
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute command");

    assert_eq!(output.status.code(), Some(1));
    // Failures are reported through the log output
    let combined = format!(
        "{}{}",
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    );
    assert!(combined.contains("does_not_exist.toml"));
}
