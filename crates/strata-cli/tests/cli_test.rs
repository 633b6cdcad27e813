use std::{fs, process::Command};

use tempfile::tempdir;

fn prerender() -> Command {
    Command::new(env!("CARGO_BIN_EXE_prerender"))
}

#[test]
fn cli_reports_failure_on_stderr_with_logging_off() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let config = temp_dir.path().join("config.toml");
    fs::write(&config, "").unwrap();

    let output = prerender()
        .current_dir(temp_dir.path())
        .arg("missing.d2")
        .arg("-c")
        .arg(&config)
        .args(["--log-level", "off"])
        .output()
        .expect("Failed to run prerender");

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("missing.d2"),
        "stderr should name the input, got: {stderr}"
    );
    assert!(!temp_dir.path().join("missing.html").exists());
}

#[test]
fn cli_reports_config_failure_on_stderr() {
    let temp_dir = tempdir().unwrap();
    fs::write(temp_dir.path().join("diagram.d2"), "a -> b").unwrap();

    let output = prerender()
        .current_dir(temp_dir.path())
        .arg("diagram.d2")
        .args(["-c", "absent.toml", "--log-level", "off"])
        .output()
        .expect("Failed to run prerender");

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("absent.toml"), "got: {stderr}");
}
