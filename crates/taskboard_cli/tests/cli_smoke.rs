use std::process::Command;

#[test]
fn cli_smoke_help() {
    let exe = env!("CARGO_BIN_EXE_taskboard");
    let output = Command::new(exe)
        .arg("--help")
        .output()
        .expect("failed to run taskboard --help");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Usage"));
    assert!(stdout.contains("complete"));
}

fn temp_dir(name: &str) -> std::path::PathBuf {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    std::env::temp_dir().join(format!("taskboard-{nanos}-{name}"))
}

fn run_in(store_dir: &std::path::Path, args: &[&str], log: Option<&str>) -> std::process::Output {
    let mut command = Command::new(env!("CARGO_BIN_EXE_taskboard"));
    command
        .args(args)
        .env("TASKBOARD_STORE_DIR", store_dir)
        .env("TASKBOARD_CONFIG_PATH", store_dir.join("config.json"))
        .env_remove("TASKBOARD_LOG");
    if let Some(directives) = log {
        command.env("TASKBOARD_LOG", directives);
    }
    command.output().expect("failed to run taskboard")
}

#[test]
fn one_shot_type_is_rejected() {
    let store_dir = temp_dir("cli-type-one-shot");
    let output = run_in(&store_dir, &["type", "Buy", "milk"], None);
    std::fs::remove_dir_all(&store_dir).ok();

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("ERROR: invalid_input"));
    assert!(stderr.contains("interactive session"));
}

#[test]
fn invalid_log_filter_is_reported() {
    let store_dir = temp_dir("cli-bad-log");
    let output = run_in(&store_dir, &["list"], Some("taskboard=loudest"));
    std::fs::remove_dir_all(&store_dir).ok();

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("TASKBOARD_LOG"));
    assert!(stderr.contains("taskboard=loudest"));
}

#[test]
fn oversized_hide_delay_override_is_rejected() {
    let store_dir = temp_dir("cli-big-delay");
    let output = run_in(
        &store_dir,
        &["list", "--config-override", "hide_delay_secs=18446744073709551615"],
        None,
    );
    std::fs::remove_dir_all(&store_dir).ok();

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("hide_delay_secs must be at most"));
}
