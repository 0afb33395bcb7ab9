use std::fs;
use std::process::Command;

fn wiper() -> Command {
    Command::new(env!("CARGO_BIN_EXE_wiper"))
}

fn config_file(name: &str, json: &str) -> std::path::PathBuf {
    let path = std::env::temp_dir().join(format!("{}-{}.json", name, std::process::id()));
    fs::write(&path, json).expect("write config");
    path
}

#[test]
fn wiper_rejects_zero_calibration_cycles() {
    let path = config_file(
        "wiper-zero-cycles",
        r#"{"calibration":{"cycles":0},"realtime":{"enabled":false}}"#,
    );

    let output = wiper()
        .env("WHITEBOARD_WIPER_CONFIG", &path)
        .output()
        .expect("run wiper");
    let _ = fs::remove_file(&path);

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("invalid configuration"),
        "unexpected stderr: {stderr}"
    );
}

#[test]
fn wiper_fails_without_gpio_chip() {
    let path = config_file(
        "wiper-missing-chip",
        r#"{"gpio":{"chip_path":"/dev/nonexistent-gpiochip"},"realtime":{"enabled":false}}"#,
    );

    let output = wiper()
        .env("WHITEBOARD_WIPER_CONFIG", &path)
        .output()
        .expect("run wiper");
    let _ = fs::remove_file(&path);

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("hardware initialization failed"),
        "unexpected stderr: {stderr}"
    );
}

#[test]
fn gpio_toggle_fails_on_missing_chip() {
    let output = Command::new(env!("CARGO_BIN_EXE_gpio-toggle"))
        .args(["--chip", "/dev/nonexistent-gpiochip", "--line", "22", "--count", "1"])
        .output()
        .expect("run gpio-toggle");

    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn gpio_toggle_requires_line() {
    let output = Command::new(env!("CARGO_BIN_EXE_gpio-toggle"))
        .output()
        .expect("run gpio-toggle");

    assert!(!output.status.success());
}

#[test]
fn hcsr04_probe_fails_on_missing_chip() {
    let output = Command::new(env!("CARGO_BIN_EXE_hcsr04-probe"))
        .args(["--chip", "/dev/nonexistent-gpiochip", "--samples", "1"])
        .output()
        .expect("run hcsr04-probe");

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("failed to initialize HC-SR04"), "unexpected stderr: {stderr}");
}

#[test]
fn hcsr04_probe_help_lists_options() {
    let output = Command::new(env!("CARGO_BIN_EXE_hcsr04-probe"))
        .arg("--help")
        .output()
        .expect("run hcsr04-probe");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("--samples"));
    assert!(stdout.contains("--json"));
    assert!(stdout.contains("--no-realtime"));
}

#[test]
fn hcsr04_probe_requests_realtime_before_init() {
    let output = Command::new(env!("CARGO_BIN_EXE_hcsr04-probe"))
        .args(["--chip", "/dev/nonexistent-gpiochip", "--samples", "1"])
        .output()
        .expect("run hcsr04-probe");

    assert_eq!(output.status.code(), Some(1));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("[Realtime]"), "unexpected stdout: {stdout}");
    assert!(!stdout.contains("Disabled by configuration"), "unexpected stdout: {stdout}");
}

#[test]
fn hcsr04_probe_no_realtime_skips_scheduling() {
    let output = Command::new(env!("CARGO_BIN_EXE_hcsr04-probe"))
        .args([
            "--chip",
            "/dev/nonexistent-gpiochip",
            "--samples",
            "1",
            "--no-realtime",
        ])
        .output()
        .expect("run hcsr04-probe");

    assert_eq!(output.status.code(), Some(1));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        stdout.contains("[Realtime] Disabled by configuration"),
        "unexpected stdout: {stdout}"
    );
}
