use std::{
    fs,
    path::PathBuf,
    process::{Command, Output},
};

fn run_bin(args: &[&str]) -> Output {
    let bin = PathBuf::from(env!("CARGO_BIN_EXE_glimmer"));

    Command::new(bin)
        .args(args)
        .output()
        .expect("failed to execute command")
}

fn run_bin_ok(args: &[&str]) -> Output {
    let output = run_bin(args);

    let stderr_str =
        std::str::from_utf8(&output.stderr).expect("failed to convert stderr to string");

    assert!(
        output.status.success(),
        "failed to run binary with {args:?}\nstderr:\n{stderr_str}\n"
    );

    output
}

#[test]
fn bounded_runs_succeed_with_defaults() {
    run_bin_ok(&["--seed", "7", "--frames", "10", "birds"]);
    run_bin_ok(&["--seed", "7", "--frames", "10", "fireflies"]);
}

#[test]
fn seeded_runs_are_reproducible() {
    let first = run_bin_ok(&["--seed", "42", "--frames", "25", "birds"]);
    let second = run_bin_ok(&["--seed", "42", "--frames", "25", "birds"]);
    assert_eq!(first.stdout, second.stdout);

    let first = run_bin_ok(&["--seed", "42", "--frames", "25", "fireflies"]);
    let second = run_bin_ok(&["--seed", "42", "--frames", "25", "fireflies"]);
    assert_eq!(first.stdout, second.stdout);
}

#[test]
fn config_file_overrides_are_honored() {
    let test_dir = PathBuf::from(env!("CARGO_TARGET_TMPDIR")).join("config_overrides");

    fs::remove_dir_all(&test_dir).ok();
    fs::create_dir(&test_dir).expect("failed to create test directory");

    let config_path = test_dir.join("config.toml");
    let config_contents = String::new()
        + "[display]\n"
        + "width = 16\n"
        + "height = 8\n"
        + "frame_delay_ms = 1\n"
        + "\n"
        + "[flock]\n"
        + "n_birds = 4\n"
        + "leader_follow = false\n"
        + "\n"
        + "[firefly]\n"
        + "n_fireflies = 3\n"
        + "blink_chance = 1.0\n";

    fs::write(&config_path, config_contents).expect("failed to write config file");

    let config_path_str = config_path
        .to_str()
        .expect("failed to convert config path to string");

    let output = run_bin_ok(&[
        "--config",
        config_path_str,
        "--seed",
        "3",
        "--frames",
        "5",
        "birds",
    ]);

    // The final clear leaves a dark 16x8 frame: 16 pixels plus a newline
    // per row, plus the cursor-home escape.
    let stdout = String::from_utf8(output.stdout).expect("stdout is not UTF-8");
    let dark_frame = format!("\x1b[H{}", format!("{}\n", ".".repeat(16)).repeat(8));
    assert!(
        stdout.ends_with(&dark_frame),
        "run must end on a cleared frame"
    );

    run_bin_ok(&[
        "--config",
        config_path_str,
        "--seed",
        "3",
        "--frames",
        "5",
        "fireflies",
    ]);

    fs::remove_dir_all(&test_dir).ok();
}

#[test]
fn invalid_config_fails_before_the_loop() {
    let test_dir = PathBuf::from(env!("CARGO_TARGET_TMPDIR")).join("invalid_config");

    fs::remove_dir_all(&test_dir).ok();
    fs::create_dir(&test_dir).expect("failed to create test directory");

    let config_path = test_dir.join("config.toml");
    fs::write(&config_path, "[firefly]\nblink_chance = 2.0\n")
        .expect("failed to write config file");

    let config_path_str = config_path
        .to_str()
        .expect("failed to convert config path to string");

    let output = run_bin(&["--config", config_path_str, "--frames", "1", "fireflies"]);
    assert!(!output.status.success(), "invalid config must be rejected");

    fs::remove_dir_all(&test_dir).ok();
}
