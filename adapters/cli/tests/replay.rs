use std::{
    io::Write,
    process::{Command, Stdio},
};

const OBSERVATIONS: &str = concat!(
    r#"{"turn": 0, "width": 4, "height": 1, "resources": [{"kind": "wood", "x": 0, "y": 0, "amount": 100}], "players": [{"team": 0, "units": [{"id": "u_1", "kind": "worker", "x": 3, "y": 0}]}]}"#,
    "\n",
    r#"{"turn": 1, "width": 4, "height": 1, "resources": [{"kind": "wood", "x": 0, "y": 0, "amount": 100}], "players": [{"team": 0, "units": [{"id": "u_1", "kind": "worker", "x": 2, "y": 0}]}]}"#,
    "\n",
);

#[test]
fn replays_observations_from_stdin() {
    let mut child = Command::new(env!("CARGO_BIN_EXE_lux-agent"))
        .arg("-")
        .env("RUST_LOG", "off")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("failed to spawn lux-agent");

    child
        .stdin
        .take()
        .expect("stdin is piped")
        .write_all(OBSERVATIONS.as_bytes())
        .expect("failed to write observations");
    let output = child.wait_with_output().expect("lux-agent runs");

    assert!(output.status.success(), "lux-agent exited with {}", output.status);
    assert_eq!(
        String::from_utf8(output.stdout).expect("utf-8 output"),
        "m u_1 w\nm u_1 w\n"
    );
}

#[test]
fn missing_observation_file_fails() {
    let output = Command::new(env!("CARGO_BIN_EXE_lux-agent"))
        .arg("does/not/exist.jsonl")
        .output()
        .expect("lux-agent runs");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("failed to open observations"), "{stderr}");
}
