use std::path::PathBuf;
use std::io::Write;
use std::process::{Command, Stdio};

fn exe() -> PathBuf {
    std::env::var_os("CARGO_BIN_EXE_stewie")
        .map(PathBuf::from)
        .unwrap_or_else(|| {
            let mut p = PathBuf::from("target").join("debug");
            p.push(if cfg!(windows) {
                "stewie.exe"
            } else {
                "stewie"
            });
            p
        })
}

#[test]
fn cli_play_streams_a_program() {
    let program = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("data")
        .join("short_program.json");

    let out = Command::new(exe())
        .arg("play")
        .arg("--in")
        .arg(&program)
        .output()
        .unwrap();

    assert!(out.status.success());
    let stdout = String::from_utf8(out.stdout).unwrap();
    let lines: Vec<&str> = stdout.lines().collect();
    assert!(lines.len() >= 5, "{stdout}");
    assert_eq!(lines.first(), Some(&"0 0 0 -0.5 -0.5 0"));
    assert_eq!(lines.last(), Some(&"0 0 0 0 0 0"));

    let stderr = String::from_utf8(out.stderr).unwrap();
    assert!(stderr.contains("Doing BOX X-Y"), "{stderr}");
}

#[test]
fn cli_export_prints_a_loadable_program() {
    let out = Command::new(exe())
        .args(["export", "rock", "--tilt", "4"])
        .output()
        .unwrap();

    assert!(out.status.success());
    let program = stewie::Program::from_json_str(&String::from_utf8(out.stdout).unwrap()).unwrap();
    assert_eq!(program, stewie::presets::rock(4.0));
}

#[test]
fn cli_ds3_reads_recorded_events() {
    let dir = PathBuf::from("target").join("cli_smoke");
    std::fs::create_dir_all(&dir).unwrap();
    let events = dir.join("events.txt");
    std::fs::write(&events, "connected\n\nleft:move 128 0\n").unwrap();

    let out = Command::new(exe())
        .arg("ds3")
        .arg("--events")
        .arg(&events)
        .output()
        .unwrap();

    assert!(out.status.success());
    let stdout = String::from_utf8(out.stdout).unwrap();
    assert_eq!(stdout, "connected\n-3 0 0 0 0 0\n");
    let stderr = String::from_utf8(out.stderr).unwrap();
    assert!(stderr.contains("Max angle: 3"), "{stderr}");
}

#[test]
fn cli_ds3_axis_angle_mirrors_only_transforms() {
    let dir = PathBuf::from("target").join("cli_smoke");
    std::fs::create_dir_all(&dir).unwrap();
    let events = dir.join("axis_angle_events.txt");
    std::fs::write(&events, "connected\n\nleft:move 128 0\n").unwrap();

    let out = Command::new(exe())
        .args(["ds3", "15", "--normalize", "axis-angle", "--events"])
        .arg(&events)
        .output()
        .unwrap();

    assert!(out.status.success());
    let stdout = String::from_utf8(out.stdout).unwrap();
    assert_eq!(stdout, "connected\n-1 0 0 15\n");
    let stderr = String::from_utf8(out.stderr).unwrap();
    assert!(stderr.lines().any(|l| l == "-1 0 0 15"), "{stderr}");
    assert!(!stderr.lines().any(|l| l == "connected"), "{stderr}");
}

#[test]
fn cli_record_then_playback_round_trips() {
    let dir = PathBuf::from("target").join("cli_smoke");
    std::fs::create_dir_all(&dir).unwrap();
    let recording = dir.join("recording.txt");

    let mut child = Command::new(exe())
        .arg("record")
        .arg(&recording)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .spawn()
        .unwrap();
    child
        .stdin
        .take()
        .unwrap()
        .write_all(b"0 0 1 0\n0 0 1 2.5\n")
        .unwrap();
    let out = child.wait_with_output().unwrap();
    assert!(out.status.success());
    assert_eq!(String::from_utf8(out.stdout).unwrap(), "0 0 1 0\n0 0 1 2.5\n");

    let stamped = std::fs::read_to_string(&recording).unwrap();
    let entries: Vec<&str> = stamped.lines().collect();
    assert_eq!(entries.len(), 2, "{stamped}");
    assert!(entries[1].ends_with(" 0 0 1 2.5"), "{stamped}");

    let out = Command::new(exe())
        .arg("playback")
        .arg(&recording)
        .output()
        .unwrap();
    assert!(out.status.success());
    assert_eq!(String::from_utf8(out.stdout).unwrap(), "0 0 1 0\n0 0 1 2.5\n");
}

#[test]
fn cli_rejects_non_numeric_tilt() {
    let out = Command::new(exe()).args(["rock", "steep"]).output().unwrap();
    assert!(!out.status.success());
}
