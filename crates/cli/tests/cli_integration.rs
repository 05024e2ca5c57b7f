//! End-to-end tests against the `seismo` binary

mod common;

use common::{SeismoCommand, TestEnv};

const LOG: &str = "\
2024-05-01T06:12:00 rising  17 event: #1(1) 2024-05-01T06:12:00.1+02:00 (1s)
2024-05-01T09:40:31 falling 27 event: #7(3) 2024-05-01T09:40:31.5+02:00 (2s)
2024-05-02T00:00:05 rising  17 event: #9(5) 2024-05-02T00:00:05.0+02:00 (3s)
";

fn pair(first: &str, second: &str) -> String {
    let result = SeismoCommand::new()
        .args(&["pair", first, second])
        .assert_success()
        .unwrap();
    result.stdout.trim().to_string()
}

#[test]
fn test_pair_command() {
    assert_eq!(pair("rising17", "falling17"), "true");
    assert_eq!(pair("rising17", "falling27"), "false");
    assert_eq!(pair("falling17", "rising17"), "false");
    assert_eq!(pair("rising4", "falling4"), "true");
    assert_eq!(pair("r", "f"), "false");
}

#[test]
fn test_config_get_defaults() {
    let env = TestEnv::new().unwrap();

    let result = seismo!(env, "config", "get", "debounce.suppress_window_ms").unwrap();
    assert_eq!(result.stdout.trim(), "2000");

    let result = seismo!(env, "config", "get", "schedule.enabled").unwrap();
    assert_eq!(result.stdout.trim(), "false");
}

#[test]
fn test_config_set_persists() {
    let env = TestEnv::new().unwrap();

    seismo!(env, "config", "set", "debounce.suppress_window_ms", "750").unwrap();
    let result = seismo!(env, "config", "get", "debounce.suppress_window_ms").unwrap();
    assert_eq!(result.stdout.trim(), "750");

    // Other sections survive the rewrite
    let result = seismo!(env, "config", "get", "storage.data_dir").unwrap();
    assert_eq!(result.stdout.trim(), env.data_dir().display().to_string());
}

#[test]
fn test_config_set_rejects_out_of_range() {
    let env = TestEnv::new().unwrap();

    let result = env
        .seismo(&["config", "set", "debounce.suppress_window_ms", "0"])
        .assert_failure()
        .unwrap();
    assert!(result.contains_stderr("suppress_window_ms"));

    let result = env
        .seismo(&["config", "set", "sensor.lines", "17,1000"])
        .assert_failure()
        .unwrap();
    assert!(result.contains_stderr("sensor.lines"));

    env.seismo(&["config", "get", "no.such_key"]).assert_failure().unwrap();
}

#[test]
fn test_config_example_is_loadable() {
    let env = TestEnv::new().unwrap();
    let result = SeismoCommand::new().args(&["config", "example"]).assert_success().unwrap();
    assert!(result.contains_stdout("[debounce]"));

    std::fs::write(env.config_path(), &result.stdout).unwrap();
    let result = seismo!(env, "config", "get", "sensor.lines").unwrap();
    assert_eq!(result.stdout.trim(), "17,27");
}

#[test]
fn test_report_from_event_log() {
    let env = TestEnv::new().unwrap();
    std::fs::create_dir_all(env.data_dir()).unwrap();
    std::fs::write(env.data_dir().join("vibration.txt"), LOG).unwrap();

    let result = seismo!(env, "report").unwrap();
    assert!(result.contains_stdout("Events:  3"));
    assert!(result.contains_stdout("Days:    2"));

    let html = std::fs::read_to_string(env.data_dir().join("index.html")).unwrap();
    assert!(html.contains("<td>2024-05-01 09:40:31</td><td>falling 27</td>"));
    assert!(html.contains("manual"));
}

#[test]
fn test_report_without_event_log() {
    let env = TestEnv::new().unwrap();

    let result = seismo!(env, "report").unwrap();
    assert!(result.contains_stdout("Events:  0"));
    assert!(env.data_dir().join("index.html").exists());
}

#[test]
fn test_status_when_stopped() {
    let env = TestEnv::new().unwrap();
    std::fs::create_dir_all(env.data_dir()).unwrap();
    std::fs::write(env.data_dir().join("vibration.txt"), LOG).unwrap();

    let result = seismo!(env, "status").unwrap();
    assert!(result.contains_stdout("Not running"));
    assert!(result.contains_stdout("Events:      3"));
    assert!(result.contains_stdout("2024-05-02 00:00:05"));
}

#[test]
fn test_status_and_report_survive_invalid_utf8() {
    let env = TestEnv::new().unwrap();
    std::fs::create_dir_all(env.data_dir()).unwrap();
    let mut contents = LOG.as_bytes().to_vec();
    contents.extend_from_slice(b"\xff\xfe corrupted\n");
    std::fs::write(env.data_dir().join("vibration.txt"), contents).unwrap();

    let result = seismo!(env, "status").unwrap();
    assert!(result.contains_stdout("Events:      3"));

    let result = seismo!(env, "report").unwrap();
    assert!(result.contains_stdout("Events:  3"));
    assert!(result.contains_stdout("Skipped 1 unreadable event log lines"));
}

#[test]
fn test_stop_when_not_running() {
    let env = TestEnv::new().unwrap();
    let result = seismo!(env, "stop").unwrap();
    assert!(result.contains_stdout("not running"));
}
