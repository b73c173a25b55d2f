//! Probe tests against real child processes
//!
//! A shell script stands in for the bundled synthesis tool, so these run
//! on any unix host without edge-tts or an audio stack.

#![cfg(unix)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;
use std::time::{Duration, Instant};
use tempfile::TempDir;
use ttsdiag::config::Config;
use ttsdiag::probe::{probe_tts, PlaybackOutcome, SynthesisOutcome};
use ttsdiag::process::SystemRunner;

/// Workdir whose ./python_env/bin/edge-tts runs `body`
fn workdir_with_script(body: &str) -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    let bin = dir.path().join("python_env/bin");
    fs::create_dir_all(&bin).unwrap();
    let script = bin.join("edge-tts");
    fs::write(&script, format!("#!/bin/sh\n{}\n", body)).unwrap();
    fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();
    dir
}

fn config_without_players() -> Config {
    let mut config = Config::default();
    config.set("playback", "players", "ttsdiag-no-such-player");
    config
}

fn assert_removed(path: Option<&Path>) {
    let path = path.expect("a temp file was used");
    assert!(!path.exists(), "{} should be removed", path.display());
}

#[test]
fn test_script_tool_synthesizes() {
    let dir = workdir_with_script(
        r#"while [ $# -gt 0 ]; do
  if [ "$1" = "--write-media" ]; then printf 'ID3fake' > "$2"; fi
  shift
done"#,
    );

    let report = probe_tts(&SystemRunner::new(), &config_without_players(), dir.path());

    assert!(report.ok(), "report: {:?}", report);
    let attempt = report.synthesis.as_ref().unwrap();
    assert_eq!(attempt.outcome, SynthesisOutcome::Succeeded { bytes: 7 });
    assert_eq!(
        report.playback.as_ref().unwrap().outcome,
        PlaybackOutcome::NoPlayer
    );
    assert_removed(attempt.output.as_deref());
}

#[test]
fn test_script_tool_failure_reports_stderr() {
    let dir = workdir_with_script("echo 'voice not available' >&2\nexit 2");

    let report = probe_tts(&SystemRunner::new(), &config_without_players(), dir.path());

    let attempt = report.synthesis.as_ref().unwrap();
    assert_eq!(
        attempt.outcome,
        SynthesisOutcome::NonZeroExit {
            code: Some(2),
            stderr: "voice not available".to_string()
        }
    );
    assert_removed(attempt.output.as_deref());
}

#[test]
fn test_script_tool_timeout() {
    let dir = workdir_with_script("exec sleep 10");
    let mut config = config_without_players();
    config.set("synthesis", "timeout_secs", "1");

    let started = Instant::now();
    let report = probe_tts(&SystemRunner::new(), &config, dir.path());

    let attempt = report.synthesis.as_ref().unwrap();
    assert_eq!(attempt.outcome, SynthesisOutcome::TimedOut { after_secs: 1 });
    assert!(started.elapsed() < Duration::from_secs(8));
    assert!(!report.ok());
    assert_removed(attempt.output.as_deref());
}
