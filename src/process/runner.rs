//! Runner that spawns real child processes

use super::{CommandRunner, Completed, Invocation};
use crate::{DiagError, Result};
use log::debug;
use std::io::{ErrorKind, Read, Write};
use std::process::{ChildStdin, Command, Stdio};
use std::sync::mpsc::{self, Receiver};
use std::thread;
use std::time::{Duration, Instant};
use wait_timeout::ChildExt;

/// Time left to readers of a child that exited right at its deadline
const COLLECT_GRACE: Duration = Duration::from_millis(100);

/// Spawns commands with `std::process` and enforces timeouts
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl SystemRunner {
    pub fn new() -> Self {
        Self
    }
}

/// Read a child pipe to the end on a helper thread
///
/// Keeps the pipe drained while we wait, so a child that writes a lot
/// never blocks on a full pipe and looks like a timeout. The text arrives
/// on the returned channel once the pipe closes.
fn drain<R: Read + Send + 'static>(source: Option<R>) -> Option<Receiver<String>> {
    source.map(|mut pipe| {
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            let mut buf = Vec::new();
            let _ = pipe.read_to_end(&mut buf);
            let _ = tx.send(String::from_utf8_lossy(&buf).into_owned());
        });
        rx
    })
}

/// Wait for a drained pipe, giving up at `deadline`
///
/// A background process left behind by the child can keep the pipe open
/// long after the child exits; its output is dropped in that case.
fn collect(rx: Option<Receiver<String>>, deadline: Option<Instant>, label: &str) -> String {
    let Some(rx) = rx else {
        return String::new();
    };
    let received = match deadline {
        Some(deadline) => rx
            .recv_timeout(deadline.saturating_duration_since(Instant::now()).max(COLLECT_GRACE))
            .map_err(|e| debug!("Output of {} not collected: {}", label, e)),
        None => rx.recv().map_err(|e| debug!("Output of {} lost: {}", label, e)),
    };
    received.unwrap_or_default()
}

/// Feed `text` to the child's stdin on a helper thread
///
/// The writer is never joined; a child that stops reading only blocks
/// the helper, and the timeout still applies to the child.
fn feed(pipe: Option<ChildStdin>, text: Option<&String>, label: String) {
    if let (Some(mut pipe), Some(text)) = (pipe, text) {
        let text = text.clone();
        thread::spawn(move || {
            // EPIPE when the child exits without reading; its status says the rest
            if let Err(e) = pipe.write_all(text.as_bytes()) {
                debug!("Writing stdin of {} failed: {}", label, e);
            }
        });
    }
}

impl CommandRunner for SystemRunner {
    fn run(&self, invocation: &Invocation) -> Result<Completed> {
        debug!("Running: {}", invocation);

        let mut cmd = Command::new(&invocation.program);
        cmd.args(&invocation.args);
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());
        cmd.stdin(if invocation.stdin.is_some() {
            Stdio::piped()
        } else {
            Stdio::null()
        });

        let mut child = cmd.spawn().map_err(|e| match e.kind() {
            ErrorKind::NotFound => DiagError::ToolNotFound(invocation.label()),
            _ => DiagError::Io(e),
        })?;

        let started = Instant::now();
        let stdout = drain(child.stdout.take());
        let stderr = drain(child.stderr.take());
        feed(child.stdin.take(), invocation.stdin.as_ref(), invocation.label());

        let status = match invocation.timeout {
            Some(limit) => match child.wait_timeout(limit)? {
                Some(status) => status,
                None => {
                    debug!("{} exceeded {:?}, killing", invocation.label(), limit);
                    let _ = child.kill();
                    let _ = child.wait();
                    // Grandchildren may still hold the pipes open; leave the readers detached
                    return Err(DiagError::TimedOut {
                        program: invocation.label(),
                        after: limit,
                    });
                }
            },
            None => child.wait()?,
        };

        let deadline = invocation.timeout.map(|limit| started + limit);
        let label = invocation.label();
        let completed = Completed {
            code: status.code(),
            stdout: collect(stdout, deadline, &label),
            stderr: collect(stderr, deadline, &label),
        };
        debug!("{} finished with {:?}", invocation.label(), completed.code);
        Ok(completed)
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn test_captures_output_and_status() {
        let runner = SystemRunner::new();
        let done = runner
            .run(&Invocation::new("sh").args(["-c", "echo out; echo err >&2; exit 3"]))
            .unwrap();
        assert_eq!(done.code, Some(3));
        assert!(!done.success());
        assert_eq!(done.stdout.trim(), "out");
        assert_eq!(done.stderr.trim(), "err");
    }

    #[test]
    fn test_feeds_stdin() {
        let done = SystemRunner::new()
            .run(&Invocation::new("cat").stdin("Hello world"))
            .unwrap();
        assert!(done.success());
        assert_eq!(done.stdout, "Hello world");
    }

    #[test]
    fn test_missing_program() {
        let err = SystemRunner::new()
            .run(&Invocation::new("ttsdiag-no-such-program"))
            .unwrap_err();
        assert!(matches!(err, DiagError::ToolNotFound(name) if name == "ttsdiag-no-such-program"));
    }

    #[test]
    fn test_timeout_kills_child() {
        let started = Instant::now();
        let err = SystemRunner::new()
            .run(
                &Invocation::new("sleep")
                    .arg("5")
                    .timeout(Duration::from_millis(200)),
            )
            .unwrap_err();
        assert!(matches!(err, DiagError::TimedOut { .. }));
        assert!(started.elapsed() < Duration::from_secs(4));
    }

    #[test]
    fn test_large_output_is_not_a_timeout() {
        // Well past a pipe buffer
        let done = SystemRunner::new()
            .run(
                &Invocation::new("sh")
                    .args(["-c", "head -c 300000 /dev/zero | tr '\\0' a"])
                    .timeout(Duration::from_secs(10)),
            )
            .unwrap();
        assert_eq!(done.stdout.len(), 300000);
    }

    #[test]
    fn test_background_child_does_not_outlive_timeout() {
        // The shell exits at once but sleep keeps stdout and stderr open
        let started = Instant::now();
        let done = SystemRunner::new()
            .run(
                &Invocation::new("sh")
                    .args(["-c", "sleep 8 & exit 1"])
                    .timeout(Duration::from_millis(500)),
            )
            .unwrap();
        assert_eq!(done.code, Some(1));
        assert!(started.elapsed() < Duration::from_secs(4));
    }

    #[test]
    fn test_unread_stdin_does_not_outlive_timeout() {
        // Far more than a pipe buffer, to a child that never reads it
        let started = Instant::now();
        let err = SystemRunner::new()
            .run(
                &Invocation::new("sleep")
                    .arg("8")
                    .stdin("x".repeat(1 << 20))
                    .timeout(Duration::from_millis(500)),
            )
            .unwrap_err();
        assert!(matches!(err, DiagError::TimedOut { .. }));
        assert!(started.elapsed() < Duration::from_secs(4));
    }
}
