//! Speech synthesis through an external tool
//!
//! The tool is run edge-tts style:
//! `<tool> --text <text> --voice <voice> --write-media <file>`.
//! Synthesis counts as working only when the tool exits 0 and the file it
//! wrote is non-empty.

use crate::process::{CommandRunner, Invocation};
use crate::{DiagError, Result};
use log::{debug, info, warn};
use serde::Serialize;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// One synthesis request: what to say, with which voice, into which file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynthesisJob {
    pub text: String,
    pub voice: String,
    pub output: PathBuf,
}

impl SynthesisJob {
    /// Command line for running this job with `tool`
    pub fn invocation(&self, tool: &Path) -> Invocation {
        Invocation::new(tool)
            .arg("--text")
            .arg(&self.text)
            .arg("--voice")
            .arg(&self.voice)
            .arg("--write-media")
            .arg(&self.output)
    }
}

/// Settings for a scoped synthesis run
#[derive(Debug, Clone)]
pub struct SynthesisRequest {
    pub text: String,
    pub voice: String,
    /// Suffix of the temporary output file, e.g. `.mp3`
    pub suffix: String,
    pub timeout: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SynthesisOutcome {
    Succeeded { bytes: u64 },
    NonZeroExit { code: Option<i32>, stderr: String },
    TimedOut { after_secs: u64 },
    /// Exit 0 but nothing usable on disk
    EmptyOutput,
    Error { reason: String },
}

impl SynthesisOutcome {
    pub fn succeeded(&self) -> bool {
        matches!(self, SynthesisOutcome::Succeeded { .. })
    }
}

/// A finished synthesis run; `output` no longer exists when this is returned
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SynthesisAttempt {
    pub text: String,
    pub voice: String,
    pub output: Option<PathBuf>,
    pub outcome: SynthesisOutcome,
}

/// Run `job` with `tool`, returning the size of the audio it wrote
fn run_job(
    runner: &dyn CommandRunner,
    tool: &Path,
    job: &SynthesisJob,
    timeout: Duration,
) -> Result<u64> {
    let invocation = job.invocation(tool).timeout(timeout);
    let done = runner.run(&invocation)?;

    if !done.success() {
        return Err(DiagError::NonZeroExit {
            program: invocation.label(),
            code: done.code,
            stderr: done.stderr.trim().to_string(),
        });
    }

    match fs::metadata(&job.output) {
        Ok(meta) if meta.len() > 0 => Ok(meta.len()),
        Ok(_) => Err(DiagError::EmptyOutput(job.output.clone())),
        Err(e) => {
            debug!("No output at {}: {}", job.output.display(), e);
            Err(DiagError::EmptyOutput(job.output.clone()))
        }
    }
}

/// Run `job` with `tool` and classify the result
///
/// Does not touch `job.output` beyond reading its size.
pub fn synthesize(
    runner: &dyn CommandRunner,
    tool: &Path,
    job: &SynthesisJob,
    timeout: Duration,
) -> SynthesisOutcome {
    info!("Synthesizing {:?} with voice {}", job.text, job.voice);

    match run_job(runner, tool, job, timeout) {
        Ok(bytes) => SynthesisOutcome::Succeeded { bytes },
        Err(DiagError::NonZeroExit { code, stderr, .. }) => {
            SynthesisOutcome::NonZeroExit { code, stderr }
        }
        Err(DiagError::TimedOut { after, .. }) => SynthesisOutcome::TimedOut {
            after_secs: after.as_secs(),
        },
        Err(DiagError::EmptyOutput(_)) => SynthesisOutcome::EmptyOutput,
        Err(e) => SynthesisOutcome::Error {
            reason: e.to_string(),
        },
    }
}

/// Synthesize into a temporary file and hand it to `use_audio` on success
///
/// The temporary file is removed before this returns, whichever way the
/// synthesis went.
pub fn with_synthesized<T>(
    runner: &dyn CommandRunner,
    tool: &Path,
    request: &SynthesisRequest,
    use_audio: impl FnOnce(&Path) -> T,
) -> (SynthesisAttempt, Option<T>) {
    let temp = match tempfile::Builder::new()
        .prefix("ttsdiag-")
        .suffix(&request.suffix)
        .tempfile()
    {
        Ok(file) => file.into_temp_path(),
        Err(e) => {
            let attempt = SynthesisAttempt {
                text: request.text.clone(),
                voice: request.voice.clone(),
                output: None,
                outcome: SynthesisOutcome::Error {
                    reason: format!("could not create temporary file: {}", e),
                },
            };
            return (attempt, None);
        }
    };

    let job = SynthesisJob {
        text: request.text.clone(),
        voice: request.voice.clone(),
        output: temp.to_path_buf(),
    };

    let outcome = synthesize(runner, tool, &job, request.timeout);
    let used = if outcome.succeeded() {
        Some(use_audio(&job.output))
    } else {
        None
    };

    if let Err(e) = temp.close() {
        // The tool may have replaced or removed the file itself
        if e.kind() != ErrorKind::NotFound {
            warn!("Failed to remove {}: {}", job.output.display(), e);
        }
    }

    let attempt = SynthesisAttempt {
        text: job.text,
        voice: job.voice,
        output: Some(job.output),
        outcome,
    };
    (attempt, used)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::Completed;

    /// Returns the same completion for every command
    struct Fixed(Completed);

    impl CommandRunner for Fixed {
        fn run(&self, _invocation: &Invocation) -> Result<Completed> {
            Ok(self.0.clone())
        }
    }

    fn job_in(dir: &Path) -> SynthesisJob {
        SynthesisJob {
            text: "hi".to_string(),
            voice: "zh-CN-YunxiNeural".to_string(),
            output: dir.join("out.mp3"),
        }
    }

    #[test]
    fn test_run_job_errors() {
        let dir = tempfile::tempdir().unwrap();
        let job = job_in(dir.path());
        let tool = Path::new("edge-tts");

        let failing = Fixed(Completed {
            code: Some(1),
            stdout: String::new(),
            stderr: "bad voice\n".to_string(),
        });
        match run_job(&failing, tool, &job, Duration::from_secs(30)) {
            Err(e @ DiagError::NonZeroExit { .. }) => {
                assert_eq!(e.to_string(), "edge-tts exited with status 1: bad voice")
            }
            other => panic!("expected non-zero exit, got {:?}", other),
        }

        let silent = Fixed(Completed {
            code: Some(0),
            ..Completed::default()
        });
        assert!(matches!(
            run_job(&silent, tool, &job, Duration::from_secs(30)),
            Err(DiagError::EmptyOutput(path)) if path == job.output
        ));

        fs::write(&job.output, b"ID3").unwrap();
        assert_eq!(run_job(&silent, tool, &job, Duration::from_secs(30)).unwrap(), 3);
        assert_eq!(
            synthesize(&silent, tool, &job, Duration::from_secs(30)),
            SynthesisOutcome::Succeeded { bytes: 3 }
        );
    }

    #[test]
    fn test_invocation_flags() {
        let job = SynthesisJob {
            text: "你好".to_string(),
            voice: "zh-CN-YunxiNeural".to_string(),
            output: PathBuf::from("/tmp/out.mp3"),
        };
        let inv = job.invocation(Path::new("./python_env/bin/edge-tts"));
        assert_eq!(
            inv.to_string(),
            "./python_env/bin/edge-tts --text 你好 --voice zh-CN-YunxiNeural --write-media /tmp/out.mp3"
        );
        assert!(inv.timeout.is_none());
    }
}
