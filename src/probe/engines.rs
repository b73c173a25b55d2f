//! System speech engines that speak directly instead of writing a file

use crate::config::Config;
use crate::process::{which, CommandRunner, Invocation};
use log::{debug, info};
use serde::Serialize;
use std::time::Duration;

/// How to exercise one engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineSpec {
    pub name: String,
    pub args: Vec<String>,
    /// Text fed on stdin, for engines that read it there
    pub stdin: Option<String>,
}

/// espeak, then festival
pub fn default_engines(config: &Config) -> Vec<EngineSpec> {
    vec![
        EngineSpec {
            name: "espeak".to_string(),
            args: vec!["-v".to_string(), config.espeak_voice(), config.espeak_text()],
            stdin: None,
        },
        EngineSpec {
            name: "festival".to_string(),
            args: vec!["--tts".to_string()],
            stdin: Some(config.festival_text()),
        },
    ]
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum EngineResult {
    /// Ran to completion; the exit status is recorded but not judged
    Ran { code: Option<i32> },
    Missing,
    LookupFailed { reason: String },
    Failed { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EngineAttempt {
    pub engine: String,
    pub result: EngineResult,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EngineReport {
    pub attempts: Vec<EngineAttempt>,
    /// First engine that ran
    pub working: Option<String>,
}

impl EngineReport {
    pub fn ok(&self) -> bool {
        self.working.is_some()
    }
}

fn exercise(
    runner: &dyn CommandRunner,
    spec: &EngineSpec,
    lookup_timeout: Duration,
    timeout: Duration,
) -> EngineResult {
    match which(runner, &spec.name, lookup_timeout) {
        Ok(Some(path)) => debug!("Found {} at {}", spec.name, path.display()),
        Ok(None) => return EngineResult::Missing,
        Err(e) => {
            return EngineResult::LookupFailed {
                reason: e.to_string(),
            }
        }
    }

    let mut invocation = Invocation::new(&spec.name).args(&spec.args).timeout(timeout);
    if let Some(text) = &spec.stdin {
        invocation = invocation.stdin(text.clone());
    }

    match runner.run(&invocation) {
        Ok(done) => EngineResult::Ran { code: done.code },
        Err(e) => EngineResult::Failed {
            reason: e.to_string(),
        },
    }
}

/// Test engines in order and stop at the first one that runs
pub fn probe_engines(
    runner: &dyn CommandRunner,
    engines: &[EngineSpec],
    lookup_timeout: Duration,
    timeout: Duration,
) -> EngineReport {
    let mut attempts = Vec::new();

    for spec in engines {
        let result = exercise(runner, spec, lookup_timeout, timeout);
        debug!("Engine {}: {:?}", spec.name, result);

        let ran = matches!(result, EngineResult::Ran { .. });
        attempts.push(EngineAttempt {
            engine: spec.name.clone(),
            result,
        });

        if ran {
            info!("System speech engine {} works", spec.name);
            return EngineReport {
                attempts,
                working: Some(spec.name.clone()),
            };
        }
    }

    EngineReport {
        attempts,
        working: None,
    }
}
