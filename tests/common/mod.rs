//! Scripted command runner shared by the integration tests

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::time::Duration;
use ttsdiag::process::{CommandRunner, Completed, Invocation};
use ttsdiag::{DiagError, Result};

type Handler = Box<dyn Fn(&Invocation) -> Result<Completed>>;

/// Answers invocations from a table instead of spawning anything
///
/// Programs without a handler behave as not installed. `which` is answered
/// from the set of installed programs unless it was removed.
pub struct FakeRunner {
    handlers: HashMap<String, Handler>,
    installed: HashSet<String>,
    have_which: bool,
    calls: RefCell<Vec<Invocation>>,
}

impl FakeRunner {
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
            installed: HashSet::new(),
            have_which: true,
            calls: RefCell::new(Vec::new()),
        }
    }

    /// Register a program; `which` will report it as installed
    pub fn on(
        mut self,
        program: &str,
        handler: impl Fn(&Invocation) -> Result<Completed> + 'static,
    ) -> Self {
        self.installed.insert(program.to_string());
        self.handlers.insert(program.to_string(), Box::new(handler));
        self
    }

    /// Make `which` itself unavailable
    pub fn without_which(mut self) -> Self {
        self.have_which = false;
        self
    }

    /// Program names (file names only) in call order
    pub fn programs(&self) -> Vec<String> {
        self.calls.borrow().iter().map(program_key).collect()
    }

    pub fn calls(&self) -> Vec<Invocation> {
        self.calls.borrow().clone()
    }
}

fn program_key(invocation: &Invocation) -> String {
    Path::new(&invocation.program)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

impl CommandRunner for FakeRunner {
    fn run(&self, invocation: &Invocation) -> Result<Completed> {
        self.calls.borrow_mut().push(invocation.clone());
        let key = program_key(invocation);

        if key == "which" && self.have_which {
            let name = invocation
                .args
                .first()
                .map(|a| a.to_string_lossy().into_owned())
                .unwrap_or_default();
            return Ok(if self.installed.contains(&name) {
                Completed {
                    code: Some(0),
                    stdout: format!("/usr/bin/{}\n", name),
                    stderr: String::new(),
                }
            } else {
                exit(1)
            });
        }

        match self.handlers.get(&key) {
            Some(handler) => handler(invocation),
            None => Err(DiagError::ToolNotFound(invocation.label())),
        }
    }
}

/// Successful exit with no output
pub fn ok() -> Completed {
    exit(0)
}

pub fn exit(code: i32) -> Completed {
    Completed {
        code: Some(code),
        ..Completed::default()
    }
}

pub fn stdout(text: &str) -> Completed {
    Completed {
        code: Some(0),
        stdout: text.to_string(),
        stderr: String::new(),
    }
}

pub fn timed_out(invocation: &Invocation) -> DiagError {
    DiagError::TimedOut {
        program: invocation.label(),
        after: invocation.timeout.unwrap_or(Duration::from_secs(0)),
    }
}

/// Handler for an edge-tts style tool that writes `bytes` to --write-media
pub fn writes_media(bytes: &'static [u8]) -> impl Fn(&Invocation) -> Result<Completed> {
    move |invocation| {
        if let Some(path) = invocation.flag_value("--write-media") {
            std::fs::write(path, bytes)?;
        }
        Ok(ok())
    }
}
