//! External process invocation
//!
//! Every program the diagnostics touch (synthesis tool, players, speech
//! engines, `which`, `ps`, `pactl`) is run through [`CommandRunner`], so the
//! probes can be driven by a scripted runner in tests.

pub mod lookup;
pub mod runner;

pub use lookup::which;
pub use runner::SystemRunner;

use crate::Result;
use std::ffi::{OsStr, OsString};
use std::fmt;
use std::time::Duration;

/// A program plus fixed arguments, as written in the config file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    pub program: String,
    pub args: Vec<String>,
}

impl CommandLine {
    /// Split a whitespace-separated command; `None` for a blank entry
    pub fn parse(line: &str) -> Option<Self> {
        let mut words = line.split_whitespace();
        let program = words.next()?.to_string();
        Some(Self {
            program,
            args: words.map(str::to_string).collect(),
        })
    }
}

impl fmt::Display for CommandLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// One external command to run
#[derive(Debug, Clone)]
pub struct Invocation {
    pub program: OsString,
    pub args: Vec<OsString>,
    /// Text written to the child's stdin, which is then closed
    pub stdin: Option<String>,
    /// Kill the child if it runs longer than this
    pub timeout: Option<Duration>,
}

impl Invocation {
    pub fn new(program: impl AsRef<OsStr>) -> Self {
        Self {
            program: program.as_ref().to_os_string(),
            args: Vec::new(),
            stdin: None,
            timeout: None,
        }
    }

    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_os_string());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args
            .extend(args.into_iter().map(|a| a.as_ref().to_os_string()));
        self
    }

    pub fn stdin(mut self, text: impl Into<String>) -> Self {
        self.stdin = Some(text.into());
        self
    }

    pub fn timeout(mut self, limit: Duration) -> Self {
        self.timeout = Some(limit);
        self
    }

    /// Program name used in messages
    pub fn label(&self) -> String {
        self.program.to_string_lossy().into_owned()
    }

    /// Value following `flag` in the argument list, if any
    pub fn flag_value(&self, flag: &str) -> Option<&OsStr> {
        self.args
            .iter()
            .position(|a| a == flag)
            .and_then(|i| self.args.get(i + 1))
            .map(OsString::as_os_str)
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.to_string_lossy())?;
        for arg in &self.args {
            write!(f, " {}", arg.to_string_lossy())?;
        }
        Ok(())
    }
}

/// A child that ran to completion (whatever its exit status)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Completed {
    /// Exit code, `None` when killed by a signal
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl Completed {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

/// Runs external commands
///
/// Implementations map a program that cannot be found to
/// [`DiagError::ToolNotFound`](crate::DiagError::ToolNotFound) and an
/// expired timeout to [`DiagError::TimedOut`](crate::DiagError::TimedOut).
/// A non-zero exit is not an error at this level; callers decide.
pub trait CommandRunner {
    fn run(&self, invocation: &Invocation) -> Result<Completed>;
}
