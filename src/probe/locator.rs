//! Synthesis tool lookup
//!
//! A bundled copy (for example a tool installed into a project virtualenv)
//! wins over whatever is on PATH. PATH is only consulted when the bundled
//! copy is absent.

use crate::process::{which, CommandRunner};
use log::{debug, info};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Where the synthesis tool was found
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ToolLocation {
    Local { path: PathBuf },
    System { path: PathBuf },
}

impl ToolLocation {
    pub fn path(&self) -> &Path {
        match self {
            ToolLocation::Local { path } | ToolLocation::System { path } => path,
        }
    }
}

/// Result of looking for the synthesis tool
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum LocateOutcome {
    Found { location: ToolLocation },
    NotFound { name: String },
    /// The PATH lookup itself could not run
    LookupFailed { name: String, reason: String },
}

impl LocateOutcome {
    pub fn location(&self) -> Option<&ToolLocation> {
        match self {
            LocateOutcome::Found { location } => Some(location),
            _ => None,
        }
    }
}

/// Find the synthesis tool, preferring `local` over a PATH lookup of `name`
pub fn locate_tool(
    runner: &dyn CommandRunner,
    local: &Path,
    name: &str,
    timeout: Duration,
) -> LocateOutcome {
    if local.exists() {
        info!("Using bundled {} at {}", name, local.display());
        return LocateOutcome::Found {
            location: ToolLocation::Local {
                path: local.to_path_buf(),
            },
        };
    }
    debug!("{} not present, falling back to PATH", local.display());

    match which(runner, name, timeout) {
        Ok(Some(path)) => {
            info!("Using {} from PATH at {}", name, path.display());
            LocateOutcome::Found {
                location: ToolLocation::System { path },
            }
        }
        Ok(None) => LocateOutcome::NotFound {
            name: name.to_string(),
        },
        Err(e) => LocateOutcome::LookupFailed {
            name: name.to_string(),
            reason: e.to_string(),
        },
    }
}
