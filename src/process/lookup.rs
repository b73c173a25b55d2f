//! PATH lookup through `which`

use super::{CommandRunner, Invocation};
use crate::Result;
use log::debug;
use std::path::PathBuf;
use std::time::Duration;

/// Resolve `name` on PATH by running `which`
///
/// `Ok(None)` means `which` ran and did not find the program. An error
/// means the lookup itself could not be carried out.
pub fn which(runner: &dyn CommandRunner, name: &str, timeout: Duration) -> Result<Option<PathBuf>> {
    let done = runner.run(&Invocation::new("which").arg(name).timeout(timeout))?;

    if !done.success() {
        debug!("which {}: not found", name);
        return Ok(None);
    }

    let found = done
        .stdout
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .map(PathBuf::from);
    debug!("which {}: {:?}", name, found);
    Ok(found)
}
