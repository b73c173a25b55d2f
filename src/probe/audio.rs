//! Audio server and output device inspection
//!
//! Purely informational: asks PulseAudio whether it is running and lists
//! sinks through pactl.

use crate::platform::{pulse_server_hint, PulseServerHint};
use crate::process::{CommandRunner, Invocation};
use crate::DiagError;
use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::time::Duration;

/// `pactl list short sinks` line: index, name, driver, sample spec, state
static SINK_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d+)\t([^\t]+)\t([^\t]+)\t([^\t]+)\t([^\t]+)$").expect("valid sink pattern")
});

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ServerState {
    Running,
    NotRunning,
    /// pulseaudio binary not installed
    Missing,
    Error { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SinkDetails {
    pub index: u32,
    pub name: String,
    pub driver: String,
    pub sample_spec: String,
    pub state: String,
}

/// One output device line, parsed when it has the usual shape
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Sink {
    pub line: String,
    pub details: Option<SinkDetails>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SinkListing {
    Devices { sinks: Vec<Sink> },
    NoDevices,
    /// pactl not installed
    Missing,
    Error { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AudioReport {
    pub server: ServerState,
    pub pulse_server: PulseServerHint,
    pub sinks: SinkListing,
}

/// Parse `pactl list short sinks` output, one sink per non-empty line
pub fn parse_sinks(output: &str) -> Vec<Sink> {
    output
        .lines()
        .map(str::trim_end)
        .filter(|line| !line.trim().is_empty())
        .map(|line| {
            let details = SINK_LINE.captures(line).and_then(|caps| {
                Some(SinkDetails {
                    index: caps[1].parse().ok()?,
                    name: caps[2].to_string(),
                    driver: caps[3].to_string(),
                    sample_spec: caps[4].to_string(),
                    state: caps[5].to_string(),
                })
            });
            Sink {
                line: line.to_string(),
                details,
            }
        })
        .collect()
}

fn server_state(runner: &dyn CommandRunner, timeout: Duration) -> ServerState {
    match runner.run(&Invocation::new("pulseaudio").arg("--check").timeout(timeout)) {
        Ok(done) if done.success() => ServerState::Running,
        Ok(_) => ServerState::NotRunning,
        Err(DiagError::ToolNotFound(_)) => ServerState::Missing,
        Err(e) => ServerState::Error {
            reason: e.to_string(),
        },
    }
}

fn sink_listing(runner: &dyn CommandRunner, timeout: Duration) -> SinkListing {
    let invocation = Invocation::new("pactl")
        .args(["list", "short", "sinks"])
        .timeout(timeout);

    match runner.run(&invocation) {
        Ok(done) if done.success() => {
            let sinks = parse_sinks(&done.stdout);
            if sinks.is_empty() {
                SinkListing::NoDevices
            } else {
                SinkListing::Devices { sinks }
            }
        }
        Ok(done) => {
            debug!("pactl failed: {}", done.stderr.trim());
            SinkListing::NoDevices
        }
        Err(DiagError::ToolNotFound(_)) => SinkListing::Missing,
        Err(e) => SinkListing::Error {
            reason: e.to_string(),
        },
    }
}

/// Query the audio server and its output devices
pub fn inspect(runner: &dyn CommandRunner, timeout: Duration) -> AudioReport {
    AudioReport {
        server: server_state(runner, timeout),
        pulse_server: pulse_server_hint(),
        sinks: sink_listing(runner, timeout),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_standard_lines() {
        let out = "0\talsa_output.pci-0000_00_1f.3.analog-stereo\tmodule-alsa-card.c\ts16le 2ch 44100Hz\tSUSPENDED\n\
                   1\tbluez_sink.AA_BB\tmodule-bluez5-device.c\ts16le 2ch 48000Hz\tRUNNING\n";
        let sinks = parse_sinks(out);
        assert_eq!(sinks.len(), 2);

        let first = sinks[0].details.as_ref().unwrap();
        assert_eq!(first.index, 0);
        assert_eq!(first.name, "alsa_output.pci-0000_00_1f.3.analog-stereo");
        assert_eq!(first.sample_spec, "s16le 2ch 44100Hz");
        assert_eq!(first.state, "SUSPENDED");
        assert_eq!(sinks[1].details.as_ref().unwrap().state, "RUNNING");
    }

    #[test]
    fn test_keeps_unusual_lines() {
        let sinks = parse_sinks("\n  \nsomething odd\n");
        assert_eq!(sinks.len(), 1);
        assert_eq!(sinks[0].line, "something odd");
        assert!(sinks[0].details.is_none());
    }
}
