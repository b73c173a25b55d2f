//! Audio/TTS environment probe
//!
//! Runs, in order: audio server inspection, the synthesis tool check
//! (locate, synthesize, play), and the system speech engine check. Every
//! step yields a tagged outcome; nothing here fails the run.

pub mod audio;
pub mod engines;
pub mod locator;
pub mod playback;
pub mod synthesis;

pub use audio::{inspect, AudioReport};
pub use engines::{default_engines, probe_engines, EngineReport, EngineSpec};
pub use locator::{locate_tool, LocateOutcome, ToolLocation};
pub use playback::{play, PlaybackOutcome, PlaybackReport};
pub use synthesis::{
    synthesize, with_synthesized, SynthesisAttempt, SynthesisJob, SynthesisOutcome,
    SynthesisRequest,
};

use crate::config::Config;
use crate::process::CommandRunner;
use log::info;
use serde::Serialize;
use std::path::Path;

/// Everything the synthesis tool check found
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TtsReport {
    pub tool: String,
    pub locate: LocateOutcome,
    /// Absent when the tool was not found
    pub synthesis: Option<SynthesisAttempt>,
    /// Absent unless synthesis succeeded
    pub playback: Option<PlaybackReport>,
}

impl TtsReport {
    /// Synthesis worked; playback does not affect this
    pub fn ok(&self) -> bool {
        self.synthesis
            .as_ref()
            .is_some_and(|s| s.outcome.succeeded())
    }
}

/// Locate the synthesis tool, synthesize a phrase and try to play it
///
/// Relative tool paths resolve against `workdir`.
pub fn probe_tts(runner: &dyn CommandRunner, config: &Config, workdir: &Path) -> TtsReport {
    let tool = config.tool_name();
    let local = workdir.join(config.local_tool());
    let locate = locate_tool(runner, &local, &tool, config.query_timeout());

    let Some(location) = locate.location().cloned() else {
        return TtsReport {
            tool,
            locate,
            synthesis: None,
            playback: None,
        };
    };

    let request = SynthesisRequest {
        text: config.synthesis_text(),
        voice: config.voice(),
        suffix: config.media_suffix(),
        timeout: config.synthesis_timeout(),
    };
    let players = config.players();
    let (attempt, playback) = with_synthesized(runner, location.path(), &request, |audio| {
        play(runner, audio, &players, config.playback_timeout())
    });

    TtsReport {
        tool,
        locate,
        synthesis: Some(attempt),
        playback,
    }
}

/// The whole probe run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiagnosticReport {
    pub audio: AudioReport,
    pub tts: TtsReport,
    pub engines: EngineReport,
}

impl DiagnosticReport {
    /// Neither the synthesis tool nor any system engine works
    pub fn nothing_works(&self) -> bool {
        !self.tts.ok() && !self.engines.ok()
    }
}

/// Run every check in order
pub fn run_probe(runner: &dyn CommandRunner, config: &Config, workdir: &Path) -> DiagnosticReport {
    info!("Starting TTS probe in {}", workdir.display());

    let audio = inspect(runner, config.query_timeout());
    let tts = probe_tts(runner, config, workdir);
    let engines = probe_engines(
        runner,
        &default_engines(config),
        config.query_timeout(),
        config.engine_timeout(),
    );

    info!(
        "Probe finished: synthesis tool {}, system engine {}",
        if tts.ok() { "ok" } else { "failed" },
        if engines.ok() { "ok" } else { "failed" }
    );
    DiagnosticReport {
        audio,
        tts,
        engines,
    }
}
