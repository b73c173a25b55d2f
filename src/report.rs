//! Console rendering of probe and guide results
//!
//! Lines carry a status glyph: `✓` for working, `!` for informational
//! and `✗` for a failure.

use crate::guide::{self, AppState, GuideReport, GuideWrite};
use crate::platform::PulseServerHint;
use crate::probe::audio::{ServerState, SinkListing};
use crate::probe::engines::EngineResult;
use crate::probe::playback::{PlaybackOutcome, PlayerResult};
use crate::probe::{DiagnosticReport, LocateOutcome, SynthesisOutcome, ToolLocation, TtsReport};
use std::io::{self, Write};

/// Line-oriented writer with status glyphs
pub struct Console<W: Write> {
    out: W,
}

impl<W: Write> Console<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    pub fn ok(&mut self, msg: impl AsRef<str>) -> io::Result<()> {
        writeln!(self.out, "✓ {}", msg.as_ref())
    }

    pub fn info(&mut self, msg: impl AsRef<str>) -> io::Result<()> {
        writeln!(self.out, "! {}", msg.as_ref())
    }

    pub fn fail(&mut self, msg: impl AsRef<str>) -> io::Result<()> {
        writeln!(self.out, "✗ {}", msg.as_ref())
    }

    pub fn line(&mut self, msg: impl AsRef<str>) -> io::Result<()> {
        writeln!(self.out, "{}", msg.as_ref())
    }

    pub fn heading(&mut self, msg: impl AsRef<str>) -> io::Result<()> {
        writeln!(self.out, "\n{}", msg.as_ref())
    }
}

/// Print a full probe run the way a person reads it
pub fn render_probe<W: Write>(report: &DiagnosticReport, console: &mut Console<W>) -> io::Result<()> {
    console.line("=== TTS environment diagnostics ===")?;

    render_audio(report, console)?;
    render_tts(&report.tts, console)?;
    render_engines(report, console)?;

    console.heading("=== Results ===")?;
    if report.tts.ok() {
        console.ok(format!("{} works", report.tts.tool))?;
    } else {
        console.fail(format!("{} does not work", report.tts.tool))?;
    }
    if report.engines.ok() {
        console.ok("system TTS works")?;
    } else {
        console.fail("system TTS does not work")?;
    }

    if report.nothing_works() {
        console.heading("Suggestions:")?;
        console.line(format!("1. Install {}: pip install {}", report.tts.tool, report.tts.tool))?;
        console.line("2. Install a system TTS engine: sudo apt install espeak espeak-data")?;
        console.line("3. Check the audio system configuration")?;
    }
    Ok(())
}

fn render_audio<W: Write>(report: &DiagnosticReport, console: &mut Console<W>) -> io::Result<()> {
    let audio = &report.audio;
    console.heading("Checking audio system...")?;

    match &audio.server {
        ServerState::Running => console.ok("PulseAudio is running")?,
        ServerState::NotRunning => console.info("PulseAudio is not running")?,
        ServerState::Missing => console.info("PulseAudio not found")?,
        ServerState::Error { reason } => console.fail(format!("checking PulseAudio failed: {}", reason))?,
    }

    match &audio.pulse_server {
        PulseServerHint::Environment { value } => console.line(format!("  PULSE_SERVER={}", value))?,
        PulseServerHint::Wslg { path } => {
            console.info(format!("WSLg PulseAudio socket at {} but PULSE_SERVER is unset", path))?
        }
        PulseServerHint::WslMissing => {
            console.info("running under WSL without a WSLg PulseAudio socket")?
        }
        PulseServerHint::Default => {}
    }

    match &audio.sinks {
        SinkListing::Devices { sinks } => {
            console.ok("audio output devices:")?;
            for sink in sinks {
                console.line(format!("  {}", sink.line))?;
            }
        }
        SinkListing::NoDevices => console.info("no audio output devices found")?,
        SinkListing::Missing => console.info("pactl not found")?,
        SinkListing::Error { reason } => {
            console.fail(format!("listing audio devices failed: {}", reason))?
        }
    }
    Ok(())
}

fn render_tts<W: Write>(tts: &TtsReport, console: &mut Console<W>) -> io::Result<()> {
    console.heading(format!("Testing the {} command-line tool...", tts.tool))?;

    match &tts.locate {
        LocateOutcome::Found {
            location: ToolLocation::Local { path },
        } => console.ok(format!("found bundled {}: {}", tts.tool, path.display()))?,
        LocateOutcome::Found {
            location: ToolLocation::System { path },
        } => console.ok(format!("found system {}: {}", tts.tool, path.display()))?,
        LocateOutcome::NotFound { name } => console.fail(format!("{} not found", name))?,
        LocateOutcome::LookupFailed { name, reason } => {
            console.fail(format!("looking for {} failed: {}", name, reason))?
        }
    }

    let Some(attempt) = &tts.synthesis else {
        return Ok(());
    };
    console.line(format!("synthesizing: '{}'", attempt.text))?;

    match &attempt.outcome {
        SynthesisOutcome::Succeeded { bytes } => {
            let output = attempt
                .output
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_default();
            console.ok(format!("synthesis succeeded, output file: {}", output))?;
            console.line(format!("  file size: {} bytes", bytes))?;
        }
        SynthesisOutcome::NonZeroExit { stderr, .. } => {
            console.fail(format!("{} failed: {}", tts.tool, stderr))?
        }
        SynthesisOutcome::TimedOut { after_secs } => {
            console.fail(format!("{} timed out after {}s", tts.tool, after_secs))?
        }
        SynthesisOutcome::EmptyOutput => console.fail("output file missing or empty")?,
        SynthesisOutcome::Error { reason } => console.fail(format!("error during synthesis: {}", reason))?,
    }

    if let Some(playback) = &tts.playback {
        for attempt in &playback.attempts {
            match &attempt.result {
                PlayerResult::Missing => {
                    console.info(format!("{} not found, trying other players...", attempt.player))?
                }
                PlayerResult::Failed { reason } => console.info(format!(
                    "{} could not start ({}), trying other players...",
                    attempt.player, reason
                ))?,
                PlayerResult::Played { .. } | PlayerResult::TimedOut { .. } => {}
            }
        }
        match &playback.outcome {
            PlaybackOutcome::Played { player } => console.ok(format!("playback finished ({})", player))?,
            PlaybackOutcome::TimedOut { player } => console.info(format!("playback timed out ({})", player))?,
            PlaybackOutcome::NoPlayer => {
                console.info("no audio player found, but the file was generated")?
            }
        }
    }
    Ok(())
}

fn render_engines<W: Write>(report: &DiagnosticReport, console: &mut Console<W>) -> io::Result<()> {
    console.heading("Testing system TTS...")?;

    for attempt in &report.engines.attempts {
        match &attempt.result {
            EngineResult::Ran { .. } => {
                console.ok(format!("found {}", attempt.engine))?;
                console.ok(format!("{} test finished", attempt.engine))?;
            }
            EngineResult::Missing => console.info(format!("{} not found", attempt.engine))?,
            EngineResult::LookupFailed { reason } => {
                console.fail(format!("checking {} failed: {}", attempt.engine, reason))?
            }
            EngineResult::Failed { reason } => {
                console.ok(format!("found {}", attempt.engine))?;
                console.fail(format!("{} failed: {}", attempt.engine, reason))?;
            }
        }
    }
    Ok(())
}

/// Print the guide run: fix summary, launch hint and application state
pub fn render_guide<W: Write>(report: &GuideReport, console: &mut Console<W>) -> io::Result<()> {
    console.line("=== TTS fix verification ===")?;
    console.line("")?;

    match &report.guide {
        GuideWrite::Written { path } => console.ok(format!("wrote test guide {}", path.display()))?,
        GuideWrite::Failed { path, reason } => {
            console.fail(format!("could not write {}: {}", path.display(), reason))?
        }
    }

    console.line("Fixes:")?;
    for item in guide::FIX_SUMMARY {
        console.ok(item)?;
    }

    console.heading("The application can now be started for testing:")?;
    console.line(guide::LAUNCH_COMMAND)?;

    console.heading("=== Checking the application ===")?;
    match &report.app {
        AppState::Running => {
            console.ok(format!("{} is running", report.process_name))?;
            console.line("The application is up; test TTS by hand:")?;
            for (i, step) in guide::MANUAL_STEPS.iter().enumerate() {
                console.line(format!("{}. {}", i + 1, step))?;
            }
        }
        AppState::NotRunning => {
            console.info(format!("{} is not running, start it first", report.process_name))?
        }
        AppState::ListingFailed { reason } => {
            console.fail(format!("could not list processes: {}", reason))?
        }
    }
    Ok(())
}
