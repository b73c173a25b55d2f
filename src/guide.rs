//! Troubleshooting guide and application state check
//!
//! The guide is static text; it does not depend on probe results.

use crate::config::Config;
use crate::process::{CommandRunner, Invocation};
use crate::Result;
use log::{debug, info};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Command that launches the application under test
pub const LAUNCH_COMMAND: &str = "flutter run -d linux";

/// What changed in the application, printed before the process check
pub const FIX_SUMMARY: &[&str] = &[
    "Fixed flutter_tts compatibility on the Linux platform",
    "Added error handling around every TTS plugin call",
    "edge-tts is preferred for speech synthesis",
    "Removed unused variables and cleaned up the TTS service",
];

/// Manual steps, printed only when the application is running
pub const MANUAL_STEPS: &[&str] = &[
    "Tap the '请自下而上拨动爻象' text in the app",
    "Set up a hexagram, then tap '解读卦象'",
    "On the result page, tap any of the tappable texts",
    "Check that speech is heard",
];

/// Markdown written to the guide file
pub const GUIDE: &str = r#"# money_gua TTS Test Guide

## Problem
The Linux client could not produce speech. This has been fixed.

## What was fixed
1. flutter_tts compatibility on the Linux platform
2. Error handling so a failing plugin call no longer crashes the app
3. The edge-tts command-line tool is preferred for synthesis
4. flutter_tts is kept as a fallback

## Test steps

### 1. Start the application
```bash
cd apps/money_gua
flutter run -d linux
```

### 2. Main page TTS
- Tap the "请自下而上拨动爻象" text
- You should hear it read aloud

### 3. Hexagram interpretation TTS
- Set any hexagram (tap a line to toggle yin and yang)
- Tap the "解读卦象" button
- On the result page, tap each of these:
  - Hexagram title
  - Upper and lower trigram notes
  - Plain-language translation
  - In-depth analysis
  - Pictures and text in the illustrated meaning
  - Judgement text

### 4. Debug output
Look for TTS lines in the terminal:
- `TTS: Found local edge-tts at ...` means edge-tts was found
- `TTS: Generating audio for ...` means speech is being generated
- `TTS: Playing audio file: ...` means the audio is playing

## Technical details

### TTS service priority
1. **edge-tts CLI** (preferred)
   - Path: `./python_env/bin/edge-tts` or the system PATH
   - Voice: zh-CN-YunxiNeural
   - Output: MP3 file, played through audioplayers

2. **flutter_tts** (fallback)
   - System TTS engine
   - Language: zh-CN
   - Calls the system speech synthesizer directly

### Error handling
- Every flutter_tts call is wrapped in try/catch
- If flutter_tts fails, edge-tts is used instead
- If both fail, the error is logged and the app keeps running

## Troubleshooting

### No sound
1. Check the system volume
2. Check that PulseAudio/PipeWire is running
3. Check that edge-tts is installed: `which edge-tts`
4. Try edge-tts by hand: `edge-tts --text "测试" --voice zh-CN-YunxiNeural --write-media test.mp3`
5. Run `ttsdiag probe` for a full environment check

### The application crashes
1. Read the error in the terminal
2. Check that the flutter_tts plugin is installed correctly
3. Try `flutter clean && flutter pub get`

## Verifying the fix
- No MissingPluginException at startup
- Tapping text reads it aloud in Chinese
- The terminal shows TTS debug lines
"#;

/// Whether the application process is running
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AppState {
    Running,
    NotRunning,
    ListingFailed { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum GuideWrite {
    Written { path: PathBuf },
    Failed { path: PathBuf, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GuideReport {
    pub guide: GuideWrite,
    pub process_name: String,
    pub app: AppState,
}

/// Write the static guide to `path`
pub fn write_guide(path: &Path) -> Result<()> {
    debug!("Writing guide to {}", path.display());
    fs::write(path, GUIDE)?;
    Ok(())
}

/// Look for `name` anywhere in the `ps aux` listing
pub fn check_app(runner: &dyn CommandRunner, name: &str, timeout: Duration) -> AppState {
    match runner.run(&Invocation::new("ps").arg("aux").timeout(timeout)) {
        Ok(done) if done.success() => {
            if done.stdout.contains(name) {
                AppState::Running
            } else {
                AppState::NotRunning
            }
        }
        Ok(done) => AppState::ListingFailed {
            reason: format!("ps exited with {:?}: {}", done.code, done.stderr.trim()),
        },
        Err(e) => AppState::ListingFailed {
            reason: e.to_string(),
        },
    }
}

/// Write the guide, then check whether the application is running
///
/// The guide path resolves against `workdir` when relative.
pub fn generate(runner: &dyn CommandRunner, config: &Config, workdir: &Path) -> GuideReport {
    let path = workdir.join(config.guide_output());
    let guide = match write_guide(&path) {
        Ok(()) => {
            info!("Guide written to {}", path.display());
            GuideWrite::Written { path }
        }
        Err(e) => GuideWrite::Failed {
            path,
            reason: e.to_string(),
        },
    };

    let process_name = config.process_name();
    let app = check_app(runner, &process_name, config.query_timeout());
    info!("{} state: {:?}", process_name, app);

    GuideReport {
        guide,
        process_name,
        app,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guide_mentions_tooling() {
        assert!(GUIDE.starts_with("# money_gua TTS Test Guide"));
        assert!(GUIDE.contains("zh-CN-YunxiNeural"));
        assert!(GUIDE.contains("./python_env/bin/edge-tts"));
        assert!(GUIDE.contains(LAUNCH_COMMAND));

        // On-screen labels stay as the app shows them
        for label in ["请自下而上拨动爻象", "解读卦象"] {
            assert!(GUIDE.contains(&format!("\"{}\"", label)), "guide lacks {}", label);
            assert!(
                MANUAL_STEPS.iter().any(|step| step.contains(&format!("'{}'", label))),
                "steps lack {}",
                label
            );
        }
    }

    #[test]
    fn test_write_guide() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("guide.md");
        write_guide(&path).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), GUIDE);
    }
}
