//! Configuration management

use crate::process::CommandLine;
use crate::{DiagError, Result};
use ini::Ini;
use log::{debug, info};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Name of the per-user config file in the home directory
pub const CONFIG_FILE_NAME: &str = ".ttsdiag.cfg";

/// Players tried, in order, when the config names none
pub const DEFAULT_PLAYERS: &str =
    "paplay, aplay, mpg123 -q, ffplay -nodisp -autoexit -loglevel quiet";

/// Diagnostic settings
///
/// Every value has a built-in default, so an absent or partial config file
/// is fine. The defaults reproduce the checks the diagnostics were written
/// for: edge-tts with a Mandarin voice, espeak and festival as system
/// engines, and the money_gua desktop app.
pub struct Config {
    /// INI configuration storage
    ini: Ini,

    /// Where this config was read from (or would be written to)
    path: PathBuf,
}

impl Config {
    /// Load configuration from ~/.ttsdiag.cfg, or use defaults
    pub fn load() -> Result<Self> {
        Self::load_from(Self::config_path())
    }

    /// Load configuration from a specific file, or use defaults if it is absent
    pub fn load_from(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        debug!("Loading config from {:?}", path);

        let ini = if path.exists() {
            Ini::load_from_file(&path)
                .map_err(|e| DiagError::IniParse(format!("Failed to load config: {}", e)))?
        } else {
            info!("Config file not found, using defaults");
            Self::default_config()
        };

        Ok(Self { ini, path })
    }

    /// Built-in defaults, bound to `path` for a later [`Config::save`]
    pub fn defaults_at(path: impl Into<PathBuf>) -> Self {
        Self {
            ini: Self::default_config(),
            path: path.into(),
        }
    }

    /// Build a config from INI text, for callers that already hold the contents
    pub fn from_ini_str(contents: &str) -> Result<Self> {
        let ini = Ini::load_from_str(contents)
            .map_err(|e| DiagError::IniParse(format!("Failed to parse config: {}", e)))?;
        Ok(Self {
            ini,
            path: Self::config_path(),
        })
    }

    /// Save configuration to disk
    pub fn save(&self) -> Result<()> {
        debug!("Saving config to {:?}", self.path);
        self.ini
            .write_to_file(&self.path)
            .map_err(|e| DiagError::Config(format!("Failed to save config: {}", e)))
    }

    /// Get config file path (~/.ttsdiag.cfg)
    fn config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(CONFIG_FILE_NAME)
    }

    /// Expose the config file path for display
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create default configuration
    fn default_config() -> Ini {
        let mut ini = Ini::new();

        ini.with_section(Some("synthesis"))
            .set("tool", "edge-tts")
            .set("local_tool", "./python_env/bin/edge-tts")
            .set("text", "测试金钱卦应用的语音功能")
            .set("voice", "zh-CN-YunxiNeural")
            .set("suffix", ".mp3")
            .set("timeout_secs", "30");

        ini.with_section(Some("playback"))
            .set("players", DEFAULT_PLAYERS)
            .set("timeout_secs", "10");

        ini.with_section(Some("engines"))
            .set("espeak_voice", "zh")
            .set("espeak_text", "测试系统语音")
            .set("festival_text", "Hello world")
            .set("timeout_secs", "10");

        ini.with_section(Some("system"))
            .set("query_timeout_secs", "10");

        ini.with_section(Some("guide"))
            .set("process_name", "money_gua")
            .set("output", "TTS_TEST_GUIDE.md");

        ini
    }

    /// Get a string value from config
    pub fn get_string(&self, section: &str, key: &str, default: &str) -> String {
        self.ini
            .get_from(Some(section), key)
            .unwrap_or(default)
            .to_string()
    }

    /// Get an unsigned integer value from config
    pub fn get_u64(&self, section: &str, key: &str, default: u64) -> u64 {
        self.ini
            .get_from(Some(section), key)
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(default)
    }

    /// Set a value in config
    pub fn set(&mut self, section: &str, key: &str, value: &str) {
        self.ini.with_section(Some(section)).set(key, value);
    }

    fn get_secs(&self, section: &str, key: &str, default: u64) -> Duration {
        Duration::from_secs(self.get_u64(section, key, default))
    }

    // Synthesis

    /// Name of the synthesis tool looked up on PATH
    pub fn tool_name(&self) -> String {
        self.get_string("synthesis", "tool", "edge-tts")
    }

    /// Bundled copy of the synthesis tool, preferred over PATH
    pub fn local_tool(&self) -> PathBuf {
        PathBuf::from(self.get_string("synthesis", "local_tool", "./python_env/bin/edge-tts"))
    }

    /// Phrase sent to the synthesis tool
    pub fn synthesis_text(&self) -> String {
        self.get_string("synthesis", "text", "测试金钱卦应用的语音功能")
    }

    /// Voice identifier passed to the synthesis tool
    pub fn voice(&self) -> String {
        self.get_string("synthesis", "voice", "zh-CN-YunxiNeural")
    }

    /// File suffix for the temporary audio file
    pub fn media_suffix(&self) -> String {
        self.get_string("synthesis", "suffix", ".mp3")
    }

    pub fn synthesis_timeout(&self) -> Duration {
        self.get_secs("synthesis", "timeout_secs", 30)
    }

    // Playback

    /// Player commands in the order they are tried
    ///
    /// Comma-separated; each entry is a program followed by its arguments.
    /// The audio file path is appended when the player runs.
    pub fn players(&self) -> Vec<CommandLine> {
        self.get_string("playback", "players", DEFAULT_PLAYERS)
            .split(',')
            .filter_map(CommandLine::parse)
            .collect()
    }

    pub fn playback_timeout(&self) -> Duration {
        self.get_secs("playback", "timeout_secs", 10)
    }

    // System speech engines

    pub fn espeak_voice(&self) -> String {
        self.get_string("engines", "espeak_voice", "zh")
    }

    pub fn espeak_text(&self) -> String {
        self.get_string("engines", "espeak_text", "测试系统语音")
    }

    pub fn festival_text(&self) -> String {
        self.get_string("engines", "festival_text", "Hello world")
    }

    pub fn engine_timeout(&self) -> Duration {
        self.get_secs("engines", "timeout_secs", 10)
    }

    /// Timeout for housekeeping queries (which, ps, pactl)
    pub fn query_timeout(&self) -> Duration {
        self.get_secs("system", "query_timeout_secs", 10)
    }

    // Guide

    /// Substring identifying the application in `ps aux` output
    pub fn process_name(&self) -> String {
        self.get_string("guide", "process_name", "money_gua")
    }

    /// Where the troubleshooting guide is written, relative to the workdir
    pub fn guide_output(&self) -> PathBuf {
        PathBuf::from(self.get_string("guide", "output", "TTS_TEST_GUIDE.md"))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ini: Self::default_config(),
            path: Self::config_path(),
        }
    }
}
