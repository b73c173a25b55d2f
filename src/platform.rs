//! Platform detection utilities

use log::debug;
use serde::Serialize;
use std::fs;
use std::path::Path;

/// PulseAudio socket exported by WSLg
pub const WSLG_PULSE_PATH: &str = "/mnt/wslg/PulseServer";

/// Detect if running in WSL (Windows Subsystem for Linux)
///
/// Checks for WSL-specific indicators in /proc/version and environment variables.
pub fn is_wsl() -> bool {
    if let Ok(contents) = fs::read_to_string("/proc/version") {
        let lower = contents.to_lowercase();
        if lower.contains("microsoft") || lower.contains("wsl") {
            return true;
        }
    }

    std::env::var("WSL_DISTRO_NAME").is_ok()
}

/// Where audio clients on this host will look for the PulseAudio server
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum PulseServerHint {
    /// PULSE_SERVER is set explicitly
    Environment { value: String },
    /// WSLg socket found but PULSE_SERVER is unset
    Wslg { path: String },
    /// WSL without a WSLg socket; clients will fail to connect
    WslMissing,
    /// Native Linux, default socket
    Default,
}

/// Work out which PulseAudio server audio clients will use
pub fn pulse_server_hint() -> PulseServerHint {
    let hint = resolve_pulse_server(
        std::env::var("PULSE_SERVER").ok(),
        Path::new(WSLG_PULSE_PATH).exists(),
        is_wsl(),
    );
    debug!("PulseAudio server hint: {:?}", hint);
    hint
}

fn resolve_pulse_server(env: Option<String>, wslg_socket: bool, wsl: bool) -> PulseServerHint {
    if let Some(value) = env.filter(|v| !v.is_empty()) {
        return PulseServerHint::Environment { value };
    }
    if wslg_socket {
        return PulseServerHint::Wslg {
            path: WSLG_PULSE_PATH.to_string(),
        };
    }
    if wsl {
        return PulseServerHint::WslMissing;
    }
    PulseServerHint::Default
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_wsl() {
        // Result depends on the host; only check it doesn't panic
        let _ = is_wsl();
    }

    #[test]
    fn test_env_wins() {
        let hint = resolve_pulse_server(Some("unix:/tmp/pulse".to_string()), true, true);
        assert_eq!(
            hint,
            PulseServerHint::Environment {
                value: "unix:/tmp/pulse".to_string()
            }
        );
    }

    #[test]
    fn test_wsl_fallbacks() {
        assert!(matches!(
            resolve_pulse_server(None, true, true),
            PulseServerHint::Wslg { .. }
        ));
        assert_eq!(
            resolve_pulse_server(Some(String::new()), false, true),
            PulseServerHint::WslMissing
        );
        assert_eq!(
            resolve_pulse_server(None, false, false),
            PulseServerHint::Default
        );
    }
}
