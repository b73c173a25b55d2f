//! Audio playback through the first available player
//!
//! Nothing here is fatal. A player that is missing or fails to start is
//! noted and the next one is tried; a player that times out ends the chain.
//! The first player that runs to completion is accepted without checking
//! its exit status or whether anything was audible.

use crate::process::{CommandLine, CommandRunner, Invocation};
use crate::DiagError;
use log::{debug, info};
use serde::Serialize;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum PlayerResult {
    Played { code: Option<i32> },
    Missing,
    TimedOut { after_secs: u64 },
    Failed { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlayerAttempt {
    pub player: String,
    pub result: PlayerResult,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PlaybackOutcome {
    Played { player: String },
    TimedOut { player: String },
    /// Every configured player was missing or failed to start
    NoPlayer,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlaybackReport {
    pub attempts: Vec<PlayerAttempt>,
    pub outcome: PlaybackOutcome,
}

/// Try each player in order on `audio`
pub fn play(
    runner: &dyn CommandRunner,
    audio: &Path,
    players: &[CommandLine],
    timeout: Duration,
) -> PlaybackReport {
    let mut attempts = Vec::new();

    for player in players {
        let invocation = Invocation::new(&player.program)
            .args(&player.args)
            .arg(audio)
            .timeout(timeout);

        let result = match runner.run(&invocation) {
            Ok(done) => PlayerResult::Played { code: done.code },
            Err(DiagError::ToolNotFound(_)) => PlayerResult::Missing,
            Err(DiagError::TimedOut { after, .. }) => PlayerResult::TimedOut {
                after_secs: after.as_secs(),
            },
            Err(e) => PlayerResult::Failed {
                reason: e.to_string(),
            },
        };
        debug!("Player {}: {:?}", player, result);

        let name = player.program.clone();
        let outcome = match &result {
            PlayerResult::Played { .. } => Some(PlaybackOutcome::Played {
                player: name.clone(),
            }),
            PlayerResult::TimedOut { .. } => Some(PlaybackOutcome::TimedOut {
                player: name.clone(),
            }),
            PlayerResult::Missing | PlayerResult::Failed { .. } => None,
        };
        attempts.push(PlayerAttempt {
            player: name,
            result,
        });

        if let Some(outcome) = outcome {
            info!("Playback finished: {:?}", outcome);
            return PlaybackReport { attempts, outcome };
        }
    }

    info!("No usable audio player among {} candidates", players.len());
    PlaybackReport {
        attempts,
        outcome: PlaybackOutcome::NoPlayer,
    }
}
