//! Draw workflow
//!
//! A draw walks through `Idle -> ChoosingPlayer -> ChoosingPoints ->
//! EnteringCode -> Result -> Idle`. Every step is a pure function from the
//! current phase to the next one; the store is only touched by the caller,
//! once when the outcome of a drawn challenge is committed.

use rand::seq::IndexedRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::types::{Challenge, ChallengeId, GameConfig, MAX_POINTS, MIN_POINTS};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum DrawPhase {
    #[default]
    Idle,
    ChoosingPlayer,
    ChoosingPoints {
        player: String,
    },
    EnteringCode {
        player: String,
        points: u8,
    },
    /// A challenge is bound to the player and waits for done/failed.
    /// `committing` is set while the outcome is being written to the store.
    Result {
        player: String,
        challenge: Challenge,
        committing: bool,
    },
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DrawError {
    #[error("Cannot {action} while {phase}")]
    InvalidTransition {
        action: &'static str,
        phase: &'static str,
    },

    #[error("Unknown player: {0}")]
    UnknownPlayer(String),

    #[error("Punkte müssen zwischen 1 und 5 liegen.")]
    InvalidPoints(u8),

    #[error("Outcome is already being saved")]
    Busy,
}

impl DrawError {
    /// Stable error code for clients
    pub fn code(&self) -> &'static str {
        match self {
            DrawError::InvalidTransition { .. } => "INVALID_TRANSITION",
            DrawError::UnknownPlayer(_) => "UNKNOWN_PLAYER",
            DrawError::InvalidPoints(_) => "INVALID_POINTS",
            DrawError::Busy => "BUSY",
        }
    }
}

/// What submitting the code led to
#[derive(Debug, Clone, PartialEq)]
pub enum CodeOutcome {
    /// Code accepted and a challenge was bound to the player
    Drawn { player: String, challenge: Challenge },
    /// Code accepted but nothing open at that point value
    NoMatch { points: u8 },
    /// Wrong code, silently back to idle
    Rejected,
}

/// The outcome commit the caller has to send to the store
#[derive(Debug, Clone, PartialEq)]
pub struct PendingCommit {
    pub challenge_id: ChallengeId,
    pub player: String,
    pub points: u8,
}

impl DrawPhase {
    pub fn name(&self) -> &'static str {
        match self {
            DrawPhase::Idle => "idle",
            DrawPhase::ChoosingPlayer => "choosing_player",
            DrawPhase::ChoosingPoints { .. } => "choosing_points",
            DrawPhase::EnteringCode { .. } => "entering_code",
            DrawPhase::Result { .. } => "result",
        }
    }

    fn invalid(&self, action: &'static str) -> DrawError {
        DrawError::InvalidTransition {
            action,
            phase: self.name(),
        }
    }

    /// Idle -> ChoosingPlayer
    pub fn start(&self) -> Result<DrawPhase, DrawError> {
        match self {
            DrawPhase::Idle => Ok(DrawPhase::ChoosingPlayer),
            _ => Err(self.invalid("start a draw")),
        }
    }

    /// ChoosingPlayer -> ChoosingPoints
    pub fn choose_player(&self, config: &GameConfig, player: &str) -> Result<DrawPhase, DrawError> {
        match self {
            DrawPhase::ChoosingPlayer => {
                if !config.is_player(player) {
                    return Err(DrawError::UnknownPlayer(player.to_string()));
                }
                Ok(DrawPhase::ChoosingPoints {
                    player: player.to_string(),
                })
            }
            _ => Err(self.invalid("choose a player")),
        }
    }

    /// ChoosingPoints -> EnteringCode
    pub fn choose_points(&self, points: u8) -> Result<DrawPhase, DrawError> {
        match self {
            DrawPhase::ChoosingPoints { player } => {
                if !(MIN_POINTS..=MAX_POINTS).contains(&points) {
                    return Err(DrawError::InvalidPoints(points));
                }
                Ok(DrawPhase::EnteringCode {
                    player: player.clone(),
                    points,
                })
            }
            _ => Err(self.invalid("choose points")),
        }
    }

    /// EnteringCode -> Result, or back to Idle on a wrong code or an empty
    /// candidate pool. The snapshot is only read when the code matches.
    pub fn submit_code<R: Rng + ?Sized>(
        &self,
        config: &GameConfig,
        code: &str,
        snapshot: &[Challenge],
        rng: &mut R,
    ) -> Result<(DrawPhase, CodeOutcome), DrawError> {
        let DrawPhase::EnteringCode { player, points } = self else {
            return Err(self.invalid("enter the code"));
        };

        if !config.code_matches(code) {
            return Ok((DrawPhase::Idle, CodeOutcome::Rejected));
        }

        match pick_candidate(snapshot, *points, rng) {
            Some(challenge) => Ok((
                DrawPhase::Result {
                    player: player.clone(),
                    challenge: challenge.clone(),
                    committing: false,
                },
                CodeOutcome::Drawn {
                    player: player.clone(),
                    challenge: challenge.clone(),
                },
            )),
            None => Ok((DrawPhase::Idle, CodeOutcome::NoMatch { points: *points })),
        }
    }

    /// Mark the pending challenge as being committed. Returns the commit to
    /// send and the phase to hold while it is in flight.
    pub fn begin_commit(&self) -> Result<(DrawPhase, PendingCommit), DrawError> {
        match self {
            DrawPhase::Result {
                committing: true, ..
            } => Err(DrawError::Busy),
            DrawPhase::Result {
                player, challenge, ..
            } => Ok((
                DrawPhase::Result {
                    player: player.clone(),
                    challenge: challenge.clone(),
                    committing: true,
                },
                PendingCommit {
                    challenge_id: challenge.id.clone(),
                    player: player.clone(),
                    points: challenge.points,
                },
            )),
            _ => Err(self.invalid("resolve a challenge")),
        }
    }

    /// The commit failed: keep presenting the challenge so the outcome can
    /// be sent again.
    pub fn abort_commit(&self) -> DrawPhase {
        match self {
            DrawPhase::Result {
                player, challenge, ..
            } => DrawPhase::Result {
                player: player.clone(),
                challenge: challenge.clone(),
                committing: false,
            },
            other => other.clone(),
        }
    }

    /// Back to Idle from any step, except while an outcome is being saved
    pub fn cancel(&self) -> Result<DrawPhase, DrawError> {
        match self {
            DrawPhase::Result {
                committing: true, ..
            } => Err(DrawError::Busy),
            _ => Ok(DrawPhase::Idle),
        }
    }
}

/// Open challenges worth exactly `points`
pub fn candidates(snapshot: &[Challenge], points: u8) -> Vec<&Challenge> {
    snapshot
        .iter()
        .filter(|c| c.is_drawable() && c.points == points)
        .collect()
}

/// Uniformly random pick from the candidate pool
pub fn pick_candidate<'a, R: Rng + ?Sized>(
    snapshot: &'a [Challenge],
    points: u8,
    rng: &mut R,
) -> Option<&'a Challenge> {
    candidates(snapshot, points).choose(rng).copied()
}
