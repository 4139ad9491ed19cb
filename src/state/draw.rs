use super::{ActionError, AppState};
use crate::draw::{CodeOutcome, DrawPhase};
use crate::types::*;
use serde::{Deserialize, Serialize};

/// Outcome of a committed draw
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DrawResolution {
    pub challenge_id: ChallengeId,
    pub status: ChallengeStatus,
    pub player: String,
    pub points: u8,
}

impl AppState {
    pub async fn get_draw(&self) -> DrawPhase {
        self.draw.read().await.clone()
    }

    pub async fn start_draw(&self) -> Result<DrawPhase, ActionError> {
        let mut draw = self.draw.write().await;
        *draw = draw.start()?;
        Ok(draw.clone())
    }

    pub async fn choose_player(&self, player: &str) -> Result<DrawPhase, ActionError> {
        let mut draw = self.draw.write().await;
        *draw = draw.choose_player(&self.config, player)?;
        Ok(draw.clone())
    }

    pub async fn choose_points(&self, points: u8) -> Result<DrawPhase, ActionError> {
        let mut draw = self.draw.write().await;
        *draw = draw.choose_points(points)?;
        Ok(draw.clone())
    }

    /// Check the code and, if it matches, draw from the current snapshot.
    /// No store call happens here.
    pub async fn submit_code(&self, code: &str) -> Result<CodeOutcome, ActionError> {
        let mut draw = self.draw.write().await;
        let snapshot = self.snapshot.read().await;
        let mut rng = self.rng.lock().await;

        let (next, outcome) = draw.submit_code(&self.config, code, &snapshot, &mut *rng)?;
        *draw = next;

        match &outcome {
            CodeOutcome::Drawn { player, challenge } => {
                tracing::info!(
                    "Drew challenge {} ({} points) for {}",
                    challenge.id,
                    challenge.points,
                    player
                );
            }
            CodeOutcome::NoMatch { points } => {
                tracing::info!("No open challenge worth {} points", points);
            }
            CodeOutcome::Rejected => {
                tracing::info!("Draw code rejected");
            }
        }

        Ok(outcome)
    }

    /// Record done/failed for the drawn challenge, refresh the snapshot and
    /// go back to idle. If the store call fails the challenge stays
    /// presented so the outcome is not lost. A challenge the snapshot already
    /// shows as resolved is dropped without writing.
    pub async fn resolve_draw(&self, status: ChallengeStatus) -> Result<DrawResolution, ActionError> {
        let commit = {
            let mut draw = self.draw.write().await;

            let resolved_elsewhere = match &*draw {
                DrawPhase::Result {
                    challenge,
                    committing: false,
                    ..
                } => {
                    let snapshot = self.snapshot.read().await;
                    let resolved = snapshot
                        .iter()
                        .any(|c| c.id == challenge.id && !c.is_drawable());
                    resolved.then(|| challenge.id.clone())
                }
                _ => None,
            };
            if let Some(id) = resolved_elsewhere {
                tracing::warn!("Challenge {} was resolved elsewhere, dropping the draw", id);
                *draw = DrawPhase::Idle;
                return Err(ActionError::AlreadyResolved(id));
            }

            let (committing, commit) = draw.begin_commit()?;
            *draw = committing;
            commit
        };

        if let Err(e) = self
            .store
            .update_status(&commit.challenge_id, status, &commit.player)
            .await
        {
            tracing::error!(
                "Failed to record outcome for challenge {}: {}",
                commit.challenge_id,
                e
            );
            let mut draw = self.draw.write().await;
            *draw = draw.abort_commit();
            return Err(e.into());
        }

        if self.refresh().await.is_err() {
            tracing::warn!(
                "Outcome for challenge {} saved, but the list stays stale until the next refresh",
                commit.challenge_id
            );
        }
        *self.draw.write().await = DrawPhase::Idle;

        Ok(DrawResolution {
            challenge_id: commit.challenge_id,
            status,
            player: commit.player,
            points: commit.points,
        })
    }

    pub async fn cancel_draw(&self) -> Result<DrawPhase, ActionError> {
        let mut draw = self.draw.write().await;
        *draw = draw.cancel()?;
        Ok(draw.clone())
    }
}
