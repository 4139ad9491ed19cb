use super::{ActionError, AppState};
use crate::draw::DrawPhase;
use crate::leaderboard::{leaderboard, LeaderboardEntry};
use crate::store::StoreError;
use crate::submission::ChallengeForm;
use crate::types::*;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A challenge as shown in the full list
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChallengeRow {
    pub id: ChallengeId,
    pub text: String,
    pub points: u8,
    pub author: String,
    pub date: DateTime<Utc>,
    pub status: Option<ChallengeStatus>,
    pub status_label: String,
    pub player: Option<String>,
}

impl From<&Challenge> for ChallengeRow {
    fn from(challenge: &Challenge) -> Self {
        Self {
            id: challenge.id.clone(),
            text: challenge.text.clone(),
            points: challenge.points,
            author: challenge.author.clone(),
            date: challenge.date,
            status: challenge.status,
            status_label: challenge.status_label().to_string(),
            player: challenge.player.clone(),
        }
    }
}

impl AppState {
    /// Re-fetch all challenges and replace the snapshot. On failure the
    /// previous snapshot stays in place.
    pub async fn refresh(&self) -> Result<Vec<Challenge>, StoreError> {
        match self.store.list_all().await {
            Ok(challenges) => {
                tracing::debug!(
                    "Loaded {} challenges from {}",
                    challenges.len(),
                    self.store.name()
                );
                *self.snapshot.write().await = challenges.clone();
                Ok(challenges)
            }
            Err(e) => {
                tracing::error!("Failed to load challenges: {}", e);
                Err(e)
            }
        }
    }

    pub async fn get_challenges(&self) -> Vec<Challenge> {
        self.snapshot.read().await.clone()
    }

    pub async fn challenge_rows(&self) -> Vec<ChallengeRow> {
        self.snapshot
            .read()
            .await
            .iter()
            .map(ChallengeRow::from)
            .collect()
    }

    /// Leaderboard over the current snapshot, configured players first
    pub async fn get_leaderboard(&self) -> Vec<LeaderboardEntry> {
        leaderboard(&self.snapshot.read().await, &self.config.players)
    }

    /// Validate the form and insert a new challenge. The form stays with the
    /// caller on any error; on success the form panel is closed.
    pub async fn submit_challenge(&self, form: &ChallengeForm) -> Result<(), ActionError> {
        let draft = form.validate()?;

        let _guard = self.begin_submission().ok_or(ActionError::Busy)?;

        tracing::info!(
            "Submitting challenge by {} worth {} points",
            draft.author,
            draft.points
        );

        if let Err(e) = self.store.insert(draft).await {
            tracing::error!("Failed to save challenge: {}", e);
            return Err(e.into());
        }

        if self.refresh().await.is_err() {
            tracing::warn!("Challenge saved, but the list stays stale until the next refresh");
        }
        self.view.write().await.show_form = false;
        Ok(())
    }

    /// Resolve a challenge straight from the full list, bypassing the draw
    pub async fn mark_challenge(
        &self,
        challenge_id: &str,
        status: ChallengeStatus,
        player: &str,
    ) -> Result<(), ActionError> {
        if !self.config.is_player(player) {
            return Err(ActionError::UnknownPlayer(player.to_string()));
        }

        // The drawn challenge is resolved through the draw only
        if let DrawPhase::Result { challenge, .. } = &*self.draw.read().await {
            if challenge.id == challenge_id {
                return Err(ActionError::PendingDraw(challenge_id.to_string()));
            }
        }

        let already_resolved = self
            .snapshot
            .read()
            .await
            .iter()
            .any(|c| c.id == challenge_id && !c.is_drawable());
        if already_resolved {
            return Err(ActionError::AlreadyResolved(challenge_id.to_string()));
        }

        tracing::info!(
            "Marking challenge {} as {:?} for {}",
            challenge_id,
            status,
            player
        );

        if let Err(e) = self.store.update_status(challenge_id, status, player).await {
            tracing::error!("Failed to update challenge {}: {}", challenge_id, e);
            return Err(e.into());
        }

        if self.refresh().await.is_err() {
            tracing::warn!(
                "Challenge {} updated, but the list stays stale until the next refresh",
                challenge_id
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{ChallengeStore, MemoryStore};
    use std::sync::Arc;

    async fn state_with(texts: &[(&str, u8)]) -> (AppState, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        for (text, points) in texts {
            store
                .insert(NewChallenge::new(text.to_string(), *points, "Paul".to_string()))
                .await
                .unwrap();
        }
        let state = AppState::new(store.clone(), GameConfig::default());
        state.refresh().await.unwrap();
        (state, store)
    }

    #[tokio::test]
    async fn test_refresh_replaces_snapshot() {
        let (state, store) = state_with(&[("A", 1)]).await;
        assert_eq!(state.get_challenges().await.len(), 1);

        store
            .insert(NewChallenge::new("B".to_string(), 2, "Marcel".to_string()))
            .await
            .unwrap();
        assert_eq!(state.get_challenges().await.len(), 1);

        state.refresh().await.unwrap();
        assert_eq!(state.get_challenges().await.len(), 2);
    }

    #[tokio::test]
    async fn test_submit_round_trip() {
        let (state, _store) = state_with(&[]).await;
        state.toggle_show_form().await;

        state
            .submit_challenge(&ChallengeForm::new("Jump in a lake", "Paul", "3"))
            .await
            .unwrap();

        let challenges = state.get_challenges().await;
        assert_eq!(challenges.len(), 1);
        let c = &challenges[0];
        assert_eq!(c.text, "Jump in a lake");
        assert_eq!(c.author, "Paul");
        assert_eq!(c.points, 3);
        assert!(c.status.is_none());
        assert!(c.player.is_none());
        assert!(!state.get_view().await.show_form);
    }

    #[tokio::test]
    async fn test_invalid_form_never_reaches_store() {
        let (state, store) = state_with(&[]).await;
        state.toggle_show_form().await;

        for points in ["0", "6"] {
            let result = state
                .submit_challenge(&ChallengeForm::new("Dance", "Paul", points))
                .await;
            assert!(matches!(result, Err(ActionError::Validation(_))));
        }

        assert!(store.list_all().await.unwrap().is_empty());
        assert!(state.get_view().await.show_form);
    }

    #[tokio::test]
    async fn test_mark_challenge() {
        let (state, _store) = state_with(&[("A", 4)]).await;
        let id = state.get_challenges().await[0].id.clone();

        state
            .mark_challenge(&id, ChallengeStatus::Done, "Paul")
            .await
            .unwrap();

        let c = &state.get_challenges().await[0];
        assert_eq!(c.status, Some(ChallengeStatus::Done));
        assert_eq!(c.player.as_deref(), Some("Paul"));

        let board = state.get_leaderboard().await;
        assert_eq!(board[0].player, "Paul");
        assert_eq!(board[0].points, 4);

        let again = state
            .mark_challenge(&id, ChallengeStatus::Failed, "Paul")
            .await;
        assert!(matches!(again, Err(ActionError::AlreadyResolved(_))));
    }

    #[tokio::test]
    async fn test_mark_requires_known_player_and_id() {
        let (state, _store) = state_with(&[("A", 4)]).await;
        let id = state.get_challenges().await[0].id.clone();

        let result = state
            .mark_challenge(&id, ChallengeStatus::Done, "Mallory")
            .await;
        assert!(matches!(result, Err(ActionError::UnknownPlayer(_))));

        let result = state
            .mark_challenge("missing", ChallengeStatus::Done, "Paul")
            .await;
        assert_eq!(result.unwrap_err().code(), "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_mark_refuses_challenge_held_by_draw() {
        let (state, store) = state_with(&[("A", 2)]).await;
        state.start_draw().await.unwrap();
        state.choose_player("Marcel").await.unwrap();
        state.choose_points(2).await.unwrap();
        state.submit_code("0301").await.unwrap();
        let id = state.get_challenges().await[0].id.clone();

        let err = state
            .mark_challenge(&id, ChallengeStatus::Done, "Paul")
            .await
            .unwrap_err();
        assert_eq!(err.code(), "BUSY");
        assert!(store.list_all().await.unwrap()[0].is_drawable());

        // The draw still owns the outcome
        state.resolve_draw(ChallengeStatus::Failed).await.unwrap();
        let c = &store.list_all().await.unwrap()[0];
        assert_eq!(c.status, Some(ChallengeStatus::Failed));
        assert_eq!(c.player.as_deref(), Some("Marcel"));
    }

    #[tokio::test]
    async fn test_rows_carry_labels() {
        let (state, _store) = state_with(&[("A", 1)]).await;
        let rows = state.challenge_rows().await;
        assert_eq!(rows[0].status_label, "Offen");
        assert_eq!(rows[0].player, None);
    }
}
