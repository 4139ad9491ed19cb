use super::*;
use tokio::sync::RwLock;

/// In-process challenge store. Used when no remote project is configured
/// and as the store behind the tests.
#[derive(Default)]
pub struct MemoryStore {
    challenges: RwLock<Vec<Challenge>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with existing rows, e.g. fixtures in tests
    pub fn with_challenges(challenges: Vec<Challenge>) -> Self {
        Self {
            challenges: RwLock::new(challenges),
        }
    }
}

#[async_trait]
impl ChallengeStore for MemoryStore {
    async fn list_all(&self) -> StoreResult<Vec<Challenge>> {
        let mut challenges = self.challenges.read().await.clone();
        // Stable sort keeps insertion order for equal dates
        challenges.sort_by_key(|c| c.date);
        Ok(challenges)
    }

    async fn insert(&self, draft: NewChallenge) -> StoreResult<()> {
        let challenge = Challenge {
            id: ulid::Ulid::new().to_string(),
            text: draft.text,
            points: draft.points,
            author: draft.author,
            date: draft.date,
            status: draft.status,
            player: draft.player,
        };
        self.challenges.write().await.push(challenge);
        Ok(())
    }

    async fn update_status(
        &self,
        id: &str,
        status: ChallengeStatus,
        player: &str,
    ) -> StoreResult<()> {
        let mut challenges = self.challenges.write().await;
        let challenge = challenges
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;

        challenge.status = Some(status);
        challenge.player = Some(player.to_string());
        Ok(())
    }

    fn name(&self) -> &str {
        "memory"
    }
}
