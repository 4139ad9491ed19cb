mod challenges;
mod draw;

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

use crate::draw::{DrawError, DrawPhase};
use crate::leaderboard::LeaderboardEntry;
use crate::store::{ChallengeStore, MemoryStore, StoreError};
use crate::submission::ValidationError;
use crate::types::*;

pub use challenges::ChallengeRow;
pub use draw::DrawResolution;

/// Which panels of the page are open
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct ViewState {
    pub show_all: bool,
    pub show_form: bool,
}

/// Everything the page needs to render, derived from the current snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppView {
    pub view: ViewState,
    pub draw: DrawPhase,
    pub players: Vec<String>,
    pub leaderboard: Vec<LeaderboardEntry>,
    /// Only filled while the full list is shown
    pub challenges: Option<Vec<ChallengeRow>>,
}

/// Errors returned by state operations. Each maps to a stable client code.
#[derive(Debug, thiserror::Error)]
pub enum ActionError {
    #[error(transparent)]
    Draw(#[from] DrawError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Unknown player: {0}")]
    UnknownPlayer(String),

    #[error("Challenge {0} is already resolved")]
    AlreadyResolved(ChallengeId),

    #[error("Challenge {0} is waiting for its draw result")]
    PendingDraw(ChallengeId),

    #[error("A submission is already in progress")]
    Busy,
}

impl ActionError {
    pub fn code(&self) -> &'static str {
        match self {
            ActionError::Draw(e) => e.code(),
            ActionError::Validation(_) => "VALIDATION_FAILED",
            ActionError::Store(StoreError::NotFound(_)) => "NOT_FOUND",
            ActionError::Store(_) => "STORE_ERROR",
            ActionError::UnknownPlayer(_) => "UNKNOWN_PLAYER",
            ActionError::AlreadyResolved(_) => "ALREADY_RESOLVED",
            ActionError::PendingDraw(_) | ActionError::Busy => "BUSY",
        }
    }
}

/// Shared application state.
///
/// The snapshot is a cache of the store, replaced wholesale after every
/// successful list. The store stays the only authority.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ChallengeStore>,
    pub config: Arc<GameConfig>,
    pub snapshot: Arc<RwLock<Vec<Challenge>>>,
    pub draw: Arc<RwLock<DrawPhase>>,
    pub view: Arc<RwLock<ViewState>>,
    rng: Arc<Mutex<StdRng>>,
    /// Set while a form submission waits for the store
    submitting: Arc<AtomicBool>,
}

impl AppState {
    pub fn new(store: Arc<dyn ChallengeStore>, config: GameConfig) -> Self {
        Self::with_rng(store, config, StdRng::from_os_rng())
    }

    /// Deterministic draws, for tests
    pub fn with_seed(store: Arc<dyn ChallengeStore>, config: GameConfig, seed: u64) -> Self {
        Self::with_rng(store, config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(store: Arc<dyn ChallengeStore>, config: GameConfig, rng: StdRng) -> Self {
        Self {
            store,
            config: Arc::new(config),
            snapshot: Arc::new(RwLock::new(Vec::new())),
            draw: Arc::new(RwLock::new(DrawPhase::Idle)),
            view: Arc::new(RwLock::new(ViewState::default())),
            rng: Arc::new(Mutex::new(rng)),
            submitting: Arc::new(AtomicBool::new(false)),
        }
    }

    pub async fn get_view(&self) -> ViewState {
        *self.view.read().await
    }

    pub async fn toggle_show_all(&self) -> ViewState {
        let mut view = self.view.write().await;
        view.show_all = !view.show_all;
        *view
    }

    pub async fn toggle_show_form(&self) -> ViewState {
        let mut view = self.view.write().await;
        view.show_form = !view.show_form;
        *view
    }

    /// Full render state
    pub async fn app_view(&self) -> AppView {
        let view = self.get_view().await;
        let challenges = if view.show_all {
            Some(self.challenge_rows().await)
        } else {
            None
        };

        AppView {
            view,
            draw: self.get_draw().await,
            players: self.config.players.clone(),
            leaderboard: self.get_leaderboard().await,
            challenges,
        }
    }

    /// Claim the submission slot. Released when the guard drops.
    fn begin_submission(&self) -> Option<SubmissionGuard> {
        self.submitting
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| SubmissionGuard(self.submitting.clone()))
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(Arc::new(MemoryStore::new()), GameConfig::default())
    }
}

struct SubmissionGuard(Arc<AtomicBool>);

impl Drop for SubmissionGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}
