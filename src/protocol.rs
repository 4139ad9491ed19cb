use crate::draw::DrawPhase;
use crate::leaderboard::LeaderboardEntry;
use crate::state::{ChallengeRow, ViewState};
use crate::submission::ChallengeForm;
use crate::types::*;
use serde::{Deserialize, Serialize};

/// User actions sent by the page
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "t", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Re-fetch all challenges from the store
    Refresh,
    ToggleShowAll,
    ToggleShowForm,
    StartDraw,
    ChoosePlayer {
        player: String,
    },
    ChoosePoints {
        points: u8,
    },
    SubmitCode {
        code: String,
    },
    /// Mark the drawn challenge done or failed
    ResolveDraw {
        status: ChallengeStatus,
    },
    CancelDraw,
    /// Mark a challenge straight from the full list, without a draw
    MarkChallenge {
        challenge_id: ChallengeId,
        status: ChallengeStatus,
        player: String,
    },
    SubmitChallenge {
        form: ChallengeForm,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "t", rename_all = "snake_case")]
pub enum ServerMessage {
    Challenges {
        challenges: Vec<ChallengeRow>,
        leaderboard: Vec<LeaderboardEntry>,
    },
    View {
        view: ViewState,
    },
    /// Current draw step. A rejected code answers with `Idle` and nothing else.
    Draw {
        draw: DrawPhase,
    },
    ChallengeDrawn {
        player: String,
        challenge: Challenge,
    },
    NoMatchingChallenge {
        points: u8,
        msg: String,
    },
    ChallengeResolved {
        challenge_id: ChallengeId,
        status: ChallengeStatus,
        player: String,
        leaderboard: Vec<LeaderboardEntry>,
    },
    /// The form was saved; `form` is the cleared form to show next
    ChallengeSubmitted {
        form: ChallengeForm,
        leaderboard: Vec<LeaderboardEntry>,
    },
    /// Validation failed; `form` is handed back untouched
    FormRejected {
        form: ChallengeForm,
        msg: String,
    },
    Error {
        code: String,
        msg: String,
    },
}
