//! Message dispatch
//!
//! Maps every user action to the matching `AppState` operation and turns
//! the result into a single reply.

use crate::draw::{CodeOutcome, DrawPhase};
use crate::protocol::{ClientMessage, ServerMessage};
use crate::state::{ActionError, AppState};
use crate::submission::ChallengeForm;
use std::sync::Arc;

fn error_message(e: &ActionError) -> ServerMessage {
    ServerMessage::Error {
        code: e.code().to_string(),
        msg: e.to_string(),
    }
}

/// Handle one client action and return the reply
pub async fn handle_message(msg: ClientMessage, state: &Arc<AppState>) -> ServerMessage {
    match msg {
        ClientMessage::Refresh => match state.refresh().await {
            Ok(_) => challenges_message(state).await,
            Err(e) => error_message(&ActionError::from(e)),
        },

        ClientMessage::ToggleShowAll => ServerMessage::View {
            view: state.toggle_show_all().await,
        },

        ClientMessage::ToggleShowForm => ServerMessage::View {
            view: state.toggle_show_form().await,
        },

        ClientMessage::StartDraw => draw_reply(state.start_draw().await),

        ClientMessage::ChoosePlayer { player } => draw_reply(state.choose_player(&player).await),

        ClientMessage::ChoosePoints { points } => draw_reply(state.choose_points(points).await),

        ClientMessage::SubmitCode { code } => handle_submit_code(state, &code).await,

        ClientMessage::ResolveDraw { status } => match state.resolve_draw(status).await {
            Ok(resolution) => ServerMessage::ChallengeResolved {
                challenge_id: resolution.challenge_id,
                status: resolution.status,
                player: resolution.player,
                leaderboard: state.get_leaderboard().await,
            },
            Err(e) => error_message(&e),
        },

        ClientMessage::CancelDraw => draw_reply(state.cancel_draw().await),

        ClientMessage::MarkChallenge {
            challenge_id,
            status,
            player,
        } => match state.mark_challenge(&challenge_id, status, &player).await {
            Ok(()) => ServerMessage::ChallengeResolved {
                challenge_id,
                status,
                player,
                leaderboard: state.get_leaderboard().await,
            },
            Err(e) => error_message(&e),
        },

        ClientMessage::SubmitChallenge { form } => handle_submit_challenge(state, form).await,
    }
}

fn draw_reply(result: Result<DrawPhase, ActionError>) -> ServerMessage {
    match result {
        Ok(draw) => ServerMessage::Draw { draw },
        Err(e) => error_message(&e),
    }
}

async fn challenges_message(state: &Arc<AppState>) -> ServerMessage {
    ServerMessage::Challenges {
        challenges: state.challenge_rows().await,
        leaderboard: state.get_leaderboard().await,
    }
}

async fn handle_submit_code(state: &Arc<AppState>, code: &str) -> ServerMessage {
    match state.submit_code(code).await {
        Ok(CodeOutcome::Drawn { player, challenge }) => {
            ServerMessage::ChallengeDrawn { player, challenge }
        }
        Ok(CodeOutcome::NoMatch { points }) => ServerMessage::NoMatchingChallenge {
            points,
            msg: format!("Keine offene Challenge mit {} Punkten gefunden.", points),
        },
        Ok(CodeOutcome::Rejected) => ServerMessage::Draw {
            draw: state.get_draw().await,
        },
        Err(e) => error_message(&e),
    }
}

async fn handle_submit_challenge(state: &Arc<AppState>, form: ChallengeForm) -> ServerMessage {
    match state.submit_challenge(&form).await {
        Ok(()) => ServerMessage::ChallengeSubmitted {
            form: ChallengeForm::default(),
            leaderboard: state.get_leaderboard().await,
        },
        Err(ActionError::Validation(e)) => ServerMessage::FormRejected {
            form,
            msg: e.to_string(),
        },
        Err(e) => error_message(&e),
    }
}
