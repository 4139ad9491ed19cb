// Public API for integration tests and potential library usage

pub mod api;
pub mod draw;
pub mod handlers;
pub mod leaderboard;
pub mod protocol;
pub mod state;
pub mod store;
pub mod submission;
pub mod types;
