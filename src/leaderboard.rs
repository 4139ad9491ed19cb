use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use crate::types::{Challenge, ChallengeStatus};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LeaderboardEntry {
    pub player: String,
    pub points: u32,
}

/// Completed points per player name, summed over the snapshot
pub fn completed_points(snapshot: &[Challenge]) -> HashMap<String, u32> {
    let mut totals: HashMap<String, u32> = HashMap::new();
    for challenge in snapshot {
        if challenge.status != Some(ChallengeStatus::Done) {
            continue;
        }
        if let Some(player) = &challenge.player {
            *totals.entry(player.clone()).or_insert(0) += u32::from(challenge.points);
        }
    }
    totals
}

/// Total for one player, 0 when they have nothing completed
pub fn total_for(snapshot: &[Challenge], player: &str) -> u32 {
    completed_points(snapshot).get(player).copied().unwrap_or(0)
}

/// Leaderboard rows: the given players first, in the given order and with 0
/// when absent, then anyone else who scored, by name.
pub fn leaderboard(snapshot: &[Challenge], players: &[String]) -> Vec<LeaderboardEntry> {
    let mut totals = completed_points(snapshot);

    let mut entries: Vec<LeaderboardEntry> = players
        .iter()
        .map(|player| LeaderboardEntry {
            player: player.clone(),
            points: totals.remove(player).unwrap_or(0),
        })
        .collect();

    let others: BTreeMap<String, u32> = totals.into_iter().collect();
    entries.extend(
        others
            .into_iter()
            .map(|(player, points)| LeaderboardEntry { player, points }),
    );
    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn challenge(points: u8, status: Option<ChallengeStatus>, player: Option<&str>) -> Challenge {
        Challenge {
            id: ulid::Ulid::new().to_string(),
            text: "test".to_string(),
            points,
            author: "Paul".to_string(),
            date: Utc::now(),
            status,
            player: player.map(str::to_string),
        }
    }

    fn players() -> Vec<String> {
        vec!["Paul".to_string(), "Marcel".to_string()]
    }

    #[test]
    fn test_only_done_counts() {
        let snapshot = vec![
            challenge(3, Some(ChallengeStatus::Done), Some("Paul")),
            challenge(5, Some(ChallengeStatus::Failed), Some("Paul")),
            challenge(2, Some(ChallengeStatus::Done), Some("Marcel")),
            challenge(4, Some(ChallengeStatus::Done), Some("Paul")),
            challenge(1, None, None),
        ];

        assert_eq!(total_for(&snapshot, "Paul"), 7);
        assert_eq!(total_for(&snapshot, "Marcel"), 2);
    }

    #[test]
    fn test_done_without_player_ignored() {
        let snapshot = vec![challenge(5, Some(ChallengeStatus::Done), None)];
        assert!(completed_points(&snapshot).is_empty());
    }

    #[test]
    fn test_missing_players_report_zero() {
        let board = leaderboard(&[], &players());
        assert_eq!(
            board,
            vec![
                LeaderboardEntry {
                    player: "Paul".to_string(),
                    points: 0
                },
                LeaderboardEntry {
                    player: "Marcel".to_string(),
                    points: 0
                },
            ]
        );
        assert_eq!(total_for(&[], "Nobody"), 0);
    }

    #[test]
    fn test_unlisted_players_appended_by_name() {
        let snapshot = vec![
            challenge(1, Some(ChallengeStatus::Done), Some("Zoe")),
            challenge(2, Some(ChallengeStatus::Done), Some("Anna")),
            challenge(3, Some(ChallengeStatus::Done), Some("Marcel")),
        ];
        let names: Vec<_> = leaderboard(&snapshot, &players())
            .into_iter()
            .map(|e| (e.player, e.points))
            .collect();
        assert_eq!(
            names,
            vec![
                ("Paul".to_string(), 0),
                ("Marcel".to_string(), 3),
                ("Anna".to_string(), 2),
                ("Zoe".to_string(), 1),
            ]
        );
    }

    #[test]
    fn test_recompute_is_stable_and_open_challenges_do_not_change_totals() {
        let mut snapshot = vec![
            challenge(3, Some(ChallengeStatus::Done), Some("Paul")),
            challenge(2, Some(ChallengeStatus::Done), Some("Marcel")),
        ];
        let first = leaderboard(&snapshot, &players());
        assert_eq!(first, leaderboard(&snapshot, &players()));

        snapshot.push(challenge(5, None, None));
        assert_eq!(first, leaderboard(&snapshot, &players()));
    }
}
