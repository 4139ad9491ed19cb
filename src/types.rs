use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Opaque store-assigned identifier. The managed database hands out numeric
/// ids, the in-memory store ULIDs; both are carried as strings.
pub type ChallengeId = String;

pub const MIN_POINTS: u8 = 1;
pub const MAX_POINTS: u8 = 5;

pub const DEFAULT_SECRET_CODE: &str = "0301";
pub const DEFAULT_PLAYERS: &[&str] = &["Paul", "Marcel"];

/// Terminal outcome of a challenge. An unresolved challenge has no status
/// at all (`null` in the store).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ChallengeStatus {
    Done,
    Failed,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Challenge {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: ChallengeId,
    pub text: String,
    pub points: u8,
    pub author: String,
    pub date: DateTime<Utc>,
    #[serde(default)]
    pub status: Option<ChallengeStatus>,
    #[serde(default)]
    pub player: Option<String>,
}

impl Challenge {
    /// Only unresolved challenges can be drawn
    pub fn is_drawable(&self) -> bool {
        self.status.is_none()
    }

    pub fn status_label(&self) -> &'static str {
        match self.status {
            Some(ChallengeStatus::Done) => "Erledigt",
            Some(ChallengeStatus::Failed) => "Fehlgeschlagen",
            None => "Offen",
        }
    }
}

/// Row shape sent to the store on insert. The store assigns the id.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewChallenge {
    pub text: String,
    pub points: u8,
    pub author: String,
    pub date: DateTime<Utc>,
    pub status: Option<ChallengeStatus>,
    pub player: Option<String>,
}

impl NewChallenge {
    pub fn new(text: String, points: u8, author: String) -> Self {
        Self {
            text,
            points,
            author,
            date: Utc::now(),
            status: None,
            player: None,
        }
    }
}

fn deserialize_id<'de, D>(deserializer: D) -> Result<ChallengeId, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Number(i64),
        Text(String),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Number(n) => n.to_string(),
        RawId::Text(s) => s,
    })
}

/// Game settings shared by every handler: the draw code and who can play.
///
/// The code only guards against accidental draws; it is not access control.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct GameConfig {
    #[serde(skip_serializing)]
    pub secret_code: String,
    pub players: Vec<String>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            secret_code: DEFAULT_SECRET_CODE.to_string(),
            players: DEFAULT_PLAYERS.iter().map(|p| p.to_string()).collect(),
        }
    }
}

impl GameConfig {
    /// Load game settings from environment variables
    /// CHALLENGE_SECRET_CODE and CHALLENGE_PLAYERS (comma-separated)
    pub fn from_env() -> Self {
        let secret_code = std::env::var("CHALLENGE_SECRET_CODE")
            .ok()
            .and_then(|code| {
                let trimmed = code.trim();
                (!trimmed.is_empty()).then(|| trimmed.to_string())
            })
            .unwrap_or_else(|| DEFAULT_SECRET_CODE.to_string());

        let players: Vec<String> = std::env::var("CHALLENGE_PLAYERS")
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|p| !p.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        let players = if players.is_empty() {
            DEFAULT_PLAYERS.iter().map(|p| p.to_string()).collect()
        } else {
            players
        };

        Self {
            secret_code,
            players,
        }
    }

    pub fn is_player(&self, name: &str) -> bool {
        self.players.iter().any(|p| p == name)
    }

    pub fn code_matches(&self, code: &str) -> bool {
        self.secret_code == code
    }
}
