//! New-challenge form: local validation before anything reaches the store.

use serde::{Deserialize, Deserializer, Serialize};

use crate::types::{NewChallenge, MAX_POINTS, MIN_POINTS};

/// Points field value after a successful submission
pub const DEFAULT_FORM_POINTS: &str = "1";

/// Raw form input as typed by the user. Points stay text until validated,
/// so a rejected form can be handed back exactly as it was entered.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChallengeForm {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub author: String,
    #[serde(default = "default_points", deserialize_with = "deserialize_points")]
    pub points: String,
}

fn default_points() -> String {
    DEFAULT_FORM_POINTS.to_string()
}

/// Accept `"3"` as well as `3` for the points field
fn deserialize_points<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawPoints {
        Number(i64),
        Text(String),
    }

    Ok(match RawPoints::deserialize(deserializer)? {
        RawPoints::Number(n) => n.to_string(),
        RawPoints::Text(s) => s,
    })
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("Bitte einen Challenge-Text eingeben.")]
    EmptyText,

    #[error("Bitte deinen Namen eingeben.")]
    EmptyAuthor,

    #[error("Punkte müssen zwischen 1 und 5 liegen.")]
    PointsNotANumber(String),

    #[error("Punkte müssen zwischen 1 und 5 liegen.")]
    PointsOutOfRange(i64),
}

impl Default for ChallengeForm {
    fn default() -> Self {
        Self {
            text: String::new(),
            author: String::new(),
            points: default_points(),
        }
    }
}

impl ChallengeForm {
    pub fn new(text: &str, author: &str, points: &str) -> Self {
        Self {
            text: text.to_string(),
            author: author.to_string(),
            points: points.to_string(),
        }
    }

    /// Parse the points field into the allowed range
    pub fn parse_points(&self) -> Result<u8, ValidationError> {
        let raw = self.points.trim();
        let points: i64 = raw
            .parse()
            .map_err(|_| ValidationError::PointsNotANumber(raw.to_string()))?;

        if !(i64::from(MIN_POINTS)..=i64::from(MAX_POINTS)).contains(&points) {
            return Err(ValidationError::PointsOutOfRange(points));
        }
        // In range, so it fits
        Ok(points as u8)
    }

    /// Validate and turn into a row for the store, stamped with the current
    /// time, unresolved and without player.
    pub fn validate(&self) -> Result<NewChallenge, ValidationError> {
        let text = self.text.trim();
        if text.is_empty() {
            return Err(ValidationError::EmptyText);
        }

        let author = self.author.trim();
        if author.is_empty() {
            return Err(ValidationError::EmptyAuthor);
        }

        let points = self.parse_points()?;

        Ok(NewChallenge::new(text.to_string(), points, author.to_string()))
    }
}
