//! Roast levels and the tone instruction each one maps to
//!
//! Lookup is total: an unrecognized level never fails, it falls back to
//! [`FALLBACK_TONE`]. The caller's original level string is still echoed in the
//! prompt by [`PromptBuilder`](crate::roast::PromptBuilder).

use serde::{Deserialize, Serialize};
use std::fmt;

/// Tone used for any level outside the fixed set
pub const FALLBACK_TONE: &str = "Be constructive but humorous: keep it playful, \
     and make sure the reader walks away knowing what to fix.";

const LIGHT_TONE: &str = "Be gentle and mentoring: tease lightly, like a friendly senior \
     developer, then point toward the fix.";

const SAVAGE_TONE: &str = "Be direct and witty: sharp one-liners that land squarely on the \
     real problem.";

const BRUTAL_TONE: &str = "Be merciless and sarcastic: hold nothing back, but every jab must \
     be about the code itself, never the person.";

/// Roast intensity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RoastLevel {
    Light,
    Savage,
    Brutal,
}

impl RoastLevel {
    /// All recognized levels, mildest first
    pub const ALL: [RoastLevel; 3] = [RoastLevel::Light, RoastLevel::Savage, RoastLevel::Brutal];

    /// Parse a level name, ignoring surrounding whitespace and ASCII case
    ///
    /// Returns `None` for anything outside the fixed set, including the empty string.
    pub fn parse(level: &str) -> Option<Self> {
        let level = level.trim();
        Self::ALL
            .into_iter()
            .find(|candidate| candidate.as_str().eq_ignore_ascii_case(level))
    }

    /// Lowercase name, as used in prompts and metrics labels
    pub fn as_str(&self) -> &'static str {
        match self {
            RoastLevel::Light => "light",
            RoastLevel::Savage => "savage",
            RoastLevel::Brutal => "brutal",
        }
    }

    /// Tone instruction for this level
    pub fn tone(&self) -> &'static str {
        match self {
            RoastLevel::Light => LIGHT_TONE,
            RoastLevel::Savage => SAVAGE_TONE,
            RoastLevel::Brutal => BRUTAL_TONE,
        }
    }
}

impl fmt::Display for RoastLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tone instruction for a raw level string
///
/// Never fails; unknown levels get [`FALLBACK_TONE`].
pub fn tone_for(level: &str) -> &'static str {
    RoastLevel::parse(level)
        .map(|level| level.tone())
        .unwrap_or(FALLBACK_TONE)
}
