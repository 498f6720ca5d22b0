//! Prompt construction for roast requests
//!
//! The builder is deterministic: identical inputs always produce an identical
//! [`CompletionRequest`]. Sampling randomness lives in `temperature`, never in
//! the prompt text.

use crate::config::CompletionConfig;
use crate::roast::conversation::{ConversationHistory, Turn};
use crate::roast::tone::tone_for;

/// Maximum number of sentences a roast may use
pub const MAX_SENTENCES: usize = 3;

/// Openings the model is told never to start with
pub const BANNED_OPENINGS: &[&str] = &["Ah", "Oh", "Well", "Wow", "Let's see", "Great question"];

const PERSONA: &str = "You are Roastmaster, a code reviewer with the timing of a stand-up \
     comedian and the eye of a principal engineer. You roast the code you are shown, and \
     every joke points at a real, fixable problem in it.";

/// Per-deployment sampling parameters
///
/// Fixed at startup from configuration so users cannot raise cost or
/// response length.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionSettings {
    model: String,
    max_output_tokens: u32,
    temperature: f32,
}

impl CompletionSettings {
    pub fn new(model: impl Into<String>, max_output_tokens: u32, temperature: f32) -> Self {
        Self {
            model: model.into(),
            max_output_tokens,
            temperature,
        }
    }

    /// Build settings from validated configuration
    pub fn from_config(model: &str, completion: &CompletionConfig) -> Self {
        Self::new(
            model,
            completion.max_tokens(),
            completion.temperature() as f32,
        )
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn max_output_tokens(&self) -> u32 {
        self.max_output_tokens
    }

    pub fn temperature(&self) -> f32 {
        self.temperature
    }
}

/// A fully assembled chat-completion request
///
/// `turns` holds the prior history followed by the new user submission.
/// The system prompt is kept separate and placed first on the wire.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    model: String,
    system_prompt: String,
    turns: Vec<Turn>,
    max_output_tokens: u32,
    temperature: f32,
}

impl CompletionRequest {
    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn max_output_tokens(&self) -> u32 {
        self.max_output_tokens
    }

    pub fn temperature(&self) -> f32 {
        self.temperature
    }
}

/// Builds [`CompletionRequest`]s for a fixed deployment configuration
#[derive(Debug, Clone)]
pub struct PromptBuilder {
    settings: CompletionSettings,
}

impl PromptBuilder {
    pub fn new(settings: CompletionSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &CompletionSettings {
        &self.settings
    }

    /// Assemble the request for one roast turn
    ///
    /// The submission is passed through verbatim with no size limit; any
    /// truncation is the provider's business. If `history` already ends with
    /// this exact submission as a user turn, it is not repeated.
    pub fn build(
        &self,
        submission: &str,
        level: &str,
        history: &ConversationHistory,
    ) -> CompletionRequest {
        let mut turns = history.turns().to_vec();
        if !history.ends_with_user(submission) {
            turns.push(Turn::user(submission));
        }

        let system_prompt = Self::system_prompt(level);

        tracing::debug!(
            roast_level = %level,
            history_len = history.len(),
            submission_length = submission.len(),
            system_prompt_length = system_prompt.len(),
            "Built roast prompt"
        );

        CompletionRequest {
            model: self.settings.model.clone(),
            system_prompt,
            turns,
            max_output_tokens: self.settings.max_output_tokens,
            temperature: self.settings.temperature,
        }
    }

    /// System prompt for a level: persona, level, tone, then response rules
    ///
    /// The level is echoed exactly as requested, even when it is not one of
    /// the recognized levels.
    pub fn system_prompt(level: &str) -> String {
        let banned = BANNED_OPENINGS
            .iter()
            .map(|opening| format!("\"{}\"", opening))
            .collect::<Vec<_>>()
            .join(", ");

        format!(
            "{PERSONA}\n\n\
             Roast level: {level}\n\
             Tone: {tone}\n\n\
             Rules:\n\
             - Reply in at most {MAX_SENTENCES} sentences.\n\
             - Focus on the single most glaring issue in the code.\n\
             - Be specific to the code you were given; no generic programmer jokes.\n\
             - Never open with any of: {banned}.",
            tone = tone_for(level),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roast::conversation::Role;
    use crate::roast::tone::FALLBACK_TONE;

    fn builder() -> PromptBuilder {
        PromptBuilder::new(CompletionSettings::new("test-model", 200, 0.9))
    }

    #[test]
    fn test_build_appends_submission_after_history() {
        let history = ConversationHistory::from(vec![
            Turn::user("x = 1"),
            Turn::assistant("A variable named x. Riveting."),
        ]);

        let request = builder().build("y = 2", "savage", &history);

        assert_eq!(request.turns().len(), 3);
        assert_eq!(request.turns()[0], Turn::user("x = 1"));
        assert_eq!(request.turns()[1].role(), Role::Assistant);
        assert_eq!(request.turns()[2], Turn::user("y = 2"));
    }

    #[test]
    fn test_build_does_not_repeat_caller_appended_submission() {
        let history = ConversationHistory::from(vec![Turn::user("y = 2")]);

        let request = builder().build("y = 2", "savage", &history);

        assert_eq!(request.turns(), &[Turn::user("y = 2")]);
    }

    #[test]
    fn test_build_copies_fixed_settings() {
        let request = builder().build("code", "light", &ConversationHistory::new());
        assert_eq!(request.model(), "test-model");
        assert_eq!(request.max_output_tokens(), 200);
        assert_eq!(request.temperature(), 0.9);
    }

    #[test]
    fn test_system_prompt_embeds_level_and_tone() {
        let prompt = PromptBuilder::system_prompt("brutal");
        assert!(prompt.contains("Roast level: brutal"));
        assert!(prompt.contains(tone_for("brutal")));
    }

    #[test]
    fn test_system_prompt_echoes_unknown_level_with_fallback_tone() {
        let prompt = PromptBuilder::system_prompt("volcanic");
        assert!(prompt.contains("Roast level: volcanic"));
        assert!(prompt.contains(FALLBACK_TONE));
    }

    #[test]
    fn test_system_prompt_lists_rules() {
        let prompt = PromptBuilder::system_prompt("savage");
        assert!(prompt.contains(&format!("at most {} sentences", MAX_SENTENCES)));
        assert!(prompt.contains("single most glaring issue"));
        for opening in BANNED_OPENINGS {
            assert!(prompt.contains(&format!("\"{}\"", opening)));
        }
    }

    #[test]
    fn test_build_is_deterministic() {
        let history = ConversationHistory::from(vec![Turn::user("a"), Turn::assistant("b")]);
        let first = builder().build("c", "savage", &history);
        let second = builder().build("c", "savage", &history);
        assert_eq!(first, second);
    }

    #[test]
    fn test_build_accepts_large_submission_verbatim() {
        let submission = "let s = \"€\";\n".repeat(50_000);
        let request = builder().build(&submission, "light", &ConversationHistory::new());
        assert_eq!(request.turns()[0].content(), submission);
    }
}
