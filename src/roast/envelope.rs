//! Chat-completion wire format
//!
//! Request: `{model, messages: [{role, content}], max_tokens, temperature}` with the
//! system message first. Response: `{choices: [{message: {content}}]}`; only the
//! first choice is read and anything else is ignored.

use crate::roast::conversation::{Role, Turn};
use crate::roast::prompt::CompletionRequest;
use serde::{Deserialize, Serialize};

#[derive(Serialize)]
struct WireMessage<'a> {
    role: Role,
    content: &'a str,
}

#[derive(Serialize)]
struct WireRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
}

/// Serialize a request into the JSON body sent to the provider
pub fn encode_request(request: &CompletionRequest) -> serde_json::Result<String> {
    let mut messages = Vec::with_capacity(request.turns().len() + 1);
    messages.push(WireMessage {
        role: Role::System,
        content: request.system_prompt(),
    });
    messages.extend(request.turns().iter().map(|turn| WireMessage {
        role: turn.role(),
        content: turn.content(),
    }));

    serde_json::to_string(&WireRequest {
        model: request.model(),
        messages,
        max_tokens: request.max_output_tokens(),
        temperature: request.temperature(),
    })
}

/// Decoded request body, as seen from the provider side
///
/// Used by simulated responders that need to inspect what the client sent.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatCompletionBody {
    pub model: String,
    pub messages: Vec<Turn>,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl ChatCompletionBody {
    /// Content of the last user message, if any
    pub fn last_user_content(&self) -> Option<&str> {
        self.messages
            .iter()
            .rev()
            .find(|turn| turn.role() == Role::User)
            .map(Turn::content)
    }
}

/// Parse a request body produced by [`encode_request`]
pub fn decode_request(body: &str) -> serde_json::Result<ChatCompletionBody> {
    serde_json::from_str(body)
}

#[derive(Deserialize)]
struct CompletionEnvelope {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

/// Extract the first choice's message content from a response body
///
/// Returns `None` when the body is not JSON, `choices` is missing or empty,
/// or the content is absent, null, non-string, or blank.
pub fn extract_content(body: &str) -> Option<String> {
    let envelope: CompletionEnvelope = serde_json::from_str(body).ok()?;
    let content = envelope.choices.into_iter().next()?.message.content?;
    if content.trim().is_empty() {
        return None;
    }
    Some(content)
}

/// Build a well-formed response envelope carrying `content`
pub fn completion_envelope(content: &str) -> String {
    serde_json::json!({
        "object": "chat.completion",
        "choices": [{
            "index": 0,
            "message": { "role": "assistant", "content": content },
            "finish_reason": "stop",
        }],
    })
    .to_string()
}
