//! Command-line interface for Roastmaster
//!
//! Argument parsing plus the terminal front ends: a one-shot `roast` and an
//! interactive `chat` session. Both talk to a [`RoastClient`] and never see
//! which transport sits behind it.

use crate::error::{AppResult, RoastError};
use crate::roast::{ConversationHistory, RoastClient, RoastLevel};
use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

/// Code roasting over any OpenAI-compatible chat-completion provider
#[derive(Parser)]
#[command(name = "roastmaster")]
#[command(version)]
#[command(about = "Humorous code critique from a chat-completion model")]
#[command(
    long_about = "Roastmaster sends your code to a chat-completion provider and returns a \
    short, pointed roast at the intensity you choose. Run it as an HTTP service, a one-shot \
    command, or an interactive chat."
)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml", global = true)]
    pub config: String,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the HTTP API (default when no subcommand is given)
    Serve,

    /// Roast a single submission and exit
    Roast {
        /// Roast level: light, savage, or brutal
        #[arg(short, long)]
        level: Option<String>,

        /// File to roast (reads stdin if not specified)
        #[arg(short, long)]
        file: Option<String>,
    },

    /// Interactive session where follow-ups keep the conversation context
    Chat {
        /// Starting roast level; change it later with `:level <name>`
        #[arg(short, long)]
        level: Option<String>,
    },

    /// Generate a template configuration file
    Config {
        /// Output file path (prints to stdout if not specified)
        #[arg(short, long)]
        output: Option<String>,
    },
}

/// Fenced block delimiter for multi-line chat submissions
const FENCE: &str = "```";

const CHAT_BANNER: &str = "Paste code to roast. Wrap multi-line code in ``` fences.\n\
Commands: :level <light|savage|brutal>, :history, :quit";

/// Roast one submission and return the text to print
///
/// Errors from the roast itself are user-facing messages, so they come back
/// as `Err(RoastError)` for the caller to print rather than as a crash.
pub async fn run_roast(
    client: &RoastClient,
    submission: &str,
    level: &str,
) -> Result<String, RoastError> {
    let mut history = ConversationHistory::new();
    client.roast(submission, level, &mut history).await
}

/// Drive an interactive chat over any line-oriented input and output
///
/// Each non-command line is a submission; a line holding only ``` opens a
/// block that runs until the next fence. The session's history lives for the
/// lifetime of this call.
pub async fn run_chat<R, W>(
    client: &RoastClient,
    initial_level: &str,
    input: R,
    mut output: W,
) -> AppResult<ConversationHistory>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = input.lines();
    let mut history = ConversationHistory::new();
    let mut level = initial_level.to_string();

    write_line(&mut output, CHAT_BANNER).await?;

    while let Some(line) = lines.next_line().await? {
        let trimmed = line.trim();

        if trimmed == ":quit" {
            break;
        }

        if trimmed == ":history" {
            for turn in &history {
                let entry = format!("[{}] {}", turn.role().as_str(), turn.content());
                write_line(&mut output, &entry).await?;
            }
            continue;
        }

        if let Some(requested) = level_argument(trimmed) {
            let message = match RoastLevel::parse(requested) {
                Some(parsed) => {
                    level = parsed.to_string();
                    format!("Roast level set to {}", level)
                }
                None => format!(
                    "Unknown level '{}'; choose one of: {}",
                    requested,
                    RoastLevel::ALL
                        .iter()
                        .map(RoastLevel::as_str)
                        .collect::<Vec<_>>()
                        .join(", ")
                ),
            };
            write_line(&mut output, &message).await?;
            continue;
        }

        let submission = if trimmed == FENCE {
            let mut block = Vec::new();
            while let Some(inner) = lines.next_line().await? {
                if inner.trim() == FENCE {
                    break;
                }
                block.push(inner);
            }
            block.join("\n")
        } else {
            line
        };

        let reply = match client.roast(&submission, &level, &mut history).await {
            Ok(roast) => roast,
            Err(e) => e.to_string(),
        };
        write_line(&mut output, &reply).await?;
    }

    output.flush().await?;
    Ok(history)
}

/// Argument of a `:level` command; `:levels` and the like are submissions
fn level_argument(line: &str) -> Option<&str> {
    let rest = line.strip_prefix(":level")?;
    if rest.is_empty() || rest.starts_with(char::is_whitespace) {
        Some(rest.trim())
    } else {
        None
    }
}

async fn write_line<W: AsyncWrite + Unpin>(output: &mut W, text: &str) -> AppResult<()> {
    output.write_all(text.as_bytes()).await?;
    output.write_all(b"\n").await?;
    Ok(())
}

/// Generate template configuration content
pub fn generate_config_template() -> &'static str {
    r#"# Roastmaster Configuration
# ==========================
#
# This file configures the HTTP server, the chat-completion provider,
# sampling parameters, and observability settings for Roastmaster.

# ─────────────────────────────────────────────────────────────────────────────
# SERVER CONFIGURATION
# ─────────────────────────────────────────────────────────────────────────────

[server]
# IP address to bind to (0.0.0.0 for all interfaces, 127.0.0.1 for localhost only)
host = "127.0.0.1"

# Port to listen on
port = 3000

# Upper bound on a whole /roast request, including provider latency
request_timeout_seconds = 30

# ─────────────────────────────────────────────────────────────────────────────
# PROVIDER
# ─────────────────────────────────────────────────────────────────────────────
#
# Any OpenAI-compatible chat-completion API. Requests go to
# <base_url>/chat/completions with a bearer token read from api_key_env.

[provider]
base_url = "https://openrouter.ai/api/v1"
model = "meta-llama/llama-3.1-8b-instruct"

# Environment variable holding the API key (never put the key itself here)
api_key_env = "OPENROUTER_API_KEY"

# Optional attribution headers (HTTP-Referer and X-Title)
# referer = "https://your-site.example.com"
# title = "Roastmaster"

# Timeout for a single provider call
timeout_seconds = 30

# ─────────────────────────────────────────────────────────────────────────────
# COMPLETION
# ─────────────────────────────────────────────────────────────────────────────

[completion]
# Keeps roasts short and bounds cost
max_tokens = 200

# Sampling temperature (0.0-2.0)
temperature = 0.9

# Level used when a request does not pick one: "light", "savage", "brutal"
default_level = "savage"

# ─────────────────────────────────────────────────────────────────────────────
# OBSERVABILITY
# ─────────────────────────────────────────────────────────────────────────────

[observability]
# Log level: "trace", "debug", "info", "warn", "error"
log_level = "info"
"#
}
