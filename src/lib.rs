//! Roastmaster - humorous multi-turn code review over a chat-completions API
//!
//! The core is [`roast::RoastClient`], which builds tone-conditioned prompts,
//! threads conversation history through a stateless provider, and classifies
//! every failure into a [`roast::CompletionResult`]. The client talks to the
//! provider only through [`transport::Transport`]; [`transport::SimulatedTransport`]
//! stands in for the network in tests.

pub mod cli;
pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod roast;
pub mod session;
pub mod telemetry;
pub mod transport;
