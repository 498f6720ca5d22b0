//! Property tests for history updates and tone lookup
//!
//! proptest drives synchronous closures, so each case builds its own
//! single-threaded runtime for the async client.

use proptest::prelude::*;
use roastmaster::roast::tone::FALLBACK_TONE;
use roastmaster::roast::{
    CompletionSettings, ConversationHistory, RoastClient, RoastLevel, Turn, tone_for,
};
use roastmaster::transport::{CHAT_COMPLETIONS_PATH, SimulatedTransport};
use std::sync::Arc;

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("runtime should build")
}

fn client(transport: SimulatedTransport) -> RoastClient {
    RoastClient::new(
        Arc::new(transport),
        CompletionSettings::new("test-model", 200, 0.9),
    )
}

fn history_strategy() -> impl Strategy<Value = Vec<Turn>> {
    prop::collection::vec(("[a-z ]{1,20}", "[A-Za-z .!]{1,30}"), 0..6).prop_map(|pairs| {
        pairs
            .into_iter()
            .flat_map(|(user, assistant)| [Turn::user(user), Turn::assistant(assistant)])
            .collect()
    })
}

proptest! {
    #[test]
    fn success_appends_two_turns_and_keeps_prefix(
        prior in history_strategy(),
        submission in "[a-zA-Z0-9(){};= ]{1,40}",
        reply in "[A-Za-z ,.]{1,60}",
    ) {
        prop_assume!(!reply.trim().is_empty());

        let client = client(SimulatedTransport::new().with_completion(&reply));
        let mut history = ConversationHistory::from(prior.clone());

        let result = runtime().block_on(client.generate_roast(&submission, "savage", &mut history));

        prop_assert!(result.is_success());
        prop_assert_eq!(history.len(), prior.len() + 2);
        prop_assert_eq!(&history.turns()[..prior.len()], &prior[..]);
        prop_assert_eq!(&history.turns()[prior.len()], &Turn::user(submission));
        prop_assert_eq!(&history.turns()[prior.len() + 1], &Turn::assistant(reply));
    }

    #[test]
    fn failure_appends_only_the_user_turn(
        prior in history_strategy(),
        submission in "[a-zA-Z0-9(){};= ]{1,40}",
        rate_limited in any::<bool>(),
    ) {
        let mut transport = SimulatedTransport::new();
        if rate_limited {
            transport.respond_rate_limited(CHAT_COMPLETIONS_PATH);
        }
        let client = client(transport);
        let mut history = ConversationHistory::from(prior.clone());

        let result = runtime().block_on(client.generate_roast(&submission, "light", &mut history));

        prop_assert!(!result.is_success());
        prop_assert_eq!(history.len(), prior.len() + 1);
        prop_assert_eq!(&history.turns()[..prior.len()], &prior[..]);
        prop_assert_eq!(history.last(), Some(&Turn::user(submission)));
    }

    #[test]
    fn unknown_levels_get_the_fallback_tone(level in ".*") {
        prop_assume!(RoastLevel::parse(&level).is_none());
        prop_assert_eq!(tone_for(&level), FALLBACK_TONE);
    }

    #[test]
    fn known_levels_ignore_case_and_padding(
        index in 0usize..3,
        upper in any::<bool>(),
        pad in " {0,3}",
    ) {
        let level = RoastLevel::ALL[index];
        let name = if upper {
            level.as_str().to_uppercase()
        } else {
            level.as_str().to_string()
        };
        let padded = format!("{pad}{name}{pad}");

        prop_assert_eq!(tone_for(&padded), level.tone());
        prop_assert_ne!(tone_for(&padded), FALLBACK_TONE);
    }
}
