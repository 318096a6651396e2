//! Actor identity for board gestures.
//!
//! Resolution order:
//! 1) CLI --actor (explicit)
//! 2) TASKBOARD_ACTOR environment variable
//! 3) Config default (actor.default)

use crate::config::Config;

pub const ACTOR_ENV: &str = "TASKBOARD_ACTOR";

/// Resolve the acting user from the CLI flag, the environment, then config.
pub fn resolve_actor(cli_actor: Option<&str>, config: &Config) -> String {
    if let Some(actor) = non_empty(cli_actor) {
        return actor.to_string();
    }

    if let Ok(env_actor) = std::env::var(ACTOR_ENV) {
        if let Some(actor) = non_empty(Some(env_actor.as_str())) {
            return actor.to_string();
        }
    }

    config.actor.default.clone()
}

fn non_empty(input: Option<&str>) -> Option<&str> {
    input.and_then(|value| {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed)
        }
    })
}
