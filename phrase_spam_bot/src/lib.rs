//! Source code for a bot that removes messages containing known spam phrases from Telegram
//! groups, and keeps count of how many it removed in each.

/// Various types used throughout.
pub mod types;

/// Guessing what language a message is in.
pub mod language;

/// Spam phrases per language.
pub mod phrases;

/// Language detection plus phrase matching.
pub mod classifier;

/// Flagged message counts per chat.
pub mod counter;

/// What happens to each incoming message.
pub mod pipeline;

/// Startup configuration.
mod config;

/// Functions that perform stuff via the bot.
mod actions;

/// Command definitions and responses.
mod commands;

/// Functions that handle events from Telegram.
mod handlers;

/// Entry function that starts the bot.
mod entry;
pub use entry::*;

/// Default log filter for when `RUST_LOG` isn't set.
pub const DEFAULT_LOG_FILTER: &str = "WARN,phrase_spam_bot=debug";
