use std::sync::Arc;

use bot_commons::useful_methods::MessageStuff;
use teloxide::{
    prelude::*,
    sugar::request::RequestReplyExt,
    types::{Me, UserId},
    RequestError,
};

use crate::{
    actions::TelegramMessage,
    commands::{
        self, find_command, flagged_count_text, parse_add_phrase, phrase_summary_text, Command,
    },
    pipeline::ModerationPipeline,
    types::{InboundMessage, PipelineOutcome},
};

/// The one user who may change things for every chat, like the phrase catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Owner(pub Option<UserId>);

impl Owner {
    /// Whether the owner sent this message personally. Anonymous admins and channels never
    /// count, since there's no telling who is behind them.
    pub fn sent(&self, message: &Message) -> bool {
        match (self.0, &message.from) {
            (Some(owner), Some(user)) => message.sender_chat.is_none() && user.id == owner,
            _ => false,
        }
    }
}

/// Whether this message has to pass moderation before its command gets looked at.
///
/// The owner's commands skip it, as `/addphrase` quotes spam on purpose.
fn moderate_first(command: Option<&Command>, sender_is_owner: bool) -> bool {
    command.is_none() || !sender_is_owner
}

/// Runs the message through moderation. Returns `true` if it was spam and nothing
/// else should look at it.
async fn moderate(bot: &Bot, message: &Message, pipeline: &ModerationPipeline) -> bool {
    // Only group chats get moderated.
    if message.chat.is_private() {
        return false;
    }

    let Some(inbound) = InboundMessage::from_telegram(message) else {
        // No text, nothing to check.
        return false;
    };

    let outcome = pipeline
        .handle(&inbound, &TelegramMessage::new(bot, message))
        .await;

    outcome == PipelineOutcome::Suppressed
}

pub async fn handle_message(
    bot: Bot,
    me: Me,
    message: Message,
    pipeline: Arc<ModerationPipeline>,
    owner: Owner,
) -> Result<(), RequestError> {
    // Bot ignores messages made by itself.
    if message.from.as_ref().map(|from| from.id) == Some(me.id) {
        return Ok(());
    }

    let command = message
        .command_and_params(me.username())
        .and_then(|(name, params)| Some((find_command(&name)?, params)));
    let sender_is_owner = owner.sent(&message);

    if moderate_first(command.map(|(command, _)| command), sender_is_owner)
        && moderate(&bot, &message, &pipeline).await
    {
        return Ok(());
    }

    if let Some((command, params)) = command {
        return handle_command(&bot, &message, command, params, &pipeline, sender_is_owner).await;
    }

    if message.chat.is_private() {
        bot.send_message(message.chat.id, commands::HELP_TEXT).await?;
    }

    Ok(())
}

/// Someone might edit a harmless message into spam, so edits get moderated too.
pub async fn handle_edited_message(
    bot: Bot,
    message: Message,
    pipeline: Arc<ModerationPipeline>,
) -> Result<(), RequestError> {
    moderate(&bot, &message, &pipeline).await;
    Ok(())
}

async fn handle_command(
    bot: &Bot,
    message: &Message,
    command: &Command,
    params: &str,
    pipeline: &ModerationPipeline,
    sender_is_owner: bool,
) -> Result<(), RequestError> {
    log::debug!("Seen command {} in chat {}", command.name, message.chat.id);

    if !command.allows(sender_is_owner) {
        log::info!(
            "Refused {} from {} in chat {}",
            command.name,
            message.sender_id_string().as_deref().unwrap_or("someone unknown"),
            message.chat.id
        );
        bot.send_message(message.chat.id, "Only the bot owner can do that.")
            .reply_to(message.id)
            .await?;
        return Ok(());
    }

    let response = match command.name {
        "/start" => commands::WELCOME_TEXT.to_string(),
        "/help" => commands::HELP_TEXT.to_string(),
        "/fstat" => {
            let count = pipeline
                .counters()
                .get(&message.chat.id.to_string())
                .await;
            flagged_count_text(count)
        }
        "/addphrase" => {
            let classifier = pipeline.classifier();
            let (languages, phrase) = parse_add_phrase(params, classifier.detector());

            match classifier.catalog().add_phrase(phrase, &languages) {
                Ok(0) => format!("Already had that phrase for {}.", languages.join(", ")),
                Ok(_) => format!(
                    concat!(
                        "Added \"{}\" as a spam phrase for {}. ",
                        "It will be forgotten when the bot restarts, ",
                        "unless it's also added to the phrase files."
                    ),
                    phrase.trim().to_lowercase(),
                    languages.join(", ")
                ),
                Err(e) => e.to_string(),
            }
        }
        "/phrases" => phrase_summary_text(&pipeline.classifier().catalog().summary()),
        _ => return Ok(()),
    };

    bot.send_message(message.chat.id, response)
        .reply_to(message.id)
        .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use crate::commands::{ADDPHRASE, FSTAT};

    fn message(chat: serde_json::Value, from_id: u64) -> Message {
        serde_json::from_value(serde_json::json!({
            "message_id": 5,
            "date": 1700000000,
            "chat": chat,
            "from": { "id": from_id, "is_bot": false, "first_name": "Someone" },
            "text": "/addphrase en e",
        }))
        .unwrap()
    }

    fn private_message(from_id: u64) -> Message {
        message(
            serde_json::json!({ "id": from_id, "type": "private", "first_name": "Someone" }),
            from_id,
        )
    }

    fn group_message(from_id: u64) -> Message {
        message(
            serde_json::json!({ "id": -100123, "type": "supergroup", "title": "Chat" }),
            from_id,
        )
    }

    #[test]
    fn strangers_cant_add_phrases() {
        let owner = Owner(Some(UserId(1)));

        // Their own private chat or their own group doesn't make them the owner.
        for message in [private_message(999), group_message(999)] {
            assert!(!owner.sent(&message));
            assert!(!ADDPHRASE.allows(owner.sent(&message)));
        }

        assert!(owner.sent(&private_message(1)));
        assert!(owner.sent(&group_message(1)));
        assert!(ADDPHRASE.allows(owner.sent(&group_message(1))));
    }

    #[test]
    fn nobody_is_owner_without_one_configured() {
        let owner = Owner(None);
        assert!(!owner.sent(&private_message(1)));
        assert!(!owner.sent(&group_message(999)));
    }

    #[test]
    fn owner_commands_skip_moderation() {
        // "/addphrase en buy followers" from the owner must reach the command.
        assert!(!moderate_first(Some(&ADDPHRASE), true));
        assert!(!moderate_first(Some(&FSTAT), true));

        // Everyone else gets moderated first, commands or not.
        assert!(moderate_first(Some(&ADDPHRASE), false));
        assert!(moderate_first(Some(&FSTAT), false));
        assert!(moderate_first(None, true));
        assert!(moderate_first(None, false));
    }
}
