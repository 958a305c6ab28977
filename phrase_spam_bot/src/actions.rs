use teloxide::{
    prelude::Requester,
    types::{ChatId, Message, MessageId},
    ApiError, Bot, RequestError,
};

use crate::pipeline::{RemoveError, RemoveMessage};

/// A message in a Telegram chat that the bot may want to delete.
pub struct TelegramMessage<'a> {
    pub bot: &'a Bot,
    pub chat_id: ChatId,
    pub message_id: MessageId,
}

impl<'a> TelegramMessage<'a> {
    pub fn new(bot: &'a Bot, message: &Message) -> Self {
        Self {
            bot,
            chat_id: message.chat.id,
            message_id: message.id,
        }
    }
}

impl RemoveMessage for TelegramMessage<'_> {
    async fn remove(&self) -> Result<(), RemoveError> {
        match self.bot.delete_message(self.chat_id, self.message_id).await {
            Ok(_) => Ok(()),
            Err(RequestError::Api(
                ApiError::MessageIdInvalid | ApiError::MessageToDeleteNotFound,
            )) => {
                // Someone else probably has already deleted it. That's fine.
                log::debug!("Spam message in {} was already gone.", self.chat_id);
                Ok(())
            }
            Err(RequestError::Api(ApiError::MessageCantBeDeleted)) => Err(concat!(
                "message can't be deleted; ",
                "the bot might not be an admin with ability to delete messages, ",
                "or the message is older than 48 hours"
            )
            .into()),
            Err(e) => Err(e.into()),
        }
    }
}
