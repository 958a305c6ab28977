use bot_commons::useful_methods::MessageStuff;
use teloxide::types::Message;

/// Result of [`crate::classifier::SpamClassifier::classify`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub is_spam: bool,
    /// Language code the text was detected as.
    pub language: String,
    /// The phrase that made it spam, if it is.
    pub matched_phrase: Option<String>,
}

/// What the rest of the handlers should do with a message after moderation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineOutcome {
    /// Not spam. Handle it as usual.
    Continue,
    /// Spam. Removed and counted; nothing else should touch it.
    Suppressed,
}

/// A text message as far as moderation cares.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    /// Opaque ID of the chat it was sent in.
    pub chat_id: String,
    /// Opaque ID of who sent it, if known.
    pub sender_id: Option<String>,
    pub text: String,
}

impl InboundMessage {
    /// Returns [`None`] if the message has neither text nor a caption.
    pub fn from_telegram(message: &Message) -> Option<Self> {
        Some(Self {
            chat_id: message.chat.id.to_string(),
            sender_id: message.sender_id_string(),
            text: message.text_full()?.to_string(),
        })
    }
}
