use std::{future::Future, sync::Arc, time::Duration};

use crate::{
    classifier::SpamClassifier,
    counter::CounterStore,
    types::{InboundMessage, PipelineOutcome},
};

/// How long to wait for the chat platform to delete a message before giving up on it.
pub const DELETE_TIMEOUT: Duration = Duration::from_secs(10);

pub type RemoveError = Box<dyn std::error::Error + Send + Sync>;

/// Something that can remove the message currently being moderated from its chat.
pub trait RemoveMessage {
    fn remove(&self) -> impl Future<Output = Result<(), RemoveError>> + Send;
}

/// Runs once per inbound message: classifies it and, if it's spam, removes and counts it.
#[derive(Debug)]
pub struct ModerationPipeline {
    classifier: Arc<SpamClassifier>,
    counters: Arc<CounterStore>,
}

impl ModerationPipeline {
    pub fn new(classifier: Arc<SpamClassifier>, counters: Arc<CounterStore>) -> Self {
        Self {
            classifier,
            counters,
        }
    }

    pub fn classifier(&self) -> &Arc<SpamClassifier> {
        &self.classifier
    }

    pub fn counters(&self) -> &Arc<CounterStore> {
        &self.counters
    }

    /// Returns [`PipelineOutcome::Suppressed`] if the message was spam, in which case nothing
    /// else should process it.
    ///
    /// Failing to remove the message is logged and doesn't stop it from being counted.
    pub async fn handle(
        &self,
        message: &InboundMessage,
        remover: &impl RemoveMessage,
    ) -> PipelineOutcome {
        let classification = self.classifier.classify(&message.text);

        if !classification.is_spam {
            return PipelineOutcome::Continue;
        }

        log::debug!(
            "Spam in chat {} from {}: detected '{}', matched {:?}",
            message.chat_id,
            message.sender_id.as_deref().unwrap_or("someone unknown"),
            classification.language,
            classification.matched_phrase.as_deref().unwrap_or_default(),
        );

        match tokio::time::timeout(DELETE_TIMEOUT, remover.remove()).await {
            Ok(Ok(())) => (),
            Ok(Err(e)) => log::warn!(
                "Failed to remove a spam message in chat {}: {}",
                message.chat_id,
                e
            ),
            Err(_) => log::warn!(
                "Timed out removing a spam message in chat {}",
                message.chat_id
            ),
        }

        let count = self.counters.increment(&message.chat_id).await;
        log::info!(
            "Flagged a message in chat {}, {} flagged so far.",
            message.chat_id,
            count
        );

        PipelineOutcome::Suppressed
    }
}
