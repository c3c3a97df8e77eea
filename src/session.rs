use tracing::{debug, info};

use crate::completion::{ChatRequest, CompletionTransport};
use crate::error::TurnError;
use crate::transcript::{Message, Transcript};

/// A single conversation: its transcript plus the transport used to extend it.
pub struct Session<T> {
    transport: T,
    model: String,
    transcript: Transcript,
    max_history_messages: Option<usize>,
}

impl<T> Session<T>
where
    T: CompletionTransport,
{
    pub fn new(transport: T, model: impl Into<String>) -> Self {
        Self {
            transport,
            model: model.into(),
            transcript: Transcript::new(),
            max_history_messages: None,
        }
    }

    /// Caps how many trailing messages are sent per request. The transcript
    /// itself is never shortened.
    pub fn with_history_limit(mut self, limit: Option<usize>) -> Self {
        self.max_history_messages = limit;
        self
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    #[cfg(test)]
    pub(crate) fn transport(&self) -> &T {
        &self.transport
    }

    /// Sends `user_text` with the conversation so far and records the reply.
    ///
    /// The user message stays in the transcript even when the turn fails.
    pub async fn submit_turn(&mut self, user_text: &str) -> Result<String, TurnError> {
        self.transcript.push(Message::user(user_text));

        let request = ChatRequest {
            model: &self.model,
            messages: self.transcript.window(self.max_history_messages),
        };
        debug!(
            transcript_len = self.transcript.len(),
            sent = request.messages.len(),
            "submitting turn"
        );

        let response = self.transport.complete(request).await?;
        let Some(answer) = response.first_content() else {
            info!(transcript_len = self.transcript.len(), "completion returned no choices");
            return Err(TurnError::NoChoices);
        };

        self.transcript.push(Message::assistant(answer.clone()));
        Ok(answer)
    }
}
