//! Session state machine: optimistic echo and reply resolution.
//!
//! Pure and synchronous like the ingestion controller: `send()` hands back
//! an `OutboundMessage` for the driver to put on the wire, and the eventual
//! answer comes back through `resolve_reply()` tagged with the generation
//! it belongs to.

use chrono::{DateTime, Utc};

use crate::gateway::GatewayError;
use crate::models::{AssistantReply, Message};

use super::transcript::{ConversationTranscript, TranscriptSnapshot};
use super::SendError;

/// Message accepted for sending. The resolution must present the same
/// generation or it is discarded as belonging to a replaced conversation.
#[derive(Debug, Clone, PartialEq)]
pub struct OutboundMessage {
    pub generation: u64,
    pub subject_id: Option<String>,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Default)]
pub struct SessionManager {
    transcript: ConversationTranscript,
    /// Bumped on every send and every history swap; stale resolutions
    /// carry an older value.
    generation: u64,
    send_failure: Option<String>,
}

impl SessionManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn transcript(&self) -> &ConversationTranscript {
        &self.transcript
    }

    pub fn snapshot(&self) -> TranscriptSnapshot {
        self.transcript.snapshot()
    }

    /// Swap in the stored history for a subject, discarding any in-flight
    /// reply from the previous conversation.
    pub fn load_history(&mut self, subject_id: Option<String>, messages: Vec<Message>) {
        self.generation += 1;
        self.send_failure = None;
        tracing::debug!(
            subject = subject_id.as_deref().unwrap_or("general"),
            count = messages.len(),
            "conversation history loaded"
        );
        self.transcript.replace(subject_id, messages);
    }

    /// Accept a question: echo it into the transcript immediately and mark
    /// a reply pending. Refused while a reply is already outstanding, and
    /// for whitespace-only input.
    pub fn send(&mut self, text: &str) -> Result<OutboundMessage, SendError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(SendError::EmptyMessage);
        }
        if self.transcript.pending_reply() {
            return Err(SendError::ReplyPending);
        }

        let echoed = Message::user(text);
        let timestamp = echoed.timestamp;
        self.transcript.push(echoed);
        self.transcript.set_pending(true);
        self.generation += 1;

        Ok(OutboundMessage {
            generation: self.generation,
            subject_id: self.transcript.subject_id().map(str::to_string),
            text: text.to_string(),
            timestamp,
        })
    }

    /// Apply the outcome of the send tagged `generation`.
    ///
    /// A stale generation means the conversation was swapped out while the
    /// request was in flight; the resolution is dropped. On failure the
    /// echoed question stays in the transcript and the pending flag clears
    /// so the user can try again.
    pub fn resolve_reply(&mut self, generation: u64, outcome: Result<AssistantReply, GatewayError>) {
        if generation != self.generation {
            tracing::debug!(generation, current = self.generation, "stale reply ignored");
            return;
        }
        match outcome {
            Ok(reply) => {
                self.transcript
                    .push(Message::assistant(reply.text, reply.timestamp));
                self.transcript.set_pending(false);
            }
            Err(err) => {
                tracing::warn!(error = %err, "assistant reply failed");
                self.send_failure = Some(err.to_string());
                self.transcript.set_pending(false);
            }
        }
    }

    /// Consume the most recent send failure, if any.
    pub fn take_send_failure(&mut self) -> Option<String> {
        self.send_failure.take()
    }
}

// ═══════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════
