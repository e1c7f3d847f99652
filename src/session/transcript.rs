//! Append-only conversation transcript.
//!
//! Messages are never edited or reordered once pushed. The revision counter
//! increments on every observable change so the presentation layer can pin
//! its scroll position to the bottom exactly when something new appeared.

use serde::Serialize;

use crate::models::Message;

#[derive(Debug, Default)]
pub struct ConversationTranscript {
    subject_id: Option<String>,
    messages: Vec<Message>,
    pending_reply: bool,
    revision: u64,
}

impl ConversationTranscript {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Accessors ────────────────────────────────────────

    /// Report this conversation is scoped to, if any.
    pub fn subject_id(&self) -> Option<&str> {
        self.subject_id.as_deref()
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// True between a sent question and its reply (or recorded failure).
    pub fn pending_reply(&self) -> bool {
        self.pending_reply
    }

    /// Bumped on every observable change; equal revisions mean an
    /// identical transcript view.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn snapshot(&self) -> TranscriptSnapshot {
        TranscriptSnapshot {
            subject_id: self.subject_id.clone(),
            messages: self.messages.clone(),
            pending_reply: self.pending_reply,
            revision: self.revision,
        }
    }

    // ── Mutation (manager-only) ──────────────────────────

    pub(crate) fn push(&mut self, message: Message) {
        self.messages.push(message);
        self.revision += 1;
    }

    pub(crate) fn set_pending(&mut self, pending: bool) {
        if self.pending_reply != pending {
            self.pending_reply = pending;
            self.revision += 1;
        }
    }

    /// Swap in a freshly loaded history, replacing everything.
    pub(crate) fn replace(&mut self, subject_id: Option<String>, messages: Vec<Message>) {
        self.subject_id = subject_id;
        self.messages = messages;
        self.pending_reply = false;
        self.revision += 1;
    }
}

/// Read-only projection for the presentation layer.
#[derive(Debug, Clone, Serialize)]
pub struct TranscriptSnapshot {
    pub subject_id: Option<String>,
    pub messages: Vec<Message>,
    pub pending_reply: bool,
    pub revision: u64,
}
