//! Conversational session: optimistic transcript and reply lifecycle.
//!
//! Same split as `ingest`: `transcript` is the append-only message store,
//! `manager` the pure state machine over it, `service` the async driver
//! that talks to the gateway.

pub mod manager;
pub mod service;
pub mod transcript;

pub use manager::{OutboundMessage, SessionManager};
pub use service::ChatService;
pub use transcript::{ConversationTranscript, TranscriptSnapshot};

use thiserror::Error;

use crate::gateway::GatewayError;

/// Why a send request was refused before reaching the transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SendError {
    #[error("message is empty")]
    EmptyMessage,

    #[error("a reply is already pending")]
    ReplyPending,
}

/// Errors surfaced by chat operations.
#[derive(Debug, Error)]
pub enum ChatError {
    #[error(transparent)]
    Send(#[from] SendError),

    #[error("history load failed: {0}")]
    History(#[from] GatewayError),

    #[error("internal lock error")]
    LockPoisoned,
}
