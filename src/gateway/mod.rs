//! API gateway boundary: the abstract contract the controllers consume.
//!
//! The ingestion controller and session manager never talk HTTP directly;
//! they depend on `ApiGateway` and receive normalized `GatewayError`s.
//! Credential attachment and the process-wide reaction to an expired
//! credential live entirely on this side of the boundary.

pub mod http;

pub use http::HttpGateway;

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::models::{AssistantReply, Message, MimeClass, ReportSummary, ReportView, UploadReceipt};

// ═══════════════════════════════════════════════════════════
// Payloads
// ═══════════════════════════════════════════════════════════

/// Everything the upload endpoint needs for one submission.
#[derive(Debug, Clone)]
pub struct UploadPayload {
    pub file_name: String,
    pub bytes: Vec<u8>,
    pub mime_class: MimeClass,
    /// Effective content type sent with the multipart file part.
    pub content_type: String,
    pub target_language: String,
    pub title: String,
}

// ═══════════════════════════════════════════════════════════
// Error taxonomy
// ═══════════════════════════════════════════════════════════

/// Transport-level failures, normalized once at the boundary.
///
/// Controllers treat every variant the same way (terminal `Failed` phase or
/// a transient send-failure signal); `Unauthorized` additionally means the
/// deauth policy has already fired.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    #[error("network failure: {0}")]
    Network(String),

    #[error("request timed out")]
    Timeout,

    #[error("server rejected the request ({status}): {message}")]
    Status { status: u16, message: String },

    #[error("malformed response: {0}")]
    Malformed(String),

    #[error("credential rejected, session deauthenticated")]
    Unauthorized,
}

// ═══════════════════════════════════════════════════════════
// Deauthentication policy
// ═══════════════════════════════════════════════════════════

/// Process-wide reaction to an invalid or expired credential.
///
/// Invoked by the gateway at the single point where `Unauthorized` is
/// produced, never by individual call sites, so the controllers stay
/// ignorant of session lifecycle.
pub trait DeauthPolicy: Send + Sync {
    fn deauthenticate(&self);
}

/// Policy that only logs. A reasonable default for embedders that handle
/// the `Unauthorized` variant themselves, and for tests.
pub struct LogOnlyDeauth;

impl DeauthPolicy for LogOnlyDeauth {
    fn deauthenticate(&self) {
        tracing::warn!("credential rejected and no deauth policy installed");
    }
}

// ═══════════════════════════════════════════════════════════
// Gateway contract
// ═══════════════════════════════════════════════════════════

/// Stateless request/response surface of the report API.
///
/// Implementations attach the ambient credential themselves; callers never
/// see authentication. Async methods make the trait non-object-safe, so the
/// services are generic over it rather than boxing it.
#[allow(async_fn_in_trait)]
pub trait ApiGateway {
    /// Submit one document for OCR, translation, and explanation.
    async fn upload_document(&self, payload: UploadPayload) -> Result<UploadReceipt, GatewayError>;

    /// Fetch the full processed report.
    async fn fetch_report(&self, id: &str) -> Result<ReportView, GatewayError>;

    /// List the caller's reports, newest first.
    async fn list_reports(&self) -> Result<Vec<ReportSummary>, GatewayError>;

    /// Delete a report and its chat history.
    async fn delete_report(&self, id: &str) -> Result<(), GatewayError>;

    /// Ask the assistant one question, optionally scoped to a report.
    async fn send_chat_message(
        &self,
        subject_id: Option<&str>,
        text: &str,
        timestamp: DateTime<Utc>,
    ) -> Result<AssistantReply, GatewayError>;

    /// Fetch the stored transcript for a report-scoped conversation.
    async fn fetch_chat_history(&self, subject_id: &str) -> Result<Vec<Message>, GatewayError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gateway_errors_are_human_readable() {
        let err = GatewayError::Status {
            status: 400,
            message: "File type not allowed".into(),
        };
        assert_eq!(
            err.to_string(),
            "server rejected the request (400): File type not allowed"
        );
        assert_eq!(GatewayError::Timeout.to_string(), "request timed out");
    }
}
