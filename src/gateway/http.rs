//! reqwest-backed `ApiGateway` against the report REST API.
//!
//! Owns the two cross-cutting concerns at this boundary:
//! - every request carries the ambient bearer credential, and
//! - a 401 response fires the injected `DeauthPolicy` exactly once and maps
//!   to `GatewayError::Unauthorized`, short-circuiting the caller.
//!
//! Non-success responses surface the server's `{"error": "..."}` body text
//! so terminal failures stay human-readable.

use std::sync::{Arc, RwLock};

use chrono::{DateTime, NaiveDateTime, Utc};
use reqwest::multipart::{Form, Part};
use reqwest::StatusCode;
use serde::Deserialize;
use uuid::Uuid;

use crate::config;
use crate::models::{
    AssistantReply, Message, ReportStatus, ReportSummary, ReportView, Sender, UploadReceipt,
};

use super::{ApiGateway, DeauthPolicy, GatewayError, UploadPayload};

// ═══════════════════════════════════════════════════════════
// HttpGateway
// ═══════════════════════════════════════════════════════════

pub struct HttpGateway {
    http: reqwest::Client,
    base_url: String,
    credential: RwLock<Option<String>>,
    deauth: Arc<dyn DeauthPolicy>,
}

impl HttpGateway {
    /// Build a gateway for `base_url` (no trailing slash needed) with the
    /// fixed request timeout from `config`.
    pub fn new(
        base_url: impl Into<String>,
        deauth: Arc<dyn DeauthPolicy>,
    ) -> Result<Self, GatewayError> {
        let http = reqwest::Client::builder()
            .timeout(config::REQUEST_TIMEOUT)
            .build()
            .map_err(|e| GatewayError::Network(e.to_string()))?;

        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self {
            http,
            base_url,
            credential: RwLock::new(None),
            deauth,
        })
    }

    /// Install the ambient credential attached to every subsequent request.
    pub fn set_credential(&self, token: impl Into<String>) {
        if let Ok(mut slot) = self.credential.write() {
            *slot = Some(token.into());
        }
    }

    /// Drop the ambient credential (logout).
    pub fn clear_credential(&self) {
        if let Ok(mut slot) = self.credential.write() {
            *slot = None;
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorize(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        let token = self.credential.read().ok().and_then(|slot| slot.clone());
        match token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Normalize a response. 401 is handled here, once, for every endpoint.
    async fn check(&self, response: reqwest::Response) -> Result<reqwest::Response, GatewayError> {
        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            tracing::warn!("credential rejected by server, deauthenticating");
            self.deauth.deauthenticate();
            return Err(GatewayError::Unauthorized);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<WireError>(&body)
                .map(|e| e.error)
                .unwrap_or(body);
            return Err(GatewayError::Status {
                status: status.as_u16(),
                message,
            });
        }
        Ok(response)
    }

    async fn parse<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, GatewayError> {
        response
            .json::<T>()
            .await
            .map_err(|e| GatewayError::Malformed(e.to_string()))
    }
}

fn transport_error(err: reqwest::Error) -> GatewayError {
    if err.is_timeout() {
        GatewayError::Timeout
    } else {
        GatewayError::Network(err.to_string())
    }
}

// ═══════════════════════════════════════════════════════════
// ApiGateway implementation
// ═══════════════════════════════════════════════════════════

impl ApiGateway for HttpGateway {
    async fn upload_document(&self, payload: UploadPayload) -> Result<UploadReceipt, GatewayError> {
        let part = Part::bytes(payload.bytes)
            .file_name(payload.file_name)
            .mime_str(&payload.content_type)
            .map_err(|e| GatewayError::Network(e.to_string()))?;
        let form = Form::new()
            .part("file", part)
            .text("targetLanguage", payload.target_language)
            .text("title", payload.title);

        let response = self
            .authorize(self.http.post(self.url("/reports/upload")))
            .multipart(form)
            .send()
            .await
            .map_err(transport_error)?;
        let body: WireReportEnvelope = Self::parse(self.check(response).await?).await?;
        Ok(UploadReceipt {
            report_id: body.report.id.into_string(),
            status: body.report.status,
        })
    }

    async fn fetch_report(&self, id: &str) -> Result<ReportView, GatewayError> {
        let response = self
            .authorize(self.http.get(self.url(&format!("/reports/{id}"))))
            .send()
            .await
            .map_err(transport_error)?;
        let body: WireReportEnvelope = Self::parse(self.check(response).await?).await?;
        Ok(body.report.into_view())
    }

    async fn list_reports(&self) -> Result<Vec<ReportSummary>, GatewayError> {
        let response = self
            .authorize(self.http.get(self.url("/reports")))
            .send()
            .await
            .map_err(transport_error)?;
        let body: WireReportList = Self::parse(self.check(response).await?).await?;
        Ok(body.reports.into_iter().map(WireReport::into_summary).collect())
    }

    async fn delete_report(&self, id: &str) -> Result<(), GatewayError> {
        let response = self
            .authorize(self.http.delete(self.url(&format!("/reports/{id}"))))
            .send()
            .await
            .map_err(transport_error)?;
        self.check(response).await?;
        Ok(())
    }

    async fn send_chat_message(
        &self,
        subject_id: Option<&str>,
        text: &str,
        timestamp: DateTime<Utc>,
    ) -> Result<AssistantReply, GatewayError> {
        let body = serde_json::json!({
            "reportId": subject_id.map(wire_id_value),
            "message": text,
            "timestamp": timestamp.to_rfc3339(),
        });
        let response = self
            .authorize(self.http.post(self.url("/chat/message")))
            .json(&body)
            .send()
            .await
            .map_err(transport_error)?;
        let body: WireChatEnvelope = Self::parse(self.check(response).await?).await?;
        Ok(AssistantReply {
            text: body.ai_response.message,
            timestamp: body
                .ai_response
                .timestamp
                .as_deref()
                .and_then(parse_wire_timestamp)
                .unwrap_or_else(Utc::now),
        })
    }

    async fn fetch_chat_history(&self, subject_id: &str) -> Result<Vec<Message>, GatewayError> {
        let response = self
            .authorize(
                self.http
                    .get(self.url(&format!("/chat/history/{subject_id}"))),
            )
            .send()
            .await
            .map_err(transport_error)?;
        let body: WireChatHistory = Self::parse(self.check(response).await?).await?;
        Ok(body
            .messages
            .into_iter()
            .map(WireChatMessage::into_message)
            .collect())
    }
}

// ═══════════════════════════════════════════════════════════
// Wire types
// ═══════════════════════════════════════════════════════════

#[derive(Debug, Deserialize)]
struct WireError {
    error: String,
}

/// The server uses numeric IDs; the client treats them as opaque strings.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum WireId {
    Num(i64),
    Str(String),
}

impl WireId {
    fn into_string(self) -> String {
        match self {
            Self::Num(n) => n.to_string(),
            Self::Str(s) => s,
        }
    }
}

/// Mirror of the numeric-or-string ID for outbound bodies.
fn wire_id_value(id: &str) -> serde_json::Value {
    match id.parse::<i64>() {
        Ok(n) => serde_json::Value::from(n),
        Err(_) => serde_json::Value::from(id),
    }
}

#[derive(Debug, Deserialize)]
struct WireReportEnvelope {
    report: WireReport,
}

#[derive(Debug, Deserialize)]
struct WireReportList {
    reports: Vec<WireReport>,
}

#[derive(Debug, Deserialize)]
struct WireReport {
    id: WireId,
    title: String,
    file_type: String,
    status: ReportStatus,
    #[serde(default)]
    original_content: Option<String>,
    #[serde(default)]
    translated_content: Option<String>,
    #[serde(default)]
    translated_language: Option<String>,
    #[serde(default)]
    explanation: Option<String>,
    #[serde(default)]
    health_tips: Option<String>,
    #[serde(default)]
    key_findings: Vec<serde_json::Value>,
    #[serde(default)]
    created_at: Option<String>,
    #[serde(default)]
    updated_at: Option<String>,
}

impl WireReport {
    fn into_summary(self) -> ReportSummary {
        ReportSummary {
            created_at: self.created_at.as_deref().and_then(parse_wire_timestamp),
            id: self.id.into_string(),
            title: self.title,
            file_type: self.file_type,
            status: self.status,
        }
    }

    fn into_view(self) -> ReportView {
        ReportView {
            created_at: self.created_at.as_deref().and_then(parse_wire_timestamp),
            updated_at: self.updated_at.as_deref().and_then(parse_wire_timestamp),
            id: self.id.into_string(),
            title: self.title,
            file_type: self.file_type,
            status: self.status,
            original_content: self.original_content,
            translated_content: self.translated_content,
            translated_language: self.translated_language,
            explanation: self.explanation,
            health_tips: self.health_tips,
            key_findings: self.key_findings,
        }
    }
}

#[derive(Debug, Deserialize)]
struct WireChatEnvelope {
    #[serde(rename = "aiResponse")]
    ai_response: WireChatMessage,
}

#[derive(Debug, Deserialize)]
struct WireChatHistory {
    messages: Vec<WireChatMessage>,
}

#[derive(Debug, Deserialize)]
struct WireChatMessage {
    sender: Sender,
    message: String,
    #[serde(default)]
    timestamp: Option<String>,
}

impl WireChatMessage {
    fn into_message(self) -> Message {
        Message {
            id: Uuid::new_v4(),
            sender: self.sender,
            text: self.message,
            timestamp: self
                .timestamp
                .as_deref()
                .and_then(parse_wire_timestamp)
                .unwrap_or_else(Utc::now),
        }
    }
}

/// The server emits naive `datetime.isoformat()` strings (no offset).
/// Accept those as UTC, and RFC 3339 for good measure.
fn parse_wire_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(stamp) = DateTime::parse_from_rfc3339(raw) {
        return Some(stamp.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}
