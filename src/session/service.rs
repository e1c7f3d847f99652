//! Async driver wiring the session manager to the API gateway.

use std::sync::{Arc, Mutex, MutexGuard};

use crate::gateway::ApiGateway;

use super::manager::SessionManager;
use super::transcript::TranscriptSnapshot;
use super::ChatError;

pub struct ChatService<G> {
    manager: Arc<Mutex<SessionManager>>,
    gateway: Arc<G>,
}

impl<G: ApiGateway> ChatService<G> {
    pub fn new(gateway: Arc<G>) -> Self {
        Self {
            manager: Arc::new(Mutex::new(SessionManager::new())),
            gateway,
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, SessionManager>, ChatError> {
        self.manager.lock().map_err(|_| ChatError::LockPoisoned)
    }

    /// Switch the conversation to a subject. Report-scoped sessions load
    /// the stored transcript; the general session starts empty.
    pub async fn activate(&self, subject_id: Option<&str>) -> Result<TranscriptSnapshot, ChatError> {
        let messages = match subject_id {
            Some(id) => self.gateway.fetch_chat_history(id).await?,
            None => Vec::new(),
        };
        let mut manager = self.lock()?;
        manager.load_history(subject_id.map(str::to_string), messages);
        Ok(manager.snapshot())
    }

    /// Send one question and wait for the assistant's answer. The echoed
    /// question is visible in snapshots as soon as this is called; the
    /// returned snapshot reflects the terminal outcome.
    pub async fn send(&self, text: &str) -> Result<TranscriptSnapshot, ChatError> {
        let outbound = self.lock()?.send(text)?;

        let outcome = self
            .gateway
            .send_chat_message(outbound.subject_id.as_deref(), &outbound.text, outbound.timestamp)
            .await;

        let mut manager = self.lock()?;
        manager.resolve_reply(outbound.generation, outcome);
        Ok(manager.snapshot())
    }

    pub fn snapshot(&self) -> Result<TranscriptSnapshot, ChatError> {
        Ok(self.lock()?.snapshot())
    }

    /// Consume the most recent send failure, if any.
    pub fn take_send_failure(&self) -> Result<Option<String>, ChatError> {
        Ok(self.lock()?.take_send_failure())
    }
}

// ═══════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::{GatewayError, UploadPayload};
    use crate::models::{
        AssistantReply, Message, ReportSummary, ReportView, Sender, UploadReceipt,
    };
    use crate::session::SendError;
    use chrono::{DateTime, Utc};
    use tokio::sync::Notify;

    /// Gateway whose chat reply blocks until released.
    struct GatedChatGateway {
        release: Notify,
        reply: Mutex<Option<Result<AssistantReply, GatewayError>>>,
        history: Vec<Message>,
    }

    impl GatedChatGateway {
        fn new(reply: Result<AssistantReply, GatewayError>) -> Self {
            Self {
                release: Notify::new(),
                reply: Mutex::new(Some(reply)),
                history: Vec::new(),
            }
        }

        fn with_history(mut self, history: Vec<Message>) -> Self {
            self.history = history;
            self
        }
    }

    impl ApiGateway for GatedChatGateway {
        async fn upload_document(
            &self,
            _payload: UploadPayload,
        ) -> Result<UploadReceipt, GatewayError> {
            unimplemented!("not exercised")
        }

        async fn fetch_report(&self, _id: &str) -> Result<ReportView, GatewayError> {
            unimplemented!("not exercised")
        }

        async fn list_reports(&self) -> Result<Vec<ReportSummary>, GatewayError> {
            unimplemented!("not exercised")
        }

        async fn delete_report(&self, _id: &str) -> Result<(), GatewayError> {
            unimplemented!("not exercised")
        }

        async fn send_chat_message(
            &self,
            _subject_id: Option<&str>,
            _text: &str,
            _timestamp: DateTime<Utc>,
        ) -> Result<AssistantReply, GatewayError> {
            self.release.notified().await;
            self.reply.lock().unwrap().take().unwrap()
        }

        async fn fetch_chat_history(&self, _subject_id: &str) -> Result<Vec<Message>, GatewayError> {
            Ok(self.history.clone())
        }
    }

    fn reply(text: &str) -> Result<AssistantReply, GatewayError> {
        Ok(AssistantReply {
            text: text.to_string(),
            timestamp: Utc::now(),
        })
    }

    #[tokio::test]
    async fn question_echoes_before_the_reply_lands() {
        let gateway = Arc::new(GatedChatGateway::new(reply("Short answer.")));
        let service = Arc::new(ChatService::new(Arc::clone(&gateway)));

        let runner = Arc::clone(&service);
        let send = tokio::spawn(async move { runner.send("What does this mean?").await });

        // The echo and pending flag are visible while the reply is gated.
        loop {
            let snap = service.snapshot().unwrap();
            if snap.pending_reply {
                assert_eq!(snap.messages.len(), 1);
                assert_eq!(snap.messages[0].sender, Sender::User);
                break;
            }
            tokio::task::yield_now().await;
        }

        gateway.release.notify_one();
        let snap = send.await.unwrap().unwrap();
        assert_eq!(snap.messages.len(), 2);
        assert_eq!(snap.messages[1].text, "Short answer.");
        assert!(!snap.pending_reply);
    }

    #[tokio::test]
    async fn second_question_refused_while_first_is_in_flight() {
        let gateway = Arc::new(GatedChatGateway::new(reply("answer")));
        let service = Arc::new(ChatService::new(Arc::clone(&gateway)));

        let runner = Arc::clone(&service);
        let first = tokio::spawn(async move { runner.send("first").await });
        while !service.snapshot().unwrap().pending_reply {
            tokio::task::yield_now().await;
        }

        let refused = service.send("second").await;
        assert!(matches!(
            refused,
            Err(ChatError::Send(SendError::ReplyPending))
        ));

        gateway.release.notify_one();
        first.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn failed_reply_sets_consumable_failure() {
        let gateway = Arc::new(GatedChatGateway::new(Err(GatewayError::Timeout)));
        let service = Arc::new(ChatService::new(Arc::clone(&gateway)));

        let runner = Arc::clone(&service);
        let send = tokio::spawn(async move { runner.send("question").await });
        while !service.snapshot().unwrap().pending_reply {
            tokio::task::yield_now().await;
        }
        gateway.release.notify_one();

        let snap = send.await.unwrap().unwrap();
        assert_eq!(snap.messages.len(), 1, "echo survives");
        assert!(!snap.pending_reply);
        assert_eq!(
            service.take_send_failure().unwrap().as_deref(),
            Some("request timed out")
        );
    }

    #[tokio::test]
    async fn activation_loads_report_history() {
        let stored = vec![
            Message::user("earlier question"),
            Message::assistant("earlier answer", Utc::now()),
        ];
        let gateway = Arc::new(GatedChatGateway::new(reply("unused")).with_history(stored));
        let service = ChatService::new(gateway);

        let snap = service.activate(Some("r1")).await.unwrap();
        assert_eq!(snap.subject_id.as_deref(), Some("r1"));
        assert_eq!(snap.messages.len(), 2);
    }

    #[tokio::test]
    async fn general_session_starts_empty_without_a_fetch() {
        let gateway = Arc::new(GatedChatGateway::new(reply("unused")));
        let service = ChatService::new(gateway);

        let snap = service.activate(None).await.unwrap();
        assert!(snap.subject_id.is_none());
        assert!(snap.messages.is_empty());
    }

    #[tokio::test]
    async fn navigation_mid_flight_discards_the_late_reply() {
        let gateway = Arc::new(GatedChatGateway::new(reply("late answer")));
        let service = Arc::new(ChatService::new(Arc::clone(&gateway)));
        service.activate(Some("r1")).await.unwrap();

        let runner = Arc::clone(&service);
        let send = tokio::spawn(async move { runner.send("about r1").await });
        while !service.snapshot().unwrap().pending_reply {
            tokio::task::yield_now().await;
        }

        service.activate(Some("r2")).await.unwrap();
        gateway.release.notify_one();
        let snap = send.await.unwrap().unwrap();

        assert_eq!(snap.subject_id.as_deref(), Some("r2"));
        assert!(snap.messages.is_empty(), "r1's exchange must not leak into r2");
    }
}
