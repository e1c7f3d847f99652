//! Async driver wiring the ingestion controller to the API gateway.
//!
//! The controller is pure; this service owns the lock around it, arms the
//! progress ticker for the duration of each upload, and applies the
//! resolution when the transport answers.

use std::sync::{Arc, Mutex, MutexGuard};

use crate::config;
use crate::gateway::ApiGateway;

use super::controller::{FileOffer, IngestSnapshot, IngestionController};
use super::ticker::ProgressScheduler;
use super::IngestError;

pub struct IngestionService<G> {
    controller: Arc<Mutex<IngestionController>>,
    gateway: Arc<G>,
    scheduler: Arc<dyn ProgressScheduler>,
}

impl<G: ApiGateway> IngestionService<G> {
    pub fn new(gateway: Arc<G>, scheduler: Arc<dyn ProgressScheduler>) -> Self {
        Self {
            controller: Arc::new(Mutex::new(IngestionController::new())),
            gateway,
            scheduler,
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, IngestionController>, IngestError> {
        self.controller.lock().map_err(|_| IngestError::LockPoisoned)
    }

    /// Handle a drop/select event. On rejection the error carries the
    /// reason and any prior valid staging survives.
    pub fn stage(&self, offers: Vec<FileOffer>) -> Result<IngestSnapshot, IngestError> {
        let mut controller = self.lock()?;
        let result = controller.stage(offers);
        let snapshot = controller.snapshot();
        drop(controller);
        result.map_err(IngestError::from)?;
        Ok(snapshot)
    }

    pub fn remove(&self) -> Result<IngestSnapshot, IngestError> {
        let mut controller = self.lock()?;
        controller.remove();
        Ok(controller.snapshot())
    }

    pub fn rearm(&self) -> Result<IngestSnapshot, IngestError> {
        let mut controller = self.lock()?;
        controller.rearm();
        Ok(controller.snapshot())
    }

    pub fn set_target_language(&self, code: &str) -> Result<(), IngestError> {
        self.lock()?.set_target_language(code);
        Ok(())
    }

    pub fn snapshot(&self) -> Result<IngestSnapshot, IngestError> {
        Ok(self.lock()?.snapshot())
    }

    /// Submit the staged file and wait for the terminal outcome.
    ///
    /// The ticker advances perceived progress on its own interval while the
    /// request is in flight; its guard is cancelled before resolution so no
    /// tick can land after the terminal phase is set.
    pub async fn submit(&self) -> Result<IngestSnapshot, IngestError> {
        let request = self.lock()?.submit()?;

        let controller = Arc::clone(&self.controller);
        let ticker = self.scheduler.schedule_repeating(
            config::PROGRESS_TICK_INTERVAL,
            Box::new(move || {
                if let Ok(mut guard) = controller.lock() {
                    guard.tick();
                }
            }),
        );

        let outcome = self.gateway.upload_document(request.payload).await;
        ticker.cancel();

        let mut controller = self.lock()?;
        controller.resolve(request.generation, outcome);
        Ok(controller.snapshot())
    }
}

// ═══════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════
