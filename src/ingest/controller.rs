//! Client-side ingestion state machine.
//!
//! Owns the lifecycle of one staged file from selection through terminal
//! success or failure. Pure and synchronous: the async driver
//! (`ingest::service`) feeds it ticks and resolutions, so every transition
//! is unit-testable without a runtime or real time passing.
//!
//! ```text
//! Idle -stage(ok)-> Staged -submit()-> Submitting -resolve(ok)-> Succeeded
//! Idle -stage(bad)-> Rejected
//! Staged -remove()-> Idle
//! Submitting -resolve(err)-> Failed
//! Failed -remove()/stage()/rearm()-> Idle/Staged
//! ```

use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::config;
use crate::gateway::{GatewayError, UploadPayload};
use crate::models::{MimeClass, UploadReceipt};

// ═══════════════════════════════════════════════════════════
// Offers and staged files
// ═══════════════════════════════════════════════════════════

/// One file as handed over by a drop/select event: declared metadata plus
/// the payload bytes.
#[derive(Debug, Clone)]
pub struct FileOffer {
    pub name: String,
    /// Declared content type. May be empty (some browsers omit it), in which
    /// case the extension-based guess a browser would have used applies.
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Handle the presentation layer uses to address the staged image bytes.
/// Owned by the controller and dropped (released) when the file is removed
/// or replaced; present only for image files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PreviewRef(Uuid);

/// The single file held for submission. Payload ownership is exclusive to
/// the controller until submission or removal.
#[derive(Debug, Clone)]
pub struct StagedFile {
    id: Uuid,
    name: String,
    content_type: String,
    mime_class: MimeClass,
    bytes: Vec<u8>,
    preview: Option<PreviewRef>,
}

impl StagedFile {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn mime_class(&self) -> MimeClass {
        self.mime_class
    }

    pub fn size_bytes(&self) -> u64 {
        self.bytes.len() as u64
    }

    pub fn preview(&self) -> Option<PreviewRef> {
        self.preview
    }
}

/// Why a drop/select event was refused.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RejectReason {
    #[error("unsupported file type: {0}")]
    UnsupportedType(String),

    #[error("file too large: {size_mb:.1}MB exceeds {max_mb}MB limit")]
    Oversize { size_mb: f64, max_mb: u64 },

    #[error("only one file can be submitted at a time")]
    MultipleFiles,

    #[error("a submission is in flight")]
    SubmissionInFlight,
}

// ═══════════════════════════════════════════════════════════
// Phases and requests
// ═══════════════════════════════════════════════════════════

/// Lifecycle phase of the single staged submission. `Succeeded` and
/// `Rejected` are soft-terminal; a later explicit action leaves them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IngestPhase {
    Idle,
    Staged,
    Rejected,
    Submitting,
    Succeeded,
    Failed,
}

/// Upload request produced by `submit()`. The eventual resolution must
/// present the same generation or it is discarded as stale.
#[derive(Debug)]
pub struct UploadRequest {
    pub generation: u64,
    pub payload: UploadPayload,
}

/// Read-only projection for the presentation layer.
#[derive(Debug, Clone, Serialize)]
pub struct IngestSnapshot {
    pub phase: IngestPhase,
    pub progress: u8,
    pub target_language: String,
    pub file_name: Option<String>,
    pub file_size_bytes: Option<u64>,
    pub mime_class: Option<MimeClass>,
    pub preview: Option<PreviewRef>,
    pub result_ref: Option<String>,
    pub error_detail: Option<String>,
}

// ═══════════════════════════════════════════════════════════
// Controller
// ═══════════════════════════════════════════════════════════

use super::IngestError;

#[derive(Debug)]
pub struct IngestionController {
    phase: IngestPhase,
    staged: Option<StagedFile>,
    progress: u8,
    target_language: String,
    result_ref: Option<String>,
    error_detail: Option<String>,
    /// Bumped on every submission; resolutions carrying an older value are
    /// from a discarded request and must not mutate state.
    generation: u64,
}

impl IngestionController {
    pub fn new() -> Self {
        Self {
            phase: IngestPhase::Idle,
            staged: None,
            progress: 0,
            target_language: "en".to_string(),
            result_ref: None,
            error_detail: None,
            generation: 0,
        }
    }

    // ── Accessors ────────────────────────────────────────

    pub fn phase(&self) -> IngestPhase {
        self.phase
    }

    /// Perceived progress percent; meaningful only while `Submitting`
    /// (frozen at its last value in `Failed`).
    pub fn progress(&self) -> u8 {
        self.progress
    }

    pub fn staged(&self) -> Option<&StagedFile> {
        self.staged.as_ref()
    }

    pub fn target_language(&self) -> &str {
        &self.target_language
    }

    /// Server-side report ID; populated only on `Succeeded`.
    pub fn result_ref(&self) -> Option<&str> {
        self.result_ref.as_deref()
    }

    pub fn error_detail(&self) -> Option<&str> {
        self.error_detail.as_deref()
    }

    pub fn snapshot(&self) -> IngestSnapshot {
        IngestSnapshot {
            phase: self.phase,
            progress: self.progress,
            target_language: self.target_language.clone(),
            file_name: self.staged.as_ref().map(|f| f.name.clone()),
            file_size_bytes: self.staged.as_ref().map(StagedFile::size_bytes),
            mime_class: self.staged.as_ref().map(|f| f.mime_class),
            preview: self.staged.as_ref().and_then(|f| f.preview),
            result_ref: self.result_ref.clone(),
            error_detail: self.error_detail.clone(),
        }
    }

    // ── Staging ──────────────────────────────────────────

    /// Handle a drop/select event. Exactly one file is accepted; a valid
    /// offer replaces any prior staging (releasing its preview), a refused
    /// one records the reason without touching prior valid state. Offers
    /// are refused outright while a submission is in flight, so a stray
    /// drop cannot abandon a live upload.
    pub fn stage(&mut self, mut offers: Vec<FileOffer>) -> Result<(), RejectReason> {
        if self.phase == IngestPhase::Submitting {
            // Refused without the Rejected transition: flipping the phase
            // here would orphan the in-flight resolution.
            return Err(RejectReason::SubmissionInFlight);
        }
        if offers.len() > 1 {
            return self.reject(RejectReason::MultipleFiles);
        }
        let Some(offer) = offers.pop() else {
            // Empty drop events happen (drag of a non-file); not a transition.
            return Ok(());
        };

        let content_type = effective_content_type(&offer);
        let mime_class = MimeClass::from_content_type(&content_type);
        if !mime_class.is_accepted() {
            return self.reject(RejectReason::UnsupportedType(content_type));
        }
        if offer.bytes.len() as u64 > config::MAX_UPLOAD_BYTES {
            return self.reject(RejectReason::Oversize {
                size_mb: offer.bytes.len() as f64 / (1024.0 * 1024.0),
                max_mb: config::MAX_UPLOAD_BYTES / (1024 * 1024),
            });
        }

        tracing::debug!(file = %offer.name, class = mime_class.as_str(), "file staged");
        let id = Uuid::new_v4();
        let preview = matches!(mime_class, MimeClass::Image).then_some(PreviewRef(id));
        // Assigning over the previous staging drops it, preview included.
        self.staged = Some(StagedFile {
            id,
            name: offer.name,
            content_type,
            mime_class,
            bytes: offer.bytes,
            preview,
        });
        self.phase = IngestPhase::Staged;
        self.progress = 0;
        self.result_ref = None;
        self.error_detail = None;
        Ok(())
    }

    fn reject(&mut self, reason: RejectReason) -> Result<(), RejectReason> {
        // Presentation feedback only: a previously staged valid file
        // survives the rejection untouched.
        self.phase = IngestPhase::Rejected;
        self.error_detail = Some(reason.to_string());
        tracing::debug!(%reason, "file offer rejected");
        Err(reason)
    }

    /// Release the staged file (and its preview) and return to `Idle`.
    /// Idempotent.
    pub fn remove(&mut self) {
        self.staged = None;
        self.phase = IngestPhase::Idle;
        self.progress = 0;
        self.result_ref = None;
        self.error_detail = None;
    }

    /// Pure field update; legal in any phase, never affects it.
    pub fn set_target_language(&mut self, code: impl Into<String>) {
        self.target_language = code.into();
    }

    // ── Submission ───────────────────────────────────────

    /// Begin submitting the staged file. Legal only from `Staged`; any
    /// other phase is a rejected call (no transition, no double submit).
    pub fn submit(&mut self) -> Result<UploadRequest, IngestError> {
        match self.phase {
            IngestPhase::Staged => {}
            IngestPhase::Submitting => return Err(IngestError::AlreadySubmitting),
            _ => return Err(IngestError::NotStaged),
        }
        let staged = self.staged.as_ref().ok_or(IngestError::NotStaged)?;

        self.generation += 1;
        self.phase = IngestPhase::Submitting;
        self.progress = 0;
        self.error_detail = None;

        let payload = UploadPayload {
            file_name: staged.name.clone(),
            bytes: staged.bytes.clone(),
            mime_class: staged.mime_class,
            content_type: staged.content_type.clone(),
            target_language: self.target_language.clone(),
            title: config::DEFAULT_REPORT_TITLE.to_string(),
        };
        tracing::debug!(
            generation = self.generation,
            size = payload.bytes.len(),
            "submission issued"
        );
        Ok(UploadRequest {
            generation: self.generation,
            payload,
        })
    }

    /// One perceived-progress step. The transport reports only start and
    /// finish, so this simulates motion: monotonic, fixed step, held at the
    /// ceiling until the real result arrives.
    pub fn tick(&mut self) {
        if self.phase != IngestPhase::Submitting {
            return;
        }
        self.progress = self
            .progress
            .saturating_add(config::PROGRESS_TICK_STEP)
            .min(config::PROGRESS_CEILING);
    }

    /// Apply the outcome of the upload request tagged `generation`.
    ///
    /// A stale generation, or a controller no longer `Submitting` (removed
    /// or re-staged mid-flight), means the request belongs to a discarded
    /// episode: the resolution is dropped without mutating anything.
    pub fn resolve(&mut self, generation: u64, outcome: Result<UploadReceipt, GatewayError>) {
        if generation != self.generation || self.phase != IngestPhase::Submitting {
            tracing::debug!(
                generation,
                current = self.generation,
                "stale submission resolution ignored"
            );
            return;
        }
        match outcome {
            Ok(receipt) => {
                self.progress = 100;
                self.phase = IngestPhase::Succeeded;
                tracing::info!(report_id = %receipt.report_id, "submission succeeded");
                self.result_ref = Some(receipt.report_id);
            }
            Err(err) => {
                // Progress stays at its last observed tick; the staged file
                // and the chosen language survive for a retry.
                self.phase = IngestPhase::Failed;
                tracing::warn!(error = %err, "submission failed");
                self.error_detail = Some(err.to_string());
            }
        }
    }

    /// Explicit retry: leave `Failed`/`Rejected` for `Staged` (file still
    /// held) or `Idle` (nothing held), clearing the failure detail.
    pub fn rearm(&mut self) {
        if !matches!(self.phase, IngestPhase::Failed | IngestPhase::Rejected) {
            return;
        }
        self.error_detail = None;
        self.progress = 0;
        self.phase = if self.staged.is_some() {
            IngestPhase::Staged
        } else {
            IngestPhase::Idle
        };
    }
}

impl Default for IngestionController {
    fn default() -> Self {
        Self::new()
    }
}

/// Declared content type, or the extension-based guess a browser would
/// have made when the declaration is empty.
fn effective_content_type(offer: &FileOffer) -> String {
    let declared = offer.content_type.trim();
    if !declared.is_empty() {
        return declared.to_string();
    }
    mime_guess::from_path(&offer.name)
        .first_raw()
        .unwrap_or("application/octet-stream")
        .to_string()
}

// ═══════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════
