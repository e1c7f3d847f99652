use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::enums::ReportStatus;

/// Identity handed back by the upload endpoint once the pipeline accepts
/// a submission. `report_id` is opaque to the client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadReceipt {
    pub report_id: String,
    pub status: ReportStatus,
}

/// One row in the report list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportSummary {
    pub id: String,
    pub title: String,
    pub file_type: String,
    pub status: ReportStatus,
    pub created_at: Option<DateTime<Utc>>,
}

/// Full report detail: original text plus the pipeline's translation,
/// explanation, and tips, as returned by the server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportView {
    pub id: String,
    pub title: String,
    pub file_type: String,
    pub status: ReportStatus,
    pub original_content: Option<String>,
    pub translated_content: Option<String>,
    pub translated_language: Option<String>,
    pub explanation: Option<String>,
    pub health_tips: Option<String>,
    /// Findings list, opaque to the client (the server owns its shape).
    pub key_findings: Vec<serde_json::Value>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn receipt_round_trips() {
        let receipt = UploadReceipt {
            report_id: "r1".into(),
            status: ReportStatus::Processed,
        };
        let json = serde_json::to_string(&receipt).unwrap();
        let back: UploadReceipt = serde_json::from_str(&json).unwrap();
        assert_eq!(back.report_id, "r1");
        assert_eq!(back.status, ReportStatus::Processed);
    }

    #[test]
    fn report_view_tolerates_missing_optionals() {
        let view = ReportView {
            id: "7".into(),
            title: "Medical Report".into(),
            file_type: "pdf".into(),
            status: ReportStatus::Processing,
            original_content: None,
            translated_content: None,
            translated_language: None,
            explanation: None,
            health_tips: None,
            key_findings: Vec::new(),
            created_at: None,
            updated_at: None,
        };
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["status"], "processing");
        assert!(json["explanation"].is_null());
    }
}
