use serde::{Deserialize, Serialize};

/// Who authored a transcript message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    /// The AI assistant. The report API writes this as `"ai"`.
    #[serde(alias = "ai")]
    Assistant,
}

impl Sender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

/// Server-side processing status of an uploaded report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportStatus {
    Processing,
    Processed,
    Failed,
}

impl ReportStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Processing => "processing",
            Self::Processed => "processed",
            Self::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Processing)
    }
}

/// Broad content classes accepted for submission.
///
/// Derived from the *declared* content type of an offered file. The server
/// re-validates, so magic-byte sniffing stays on its side of the boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MimeClass {
    Pdf,
    Image,
    Text,
    Other,
}

impl MimeClass {
    /// Classify a declared content type (`application/pdf`, `image/*`,
    /// `text/plain`). Parameters after `;` are ignored.
    pub fn from_content_type(content_type: &str) -> Self {
        let essence = content_type
            .split(';')
            .next()
            .unwrap_or("")
            .trim()
            .to_ascii_lowercase();

        if essence == "application/pdf" {
            Self::Pdf
        } else if essence.starts_with("image/") {
            Self::Image
        } else if essence == "text/plain" {
            Self::Text
        } else {
            Self::Other
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Image => "image",
            Self::Text => "text",
            Self::Other => "other",
        }
    }

    pub fn is_accepted(&self) -> bool {
        !matches!(self, Self::Other)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── Sender ──

    #[test]
    fn sender_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Sender::User).unwrap(), "\"user\"");
        assert_eq!(
            serde_json::to_string(&Sender::Assistant).unwrap(),
            "\"assistant\""
        );
    }

    #[test]
    fn sender_accepts_wire_alias_ai() {
        let sender: Sender = serde_json::from_str("\"ai\"").unwrap();
        assert_eq!(sender, Sender::Assistant);
        let sender: Sender = serde_json::from_str("\"assistant\"").unwrap();
        assert_eq!(sender, Sender::Assistant);
    }

    // ── ReportStatus ──

    #[test]
    fn status_round_trips_wire_values() {
        for (status, wire) in [
            (ReportStatus::Processing, "\"processing\""),
            (ReportStatus::Processed, "\"processed\""),
            (ReportStatus::Failed, "\"failed\""),
        ] {
            assert_eq!(serde_json::to_string(&status).unwrap(), wire);
            assert_eq!(serde_json::from_str::<ReportStatus>(wire).unwrap(), status);
        }
    }

    #[test]
    fn only_processing_is_non_terminal() {
        assert!(!ReportStatus::Processing.is_terminal());
        assert!(ReportStatus::Processed.is_terminal());
        assert!(ReportStatus::Failed.is_terminal());
    }

    // ── MimeClass ──

    #[test]
    fn classify_pdf() {
        assert_eq!(
            MimeClass::from_content_type("application/pdf"),
            MimeClass::Pdf
        );
    }

    #[test]
    fn classify_any_image_subtype() {
        assert_eq!(MimeClass::from_content_type("image/png"), MimeClass::Image);
        assert_eq!(MimeClass::from_content_type("image/jpeg"), MimeClass::Image);
        assert_eq!(MimeClass::from_content_type("image/heic"), MimeClass::Image);
    }

    #[test]
    fn classify_plain_text_with_charset_parameter() {
        assert_eq!(
            MimeClass::from_content_type("text/plain; charset=utf-8"),
            MimeClass::Text
        );
    }

    #[test]
    fn classify_is_case_insensitive() {
        assert_eq!(
            MimeClass::from_content_type("Application/PDF"),
            MimeClass::Pdf
        );
    }

    #[test]
    fn other_types_are_not_accepted() {
        assert_eq!(
            MimeClass::from_content_type("application/zip"),
            MimeClass::Other
        );
        assert_eq!(MimeClass::from_content_type(""), MimeClass::Other);
        assert!(!MimeClass::Other.is_accepted());
        assert!(MimeClass::Pdf.is_accepted());
    }
}
