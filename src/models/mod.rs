pub mod enums;
pub mod message;
pub mod report;

pub use enums::{MimeClass, ReportStatus, Sender};
pub use message::{AssistantReply, Message};
pub use report::{ReportSummary, ReportView, UploadReceipt};
