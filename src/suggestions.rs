//! Canned prompt suggestions shown next to an empty chat input.

use serde::Serialize;

/// One tappable starter question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PromptSuggestion {
    pub text: &'static str,
}

/// Starter questions for a report-scoped conversation, in display order.
pub fn quick_questions() -> &'static [PromptSuggestion] {
    const QUESTIONS: &[PromptSuggestion] = &[
        PromptSuggestion {
            text: "What does this report mean?",
        },
        PromptSuggestion {
            text: "Are there any concerning findings?",
        },
        PromptSuggestion {
            text: "What should I do next?",
        },
        PromptSuggestion {
            text: "Can you explain the medical terms?",
        },
        PromptSuggestion {
            text: "What lifestyle changes do you recommend?",
        },
    ];
    QUESTIONS
}
