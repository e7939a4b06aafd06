//! Conversation state and per-chat session data.

use serde::{Deserialize, Serialize};
use teloxide::dispatching::dialogue::{Dialogue, InMemStorage};

/// The two languages the bot speaks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Language {
    En,
    Ar,
}

impl Language {
    /// The locale tag used by the message catalog.
    pub fn tag(&self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Ar => "ar",
        }
    }

    /// Parses a language choice coming from the inline keyboard.
    pub fn parse(code: &str) -> Option<Self> {
        match code {
            "en" => Some(Language::En),
            "ar" => Some(Language::Ar),
            _ => None,
        }
    }

    /// Maps a Telegram `language_code` to a provisional language, used only
    /// until the user picks one explicitly.
    pub fn from_telegram(code: Option<&str>) -> Option<Self> {
        let code = code?;
        if code == "ar" || code.starts_with("ar-") {
            Some(Language::Ar)
        } else {
            Some(Language::En)
        }
    }
}

/// Who the user said they are during onboarding.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    Activist,
    Organization,
}

/// Named points of the conversation graph.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChatState {
    #[default]
    Start,
    SetLanguage,
    SetRole,
    UploadProfile,
    ChooseTask,
    AnalysisTools,
    ProblemTree,
    Swot,
    Pestel,
    CreateNote,
    WriteProposal,
    FlowMenu,
    End,
}

/// Per-chat conversation context. Lives in `InMemStorage` for the duration
/// of the interaction; reset by `/start` and `/cancel`.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Session {
    pub state: ChatState,
    pub language: Option<Language>,
    pub role: Option<Role>,
    pub profile_text: Option<String>,
    pub last_problem: Option<String>,
    pub last_analysis: Option<String>,
}

/// Type alias for the bot's dialogue handle.
pub type SessionDialogue = Dialogue<Session, InMemStorage<Session>>;

/// Recognized choices of the task menu.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TaskChoice {
    AnalyzeProblem,
    CreateNote,
    WriteProposal,
    AnalysisTools,
}

impl TaskChoice {
    pub fn parse(text: &str) -> Option<Self> {
        match text.trim() {
            "Analyze a problem" => Some(TaskChoice::AnalyzeProblem),
            "Create a concept note" => Some(TaskChoice::CreateNote),
            "Write a full proposal" => Some(TaskChoice::WriteProposal),
            "Analysis Tools" => Some(TaskChoice::AnalysisTools),
            _ => None,
        }
    }
}

/// Recognized choices of the analysis-method menu.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MethodChoice {
    ProblemTree,
    Swot,
    Pestel,
}

impl MethodChoice {
    pub fn parse(text: &str) -> Option<Self> {
        match text.trim() {
            "1" => Some(MethodChoice::ProblemTree),
            "2" => Some(MethodChoice::Swot),
            "3" => Some(MethodChoice::Pestel),
            _ => None,
        }
    }
}

/// Recognized choices of the post-analysis flow menu.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FlowChoice {
    ConceptNote,
    FullProposal,
    Pestel,
    Swot,
    End,
}

impl FlowChoice {
    pub fn parse(text: &str) -> Option<Self> {
        match text.trim() {
            "Generate Concept Note" => Some(FlowChoice::ConceptNote),
            "Generate Full Proposal" => Some(FlowChoice::FullProposal),
            "Generate PESTEL Analysis" => Some(FlowChoice::Pestel),
            "Generate SWOT Analysis" => Some(FlowChoice::Swot),
            "End Conversation" => Some(FlowChoice::End),
            _ => None,
        }
    }
}

/// Validates free-text input for the analysis and document states.
pub fn validate_topic(text: &str) -> Result<String, &'static str> {
    let trimmed = text.trim();

    if trimmed.is_empty() {
        return Err("empty");
    }

    if trimmed.len() > 4000 {
        return Err("too_long");
    }

    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_topic_validation() {
        // Valid input
        assert!(validate_topic("Lack of clean water in rural areas").is_ok());
        assert!(validate_topic("  displacement  ").is_ok());

        // Invalid input
        assert!(validate_topic("").is_err());
        assert!(validate_topic("   ").is_err());
        assert!(validate_topic(&"a".repeat(4001)).is_err());
    }

    #[test]
    fn test_topic_trimming() {
        let result = validate_topic("  water scarcity  ");
        assert_eq!(result.unwrap(), "water scarcity");
    }

    #[test]
    fn test_language_parsing() {
        assert_eq!(Language::parse("en"), Some(Language::En));
        assert_eq!(Language::parse("ar"), Some(Language::Ar));
        assert_eq!(Language::parse("fr"), None);

        assert_eq!(Language::from_telegram(Some("ar")), Some(Language::Ar));
        assert_eq!(Language::from_telegram(Some("ar-SA")), Some(Language::Ar));
        assert_eq!(Language::from_telegram(Some("fr")), Some(Language::En));
        assert_eq!(Language::from_telegram(None), None);
    }
}
