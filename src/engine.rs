//! Conversation engine.
//!
//! Owns the state graph: every inbound event is validated against the
//! current state, the matching handler runs its side effects (generation
//! calls, session mutation) and commits the next state. Invalid input of any
//! kind produces a localized error message and holds the current state, so
//! the user's last valid action can always be retried.
//!
//! The engine is transport-agnostic: it consumes [`Event`]s and produces
//! [`Reply`]s, and the Telegram layer in [`crate::bot`] does the wire work.

use std::sync::Arc;
use tracing::{info, warn};

use crate::dialogue::{
    validate_topic, ChatState, FlowChoice, Language, MethodChoice, Role, Session, TaskChoice,
};
use crate::extractor::{self, ExtractError};
use crate::generation::TextGenerator;
use crate::localization::{LocalizationManager, FALLBACK_LANGUAGE};
use crate::prompts::PromptConfig;

/// Inbound event, one per Telegram update.
#[derive(Clone, Debug)]
pub enum Event {
    /// `/start`, with the Telegram profile language as a provisional hint.
    Start { language_hint: Option<Language> },
    /// `/cancel`, valid from every state.
    Cancel,
    /// A plain text message. Unrecognized slash commands land here too.
    Text(String),
    /// An inline-keyboard press carrying its callback data.
    Button(String),
    /// An uploaded document. `data` is empty when the transport skipped the
    /// download because the declared size already exceeds the cap.
    Document {
        file_name: String,
        size: u64,
        data: Vec<u8>,
    },
    /// Anything else (stickers, photos, voice notes).
    Unsupported,
}

/// Keyboard to attach to an outbound message. The Telegram layer maps these
/// to concrete reply markup.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Keyboard {
    LanguagePicker,
    RolePicker,
    TaskMenu,
    MethodMenu,
    FlowMenu,
    Remove,
}

/// Outbound message.
#[derive(Clone, Debug)]
pub struct Reply {
    pub text: String,
    pub keyboard: Option<Keyboard>,
}

impl Reply {
    pub fn text(text: String) -> Self {
        Self {
            text,
            keyboard: None,
        }
    }

    pub fn with_keyboard(text: String, keyboard: Keyboard) -> Self {
        Self {
            text,
            keyboard: Some(keyboard),
        }
    }
}

/// The conversation engine. One instance serves every chat; all mutable
/// state lives in the per-chat [`Session`].
pub struct Engine {
    generator: Arc<dyn TextGenerator>,
    prompts: PromptConfig,
    catalog: Arc<LocalizationManager>,
}

impl Engine {
    pub fn new(
        generator: Arc<dyn TextGenerator>,
        prompts: PromptConfig,
        catalog: Arc<LocalizationManager>,
    ) -> Self {
        Self {
            generator,
            prompts,
            catalog,
        }
    }

    /// Localized message for a session language, falling back to English
    /// when the language was never set.
    pub fn message(&self, key: &str, language: Option<Language>) -> String {
        let lang = language.map(|l| l.tag()).unwrap_or(FALLBACK_LANGUAGE);
        self.catalog.message(key, lang)
    }

    fn reply(&self, key: &str, session: &Session) -> Reply {
        Reply::text(self.message(key, session.language))
    }

    fn reply_with_keyboard(&self, key: &str, session: &Session, keyboard: Keyboard) -> Reply {
        Reply::with_keyboard(self.message(key, session.language), keyboard)
    }

    /// Processes one inbound event for one session and returns the outbound
    /// messages. Every error is converted to a localized reply here; nothing
    /// escapes to crash the dispatch loop.
    pub async fn process(&self, session: &mut Session, event: Event) -> Vec<Reply> {
        match event {
            Event::Start { language_hint } => self.handle_start(session, language_hint),
            Event::Cancel => self.handle_cancel(session),
            event => match session.state {
                ChatState::Start | ChatState::End => vec![self.reply("use-start", session)],
                ChatState::SetLanguage => self.handle_set_language(session, event),
                ChatState::SetRole => self.handle_set_role(session, event),
                ChatState::UploadProfile => self.handle_upload_profile(session, event),
                ChatState::ChooseTask => self.handle_choose_task(session, event),
                ChatState::AnalysisTools => self.handle_analysis_tools(session, event),
                ChatState::ProblemTree | ChatState::Swot | ChatState::Pestel => {
                    self.handle_analysis_input(session, event).await
                }
                ChatState::CreateNote | ChatState::WriteProposal => {
                    self.handle_document_input(session, event).await
                }
                ChatState::FlowMenu => self.handle_flow_menu(session, event).await,
            },
        }
    }

    /// `/start` re-initializes the session from any state.
    fn handle_start(&self, session: &mut Session, language_hint: Option<Language>) -> Vec<Reply> {
        *session = Session {
            state: ChatState::SetLanguage,
            language: language_hint,
            ..Session::default()
        };

        info!(?language_hint, "conversation started");

        vec![self.reply_with_keyboard("welcome", session, Keyboard::LanguagePicker)]
    }

    /// `/cancel` discards the session from any state.
    fn handle_cancel(&self, session: &mut Session) -> Vec<Reply> {
        let goodbye = Reply::with_keyboard(
            self.message("goodbye", session.language),
            Keyboard::Remove,
        );

        *session = Session {
            state: ChatState::End,
            ..Session::default()
        };

        info!("conversation cancelled");

        vec![goodbye]
    }

    fn handle_set_language(&self, session: &mut Session, event: Event) -> Vec<Reply> {
        let choice = match &event {
            Event::Button(data) => Language::parse(data),
            _ => None,
        };

        match choice {
            Some(language) => {
                session.language = Some(language);
                session.state = ChatState::SetRole;

                info!(language = language.tag(), "language selected");

                vec![
                    self.reply("language-set", session),
                    self.reply_with_keyboard("role-prompt", session, Keyboard::RolePicker),
                ]
            }
            None => {
                warn!("invalid language selection");
                vec![self.reply_with_keyboard("language-error", session, Keyboard::LanguagePicker)]
            }
        }
    }

    fn handle_set_role(&self, session: &mut Session, event: Event) -> Vec<Reply> {
        let text = match &event {
            Event::Text(text) => text.trim(),
            _ => "",
        };

        match text {
            "Activist" => {
                session.role = Some(Role::Activist);
                session.state = ChatState::ChooseTask;

                info!(role = "activist", "role selected");

                vec![self.reply_with_keyboard("role-activist", session, Keyboard::TaskMenu)]
            }
            "Organization" => {
                session.role = Some(Role::Organization);
                session.state = ChatState::UploadProfile;

                info!(role = "organization", "role selected");

                vec![self.reply_with_keyboard("role-organization", session, Keyboard::Remove)]
            }
            _ => {
                warn!("invalid role selection");
                vec![self.reply_with_keyboard("role-error", session, Keyboard::RolePicker)]
            }
        }
    }

    fn handle_upload_profile(&self, session: &mut Session, event: Event) -> Vec<Reply> {
        let Event::Document {
            file_name,
            size,
            data,
        } = event
        else {
            return vec![self.reply("upload-error", session)];
        };

        match self.ingest_document(&file_name, size, &data) {
            Ok(text) => {
                session.profile_text = Some(text);
                session.state = ChatState::ChooseTask;

                info!(%file_name, "profile uploaded");

                vec![self.reply_with_keyboard("upload-success", session, Keyboard::TaskMenu)]
            }
            Err(error) => {
                warn!(%file_name, %error, "profile upload rejected");
                vec![self.upload_error_reply(session, &error)]
            }
        }
    }

    fn handle_choose_task(&self, session: &mut Session, event: Event) -> Vec<Reply> {
        let choice = match &event {
            Event::Text(text) => TaskChoice::parse(text),
            _ => None,
        };

        let Some(choice) = choice else {
            warn!("invalid task selection");
            return vec![self.reply_with_keyboard("task-error", session, Keyboard::TaskMenu)];
        };

        info!(?choice, "task selected");

        match choice {
            TaskChoice::AnalysisTools => {
                session.state = ChatState::AnalysisTools;
                vec![self.reply_with_keyboard("tools-menu", session, Keyboard::MethodMenu)]
            }
            TaskChoice::AnalyzeProblem => {
                session.state = ChatState::ProblemTree;
                vec![self.reply_with_keyboard("problem-tree-intro", session, Keyboard::Remove)]
            }
            TaskChoice::CreateNote => {
                if self.profile_missing(session) {
                    return self.route_to_upload(session);
                }
                session.state = ChatState::CreateNote;
                vec![self.reply_with_keyboard("concept-note-intro", session, Keyboard::Remove)]
            }
            TaskChoice::WriteProposal => {
                if self.profile_missing(session) {
                    return self.route_to_upload(session);
                }
                session.state = ChatState::WriteProposal;
                vec![self.reply_with_keyboard("full-proposal-intro", session, Keyboard::Remove)]
            }
        }
    }

    fn handle_analysis_tools(&self, session: &mut Session, event: Event) -> Vec<Reply> {
        let choice = match &event {
            Event::Text(text) => MethodChoice::parse(text),
            _ => None,
        };

        match choice {
            Some(MethodChoice::ProblemTree) => {
                session.state = ChatState::ProblemTree;
                vec![self.reply_with_keyboard("problem-tree-intro", session, Keyboard::Remove)]
            }
            Some(MethodChoice::Swot) => {
                session.state = ChatState::Swot;
                vec![self.reply_with_keyboard("swot-intro", session, Keyboard::Remove)]
            }
            Some(MethodChoice::Pestel) => {
                session.state = ChatState::Pestel;
                vec![self.reply_with_keyboard("pestel-intro", session, Keyboard::Remove)]
            }
            None => {
                warn!("invalid analysis method selection");
                vec![self.reply_with_keyboard("tools-error", session, Keyboard::MethodMenu)]
            }
        }
    }

    /// Free text (or an uploaded document) in one of the three analysis
    /// states. The generation call happens here; failure holds the state so
    /// the user can resubmit.
    async fn handle_analysis_input(&self, session: &mut Session, event: Event) -> Vec<Reply> {
        let input = match event {
            Event::Text(text) => match validate_topic(&text) {
                Ok(input) => input,
                Err(_) => return vec![self.reply("input-error", session)],
            },
            Event::Document {
                file_name,
                size,
                data,
            } => match self.ingest_document(&file_name, size, &data) {
                Ok(text) => text,
                Err(error) => {
                    warn!(%file_name, %error, "analysis document rejected");
                    return vec![self.upload_error_reply(session, &error)];
                }
            },
            _ => return vec![self.reply("input-error", session)],
        };

        let prompt = match session.state {
            ChatState::Swot => self.prompts.swot(&input),
            ChatState::Pestel => self.prompts.pestel(&input),
            _ => self.prompts.problem_tree(&input),
        };

        session.last_problem = Some(input);

        match self.generator.generate(&prompt).await {
            Ok(analysis) => {
                session.last_analysis = Some(analysis.clone());
                session.state = ChatState::FlowMenu;

                info!(state = ?session.state, "analysis generated");

                vec![
                    Reply::text(analysis),
                    self.reply_with_keyboard("flow-menu", session, Keyboard::FlowMenu),
                ]
            }
            Err(error) => {
                warn!(%error, "generation failed, holding state");
                vec![self.reply("generation-error", session)]
            }
        }
    }

    /// Free text in the concept-note and full-proposal states.
    async fn handle_document_input(&self, session: &mut Session, event: Event) -> Vec<Reply> {
        let input = match event {
            Event::Text(text) => match validate_topic(&text) {
                Ok(input) => input,
                Err(_) => return vec![self.reply("input-error", session)],
            },
            _ => return vec![self.reply("input-error", session)],
        };

        let profile = session.profile_text.as_deref();
        let prompt = match session.state {
            ChatState::WriteProposal => self.prompts.full_proposal(&input, profile),
            _ => self.prompts.concept_note(&input, profile),
        };

        match self.generator.generate(&prompt).await {
            Ok(document) => {
                session.state = ChatState::ChooseTask;

                info!("document generated");

                vec![
                    Reply::text(document),
                    self.reply_with_keyboard("task-prompt", session, Keyboard::TaskMenu),
                ]
            }
            Err(error) => {
                warn!(%error, "generation failed, holding state");
                vec![self.reply("generation-error", session)]
            }
        }
    }

    /// Menu shown after a completed analysis: chain further outputs from the
    /// cached analysis or end the conversation.
    async fn handle_flow_menu(&self, session: &mut Session, event: Event) -> Vec<Reply> {
        let choice = match &event {
            Event::Text(text) => FlowChoice::parse(text),
            _ => None,
        };

        let Some(choice) = choice else {
            warn!("invalid flow selection");
            return vec![self.reply_with_keyboard("flow-error", session, Keyboard::FlowMenu)];
        };

        info!(?choice, "flow selected");

        match choice {
            FlowChoice::End => {
                let goodbye = Reply::with_keyboard(
                    self.message("goodbye", session.language),
                    Keyboard::Remove,
                );
                *session = Session {
                    state: ChatState::End,
                    ..Session::default()
                };
                vec![goodbye]
            }
            FlowChoice::ConceptNote | FlowChoice::FullProposal => {
                if self.profile_missing(session) {
                    return self.route_to_upload(session);
                }

                let Some(input) = session
                    .last_analysis
                    .clone()
                    .or_else(|| session.last_problem.clone())
                else {
                    return vec![self.reply_with_keyboard("flow-error", session, Keyboard::FlowMenu)];
                };

                let profile = session.profile_text.as_deref();
                let prompt = match choice {
                    FlowChoice::FullProposal => self.prompts.full_proposal(&input, profile),
                    _ => self.prompts.concept_note(&input, profile),
                };

                match self.generator.generate(&prompt).await {
                    Ok(document) => vec![
                        Reply::text(document),
                        self.reply_with_keyboard("flow-menu", session, Keyboard::FlowMenu),
                    ],
                    Err(error) => {
                        warn!(%error, "generation failed, holding state");
                        vec![self.reply("generation-error", session)]
                    }
                }
            }
            FlowChoice::Pestel | FlowChoice::Swot => {
                let Some(input) = session
                    .last_problem
                    .clone()
                    .or_else(|| session.last_analysis.clone())
                else {
                    return vec![self.reply_with_keyboard("flow-error", session, Keyboard::FlowMenu)];
                };

                let prompt = match choice {
                    FlowChoice::Swot => self.prompts.swot(&input),
                    _ => self.prompts.pestel(&input),
                };

                match self.generator.generate(&prompt).await {
                    Ok(analysis) => {
                        session.last_analysis = Some(analysis.clone());
                        vec![
                            Reply::text(analysis),
                            self.reply_with_keyboard("flow-menu", session, Keyboard::FlowMenu),
                        ]
                    }
                    Err(error) => {
                        warn!(%error, "generation failed, holding state");
                        vec![self.reply("generation-error", session)]
                    }
                }
            }
        }
    }

    /// Runs the extractor contract on an upload: format, size, then text.
    fn ingest_document(
        &self,
        file_name: &str,
        size: u64,
        data: &[u8],
    ) -> Result<String, ExtractError> {
        if !extractor::verify_format(file_name) {
            return Err(ExtractError::Format(file_name.to_string()));
        }

        if !extractor::check_size(size) {
            return Err(ExtractError::TooLarge(size));
        }

        extractor::extract(data, file_name)
    }

    fn upload_error_reply(&self, session: &Session, error: &ExtractError) -> Reply {
        match error {
            ExtractError::TooLarge(_) => {
                let lang = session
                    .language
                    .map(|l| l.tag())
                    .unwrap_or(FALLBACK_LANGUAGE);
                Reply::text(self.catalog.message_with_args(
                    "upload-error-size",
                    lang,
                    &[("limit_mb", "15")],
                ))
            }
            _ => self.reply("upload-error", session),
        }
    }

    fn profile_missing(&self, session: &Session) -> bool {
        session.role == Some(Role::Organization)
            && session
                .profile_text
                .as_deref()
                .map(|text| text.trim().is_empty())
                .unwrap_or(true)
    }

    fn route_to_upload(&self, session: &mut Session) -> Vec<Reply> {
        session.state = ChatState::UploadProfile;

        info!("organization without profile routed to upload");

        vec![self.reply("profile-required", session)]
    }
}
