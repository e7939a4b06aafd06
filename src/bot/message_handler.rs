//! Message Handler module for processing incoming Telegram messages.

use anyhow::Result;
use std::sync::Arc;
use teloxide::prelude::*;
use teloxide::types::{FileId, ParseMode};
use tracing::{debug, error};

use super::ui_builder;
use crate::dialogue::{Language, SessionDialogue};
use crate::engine::{Engine, Event, Reply};
use crate::extractor::MAX_DOCUMENT_BYTES;

/// Entry point for every non-callback update.
pub async fn message_handler(
    bot: Bot,
    msg: Message,
    dialogue: SessionDialogue,
    engine: Arc<Engine>,
) -> Result<()> {
    let mut session = dialogue.get().await?.unwrap_or_default();

    debug!(user_id = %msg.chat.id, state = ?session.state, "received message");

    let event = match build_event(&bot, &msg).await {
        Ok(event) => event,
        Err(e) => {
            error!(user_id = %msg.chat.id, error = %e, "failed to download document");
            let text = engine.message("upload-error", session.language);
            bot.send_message(msg.chat.id, text)
                .parse_mode(ParseMode::Html)
                .await?;
            return Ok(());
        }
    };

    let replies = engine.process(&mut session, event).await;
    deliver(&bot, msg.chat.id, replies).await?;
    dialogue.update(session).await?;

    Ok(())
}

/// Classifies a Telegram message into an engine event, downloading document
/// payloads when their declared size is within the cap.
async fn build_event(bot: &Bot, msg: &Message) -> Result<Event> {
    if let Some(text) = msg.text() {
        let language_code = msg
            .from
            .as_ref()
            .and_then(|user| user.language_code.as_deref());

        return Ok(match text.trim() {
            "/start" => Event::Start {
                language_hint: Language::from_telegram(language_code),
            },
            "/cancel" => Event::Cancel,
            _ => Event::Text(text.to_string()),
        });
    }

    if let Some(doc) = msg.document() {
        let file_name = doc.file_name.clone().unwrap_or_default();
        let size = u64::from(doc.file.size);

        // Oversized files are rejected by the engine on declared size alone.
        let data = if size <= MAX_DOCUMENT_BYTES {
            download_document(bot, doc.file.id.clone()).await?
        } else {
            Vec::new()
        };

        return Ok(Event::Document {
            file_name,
            size,
            data,
        });
    }

    Ok(Event::Unsupported)
}

/// Downloads an uploaded file into memory.
async fn download_document(bot: &Bot, file_id: FileId) -> Result<Vec<u8>> {
    let file = bot.get_file(file_id).await?;
    let url = format!(
        "https://api.telegram.org/file/bot{}/{}",
        bot.token(),
        file.path
    );

    let response = reqwest::get(&url).await?;
    let bytes = response.bytes().await?;

    debug!(bytes = bytes.len(), "document downloaded");

    Ok(bytes.to_vec())
}

/// Sends the engine's replies in order, attaching reply markup where asked.
pub(crate) async fn deliver(bot: &Bot, chat_id: ChatId, replies: Vec<Reply>) -> Result<()> {
    for reply in replies {
        let mut request = bot
            .send_message(chat_id, reply.text)
            .parse_mode(ParseMode::Html);

        if let Some(keyboard) = &reply.keyboard {
            request = request.reply_markup(ui_builder::markup(keyboard));
        }

        request.await?;
    }

    Ok(())
}
