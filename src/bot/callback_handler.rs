//! Callback Handler module for processing inline keyboard callback queries.

use anyhow::Result;
use std::sync::Arc;
use teloxide::prelude::*;
use tracing::debug;

use super::message_handler::deliver;
use crate::dialogue::SessionDialogue;
use crate::engine::{Engine, Event};

/// Handles inline-keyboard presses; the language picker is the only inline
/// keyboard the bot sends, but the engine decides what the press means for
/// the current state.
pub async fn callback_handler(
    bot: Bot,
    q: CallbackQuery,
    dialogue: SessionDialogue,
    engine: Arc<Engine>,
) -> Result<()> {
    debug!(user_id = %q.from.id, "received callback query");

    bot.answer_callback_query(q.id.clone()).await?;

    let Some(message) = q.message.as_ref() else {
        return Ok(());
    };
    let chat_id = message.chat().id;

    let Some(data) = q.data.clone() else {
        return Ok(());
    };

    let mut session = dialogue.get().await?.unwrap_or_default();
    let replies = engine.process(&mut session, Event::Button(data)).await;
    deliver(&bot, chat_id, replies).await?;
    dialogue.update(session).await?;

    Ok(())
}
