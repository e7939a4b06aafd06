//! UI Builder module mapping engine keyboards to Telegram reply markup.

use teloxide::types::{
    InlineKeyboardButton, InlineKeyboardMarkup, KeyboardButton, KeyboardMarkup, KeyboardRemove,
    ReplyMarkup,
};

use crate::engine::Keyboard;

/// Inline keyboard for the language choice.
pub fn create_language_keyboard() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new([
        [InlineKeyboardButton::callback("English", "en")],
        [InlineKeyboardButton::callback("العربية", "ar")],
    ])
}

/// Concrete reply markup for an engine keyboard.
pub fn markup(keyboard: &Keyboard) -> ReplyMarkup {
    match keyboard {
        Keyboard::LanguagePicker => ReplyMarkup::InlineKeyboard(create_language_keyboard()),
        Keyboard::RolePicker => reply_rows(&[&["Activist", "Organization"]]),
        Keyboard::TaskMenu => reply_rows(&[
            &["Analyze a problem", "Create a concept note"],
            &["Write a full proposal", "Analysis Tools"],
        ]),
        Keyboard::MethodMenu => reply_rows(&[&["1", "2", "3"]]),
        Keyboard::FlowMenu => reply_rows(&[
            &["Generate Concept Note", "Generate Full Proposal"],
            &["Generate PESTEL Analysis", "Generate SWOT Analysis"],
            &["End Conversation"],
        ]),
        Keyboard::Remove => ReplyMarkup::KeyboardRemove(KeyboardRemove::new()),
    }
}

fn reply_rows(rows: &[&[&str]]) -> ReplyMarkup {
    let keyboard: Vec<Vec<KeyboardButton>> = rows
        .iter()
        .map(|row| row.iter().map(|label| KeyboardButton::new(*label)).collect())
        .collect();

    ReplyMarkup::Keyboard(
        KeyboardMarkup::new(keyboard)
            .resize_keyboard()
            .one_time_keyboard(),
    )
}
