pub mod api;
pub mod handlers;
pub mod types;

pub use api::TelegramApiClient;
pub use handlers::{Relay, RelayTargets, UpdateOutcome};
pub use types::{CallbackQuery, InlineKeyboardButton, InlineKeyboardMarkup, Message, Update, User};

#[derive(Debug, thiserror::Error)]
pub enum TelegramError {
    #[error("telegram api request failed: {0}")]
    ApiRequest(String),
    #[error("telegram api responded with error `{0}`")]
    ApiResponse(String),
    #[error("telegram api response could not be decoded: {0}")]
    Decode(String),
}

/// Outbound side of the chat channel.
pub trait ChatTransport: Send + Sync {
    fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        keyboard: Option<&InlineKeyboardMarkup>,
    ) -> Result<(), TelegramError>;

    fn answer_callback(&self, callback_id: &str, text: Option<&str>) -> Result<(), TelegramError>;
}

/// Inbound side of the chat channel. `offset` is the first update id not yet
/// seen.
pub trait UpdateSource: Send + Sync {
    fn next_batch(&self, offset: Option<i64>) -> Result<Vec<Update>, TelegramError>;
}
