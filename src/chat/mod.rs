pub mod dto;
pub mod services;
pub mod session;

pub use dto::{Action, ChatRequest, ChatResponse, HistoryEntry, Role, Turn};
pub use services::send_message;
pub use session::{ChatEvent, ChatState, Conversation, Effect, FALLBACK_REPLY};
