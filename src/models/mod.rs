pub mod chat;
pub mod video;

pub use chat::{ChatMessage, ChatRequest, ChatResponse};
pub use video::*;
