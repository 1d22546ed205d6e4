//! Chat and direct message entities.

pub mod chat;
pub mod direct;

pub use chat::ChatMessage;
pub use direct::DirectMessage;
