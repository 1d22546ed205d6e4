//! Concrete repository implementations.

pub mod calendar_event;
pub mod chat_message;
pub mod direct_message;
pub mod session;
pub mod user;

pub use calendar_event::CalendarEventRepository;
pub use chat_message::ChatMessageRepository;
pub use direct_message::DirectMessageRepository;
pub use session::SessionRepository;
pub use user::UserRepository;
