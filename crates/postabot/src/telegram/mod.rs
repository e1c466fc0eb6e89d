//! Telegram bot integration and handlers

pub mod admin;
pub mod bot;
pub mod callbacks;
pub mod handlers;
pub mod keyboards;
pub mod menu;
pub mod reply;

// Re-exports for convenience
pub use bot::{create_bot, setup_bot_commands, Command};
pub use callbacks::CallbackAction;
pub use handlers::{schema, HandlerDeps};
pub use menu::MenuButton;
pub use reply::Reply;
