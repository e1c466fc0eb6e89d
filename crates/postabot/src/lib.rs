//! Postabot - Telegram bot for autoposting subscriptions
//!
//! Users pick a tariff, pay in Stars or by a manually confirmed crypto check,
//! and get access to the tariff's private channel. Admins manage tariffs,
//! bind channels and review crypto payments.
//!
//! # Module Structure
//!
//! - `cli`: Command line interface
//! - `telegram`: Bot construction, keyboards, callback decoding and handlers
//!
//! Storage and domain types live in `postacore`.

pub mod cli;
pub mod telegram;

pub use telegram::{create_bot, schema, HandlerDeps};
