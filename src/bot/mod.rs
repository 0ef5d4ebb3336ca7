//! Chat-facing side of the bot: message model, transport capability and the command handler.

pub mod handler;
pub mod model;
pub mod transport;
