//! quotestick turns a quoted chat message into a quote-card sticker.
//!
//! The pipeline is linear:
//!
//! - [`wrap_text`] breaks the message body into lines against real font metrics
//! - [`QuoteCardRenderer`] composes avatar, bubble, sender name and body onto a 512×512 canvas
//! - [`StickerEncoder`] converts the card to lossless WebP and persists it
//! - [`QuotePipeline`] sequences the two; [`QuoteBot`] drives it from a [`Transport`]
#![forbid(unsafe_code)]

pub mod assets;
pub mod bot;
pub mod encode;
pub mod foundation;
pub mod layout;
pub mod pipeline;
pub mod render;

pub use crate::assets::fetch::{AvatarFetcher, AvatarSource};
pub use crate::bot::handler::{FAILURE_REPLY, HandleOutcome, QuoteBot, RunSummary};
pub use crate::bot::model::{
    ChatInfo, Contact, IncomingMessage, Participant, ParticipantId, QuotedMessage,
    resolve_sender_name,
};
pub use crate::bot::transport::{Outbound, ReplayEvent, ReplayTransport, Transport};
pub use crate::encode::sticker::{StickerArtifact, StickerEncoder, encode_webp_lossless};
pub use crate::foundation::config::{
    AvatarConfig, BotConfig, FontConfig, OutputTarget, TransportConfig,
};
pub use crate::foundation::core::{CANVAS_SIZE, CardLayout, Rgba8};
pub use crate::foundation::error::{QuoteError, QuoteResult};
pub use crate::layout::wrap::{monospace_measure, wrap_text};
pub use crate::pipeline::{QuotePipeline, QuoteRequest};
pub use crate::render::card::{AvatarStatus, QuoteCardRenderer, RenderedImage};
pub use crate::render::text::{TextEngine, TextWeight};
