use crate::assets::fetch::AvatarSource;
use crate::encode::sticker::{StickerArtifact, StickerEncoder};
use crate::foundation::config::BotConfig;
use crate::foundation::error::QuoteResult;
use crate::render::card::QuoteCardRenderer;

/// Input to one quote-sticker invocation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QuoteRequest {
    /// Display label; may be empty.
    pub sender_name: String,
    pub message_text: String,
    pub avatar: Option<AvatarSource>,
}

impl QuoteRequest {
    pub fn new(sender_name: impl Into<String>, message_text: impl Into<String>) -> Self {
        Self {
            sender_name: sender_name.into(),
            message_text: message_text.into(),
            avatar: None,
        }
    }

    pub fn with_avatar(mut self, avatar: Option<AvatarSource>) -> Self {
        self.avatar = avatar;
        self
    }
}

/// Render then encode. Holds no per-request state and can be shared across tasks.
#[derive(Debug)]
pub struct QuotePipeline {
    renderer: QuoteCardRenderer,
    encoder: StickerEncoder,
}

impl QuotePipeline {
    pub fn new(cfg: &BotConfig) -> QuoteResult<Self> {
        Ok(Self::from_parts(
            QuoteCardRenderer::new(cfg)?,
            StickerEncoder::new(cfg.output.clone(), cfg.keep_raster),
        ))
    }

    pub fn from_parts(renderer: QuoteCardRenderer, encoder: StickerEncoder) -> Self {
        Self { renderer, encoder }
    }

    pub fn renderer(&self) -> &QuoteCardRenderer {
        &self.renderer
    }

    #[tracing::instrument(skip_all, fields(sender = %request.sender_name))]
    pub async fn run(&self, request: &QuoteRequest) -> QuoteResult<StickerArtifact> {
        let image = self
            .renderer
            .render(
                &request.sender_name,
                &request.message_text,
                request.avatar.as_ref(),
            )
            .await?;
        let artifact = self.encoder.encode(&image)?;
        tracing::info!(path = ?artifact.path, bytes = artifact.bytes.len(), "quote sticker ready");
        Ok(artifact)
    }
}
