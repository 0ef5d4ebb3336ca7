use std::sync::{Arc, Mutex};

use crate::assets::decode::{PreparedImage, decode_image_stretched, encode_png_from_premul};
use crate::assets::fetch::{AvatarFetcher, AvatarSource};
use crate::foundation::config::BotConfig;
use crate::foundation::core::{CANVAS_SIZE, CardLayout, Rect};
use crate::foundation::error::{QuoteError, QuoteResult};
use crate::layout::wrap::wrap_text;
use crate::render::text::{TextBrushRgba8, TextEngine, TextWeight};

/// What happened to the avatar while rendering a card.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AvatarStatus {
    /// No avatar was requested.
    Absent,
    Drawn,
    /// Fetch or decode failed; the card was rendered without it.
    Failed(String),
}

/// A rendered quote card, PNG-encoded with straight alpha.
#[derive(Clone, Debug)]
pub struct RenderedImage {
    pub width: u32,
    pub height: u32,
    pub png: Vec<u8>,
    /// Wrapped body lines as drawn.
    pub lines: Vec<String>,
    pub avatar: AvatarStatus,
}

/// Composes quote cards onto a fixed 512×512 canvas.
#[derive(Debug)]
pub struct QuoteCardRenderer {
    layout: CardLayout,
    fetcher: AvatarFetcher,
    text: Mutex<TextEngine>,
}

impl QuoteCardRenderer {
    pub fn new(cfg: &BotConfig) -> QuoteResult<Self> {
        Ok(Self::from_parts(
            CardLayout::STANDARD,
            AvatarFetcher::new(&cfg.avatar)?,
            TextEngine::new(&cfg.fonts)?,
        ))
    }

    pub fn from_parts(layout: CardLayout, fetcher: AvatarFetcher, text: TextEngine) -> Self {
        Self {
            layout,
            fetcher,
            text: Mutex::new(text),
        }
    }

    pub fn layout(&self) -> &CardLayout {
        &self.layout
    }

    /// Wrap a message body with the renderer's own font metrics.
    pub fn wrap_body(&self, message_text: &str) -> QuoteResult<Vec<String>> {
        let mut text = self.lock_text()?;
        Ok(self.wrap_with(&mut text, message_text))
    }

    /// Render a card. Avatar problems are logged and recorded in [`RenderedImage::avatar`];
    /// only PNG encoding can fail.
    #[tracing::instrument(skip_all, fields(sender = %sender_name, text_len = message_text.len()))]
    pub async fn render(
        &self,
        sender_name: &str,
        message_text: &str,
        avatar: Option<&AvatarSource>,
    ) -> QuoteResult<RenderedImage> {
        let (avatar_img, avatar_status) = match avatar {
            None => (None, AvatarStatus::Absent),
            Some(source) => match self.load_avatar(source).await {
                Ok(img) => (Some(img), AvatarStatus::Drawn),
                Err(e) => {
                    tracing::warn!(error = %e, "avatar unavailable, rendering without it");
                    (None, AvatarStatus::Failed(e.to_string()))
                }
            },
        };

        let (png, lines) = self.paint(sender_name, message_text, avatar_img.as_ref())?;
        tracing::debug!(lines = lines.len(), png_bytes = png.len(), "card rendered");
        Ok(RenderedImage {
            width: CANVAS_SIZE,
            height: CANVAS_SIZE,
            png,
            lines,
            avatar: avatar_status,
        })
    }

    async fn load_avatar(&self, source: &AvatarSource) -> QuoteResult<PreparedImage> {
        let bytes = self.fetcher.fetch(source).await?;
        let r = self.layout.avatar;
        decode_image_stretched(&bytes, r.width() as u32, r.height() as u32)
    }

    fn lock_text(&self) -> QuoteResult<std::sync::MutexGuard<'_, TextEngine>> {
        self.text
            .lock()
            .map_err(|_| QuoteError::encoding("text engine lock poisoned"))
    }

    fn wrap_with(&self, text: &mut TextEngine, message_text: &str) -> Vec<String> {
        let size = self.layout.body_size_px;
        wrap_text(message_text, self.layout.body_max_width_px, |s| {
            text.measure(s, size, TextWeight::Regular)
        })
    }

    fn paint(
        &self,
        sender_name: &str,
        message_text: &str,
        avatar: Option<&PreparedImage>,
    ) -> QuoteResult<(Vec<u8>, Vec<String>)> {
        let l = &self.layout;
        let side = CANVAS_SIZE as u16;
        let mut ctx = vello_cpu::RenderContext::new(side, side);
        ctx.set_blend_mode(vello_cpu::peniko::BlendMode::default());

        if let Some(img) = avatar {
            draw_avatar(&mut ctx, img, l.avatar)?;
        }
        draw_bubble(&mut ctx, l);

        let mut text = self.lock_text()?;
        if !sender_name.is_empty() {
            let name = text.layout(
                sender_name,
                l.name_size_px,
                TextWeight::Bold,
                l.name_color.into(),
            );
            text.draw(&mut ctx, &name, l.name_origin);
        }

        let lines = self.wrap_with(&mut text, message_text);
        let body_brush = TextBrushRgba8::from(l.body_color);
        for (i, line) in lines.iter().enumerate() {
            if line.is_empty() {
                continue;
            }
            let laid = text.layout(line, l.body_size_px, TextWeight::Regular, body_brush);
            text.draw(&mut ctx, &laid, l.body_baseline(i));
        }
        drop(text);

        let mut pixmap = vello_cpu::Pixmap::new(side, side);
        ctx.flush();
        ctx.render_to_pixmap(&mut pixmap);
        let png = encode_png_from_premul(pixmap.data_as_u8_slice(), CANVAS_SIZE, CANVAS_SIZE)?;
        Ok((png, lines))
    }
}

fn draw_avatar(
    ctx: &mut vello_cpu::RenderContext,
    img: &PreparedImage,
    dst: Rect,
) -> QuoteResult<()> {
    let pixmap = pixmap_from_premul_bytes(&img.rgba8_premul, img.width, img.height)?;
    let paint = vello_cpu::Image {
        image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
        sampler: vello_cpu::peniko::ImageSampler::default(),
    };
    let sx = dst.width() / f64::from(img.width);
    let sy = dst.height() / f64::from(img.height);

    ctx.set_transform(
        vello_cpu::kurbo::Affine::translate((dst.x0, dst.y0))
            * vello_cpu::kurbo::Affine::scale_non_uniform(sx, sy),
    );
    ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
    ctx.set_paint(paint);
    ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
        0.0,
        0.0,
        f64::from(img.width),
        f64::from(img.height),
    ));
    Ok(())
}

/// Fill the bubble and stroke it in the same color; the round stroke join is what rounds the
/// outer corners.
fn draw_bubble(ctx: &mut vello_cpu::RenderContext, l: &CardLayout) {
    let c = l.bubble_color;
    let rect = rect_to_cpu(l.bubble);
    ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
    ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(c.r, c.g, c.b, c.a));
    ctx.set_stroke(
        vello_cpu::kurbo::Stroke::new(l.bubble_stroke_px).with_join(vello_cpu::kurbo::Join::Round),
    );
    ctx.stroke_rect(&rect);
    ctx.fill_rect(&rect);
}

fn rect_to_cpu(r: Rect) -> vello_cpu::kurbo::Rect {
    vello_cpu::kurbo::Rect::new(r.x0, r.y0, r.x1, r.y1)
}

fn pixmap_from_premul_bytes(
    bytes: &[u8],
    width: u32,
    height: u32,
) -> QuoteResult<vello_cpu::Pixmap> {
    let w: u16 = width
        .try_into()
        .map_err(|_| QuoteError::encoding("pixmap width exceeds u16"))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| QuoteError::encoding("pixmap height exceeds u16"))?;
    if bytes.len()
        != (width as usize)
            .saturating_mul(height as usize)
            .saturating_mul(4)
    {
        return Err(QuoteError::encoding("pixmap byte len mismatch"));
    }
    let pixels = bytes
        .chunks_exact(4)
        .map(|px| vello_cpu::peniko::color::PremulRgba8::from_u8_array([px[0], px[1], px[2], px[3]]))
        .collect::<Vec<_>>();
    Ok(vello_cpu::Pixmap::from_parts_with_opacity(
        pixels, w, h, true,
    ))
}

#[cfg(test)]
#[path = "../../tests/unit/render/card.rs"]
mod tests;
