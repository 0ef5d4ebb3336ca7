use std::{borrow::Cow, collections::HashMap, path::Path};

use crate::foundation::config::FontConfig;
use crate::foundation::core::{Point, Rgba8};
use crate::foundation::error::{QuoteError, QuoteResult};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
/// RGBA8 brush color used by Parley text layout.
pub struct TextBrushRgba8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl From<Rgba8> for TextBrushRgba8 {
    fn from(c: Rgba8) -> Self {
        Self {
            r: c.r,
            g: c.g,
            b: c.b,
            a: c.a,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextWeight {
    Regular,
    Bold,
}

/// Shapes, measures and draws single-paragraph text.
///
/// Configured font files are registered first; the fallback family list resolves against the
/// system collection. Measurement and drawing share the same contexts, so wrapped widths match
/// what ends up on the canvas.
pub struct TextEngine {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<TextBrushRgba8>,
    regular_stack: String,
    bold_stack: String,
    glyph_fonts: HashMap<(u64, u32), vello_cpu::peniko::FontData>,
}

impl std::fmt::Debug for TextEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextEngine")
            .field("regular_stack", &self.regular_stack)
            .field("bold_stack", &self.bold_stack)
            .field("cached_fonts", &self.glyph_fonts.len())
            .finish()
    }
}

impl TextEngine {
    pub fn new(cfg: &FontConfig) -> QuoteResult<Self> {
        let mut font_ctx = parley::FontContext::default();
        let regular = cfg
            .regular
            .as_deref()
            .map(|p| register_font_file(&mut font_ctx, p))
            .transpose()?;
        let bold = cfg
            .bold
            .as_deref()
            .map(|p| register_font_file(&mut font_ctx, p))
            .transpose()?;

        let regular_stack = family_stack(regular.as_deref(), &cfg.family_fallback);
        let bold_stack = family_stack(bold.or(regular).as_deref(), &cfg.family_fallback);
        tracing::debug!(%regular_stack, %bold_stack, "text engine ready");

        Ok(Self {
            font_ctx,
            layout_ctx: parley::LayoutContext::new(),
            regular_stack,
            bold_stack,
            glyph_fonts: HashMap::new(),
        })
    }

    /// Lay out `text` on a single unbroken line.
    pub fn layout(
        &mut self,
        text: &str,
        size_px: f32,
        weight: TextWeight,
        brush: TextBrushRgba8,
    ) -> parley::Layout<TextBrushRgba8> {
        let stack = match weight {
            TextWeight::Regular => self.regular_stack.clone(),
            TextWeight::Bold => self.bold_stack.clone(),
        };

        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(Cow::Owned(stack)),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(size_px));
        builder.push_default(parley::style::StyleProperty::Brush(brush));
        if weight == TextWeight::Bold {
            builder.push_default(parley::style::StyleProperty::FontWeight(
                parley::style::FontWeight::BOLD,
            ));
        }

        let mut layout: parley::Layout<TextBrushRgba8> = builder.build(text);
        layout.break_all_lines(None);
        layout.align(
            None,
            parley::Alignment::Start,
            parley::AlignmentOptions::default(),
        );
        layout
    }

    /// Advance width of `text` in pixels.
    pub fn measure(&mut self, text: &str, size_px: f32, weight: TextWeight) -> f32 {
        self.layout(text, size_px, weight, TextBrushRgba8::default())
            .width()
    }

    /// Fill the glyphs of `layout` with the first line's baseline at `baseline`.
    pub fn draw(
        &mut self,
        ctx: &mut vello_cpu::RenderContext,
        layout: &parley::Layout<TextBrushRgba8>,
        baseline: Point,
    ) {
        let Some(first) = layout.lines().next() else {
            return;
        };
        let dy = baseline.y - f64::from(first.metrics().baseline);
        ctx.set_transform(vello_cpu::kurbo::Affine::translate((baseline.x, dy)));
        ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);

        for line in layout.lines() {
            for item in line.items() {
                let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                    continue;
                };
                let brush = run.style().brush;
                ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
                    brush.r, brush.g, brush.b, brush.a,
                ));

                let shaped = run.run();
                let source = shaped.font();
                let font = self
                    .glyph_fonts
                    .entry((source.data.id(), source.index))
                    .or_insert_with(|| {
                        vello_cpu::peniko::FontData::new(
                            vello_cpu::peniko::Blob::from(source.data.data().to_vec()),
                            source.index,
                        )
                    })
                    .clone();

                let glyphs = run.positioned_glyphs().map(|g| vello_cpu::Glyph {
                    id: g.id,
                    x: g.x,
                    y: g.y,
                });
                ctx.glyph_run(&font)
                    .font_size(shaped.font_size())
                    .fill_glyphs(glyphs);
            }
        }
    }
}

fn register_font_file(font_ctx: &mut parley::FontContext, path: &Path) -> QuoteResult<String> {
    let bytes = std::fs::read(path)
        .map_err(|e| QuoteError::config(format!("read font '{}': {e}", path.display())))?;
    let families = font_ctx
        .collection
        .register_fonts(parley::fontique::Blob::from(bytes), None);
    let family_id = families.first().map(|(id, _)| *id).ok_or_else(|| {
        QuoteError::config(format!("no font families in '{}'", path.display()))
    })?;
    let name = font_ctx
        .collection
        .family_name(family_id)
        .ok_or_else(|| QuoteError::config("registered font family has no name"))?
        .to_string();
    Ok(name)
}

fn family_stack(primary: Option<&str>, fallback: &str) -> String {
    match primary {
        Some(name) if fallback.trim().is_empty() => format!("\"{name}\""),
        Some(name) => format!("\"{name}\", {fallback}"),
        None => fallback.to_string(),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/text.rs"]
mod tests;
