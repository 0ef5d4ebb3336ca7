use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use image::ImageEncoder as _;

use crate::foundation::config::OutputTarget;
use crate::foundation::core::CANVAS_SIZE;
use crate::foundation::error::{QuoteError, QuoteResult};
use crate::render::card::RenderedImage;

static ARTIFACT_SEQ: AtomicU64 = AtomicU64::new(0);

/// An encoded sticker, ready to hand to a transport.
#[derive(Clone, Debug)]
pub struct StickerArtifact {
    /// Lossless WebP bytes.
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
    /// Persisted sticker file, unless the target is in-memory.
    pub path: Option<PathBuf>,
    /// Persisted PNG raster, when raster retention is enabled.
    pub raster_path: Option<PathBuf>,
}

impl StickerArtifact {
    pub const MIME_TYPE: &'static str = "image/webp";

    /// Remove persisted files. Files already gone are not an error.
    pub fn dispose(self) -> QuoteResult<()> {
        for path in [self.path, self.raster_path].into_iter().flatten() {
            match std::fs::remove_file(&path) {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(QuoteError::persist(path, e)),
            }
        }
        Ok(())
    }
}

/// Converts rendered cards into 512×512 lossless WebP stickers.
#[derive(Clone, Debug)]
pub struct StickerEncoder {
    target: OutputTarget,
    keep_raster: bool,
}

impl StickerEncoder {
    pub fn new(target: OutputTarget, keep_raster: bool) -> Self {
        Self {
            target,
            keep_raster,
        }
    }

    #[tracing::instrument(skip_all, fields(png_bytes = image.png.len()))]
    pub fn encode(&self, image: &RenderedImage) -> QuoteResult<StickerArtifact> {
        let bytes = encode_webp_lossless(&image.png)?;

        let (path, raster_path) = match &self.target {
            OutputTarget::Memory => (None, None),
            OutputTarget::Unique { dir } => {
                let path = dir.join(format!("{}.webp", unique_stem()));
                let raster = self.keep_raster.then(|| raster_sibling(&path));
                persist(&path, &bytes, raster.as_deref(), &image.png)?;
                (Some(path), raster)
            }
            OutputTarget::Fixed { path } => {
                let raster = self.keep_raster.then(|| raster_sibling(path));
                persist(path, &bytes, raster.as_deref(), &image.png)?;
                (Some(path.clone()), raster)
            }
        };

        tracing::debug!(webp_bytes = bytes.len(), path = ?path, "sticker encoded");
        Ok(StickerArtifact {
            bytes,
            width: CANVAS_SIZE,
            height: CANVAS_SIZE,
            path,
            raster_path,
        })
    }
}

/// Decode any raster, force it to the sticker size and encode as lossless WebP.
pub fn encode_webp_lossless(raster: &[u8]) -> QuoteResult<Vec<u8>> {
    let decoded = image::load_from_memory(raster)
        .map_err(|e| QuoteError::encoding(format!("decode rendered image: {e}")))?;
    let mut rgba = decoded.to_rgba8();
    if rgba.dimensions() != (CANVAS_SIZE, CANVAS_SIZE) {
        rgba = image::imageops::resize(
            &rgba,
            CANVAS_SIZE,
            CANVAS_SIZE,
            image::imageops::FilterType::Lanczos3,
        );
    }

    let mut out = Vec::new();
    image::codecs::webp::WebPEncoder::new_lossless(&mut out)
        .write_image(
            rgba.as_raw(),
            CANVAS_SIZE,
            CANVAS_SIZE,
            image::ExtendedColorType::Rgba8,
        )
        .map_err(|e| QuoteError::encoding(format!("encode webp: {e}")))?;
    Ok(out)
}

fn unique_stem() -> String {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or(0);
    let seq = ARTIFACT_SEQ.fetch_add(1, Ordering::Relaxed);
    format!("quote_{}_{nanos}_{seq}", std::process::id())
}

/// `<stem>.raster.png` next to the sticker. Never equal to the sticker path, whatever its
/// extension.
fn raster_sibling(path: &Path) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!("{stem}.raster.png"))
}

/// Write the sticker and, when requested, its raster. A failed raster write removes the
/// sticker again.
fn persist(path: &Path, bytes: &[u8], raster: Option<&Path>, png: &[u8]) -> QuoteResult<()> {
    write_atomic(path, bytes)?;
    let Some(raster) = raster else {
        return Ok(());
    };
    if let Err(e) = write_atomic(raster, png) {
        if let Err(cleanup) = std::fs::remove_file(path) {
            tracing::warn!(path = %path.display(), error = %cleanup, "failed to remove sticker");
        }
        return Err(e);
    }
    Ok(())
}

/// Write through a sibling temp file and rename, so readers never observe a partial file.
fn write_atomic(path: &Path, bytes: &[u8]) -> QuoteResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| QuoteError::persist(parent, e))?;
    }
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let tmp = path.with_file_name(format!(".{file_name}.{}.tmp", unique_stem()));
    std::fs::write(&tmp, bytes).map_err(|e| QuoteError::persist(&tmp, e))?;
    if let Err(e) = std::fs::rename(&tmp, path) {
        let _ = std::fs::remove_file(&tmp);
        return Err(QuoteError::persist(path, e));
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/encode/sticker.rs"]
mod tests;
