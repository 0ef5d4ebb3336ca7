//! Sticker encoding.
//!
//! Rendered cards are resampled to the sticker size and stored as lossless WebP.

/// WebP sticker encoder and the artifact it produces.
pub mod sticker;
