//! CPU rendering of quote cards (`vello_cpu` raster, Parley text).

/// Card composition.
pub mod card;
/// Font resolution, measurement and glyph drawing.
pub mod text;
