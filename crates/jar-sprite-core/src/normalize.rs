use crate::config::{ResampleFilter, SpriteConfig};
use crate::model::{SourceImage, Tile};
use image::imageops;
use tracing::instrument;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Rescales `src` to exactly `width x height` RGBA8 pixels.
///
/// Images without an alpha channel come out fully opaque.
pub fn normalize_tile(src: &SourceImage, width: u32, height: u32, filter: ResampleFilter) -> Tile {
    let rgba = src.image.to_rgba8();
    let rgba = if rgba.dimensions() == (width, height) {
        rgba
    } else {
        imageops::resize(&rgba, width, height, filter.filter_type())
    };
    Tile {
        key: src.key.clone(),
        rgba,
    }
}

/// Normalizes every source image, preserving input order.
#[instrument(skip_all, fields(count = sources.len()))]
pub fn normalize_all(sources: &[SourceImage], cfg: &SpriteConfig) -> Vec<Tile> {
    let (w, h, filter) = (cfg.tile_width, cfg.tile_height, cfg.filter);

    #[cfg(feature = "parallel")]
    {
        if cfg.parallel {
            // indexed collect keeps the original order
            return sources
                .par_iter()
                .map(|src| normalize_tile(src, w, h, filter))
                .collect();
        }
    }

    sources
        .iter()
        .map(|src| normalize_tile(src, w, h, filter))
        .collect()
}
