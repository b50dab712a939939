use crate::error::{Result, SpriteError};
use crate::model::{GridLayout, Tile};
use image::{ImageFormat, RgbaImage, imageops};
use std::io::Cursor;
use tracing::instrument;

/// Paints `tiles` onto a transparent canvas at the offsets in `layout`.
///
/// `layout` must have been computed for exactly these tiles, in this order.
/// Pixels are overwritten, not blended, so tile alpha is kept as is.
#[instrument(skip_all, fields(tiles = tiles.len()))]
pub fn compose_sheet(tiles: &[Tile], layout: &GridLayout) -> Result<RgbaImage> {
    if tiles.len() != layout.entries.len() {
        return Err(SpriteError::InvalidInput(format!(
            "layout has {} entries but {} tiles were given",
            layout.entries.len(),
            tiles.len()
        )));
    }
    let (tw, th) = (layout.spec.tile_width, layout.spec.tile_height);
    let mut canvas = RgbaImage::new(layout.width, layout.height);
    for entry in &layout.entries {
        let tile = tiles.get(entry.index).ok_or_else(|| {
            SpriteError::InvalidInput(format!("no tile for layout index {}", entry.index))
        })?;
        if tile.rgba.dimensions() != (tw, th) {
            let (w, h) = tile.rgba.dimensions();
            return Err(SpriteError::InvalidInput(format!(
                "tile '{}' is {}x{}, expected {}x{}",
                tile.key, w, h, tw, th
            )));
        }
        imageops::replace(
            &mut canvas,
            &tile.rgba,
            i64::from(entry.offset_x),
            i64::from(entry.offset_y),
        );
    }
    Ok(canvas)
}

/// Serializes the sheet as PNG.
pub fn encode_png(sheet: &RgbaImage) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    sheet
        .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
        .map_err(SpriteError::Encode)?;
    Ok(buf)
}
