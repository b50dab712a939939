use crate::error::{Result, SpriteError};
use crate::model::{GridLayout, GridPosition, GridSpec, LayoutEntry};
use tracing::debug;

/// Cell for the `index`-th tile: `row = index / max_columns`, `column = index % max_columns`.
pub fn grid_position(index: usize, max_columns: u32) -> GridPosition {
    let cols = max_columns.max(1) as usize;
    GridPosition {
        row: (index / cols) as u32,
        column: (index % cols) as u32,
    }
}

/// Rows needed to hold `count` tiles (ceiling division).
///
/// An empty sheet still gets one row so the canvas stays encodable.
pub fn rows_needed(count: usize, max_columns: u32) -> usize {
    let cols = max_columns.max(1) as usize;
    count.div_ceil(cols).max(1)
}

/// Canvas size in pixels for `count` tiles.
pub fn sheet_dimensions(count: usize, spec: &GridSpec) -> Result<(u32, u32)> {
    let too_large = || SpriteError::SheetTooLarge {
        tiles: count,
        columns: spec.max_columns,
        tile_width: spec.tile_width,
        tile_height: spec.tile_height,
    };
    let rows = u32::try_from(rows_needed(count, spec.max_columns)).map_err(|_| too_large())?;
    let width = spec
        .max_columns
        .checked_mul(spec.tile_width)
        .ok_or_else(too_large)?;
    let height = rows.checked_mul(spec.tile_height).ok_or_else(too_large)?;
    Ok((width, height))
}

/// Lays out one tile per key, in iteration order.
///
/// This is the single source of placement for a run: the compositor paints
/// from the returned entries and the exporters print the same offsets.
pub fn compute_layout<K, I>(keys: I, spec: &GridSpec) -> Result<GridLayout>
where
    K: Into<String>,
    I: IntoIterator<Item = K>,
{
    if spec.max_columns == 0 || spec.tile_width == 0 || spec.tile_height == 0 {
        return Err(SpriteError::InvalidConfig(format!(
            "grid dimensions must be non-zero (columns={}, tile={}x{})",
            spec.max_columns, spec.tile_width, spec.tile_height
        )));
    }
    let keys: Vec<String> = keys.into_iter().map(Into::into).collect();
    // Checked up front so no per-entry offset below can overflow.
    let (width, height) = sheet_dimensions(keys.len(), spec)?;
    let entries: Vec<LayoutEntry> = keys
        .into_iter()
        .enumerate()
        .map(|(index, key)| {
            let position = grid_position(index, spec.max_columns);
            LayoutEntry {
                index,
                key,
                position,
                offset_x: position.column * spec.tile_width,
                offset_y: position.row * spec.tile_height,
            }
        })
        .collect();
    let rows = height / spec.tile_height;
    debug!(tiles = entries.len(), rows, width, height, "grid layout");
    Ok(GridLayout {
        spec: *spec,
        entries,
        rows,
        width,
        height,
    })
}
