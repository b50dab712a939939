use image::{DynamicImage, RgbaImage};
use serde::{Deserialize, Serialize};

/// Image decoded from a container entry.
#[derive(Debug, Clone)]
pub struct SourceImage {
    /// Logical name (final path segment, suffix stripped).
    pub key: String,
    /// Full entry path inside the container.
    pub path: String,
    pub image: DynamicImage,
}

/// Source image normalized to exactly one tile.
#[derive(Debug, Clone)]
pub struct Tile {
    pub key: String,
    pub rgba: RgbaImage,
}

/// Grid parameters: column limit and tile size in pixels.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct GridSpec {
    pub max_columns: u32,
    pub tile_width: u32,
    pub tile_height: u32,
}

impl Default for GridSpec {
    fn default() -> Self {
        Self {
            max_columns: 10,
            tile_width: 32,
            tile_height: 32,
        }
    }
}

/// Cell of a tile in the grid, zero-based.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct GridPosition {
    pub row: u32,
    pub column: u32,
}

/// Placement of one tile. Shared by the compositor and every text exporter.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LayoutEntry {
    /// Index into the tile sequence the layout was computed for.
    pub index: usize,
    pub key: String,
    pub position: GridPosition,
    /// Left edge in pixels (`column * tile_width`).
    pub offset_x: u32,
    /// Top edge in pixels (`row * tile_height`).
    pub offset_y: u32,
}

/// Complete grid layout for one sheet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridLayout {
    pub spec: GridSpec,
    pub entries: Vec<LayoutEntry>,
    /// Allocated rows; at least one, even when there are no tiles.
    pub rows: u32,
    /// Sheet width in pixels (`max_columns * tile_width`).
    pub width: u32,
    /// Sheet height in pixels (`rows * tile_height`).
    pub height: u32,
}

impl GridLayout {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of tiles on each allocated row, top to bottom.
    pub fn row_lengths(&self) -> Vec<u32> {
        let mut lens = vec![0u32; self.rows as usize];
        for e in &self.entries {
            lens[e.position.row as usize] += 1;
        }
        lens
    }
}
