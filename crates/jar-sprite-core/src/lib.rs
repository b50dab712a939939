//! Core library for turning the image resources of a Java archive into a CSS sprite sheet.
//!
//! - Extraction: `AssetExtractor` reads `.png` entries out of a `.jar`/zip container
//! - Normalization: every image is resampled to one fixed tile size (RGBA8)
//! - Layout: `compute_layout` places tiles on a fixed-column grid; its entries drive
//!   the compositor and all text exporters, so pixels, CSS and HTML always agree
//! - Pipeline: `process_container` / `build_sprite_sheet` return the sheet plus
//!   stylesheet and sample markup; `SpriteOutput::write_to_dir` persists them
//!
//! Quick example:
//! ```ignore
//! use jar_sprite_core::{SpriteConfig, process_container};
//! # fn main() -> anyhow::Result<()> {
//! let cfg = SpriteConfig::default();
//! let out = process_container("icons.jar", &cfg)?;
//! println!("tiles: {}, rows: {}", out.layout.len(), out.layout.rows);
//! out.write_to_dir("out", &cfg)?;
//! # Ok(()) }
//! ```

pub mod compositing;
pub mod config;
pub mod error;
pub mod export;
pub mod extract;
pub mod layout;
pub mod model;
pub mod normalize;
pub mod pipeline;

pub use compositing::*;
pub use config::*;
pub use error::*;
pub use export::*;
pub use extract::*;
pub use layout::*;
pub use model::*;
pub use normalize::*;
pub use pipeline::*;

/// Convenience prelude for common types and functions.
/// Importing `jar_sprite_core::prelude::*` brings the primary APIs into scope.
pub mod prelude {
    pub use crate::config::{
        DecodeErrorPolicy, DuplicateNamePolicy, ResampleFilter, SortOrder, SpriteConfig,
        SpriteConfigBuilder,
    };
    pub use crate::error::SpriteError;
    pub use crate::export::StyleOptions;
    pub use crate::extract::{AssetExtractor, ExtractEvent};
    pub use crate::model::{GridLayout, GridPosition, GridSpec, LayoutEntry, SourceImage, Tile};
    pub use crate::{
        SpriteOutput, build_sprite_sheet, compose_sheet, compute_layout, process_container,
    };
}
