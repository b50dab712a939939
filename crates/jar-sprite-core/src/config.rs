use image::imageops::FilterType;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::model::GridSpec;

/// Order in which extracted images are laid out on the grid.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    /// Keep the container's enumeration order (central directory order).
    Encounter,
    /// Stable sort by logical name. Changes the visual arrangement but is
    /// reproducible across archive tools.
    NameAsc,
}

impl FromStr for SortOrder {
    type Err = ();
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "encounter" | "none" => Ok(Self::Encounter),
            "name_asc" | "name" => Ok(Self::NameAsc),
            _ => Err(()),
        }
    }
}

/// What to do when an entry carries the image suffix but fails to decode.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DecodeErrorPolicy {
    /// Stop the run on the first bad entry.
    Abort,
    /// Log a warning and continue without the entry.
    Skip,
}

impl FromStr for DecodeErrorPolicy {
    type Err = ();
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "abort" => Ok(Self::Abort),
            "skip" => Ok(Self::Skip),
            _ => Err(()),
        }
    }
}

/// Policy for tiles that derive the same logical name (e.g. `a/icon.png`, `b/icon.png`).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DuplicateNamePolicy {
    /// Keep every tile; both rules are emitted and the later one wins in the cascade.
    Keep,
    /// Fail the run with `SpriteError::DuplicateName`.
    Reject,
}

impl FromStr for DuplicateNamePolicy {
    type Err = ();
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "keep" | "last_wins" => Ok(Self::Keep),
            "reject" => Ok(Self::Reject),
            _ => Err(()),
        }
    }
}

/// Smooth resampling filters used to normalize tiles.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ResampleFilter {
    Triangle,
    CatmullRom,
    Gaussian,
    Lanczos3,
}

impl ResampleFilter {
    pub fn filter_type(self) -> FilterType {
        match self {
            Self::Triangle => FilterType::Triangle,
            Self::CatmullRom => FilterType::CatmullRom,
            Self::Gaussian => FilterType::Gaussian,
            Self::Lanczos3 => FilterType::Lanczos3,
        }
    }
}

impl FromStr for ResampleFilter {
    type Err = ();
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "triangle" | "linear" => Ok(Self::Triangle),
            "catmullrom" | "catmull_rom" | "cubic" => Ok(Self::CatmullRom),
            "gaussian" => Ok(Self::Gaussian),
            "lanczos3" | "lanczos" => Ok(Self::Lanczos3),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpriteConfig {
    /// Tiles per grid row.
    pub max_columns: u32,
    /// Tile width in pixels.
    pub tile_width: u32,
    /// Tile height in pixels.
    pub tile_height: u32,

    /// Accepted container suffix (case-sensitive).
    #[serde(default = "default_container_suffix")]
    pub container_suffix: String,
    /// Entry name suffix that marks an image resource (case-sensitive).
    #[serde(default = "default_image_suffix")]
    pub image_suffix: String,
    /// Include globs on entry paths. Empty means everything with the image suffix.
    #[serde(default)]
    pub include: Vec<String>,
    /// Exclude globs on entry paths.
    #[serde(default)]
    pub exclude: Vec<String>,

    #[serde(default = "default_decode_policy")]
    pub on_decode_error: DecodeErrorPolicy,
    #[serde(default = "default_duplicate_policy")]
    pub duplicate_names: DuplicateNamePolicy,
    #[serde(default = "default_sort_order")]
    pub sort_order: SortOrder,
    #[serde(default = "default_filter")]
    pub filter: ResampleFilter,
    /// Normalize tiles in parallel when feature "parallel" is on.
    #[serde(default)]
    pub parallel: bool,

    // output naming
    /// Shared CSS class carried by every tile.
    #[serde(default = "default_class_name")]
    pub class_name: String,
    #[serde(default = "default_sheet_file")]
    pub sheet_file: String,
    #[serde(default = "default_stylesheet_file")]
    pub stylesheet_file: String,
    #[serde(default = "default_markup_file")]
    pub markup_file: String,
    /// Also write a JSON layout manifest with this name.
    #[serde(default)]
    pub manifest_file: Option<String>,
}

impl Default for SpriteConfig {
    fn default() -> Self {
        Self {
            max_columns: 10,
            tile_width: 32,
            tile_height: 32,
            container_suffix: default_container_suffix(),
            image_suffix: default_image_suffix(),
            include: Vec::new(),
            exclude: Vec::new(),
            on_decode_error: default_decode_policy(),
            duplicate_names: default_duplicate_policy(),
            sort_order: default_sort_order(),
            filter: default_filter(),
            parallel: false,
            class_name: default_class_name(),
            sheet_file: default_sheet_file(),
            stylesheet_file: default_stylesheet_file(),
            markup_file: default_markup_file(),
            manifest_file: None,
        }
    }
}

impl SpriteConfig {
    /// Validates the configuration parameters.
    ///
    /// Returns an error if a grid dimension is zero, a suffix or file name is
    /// empty, or the class name cannot be used as an HTML class token.
    pub fn validate(&self) -> crate::error::Result<()> {
        use crate::error::SpriteError;

        if self.max_columns == 0 || self.tile_width == 0 || self.tile_height == 0 {
            return Err(SpriteError::InvalidConfig(format!(
                "grid dimensions must be non-zero (columns={}, tile={}x{})",
                self.max_columns, self.tile_width, self.tile_height
            )));
        }
        if self.max_columns.checked_mul(self.tile_width).is_none() {
            return Err(SpriteError::InvalidConfig(format!(
                "sheet width overflows: {} columns of {}px",
                self.max_columns, self.tile_width
            )));
        }
        if self.container_suffix.is_empty() || self.image_suffix.is_empty() {
            return Err(SpriteError::InvalidConfig(
                "container and image suffixes must not be empty".into(),
            ));
        }
        if self.class_name.is_empty() || self.class_name.contains(char::is_whitespace) {
            return Err(SpriteError::InvalidConfig(format!(
                "class name '{}' must be a single non-empty token",
                self.class_name
            )));
        }
        for name in [&self.sheet_file, &self.stylesheet_file, &self.markup_file]
            .into_iter()
            .chain(self.manifest_file.as_ref())
        {
            if name.is_empty() {
                return Err(SpriteError::InvalidConfig(
                    "output file names must not be empty".into(),
                ));
            }
        }
        Ok(())
    }

    pub fn grid_spec(&self) -> GridSpec {
        GridSpec {
            max_columns: self.max_columns,
            tile_width: self.tile_width,
            tile_height: self.tile_height,
        }
    }
}

fn default_container_suffix() -> String {
    ".jar".into()
}
fn default_image_suffix() -> String {
    ".png".into()
}
fn default_decode_policy() -> DecodeErrorPolicy {
    DecodeErrorPolicy::Abort
}
fn default_duplicate_policy() -> DuplicateNamePolicy {
    DuplicateNamePolicy::Keep
}
fn default_sort_order() -> SortOrder {
    SortOrder::Encounter
}
fn default_filter() -> ResampleFilter {
    ResampleFilter::Lanczos3
}
fn default_class_name() -> String {
    "sprite".into()
}
fn default_sheet_file() -> String {
    "sprite.png".into()
}
fn default_stylesheet_file() -> String {
    "sprite.css".into()
}
fn default_markup_file() -> String {
    "sample.html".into()
}

/// Builder for `SpriteConfig` for ergonomic construction.
#[derive(Debug, Default, Clone)]
pub struct SpriteConfigBuilder {
    cfg: SpriteConfig,
}

impl SpriteConfigBuilder {
    pub fn new() -> Self {
        Self {
            cfg: SpriteConfig::default(),
        }
    }
    pub fn max_columns(mut self, v: u32) -> Self {
        self.cfg.max_columns = v;
        self
    }
    pub fn with_tile_size(mut self, w: u32, h: u32) -> Self {
        self.cfg.tile_width = w;
        self.cfg.tile_height = h;
        self
    }
    pub fn container_suffix(mut self, v: impl Into<String>) -> Self {
        self.cfg.container_suffix = v.into();
        self
    }
    pub fn image_suffix(mut self, v: impl Into<String>) -> Self {
        self.cfg.image_suffix = v.into();
        self
    }
    pub fn include(mut self, v: Vec<String>) -> Self {
        self.cfg.include = v;
        self
    }
    pub fn exclude(mut self, v: Vec<String>) -> Self {
        self.cfg.exclude = v;
        self
    }
    pub fn on_decode_error(mut self, v: DecodeErrorPolicy) -> Self {
        self.cfg.on_decode_error = v;
        self
    }
    pub fn duplicate_names(mut self, v: DuplicateNamePolicy) -> Self {
        self.cfg.duplicate_names = v;
        self
    }
    pub fn sort_order(mut self, v: SortOrder) -> Self {
        self.cfg.sort_order = v;
        self
    }
    pub fn filter(mut self, v: ResampleFilter) -> Self {
        self.cfg.filter = v;
        self
    }
    pub fn parallel(mut self, v: bool) -> Self {
        self.cfg.parallel = v;
        self
    }
    pub fn class_name(mut self, v: impl Into<String>) -> Self {
        self.cfg.class_name = v.into();
        self
    }
    pub fn sheet_file(mut self, v: impl Into<String>) -> Self {
        self.cfg.sheet_file = v.into();
        self
    }
    pub fn stylesheet_file(mut self, v: impl Into<String>) -> Self {
        self.cfg.stylesheet_file = v.into();
        self
    }
    pub fn markup_file(mut self, v: impl Into<String>) -> Self {
        self.cfg.markup_file = v.into();
        self
    }
    pub fn manifest_file(mut self, v: Option<String>) -> Self {
        self.cfg.manifest_file = v;
        self
    }
    pub fn build(self) -> SpriteConfig {
        self.cfg
    }
}

impl SpriteConfig {
    /// Create a fluent builder for `SpriteConfig`.
    pub fn builder() -> SpriteConfigBuilder {
        SpriteConfigBuilder::new()
    }
}
