use crate::compositing::{compose_sheet, encode_png};
use crate::config::{DuplicateNamePolicy, SortOrder, SpriteConfig};
use crate::error::{Result, SpriteError};
use crate::export::{
    StyleOptions, class_token, tile_class, to_json_manifest, to_markup, to_stylesheet,
};
use crate::extract::AssetExtractor;
use crate::layout::compute_layout;
use crate::model::{GridLayout, SourceImage};
use crate::normalize::normalize_all;
use image::RgbaImage;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, instrument, warn};

/// Every artifact of one run, held in memory until written.
pub struct SpriteOutput {
    pub layout: GridLayout,
    pub sheet: RgbaImage,
    pub stylesheet: String,
    pub markup: String,
}

/// Paths written by `SpriteOutput::write_to_dir`.
#[derive(Debug, Clone)]
pub struct WrittenFiles {
    pub sheet: PathBuf,
    pub stylesheet: PathBuf,
    pub markup: PathBuf,
    pub manifest: Option<PathBuf>,
}

/// Rejects paths that do not carry the container suffix.
pub fn validate_container_path(path: &Path, cfg: &SpriteConfig) -> Result<()> {
    let ok = path
        .to_str()
        .is_some_and(|s| s.ends_with(cfg.container_suffix.as_str()));
    if ok {
        Ok(())
    } else {
        Err(SpriteError::InvalidInputExtension {
            path: path.to_path_buf(),
            expected: cfg.container_suffix.clone(),
        })
    }
}

/// Opens the container at `path`, extracts its images and builds the sheet.
#[instrument(skip_all, fields(path = %path.as_ref().display()))]
pub fn process_container(path: impl AsRef<Path>, cfg: &SpriteConfig) -> Result<SpriteOutput> {
    let path = path.as_ref();
    cfg.validate()?;
    validate_container_path(path, cfg)?;
    // extractor (and its file handle) is consumed here
    let images = AssetExtractor::open(path, cfg)?.extract()?;
    build_sprite_sheet(images, cfg)
}

/// Builds sheet, stylesheet and markup from already-decoded images.
///
/// The layout is computed once and shared by every artifact.
#[instrument(skip_all, fields(count = images.len()))]
pub fn build_sprite_sheet(mut images: Vec<SourceImage>, cfg: &SpriteConfig) -> Result<SpriteOutput> {
    cfg.validate()?;

    match cfg.sort_order {
        SortOrder::Encounter => {}
        SortOrder::NameAsc => images.sort_by(|a, b| a.key.cmp(&b.key)),
    }
    check_duplicates(&images, &cfg.class_name, cfg.duplicate_names)?;

    let tiles = normalize_all(&images, cfg);
    drop(images);

    let layout = compute_layout(tiles.iter().map(|t| t.key.as_str()), &cfg.grid_spec())?;
    let sheet = compose_sheet(&tiles, &layout)?;
    let opts = StyleOptions::from(cfg);
    let stylesheet = to_stylesheet(&layout, &opts);
    let markup = to_markup(&layout, &opts);
    info!(
        tiles = layout.len(),
        rows = layout.rows,
        width = layout.width,
        height = layout.height,
        "sprite sheet built"
    );
    Ok(SpriteOutput {
        layout,
        sheet,
        stylesheet,
        markup,
    })
}

/// A tile collides with an earlier tile of the same logical name, or with the
/// shared class. Under `Keep` the latter is renamed by `tile_class`.
fn check_duplicates(
    images: &[SourceImage],
    class_name: &str,
    policy: DuplicateNamePolicy,
) -> Result<()> {
    let mut seen: HashMap<&str, &str> = HashMap::new();
    for img in images {
        if class_token(&img.key) == class_name {
            match policy {
                DuplicateNamePolicy::Keep => {
                    warn!(
                        key = %img.key,
                        path = %img.path,
                        class = %tile_class(&img.key, class_name),
                        "logical name equals the shared class, tile class renamed"
                    );
                }
                DuplicateNamePolicy::Reject => {
                    return Err(SpriteError::DuplicateName {
                        key: img.key.clone(),
                        first: format!("shared class '{}'", class_name),
                        second: img.path.clone(),
                    });
                }
            }
        }
        if let Some(first) = seen.insert(&img.key, &img.path) {
            match policy {
                DuplicateNamePolicy::Keep => {
                    warn!(key = %img.key, first, second = %img.path, "duplicate logical name, later rule wins");
                }
                DuplicateNamePolicy::Reject => {
                    return Err(SpriteError::DuplicateName {
                        key: img.key.clone(),
                        first: first.to_string(),
                        second: img.path.clone(),
                    });
                }
            }
        }
    }
    Ok(())
}

impl SpriteOutput {
    /// PNG bytes of the sheet.
    pub fn encode_sheet(&self) -> Result<Vec<u8>> {
        encode_png(&self.sheet)
    }

    /// Writes every artifact into `dir`, overwriting earlier runs.
    ///
    /// Files already written are left in place if a later write fails.
    pub fn write_to_dir(&self, dir: impl AsRef<Path>, cfg: &SpriteConfig) -> Result<WrittenFiles> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir).map_err(|source| SpriteError::Write {
            path: dir.to_path_buf(),
            source,
        })?;
        let png = self.encode_sheet()?;
        let sheet = write_file(dir.join(&cfg.sheet_file), &png)?;
        let stylesheet = write_file(dir.join(&cfg.stylesheet_file), self.stylesheet.as_bytes())?;
        let markup = write_file(dir.join(&cfg.markup_file), self.markup.as_bytes())?;
        let manifest = match &cfg.manifest_file {
            Some(name) => {
                let value = to_json_manifest(&self.layout, &StyleOptions::from(cfg));
                let json = serde_json::to_string_pretty(&value)?;
                Some(write_file(dir.join(name), json.as_bytes())?)
            }
            None => None,
        };
        Ok(WrittenFiles {
            sheet,
            stylesheet,
            markup,
            manifest,
        })
    }
}

fn write_file(path: PathBuf, contents: &[u8]) -> Result<PathBuf> {
    fs::write(&path, contents).map_err(|source| SpriteError::Write {
        path: path.clone(),
        source,
    })?;
    info!(path = %path.display(), bytes = contents.len(), "wrote file");
    Ok(path)
}
