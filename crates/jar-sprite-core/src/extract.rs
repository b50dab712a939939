use crate::config::{DecodeErrorPolicy, SpriteConfig};
use crate::error::{Result, SpriteError};
use crate::model::SourceImage;
use globset::{Glob, GlobSet, GlobSetBuilder};
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;
use tracing::{debug, instrument, warn};
use zip::ZipArchive;
use zip::result::ZipError;

const MAX_PREALLOC: u64 = 1 << 24;

/// Logical name of an entry: the last `/` segment with `suffix` removed.
///
/// `a/b/icon.png` → `icon`. Applying it to its own output is a no-op.
/// A segment that is nothing but the suffix is kept whole.
pub fn logical_name(path: &str, suffix: &str) -> String {
    let last = path.rsplit('/').next().unwrap_or(path);
    match last.strip_suffix(suffix) {
        Some(stem) if !stem.is_empty() => stem.to_string(),
        _ => last.to_string(),
    }
}

/// Progress notification emitted once per qualifying entry.
#[derive(Debug, Clone)]
pub enum ExtractEvent<'a> {
    Decoded {
        path: &'a str,
        key: &'a str,
        width: u32,
        height: u32,
    },
    Skipped {
        path: &'a str,
        error: &'a SpriteError,
    },
}

/// Reads image entries out of a zip/jar container.
///
/// The container handle is owned here and released when the extractor is dropped.
pub struct AssetExtractor<R = BufReader<File>> {
    archive: ZipArchive<R>,
    /// (archive index, entry path) of qualifying entries, in central-directory order.
    entries: Vec<(usize, String)>,
    image_suffix: String,
    policy: DecodeErrorPolicy,
}

impl AssetExtractor<BufReader<File>> {
    /// Opens the container at `path`.
    pub fn open(path: impl AsRef<Path>, cfg: &SpriteConfig) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| SpriteError::ContainerOpen {
            path: path.to_path_buf(),
            source,
        })?;
        let archive = ZipArchive::new(BufReader::new(file)).map_err(|source| match source {
            ZipError::Io(source) => SpriteError::ContainerOpen {
                path: path.to_path_buf(),
                source,
            },
            source => SpriteError::ContainerFormat {
                path: path.to_path_buf(),
                source,
            },
        })?;
        debug!(path = %path.display(), entries = archive.len(), "opened container");
        Self::from_archive(archive, cfg)
    }
}

impl<R: Read + Seek> AssetExtractor<R> {
    /// Wraps an already-open reader (e.g. an in-memory archive).
    pub fn from_reader(reader: R, cfg: &SpriteConfig) -> Result<Self> {
        let archive = ZipArchive::new(reader).map_err(|source| SpriteError::ContainerFormat {
            path: "<memory>".into(),
            source,
        })?;
        Self::from_archive(archive, cfg)
    }

    fn from_archive(archive: ZipArchive<R>, cfg: &SpriteConfig) -> Result<Self> {
        let include = build_globset(&cfg.include)?;
        let exclude = build_globset(&cfg.exclude)?;
        let mut entries = Vec::new();
        for index in 0..archive.len() {
            let Some(name) = archive.name_for_index(index) else {
                continue;
            };
            if !name.ends_with(cfg.image_suffix.as_str()) {
                continue;
            }
            if exclude.as_ref().is_some_and(|ex| ex.is_match(name)) {
                continue;
            }
            if include.as_ref().is_some_and(|inc| !inc.is_match(name)) {
                continue;
            }
            entries.push((index, name.to_string()));
        }
        Ok(Self {
            archive,
            entries,
            image_suffix: cfg.image_suffix.clone(),
            policy: cfg.on_decode_error,
        })
    }

    /// Paths of the entries that will be extracted, in order.
    pub fn image_entries(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(_, name)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Decodes every qualifying entry.
    pub fn extract(self) -> Result<Vec<SourceImage>> {
        self.extract_with(|_| {})
    }

    /// Decodes every qualifying entry, reporting each one to `on_event`.
    #[instrument(skip_all, fields(entries = self.entries.len()))]
    pub fn extract_with<F>(mut self, mut on_event: F) -> Result<Vec<SourceImage>>
    where
        F: FnMut(ExtractEvent<'_>),
    {
        let entries = std::mem::take(&mut self.entries);
        let mut out = Vec::with_capacity(entries.len());
        for (index, path) in entries {
            match self.decode_entry(index, &path) {
                Ok(src) => {
                    on_event(ExtractEvent::Decoded {
                        path: &src.path,
                        key: &src.key,
                        width: src.image.width(),
                        height: src.image.height(),
                    });
                    out.push(src);
                }
                Err(err) => match self.policy {
                    DecodeErrorPolicy::Abort => return Err(err),
                    DecodeErrorPolicy::Skip => {
                        warn!(entry = %path, error = %err, "skip image");
                        on_event(ExtractEvent::Skipped {
                            path: &path,
                            error: &err,
                        });
                    }
                },
            }
        }
        debug!(count = out.len(), "extracted images");
        Ok(out)
    }

    fn decode_entry(&mut self, index: usize, path: &str) -> Result<SourceImage> {
        let entry_err = |source| SpriteError::Entry {
            entry: path.to_string(),
            source,
        };
        let mut file = self.archive.by_index(index).map_err(entry_err)?;
        // header sizes are untrusted, cap the hint
        let hint = file.size().min(MAX_PREALLOC) as usize;
        let mut bytes = Vec::with_capacity(hint);
        file.read_to_end(&mut bytes)
            .map_err(|e| entry_err(ZipError::Io(e)))?;
        let image = image::load_from_memory(&bytes).map_err(|source| SpriteError::Decode {
            entry: path.to_string(),
            source,
        })?;
        Ok(SourceImage {
            key: logical_name(path, &self.image_suffix),
            path: path.to_string(),
            image,
        })
    }
}

fn build_globset(patterns: &[String]) -> Result<Option<GlobSet>> {
    if patterns.is_empty() {
        return Ok(None);
    }
    let mut b = GlobSetBuilder::new();
    for pat in patterns {
        b.add(Glob::new(pat)?);
    }
    Ok(Some(b.build()?))
}
