use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use clap::{ArgAction, Parser};
use handlebars::Handlebars;
use jar_sprite_core::config::{DecodeErrorPolicy, DuplicateNamePolicy, ResampleFilter, SortOrder};
use jar_sprite_core::{
    AssetExtractor, ExtractEvent, GridLayout, SourceImage, SpriteConfig, SpriteError,
    build_sprite_sheet, css_escape, css_quote, tile_class, validate_container_path,
};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

#[derive(Parser, Debug)]
#[command(
    name = "jar-sprite",
    about = "Build a CSS sprite sheet from the PNG icons inside a .jar",
    version,
    author
)]
struct Cli {
    // Input/Output
    /// Container to read (.jar). Prompted on stdin when omitted
    #[arg(help_heading = "Input/Output")]
    input: Option<PathBuf>,
    /// Output directory
    #[arg(short, long, default_value = "out", help_heading = "Input/Output")]
    out_dir: PathBuf,
    /// YAML config file path (overrides options given on the command line)
    #[arg(long, help_heading = "Input/Output")]
    config: Option<PathBuf>,
    /// Include patterns (glob) on entry paths inside the container
    #[arg(long, help_heading = "Input/Output")]
    include: Vec<String>,
    /// Exclude patterns (glob) on entry paths inside the container
    #[arg(long, help_heading = "Input/Output")]
    exclude: Vec<String>,

    // Layout
    /// Tiles per row
    #[arg(long, default_value_t = 10, help_heading = "Layout")]
    columns: u32,
    /// Tile width in pixels
    #[arg(long, default_value_t = 32, help_heading = "Layout")]
    tile_width: u32,
    /// Tile height in pixels
    #[arg(long, default_value_t = 32, help_heading = "Layout")]
    tile_height: u32,
    /// Layout order: encounter | name_asc
    #[arg(long, default_value = "encounter", help_heading = "Layout")]
    sort_order: String,

    // Image Processing
    /// Resampling filter: triangle | catmullrom | gaussian | lanczos3
    #[arg(long, default_value = "lanczos3", help_heading = "Image Processing")]
    filter: String,
    /// Undecodable entries: abort | skip
    #[arg(long, default_value = "abort", help_heading = "Image Processing")]
    on_decode_error: String,
    /// Tiles sharing a logical name: keep | reject
    #[arg(long, default_value = "keep", help_heading = "Image Processing")]
    duplicates: String,
    /// Normalize tiles in parallel (requires core feature `parallel`)
    #[arg(long, default_value_t = false, help_heading = "Image Processing")]
    parallel: bool,

    // Export
    /// Shared CSS class of every tile
    #[arg(long, default_value = "sprite", help_heading = "Export")]
    class_name: String,
    /// Sprite sheet file name
    #[arg(long, default_value = "sprite.png", help_heading = "Export")]
    sheet_file: String,
    /// Stylesheet file name
    #[arg(long, default_value = "sprite.css", help_heading = "Export")]
    stylesheet_file: String,
    /// Sample markup file name
    #[arg(long, default_value = "sample.html", help_heading = "Export")]
    markup_file: String,
    /// Also write a JSON layout manifest with this file name
    #[arg(long, help_heading = "Export")]
    manifest: Option<String>,
    /// Stylesheet template (handlebars file, or the built-in `scss`)
    #[arg(long, help_heading = "Export")]
    css_template: Option<String>,
    /// Markup template (handlebars file)
    #[arg(long, help_heading = "Export")]
    html_template: Option<PathBuf>,
    /// Print the merged configuration (after CLI/YAML) and exit
    #[arg(long, default_value_t = false, help_heading = "Export")]
    print_config: bool,
    /// Output format for --print-config: json|yaml
    #[arg(long, default_value = "json", value_parser = ["json", "yaml"], help_heading = "Export")]
    print_config_format: String,
    /// Dry run: build everything but do not write files
    #[arg(long, default_value_t = false, help_heading = "Export")]
    dry_run: bool,

    /// Show a progress bar (disable with --progress false or --quiet)
    #[arg(long, default_value_t = true, action=ArgAction::Set, help_heading = "Logging/UX")]
    progress: bool,
    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action=ArgAction::Count, help_heading = "Logging/UX")]
    verbose: u8,
    /// Quiet mode (overrides verbose)
    #[arg(short, long, default_value_t = false, help_heading = "Logging/UX")]
    quiet: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing_with_level(cli.quiet, cli.verbose);
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let sprite_err = err.chain().find_map(|e| e.downcast_ref::<SpriteError>());
            match sprite_err {
                // a wrong file type is reported but is not a failed run
                Some(e @ SpriteError::InvalidInputExtension { .. }) => {
                    println!("{e}");
                    ExitCode::SUCCESS
                }
                Some(e) => {
                    error!("{}: {:#}", e.category(), err);
                    ExitCode::FAILURE
                }
                None => {
                    error!("{:#}", err);
                    ExitCode::FAILURE
                }
            }
        }
    }
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let cfg = build_config(cli)?;
    cfg.validate()?;
    if cfg.parallel && !cfg!(feature = "parallel") {
        warn!("parallel normalization requested but the `parallel` feature is not enabled; running sequentially");
    }

    if cli.print_config {
        match cli.print_config_format.as_str() {
            "yaml" => println!("{}", serde_yaml::to_string(&cfg)?),
            _ => println!("{}", serde_json::to_string_pretty(&cfg)?),
        }
        return Ok(());
    }

    let input = match &cli.input {
        Some(p) => p.clone(),
        None => prompt_input()?,
    };
    validate_container_path(&input, &cfg)?;

    let extractor = AssetExtractor::open(&input, &cfg)?;
    info!(path = %input.display(), entries = extractor.len(), "found image entries");
    let images = extract_with_progress(extractor, cli.progress && !cli.quiet)?;
    info!(count = images.len(), "loaded images");

    let mut out = build_sprite_sheet(images, &cfg)?;

    if let Some(tpl) = &cli.css_template {
        let source = load_template(tpl)?;
        out.stylesheet = render_template(&source, &out.layout, &cfg, false)
            .with_context(|| format!("render stylesheet template {}", tpl))?;
    }
    if let Some(path) = &cli.html_template {
        let source = fs::read_to_string(path)
            .with_context(|| format!("read template {}", path.display()))?;
        out.markup = render_template(&source, &out.layout, &cfg, true)
            .with_context(|| format!("render markup template {}", path.display()))?;
    }

    let row_lengths = out.layout.row_lengths();
    info!(
        tiles = out.layout.len(),
        rows = out.layout.rows,
        ?row_lengths,
        size = %format!("{}x{}", out.layout.width, out.layout.height),
        "stats"
    );

    if cli.dry_run {
        println!(
            "tiles={} rows={} sheet={}x{}",
            out.layout.len(),
            out.layout.rows,
            out.layout.width,
            out.layout.height
        );
        return Ok(());
    }

    let written = out
        .write_to_dir(&cli.out_dir, &cfg)
        .with_context(|| format!("write outputs to {}", cli.out_dir.display()))?;
    info!(sheet = ?written.sheet, stylesheet = ?written.stylesheet, markup = ?written.markup, "sprite written");
    if let Some(manifest) = &written.manifest {
        info!(?manifest, "manifest written");
    }
    Ok(())
}

fn prompt_input() -> anyhow::Result<PathBuf> {
    print!("JAR Path: ");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    let trimmed = line.trim();
    if trimmed.is_empty() {
        anyhow::bail!("no container path given");
    }
    Ok(PathBuf::from(trimmed))
}

fn extract_with_progress(
    extractor: AssetExtractor,
    progress: bool,
) -> anyhow::Result<Vec<SourceImage>> {
    use indicatif::{ProgressBar, ProgressStyle};
    let bar = if progress {
        let b = ProgressBar::new(extractor.len() as u64);
        b.set_style(ProgressStyle::with_template(
            "{spinner:.green} extracting {pos}/{len} [{elapsed_precise}] {wide_msg}",
        )?);
        Some(b)
    } else {
        None
    };
    let images = extractor.extract_with(|event| {
        if let Some(b) = &bar {
            let path = match event {
                ExtractEvent::Decoded { path, .. } | ExtractEvent::Skipped { path, .. } => path,
            };
            b.set_message(path.to_string());
            b.inc(1);
        }
    });
    if let Some(b) = &bar {
        b.finish_and_clear();
    }
    Ok(images?)
}

fn init_tracing_with_level(quiet: bool, verbose: u8) {
    let level = if quiet {
        "error".to_string()
    } else {
        match verbose {
            0 => "info".into(),
            1 => "debug".into(),
            _ => "trace".into(),
        }
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(level)
        .with_target(false)
        .try_init();
}

// ---------- templates ----------

#[derive(Serialize)]
struct TemplateSprite {
    name: String,
    /// `name` as a quoted CSS/SCSS string
    quoted: String,
    class: String,
    selector: String,
    index: usize,
    row: u32,
    column: u32,
    x: u32,
    y: u32,
}

#[derive(Serialize)]
struct TemplateContext {
    image: String,
    image_quoted: String,
    stylesheet: String,
    class: String,
    class_selector: String,
    tile: serde_json::Value,
    sheet: serde_json::Value,
    sprites: Vec<TemplateSprite>,
}

fn build_template_context(layout: &GridLayout, cfg: &SpriteConfig) -> TemplateContext {
    let sprites = layout
        .entries
        .iter()
        .map(|e| {
            let class = tile_class(&e.key, &cfg.class_name);
            TemplateSprite {
                name: e.key.clone(),
                quoted: css_quote(&e.key),
                selector: css_escape(&class),
                class,
                index: e.index,
                row: e.position.row,
                column: e.position.column,
                x: e.offset_x,
                y: e.offset_y,
            }
        })
        .collect();
    TemplateContext {
        image: cfg.sheet_file.clone(),
        image_quoted: css_quote(&format!("./{}", cfg.sheet_file)),
        stylesheet: cfg.stylesheet_file.clone(),
        class: cfg.class_name.clone(),
        class_selector: css_escape(&cfg.class_name),
        tile: serde_json::json!({"w": layout.spec.tile_width, "h": layout.spec.tile_height}),
        sheet: serde_json::json!({"w": layout.width, "h": layout.height}),
        sprites,
    }
}

fn load_template(spec: &str) -> anyhow::Result<String> {
    match spec.to_ascii_lowercase().as_str() {
        "scss" => Ok(include_str!("templates/sprite.scss.hbs").to_string()),
        _ => fs::read_to_string(Path::new(spec)).with_context(|| format!("read template {}", spec)),
    }
}

fn render_template(
    source: &str,
    layout: &GridLayout,
    cfg: &SpriteConfig,
    html: bool,
) -> anyhow::Result<String> {
    let ctx = build_template_context(layout, cfg);
    let mut reg = Handlebars::new();
    reg.set_strict_mode(true);
    if !html {
        reg.register_escape_fn(handlebars::no_escape);
    }
    reg.register_template_string("tpl", source)?;
    Ok(reg.render("tpl", &ctx)?)
}

// ---------- YAML config ----------

#[derive(Debug, Deserialize, Default)]
struct YamlConfig {
    max_columns: Option<u32>,
    tile_width: Option<u32>,
    tile_height: Option<u32>,
    container_suffix: Option<String>,
    image_suffix: Option<String>,
    include: Option<Vec<String>>,
    exclude: Option<Vec<String>>,
    on_decode_error: Option<String>,
    duplicate_names: Option<String>,
    sort_order: Option<String>,
    filter: Option<String>,
    parallel: Option<bool>,
    class_name: Option<String>,
    sheet_file: Option<String>,
    stylesheet_file: Option<String>,
    markup_file: Option<String>,
    manifest_file: Option<String>,
}

impl YamlConfig {
    fn into_sprite_config(self, mut cfg: SpriteConfig) -> anyhow::Result<SpriteConfig> {
        if let Some(v) = self.max_columns {
            cfg.max_columns = v;
        }
        if let Some(v) = self.tile_width {
            cfg.tile_width = v;
        }
        if let Some(v) = self.tile_height {
            cfg.tile_height = v;
        }
        if let Some(v) = self.container_suffix {
            cfg.container_suffix = v;
        }
        if let Some(v) = self.image_suffix {
            cfg.image_suffix = v;
        }
        if let Some(v) = self.include {
            cfg.include = v;
        }
        if let Some(v) = self.exclude {
            cfg.exclude = v;
        }
        if let Some(v) = self.on_decode_error {
            cfg.on_decode_error = parse_decode_policy(&v)?;
        }
        if let Some(v) = self.duplicate_names {
            cfg.duplicate_names = parse_duplicate_policy(&v)?;
        }
        if let Some(v) = self.sort_order {
            cfg.sort_order = parse_sort_order(&v)?;
        }
        if let Some(v) = self.filter {
            cfg.filter = parse_filter(&v)?;
        }
        if let Some(v) = self.parallel {
            cfg.parallel = v;
        }
        if let Some(v) = self.class_name {
            cfg.class_name = v;
        }
        if let Some(v) = self.sheet_file {
            cfg.sheet_file = v;
        }
        if let Some(v) = self.stylesheet_file {
            cfg.stylesheet_file = v;
        }
        if let Some(v) = self.markup_file {
            cfg.markup_file = v;
        }
        if let Some(v) = self.manifest_file {
            cfg.manifest_file = Some(v);
        }
        Ok(cfg)
    }
}

fn build_config(cli: &Cli) -> anyhow::Result<SpriteConfig> {
    let cfg = SpriteConfig {
        max_columns: cli.columns,
        tile_width: cli.tile_width,
        tile_height: cli.tile_height,
        include: cli.include.clone(),
        exclude: cli.exclude.clone(),
        on_decode_error: parse_decode_policy(&cli.on_decode_error)?,
        duplicate_names: parse_duplicate_policy(&cli.duplicates)?,
        sort_order: parse_sort_order(&cli.sort_order)?,
        filter: parse_filter(&cli.filter)?,
        parallel: cli.parallel,
        class_name: cli.class_name.clone(),
        sheet_file: cli.sheet_file.clone(),
        stylesheet_file: cli.stylesheet_file.clone(),
        markup_file: cli.markup_file.clone(),
        manifest_file: cli.manifest.clone(),
        ..Default::default()
    };
    // config file sets options en bloc on top of the command line
    match &cli.config {
        Some(path) => {
            let file = fs::read_to_string(path)
                .with_context(|| format!("read config {}", path.display()))?;
            let y: YamlConfig = serde_yaml::from_str(&file)
                .with_context(|| format!("parse config {}", path.display()))?;
            y.into_sprite_config(cfg)
        }
        None => Ok(cfg),
    }
}

fn parse_sort_order(s: &str) -> anyhow::Result<SortOrder> {
    s.parse()
        .map_err(|_| anyhow::anyhow!("unknown sort order: {}", s))
}

fn parse_decode_policy(s: &str) -> anyhow::Result<DecodeErrorPolicy> {
    s.parse()
        .map_err(|_| anyhow::anyhow!("unknown decode error policy: {}", s))
}

fn parse_duplicate_policy(s: &str) -> anyhow::Result<DuplicateNamePolicy> {
    s.parse()
        .map_err(|_| anyhow::anyhow!("unknown duplicate name policy: {}", s))
}

fn parse_filter(s: &str) -> anyhow::Result<ResampleFilter> {
    s.parse()
        .map_err(|_| anyhow::anyhow!("unknown resample filter: {}", s))
}
