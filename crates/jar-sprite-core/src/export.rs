use crate::config::SpriteConfig;
use crate::model::GridLayout;
use serde_json::{Value, json};
use std::fmt::Write as _;

/// Naming shared by the text exporters.
#[derive(Debug, Clone)]
pub struct StyleOptions {
    /// Class carried by every tile element.
    pub class_name: String,
    /// Sheet file referenced from the stylesheet.
    pub sheet_file: String,
    /// Stylesheet file referenced from the markup.
    pub stylesheet_file: String,
}

impl Default for StyleOptions {
    fn default() -> Self {
        (&SpriteConfig::default()).into()
    }
}

impl From<&SpriteConfig> for StyleOptions {
    fn from(cfg: &SpriteConfig) -> Self {
        Self {
            class_name: cfg.class_name.clone(),
            sheet_file: cfg.sheet_file.clone(),
            stylesheet_file: cfg.stylesheet_file.clone(),
        }
    }
}

/// HTML class token for a logical name. Whitespace would split the name into
/// several classes, so it becomes `-`.
pub fn class_token(key: &str) -> String {
    key.chars()
        .map(|c| if c.is_whitespace() { '-' } else { c })
        .collect()
}

/// Per-tile class for `key`. A name that would coincide with the shared class
/// gets a `-tile` suffix, otherwise its rule would reposition every tile.
pub fn tile_class(key: &str, class_name: &str) -> String {
    let token = class_token(key);
    if token == class_name {
        format!("{}-tile", token)
    } else {
        token
    }
}

/// Escapes `ident` for use after `.` in a CSS selector.
pub fn css_escape(ident: &str) -> String {
    let chars: Vec<char> = ident.chars().collect();
    let mut out = String::with_capacity(ident.len());
    for (i, &c) in chars.iter().enumerate() {
        let leading_digit =
            c.is_ascii_digit() && (i == 0 || (i == 1 && chars[0] == '-'));
        if c == '\0' {
            out.push('\u{FFFD}');
        } else if leading_digit || c.is_control() {
            let _ = write!(out, "\\{:x} ", c as u32);
        } else if i == 0 && c == '-' && chars.len() == 1 {
            out.push_str("\\-");
        } else if c.is_ascii_alphanumeric() || c == '-' || c == '_' || !c.is_ascii() {
            out.push(c);
        } else {
            out.push('\\');
            out.push(c);
        }
    }
    out
}

/// Double-quoted CSS/SCSS string literal.
pub fn css_quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' | '\\' => {
                out.push('\\');
                out.push(c);
            }
            '\n' | '\r' | '\x0c' => {
                let _ = write!(out, "\\{:x} ", c as u32);
            }
            _ => out.push(c),
        }
    }
    out.push('"');
    out
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Stylesheet: the shared class block, then one `background-position` rule per tile
/// in layout order. Duplicate names produce duplicate rules; the later one wins.
pub fn to_stylesheet(layout: &GridLayout, opts: &StyleOptions) -> String {
    let mut s = String::new();
    let _ = write!(
        s,
        ".{} {{\n  display: inline-block;\n  vertical-align: middle;\n  width: {}px;\n  height: {}px;\n  background: url({}) no-repeat;\n}}\n",
        css_escape(&opts.class_name),
        layout.spec.tile_width,
        layout.spec.tile_height,
        css_quote(&format!("./{}", opts.sheet_file)),
    );
    for e in &layout.entries {
        let _ = write!(
            s,
            "\n.{} {{\n  background-position: -{}px -{}px;\n}}\n",
            css_escape(&tile_class(&e.key, &opts.class_name)),
            e.offset_x,
            e.offset_y,
        );
    }
    s
}

/// Sample page showing every tile next to its name, in layout order.
pub fn to_markup(layout: &GridLayout, opts: &StyleOptions) -> String {
    let mut s = String::new();
    let _ = write!(
        s,
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>Sprites</title>\n<link rel=\"stylesheet\" type=\"text/css\" href=\"./{}\">\n</head>\n<body>\n",
        html_escape(&opts.stylesheet_file)
    );
    for e in &layout.entries {
        let _ = writeln!(
            s,
            "<div><div class=\"{} {}\"></div><span style=\"padding-left:0.5em\">{}</span></div>",
            html_escape(&opts.class_name),
            html_escape(&tile_class(&e.key, &opts.class_name)),
            html_escape(&e.key),
        );
    }
    s.push_str("</body>\n</html>\n");
    s
}

/// JSON manifest `{ frames, meta }` describing every placement.
pub fn to_json_manifest(layout: &GridLayout, opts: &StyleOptions) -> Value {
    let frames: Vec<Value> = layout
        .entries
        .iter()
        .map(|e| {
            json!({
                "key": e.key,
                "class": tile_class(&e.key, &opts.class_name),
                "index": e.index,
                "row": e.position.row,
                "column": e.position.column,
                "frame": {
                    "x": e.offset_x,
                    "y": e.offset_y,
                    "w": layout.spec.tile_width,
                    "h": layout.spec.tile_height,
                },
            })
        })
        .collect();
    json!({
        "frames": frames,
        "meta": {
            "app": "jar-sprite",
            "version": env!("CARGO_PKG_VERSION"),
            "image": opts.sheet_file,
            "stylesheet": opts.stylesheet_file,
            "class": opts.class_name,
            "size": {"w": layout.width, "h": layout.height},
            "tile": {"w": layout.spec.tile_width, "h": layout.spec.tile_height},
            "columns": layout.spec.max_columns,
            "rows": layout.rows,
        },
    })
}
