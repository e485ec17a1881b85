use crate::config::Configuration;
use crate::error::ConfigError;
use crate::render::{fmt_coord, render_to_string, SvgRenderer};
use crate::scene::Scene;
use crate::snapshot::ConfigSnapshot;
use anyhow::Context;
use std::path::Path;

pub use crate::controller::MARGIN;

/// Output height in pixels; width follows the aspect ratio.
pub const EXPORT_SIZE: f32 = 1600.0;

const DESC_OPEN: &str = "<desc id=\"json-config\">";
const DESC_CLOSE: &str = "</desc>";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExportOptions {
    pub size: f32,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self { size: EXPORT_SIZE }
    }
}

/// Standalone SVG document for `scene`, carrying the run's configuration as
/// JSON so the piece can be regenerated later.
pub fn svg_document(
    scene: &Scene,
    snapshot: &ConfigSnapshot,
    opts: &ExportOptions,
) -> anyhow::Result<String> {
    let canvas = scene.canvas_size();
    let inner = render_to_string(&mut SvgRenderer::new(), scene)?;
    let json = serde_json::to_string(snapshot).context("serialize configuration")?;

    Ok(format!(
        "<svg width=\"{}\" height=\"{}\" viewBox=\"0 0 {} {}\" xmlns=\"http://www.w3.org/2000/svg\">\n\
         {DESC_OPEN}{}{DESC_CLOSE}\n\
         <rect width=\"100%\" height=\"100%\" fill=\"{}\"/>\n\
         {inner}</svg>\n",
        fmt_coord(opts.size * snapshot.aspect_ratio),
        fmt_coord(opts.size),
        fmt_coord(canvas.width),
        fmt_coord(canvas.height),
        escape_text(&json),
        escape_text(&scene.background),
    ))
}

pub fn write_svg(
    path: impl AsRef<Path>,
    scene: &Scene,
    snapshot: &ConfigSnapshot,
    opts: &ExportOptions,
) -> anyhow::Result<()> {
    let path = path.as_ref();
    let body = svg_document(scene, snapshot, opts)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create {}", parent.display()))?;
    }
    let tmp = path.with_extension("svg.tmp");
    std::fs::write(&tmp, body).with_context(|| format!("write {}", tmp.display()))?;
    std::fs::rename(&tmp, path).with_context(|| format!("rename to {}", path.display()))
}

/// Recovers the configuration embedded by `svg_document`.
pub fn config_from_svg(text: &str) -> Result<Configuration, ConfigError> {
    let start = text
        .find(DESC_OPEN)
        .map(|i| i + DESC_OPEN.len())
        .ok_or_else(|| ConfigError::Embedded("no json-config description".to_string()))?;
    let len = text[start..]
        .find(DESC_CLOSE)
        .ok_or_else(|| ConfigError::Embedded("unterminated description".to_string()))?;
    let json = unescape_text(&text[start..start + len]);
    let config: Configuration =
        serde_json::from_str(&json).map_err(|e| ConfigError::Embedded(e.to_string()))?;
    config.validate()?;
    Ok(config)
}

pub fn load_config_from_svg(path: impl AsRef<Path>) -> Result<Configuration, ConfigError> {
    let text = std::fs::read_to_string(path.as_ref())
        .map_err(|e| ConfigError::Io(format!("{}: {e}", path.as_ref().display())))?;
    config_from_svg(&text)
}

fn escape_text(raw: &str) -> String {
    raw.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn unescape_text(raw: &str) -> String {
    raw.replace("&quot;", "\"")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}
