mod ascii;
mod svg;

pub use ascii::AsciiRenderer;
pub use svg::{path_data, SvgRenderer};

use crate::scene::Scene;
use std::io::Write;

pub trait Renderer {
    fn name(&self) -> &'static str;
    fn render(&mut self, scene: &Scene, out: &mut dyn Write) -> anyhow::Result<()>;
}

/// Renders into a string; renderers only ever emit UTF-8.
pub fn render_to_string(renderer: &mut dyn Renderer, scene: &Scene) -> anyhow::Result<String> {
    let mut buf = Vec::new();
    renderer.render(scene, &mut buf)?;
    Ok(String::from_utf8(buf)?)
}

pub(crate) fn write_fg_rgb(out: &mut dyn Write, r: u8, g: u8, b: u8) -> std::io::Result<()> {
    write!(out, "\x1b[38;2;{r};{g};{b}m")
}

/// Compact decimal form for markup: at most two decimals, no trailing zeros.
pub(crate) fn fmt_coord(v: f32) -> String {
    let v = if v.is_finite() { v } else { 0.0 };
    let s = format!("{v:.2}");
    let s = s.trim_end_matches('0').trim_end_matches('.');
    match s {
        "-0" | "" => "0".to_string(),
        _ => s.to_string(),
    }
}
