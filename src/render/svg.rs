use crate::geometry::Point;
use crate::render::{fmt_coord, Renderer};
use crate::scene::{Path, Scene};
use std::fmt::Write as _;
use std::io::Write;

/// Emits the scene as an SVG group: the inner markup of an `<svg>` element.
pub struct SvgRenderer;

impl SvgRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl Default for SvgRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer for SvgRenderer {
    fn name(&self) -> &'static str {
        "svg"
    }

    fn render(&mut self, scene: &Scene, out: &mut dyn Write) -> anyhow::Result<()> {
        writeln!(
            out,
            "<g transform=\"translate({} {})\">",
            fmt_coord(scene.translation.x),
            fmt_coord(scene.translation.y)
        )?;
        for path in scene.paths() {
            if path.is_empty() {
                continue;
            }
            writeln!(
                out,
                "<path d=\"{}\" fill=\"{}\" stroke=\"{}\" stroke-width=\"{}\"/>",
                path_data(path),
                escape_attr(path.fill.as_deref().unwrap_or("none")),
                escape_attr(path.stroke.as_deref().unwrap_or("none")),
                fmt_coord(path.stroke_width)
            )?;
        }
        writeln!(out, "</g>")?;
        Ok(())
    }
}

/// SVG `d` attribute. Curved paths go through every vertex as a Catmull-Rom
/// spline expressed with cubic segments.
pub fn path_data(path: &Path) -> String {
    let pts = &path.points;
    let mut d = String::new();
    let Some(first) = pts.first() else {
        return d;
    };
    let _ = write!(d, "M{} {}", fmt_coord(first.x), fmt_coord(first.y));

    if path.curved && pts.len() > 2 {
        let n = pts.len();
        let segments = if path.closed { n } else { n - 1 };
        let at = |i: isize| -> Point {
            if path.closed {
                pts[i.rem_euclid(n as isize) as usize]
            } else {
                pts[i.clamp(0, n as isize - 1) as usize]
            }
        };
        for s in 0..segments as isize {
            let p0 = at(s - 1);
            let p1 = at(s);
            let p2 = at(s + 1);
            let p3 = at(s + 2);
            let c1 = Point::new(p1.x + (p2.x - p0.x) / 6.0, p1.y + (p2.y - p0.y) / 6.0);
            let c2 = Point::new(p2.x - (p3.x - p1.x) / 6.0, p2.y - (p3.y - p1.y) / 6.0);
            let _ = write!(
                d,
                " C{} {} {} {} {} {}",
                fmt_coord(c1.x),
                fmt_coord(c1.y),
                fmt_coord(c2.x),
                fmt_coord(c2.y),
                fmt_coord(p2.x),
                fmt_coord(p2.y)
            );
        }
    } else {
        for p in &pts[1..] {
            let _ = write!(d, " L{} {}", fmt_coord(p.x), fmt_coord(p.y));
        }
    }

    if path.closed {
        d.push_str(" Z");
    }
    d
}

pub(crate) fn escape_attr(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
    out
}
