use crate::color;
use crate::geometry::Point;
use crate::render::{write_fg_rgb, Renderer};
use crate::scene::{Path, Scene};
use std::io::Write;

/// Terminal preview: rasterizes the scene onto a character grid.
pub struct AsciiRenderer {
    cols: usize,
    rows: usize,
    ansi: bool,
    last_fg: Option<[u8; 3]>,
}

impl AsciiRenderer {
    pub fn new(cols: usize, rows: usize) -> Self {
        Self {
            cols,
            rows,
            ansi: true,
            last_fg: None,
        }
    }

    /// Plain characters only, no color escapes.
    pub fn plain(cols: usize, rows: usize) -> Self {
        Self {
            ansi: false,
            ..Self::new(cols, rows)
        }
    }
}

impl Renderer for AsciiRenderer {
    fn name(&self) -> &'static str {
        "ascii"
    }

    fn render(&mut self, scene: &Scene, out: &mut dyn Write) -> anyhow::Result<()> {
        if self.cols == 0 || self.rows == 0 {
            return Ok(());
        }
        let canvas = scene.canvas_size();
        if !canvas.is_drawable() {
            return Ok(());
        }

        let background = color::parse_rgb(&scene.background).unwrap_or([0, 0, 0]);
        let mut cells = vec![background; self.cols * self.rows];
        let raster = Raster {
            cols: self.cols,
            rows: self.rows,
            sx: self.cols as f32 / canvas.width,
            sy: self.rows as f32 / canvas.height,
            origin: scene.translation,
        };

        for path in scene.paths() {
            raster.draw(path, &mut cells);
        }

        // Dark -> bright ramp. Keep it ASCII-safe and compact.
        const RAMP: &[u8] = b" .,:;irsXA253hMHGS#9B&@";

        self.last_fg = None;
        for y in 0..self.rows {
            for x in 0..self.cols {
                let rgb = cells[y * self.cols + x];
                let l = color::luma(rgb) as usize;
                let ch = RAMP[l * (RAMP.len() - 1) / 255];
                if self.ansi && self.last_fg != Some(rgb) {
                    write_fg_rgb(out, rgb[0], rgb[1], rgb[2])?;
                    self.last_fg = Some(rgb);
                }
                out.write_all(&[ch])?;
            }
            if self.ansi {
                out.write_all(b"\x1b[0m")?;
                self.last_fg = None;
            }
            out.write_all(b"\n")?;
        }
        Ok(())
    }
}

struct Raster {
    cols: usize,
    rows: usize,
    sx: f32,
    sy: f32,
    origin: Point,
}

impl Raster {
    fn to_cell(&self, p: Point) -> (f32, f32) {
        ((p.x + self.origin.x) * self.sx, (p.y + self.origin.y) * self.sy)
    }

    fn draw(&self, path: &Path, cells: &mut [[u8; 3]]) {
        let pts: Vec<(f32, f32)> = path.points.iter().map(|p| self.to_cell(*p)).collect();
        if pts.is_empty() {
            return;
        }

        if path.closed && pts.len() >= 3 {
            if let Some(fill) = path.fill.as_deref().and_then(|f| color::parse_rgb(f).ok()) {
                self.fill_polygon(&pts, fill, cells);
            }
        }

        if let Some(stroke) = path.stroke.as_deref().and_then(|s| color::parse_rgb(s).ok()) {
            for pair in pts.windows(2) {
                self.line(pair[0], pair[1], stroke, cells);
            }
            if path.closed && pts.len() > 2 {
                self.line(pts[pts.len() - 1], pts[0], stroke, cells);
            }
        }
    }

    fn fill_polygon(&self, pts: &[(f32, f32)], rgb: [u8; 3], cells: &mut [[u8; 3]]) {
        let (min_x, max_x, min_y, max_y) = pts.iter().fold(
            (f32::MAX, f32::MIN, f32::MAX, f32::MIN),
            |(a, b, c, d), &(x, y)| (a.min(x), b.max(x), c.min(y), d.max(y)),
        );
        let x0 = min_x.floor().max(0.0) as usize;
        let y0 = min_y.floor().max(0.0) as usize;
        let x1 = (max_x.ceil().max(0.0) as usize).min(self.cols);
        let y1 = (max_y.ceil().max(0.0) as usize).min(self.rows);
        for y in y0..y1 {
            for x in x0..x1 {
                if point_in_polygon(x as f32 + 0.5, y as f32 + 0.5, pts) {
                    cells[y * self.cols + x] = rgb;
                }
            }
        }
    }

    fn line(&self, a: (f32, f32), b: (f32, f32), rgb: [u8; 3], cells: &mut [[u8; 3]]) {
        let steps = ((b.0 - a.0).abs().max((b.1 - a.1).abs()) * 2.0).ceil().max(1.0) as usize;
        for i in 0..=steps {
            let t = i as f32 / steps as f32;
            let x = a.0 + (b.0 - a.0) * t;
            let y = a.1 + (b.1 - a.1) * t;
            if x < 0.0 || y < 0.0 {
                continue;
            }
            let (cx, cy) = (x as usize, y as usize);
            if cx < self.cols && cy < self.rows {
                cells[cy * self.cols + cx] = rgb;
            }
        }
    }
}

fn point_in_polygon(x: f32, y: f32, pts: &[(f32, f32)]) -> bool {
    let mut inside = false;
    let mut j = pts.len() - 1;
    for i in 0..pts.len() {
        let (xi, yi) = pts[i];
        let (xj, yj) = pts[j];
        if (yi > y) != (yj > y) && x < (xj - xi) * (y - yi) / (yj - yi) + xi {
            inside = !inside;
        }
        j = i;
    }
    inside
}
