use crate::algorithms::{Algorithm, AlgorithmState, GRID_TRIANGULATION};
use crate::color;
use crate::geometry::{centroid, Point, Size};
use crate::scene::{Path, Scene};
use crate::snapshot::ConfigSnapshot;

const SHADE_HUE_SHIFT: f32 = 40.0;
const SHADE_LIGHTNESS_DROP: f32 = 30.0;

/// Point arena plus triangles that index into it.
///
/// Neighbouring triangles name the same point indices, so moving one point
/// deforms every triangle that touches it.
#[derive(Debug, Clone, PartialEq)]
pub struct TriangleGrid {
    pub rows: usize,
    pub cols: usize,
    pub points: Vec<Point>,
    pub triangles: Vec<[usize; 3]>,
}

impl TriangleGrid {
    pub fn new(rows: usize, cols: usize, size: Size) -> Self {
        let rows = rows.max(2);
        let cols = cols.max(2);
        let dx = size.width / (cols - 1) as f32;
        let dy = size.height / (rows - 1) as f32;

        let mut points = Vec::with_capacity(rows * cols);
        for r in 0..rows {
            for c in 0..cols {
                points.push(Point::new(c as f32 * dx, r as f32 * dy));
            }
        }

        let mut triangles = Vec::with_capacity(2 * (rows - 1) * (cols - 1));
        for r in 0..rows - 1 {
            for c in 0..cols - 1 {
                let tl = r * cols + c;
                let tr = tl + 1;
                let bl = tl + cols;
                let br = bl + 1;
                // Both halves share the tl-br diagonal.
                triangles.push([tl, tr, br]);
                triangles.push([tl, br, bl]);
            }
        }

        Self {
            rows,
            cols,
            points,
            triangles,
        }
    }

    pub fn index(&self, row: usize, col: usize) -> usize {
        row * self.cols + col
    }

    pub fn point(&self, row: usize, col: usize) -> Point {
        self.points[self.index(row, col)]
    }

    pub fn triangle_points(&self, t: usize) -> [Point; 3] {
        let [a, b, c] = self.triangles[t];
        [self.points[a], self.points[b], self.points[c]]
    }

    /// Moves every point by an independent offset in `[-amount, amount)` on
    /// each axis.
    pub fn jitter(&mut self, amount: f32, rng: &mut fastrand::Rng) {
        for p in &mut self.points {
            let dx = (rng.f32() * 2.0 - 1.0) * amount;
            let dy = (rng.f32() * 2.0 - 1.0) * amount;
            *p = p.offset(dx, dy);
        }
    }
}

pub struct GridTriangulation;

impl Algorithm for GridTriangulation {
    fn id(&self) -> &'static str {
        GRID_TRIANGULATION
    }

    fn label(&self) -> &'static str {
        "Perturbed grid triangulation"
    }

    fn initialize(
        &self,
        scene: &mut Scene,
        snapshot: &ConfigSnapshot,
        rng: &mut fastrand::Rng,
    ) -> Box<dyn AlgorithmState> {
        let rows = snapshot.rows.max(2) as usize;
        let cols = snapshot.grid_columns() as usize;
        let grid = TriangleGrid::new(rows, cols, scene.size);

        let base = if snapshot.random_color {
            color::random_hue(rng)
        } else {
            snapshot.color.clone()
        };
        let diag = scene.size.diagonal_sq().max(f32::EPSILON);
        let ratios: Vec<f32> = (0..grid.triangles.len())
            .map(|t| {
                let c = centroid(&grid.triangle_points(t));
                (c.distance_sq(Point::default()) / diag).clamp(0.0, 1.0)
            })
            .collect();

        let state = GridState {
            grid,
            first: scene.len(),
            ratios,
            jitter: snapshot.line_change,
            show_stroke: snapshot.show_stroke,
            stroke_color: snapshot.stroke_color.clone(),
            random_color: snapshot.random_color,
        };
        let shaded = shade(&base);
        for t in 0..state.grid.triangles.len() {
            let fill = state.fill_for(&base, &shaded, t);
            let stroke = state.stroke_for(&fill);
            scene.add_path(
                Path::new(state.grid.triangle_points(t).to_vec(), true)
                    .with_fill(fill)
                    .with_stroke(stroke, snapshot.line_width),
            );
        }
        Box::new(state)
    }
}

struct GridState {
    grid: TriangleGrid,
    first: usize,
    ratios: Vec<f32>,
    jitter: f32,
    show_stroke: bool,
    stroke_color: String,
    random_color: bool,
}

impl GridState {
    fn fill_for(&self, base: &str, shaded: &str, t: usize) -> String {
        color::interpolate(base, shaded, self.ratios[t])
    }

    fn stroke_for(&self, fill: &str) -> String {
        if self.show_stroke {
            self.stroke_color.clone()
        } else {
            fill.to_string()
        }
    }

    fn sync(&self, scene: &mut Scene) {
        for t in 0..self.grid.triangles.len() {
            let pts = self.grid.triangle_points(t);
            if let Some(path) = scene.path_mut(self.first + t) {
                path.points.clear();
                path.points.extend_from_slice(&pts);
            }
        }
    }
}

impl AlgorithmState for GridState {
    fn step(&mut self, scene: &mut Scene, _iteration: u32, _frame_count: u64, rng: &mut fastrand::Rng) {
        self.grid.jitter(self.jitter, rng);
        self.sync(scene);
    }

    fn restyle_color(&mut self, scene: &mut Scene, color: &str) {
        if self.random_color {
            return;
        }
        let shaded = shade(color);
        for t in 0..self.grid.triangles.len() {
            let fill = self.fill_for(color, &shaded, t);
            let stroke = self.stroke_for(&fill);
            if let Some(path) = scene.path_mut(self.first + t) {
                path.set_fill(Some(fill));
                path.set_stroke(Some(stroke));
            }
        }
    }

    fn restyle_stroke(&mut self, scene: &mut Scene, color: &str) {
        self.stroke_color = color.to_string();
        if !self.show_stroke {
            return;
        }
        for t in 0..self.grid.triangles.len() {
            if let Some(path) = scene.path_mut(self.first + t) {
                path.set_stroke(Some(color.to_string()));
            }
        }
    }
}

fn shade(base: &str) -> String {
    color::shade(base, SHADE_HUE_SHIFT, SHADE_LIGHTNESS_DROP)
}
