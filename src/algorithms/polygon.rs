use crate::algorithms::{Algorithm, AlgorithmState, POLYGON_SUBDIVISION};
use crate::color;
use crate::geometry::{midpoint, Point};
use crate::scene::{Path, Scene};
use crate::snapshot::ConfigSnapshot;

/// A chain of nested shapes: every step copies the newest polygon, folds one
/// vertex onto an edge midpoint and darkens the fill by one decay step.
pub struct PolygonSubdivision;

impl Algorithm for PolygonSubdivision {
    fn id(&self) -> &'static str {
        POLYGON_SUBDIVISION
    }

    fn label(&self) -> &'static str {
        "Recursive polygon midpoint"
    }

    fn initialize(
        &self,
        scene: &mut Scene,
        snapshot: &ConfigSnapshot,
        rng: &mut fastrand::Rng,
    ) -> Box<dyn AlgorithmState> {
        let w = scene.size.width;
        let h = scene.size.height;
        let fill = if snapshot.random_color {
            color::random_hue(rng)
        } else {
            color::to_hsl_css(&snapshot.color)
        };
        let root = scene.add_path(
            Path::new(
                vec![
                    Point::new(0.0, 0.0),
                    Point::new(w, 0.0),
                    Point::new(w, h),
                    Point::new(0.0, h),
                ],
                true,
            )
            .with_fill(fill),
        );
        Box::new(PolygonState { root })
    }
}

struct PolygonState {
    root: usize,
}

impl AlgorithmState for PolygonState {
    fn step(&mut self, scene: &mut Scene, _iteration: u32, _frame_count: u64, rng: &mut fastrand::Rng) {
        let Some(last) = scene.last_path() else {
            return;
        };
        let child = make_child(last, rng);
        scene.add_path(child);
    }

    fn restyle_color(&mut self, scene: &mut Scene, color: &str) {
        if let Some(root) = scene.path_mut(self.root) {
            root.set_fill(Some(color::to_hsl_css(color)));
        }
    }
}

/// Copy of `parent` with one random vertex moved onto an adjacent edge
/// midpoint and its fill decayed. Vertex count is preserved.
pub fn make_child(parent: &Path, rng: &mut fastrand::Rng) -> Path {
    let mut child = parent.clone();
    let n = child.points.len();
    if n > 0 {
        let i = rng.usize(0..n);
        let toward_next = rng.bool();
        child.points[i] = subdivide_vertex(&child.points, i, toward_next);
    }
    child.fill = parent.fill.as_deref().map(|fill| color::decay(fill, rng));
    child.stroke = None;
    child
}

/// Midpoint of vertex `i` and its next neighbour, or of its previous
/// neighbour and itself. Indices wrap around the closed polygon.
pub fn subdivide_vertex(points: &[Point], i: usize, toward_next: bool) -> Point {
    let n = points.len();
    if toward_next {
        midpoint(points[i], points[(i + 1) % n])
    } else {
        midpoint(points[(i + n - 1) % n], points[i])
    }
}
