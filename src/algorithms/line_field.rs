use crate::algorithms::{Algorithm, AlgorithmState, LINE_FIELD};
use crate::color;
use crate::config::CouplingMode;
use crate::geometry::Point;
use crate::scene::{Path, Scene};
use crate::snapshot::ConfigSnapshot;

/// Parallel polylines that grow one vertex per step, each pulled by its own
/// momentum and by its neighbour's last move.
pub struct LineField;

impl Algorithm for LineField {
    fn id(&self) -> &'static str {
        LINE_FIELD
    }

    fn label(&self) -> &'static str {
        "Coupled line field"
    }

    fn initialize(
        &self,
        scene: &mut Scene,
        snapshot: &ConfigSnapshot,
        rng: &mut fastrand::Rng,
    ) -> Box<dyn AlgorithmState> {
        let size = scene.size;
        let count = snapshot.line_count.max(1) as usize;
        let delta_y = size.height / count as f32;
        let first = scene.len();

        for i in 0..count {
            let y = if snapshot.random_start {
                rng.f32() * size.height
            } else {
                i as f32 * delta_y
            };
            let stroke = if snapshot.random_color {
                color::random_rgb(rng)
            } else {
                snapshot.color.clone()
            };
            scene.add_path(
                Path::new(vec![Point::new(0.0, y)], false)
                    .with_stroke(stroke, snapshot.line_width)
                    .with_curved(snapshot.curved),
            );
        }

        Box::new(LineFieldState {
            first,
            count,
            step_x: size.width / snapshot.iterations.max(1) as f32,
            sib_weight: snapshot.sib_weight,
            slope_weight: snapshot.slope_weight,
            line_change: snapshot.line_change,
            coupling: snapshot.coupling,
            random_color: snapshot.random_color,
        })
    }
}

struct LineFieldState {
    first: usize,
    count: usize,
    step_x: f32,
    sib_weight: f32,
    slope_weight: f32,
    line_change: f32,
    coupling: CouplingMode,
    random_color: bool,
}

impl AlgorithmState for LineFieldState {
    fn step(&mut self, scene: &mut Scene, iteration: u32, _frame_count: u64, rng: &mut fastrand::Rng) {
        let end = (self.first + self.count).min(scene.len());
        let Some(lines) = scene.paths_mut().get_mut(self.first..end) else {
            return;
        };

        // Neighbours are read as they were before this step moved anything.
        let velocities: Vec<f32> = lines.iter().map(Path::velocity).collect();
        let last_ys: Vec<f32> = lines
            .iter()
            .map(|l| l.last().map_or(0.0, |p| p.y))
            .collect();

        let x = iteration as f32 * self.step_x;
        for (i, line) in lines.iter_mut().enumerate() {
            let weight = line_weight(
                self.coupling,
                i,
                &velocities,
                &last_ys,
                line.len(),
                self.sib_weight,
                self.slope_weight,
            );
            let noise = (rng.f32() * 2.0 - 1.0) * self.line_change;
            line.push(Point::new(x, last_ys[i] + noise + weight));
        }
    }

    fn restyle_color(&mut self, scene: &mut Scene, color: &str) {
        if self.random_color {
            return;
        }
        let end = (self.first + self.count).min(scene.len());
        if let Some(lines) = scene.paths_mut().get_mut(self.first..end) {
            for line in lines {
                line.set_stroke(Some(color.to_string()));
            }
        }
    }

    // Line strokes follow `color`; `stroke_color` has nothing to draw here.
    fn restyle_stroke(&mut self, _scene: &mut Scene, _color: &str) {}
}

/// Unweighted neighbour pull on line `i`.
///
/// Any line after the first follows its predecessor. The first line is pushed
/// away from its successor, and a lone line has no neighbour term at all.
pub fn sibling_term(mode: CouplingMode, i: usize, velocities: &[f32], last_ys: &[f32]) -> f32 {
    let n = velocities.len();
    let influence = |j: usize| match mode {
        CouplingMode::Velocity => velocities[j],
        CouplingMode::Position => last_ys[j] - last_ys[i],
    };
    if i > 0 {
        influence(i - 1)
    } else if i + 1 < n {
        -influence(i + 1)
    } else {
        0.0
    }
}

pub fn line_weight(
    mode: CouplingMode,
    i: usize,
    velocities: &[f32],
    last_ys: &[f32],
    own_len: usize,
    sib_weight: f32,
    slope_weight: f32,
) -> f32 {
    let mut weight = sib_weight * sibling_term(mode, i, velocities, last_ys);
    if own_len >= 2 {
        weight += slope_weight * velocities[i];
    }
    weight
}
