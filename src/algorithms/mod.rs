mod grid;
mod line_field;
mod polygon;

pub use grid::{GridTriangulation, TriangleGrid};
pub use line_field::{line_weight, sibling_term, LineField};
pub use polygon::{make_child, subdivide_vertex, PolygonSubdivision};

use crate::error::ConfigError;
use crate::scene::Scene;
use crate::snapshot::ConfigSnapshot;

pub const LINE_FIELD: &str = "line-field";
pub const POLYGON_SUBDIVISION: &str = "polygon-subdivision";
pub const GRID_TRIANGULATION: &str = "grid-triangulation";

/// A generator: seeds a scene once, then hands back the state that steps it.
pub trait Algorithm {
    fn id(&self) -> &'static str;
    fn label(&self) -> &'static str;

    /// Populates `scene` with at least one path.
    fn initialize(
        &self,
        scene: &mut Scene,
        snapshot: &ConfigSnapshot,
        rng: &mut fastrand::Rng,
    ) -> Box<dyn AlgorithmState>;
}

/// Private per-run state. `step` runs once per accepted iteration and never
/// decides whether the run continues.
pub trait AlgorithmState {
    fn step(&mut self, scene: &mut Scene, iteration: u32, frame_count: u64, rng: &mut fastrand::Rng);

    /// Live restyle of the run's primary color without re-running.
    fn restyle_color(&mut self, _scene: &mut Scene, _color: &str) {}

    /// Live restyle of stroke color. Paths drawn without a stroke keep none.
    fn restyle_stroke(&mut self, scene: &mut Scene, color: &str) {
        for path in scene.paths_mut() {
            if path.stroke.is_some() {
                path.set_stroke(Some(color.to_string()));
            }
        }
    }
}

pub struct Registry {
    algorithms: Vec<Box<dyn Algorithm>>,
}

impl Registry {
    pub fn empty() -> Self {
        Self {
            algorithms: Vec::new(),
        }
    }

    pub fn builtin() -> Self {
        let mut r = Self::empty();
        r.register(Box::new(LineField));
        r.register(Box::new(PolygonSubdivision));
        r.register(Box::new(GridTriangulation));
        r
    }

    /// Adds an algorithm; an existing entry with the same id is replaced.
    pub fn register(&mut self, algorithm: Box<dyn Algorithm>) {
        let key = normalize_id(algorithm.id());
        if let Some(slot) = self
            .algorithms
            .iter_mut()
            .find(|a| normalize_id(a.id()) == key)
        {
            *slot = algorithm;
        } else {
            self.algorithms.push(algorithm);
        }
    }

    /// Case, `-` and `_` insensitive, so `lineField` finds `line-field`.
    pub fn get(&self, id: &str) -> Result<&dyn Algorithm, ConfigError> {
        let key = normalize_id(id);
        self.algorithms
            .iter()
            .find(|a| normalize_id(a.id()) == key)
            .map(|a| a.as_ref())
            .ok_or_else(|| ConfigError::UnknownAlgorithm(id.to_string()))
    }

    pub fn ids(&self) -> Vec<&'static str> {
        self.algorithms.iter().map(|a| a.id()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn Algorithm> {
        self.algorithms.iter().map(|a| a.as_ref())
    }

    pub fn len(&self) -> usize {
        self.algorithms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.algorithms.is_empty()
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::builtin()
    }
}

fn normalize_id(id: &str) -> String {
    id.trim()
        .chars()
        .filter(|c| *c != '-' && *c != '_')
        .map(|c| c.to_ascii_lowercase())
        .collect()
}
