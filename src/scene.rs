use crate::geometry::{Point, Size};

pub const DEFAULT_BACKGROUND: &str = "#000000";

#[derive(Debug, Clone, PartialEq)]
pub struct Path {
    pub points: Vec<Point>,
    pub closed: bool,
    pub curved: bool,
    pub fill: Option<String>,
    pub stroke: Option<String>,
    pub stroke_width: f32,
}

impl Path {
    pub fn new(points: Vec<Point>, closed: bool) -> Self {
        Self {
            points,
            closed,
            curved: false,
            fill: None,
            stroke: None,
            stroke_width: 1.0,
        }
    }

    pub fn with_fill(mut self, fill: impl Into<String>) -> Self {
        self.fill = Some(fill.into());
        self
    }

    pub fn with_stroke(mut self, stroke: impl Into<String>, width: f32) -> Self {
        self.stroke = Some(stroke.into());
        self.stroke_width = width;
        self
    }

    pub fn with_curved(mut self, curved: bool) -> Self {
        self.curved = curved;
        self
    }

    pub fn set_fill(&mut self, fill: Option<String>) {
        self.fill = fill;
    }

    pub fn set_stroke(&mut self, stroke: Option<String>) {
        self.stroke = stroke;
    }

    pub fn set_stroke_width(&mut self, width: f32) {
        self.stroke_width = width;
    }

    pub fn push(&mut self, p: Point) {
        self.points.push(p);
    }

    pub fn replace_vertex(&mut self, idx: usize, p: Point) {
        if let Some(slot) = self.points.get_mut(idx) {
            *slot = p;
        }
    }

    pub fn last(&self) -> Option<Point> {
        self.points.last().copied()
    }

    /// Y-delta between the last two vertices, or 0 with fewer than two.
    pub fn velocity(&self) -> f32 {
        match self.points.as_slice() {
            [.., a, b] => b.y - a.y,
            _ => 0.0,
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Ordered draw list. Later paths draw on top.
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    /// Drawing area inside the margin.
    pub size: Size,
    /// Offset applied to the whole group when drawn.
    pub translation: Point,
    pub background: String,
    paths: Vec<Path>,
}

impl Scene {
    pub fn new(size: Size) -> Self {
        Self {
            size,
            translation: Point::default(),
            background: DEFAULT_BACKGROUND.to_string(),
            paths: Vec::new(),
        }
    }

    pub fn with_translation(mut self, translation: Point) -> Self {
        self.translation = translation;
        self
    }

    pub fn add_path(&mut self, path: Path) -> usize {
        self.paths.push(path);
        self.paths.len() - 1
    }

    pub fn clear(&mut self) {
        self.paths.clear();
    }

    pub fn paths(&self) -> &[Path] {
        &self.paths
    }

    pub fn paths_mut(&mut self) -> &mut [Path] {
        &mut self.paths
    }

    pub fn path(&self, idx: usize) -> Option<&Path> {
        self.paths.get(idx)
    }

    pub fn path_mut(&mut self, idx: usize) -> Option<&mut Path> {
        self.paths.get_mut(idx)
    }

    pub fn last_path(&self) -> Option<&Path> {
        self.paths.last()
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Canvas size including the margin on every side.
    pub fn canvas_size(&self) -> Size {
        Size::new(
            self.size.width + 2.0 * self.translation.x,
            self.size.height + 2.0 * self.translation.y,
        )
    }
}
