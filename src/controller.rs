use crate::algorithms::{AlgorithmState, Registry};
use crate::config::{Configuration, Field, Reaction};
use crate::error::ConfigError;
use crate::geometry::{fit_canvas, Point, Size};
use crate::scene::Scene;
use crate::snapshot::{snapshot, ConfigSnapshot};

/// Blank border around the drawing area, in canvas units.
pub const MARGIN: f32 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Idle,
    Running,
    Completed,
}

/// What a single frame callback did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    /// No run is active.
    Idle,
    /// Skipped by the throttle divisor; nothing was touched.
    Throttled,
    /// Ran the step for this iteration index.
    Stepped(u32),
    /// The iteration ceiling was reached on this frame.
    Completed,
    /// The run had already completed.
    Ignored,
}

struct RunState {
    algorithm: &'static str,
    iteration: u32,
    state: Box<dyn AlgorithmState>,
    snapshot: ConfigSnapshot,
    rng: fastrand::Rng,
}

/// Drives one generation run at a time from an external frame clock.
pub struct Controller {
    registry: Registry,
    container: Size,
    scene: Scene,
    run: Option<RunState>,
    status: RunStatus,
}

impl Controller {
    pub fn new(registry: Registry, container: Size) -> Self {
        Self {
            registry,
            container,
            scene: Scene::new(Size::default()).with_translation(Point::new(MARGIN, MARGIN)),
            run: None,
            status: RunStatus::Idle,
        }
    }

    pub fn status(&self) -> RunStatus {
        self.status
    }

    /// Steps taken in the current run.
    pub fn iteration(&self) -> u32 {
        self.run.as_ref().map_or(0, |r| r.iteration)
    }

    pub fn algorithm(&self) -> Option<&'static str> {
        self.run.as_ref().map(|r| r.algorithm)
    }

    pub fn snapshot(&self) -> Option<&ConfigSnapshot> {
        self.run.as_ref().map(|r| &r.snapshot)
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut Registry {
        &mut self.registry
    }

    pub fn container(&self) -> Size {
        self.container
    }

    /// Takes effect on the next run.
    pub fn set_container(&mut self, container: Size) {
        self.container = container;
    }

    /// Validates `live`, then replaces any current run with a fresh one.
    /// On error nothing changes and no run is started.
    pub fn start_run(&mut self, live: &Configuration) -> Result<(), ConfigError> {
        if let Err(err) = live.validate() {
            tracing::warn!(%err, "configuration rejected");
            return Err(err);
        }
        let algorithm = match self.registry.get(&live.algorithm) {
            Ok(a) => a,
            Err(err) => {
                tracing::warn!(%err, "configuration rejected");
                return Err(err);
            }
        };
        let canvas = fit_canvas(self.container, live.aspect_ratio);
        let drawing = Size::new(canvas.width - 2.0 * MARGIN, canvas.height - 2.0 * MARGIN);
        if !drawing.is_drawable() {
            let err = ConfigError::EmptyDrawingArea {
                width: drawing.width,
                height: drawing.height,
            };
            tracing::warn!(%err, "configuration rejected");
            return Err(err);
        }

        let snap = snapshot(live);
        let mut rng = match snap.seed {
            Some(seed) => fastrand::Rng::with_seed(seed),
            None => fastrand::Rng::new(),
        };

        self.run = None;
        self.scene.clear();
        self.scene.size = drawing;
        self.scene.background = snap.background.clone();
        let state = algorithm.initialize(&mut self.scene, &snap, &mut rng);

        tracing::info!(
            algorithm = algorithm.id(),
            iterations = snap.iterations,
            paths = self.scene.len(),
            width = drawing.width,
            height = drawing.height,
            "run started"
        );
        self.run = Some(RunState {
            algorithm: algorithm.id(),
            iteration: 0,
            state,
            snapshot: snap,
            rng,
        });
        self.status = RunStatus::Running;
        Ok(())
    }

    /// Drops the current run. The scene keeps what was drawn so far.
    pub fn reset(&mut self) {
        self.run = None;
        self.status = RunStatus::Idle;
    }

    pub fn on_frame(&mut self, frame_count: u64) -> FrameOutcome {
        let Some(run) = self.run.as_mut() else {
            return FrameOutcome::Idle;
        };
        if self.status == RunStatus::Completed {
            return FrameOutcome::Ignored;
        }

        let throttle = run.snapshot.throttle.max(1) as u64;
        if frame_count % throttle != 0 {
            return FrameOutcome::Throttled;
        }

        if run.iteration < run.snapshot.iterations {
            let iteration = run.iteration;
            run.state
                .step(&mut self.scene, iteration, frame_count, &mut run.rng);
            run.iteration += 1;
            tracing::debug!(iteration, frame_count, paths = self.scene.len(), "step");
            FrameOutcome::Stepped(iteration)
        } else {
            self.status = RunStatus::Completed;
            tracing::info!(
                algorithm = run.algorithm,
                iterations = run.iteration,
                paths = self.scene.len(),
                "run completed"
            );
            FrameOutcome::Completed
        }
    }

    /// Reacts to a committed live edit of `field`.
    pub fn handle_change(
        &mut self,
        field: Field,
        live: &Configuration,
    ) -> Result<Reaction, ConfigError> {
        let reaction = field.reaction();
        match reaction {
            Reaction::Rerun => self.start_run(live)?,
            Reaction::Restyle => {
                live.validate_field(field)?;
                self.restyle(field, live);
            }
            Reaction::Deferred => {}
        }
        Ok(reaction)
    }

    fn restyle(&mut self, field: Field, live: &Configuration) {
        match field {
            Field::Background => self.scene.background = live.background.clone(),
            Field::LineWidth => {
                for path in self.scene.paths_mut() {
                    if path.stroke.is_some() {
                        path.set_stroke_width(live.line_width);
                    }
                }
            }
            Field::Color => {
                if let Some(run) = self.run.as_mut() {
                    run.state.restyle_color(&mut self.scene, &live.color);
                }
            }
            Field::StrokeColor => {
                if let Some(run) = self.run.as_mut() {
                    run.state.restyle_stroke(&mut self.scene, &live.stroke_color);
                }
            }
            _ => {}
        }
    }
}
