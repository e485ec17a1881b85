use std::cell::Cell;
use std::rc::Rc;
use std::sync::mpsc;

use line_art::algorithms::{Algorithm, AlgorithmState, Registry};
use line_art::app::{drive, ScriptedEdit};
use line_art::config::{Configuration, Field, Reaction};
use line_art::controller::{Controller, FrameOutcome, RunStatus};
use line_art::error::ConfigError;
use line_art::geometry::{Point, Size};
use line_art::live_config::LiveConfig;
use line_art::scene::{Path, Scene};
use line_art::snapshot::ConfigSnapshot;

struct Counting {
    steps: Rc<Cell<u32>>,
}

struct CountingState {
    steps: Rc<Cell<u32>>,
}

impl Algorithm for Counting {
    fn id(&self) -> &'static str {
        "counting"
    }

    fn label(&self) -> &'static str {
        "Counting"
    }

    fn initialize(
        &self,
        scene: &mut Scene,
        _snapshot: &ConfigSnapshot,
        _rng: &mut fastrand::Rng,
    ) -> Box<dyn AlgorithmState> {
        scene.add_path(Path::new(vec![Point::new(0.0, 0.0)], false));
        Box::new(CountingState {
            steps: self.steps.clone(),
        })
    }
}

impl AlgorithmState for CountingState {
    fn step(&mut self, scene: &mut Scene, iteration: u32, _frame_count: u64, _rng: &mut fastrand::Rng) {
        self.steps.set(self.steps.get() + 1);
        if let Some(path) = scene.path_mut(0) {
            path.push(Point::new(iteration as f32, 0.0));
        }
    }
}

fn container() -> Size {
    Size::new(1200.0, 900.0)
}

fn counting_controller() -> (Controller, Rc<Cell<u32>>) {
    let steps = Rc::new(Cell::new(0));
    let mut registry = Registry::builtin();
    registry.register(Box::new(Counting {
        steps: steps.clone(),
    }));
    (Controller::new(registry, container()), steps)
}

fn counting_config(iterations: u32) -> Configuration {
    Configuration {
        algorithm: "counting".to_string(),
        iterations,
        seed: Some(1),
        ..Configuration::default()
    }
}

#[test]
fn run_steps_exactly_iterations_times_then_completes() {
    for k in [1u32, 5, 17] {
        let (mut controller, steps) = counting_controller();
        controller.start_run(&counting_config(k)).expect("run should start");
        assert_eq!(controller.status(), RunStatus::Running);

        for frame in 1..=k as u64 {
            assert_eq!(controller.on_frame(frame), FrameOutcome::Stepped(frame as u32 - 1));
        }
        assert_eq!(controller.status(), RunStatus::Running);
        assert_eq!(controller.on_frame(k as u64 + 1), FrameOutcome::Completed);
        assert_eq!(controller.status(), RunStatus::Completed);
        assert_eq!(steps.get(), k);

        let before = controller.scene().clone();
        for frame in k as u64 + 2..k as u64 + 40 {
            assert_eq!(controller.on_frame(frame), FrameOutcome::Ignored);
        }
        assert_eq!(steps.get(), k);
        assert_eq!(controller.scene(), &before);
        assert_eq!(controller.status(), RunStatus::Completed);
    }
}

#[test]
fn throttled_frames_do_not_touch_the_scene() {
    let (mut controller, steps) = counting_controller();
    let cfg = Configuration {
        throttle: 3,
        ..counting_config(4)
    };
    controller.start_run(&cfg).expect("run should start");

    let initial = controller.scene().clone();
    assert_eq!(controller.on_frame(1), FrameOutcome::Throttled);
    assert_eq!(controller.on_frame(2), FrameOutcome::Throttled);
    assert_eq!(controller.scene(), &initial);

    let mut stepped_frames = Vec::new();
    for frame in 3..=30u64 {
        match controller.on_frame(frame) {
            FrameOutcome::Stepped(_) => stepped_frames.push(frame),
            FrameOutcome::Completed => {
                assert_eq!(frame, 15);
            }
            _ => {}
        }
    }
    assert_eq!(stepped_frames, vec![3, 6, 9, 12]);
    assert_eq!(steps.get(), 4);
}

#[test]
fn live_edits_do_not_reach_the_running_snapshot() {
    let (mut controller, steps) = counting_controller();
    let mut live = LiveConfig::new(counting_config(5));
    controller.start_run(live.config()).expect("run should start");

    controller.on_frame(1);
    controller.on_frame(2);
    live.set("iterations", "50").expect("edit should be accepted");
    live.set("throttle", "7").expect("edit should be accepted");

    for frame in 3..200u64 {
        controller.on_frame(frame);
    }
    assert_eq!(steps.get(), 5);
    assert_eq!(controller.iteration(), 5);
    assert_eq!(controller.status(), RunStatus::Completed);
    let snap = controller.snapshot().expect("snapshot should exist");
    assert_eq!(snap.iterations, 5);
    assert_eq!(snap.throttle, 1);
    assert_eq!(live.config().iterations, 50);
}

#[test]
fn unknown_algorithm_is_rejected_before_starting() {
    let mut controller = Controller::new(Registry::builtin(), container());
    let cfg = Configuration {
        algorithm: "spirograph".to_string(),
        ..Configuration::default()
    };
    let err = controller.start_run(&cfg).expect_err("unknown id must fail");
    assert!(matches!(err, ConfigError::UnknownAlgorithm(ref id) if id == "spirograph"));
    assert_eq!(controller.status(), RunStatus::Idle);
    assert!(controller.scene().is_empty());
    assert_eq!(controller.on_frame(1), FrameOutcome::Idle);
}

#[test]
fn rejected_configuration_keeps_the_previous_run() {
    let (mut controller, _steps) = counting_controller();
    controller.start_run(&counting_config(3)).expect("run should start");
    controller.on_frame(1);

    let bad = Configuration {
        sib_weight: 4.0,
        ..counting_config(3)
    };
    let err = controller.start_run(&bad).expect_err("out of range must fail");
    assert!(matches!(err, ConfigError::OutOfRange { field: "sib_weight", .. }));
    assert_eq!(controller.status(), RunStatus::Running);
    assert_eq!(controller.iteration(), 1);
    assert_eq!(controller.algorithm(), Some("counting"));
}

#[test]
fn container_smaller_than_margins_is_rejected() {
    let mut controller = Controller::new(Registry::builtin(), Size::new(150.0, 150.0));
    let err = controller
        .start_run(&Configuration::default())
        .expect_err("no room to draw");
    assert!(matches!(err, ConfigError::EmptyDrawingArea { .. }));
}

#[test]
fn reset_discards_the_run() {
    let (mut controller, steps) = counting_controller();
    controller.start_run(&counting_config(10)).expect("run should start");
    controller.on_frame(1);
    controller.reset();

    assert_eq!(controller.status(), RunStatus::Idle);
    assert!(controller.snapshot().is_none());
    assert_eq!(controller.on_frame(2), FrameOutcome::Idle);
    assert_eq!(steps.get(), 1);

    controller.start_run(&counting_config(2)).expect("run should restart");
    assert_eq!(controller.iteration(), 0);
    assert_eq!(controller.scene().len(), 1);
}

#[test]
fn new_run_replaces_scene_contents() {
    let mut controller = Controller::new(Registry::builtin(), container());
    let polygons = Configuration {
        algorithm: "polygon-subdivision".to_string(),
        iterations: 6,
        seed: Some(2),
        ..Configuration::default()
    };
    controller.start_run(&polygons).expect("run should start");
    for frame in 1..=10 {
        controller.on_frame(frame);
    }
    assert_eq!(controller.scene().len(), 7);

    let lines = Configuration {
        line_count: 4,
        seed: Some(2),
        ..Configuration::default()
    };
    controller.start_run(&lines).expect("run should restart");
    assert_eq!(controller.scene().len(), 4);
    assert_eq!(controller.algorithm(), Some("line-field"));
}

#[test]
fn rerun_fields_restart_and_restyle_fields_do_not() {
    let mut controller = Controller::new(Registry::builtin(), container());
    let mut live = LiveConfig::new(Configuration {
        algorithm: "polygon-subdivision".to_string(),
        iterations: 20,
        seed: Some(4),
        ..Configuration::default()
    });
    controller.start_run(live.config()).expect("run should start");
    for frame in 1..=3 {
        controller.on_frame(frame);
    }

    live.set("color", "#ff0000").expect("color edit");
    let reaction = controller
        .handle_change(Field::Color, live.config())
        .expect("restyle should apply");
    assert_eq!(reaction, Reaction::Restyle);
    assert_eq!(controller.iteration(), 3);
    assert_eq!(
        controller.scene().path(0).and_then(|p| p.fill.as_deref()),
        Some("hsl(0,100%,50%)")
    );

    live.set("background", "#123456").expect("background edit");
    controller
        .handle_change(Field::Background, live.config())
        .expect("restyle should apply");
    assert_eq!(controller.scene().background, "#123456");
    assert_eq!(controller.iteration(), 3);

    live.set("iterations", "8").expect("iterations edit");
    let reaction = controller
        .handle_change(Field::Iterations, live.config())
        .expect("rerun should start");
    assert_eq!(reaction, Reaction::Rerun);
    assert_eq!(controller.iteration(), 0);
    assert_eq!(controller.scene().len(), 1);
    assert_eq!(controller.snapshot().map(|s| s.iterations), Some(8));
}

#[test]
fn line_width_restyle_updates_every_stroke() {
    let mut controller = Controller::new(Registry::builtin(), container());
    let mut live = LiveConfig::new(Configuration {
        line_count: 5,
        seed: Some(8),
        ..Configuration::default()
    });
    controller.start_run(live.config()).expect("run should start");
    controller.on_frame(1);

    live.set("line_width", "3.5").expect("width edit");
    controller
        .handle_change(Field::LineWidth, live.config())
        .expect("restyle should apply");
    assert!(
        controller
            .scene()
            .paths()
            .iter()
            .all(|p| (p.stroke_width - 3.5).abs() < 1e-6)
    );
    assert_eq!(controller.iteration(), 1);
}

#[test]
fn failed_rerun_leaves_current_run_running() {
    let mut controller = Controller::new(Registry::builtin(), container());
    let mut live = LiveConfig::new(Configuration {
        seed: Some(5),
        ..Configuration::default()
    });
    controller.start_run(live.config()).expect("run should start");
    controller.on_frame(1);

    live.set("algorithm", "voronoi").expect("any non-empty id is accepted live");
    let err = controller
        .handle_change(Field::Algorithm, live.config())
        .expect_err("unknown id must not start");
    assert!(matches!(err, ConfigError::UnknownAlgorithm(_)));
    assert_eq!(controller.status(), RunStatus::Running);
    assert_eq!(controller.algorithm(), Some("line-field"));
    assert_eq!(controller.iteration(), 1);
}

#[test]
fn frame_clock_applies_scripted_edits_through_subscriptions() {
    let mut controller = Controller::new(Registry::builtin(), container());
    let mut live = LiveConfig::new(Configuration {
        line_count: 2,
        iterations: 6,
        seed: Some(1),
        ..Configuration::default()
    });
    let (tx, rx) = mpsc::channel();
    live.on_any_change(move |field, _| {
        let _ = tx.send(field);
    });
    controller.start_run(live.config()).expect("run should start");

    let edits = vec![
        ScriptedEdit::parse("3:background=#202020").expect("edit parses"),
        ScriptedEdit::parse("4:iterations=3").expect("edit parses"),
    ];
    let summary = drive(&mut controller, &mut live, &rx, &edits, 0);

    assert_eq!(summary.iterations, 3);
    assert_eq!(summary.frames, 7);
    assert_eq!(controller.status(), RunStatus::Completed);
    assert_eq!(controller.scene().background, "#202020");
    assert!(controller.scene().paths().iter().all(|p| p.len() == 4));
}

fn strokes(controller: &Controller) -> Vec<Option<String>> {
    controller.scene().paths().iter().map(|p| p.stroke.clone()).collect()
}

fn fills(controller: &Controller) -> Vec<Option<String>> {
    controller.scene().paths().iter().map(|p| p.fill.clone()).collect()
}

#[test]
fn stroke_color_edit_leaves_line_strokes_alone() {
    for random_color in [false, true] {
        let mut controller = Controller::new(Registry::builtin(), container());
        let mut live = LiveConfig::new(Configuration {
            line_count: 3,
            iterations: 4,
            random_color,
            seed: Some(1),
            ..Configuration::default()
        });
        controller.start_run(live.config()).expect("run should start");
        controller.on_frame(1);
        controller.on_frame(2);
        let before = strokes(&controller);

        live.set("stroke_color", "#00ff00").expect("stroke edit");
        let reaction = controller
            .handle_change(Field::StrokeColor, live.config())
            .expect("restyle should apply");
        assert_eq!(reaction, Reaction::Restyle);
        assert_eq!(strokes(&controller), before, "random_color = {random_color}");

        let mut rerun = Controller::new(Registry::builtin(), container());
        rerun.start_run(live.config()).expect("rerun should start");
        assert_eq!(strokes(&rerun), before, "random_color = {random_color}");
    }
}

#[test]
fn color_edit_keeps_random_grid_palette() {
    let mut controller = Controller::new(Registry::builtin(), container());
    let mut live = LiveConfig::new(Configuration {
        algorithm: "grid-triangulation".to_string(),
        rows: 4,
        iterations: 3,
        random_color: true,
        seed: Some(3),
        ..Configuration::default()
    });
    controller.start_run(live.config()).expect("run should start");
    controller.on_frame(1);
    let before = fills(&controller);

    live.set("color", "#ff0000").expect("color edit");
    controller
        .handle_change(Field::Color, live.config())
        .expect("restyle should apply");
    assert_eq!(fills(&controller), before);

    let mut rerun = Controller::new(Registry::builtin(), container());
    rerun.start_run(live.config()).expect("rerun should start");
    assert_eq!(fills(&rerun), before);
}

#[test]
fn color_edit_recolors_grid_without_random_palette() {
    let mut controller = Controller::new(Registry::builtin(), container());
    let mut live = LiveConfig::new(Configuration {
        algorithm: "grid-triangulation".to_string(),
        rows: 4,
        iterations: 3,
        seed: Some(3),
        ..Configuration::default()
    });
    controller.start_run(live.config()).expect("run should start");
    live.set("color", "#ff0000").expect("color edit");
    controller
        .handle_change(Field::Color, live.config())
        .expect("restyle should apply");

    let mut rerun = Controller::new(Registry::builtin(), container());
    rerun.start_run(live.config()).expect("rerun should start");
    assert_eq!(fills(&controller), fills(&rerun));
}
