use crate::algorithms::Registry;
use crate::config::{Cli, Field};
use crate::controller::{Controller, FrameOutcome, RunStatus};
use crate::error::ConfigError;
use crate::export::{write_svg, ExportOptions};
use crate::geometry::Size;
use crate::live_config::LiveConfig;
use crate::render::{AsciiRenderer, Renderer};
use anyhow::Context;
use std::io::{BufWriter, Write};
use std::sync::mpsc;
use std::time::{Duration, Instant};

/// A control-panel edit replayed at a given frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptedEdit {
    pub frame: u64,
    pub key: String,
    pub value: String,
}

impl ScriptedEdit {
    /// Parses `FRAME:KEY=VALUE`. Frames count from 1.
    pub fn parse(raw: &str) -> Result<Self, ConfigError> {
        let bad = || ConfigError::InvalidValue {
            field: "edit",
            value: raw.to_string(),
        };
        let (frame, assignment) = raw.split_once(':').ok_or_else(bad)?;
        let frame = frame
            .trim()
            .parse::<u64>()
            .ok()
            .filter(|f| *f > 0)
            .ok_or_else(bad)?;
        let (key, value) = assignment.split_once('=').ok_or_else(bad)?;
        if key.trim().is_empty() {
            return Err(bad());
        }
        Ok(Self {
            frame,
            key: key.trim().to_string(),
            value: value.trim().to_string(),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub frames: u64,
    pub iterations: u32,
    pub paths: usize,
}

pub fn run(cli: Cli) -> anyhow::Result<()> {
    crate::logging::init(&cli.log_level);

    let registry = Registry::builtin();
    if cli.list_algorithms {
        for algorithm in registry.iter() {
            println!("{:<22} {}", algorithm.id(), algorithm.label());
        }
        return Ok(());
    }

    let config = cli.resolve_config().context("load configuration")?;
    let edits = cli
        .edits
        .iter()
        .map(|raw| ScriptedEdit::parse(raw))
        .collect::<Result<Vec<_>, _>>()
        .context("parse --edit")?;

    let mut live = LiveConfig::new(config);
    let (tx, rx) = mpsc::channel::<Field>();
    live.on_any_change(move |field, _| {
        let _ = tx.send(field);
    });

    let mut controller = Controller::new(registry, Size::new(cli.width, cli.height));
    controller
        .start_run(live.config())
        .context("start run")?;

    let summary = drive(&mut controller, &mut live, &rx, &edits, cli.fps);
    tracing::info!(
        frames = summary.frames,
        iterations = summary.iterations,
        paths = summary.paths,
        "frame clock stopped"
    );

    let snapshot = controller
        .snapshot()
        .context("no run to export")?;
    write_svg(&cli.out, controller.scene(), snapshot, &ExportOptions::default())
        .with_context(|| format!("export {}", cli.out.display()))?;
    tracing::info!(path = %cli.out.display(), "exported svg");

    if cli.preview {
        let (cols, rows) = preview_size(controller.scene().canvas_size());
        let mut out = BufWriter::new(std::io::stdout());
        let mut renderer = AsciiRenderer::new(cols, rows);
        tracing::debug!(renderer = renderer.name(), cols, rows, "preview");
        renderer.render(controller.scene(), &mut out)?;
        out.flush()?;
    }
    Ok(())
}

/// Feeds frames to the controller until the run completes and no scripted
/// edit is still pending. `fps == 0` runs unpaced.
pub fn drive(
    controller: &mut Controller,
    live: &mut LiveConfig,
    changes: &mpsc::Receiver<Field>,
    edits: &[ScriptedEdit],
    fps: u32,
) -> RunSummary {
    let target = (fps > 0).then(|| Duration::from_secs_f32(1.0 / fps as f32));
    let last_edit = edits.iter().map(|e| e.frame).max().unwrap_or(0);
    let mut frame_count = 0u64;

    loop {
        let now = Instant::now();
        frame_count += 1;

        for edit in edits.iter().filter(|e| e.frame == frame_count) {
            if let Err(err) = live.set(&edit.key, &edit.value) {
                tracing::warn!(%err, frame = frame_count, "edit rejected");
            }
        }
        while let Ok(field) = changes.try_recv() {
            if let Err(err) = controller.handle_change(field, live.config()) {
                tracing::warn!(%err, field = field.as_str(), "change not applied");
            }
        }

        let outcome = controller.on_frame(frame_count);
        let finished = matches!(
            outcome,
            FrameOutcome::Completed | FrameOutcome::Ignored | FrameOutcome::Idle
        );
        if finished && frame_count >= last_edit {
            break;
        }
        if controller.status() == RunStatus::Idle {
            break;
        }

        // Frame pacing.
        if let Some(target) = target {
            let elapsed = now.elapsed();
            if elapsed < target {
                std::thread::sleep(target - elapsed);
            }
        }
    }

    RunSummary {
        frames: frame_count,
        iterations: controller.iteration(),
        paths: controller.scene().len(),
    }
}

fn preview_size(canvas: Size) -> (usize, usize) {
    let (cols, rows) = crossterm::terminal::size()
        .map(|(c, r)| (c as usize, r.saturating_sub(2) as usize))
        .unwrap_or((80, 40));
    let cols = cols.max(8);
    // Terminal cells are roughly twice as tall as they are wide.
    let wanted = if canvas.width > 0.0 {
        (cols as f32 * canvas.height / canvas.width * 0.5).round() as usize
    } else {
        rows
    };
    (cols, wanted.clamp(4, rows.max(4)))
}
