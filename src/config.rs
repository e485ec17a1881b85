use crate::color;
use crate::error::ConfigError;
use clap::{Args, Parser, ValueEnum};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_ALGORITHM: &str = "line-field";
pub const DEFAULT_ITERATIONS: u32 = 100;
pub const DEFAULT_LINE_COUNT: u32 = 20;
pub const DEFAULT_ROWS: u32 = 12;
pub const DEFAULT_SIB_WEIGHT: f32 = 0.02;
pub const DEFAULT_SLOPE_WEIGHT: f32 = 0.01;
pub const DEFAULT_LINE_CHANGE: f32 = 5.0;
pub const DEFAULT_ASPECT_RATIO: f32 = 1.0;
pub const DEFAULT_LINE_WIDTH: f32 = 1.0;
pub const DEFAULT_THROTTLE: u32 = 1;
pub const DEFAULT_COLOR: &str = "#ffffff";
pub const DEFAULT_STROKE_COLOR: &str = "#ffffff";
pub const DEFAULT_BACKGROUND: &str = "#000000";
/// Ceiling on `rows × columns` for the triangulated grid.
pub const MAX_GRID_POINTS: u32 = 250_000;

pub const ASPECT_RATIOS: [(&str, f32); 5] = [
    ("16:9", 1.777_777_8),
    ("4:3", 1.333_333_3),
    ("1:1", 1.0),
    ("3:4", 0.75),
    ("9:16", 0.5625),
];

#[derive(Parser, Debug, Clone)]
#[command(
    name = "line-art",
    version,
    about = "Iterative generative line, polygon and mesh art exported as SVG"
)]
pub struct Cli {
    #[command(flatten)]
    pub config: Configuration,

    /// key=value file applied on top of the command-line values.
    #[arg(long = "config")]
    pub config_path: Option<PathBuf>,

    /// Container width the canvas is fitted into.
    #[arg(long, default_value_t = 1200.0)]
    pub width: f32,

    #[arg(long, default_value_t = 900.0)]
    pub height: f32,

    /// Frame clock rate; 0 runs unpaced.
    #[arg(long, default_value_t = 60)]
    pub fps: u32,

    #[arg(long, default_value = "art.svg")]
    pub out: PathBuf,

    #[arg(long, default_value_t = false)]
    pub preview: bool,

    #[arg(long, default_value = "info")]
    pub log_level: String,

    #[arg(long, default_value_t = false)]
    pub list_algorithms: bool,

    /// Scripted live edit applied at a frame, e.g. `30:color=#ff0000`.
    #[arg(long = "edit", value_name = "FRAME:KEY=VALUE")]
    pub edits: Vec<String>,
}

impl Cli {
    pub fn resolve_config(&self) -> Result<Configuration, ConfigError> {
        let mut cfg = self.config.clone();
        if let Some(path) = &self.config_path {
            cfg.load_file(path)?;
        }
        Ok(cfg)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CouplingMode {
    /// Neighbours contribute their last y-delta.
    Velocity,
    /// Neighbours contribute the gap between their last y and ours.
    Position,
}

impl CouplingMode {
    pub fn label(self) -> &'static str {
        match self {
            Self::Velocity => "velocity",
            Self::Position => "position",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "velocity" => Some(Self::Velocity),
            "position" => Some(Self::Position),
            _ => None,
        }
    }
}

/// Live, user-editable parameters. Runs only ever read a snapshot of this.
#[derive(Args, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Configuration {
    /// Generator id (see --list-algorithms).
    #[arg(long, default_value = DEFAULT_ALGORITHM)]
    pub algorithm: String,

    #[arg(long, default_value_t = DEFAULT_ITERATIONS)]
    pub iterations: u32,

    #[arg(long, default_value_t = DEFAULT_LINE_COUNT)]
    pub line_count: u32,

    #[arg(long, default_value_t = DEFAULT_ROWS)]
    pub rows: u32,

    #[arg(long, default_value_t = DEFAULT_SIB_WEIGHT)]
    pub sib_weight: f32,

    #[arg(long, default_value_t = DEFAULT_SLOPE_WEIGHT)]
    pub slope_weight: f32,

    /// Noise amplitude for line steps and grid jitter.
    #[arg(long, default_value_t = DEFAULT_LINE_CHANGE)]
    pub line_change: f32,

    #[arg(long, default_value_t = DEFAULT_ASPECT_RATIO, value_parser = parse_aspect_ratio_arg)]
    pub aspect_ratio: f32,

    #[arg(long, default_value_t = DEFAULT_LINE_WIDTH)]
    pub line_width: f32,

    /// Only every Nth frame advances the run.
    #[arg(long, default_value_t = DEFAULT_THROTTLE)]
    pub throttle: u32,

    #[arg(long, default_value_t = false)]
    pub random_start: bool,

    #[arg(long, default_value_t = false)]
    pub curved: bool,

    #[arg(long, default_value_t = false)]
    pub show_stroke: bool,

    #[arg(long, default_value_t = false)]
    pub random_color: bool,

    #[arg(long, value_enum, default_value_t = CouplingMode::Velocity)]
    pub coupling: CouplingMode,

    #[arg(long, default_value = DEFAULT_COLOR)]
    pub color: String,

    #[arg(long, default_value = DEFAULT_STROKE_COLOR)]
    pub stroke_color: String,

    #[arg(long, default_value = DEFAULT_BACKGROUND)]
    pub background: String,

    #[arg(long)]
    pub seed: Option<u64>,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            algorithm: DEFAULT_ALGORITHM.to_string(),
            iterations: DEFAULT_ITERATIONS,
            line_count: DEFAULT_LINE_COUNT,
            rows: DEFAULT_ROWS,
            sib_weight: DEFAULT_SIB_WEIGHT,
            slope_weight: DEFAULT_SLOPE_WEIGHT,
            line_change: DEFAULT_LINE_CHANGE,
            aspect_ratio: DEFAULT_ASPECT_RATIO,
            line_width: DEFAULT_LINE_WIDTH,
            throttle: DEFAULT_THROTTLE,
            random_start: false,
            curved: false,
            show_stroke: false,
            random_color: false,
            coupling: CouplingMode::Velocity,
            color: DEFAULT_COLOR.to_string(),
            stroke_color: DEFAULT_STROKE_COLOR.to_string(),
            background: DEFAULT_BACKGROUND.to_string(),
            seed: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Algorithm,
    Iterations,
    LineCount,
    Rows,
    SibWeight,
    SlopeWeight,
    LineChange,
    AspectRatio,
    LineWidth,
    Throttle,
    RandomStart,
    Curved,
    ShowStroke,
    RandomColor,
    Coupling,
    Color,
    StrokeColor,
    Background,
    Seed,
}

/// What a live edit of a field does to the current run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reaction {
    /// Start a fresh run from the edited configuration.
    Rerun,
    /// Restyle the current scene in place.
    Restyle,
    /// Picked up by the next run only.
    Deferred,
}

impl Field {
    pub const fn all() -> [Self; 19] {
        [
            Self::Algorithm,
            Self::Iterations,
            Self::LineCount,
            Self::Rows,
            Self::SibWeight,
            Self::SlopeWeight,
            Self::LineChange,
            Self::AspectRatio,
            Self::LineWidth,
            Self::Throttle,
            Self::RandomStart,
            Self::Curved,
            Self::ShowStroke,
            Self::RandomColor,
            Self::Coupling,
            Self::Color,
            Self::StrokeColor,
            Self::Background,
            Self::Seed,
        ]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Algorithm => "algorithm",
            Self::Iterations => "iterations",
            Self::LineCount => "line_count",
            Self::Rows => "rows",
            Self::SibWeight => "sib_weight",
            Self::SlopeWeight => "slope_weight",
            Self::LineChange => "line_change",
            Self::AspectRatio => "aspect_ratio",
            Self::LineWidth => "line_width",
            Self::Throttle => "throttle",
            Self::RandomStart => "random_start",
            Self::Curved => "curved",
            Self::ShowStroke => "show_stroke",
            Self::RandomColor => "random_color",
            Self::Coupling => "coupling",
            Self::Color => "color",
            Self::StrokeColor => "stroke_color",
            Self::Background => "background",
            Self::Seed => "seed",
        }
    }

    /// Accepts snake_case, kebab-case and camelCase spellings.
    pub fn parse(s: &str) -> Option<Self> {
        let key = normalize_key(s);
        Self::all()
            .into_iter()
            .find(|f| normalize_key(f.as_str()) == key)
    }

    pub fn reaction(self) -> Reaction {
        match self {
            Self::Color | Self::StrokeColor | Self::LineWidth | Self::Background => {
                Reaction::Restyle
            }
            Self::Seed => Reaction::Deferred,
            _ => Reaction::Rerun,
        }
    }
}

impl Configuration {
    pub fn validate(&self) -> Result<(), ConfigError> {
        for field in Field::all() {
            self.validate_field(field)?;
        }
        Ok(())
    }

    pub fn validate_field(&self, field: Field) -> Result<(), ConfigError> {
        let name = field.as_str();
        match field {
            Field::Algorithm => {
                if self.algorithm.trim().is_empty() {
                    return Err(ConfigError::UnknownAlgorithm(self.algorithm.clone()));
                }
                Ok(())
            }
            Field::Iterations => check_range(name, self.iterations as f64, 1.0, 10_000.0),
            Field::LineCount => check_range(name, self.line_count as f64, 1.0, 1_000.0),
            Field::Rows => {
                check_range(name, self.rows as f64, 2.0, 500.0)?;
                self.check_grid_size()
            }
            Field::SibWeight => check_range(name, self.sib_weight as f64, 0.0, 1.0),
            Field::SlopeWeight => check_range(name, self.slope_weight as f64, 0.0, 1.0),
            Field::LineChange => check_range(name, self.line_change as f64, 0.0, 1_000.0),
            Field::AspectRatio => {
                check_range(name, self.aspect_ratio as f64, 0.05, 16.0)?;
                self.check_grid_size()
            }
            Field::LineWidth => check_range(name, self.line_width as f64, 0.1, 100.0),
            Field::Throttle => check_range(name, self.throttle as f64, 1.0, 120.0),
            Field::Color => check_color(name, &self.color),
            Field::StrokeColor => check_color(name, &self.stroke_color),
            Field::Background => check_color(name, &self.background),
            Field::RandomStart
            | Field::Curved
            | Field::ShowStroke
            | Field::RandomColor
            | Field::Coupling
            | Field::Seed => Ok(()),
        }
    }

    /// Columns of the triangulated grid: `rows × aspect_ratio`, at least 2.
    pub fn grid_columns(&self) -> u32 {
        ((self.rows as f32 * self.aspect_ratio).round() as u32).max(2)
    }

    fn check_grid_size(&self) -> Result<(), ConfigError> {
        let cols = self.grid_columns();
        if self.rows.saturating_mul(cols) > MAX_GRID_POINTS {
            return Err(ConfigError::GridTooLarge {
                rows: self.rows,
                cols,
                max: MAX_GRID_POINTS,
            });
        }
        Ok(())
    }

    /// Sets one field from its textual form. The configuration is left
    /// untouched when the value does not parse or is out of range.
    pub fn assign(&mut self, key: &str, value: &str) -> Result<Field, ConfigError> {
        let field = Field::parse(key).ok_or_else(|| ConfigError::UnknownField(key.to_string()))?;
        let name = field.as_str();
        let value = value.trim();
        let mut next = self.clone();
        match field {
            Field::Algorithm => next.algorithm = value.to_string(),
            Field::Iterations => next.iterations = parse_num(name, value)?,
            Field::LineCount => next.line_count = parse_num(name, value)?,
            Field::Rows => next.rows = parse_num(name, value)?,
            Field::SibWeight => next.sib_weight = parse_num(name, value)?,
            Field::SlopeWeight => next.slope_weight = parse_num(name, value)?,
            Field::LineChange => next.line_change = parse_num(name, value)?,
            Field::AspectRatio => {
                next.aspect_ratio = parse_aspect_ratio(value).ok_or_else(|| invalid(name, value))?
            }
            Field::LineWidth => next.line_width = parse_num(name, value)?,
            Field::Throttle => next.throttle = parse_num(name, value)?,
            Field::RandomStart => next.random_start = parse_flag(name, value)?,
            Field::Curved => next.curved = parse_flag(name, value)?,
            Field::ShowStroke => next.show_stroke = parse_flag(name, value)?,
            Field::RandomColor => next.random_color = parse_flag(name, value)?,
            Field::Coupling => {
                next.coupling = CouplingMode::parse(value).ok_or_else(|| invalid(name, value))?
            }
            Field::Color => next.color = value.to_string(),
            Field::StrokeColor => next.stroke_color = value.to_string(),
            Field::Background => next.background = value.to_string(),
            Field::Seed => {
                next.seed = match value {
                    "" | "none" | "random" => None,
                    v => Some(parse_num(name, v)?),
                }
            }
        }
        next.validate_field(field)?;
        *self = next;
        Ok(field)
    }

    /// Applies `key = value` lines. `#` starts a comment line.
    pub fn apply_text(&mut self, text: &str) -> Result<Vec<Field>, ConfigError> {
        let mut touched = Vec::new();
        for (line_idx, raw) in text.lines().enumerate() {
            let line_no = line_idx + 1;
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                return Err(ConfigError::Parse {
                    line: line_no,
                    message: "expected <key>=<value>".to_string(),
                });
            };
            let field = self
                .assign(key.trim(), value)
                .map_err(|err| ConfigError::Parse {
                    line: line_no,
                    message: err.to_string(),
                })?;
            touched.push(field);
        }
        Ok(touched)
    }

    pub fn load_file(&mut self, path: impl AsRef<Path>) -> Result<Vec<Field>, ConfigError> {
        let text = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::Io(format!("{}: {e}", path.as_ref().display())))?;
        self.apply_text(&text)
    }
}

pub fn parse_aspect_ratio(raw: &str) -> Option<f32> {
    let raw = raw.trim();
    if let Some((_, v)) = ASPECT_RATIOS.iter().find(|(name, _)| *name == raw) {
        return Some(*v);
    }
    if let Some((w, h)) = raw.split_once(':') {
        let w = w.trim().parse::<f32>().ok()?;
        let h = h.trim().parse::<f32>().ok()?;
        if h <= 0.0 {
            return None;
        }
        return Some(w / h).filter(|v| v.is_finite());
    }
    raw.parse::<f32>().ok().filter(|v| v.is_finite())
}

fn parse_aspect_ratio_arg(raw: &str) -> Result<f32, String> {
    parse_aspect_ratio(raw).ok_or_else(|| format!("invalid aspect ratio '{raw}'"))
}

fn normalize_key(s: &str) -> String {
    s.trim()
        .chars()
        .filter(|c| *c != '_' && *c != '-')
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

fn check_range(field: &'static str, value: f64, min: f64, max: f64) -> Result<(), ConfigError> {
    if !value.is_finite() || value < min || value > max {
        return Err(ConfigError::OutOfRange {
            field,
            value,
            min,
            max,
        });
    }
    Ok(())
}

fn check_color(field: &'static str, value: &str) -> Result<(), ConfigError> {
    if color::is_valid(value) {
        Ok(())
    } else {
        Err(invalid(field, value))
    }
}

fn parse_num<T: std::str::FromStr>(field: &'static str, value: &str) -> Result<T, ConfigError> {
    value.parse::<T>().map_err(|_| invalid(field, value))
}

fn parse_flag(field: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(invalid(field, value)),
    }
}

fn invalid(field: &'static str, value: &str) -> ConfigError {
    ConfigError::InvalidValue {
        field,
        value: value.to_string(),
    }
}
