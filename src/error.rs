use thiserror::Error;

/// Rejected configuration. A run is never started with one of these pending.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("unknown algorithm '{0}'")]
    UnknownAlgorithm(String),

    #[error("unknown configuration field '{0}'")]
    UnknownField(String),

    #[error("invalid value for {field}: '{value}'")]
    InvalidValue { field: &'static str, value: String },

    #[error("{field} = {value} is out of range [{min}, {max}]")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("{rows}x{cols} grid exceeds {max} points")]
    GridTooLarge { rows: u32, cols: u32, max: u32 },

    #[error("drawing area {width}x{height} is empty")]
    EmptyDrawingArea { width: f32, height: f32 },

    #[error("parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("embedded configuration: {0}")]
    Embedded(String),

    #[error("I/O error: {0}")]
    Io(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ColorError {
    #[error("malformed color '{0}'")]
    Malformed(String),
}
