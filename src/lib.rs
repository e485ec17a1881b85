pub mod algorithms;
pub mod app;
pub mod color;
pub mod config;
pub mod controller;
pub mod error;
pub mod export;
pub mod geometry;
pub mod live_config;
pub mod logging;
pub mod render;
pub mod scene;
pub mod snapshot;
