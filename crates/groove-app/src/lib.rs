//! # Groove-App
//!
//! The GrooveWake runtime: a pose-source abstraction with a synthetic
//! implementation, an event sink that renders core events as log lines,
//! runtime configuration, and the single-task engine loop that ties the
//! scorer, classifier, and alarm machine together.

pub mod config;
pub mod engine;
pub mod sink;
pub mod source;

pub use config::*;
pub use engine::*;
pub use sink::*;
pub use source::*;
