//! Shared utilities for the FusionCod front end

pub mod span;

pub use span::{Position, SourceMap, Span};
