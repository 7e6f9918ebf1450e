//! Subject detection module
//!
//! This module isolates the painted subject from its backdrop before
//! colors are clustered (miniature mode only).

pub mod foreground;

pub use foreground::{ForegroundSelection, ForegroundSelector};
