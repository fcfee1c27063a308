//! Font loading and lookup for overlay text.

mod font_system;

pub use font_system::{FontId, FontLoadError, FontSystem};
