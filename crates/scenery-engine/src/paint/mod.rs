//! Color model shared by the graphics context and the renderers.

pub mod color;

pub use color::Color;
