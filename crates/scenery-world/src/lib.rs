//! Scenery world crate.
//!
//! [`World`] draws the sample scene (ground quad, imported model, cylinder,
//! disk, overlay labels) through the engine's graphics context.
//! [`Viewer`] hosts it on the engine runtime.

mod config;
mod controls;
mod grid;
mod viewer;
mod world;

pub use config::{OverlayConfig, WorldConfig};
pub use controls::ViewAction;
pub use grid::Grid;
pub use viewer::Viewer;
pub use world::{ViewState, World};
