//! Scenery engine crate.
//!
//! Fixed-function style graphics on top of wgpu: an immediate-mode
//! graphics context that records frames on the CPU, GLU-style quadrics,
//! OBJ scene import, and the renderers plus window runtime that put a
//! recorded frame on screen.

pub mod device;
pub mod window;
pub mod time;
pub mod core;

pub mod logging;
pub mod coords;
pub mod gl;
pub mod import;
pub mod paint;
pub mod quadric;
pub mod render;
pub mod scene;
pub mod text;
