//! Scene import.
//!
//! A [`SceneAsset`] is the opaque scene the world renders: it is loaded and
//! prepared once, then replayed through the graphics context every frame.
//! [`ObjScene`] backs it with Wavefront OBJ/MTL files parsed by `tobj`.

mod error;
mod obj;

use crate::gl::Gl;

pub use error::SceneError;
pub use obj::{ImportedMesh, ObjScene};

/// Externally loaded scene, owned by whoever renders it.
///
/// Lifecycle: [`load`](SceneAsset::load) parses the source,
/// [`initialize`](SceneAsset::initialize) builds draw-ready data, and
/// [`draw`](SceneAsset::draw) replays it. Resources are released on drop.
pub trait SceneAsset {
    fn is_loaded(&self) -> bool;

    fn load(&mut self) -> Result<(), SceneError>;

    /// Prepares draw data for a loaded scene.
    fn initialize(&mut self) -> Result<(), SceneError>;

    /// Emits the prepared scene under the current transform.
    ///
    /// Drawing an unprepared scene emits nothing.
    fn draw(&self, gl: &mut dyn Gl);
}
