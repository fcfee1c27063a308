use std::fmt;
use std::path::PathBuf;

/// Error returned by [`SceneAsset`](super::SceneAsset) loading and preparation.
#[derive(Debug, Clone, PartialEq)]
pub enum SceneError {
    /// The source file could not be read or parsed.
    Load { path: PathBuf, message: String },
    /// `initialize` was called before a successful `load`.
    NotLoaded,
    /// The source parsed but holds no drawable triangles.
    Empty { path: PathBuf },
}

impl fmt::Display for SceneError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SceneError::Load { path, message } => {
                write!(f, "failed to load scene {}: {message}", path.display())
            }
            SceneError::NotLoaded => write!(f, "scene must be loaded before it is initialized"),
            SceneError::Empty { path } => {
                write!(f, "scene {} contains no triangles", path.display())
            }
        }
    }
}

impl std::error::Error for SceneError {}
