use std::cell::Cell;
use std::path::{Path, PathBuf};

use crate::gl::{Gl, Primitive};
use crate::paint::Color;

use super::{SceneAsset, SceneError};

/// One mesh as parsed from the source file.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportedMesh {
    pub name: String,
    pub positions: Vec<[f32; 3]>,
    /// Triangle list indices into `positions`.
    pub indices: Vec<u32>,
    /// Diffuse color of the mesh material, if it has one.
    pub diffuse: Option<Color>,
}

impl ImportedMesh {
    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

/// De-indexed triangles ready to replay; the equivalent of a compiled display list.
#[derive(Debug, Clone)]
struct PreparedMesh {
    color: Option<Color>,
    vertices: Vec<[f32; 3]>,
}

/// Scene loaded from a Wavefront OBJ file (plus its MTL library, if any).
///
/// Meshes without a material color inherit the context's current color.
#[derive(Debug)]
pub struct ObjScene {
    directory: PathBuf,
    file_name: String,
    meshes: Vec<ImportedMesh>,
    prepared: Vec<PreparedMesh>,
    warned_unprepared: Cell<bool>,
}

impl ObjScene {
    /// Creates an unloaded scene for `directory/file_name`.
    pub fn new(directory: impl Into<PathBuf>, file_name: impl Into<String>) -> Self {
        Self {
            directory: directory.into(),
            file_name: file_name.into(),
            meshes: Vec::new(),
            prepared: Vec::new(),
            warned_unprepared: Cell::new(false),
        }
    }

    pub fn path(&self) -> PathBuf {
        self.directory.join(&self.file_name)
    }

    pub fn meshes(&self) -> &[ImportedMesh] {
        &self.meshes
    }

    pub fn triangle_count(&self) -> usize {
        self.meshes.iter().map(ImportedMesh::triangle_count).sum()
    }

    /// Axis-aligned bounds over all mesh positions as `(min, max)`.
    pub fn bounds(&self) -> Option<([f32; 3], [f32; 3])> {
        let mut points = self.meshes.iter().flat_map(|m| m.positions.iter());
        let first = *points.next()?;
        Some(points.fold((first, first), |(mut lo, mut hi), p| {
            for i in 0..3 {
                lo[i] = lo[i].min(p[i]);
                hi[i] = hi[i].max(p[i]);
            }
            (lo, hi)
        }))
    }

    fn parse(path: &Path) -> Result<Vec<ImportedMesh>, SceneError> {
        let options = tobj::LoadOptions {
            single_index: true,
            triangulate: true,
            ignore_points: true,
            ignore_lines: true,
            ..Default::default()
        };

        let (models, materials) = tobj::load_obj(path, &options).map_err(|e| SceneError::Load {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        let materials = materials.unwrap_or_else(|e| {
            log::warn!("{}: material library unavailable ({e}); using current color", path.display());
            Vec::new()
        });

        let meshes = models
            .into_iter()
            .map(|model| {
                let mesh = model.mesh;
                let diffuse = mesh
                    .material_id
                    .and_then(|id| materials.get(id))
                    .and_then(|m| {
                        let [r, g, b] = m.diffuse?;
                        Some(Color::rgba(r, g, b, m.dissolve.unwrap_or(1.0)).clamped())
                    });

                ImportedMesh {
                    name: model.name,
                    positions: mesh
                        .positions
                        .chunks_exact(3)
                        .map(|p| [p[0], p[1], p[2]])
                        .collect(),
                    indices: mesh.indices,
                    diffuse,
                }
            })
            .filter(|m| m.triangle_count() > 0)
            .collect();

        Ok(meshes)
    }
}

impl SceneAsset for ObjScene {
    fn is_loaded(&self) -> bool {
        !self.meshes.is_empty()
    }

    fn load(&mut self) -> Result<(), SceneError> {
        let path = self.path();
        let meshes = Self::parse(&path)?;
        if meshes.is_empty() {
            return Err(SceneError::Empty { path });
        }

        self.meshes = meshes;
        self.prepared.clear();
        log::info!(
            "loaded scene {} ({} meshes, {} triangles)",
            path.display(),
            self.meshes.len(),
            self.triangle_count()
        );
        Ok(())
    }

    fn initialize(&mut self) -> Result<(), SceneError> {
        if !self.is_loaded() {
            return Err(SceneError::NotLoaded);
        }

        self.prepared = self
            .meshes
            .iter()
            .map(|mesh| PreparedMesh {
                color: mesh.diffuse,
                vertices: mesh
                    .indices
                    .iter()
                    .filter_map(|&i| mesh.positions.get(i as usize).copied())
                    .collect(),
            })
            .collect();

        let skipped = self.triangle_count() * 3
            - self.prepared.iter().map(|p| p.vertices.len()).sum::<usize>();
        if skipped > 0 {
            log::warn!("{}: dropped {skipped} out-of-range indices", self.file_name);
        }
        Ok(())
    }

    fn draw(&self, gl: &mut dyn Gl) {
        if self.prepared.is_empty() {
            if !self.warned_unprepared.replace(true) {
                log::warn!("scene {} drawn before initialize; skipping", self.file_name);
            }
            return;
        }

        for mesh in &self.prepared {
            if let Some(color) = mesh.color {
                gl.color(color);
            }
            gl.begin(Primitive::Triangles);
            for v in &mesh.vertices {
                gl.vertex(v[0], v[1], v[2]);
            }
            gl.end();
        }
    }
}

impl Drop for ObjScene {
    fn drop(&mut self) {
        if self.is_loaded() {
            log::debug!("releasing scene {}", self.file_name);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gl::{GlCall, Recorder};

    fn fixtures() -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
    }

    #[test]
    fn loads_fixture_with_material_colors() {
        let mut scene = ObjScene::new(fixtures(), "crate.obj");
        scene.load().unwrap();

        assert_eq!(scene.meshes().len(), 2);
        // a cube split into body (5 faces) and lid (1 face), quads triangulated
        assert_eq!(scene.triangle_count(), 12);

        let body = scene.meshes().iter().find(|m| m.name == "body").unwrap();
        assert_eq!(body.diffuse, Some(Color::rgb(0.6, 0.4, 0.2)));
        let lid = scene.meshes().iter().find(|m| m.name == "lid").unwrap();
        assert_eq!(lid.diffuse, None);
    }

    #[test]
    fn bounds_cover_all_meshes() {
        let mut scene = ObjScene::new(fixtures(), "crate.obj");
        scene.load().unwrap();
        assert_eq!(scene.bounds(), Some(([-0.5, 0.0, -0.5], [0.5, 1.0, 0.5])));
    }

    #[test]
    fn draw_replays_prepared_triangles() {
        let mut scene = ObjScene::new(fixtures(), "crate.obj");
        scene.load().unwrap();
        scene.initialize().unwrap();

        let mut gl = Recorder::new();
        scene.draw(&mut gl);

        assert_eq!(gl.count(|c| *c == GlCall::Begin(Primitive::Triangles)), 2);
        assert_eq!(gl.count(|c| matches!(c, GlCall::Vertex(_))), 36);
        // only the body carries a material color
        assert_eq!(gl.count(|c| matches!(c, GlCall::Color(_))), 1);
    }

    #[test]
    fn draw_before_initialize_emits_nothing() {
        let mut scene = ObjScene::new(fixtures(), "crate.obj");
        scene.load().unwrap();

        let mut gl = Recorder::new();
        scene.draw(&mut gl);
        scene.draw(&mut gl);
        assert!(gl.calls().is_empty());
    }

    #[test]
    fn initialize_requires_load() {
        let mut scene = ObjScene::new(fixtures(), "crate.obj");
        assert_eq!(scene.initialize(), Err(SceneError::NotLoaded));
    }

    #[test]
    fn missing_file_reports_path() {
        let mut scene = ObjScene::new(fixtures(), "missing.obj");
        let err = scene.load().unwrap_err();
        assert!(matches!(err, SceneError::Load { ref path, .. } if path.ends_with("missing.obj")));
        assert!(err.to_string().contains("missing.obj"));
    }

    #[test]
    fn bundled_barrel_loads_with_both_materials() {
        let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../assets");
        let mut scene = ObjScene::new(dir, "barrel.obj");
        scene.load().unwrap();
        scene.initialize().unwrap();

        assert_eq!(scene.meshes().len(), 2);
        // 5 rings of 16 quads plus two 16-triangle caps
        assert_eq!(scene.triangle_count(), 5 * 16 * 2 + 32);
        assert!(scene.meshes().iter().all(|m| m.diffuse.is_some()));
    }

    #[test]
    fn file_without_faces_is_empty() {
        let mut scene = ObjScene::new(fixtures(), "points.obj");
        assert!(matches!(scene.load(), Err(SceneError::Empty { .. })));
        assert!(!scene.is_loaded());
    }
}
