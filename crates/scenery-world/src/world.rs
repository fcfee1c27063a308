use scenery_engine::gl::{Capability, ClearMask, Gl, MatrixMode, Primitive, ShadeModel};
use scenery_engine::import::{SceneAsset, SceneError};
use scenery_engine::paint::Color;
use scenery_engine::quadric::{Cylinder, Disk};

use crate::config::WorldConfig;
use crate::grid::Grid;

const FOVY_DEGREES: f32 = 60.0;
const Z_NEAR: f32 = 1.0;
const Z_FAR: f32 = 20000.0;

/// Extra tilt applied on top of `rotation_x` so the ground is seen from above.
const BASE_TILT_DEGREES: f32 = 10.0;
const SCENE_SCALE: f32 = 2.0;
const SCENE_OFFSET: [f32; 3] = [-0.1, 1.3, -0.153];

const GROUND_COLOR: Color = Color::rgb(1.0, 0.0, 0.0);
const GROUND_QUAD: [[f32; 3]; 4] = [
    [-1.0, -1.0, 1.0],
    [1.0, -1.0, 1.0],
    [1.0, -1.0, -1.0],
    [-1.0, -1.0, -1.0],
];

const CYLINDER_COLOR: Color = Color::rgb(1.0, 0.0, 1.0);
const DISK_COLOR: Color = Color::rgb(0.0, 1.0, 0.0);

const GRID_TILT_DEGREES: f32 = 15.0;

/// Camera and viewport parameters. The host mutates these freely between frames.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ViewState {
    /// Rotation about X, in degrees.
    pub rotation_x: f32,
    /// Rotation about Y, in degrees.
    pub rotation_y: f32,
    /// Camera distance along -Z.
    pub distance: f32,
    pub width: u32,
    pub height: u32,
}

impl ViewState {
    pub const DEFAULT_DISTANCE: f32 = 10.0;

    pub fn new(width: u32, height: u32) -> Self {
        Self {
            rotation_x: 0.0,
            rotation_y: 0.0,
            distance: Self::DEFAULT_DISTANCE,
            width,
            height,
        }
    }

    /// Width over height; a zero height counts as 1.
    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height.max(1) as f32
    }
}

/// The scene renderer: owns the imported scene and draws it, together with
/// the ground quad, cylinder, disk and overlay labels, every frame.
///
/// Lifecycle: [`initialize`](World::initialize) once, [`resize`](World::resize)
/// on every size change (and before the first draw), [`draw`](World::draw)
/// per frame. [`dispose`](World::dispose) or dropping the world releases the
/// scene exactly once.
pub struct World<S: SceneAsset> {
    scene: Option<S>,
    pub view: ViewState,
    pub config: WorldConfig,

    cylinder: Cylinder,
    disk: Disk,
    grid: Grid,
}

impl<S: SceneAsset> World<S> {
    /// Takes ownership of `scene` and records the initial viewport size.
    pub fn new(scene: S, config: WorldConfig, width: u32, height: u32) -> Self {
        Self {
            scene: Some(scene),
            view: ViewState::new(width, height),
            config,
            cylinder: Cylinder::default(),
            disk: Disk { inner_radius: 1.5, outer_radius: 2.0, slices: 100, loops: 120 },
            grid: Grid::default(),
        }
    }

    pub fn scene(&self) -> Option<&S> {
        self.scene.as_ref()
    }

    pub fn is_disposed(&self) -> bool {
        self.scene.is_none()
    }

    /// Sets the fixed render state, then loads and prepares the scene.
    pub fn initialize(&mut self, gl: &mut dyn Gl) -> Result<(), SceneError> {
        gl.clear_color(Color::BLACK);
        gl.shade_model(ShadeModel::Flat);
        gl.enable(Capability::DepthTest);

        let Some(scene) = self.scene.as_mut() else {
            log::warn!("initialize called after dispose; no scene to load");
            return Ok(());
        };
        scene.load()?;
        scene.initialize()?;
        Ok(())
    }

    /// Issues one frame. Never touches [`ViewState`].
    pub fn draw(&self, gl: &mut dyn Gl) {
        gl.clear(ClearMask::COLOR_DEPTH);

        if self.config.show_grid {
            self.draw_grid(gl);
        }

        let view = &self.view;
        gl.push_matrix();
        gl.translate(0.0, 0.0, -view.distance);
        gl.rotate(view.rotation_x + BASE_TILT_DEGREES, 1.0, 0.0, 0.0);
        gl.rotate(view.rotation_y, 0.0, 1.0, 0.0);
        gl.scale(SCENE_SCALE, SCENE_SCALE, SCENE_SCALE);

        self.draw_ground(gl);
        self.draw_scene(gl);
        self.draw_cylinder(gl);
        self.draw_disk(gl);

        gl.pop_matrix();

        self.draw_overlay(gl);

        gl.flush();
    }

    /// Stores the new size and rebuilds viewport and projection.
    pub fn resize(&mut self, gl: &mut dyn Gl, width: u32, height: u32) {
        self.view.width = width;
        self.view.height = height;

        gl.viewport(0, 0, width, height);

        gl.matrix_mode(MatrixMode::Projection);
        gl.load_identity();
        gl.perspective(FOVY_DEGREES, self.view.aspect(), Z_NEAR, Z_FAR);
        gl.matrix_mode(MatrixMode::ModelView);
        gl.load_identity();
    }

    /// Releases the scene. Later calls do nothing.
    pub fn dispose(&mut self) {
        if let Some(scene) = self.scene.take() {
            log::debug!("disposing world scene");
            drop(scene);
        }
    }

    // ── draw steps ─────────────────────────────────────────────────────────

    fn draw_grid(&self, gl: &mut dyn Gl) {
        gl.push_matrix();
        gl.translate(0.0, 0.0, -self.view.distance);
        gl.rotate(GRID_TILT_DEGREES, 0.0, 1.0, 1.0);
        self.grid.render(gl);
        gl.pop_matrix();
    }

    fn draw_ground(&self, gl: &mut dyn Gl) {
        gl.push_matrix();
        gl.color(GROUND_COLOR);
        gl.begin(Primitive::Quads);
        for [x, y, z] in GROUND_QUAD {
            gl.vertex(x, y, z);
        }
        gl.end();
        gl.pop_matrix();
    }

    fn draw_scene(&self, gl: &mut dyn Gl) {
        let Some(scene) = self.scene.as_ref() else { return };
        let [x, y, z] = SCENE_OFFSET;
        gl.push_matrix();
        gl.translate(x, y, z);
        scene.draw(gl);
        gl.pop_matrix();
    }

    fn draw_cylinder(&self, gl: &mut dyn Gl) {
        gl.push_matrix();
        gl.color(CYLINDER_COLOR);
        gl.scale(0.7, 0.7, 0.7);
        gl.translate(0.0, 2.0, 0.0);
        gl.rotate(90.0, 1.0, 0.0, 0.0);
        self.cylinder.render(gl);
        gl.pop_matrix();
    }

    fn draw_disk(&self, gl: &mut dyn Gl) {
        gl.push_matrix();
        gl.color(DISK_COLOR);
        gl.translate(0.0, 0.1, 0.0);
        gl.rotate(270.0, 1.0, 0.0, 0.0);
        gl.scale(0.4, 0.4, 0.4);
        self.disk.render(gl);
        gl.pop_matrix();
    }

    /// Labels at fixed window positions. The lower-right quarter viewport is
    /// set around them as GL does, then the full viewport again.
    fn draw_overlay(&self, gl: &mut dyn Gl) {
        let (w, h) = (self.view.width, self.view.height);
        let overlay = &self.config.overlay;

        gl.push_matrix();
        gl.viewport((w / 2) as i32, 0, w / 2, h / 2);
        for (line, y) in overlay.lines.iter().zip(overlay.baselines()) {
            gl.draw_text(overlay.x, y, overlay.color, &overlay.font, overlay.size, line);
        }
        gl.pop_matrix();

        gl.viewport(0, 0, w, h);
    }
}

impl<S: SceneAsset> Drop for World<S> {
    fn drop(&mut self) {
        self.dispose();
    }
}
