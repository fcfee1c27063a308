use anyhow::{Context, Result};
use winit::event::{ElementState, WindowEvent};
use winit::keyboard::PhysicalKey;
use winit::window::WindowId;

use scenery_engine::core::{App, AppControl, FrameCtx, WindowCtx};
use scenery_engine::gl::Immediate;
use scenery_engine::import::SceneAsset;
use scenery_engine::render::{MeshRenderer, TextRenderer};
use scenery_engine::text::FontSystem;

use crate::config::WorldConfig;
use crate::controls::ViewAction;
use crate::world::World;

/// System fonts tried in order; the first readable one backs every face name.
const FONT_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/noto/NotoSans-Regular.ttf",
    "/usr/share/fonts/truetype/noto/NotoSans-Regular.ttf",
    "/System/Library/Fonts/Helvetica.ttc",
    "C:\\Windows\\Fonts\\arial.ttf",
];

/// Host application: drives a [`World`] on the engine runtime.
///
/// The world draws into an [`Immediate`] context; every frame the recorded
/// draw stream goes to the mesh renderer, then the text renderer.
pub struct Viewer<S: SceneAsset> {
    world: World<S>,
    gl: Immediate,
    fonts: FontSystem,
    mesh_renderer: MeshRenderer,
    text_renderer: TextRenderer,
}

impl<S: SceneAsset> Viewer<S> {
    pub fn new(scene: S, config: WorldConfig, width: u32, height: u32) -> Self {
        Self {
            world: World::new(scene, config, width, height),
            gl: Immediate::with_viewport(width, height),
            fonts: FontSystem::new(),
            mesh_renderer: MeshRenderer::new(),
            text_renderer: TextRenderer::new(),
        }
    }

    pub fn world(&self) -> &World<S> {
        &self.world
    }

    fn load_fonts(&mut self) {
        let Some((path, bytes)) = FONT_CANDIDATES
            .iter()
            .find_map(|p| std::fs::read(p).ok().map(|bytes| (*p, bytes)))
        else {
            log::warn!("no system font found; overlay text is disabled");
            return;
        };

        match self.fonts.load_font("sans", &bytes) {
            Ok(id) => {
                self.fonts.alias(&self.world.config.overlay.font, id);
                log::info!("loaded font {path}");
            }
            Err(e) => log::warn!("{path}: {e}"),
        }
    }

    /// Loads fonts, then the scene. A scene that fails to load is fatal.
    fn start(&mut self) -> Result<()> {
        self.load_fonts();
        self.world
            .initialize(&mut self.gl)
            .context("scene initialization failed")
    }

    fn handle_key(&mut self, event: &WindowEvent) -> AppControl {
        let WindowEvent::KeyboardInput { event, .. } = event else {
            return AppControl::Continue;
        };
        if event.state != ElementState::Pressed {
            return AppControl::Continue;
        }
        let PhysicalKey::Code(code) = event.physical_key else {
            return AppControl::Continue;
        };
        let Some(action) = ViewAction::from_key(code) else {
            return AppControl::Continue;
        };

        let world = &mut self.world;
        if !action.apply(&mut world.view, &mut world.config) {
            return AppControl::Exit;
        }
        log::trace!("{action:?} -> {:?}", world.view);
        AppControl::Continue
    }
}

impl<S: SceneAsset> App for Viewer<S> {
    fn on_start(&mut self, _window: &WindowCtx<'_>) -> Result<AppControl> {
        self.start()?;
        Ok(AppControl::Continue)
    }

    fn on_resize(&mut self, width: u32, height: u32) {
        log::debug!("resize to {width}x{height}");
        self.gl.set_surface_size(width, height);
        self.world.resize(&mut self.gl, width, height);
    }

    fn on_window_event(&mut self, _window_id: WindowId, event: &WindowEvent) -> AppControl {
        self.handle_key(event)
    }

    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl {
        self.world.draw(&mut self.gl);
        let frame = self.gl.take_frame();

        let errors = self.gl.take_errors();
        if let Some(first) = errors.first() {
            log::warn!(
                "frame {}: {} graphics error(s), first: {first}",
                ctx.time.frame_index,
                errors.len()
            );
        }

        let mesh = &mut self.mesh_renderer;
        let text = &mut self.text_renderer;
        let fonts = &self.fonts;
        ctx.render(|rctx, target| {
            mesh.render(rctx, target, &frame);
            text.render(rctx, target, &frame, fonts);
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scenery_engine::import::ObjScene;

    #[test]
    fn new_viewer_owns_an_unloaded_scene() {
        let viewer = Viewer::new(ObjScene::new("assets", "barrel.obj"), WorldConfig::default(), 800, 600);
        let world = viewer.world();
        assert!(!world.is_disposed());
        assert!(!world.scene().is_some_and(|s| s.is_loaded()));
        assert_eq!((world.view.width, world.view.height), (800, 600));
    }

    #[test]
    fn missing_scene_fails_start_with_its_path() {
        let mut viewer =
            Viewer::new(ObjScene::new("no-such-dir", "barrel.obj"), WorldConfig::default(), 800, 600);

        let err = viewer.start().unwrap_err();
        assert_eq!(err.to_string(), "scene initialization failed");
        assert!(format!("{err:#}").contains("barrel.obj"));
        assert!(err.downcast_ref::<scenery_engine::import::SceneError>().is_some());
    }

    #[test]
    fn bundled_scene_starts() {
        let dir = concat!(env!("CARGO_MANIFEST_DIR"), "/../../assets");
        let mut viewer = Viewer::new(ObjScene::new(dir, "barrel.obj"), WorldConfig::default(), 800, 600);
        viewer.start().unwrap();
        assert!(viewer.world().scene().is_some_and(|s| s.is_loaded()));
    }
}
