use anyhow::Result;
use winit::event::WindowEvent;
use winit::window::WindowId;

use super::ctx::{FrameCtx, WindowCtx};

/// Control directive returned by app callbacks.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum AppControl {
    Continue,
    Exit,
}

/// Application contract implemented by hosts.
///
/// Call order: `on_start` once after the window and GPU exist, `on_resize`
/// whenever the drawable size changes, `on_frame` once per redraw.
pub trait App {
    /// Called once when the window is ready. An error stops the runtime and
    /// is returned from [`Runtime::run`](crate::window::Runtime::run).
    fn on_start(&mut self, window: &WindowCtx<'_>) -> Result<AppControl> {
        let _ = window;
        Ok(AppControl::Continue)
    }

    /// Called with the new drawable size in physical pixels. Either side may
    /// be zero while the window is minimized.
    fn on_resize(&mut self, width: u32, height: u32) {
        let _ = (width, height);
    }

    /// Called for window events, before the runtime's own handling.
    fn on_window_event(&mut self, window_id: WindowId, event: &WindowEvent) -> AppControl {
        let _ = (window_id, event);
        AppControl::Continue
    }

    /// Called once per rendered frame.
    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl;
}
