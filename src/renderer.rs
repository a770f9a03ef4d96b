mod egui_pass;
mod window_surface;

pub use window_surface::{SurfaceFrame, WindowSurface};

use anyhow::Result;
use egui_wgpu::{Renderer as EguiRenderer, ScreenDescriptor};

pub const CLEAR_COLOR: wgpu::Color = wgpu::Color { r: 0.05, g: 0.06, b: 0.1, a: 1.0 };

impl WindowSurface {
    /// Clears the frame and draws the egui output on top.
    pub fn render_egui(
        &mut self,
        painter: &mut EguiRenderer,
        paint_jobs: &[egui::ClippedPrimitive],
        screen: &ScreenDescriptor,
    ) -> Result<()> {
        let frame = self.acquire_surface_frame()?;
        let (device, queue) = self.device_and_queue()?;
        egui_pass::render(device, queue, painter, paint_jobs, screen, frame)
    }
}
