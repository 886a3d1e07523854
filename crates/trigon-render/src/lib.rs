// SPDX-License-Identifier: CEPL-1.0
use anyhow::Result;
use raw_window_handle::{HasDisplayHandle, HasWindowHandle};
use std::path::PathBuf;
use std::time::Duration;

/// Drawable size of the window surface in physical pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RenderSize {
    pub width: u32,
    pub height: u32,
}

/// Knobs a backend needs before it can build its first frame.
#[derive(Clone, Debug)]
pub struct RenderOptions {
    /// Directory holding `shader.vert.spv` and `shader.frag.spv`.
    pub shader_dir: PathBuf,
    /// Number of frames the CPU may record ahead; `None` means one per swapchain image.
    pub frames_in_flight: Option<u32>,
    /// Bound on every fence wait; `None` waits forever.
    pub fence_timeout: Option<Duration>,
    pub validation: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        RenderOptions {
            shader_dir: PathBuf::from("shaders"),
            frames_in_flight: None,
            fence_timeout: None,
            validation: cfg!(debug_assertions),
        }
    }
}

pub trait Renderer {
    fn new(
        window: &dyn HasWindowHandle,
        display: &dyn HasDisplayHandle,
        size: RenderSize,
        options: &RenderOptions,
    ) -> Result<Self>
    where
        Self: Sized;

    /// Swapchain recreation hook. Backends may refuse sizes they cannot serve.
    fn resize(&mut self, size: RenderSize) -> Result<()>;

    fn render(&mut self) -> Result<()>;

    /// Releases every GPU object. Must run before the window goes away.
    fn teardown(self) -> Result<()>
    where
        Self: Sized;
}
