// SPDX-License-Identifier: CEPL-1.0
use ash::prelude::VkResult;
use ash::vk;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to load the Vulkan loader: {0}")]
    Loading(#[from] ash::LoadingError),

    #[error("window or display handle unavailable: {0}")]
    Platform(#[from] raw_window_handle::HandleError),

    #[error("failed to create window surface: {0}")]
    SurfaceCreation(vk::Result),

    #[error("no adapter exposes a graphics queue family that can present to the surface")]
    NoSuitableDevice,

    #[error("shader binary not found: {}", path.display())]
    ShaderNotFound { path: PathBuf },

    #[error("failed to read shader binary {}: {source}", path.display())]
    ShaderRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{call} failed: {result}")]
    Vulkan { call: &'static str, result: vk::Result },

    #[error("at least one frame slot is required")]
    NoFrameSlots,

    #[error("timed out waiting for a frame fence")]
    FenceTimeout,

    #[error("failed to wait for a frame fence: {0}")]
    FenceWait(vk::Result),

    #[error("failed to acquire a swapchain image: {0}")]
    Acquire(vk::Result),

    #[error("failed to present a swapchain image: {0}")]
    Present(vk::Result),

    #[error("swapchain recreation is not supported (requested {width}x{height})")]
    RecreationUnsupported { width: u32, height: u32 },
}

pub type RenderResult<T> = Result<T, RenderError>;

/// Tags a raw Vulkan result with the call that produced it.
pub(crate) trait VkResultExt<T> {
    fn during(self, call: &'static str) -> RenderResult<T>;
}

impl<T> VkResultExt<T> for VkResult<T> {
    fn during(self, call: &'static str) -> RenderResult<T> {
        self.map_err(|result| RenderError::Vulkan { call, result })
    }
}
