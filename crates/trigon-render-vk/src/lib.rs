// SPDX-License-Identifier: CEPL-1.0
#![deny(unsafe_op_in_unsafe_fn)]
//! Vulkan backend: draws one hard-coded triangle into a swapchain.
//!
//! Setup runs as a chain of stages, each consuming the previous stage's
//! result: [`choose_adapter`] → [`create_context`] → [`create_swapchain`] →
//! [`create_pipeline`] → [`record_all`] → [`FrameSync::new`]. [`Session`]
//! owns the outcome; [`VkRenderer`] adapts it to [`trigon_render::Renderer`].

use anyhow::{Context, Result};
use ash::vk;
use raw_window_handle::{HasDisplayHandle, HasWindowHandle};
use tracing::info;
use trigon_render::{RenderOptions, RenderSize, Renderer};

pub mod commands;
pub mod context;
pub mod error;
pub mod frame;
pub mod gpu;
pub mod instance;
pub mod pipeline;
pub mod selector;
pub mod session;
pub mod shader;
pub mod swapchain;

#[cfg(test)]
mod mock;

pub use commands::{record_all, CommandState};
pub use context::{create_context, RenderContext};
pub use error::{RenderError, RenderResult};
pub use frame::{DrawnFrame, FrameSlot, FrameSync, SlotState};
pub use gpu::{GpuDevice, GpuInstance};
pub use instance::{AshDevice, AshInstance};
pub use pipeline::{create_pipeline, PipelineState};
pub use selector::{choose_adapter, pick_candidate, AdapterCandidate, SurfaceDetails};
pub use session::{Session, SessionConfig};
pub use shader::ShaderBlobs;
pub use swapchain::{create_swapchain, SwapchainState};

pub struct VkRenderer {
    session: Session<AshInstance>,
}

impl VkRenderer {
    pub fn session(&self) -> &Session<AshInstance> {
        &self.session
    }
}

/// The swapchain is fixed for the session; only the size it was built at is accepted.
fn check_resize(extent: vk::Extent2D, size: RenderSize) -> RenderResult<()> {
    if extent.width == size.width && extent.height == size.height {
        Ok(())
    } else {
        Err(RenderError::RecreationUnsupported {
            width: size.width,
            height: size.height,
        })
    }
}

impl Renderer for VkRenderer {
    fn new(
        window: &dyn HasWindowHandle,
        display: &dyn HasDisplayHandle,
        size: RenderSize,
        options: &RenderOptions,
    ) -> Result<Self> {
        let shaders = ShaderBlobs::load_dir(&options.shader_dir)
            .with_context(|| format!("loading shaders from {}", options.shader_dir.display()))?;

        // SAFETY: the caller keeps the window alive until `teardown`.
        let instance = unsafe { AshInstance::new(window, display, options.validation) }
            .context("vulkan instance")?;
        let config = SessionConfig {
            framebuffer: size,
            frames_in_flight: options.frames_in_flight,
            fence_timeout: options.fence_timeout,
        };
        let session = Session::new(instance, &shaders, &config).context("vulkan session setup")?;

        let extent = session.extent();
        info!(
            "vulkan renderer ready ({}x{}, {} frame slots)",
            extent.width,
            extent.height,
            session.frames().slot_count()
        );
        Ok(VkRenderer { session })
    }

    fn resize(&mut self, size: RenderSize) -> Result<()> {
        Ok(check_resize(self.session.extent(), size)?)
    }

    fn render(&mut self) -> Result<()> {
        self.session.draw()?;
        Ok(())
    }

    fn teardown(self) -> Result<()> {
        self.session.teardown().context("vulkan teardown")
    }
}
