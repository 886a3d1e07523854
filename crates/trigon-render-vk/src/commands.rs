// SPDX-License-Identifier: CEPL-1.0
use ash::vk;
use tracing::{debug, info};

use crate::context::RenderContext;
use crate::error::{RenderResult, VkResultExt};
use crate::gpu::GpuDevice;
use crate::pipeline::PipelineState;
use crate::swapchain::SwapchainState;

const CLEAR_COLOR: [f32; 4] = [0.0, 0.0, 0.0, 1.0];

/// Command pool plus one pre-recorded buffer per framebuffer, indexed by
/// swapchain image.
#[derive(Debug, Default)]
pub struct CommandState {
    pub pool: vk::CommandPool,
    pub buffers: Vec<vk::CommandBuffer>,
}

/// Records the triangle pass into one buffer per framebuffer. The buffers are
/// never touched again; every frame replays them as-is.
///
/// # Safety
/// `pipeline` and `swapchain` must have been created on `ctx.device`.
pub unsafe fn record_all<D: GpuDevice>(
    ctx: &RenderContext<D>,
    pipeline: &PipelineState,
    swapchain: &SwapchainState,
) -> RenderResult<CommandState> {
    let pool_info = vk::CommandPoolCreateInfo::default().queue_family_index(ctx.queue_family);
    let mut state = CommandState {
        pool: unsafe { ctx.device.create_command_pool(&pool_info) }.during("vkCreateCommandPool")?,
        buffers: Vec::new(),
    };

    let recorded = unsafe { state.record(&ctx.device, pipeline, swapchain.extent) };
    if let Err(e) = recorded {
        unsafe { state.release(&ctx.device) };
        return Err(e);
    }
    info!("{} command buffers recorded", state.buffers.len());
    Ok(state)
}

impl CommandState {
    unsafe fn record<D: GpuDevice>(
        &mut self,
        device: &D,
        pipeline: &PipelineState,
        extent: vk::Extent2D,
    ) -> RenderResult<()> {
        let alloc = vk::CommandBufferAllocateInfo::default()
            .command_pool(self.pool)
            .level(vk::CommandBufferLevel::PRIMARY)
            .command_buffer_count(pipeline.framebuffers.len() as u32);
        self.buffers =
            unsafe { device.allocate_command_buffers(&alloc) }.during("vkAllocateCommandBuffers")?;

        let clears = [vk::ClearValue {
            color: vk::ClearColorValue {
                float32: CLEAR_COLOR,
            },
        }];
        for (&cmd, &framebuffer) in self.buffers.iter().zip(&pipeline.framebuffers) {
            unsafe {
                device
                    .begin_command_buffer(cmd, &vk::CommandBufferBeginInfo::default())
                    .during("vkBeginCommandBuffer")?;

                let begin = vk::RenderPassBeginInfo::default()
                    .render_pass(pipeline.render_pass)
                    .framebuffer(framebuffer)
                    .render_area(vk::Rect2D {
                        offset: vk::Offset2D { x: 0, y: 0 },
                        extent,
                    })
                    .clear_values(&clears);
                device.cmd_begin_render_pass(cmd, &begin);
                device.cmd_bind_graphics_pipeline(cmd, pipeline.pipeline);
                device.cmd_draw(cmd, 3, 1, 0, 0);
                device.cmd_end_render_pass(cmd);

                device
                    .end_command_buffer(cmd)
                    .during("vkEndCommandBuffer")?;
            }
        }
        Ok(())
    }

    /// Destroys the pool, freeing its buffers with it.
    ///
    /// # Safety
    /// None of the buffers may be pending execution.
    pub unsafe fn release<D: GpuDevice>(&mut self, device: &D) {
        self.buffers.clear();
        if self.pool != vk::CommandPool::null() {
            unsafe { device.destroy_command_pool(self.pool) };
            self.pool = vk::CommandPool::null();
            debug!("command pool released");
        }
    }
}
