// SPDX-License-Identifier: CEPL-1.0
//! The session aggregate: every GPU object for one window, built in stage
//! order and destroyed in reverse.

use ash::vk;
use std::time::Duration;
use tracing::{info, warn};
use trigon_render::RenderSize;

use crate::commands::{record_all, CommandState};
use crate::context::{create_context, RenderContext};
use crate::error::{RenderResult, VkResultExt};
use crate::frame::{DrawnFrame, FrameSync};
use crate::gpu::{GpuDevice, GpuInstance};
use crate::pipeline::{create_pipeline, PipelineState};
use crate::selector::{choose_adapter, AdapterCandidate};
use crate::shader::ShaderBlobs;
use crate::swapchain::{create_swapchain, SwapchainState};

#[derive(Clone, Copy, Debug)]
pub struct SessionConfig {
    /// Drawable size, used when the surface leaves the extent to us.
    pub framebuffer: RenderSize,
    /// Frame slot count; defaults to the swapchain image count.
    pub frames_in_flight: Option<u32>,
    /// Bound for fence waits; unbounded when `None`. Image acquisition
    /// always waits without a bound.
    pub fence_timeout: Option<Duration>,
}

impl SessionConfig {
    pub fn new(framebuffer: RenderSize) -> Self {
        SessionConfig {
            framebuffer,
            frames_in_flight: None,
            fence_timeout: None,
        }
    }

    fn timeout_ns(&self) -> u64 {
        self.fence_timeout
            .map_or(u64::MAX, |d| u64::try_from(d.as_nanos()).unwrap_or(u64::MAX))
    }
}

/// A stage's objects, destroyable given the device that made them.
trait Release<D> {
    unsafe fn release(&mut self, device: &D);
}

impl<D: GpuDevice> Release<D> for SwapchainState {
    unsafe fn release(&mut self, device: &D) {
        unsafe { SwapchainState::release(self, device) }
    }
}

impl<D: GpuDevice> Release<D> for PipelineState {
    unsafe fn release(&mut self, device: &D) {
        unsafe { PipelineState::release(self, device) }
    }
}

impl<D: GpuDevice> Release<D> for CommandState {
    unsafe fn release(&mut self, device: &D) {
        unsafe { CommandState::release(self, device) }
    }
}

/// Releases a finished stage unless setup gets far enough to disarm it.
struct Staged<'d, D: GpuDevice, T: Release<D> + Default> {
    device: &'d D,
    value: T,
    armed: bool,
}

impl<'d, D: GpuDevice, T: Release<D> + Default> Staged<'d, D, T> {
    fn new(device: &'d D, value: T) -> Self {
        Staged {
            device,
            value,
            armed: true,
        }
    }

    fn disarm(mut self) -> T {
        self.armed = false;
        std::mem::take(&mut self.value)
    }
}

impl<D: GpuDevice, T: Release<D> + Default> Drop for Staged<'_, D, T> {
    fn drop(&mut self) {
        if self.armed {
            // SAFETY: nothing has been submitted yet.
            unsafe { self.value.release(self.device) }
        }
    }
}

// Field order is drop order: the device goes before the instance.
pub struct Session<I: GpuInstance> {
    adapter: AdapterCandidate,
    swapchain: SwapchainState,
    pipeline: PipelineState,
    commands: CommandState,
    frames: FrameSync,
    released: bool,
    context: RenderContext<I::Device>,
    instance: I,
}

impl<I: GpuInstance> Session<I> {
    /// Runs every setup stage against `instance`'s surface. A failing stage
    /// releases whatever the earlier stages built before returning.
    pub fn new(instance: I, shaders: &ShaderBlobs, config: &SessionConfig) -> RenderResult<Self> {
        // SAFETY: each stage consumes handles made from this instance by the
        // stage before it.
        unsafe {
            let adapter = choose_adapter(&instance)?;
            let context = create_context(&instance, &adapter)?;
            let device = &context.device;

            let swapchain = Staged::new(
                device,
                create_swapchain(&context, &adapter, instance.surface(), config.framebuffer)?,
            );
            let pipeline = Staged::new(device, create_pipeline(device, &swapchain.value, shaders)?);
            let commands = Staged::new(
                device,
                record_all(&context, &pipeline.value, &swapchain.value)?,
            );

            let slot_count = config
                .frames_in_flight
                .unwrap_or(swapchain.value.image_count)
                .max(1) as usize;
            let frames = FrameSync::new(
                device,
                slot_count,
                swapchain.value.images.len(),
                config.timeout_ns(),
            )?;

            let commands = commands.disarm();
            let pipeline = pipeline.disarm();
            let swapchain = swapchain.disarm();
            info!("session ready");
            Ok(Session {
                adapter,
                swapchain,
                pipeline,
                commands,
                frames,
                released: false,
                context,
                instance,
            })
        }
    }

    pub fn instance(&self) -> &I {
        &self.instance
    }

    pub fn adapter(&self) -> &AdapterCandidate {
        &self.adapter
    }

    pub fn swapchain(&self) -> &SwapchainState {
        &self.swapchain
    }

    pub fn pipeline(&self) -> &PipelineState {
        &self.pipeline
    }

    pub fn commands(&self) -> &CommandState {
        &self.commands
    }

    pub fn frames(&self) -> &FrameSync {
        &self.frames
    }

    pub fn extent(&self) -> vk::Extent2D {
        self.swapchain.extent
    }

    /// Draws and presents one frame. An error leaves the session unusable
    /// for drawing; tear it down.
    pub fn draw(&mut self) -> RenderResult<DrawnFrame> {
        // SAFETY: every handle passed belongs to this session's device.
        unsafe {
            self.frames.draw(
                &self.context.device,
                self.context.queue,
                self.swapchain.swapchain,
                &self.commands.buffers,
            )
        }
    }

    /// Waits for the GPU to go idle, then destroys everything in reverse
    /// creation order. The device, surface and instance follow as the
    /// session is dropped.
    pub fn teardown(mut self) -> RenderResult<()> {
        let idle = unsafe { self.context.device.device_wait_idle() }.during("vkDeviceWaitIdle");
        unsafe { self.release_all() };
        info!("session torn down");
        idle
    }

    unsafe fn release_all(&mut self) {
        let device = &self.context.device;
        unsafe {
            self.frames.release(device);
            self.commands.release(device);
            self.pipeline.release(device);
            self.swapchain.release(device);
        }
        self.released = true;
    }
}

impl<I: GpuInstance> Drop for Session<I> {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        warn!("session dropped without teardown; releasing now");
        unsafe {
            if let Err(e) = self.context.device.device_wait_idle() {
                warn!("vkDeviceWaitIdle failed: {e}");
            }
            self.release_all();
        }
    }
}
