// SPDX-License-Identifier: CEPL-1.0
//! Frame pacing: the acquire, submit and present cycle.
//!
//! Frame slots rotate `0, 1, .., n-1, 0, ..` independently of the image
//! index the presentation engine hands back. Each slot's fence keeps the CPU
//! from reusing the slot's semaphores while the GPU still holds them; the
//! per-image table keeps two slots from rendering into the same image at once.

use ash::vk;
use tracing::{debug, trace};

use crate::error::{RenderError, RenderResult, VkResultExt};
use crate::gpu::GpuDevice;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SlotState {
    #[default]
    Idle,
    Acquiring,
    Submitted,
    Presenting,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct FrameSlot {
    pub image_available: vk::Semaphore,
    pub render_finished: vk::Semaphore,
    pub in_flight: vk::Fence,
    pub state: SlotState,
}

/// Which slot and swapchain image a `draw` used.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DrawnFrame {
    pub slot: usize,
    pub image_index: u32,
}

#[derive(Debug, Default)]
pub struct FrameSync {
    slots: Vec<FrameSlot>,
    images_in_flight: Vec<Option<vk::Fence>>,
    current: usize,
    timeout_ns: u64,
}

impl FrameSync {
    /// Creates `slot_count` slots, fences already signaled so the first wait
    /// on each returns at once. `image_count` sizes the per-image table.
    /// Zero slots is rejected with [`RenderError::NoFrameSlots`].
    ///
    /// # Safety
    /// `device` must outlive the returned value's objects; call [`Self::release`].
    pub unsafe fn new<D: GpuDevice>(
        device: &D,
        slot_count: usize,
        image_count: usize,
        timeout_ns: u64,
    ) -> RenderResult<Self> {
        if slot_count == 0 {
            return Err(RenderError::NoFrameSlots);
        }
        let mut sync = FrameSync {
            slots: Vec::with_capacity(slot_count),
            images_in_flight: vec![None; image_count],
            current: 0,
            timeout_ns,
        };
        for _ in 0..slot_count {
            let mut slot = FrameSlot::default();
            let made = unsafe { create_slot(device, &mut slot) };
            sync.slots.push(slot);
            if let Err(e) = made {
                unsafe { sync.release(device) };
                return Err(e);
            }
        }
        debug!(
            "{} frame slots over {} images, fence timeout {} ns",
            slot_count, image_count, timeout_ns
        );
        Ok(sync)
    }

    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    pub fn slots(&self) -> &[FrameSlot] {
        &self.slots
    }

    /// Slot the next `draw` will use.
    pub fn current_slot(&self) -> usize {
        self.current
    }

    /// Fence of the slot that last rendered into `image`, if any.
    pub fn image_fence(&self, image: usize) -> Option<vk::Fence> {
        self.images_in_flight.get(image).copied().flatten()
    }

    /// Renders and presents one frame by replaying `commands[image]`.
    ///
    /// Blocks on at most two fences; acquisition itself is not bounded by the
    /// fence timeout. Any failure ends the session; the slot is left in the
    /// state it reached.
    ///
    /// # Safety
    /// `swapchain`, `queue` and `commands` must belong to `device`, and
    /// `commands` must be indexed by swapchain image.
    pub unsafe fn draw<D: GpuDevice>(
        &mut self,
        device: &D,
        queue: vk::Queue,
        swapchain: vk::SwapchainKHR,
        commands: &[vk::CommandBuffer],
    ) -> RenderResult<DrawnFrame> {
        let index = self.current;
        let Some(&slot) = self.slots.get(index) else {
            return Err(RenderError::NoFrameSlots);
        };

        unsafe { self.wait(device, slot.in_flight) }?;

        self.slots[index].state = SlotState::Acquiring;
        let (image_index, suboptimal) =
            unsafe { device.acquire_next_image(swapchain, u64::MAX, slot.image_available) }
                .map_err(RenderError::Acquire)?;
        if suboptimal {
            trace!("image {image_index} acquired from a suboptimal swapchain");
        }
        let image = image_index as usize;
        if image >= self.images_in_flight.len() || image >= commands.len() {
            return Err(RenderError::Acquire(vk::Result::ERROR_UNKNOWN));
        }

        if let Some(holder) = self.images_in_flight[image] {
            if holder != slot.in_flight {
                unsafe { self.wait(device, holder) }?;
            }
        }
        self.images_in_flight[image] = Some(slot.in_flight);

        let wait_semaphores = [slot.image_available];
        let wait_stages = [vk::PipelineStageFlags::COLOR_ATTACHMENT_OUTPUT];
        let command_buffers = [commands[image]];
        let signal_semaphores = [slot.render_finished];
        let submit = vk::SubmitInfo::default()
            .wait_semaphores(&wait_semaphores)
            .wait_dst_stage_mask(&wait_stages)
            .command_buffers(&command_buffers)
            .signal_semaphores(&signal_semaphores);
        unsafe {
            device
                .reset_fences(&[slot.in_flight])
                .during("vkResetFences")?;
            device
                .queue_submit(queue, &submit, slot.in_flight)
                .during("vkQueueSubmit")?;
        }
        self.slots[index].state = SlotState::Submitted;

        let swapchains = [swapchain];
        let image_indices = [image_index];
        let present = vk::PresentInfoKHR::default()
            .wait_semaphores(&signal_semaphores)
            .swapchains(&swapchains)
            .image_indices(&image_indices);
        self.slots[index].state = SlotState::Presenting;
        match unsafe { device.queue_present(queue, &present) } {
            Ok(false) => {}
            Ok(true) => return Err(RenderError::Present(vk::Result::SUBOPTIMAL_KHR)),
            Err(e) => return Err(RenderError::Present(e)),
        }
        self.slots[index].state = SlotState::Idle;

        self.current = (index + 1) % self.slots.len();
        trace!("frame: slot {index} image {image_index}");
        Ok(DrawnFrame {
            slot: index,
            image_index,
        })
    }

    unsafe fn wait<D: GpuDevice>(&self, device: &D, fence: vk::Fence) -> RenderResult<()> {
        unsafe { device.wait_for_fences(&[fence], self.timeout_ns) }.map_err(|e| match e {
            vk::Result::TIMEOUT => RenderError::FenceTimeout,
            other => RenderError::FenceWait(other),
        })
    }

    /// Destroys every slot's fence and semaphores. Null handles are skipped.
    ///
    /// # Safety
    /// The device must be idle.
    pub unsafe fn release<D: GpuDevice>(&mut self, device: &D) {
        for slot in self.slots.drain(..) {
            unsafe {
                if slot.in_flight != vk::Fence::null() {
                    device.destroy_fence(slot.in_flight);
                }
                if slot.render_finished != vk::Semaphore::null() {
                    device.destroy_semaphore(slot.render_finished);
                }
                if slot.image_available != vk::Semaphore::null() {
                    device.destroy_semaphore(slot.image_available);
                }
            }
        }
        self.images_in_flight.iter_mut().for_each(|f| *f = None);
        self.current = 0;
    }
}

unsafe fn create_slot<D: GpuDevice>(device: &D, slot: &mut FrameSlot) -> RenderResult<()> {
    unsafe {
        slot.image_available = device.create_semaphore().during("vkCreateSemaphore")?;
        slot.render_finished = device.create_semaphore().during("vkCreateSemaphore")?;
        slot.in_flight = device.create_fence(true).during("vkCreateFence")?;
    }
    Ok(())
}
