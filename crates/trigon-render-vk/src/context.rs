// SPDX-License-Identifier: CEPL-1.0
use ash::vk;
use tracing::info;

use crate::error::{RenderResult, VkResultExt};
use crate::gpu::{GpuDevice, GpuInstance};
use crate::selector::AdapterCandidate;

/// Logical device and the one queue used for both drawing and presenting.
///
/// Dropping the context drops the device, so every object created from it
/// must already be gone.
pub struct RenderContext<D> {
    pub device: D,
    pub queue: vk::Queue,
    pub queue_family: u32,
}

/// Creates the logical device on the chosen adapter.
///
/// # Safety
/// `adapter` must have been enumerated from `instance`.
pub unsafe fn create_context<I: GpuInstance>(
    instance: &I,
    adapter: &AdapterCandidate,
) -> RenderResult<RenderContext<I::Device>> {
    let priorities = [1.0_f32];
    let queue_info = [vk::DeviceQueueCreateInfo::default()
        .queue_family_index(adapter.queue_family)
        .queue_priorities(&priorities)];
    let extensions = [ash::khr::swapchain::NAME.as_ptr()];
    let features = unsafe { instance.adapter_features(adapter.physical_device) };

    let info = vk::DeviceCreateInfo::default()
        .queue_create_infos(&queue_info)
        .enabled_extension_names(&extensions)
        .enabled_features(&features);

    let device = unsafe { instance.create_device(adapter.physical_device, &info) }
        .during("vkCreateDevice")?;
    let queue = unsafe { device.queue(adapter.queue_family, 0) };
    info!("device created (queue family {})", adapter.queue_family);

    Ok(RenderContext {
        device,
        queue,
        queue_family: adapter.queue_family,
    })
}
