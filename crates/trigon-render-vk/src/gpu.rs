// SPDX-License-Identifier: CEPL-1.0
//! The graphics API as seen by the session.
//!
//! Every Vulkan call the core issues goes through [`GpuInstance`] or
//! [`GpuDevice`]. [`crate::AshInstance`] forwards them to the driver; tests
//! substitute a recording mock.
//!
//! # Safety
//!
//! All methods are thin wrappers over Vulkan entry points and inherit their
//! valid-usage rules: handles must come from the same instance/device, must
//! not be destroyed twice, and must not be in use by the GPU when destroyed.

use ash::prelude::VkResult;
use ash::vk;

/// Instance-level half of the API. Owns the presentation surface.
///
/// Dropping the implementor destroys the surface, then the instance.
pub trait GpuInstance {
    type Device: GpuDevice;

    fn surface(&self) -> vk::SurfaceKHR;

    unsafe fn enumerate_adapters(&self) -> VkResult<Vec<vk::PhysicalDevice>>;
    unsafe fn adapter_properties(&self, adapter: vk::PhysicalDevice)
        -> vk::PhysicalDeviceProperties;
    unsafe fn adapter_features(&self, adapter: vk::PhysicalDevice) -> vk::PhysicalDeviceFeatures;
    unsafe fn queue_families(&self, adapter: vk::PhysicalDevice)
        -> Vec<vk::QueueFamilyProperties>;

    unsafe fn surface_support(&self, adapter: vk::PhysicalDevice, family: u32) -> VkResult<bool>;
    unsafe fn surface_formats(
        &self,
        adapter: vk::PhysicalDevice,
    ) -> VkResult<Vec<vk::SurfaceFormatKHR>>;
    unsafe fn surface_present_modes(
        &self,
        adapter: vk::PhysicalDevice,
    ) -> VkResult<Vec<vk::PresentModeKHR>>;
    unsafe fn surface_capabilities(
        &self,
        adapter: vk::PhysicalDevice,
    ) -> VkResult<vk::SurfaceCapabilitiesKHR>;

    unsafe fn create_device(
        &self,
        adapter: vk::PhysicalDevice,
        info: &vk::DeviceCreateInfo<'_>,
    ) -> VkResult<Self::Device>;
}

/// Device-level half of the API. Dropping the implementor destroys the device.
pub trait GpuDevice {
    unsafe fn queue(&self, family: u32, index: u32) -> vk::Queue;
    unsafe fn device_wait_idle(&self) -> VkResult<()>;

    // Swapchain
    unsafe fn create_swapchain(
        &self,
        info: &vk::SwapchainCreateInfoKHR<'_>,
    ) -> VkResult<vk::SwapchainKHR>;
    unsafe fn swapchain_images(&self, swapchain: vk::SwapchainKHR) -> VkResult<Vec<vk::Image>>;
    unsafe fn destroy_swapchain(&self, swapchain: vk::SwapchainKHR);
    unsafe fn create_image_view(
        &self,
        info: &vk::ImageViewCreateInfo<'_>,
    ) -> VkResult<vk::ImageView>;
    unsafe fn destroy_image_view(&self, view: vk::ImageView);

    // Pipeline
    unsafe fn create_render_pass(
        &self,
        info: &vk::RenderPassCreateInfo<'_>,
    ) -> VkResult<vk::RenderPass>;
    unsafe fn destroy_render_pass(&self, render_pass: vk::RenderPass);
    unsafe fn create_shader_module(&self, code: &[u32]) -> VkResult<vk::ShaderModule>;
    unsafe fn destroy_shader_module(&self, module: vk::ShaderModule);
    unsafe fn create_pipeline_layout(
        &self,
        info: &vk::PipelineLayoutCreateInfo<'_>,
    ) -> VkResult<vk::PipelineLayout>;
    unsafe fn destroy_pipeline_layout(&self, layout: vk::PipelineLayout);
    unsafe fn create_graphics_pipeline(
        &self,
        info: &vk::GraphicsPipelineCreateInfo<'_>,
    ) -> VkResult<vk::Pipeline>;
    unsafe fn destroy_pipeline(&self, pipeline: vk::Pipeline);
    unsafe fn create_framebuffer(
        &self,
        info: &vk::FramebufferCreateInfo<'_>,
    ) -> VkResult<vk::Framebuffer>;
    unsafe fn destroy_framebuffer(&self, framebuffer: vk::Framebuffer);

    // Commands
    unsafe fn create_command_pool(
        &self,
        info: &vk::CommandPoolCreateInfo<'_>,
    ) -> VkResult<vk::CommandPool>;
    unsafe fn destroy_command_pool(&self, pool: vk::CommandPool);
    unsafe fn allocate_command_buffers(
        &self,
        info: &vk::CommandBufferAllocateInfo<'_>,
    ) -> VkResult<Vec<vk::CommandBuffer>>;
    unsafe fn begin_command_buffer(
        &self,
        cmd: vk::CommandBuffer,
        info: &vk::CommandBufferBeginInfo<'_>,
    ) -> VkResult<()>;
    unsafe fn end_command_buffer(&self, cmd: vk::CommandBuffer) -> VkResult<()>;
    unsafe fn cmd_begin_render_pass(
        &self,
        cmd: vk::CommandBuffer,
        info: &vk::RenderPassBeginInfo<'_>,
    );
    unsafe fn cmd_bind_graphics_pipeline(&self, cmd: vk::CommandBuffer, pipeline: vk::Pipeline);
    unsafe fn cmd_draw(
        &self,
        cmd: vk::CommandBuffer,
        vertex_count: u32,
        instance_count: u32,
        first_vertex: u32,
        first_instance: u32,
    );
    unsafe fn cmd_end_render_pass(&self, cmd: vk::CommandBuffer);

    // Synchronization
    unsafe fn create_semaphore(&self) -> VkResult<vk::Semaphore>;
    unsafe fn destroy_semaphore(&self, semaphore: vk::Semaphore);
    unsafe fn create_fence(&self, signaled: bool) -> VkResult<vk::Fence>;
    unsafe fn destroy_fence(&self, fence: vk::Fence);
    unsafe fn wait_for_fences(&self, fences: &[vk::Fence], timeout: u64) -> VkResult<()>;
    unsafe fn reset_fences(&self, fences: &[vk::Fence]) -> VkResult<()>;

    // Frame submission
    unsafe fn acquire_next_image(
        &self,
        swapchain: vk::SwapchainKHR,
        timeout: u64,
        signal: vk::Semaphore,
    ) -> VkResult<(u32, bool)>;
    unsafe fn queue_submit(
        &self,
        queue: vk::Queue,
        submit: &vk::SubmitInfo<'_>,
        fence: vk::Fence,
    ) -> VkResult<()>;
    /// Returns `true` when the swapchain is suboptimal for the surface.
    unsafe fn queue_present(
        &self,
        queue: vk::Queue,
        present: &vk::PresentInfoKHR<'_>,
    ) -> VkResult<bool>;
}
