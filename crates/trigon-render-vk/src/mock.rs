// SPDX-License-Identifier: CEPL-1.0
//! Recording stand-in for [`GpuInstance`]/[`GpuDevice`] used by the unit tests.
//!
//! Handles are unique counters; every call lands in a shared log so tests can
//! assert on ordering. Failures are injected one-shot through [`FailPoint`].

use ash::prelude::VkResult;
use ash::vk::{self, Handle};
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

use trigon_render::RenderSize;

use crate::context::{create_context, RenderContext};
use crate::gpu::{GpuDevice, GpuInstance};
use crate::selector::{choose_adapter, AdapterCandidate};
use crate::shader::ShaderBlobs;
use crate::swapchain::{create_swapchain, SwapchainState};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Object {
    Swapchain(vk::SwapchainKHR),
    ImageView(vk::ImageView),
    RenderPass(vk::RenderPass),
    ShaderModule(vk::ShaderModule),
    PipelineLayout(vk::PipelineLayout),
    Pipeline(vk::Pipeline),
    Framebuffer(vk::Framebuffer),
    CommandPool(vk::CommandPool),
    Semaphore(vk::Semaphore),
    Fence(vk::Fence),
}

#[derive(Clone, Debug, PartialEq)]
pub enum Call {
    SurfaceFormats(vk::PhysicalDevice),
    CreateDevice {
        adapter: vk::PhysicalDevice,
        queue_family: u32,
        queue_priority: f32,
        extensions: u32,
        features_enabled: bool,
    },
    SwapchainInfo {
        min_image_count: u32,
        format: vk::Format,
        color_space: vk::ColorSpaceKHR,
        extent: vk::Extent2D,
        present_mode: vk::PresentModeKHR,
        pre_transform: vk::SurfaceTransformFlagsKHR,
        sharing: vk::SharingMode,
        usage: vk::ImageUsageFlags,
        clipped: bool,
    },
    RenderPassInfo {
        format: vk::Format,
        load_op: vk::AttachmentLoadOp,
        store_op: vk::AttachmentStoreOp,
        final_layout: vk::ImageLayout,
        src_subpass: u32,
        dst_subpass: u32,
        dst_access: vk::AccessFlags,
    },
    PipelineInfo {
        stages: u32,
        vertex_bindings: u32,
        topology: vk::PrimitiveTopology,
        viewport: vk::Extent2D,
        cull_mode: vk::CullModeFlags,
        front_face: vk::FrontFace,
        samples: vk::SampleCountFlags,
        write_mask: vk::ColorComponentFlags,
        blend_enable: bool,
    },
    Create(Object),
    CreateFence {
        fence: vk::Fence,
        signaled: bool,
    },
    Destroy(Object),
    AllocateCommandBuffers(Vec<vk::CommandBuffer>),
    BeginCommandBuffer(vk::CommandBuffer),
    BeginRenderPass {
        cmd: vk::CommandBuffer,
        framebuffer: vk::Framebuffer,
        extent: vk::Extent2D,
        clear: [f32; 4],
    },
    BindPipeline {
        cmd: vk::CommandBuffer,
        pipeline: vk::Pipeline,
    },
    Draw {
        cmd: vk::CommandBuffer,
        vertices: u32,
        instances: u32,
    },
    EndRenderPass(vk::CommandBuffer),
    EndCommandBuffer(vk::CommandBuffer),
    WaitForFences(Vec<vk::Fence>),
    ResetFences(Vec<vk::Fence>),
    Acquire {
        signal: vk::Semaphore,
        image: u32,
        timeout: u64,
    },
    Submit {
        cmd: vk::CommandBuffer,
        wait: vk::Semaphore,
        wait_stage: vk::PipelineStageFlags,
        signal: vk::Semaphore,
        fence: vk::Fence,
    },
    Present {
        image: u32,
        wait: vk::Semaphore,
    },
    DeviceWaitIdle,
    DestroyDevice,
    DestroySurface,
    DestroyInstance,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FailPoint {
    /// Fail the image view created after `after` successful ones.
    ImageView { after: usize },
    Pipeline,
    Fence,
    WaitFence(vk::Result),
    Acquire(vk::Result),
    Present(vk::Result),
    PresentSuboptimal,
}

#[derive(Default)]
pub struct MockState {
    calls: RefCell<Vec<Call>>,
    next_handle: Cell<u64>,
    image_views: Cell<usize>,
    image_count: Cell<u32>,
    /// Images the "driver" hands out beyond the requested minimum.
    pub extra_images: Cell<u32>,
    next_image: Cell<u32>,
    acquire_script: RefCell<VecDeque<u32>>,
    fail: RefCell<Vec<FailPoint>>,
}

impl MockState {
    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    pub fn clear_calls(&self) {
        self.calls.borrow_mut().clear();
    }

    pub fn script_acquire(&self, order: impl IntoIterator<Item = u32>) {
        self.acquire_script.borrow_mut().extend(order);
    }

    pub fn fail(&self, point: FailPoint) {
        self.fail.borrow_mut().push(point);
    }

    pub fn created(&self) -> Vec<Object> {
        self.calls
            .borrow()
            .iter()
            .filter_map(|c| match c {
                Call::Create(o) => Some(*o),
                Call::CreateFence { fence, .. } => Some(Object::Fence(*fence)),
                _ => None,
            })
            .collect()
    }

    pub fn destroyed(&self) -> Vec<Object> {
        self.calls
            .borrow()
            .iter()
            .filter_map(|c| match c {
                Call::Destroy(o) => Some(*o),
                _ => None,
            })
            .collect()
    }

    pub fn position(&self, call: &Call) -> Option<usize> {
        self.calls.borrow().iter().position(|c| c == call)
    }

    /// Asserts every created object was destroyed exactly once.
    pub fn assert_balanced(&self) {
        let created = self.created();
        let destroyed = self.destroyed();
        for object in &created {
            let times = destroyed.iter().filter(|d| *d == object).count();
            assert_eq!(times, 1, "{object:?} destroyed {times} times");
        }
        assert_eq!(created.len(), destroyed.len(), "destroyed unknown objects");
    }

    fn record(&self, call: Call) {
        self.calls.borrow_mut().push(call);
    }

    fn handle<H: Handle>(&self) -> H {
        let next = self.next_handle.get() + 1;
        self.next_handle.set(next);
        H::from_raw(next)
    }

    fn trip(&self, hit: impl Fn(&FailPoint) -> bool) -> Option<FailPoint> {
        let mut fail = self.fail.borrow_mut();
        let idx = fail.iter().position(hit)?;
        Some(fail.remove(idx))
    }
}

#[derive(Clone, Debug)]
pub struct MockAdapter {
    pub device_type: vk::PhysicalDeviceType,
    /// (queue flags, can present to the surface) per family.
    pub families: Vec<(vk::QueueFlags, bool)>,
    pub formats: Vec<vk::SurfaceFormatKHR>,
    pub present_modes: Vec<vk::PresentModeKHR>,
    pub capabilities: vk::SurfaceCapabilitiesKHR,
}

impl MockAdapter {
    pub fn new(device_type: vk::PhysicalDeviceType) -> Self {
        MockAdapter {
            device_type,
            families: vec![(vk::QueueFlags::GRAPHICS, true)],
            formats: vec![bgra8_srgb()],
            present_modes: vec![vk::PresentModeKHR::FIFO],
            capabilities: capabilities(2, 0, (500, 500)),
        }
    }
}

pub fn bgra8_srgb() -> vk::SurfaceFormatKHR {
    vk::SurfaceFormatKHR {
        format: vk::Format::B8G8R8A8_SRGB,
        color_space: vk::ColorSpaceKHR::SRGB_NONLINEAR,
    }
}

pub fn capabilities(min: u32, max: u32, current: (u32, u32)) -> vk::SurfaceCapabilitiesKHR {
    vk::SurfaceCapabilitiesKHR {
        min_image_count: min,
        max_image_count: max,
        current_extent: vk::Extent2D {
            width: current.0,
            height: current.1,
        },
        min_image_extent: vk::Extent2D {
            width: 1,
            height: 1,
        },
        max_image_extent: vk::Extent2D {
            width: 4096,
            height: 4096,
        },
        current_transform: vk::SurfaceTransformFlagsKHR::IDENTITY,
        ..Default::default()
    }
}

/// A SPIR-V header word per stage; the mock never parses it.
pub fn shader_blobs() -> ShaderBlobs {
    ShaderBlobs {
        vertex: vec![0x0723_0203],
        fragment: vec![0x0723_0203],
    }
}

/// One adapter taken through selection, device and swapchain creation.
pub struct Rig {
    pub ctx: RenderContext<MockDevice>,
    pub swapchain: SwapchainState,
    pub adapter: AdapterCandidate,
    pub state: Rc<MockState>,
    pub instance: MockInstance,
}

pub fn rig(adapter: MockAdapter) -> Rig {
    let instance = MockInstance::new(vec![adapter]);
    let state = instance.state();
    let adapter = unsafe { choose_adapter(&instance) }.unwrap();
    let ctx = unsafe { create_context(&instance, &adapter) }.unwrap();
    let size = RenderSize {
        width: 500,
        height: 500,
    };
    let swapchain = unsafe { create_swapchain(&ctx, &adapter, instance.surface(), size) }.unwrap();
    Rig {
        ctx,
        swapchain,
        adapter,
        state,
        instance,
    }
}

pub struct MockInstance {
    state: Rc<MockState>,
    adapters: Vec<MockAdapter>,
    surface: vk::SurfaceKHR,
}

impl MockInstance {
    pub fn new(adapters: Vec<MockAdapter>) -> Self {
        let state = Rc::new(MockState::default());
        let surface = state.handle();
        MockInstance {
            state,
            adapters,
            surface,
        }
    }

    pub fn state(&self) -> Rc<MockState> {
        Rc::clone(&self.state)
    }

    pub fn adapter_handle(index: usize) -> vk::PhysicalDevice {
        vk::PhysicalDevice::from_raw(index as u64 + 1)
    }

    fn adapter(&self, handle: vk::PhysicalDevice) -> &MockAdapter {
        &self.adapters[(handle.as_raw() - 1) as usize]
    }
}

impl Drop for MockInstance {
    fn drop(&mut self) {
        self.state.record(Call::DestroySurface);
        self.state.record(Call::DestroyInstance);
    }
}

pub struct MockDevice {
    state: Rc<MockState>,
}

impl MockDevice {
    pub fn new(state: Rc<MockState>) -> Self {
        MockDevice { state }
    }
}

impl Drop for MockDevice {
    fn drop(&mut self) {
        self.state.record(Call::DestroyDevice);
    }
}

impl GpuInstance for MockInstance {
    type Device = MockDevice;

    fn surface(&self) -> vk::SurfaceKHR {
        self.surface
    }

    unsafe fn enumerate_adapters(&self) -> VkResult<Vec<vk::PhysicalDevice>> {
        Ok((0..self.adapters.len())
            .map(MockInstance::adapter_handle)
            .collect())
    }

    unsafe fn adapter_properties(
        &self,
        adapter: vk::PhysicalDevice,
    ) -> vk::PhysicalDeviceProperties {
        vk::PhysicalDeviceProperties {
            device_type: self.adapter(adapter).device_type,
            ..Default::default()
        }
    }

    unsafe fn adapter_features(&self, _adapter: vk::PhysicalDevice) -> vk::PhysicalDeviceFeatures {
        vk::PhysicalDeviceFeatures {
            sampler_anisotropy: vk::TRUE,
            ..Default::default()
        }
    }

    unsafe fn queue_families(
        &self,
        adapter: vk::PhysicalDevice,
    ) -> Vec<vk::QueueFamilyProperties> {
        self.adapter(adapter)
            .families
            .iter()
            .map(|&(queue_flags, _)| vk::QueueFamilyProperties {
                queue_flags,
                queue_count: 1,
                ..Default::default()
            })
            .collect()
    }

    unsafe fn surface_support(&self, adapter: vk::PhysicalDevice, family: u32) -> VkResult<bool> {
        Ok(self.adapter(adapter).families[family as usize].1)
    }

    unsafe fn surface_formats(
        &self,
        adapter: vk::PhysicalDevice,
    ) -> VkResult<Vec<vk::SurfaceFormatKHR>> {
        self.state.record(Call::SurfaceFormats(adapter));
        Ok(self.adapter(adapter).formats.clone())
    }

    unsafe fn surface_present_modes(
        &self,
        adapter: vk::PhysicalDevice,
    ) -> VkResult<Vec<vk::PresentModeKHR>> {
        Ok(self.adapter(adapter).present_modes.clone())
    }

    unsafe fn surface_capabilities(
        &self,
        adapter: vk::PhysicalDevice,
    ) -> VkResult<vk::SurfaceCapabilitiesKHR> {
        Ok(self.adapter(adapter).capabilities)
    }

    unsafe fn create_device(
        &self,
        adapter: vk::PhysicalDevice,
        info: &vk::DeviceCreateInfo<'_>,
    ) -> VkResult<MockDevice> {
        let (queue_family, queue_priority) = unsafe {
            let q = &*info.p_queue_create_infos;
            (q.queue_family_index, *q.p_queue_priorities)
        };
        self.state.record(Call::CreateDevice {
            adapter,
            queue_family,
            queue_priority,
            extensions: info.enabled_extension_count,
            features_enabled: !info.p_enabled_features.is_null(),
        });
        Ok(MockDevice::new(self.state()))
    }
}

impl GpuDevice for MockDevice {
    unsafe fn queue(&self, _family: u32, _index: u32) -> vk::Queue {
        self.state.handle()
    }

    unsafe fn device_wait_idle(&self) -> VkResult<()> {
        self.state.record(Call::DeviceWaitIdle);
        Ok(())
    }

    unsafe fn create_swapchain(
        &self,
        info: &vk::SwapchainCreateInfoKHR<'_>,
    ) -> VkResult<vk::SwapchainKHR> {
        self.state.record(Call::SwapchainInfo {
            min_image_count: info.min_image_count,
            format: info.image_format,
            color_space: info.image_color_space,
            extent: info.image_extent,
            present_mode: info.present_mode,
            pre_transform: info.pre_transform,
            sharing: info.image_sharing_mode,
            usage: info.image_usage,
            clipped: info.clipped == vk::TRUE,
        });
        self.state
            .image_count
            .set(info.min_image_count + self.state.extra_images.get());
        let swapchain = self.state.handle();
        self.state.record(Call::Create(Object::Swapchain(swapchain)));
        Ok(swapchain)
    }

    unsafe fn swapchain_images(&self, _swapchain: vk::SwapchainKHR) -> VkResult<Vec<vk::Image>> {
        Ok((0..self.state.image_count.get())
            .map(|_| self.state.handle())
            .collect())
    }

    unsafe fn destroy_swapchain(&self, swapchain: vk::SwapchainKHR) {
        self.state.record(Call::Destroy(Object::Swapchain(swapchain)));
    }

    unsafe fn create_image_view(
        &self,
        _info: &vk::ImageViewCreateInfo<'_>,
    ) -> VkResult<vk::ImageView> {
        let made = self.state.image_views.get();
        if self
            .state
            .trip(|f| *f == FailPoint::ImageView { after: made })
            .is_some()
        {
            return Err(vk::Result::ERROR_OUT_OF_HOST_MEMORY);
        }
        self.state.image_views.set(made + 1);
        let view = self.state.handle();
        self.state.record(Call::Create(Object::ImageView(view)));
        Ok(view)
    }

    unsafe fn destroy_image_view(&self, view: vk::ImageView) {
        self.state.record(Call::Destroy(Object::ImageView(view)));
    }

    unsafe fn create_render_pass(
        &self,
        info: &vk::RenderPassCreateInfo<'_>,
    ) -> VkResult<vk::RenderPass> {
        let (att, dep) = unsafe { (&*info.p_attachments, &*info.p_dependencies) };
        self.state.record(Call::RenderPassInfo {
            format: att.format,
            load_op: att.load_op,
            store_op: att.store_op,
            final_layout: att.final_layout,
            src_subpass: dep.src_subpass,
            dst_subpass: dep.dst_subpass,
            dst_access: dep.dst_access_mask,
        });
        let rp = self.state.handle();
        self.state.record(Call::Create(Object::RenderPass(rp)));
        Ok(rp)
    }

    unsafe fn destroy_render_pass(&self, render_pass: vk::RenderPass) {
        self.state.record(Call::Destroy(Object::RenderPass(render_pass)));
    }

    unsafe fn create_shader_module(&self, _code: &[u32]) -> VkResult<vk::ShaderModule> {
        let module = self.state.handle();
        self.state.record(Call::Create(Object::ShaderModule(module)));
        Ok(module)
    }

    unsafe fn destroy_shader_module(&self, module: vk::ShaderModule) {
        self.state.record(Call::Destroy(Object::ShaderModule(module)));
    }

    unsafe fn create_pipeline_layout(
        &self,
        _info: &vk::PipelineLayoutCreateInfo<'_>,
    ) -> VkResult<vk::PipelineLayout> {
        let layout = self.state.handle();
        self.state.record(Call::Create(Object::PipelineLayout(layout)));
        Ok(layout)
    }

    unsafe fn destroy_pipeline_layout(&self, layout: vk::PipelineLayout) {
        self.state.record(Call::Destroy(Object::PipelineLayout(layout)));
    }

    unsafe fn create_graphics_pipeline(
        &self,
        info: &vk::GraphicsPipelineCreateInfo<'_>,
    ) -> VkResult<vk::Pipeline> {
        let call = unsafe {
            let vp = &*(*info.p_viewport_state).p_viewports;
            let raster = &*info.p_rasterization_state;
            let blend = &*(*info.p_color_blend_state).p_attachments;
            Call::PipelineInfo {
                stages: info.stage_count,
                vertex_bindings: (*info.p_vertex_input_state).vertex_binding_description_count,
                topology: (*info.p_input_assembly_state).topology,
                viewport: vk::Extent2D {
                    width: vp.width as u32,
                    height: vp.height as u32,
                },
                cull_mode: raster.cull_mode,
                front_face: raster.front_face,
                samples: (*info.p_multisample_state).rasterization_samples,
                write_mask: blend.color_write_mask,
                blend_enable: blend.blend_enable == vk::TRUE,
            }
        };
        self.state.record(call);
        if self.state.trip(|f| *f == FailPoint::Pipeline).is_some() {
            return Err(vk::Result::ERROR_INITIALIZATION_FAILED);
        }
        let pipeline = self.state.handle();
        self.state.record(Call::Create(Object::Pipeline(pipeline)));
        Ok(pipeline)
    }

    unsafe fn destroy_pipeline(&self, pipeline: vk::Pipeline) {
        self.state.record(Call::Destroy(Object::Pipeline(pipeline)));
    }

    unsafe fn create_framebuffer(
        &self,
        _info: &vk::FramebufferCreateInfo<'_>,
    ) -> VkResult<vk::Framebuffer> {
        let fb = self.state.handle();
        self.state.record(Call::Create(Object::Framebuffer(fb)));
        Ok(fb)
    }

    unsafe fn destroy_framebuffer(&self, framebuffer: vk::Framebuffer) {
        self.state.record(Call::Destroy(Object::Framebuffer(framebuffer)));
    }

    unsafe fn create_command_pool(
        &self,
        _info: &vk::CommandPoolCreateInfo<'_>,
    ) -> VkResult<vk::CommandPool> {
        let pool = self.state.handle();
        self.state.record(Call::Create(Object::CommandPool(pool)));
        Ok(pool)
    }

    unsafe fn destroy_command_pool(&self, pool: vk::CommandPool) {
        self.state.record(Call::Destroy(Object::CommandPool(pool)));
    }

    unsafe fn allocate_command_buffers(
        &self,
        info: &vk::CommandBufferAllocateInfo<'_>,
    ) -> VkResult<Vec<vk::CommandBuffer>> {
        let bufs: Vec<vk::CommandBuffer> = (0..info.command_buffer_count)
            .map(|_| self.state.handle())
            .collect();
        self.state.record(Call::AllocateCommandBuffers(bufs.clone()));
        Ok(bufs)
    }

    unsafe fn begin_command_buffer(
        &self,
        cmd: vk::CommandBuffer,
        _info: &vk::CommandBufferBeginInfo<'_>,
    ) -> VkResult<()> {
        self.state.record(Call::BeginCommandBuffer(cmd));
        Ok(())
    }

    unsafe fn end_command_buffer(&self, cmd: vk::CommandBuffer) -> VkResult<()> {
        self.state.record(Call::EndCommandBuffer(cmd));
        Ok(())
    }

    unsafe fn cmd_begin_render_pass(
        &self,
        cmd: vk::CommandBuffer,
        info: &vk::RenderPassBeginInfo<'_>,
    ) {
        let clear = unsafe { (*info.p_clear_values).color.float32 };
        self.state.record(Call::BeginRenderPass {
            cmd,
            framebuffer: info.framebuffer,
            extent: info.render_area.extent,
            clear,
        });
    }

    unsafe fn cmd_bind_graphics_pipeline(&self, cmd: vk::CommandBuffer, pipeline: vk::Pipeline) {
        self.state.record(Call::BindPipeline { cmd, pipeline });
    }

    unsafe fn cmd_draw(
        &self,
        cmd: vk::CommandBuffer,
        vertex_count: u32,
        instance_count: u32,
        _first_vertex: u32,
        _first_instance: u32,
    ) {
        self.state.record(Call::Draw {
            cmd,
            vertices: vertex_count,
            instances: instance_count,
        });
    }

    unsafe fn cmd_end_render_pass(&self, cmd: vk::CommandBuffer) {
        self.state.record(Call::EndRenderPass(cmd));
    }

    unsafe fn create_semaphore(&self) -> VkResult<vk::Semaphore> {
        let sem = self.state.handle();
        self.state.record(Call::Create(Object::Semaphore(sem)));
        Ok(sem)
    }

    unsafe fn destroy_semaphore(&self, semaphore: vk::Semaphore) {
        self.state.record(Call::Destroy(Object::Semaphore(semaphore)));
    }

    unsafe fn create_fence(&self, signaled: bool) -> VkResult<vk::Fence> {
        if self.state.trip(|f| *f == FailPoint::Fence).is_some() {
            return Err(vk::Result::ERROR_OUT_OF_DEVICE_MEMORY);
        }
        let fence = self.state.handle();
        self.state.record(Call::CreateFence { fence, signaled });
        Ok(fence)
    }

    unsafe fn destroy_fence(&self, fence: vk::Fence) {
        self.state.record(Call::Destroy(Object::Fence(fence)));
    }

    unsafe fn wait_for_fences(&self, fences: &[vk::Fence], _timeout: u64) -> VkResult<()> {
        self.state.record(Call::WaitForFences(fences.to_vec()));
        match self.state.trip(|f| matches!(f, FailPoint::WaitFence(_))) {
            Some(FailPoint::WaitFence(r)) => Err(r),
            _ => Ok(()),
        }
    }

    unsafe fn reset_fences(&self, fences: &[vk::Fence]) -> VkResult<()> {
        self.state.record(Call::ResetFences(fences.to_vec()));
        Ok(())
    }

    unsafe fn acquire_next_image(
        &self,
        _swapchain: vk::SwapchainKHR,
        timeout: u64,
        signal: vk::Semaphore,
    ) -> VkResult<(u32, bool)> {
        if let Some(FailPoint::Acquire(r)) = self.state.trip(|f| matches!(f, FailPoint::Acquire(_)))
        {
            return Err(r);
        }
        let image = match self.state.acquire_script.borrow_mut().pop_front() {
            Some(image) => image,
            None => {
                let next = self.state.next_image.get();
                self.state
                    .next_image
                    .set((next + 1) % self.state.image_count.get().max(1));
                next
            }
        };
        self.state.record(Call::Acquire {
            signal,
            image,
            timeout,
        });
        Ok((image, false))
    }

    unsafe fn queue_submit(
        &self,
        _queue: vk::Queue,
        submit: &vk::SubmitInfo<'_>,
        fence: vk::Fence,
    ) -> VkResult<()> {
        let call = unsafe {
            Call::Submit {
                cmd: *submit.p_command_buffers,
                wait: *submit.p_wait_semaphores,
                wait_stage: *submit.p_wait_dst_stage_mask,
                signal: *submit.p_signal_semaphores,
                fence,
            }
        };
        self.state.record(call);
        Ok(())
    }

    unsafe fn queue_present(
        &self,
        _queue: vk::Queue,
        present: &vk::PresentInfoKHR<'_>,
    ) -> VkResult<bool> {
        let call = unsafe {
            Call::Present {
                image: *present.p_image_indices,
                wait: *present.p_wait_semaphores,
            }
        };
        self.state.record(call);
        match self
            .state
            .trip(|f| matches!(f, FailPoint::Present(_) | FailPoint::PresentSuboptimal))
        {
            Some(FailPoint::Present(r)) => Err(r),
            Some(_) => Ok(true),
            None => Ok(false),
        }
    }
}
