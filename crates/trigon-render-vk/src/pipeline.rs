// SPDX-License-Identifier: CEPL-1.0
use ash::vk;
use tracing::{debug, info};

use crate::error::{RenderError, RenderResult, VkResultExt};
use crate::gpu::GpuDevice;
use crate::shader::ShaderBlobs;
use crate::swapchain::SwapchainState;

const ENTRY_POINT: &std::ffi::CStr = c"main";

/// Render pass, the fixed triangle pipeline and one framebuffer per image view.
#[derive(Debug, Default)]
pub struct PipelineState {
    pub render_pass: vk::RenderPass,
    pub layout: vk::PipelineLayout,
    pub pipeline: vk::Pipeline,
    pub framebuffers: Vec<vk::Framebuffer>,
}

/// Builds everything needed to draw into the swapchain images.
///
/// Shader modules only live for the duration of this call.
///
/// # Safety
/// `swapchain` must have been created on `device`.
pub unsafe fn create_pipeline<D: GpuDevice>(
    device: &D,
    swapchain: &SwapchainState,
    shaders: &ShaderBlobs,
) -> RenderResult<PipelineState> {
    let mut state = PipelineState::default();
    match unsafe { state.build(device, swapchain, shaders) } {
        Ok(()) => {
            info!(
                "pipeline ready ({} framebuffers)",
                state.framebuffers.len()
            );
            Ok(state)
        }
        Err(e) => {
            unsafe { state.release(device) };
            Err(e)
        }
    }
}

impl PipelineState {
    unsafe fn build<D: GpuDevice>(
        &mut self,
        device: &D,
        swapchain: &SwapchainState,
        shaders: &ShaderBlobs,
    ) -> RenderResult<()> {
        self.render_pass = unsafe { create_render_pass(device, swapchain.format.format) }?;
        self.layout = unsafe { device.create_pipeline_layout(&vk::PipelineLayoutCreateInfo::default()) }
            .during("vkCreatePipelineLayout")?;

        let vert = unsafe { device.create_shader_module(&shaders.vertex) }
            .during("vkCreateShaderModule")?;
        let frag = match unsafe { device.create_shader_module(&shaders.fragment) } {
            Ok(frag) => frag,
            Err(e) => {
                unsafe { device.destroy_shader_module(vert) };
                return Err(RenderError::Vulkan {
                    call: "vkCreateShaderModule",
                    result: e,
                });
            }
        };
        let pipeline = unsafe {
            create_graphics_pipeline(device, self.render_pass, self.layout, swapchain.extent, vert, frag)
        };
        unsafe {
            device.destroy_shader_module(vert);
            device.destroy_shader_module(frag);
        }
        self.pipeline = pipeline.during("vkCreateGraphicsPipelines")?;

        for &view in &swapchain.image_views {
            let attachments = [view];
            let info = vk::FramebufferCreateInfo::default()
                .render_pass(self.render_pass)
                .attachments(&attachments)
                .width(swapchain.extent.width)
                .height(swapchain.extent.height)
                .layers(1);
            let fb = unsafe { device.create_framebuffer(&info) }.during("vkCreateFramebuffer")?;
            self.framebuffers.push(fb);
        }
        Ok(())
    }

    /// Destroys framebuffers, pipeline, layout and render pass in that order.
    /// Null handles are skipped.
    ///
    /// # Safety
    /// No submitted work may still reference these objects.
    pub unsafe fn release<D: GpuDevice>(&mut self, device: &D) {
        for fb in self.framebuffers.drain(..) {
            unsafe { device.destroy_framebuffer(fb) };
        }
        let this = std::mem::take(self);
        unsafe {
            if this.pipeline != vk::Pipeline::null() {
                device.destroy_pipeline(this.pipeline);
            }
            if this.layout != vk::PipelineLayout::null() {
                device.destroy_pipeline_layout(this.layout);
            }
            if this.render_pass != vk::RenderPass::null() {
                device.destroy_render_pass(this.render_pass);
            }
        }
        debug!("pipeline released");
    }
}

unsafe fn create_render_pass<D: GpuDevice>(
    device: &D,
    format: vk::Format,
) -> RenderResult<vk::RenderPass> {
    // Image contents are not carried over from the previous frame.
    let attachments = [vk::AttachmentDescription::default()
        .format(format)
        .samples(vk::SampleCountFlags::TYPE_1)
        .load_op(vk::AttachmentLoadOp::DONT_CARE)
        .store_op(vk::AttachmentStoreOp::STORE)
        .stencil_load_op(vk::AttachmentLoadOp::DONT_CARE)
        .stencil_store_op(vk::AttachmentStoreOp::DONT_CARE)
        .initial_layout(vk::ImageLayout::UNDEFINED)
        .final_layout(vk::ImageLayout::PRESENT_SRC_KHR)];
    let color_refs = [vk::AttachmentReference {
        attachment: 0,
        layout: vk::ImageLayout::COLOR_ATTACHMENT_OPTIMAL,
    }];
    let subpasses = [vk::SubpassDescription::default()
        .pipeline_bind_point(vk::PipelineBindPoint::GRAPHICS)
        .color_attachments(&color_refs)];
    // Hold off color writes until the acquired image is actually available.
    let dependencies = [vk::SubpassDependency::default()
        .src_subpass(vk::SUBPASS_EXTERNAL)
        .dst_subpass(0)
        .src_stage_mask(vk::PipelineStageFlags::COLOR_ATTACHMENT_OUTPUT)
        .src_access_mask(vk::AccessFlags::empty())
        .dst_stage_mask(vk::PipelineStageFlags::COLOR_ATTACHMENT_OUTPUT)
        .dst_access_mask(vk::AccessFlags::COLOR_ATTACHMENT_WRITE)];

    let info = vk::RenderPassCreateInfo::default()
        .attachments(&attachments)
        .subpasses(&subpasses)
        .dependencies(&dependencies);
    unsafe { device.create_render_pass(&info) }.during("vkCreateRenderPass")
}

unsafe fn create_graphics_pipeline<D: GpuDevice>(
    device: &D,
    render_pass: vk::RenderPass,
    layout: vk::PipelineLayout,
    extent: vk::Extent2D,
    vert: vk::ShaderModule,
    frag: vk::ShaderModule,
) -> ash::prelude::VkResult<vk::Pipeline> {
    let stages = [
        vk::PipelineShaderStageCreateInfo::default()
            .stage(vk::ShaderStageFlags::VERTEX)
            .module(vert)
            .name(ENTRY_POINT),
        vk::PipelineShaderStageCreateInfo::default()
            .stage(vk::ShaderStageFlags::FRAGMENT)
            .module(frag)
            .name(ENTRY_POINT),
    ];

    // Triangle vertices live in the vertex shader.
    let vertex_input = vk::PipelineVertexInputStateCreateInfo::default();
    let input_assembly = vk::PipelineInputAssemblyStateCreateInfo::default()
        .topology(vk::PrimitiveTopology::TRIANGLE_LIST);

    let viewports = [vk::Viewport {
        x: 0.0,
        y: 0.0,
        width: extent.width as f32,
        height: extent.height as f32,
        min_depth: 0.0,
        max_depth: 1.0,
    }];
    let scissors = [vk::Rect2D {
        offset: vk::Offset2D { x: 0, y: 0 },
        extent,
    }];
    let viewport_state = vk::PipelineViewportStateCreateInfo::default()
        .viewports(&viewports)
        .scissors(&scissors);

    let raster = vk::PipelineRasterizationStateCreateInfo::default()
        .polygon_mode(vk::PolygonMode::FILL)
        .cull_mode(vk::CullModeFlags::BACK)
        .front_face(vk::FrontFace::CLOCKWISE)
        .line_width(1.0);
    let multisample = vk::PipelineMultisampleStateCreateInfo::default()
        .rasterization_samples(vk::SampleCountFlags::TYPE_1)
        .min_sample_shading(1.0);

    let blend_attachments = [vk::PipelineColorBlendAttachmentState::default()
        .color_write_mask(vk::ColorComponentFlags::RGBA)
        .blend_enable(false)];
    let color_blend =
        vk::PipelineColorBlendStateCreateInfo::default().attachments(&blend_attachments);

    let info = vk::GraphicsPipelineCreateInfo::default()
        .stages(&stages)
        .vertex_input_state(&vertex_input)
        .input_assembly_state(&input_assembly)
        .viewport_state(&viewport_state)
        .rasterization_state(&raster)
        .multisample_state(&multisample)
        .color_blend_state(&color_blend)
        .layout(layout)
        .render_pass(render_pass)
        .subpass(0);

    unsafe { device.create_graphics_pipeline(&info) }
}
