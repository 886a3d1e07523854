// SPDX-License-Identifier: CEPL-1.0
use ash::vk;
use tracing::{debug, info};
use trigon_render::RenderSize;

use crate::context::RenderContext;
use crate::error::{RenderError, RenderResult, VkResultExt};
use crate::gpu::GpuDevice;
use crate::selector::AdapterCandidate;

/// `current_extent` value meaning the surface size follows the swapchain.
pub const UNDEFINED_EXTENT: u32 = u32::MAX;

/// Swapchain, its images and one color view per image.
#[derive(Debug, Default)]
pub struct SwapchainState {
    pub format: vk::SurfaceFormatKHR,
    pub extent: vk::Extent2D,
    /// Image count requested at creation; also the number of frame slots.
    pub image_count: u32,
    pub present_mode: vk::PresentModeKHR,
    pub swapchain: vk::SwapchainKHR,
    pub images: Vec<vk::Image>,
    pub image_views: Vec<vk::ImageView>,
}

pub fn choose_surface_format(formats: &[vk::SurfaceFormatKHR]) -> Option<vk::SurfaceFormatKHR> {
    formats
        .iter()
        .copied()
        .find(|f| {
            f.format == vk::Format::B8G8R8A8_SRGB
                && f.color_space == vk::ColorSpaceKHR::SRGB_NONLINEAR
        })
        .or_else(|| formats.first().copied())
}

/// One above the minimum, capped by the maximum when there is one.
pub fn choose_image_count(caps: &vk::SurfaceCapabilitiesKHR) -> u32 {
    let wanted = caps.min_image_count + 1;
    if caps.max_image_count == 0 {
        wanted
    } else {
        wanted.min(caps.max_image_count)
    }
}

pub fn choose_extent(caps: &vk::SurfaceCapabilitiesKHR, framebuffer: RenderSize) -> vk::Extent2D {
    if caps.current_extent.width != UNDEFINED_EXTENT {
        return caps.current_extent;
    }
    vk::Extent2D {
        width: framebuffer
            .width
            .clamp(caps.min_image_extent.width, caps.max_image_extent.width),
        height: framebuffer
            .height
            .clamp(caps.min_image_extent.height, caps.max_image_extent.height),
    }
}

/// Mailbox over immediate over fifo, regardless of the order modes are listed in.
pub fn choose_present_mode(modes: &[vk::PresentModeKHR]) -> vk::PresentModeKHR {
    [vk::PresentModeKHR::MAILBOX, vk::PresentModeKHR::IMMEDIATE]
        .into_iter()
        .find(|wanted| modes.contains(wanted))
        .unwrap_or(vk::PresentModeKHR::FIFO)
}

/// Creates the swapchain for `surface` and a view for every image it hands back.
///
/// On failure everything created so far is destroyed again.
///
/// # Safety
/// `surface` must belong to the instance `ctx` was created from.
pub unsafe fn create_swapchain<D: GpuDevice>(
    ctx: &RenderContext<D>,
    adapter: &AdapterCandidate,
    surface: vk::SurfaceKHR,
    framebuffer: RenderSize,
) -> RenderResult<SwapchainState> {
    let caps = &adapter.surface.capabilities;
    let format =
        choose_surface_format(&adapter.surface.formats).ok_or(RenderError::NoSuitableDevice)?;
    let image_count = choose_image_count(caps);
    let extent = choose_extent(caps, framebuffer);
    let present_mode = choose_present_mode(&adapter.surface.present_modes);

    let info = vk::SwapchainCreateInfoKHR::default()
        .surface(surface)
        .min_image_count(image_count)
        .image_format(format.format)
        .image_color_space(format.color_space)
        .image_extent(extent)
        .image_array_layers(1)
        .image_usage(vk::ImageUsageFlags::COLOR_ATTACHMENT)
        .image_sharing_mode(vk::SharingMode::EXCLUSIVE)
        .pre_transform(caps.current_transform)
        .composite_alpha(vk::CompositeAlphaFlagsKHR::OPAQUE)
        .present_mode(present_mode)
        .clipped(true);

    let swapchain = unsafe { ctx.device.create_swapchain(&info) }.during("vkCreateSwapchainKHR")?;
    let mut state = SwapchainState {
        format,
        extent,
        image_count,
        present_mode,
        swapchain,
        ..Default::default()
    };
    if let Err(e) = unsafe { state.create_views(&ctx.device) } {
        unsafe { state.release(&ctx.device) };
        return Err(e);
    }

    info!(
        "swapchain: {}x{} {:?}/{:?} {:?}, {} images",
        extent.width,
        extent.height,
        format.format,
        format.color_space,
        present_mode,
        state.images.len()
    );
    Ok(state)
}

impl SwapchainState {
    unsafe fn create_views<D: GpuDevice>(&mut self, device: &D) -> RenderResult<()> {
        self.images =
            unsafe { device.swapchain_images(self.swapchain) }.during("vkGetSwapchainImagesKHR")?;
        for &image in &self.images {
            let info = vk::ImageViewCreateInfo::default()
                .image(image)
                .view_type(vk::ImageViewType::TYPE_2D)
                .format(self.format.format)
                .subresource_range(vk::ImageSubresourceRange {
                    aspect_mask: vk::ImageAspectFlags::COLOR,
                    base_mip_level: 0,
                    level_count: 1,
                    base_array_layer: 0,
                    layer_count: 1,
                });
            let view = unsafe { device.create_image_view(&info) }.during("vkCreateImageView")?;
            self.image_views.push(view);
        }
        Ok(())
    }

    /// Destroys the views, then the swapchain. Safe to call on a partially
    /// built or already released state.
    ///
    /// # Safety
    /// The GPU must be done with every image.
    pub unsafe fn release<D: GpuDevice>(&mut self, device: &D) {
        for view in self.image_views.drain(..) {
            unsafe { device.destroy_image_view(view) };
        }
        if self.swapchain != vk::SwapchainKHR::null() {
            unsafe { device.destroy_swapchain(self.swapchain) };
            self.swapchain = vk::SwapchainKHR::null();
        }
        self.images.clear();
        debug!("swapchain released");
    }
}
