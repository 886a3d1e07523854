// SPDX-License-Identifier: CEPL-1.0
use ash::vk;
use std::ffi::CStr;
use tracing::{debug, info};

use crate::error::{RenderError, RenderResult, VkResultExt};
use crate::gpu::GpuInstance;

/// Surface support on one adapter, snapshotted when the adapter is probed.
#[derive(Clone, Debug, Default)]
pub struct SurfaceDetails {
    pub formats: Vec<vk::SurfaceFormatKHR>,
    pub present_modes: Vec<vk::PresentModeKHR>,
    pub capabilities: vk::SurfaceCapabilitiesKHR,
}

/// An adapter able to render and present to the session surface.
#[derive(Clone, Debug)]
pub struct AdapterCandidate {
    pub physical_device: vk::PhysicalDevice,
    pub queue_family: u32,
    pub device_type: vk::PhysicalDeviceType,
    pub name: String,
    pub surface: SurfaceDetails,
}

/// Picks the adapter the session renders with.
///
/// The first discrete GPU wins and stops the scan. Without one, the first
/// usable adapter in enumeration order is returned.
///
/// # Safety
/// `instance` must own a live surface.
pub unsafe fn choose_adapter<I: GpuInstance>(instance: &I) -> RenderResult<AdapterCandidate> {
    let adapters = unsafe { instance.enumerate_adapters() }.during("vkEnumeratePhysicalDevices")?;
    debug!("{} adapter(s) enumerated", adapters.len());

    let probes = adapters
        .into_iter()
        .filter_map(|pd| unsafe { probe(instance, pd) }.transpose());
    let chosen = pick_candidate(probes)?;

    info!(
        "adapter: {:?} {:?} (queue family {})",
        chosen.name, chosen.device_type, chosen.queue_family
    );
    Ok(chosen)
}

/// Selection policy over already-probed candidates, consumed lazily so a
/// discrete match leaves the remaining adapters unprobed.
pub fn pick_candidate(
    probes: impl IntoIterator<Item = RenderResult<AdapterCandidate>>,
) -> RenderResult<AdapterCandidate> {
    let mut fallback = None;
    for probe in probes {
        let candidate = probe?;
        if candidate.device_type == vk::PhysicalDeviceType::DISCRETE_GPU {
            return Ok(candidate);
        }
        fallback.get_or_insert(candidate);
    }
    fallback.ok_or(RenderError::NoSuitableDevice)
}

unsafe fn probe<I: GpuInstance>(
    instance: &I,
    pd: vk::PhysicalDevice,
) -> RenderResult<Option<AdapterCandidate>> {
    let formats =
        unsafe { instance.surface_formats(pd) }.during("vkGetPhysicalDeviceSurfaceFormatsKHR")?;
    let present_modes = unsafe { instance.surface_present_modes(pd) }
        .during("vkGetPhysicalDeviceSurfacePresentModesKHR")?;
    if formats.is_empty() || present_modes.is_empty() {
        debug!("adapter {pd:?}: no surface formats or present modes, skipped");
        return Ok(None);
    }
    let capabilities = unsafe { instance.surface_capabilities(pd) }
        .during("vkGetPhysicalDeviceSurfaceCapabilitiesKHR")?;

    let Some(queue_family) = (unsafe { find_queue_family(instance, pd) })? else {
        debug!("adapter {pd:?}: no graphics family can present, skipped");
        return Ok(None);
    };

    let props = unsafe { instance.adapter_properties(pd) };
    let name = unsafe { CStr::from_ptr(props.device_name.as_ptr()) }
        .to_string_lossy()
        .into_owned();

    Ok(Some(AdapterCandidate {
        physical_device: pd,
        queue_family,
        device_type: props.device_type,
        name,
        surface: SurfaceDetails {
            formats,
            present_modes,
            capabilities,
        },
    }))
}

// First family with graphics that can also present.
unsafe fn find_queue_family<I: GpuInstance>(
    instance: &I,
    pd: vk::PhysicalDevice,
) -> RenderResult<Option<u32>> {
    let families = unsafe { instance.queue_families(pd) };
    for (index, family) in families.iter().enumerate() {
        let index = index as u32;
        if !family.queue_flags.contains(vk::QueueFlags::GRAPHICS) {
            continue;
        }
        if unsafe { instance.surface_support(pd, index) }
            .during("vkGetPhysicalDeviceSurfaceSupportKHR")?
        {
            return Ok(Some(index));
        }
    }
    Ok(None)
}
