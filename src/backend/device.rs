// Vulkan Device - compute-only GPU interface
//
// Responsibilities:
// - Compute queue family selection (prefer a dedicated compute family)
// - Logical device + single queue creation

use anyhow::{Context, Result};
use ash::vk;

use super::VulkanInstance;

/// Pick a queue family for compute work.
///
/// Transfer and sparse binding bits are ignored. The first family with
/// compute but without graphics wins; failing that, the first family with
/// compute at all.
pub fn select_compute_queue_family(families: &[vk::QueueFlags]) -> Option<u32> {
    let masked = |flags: vk::QueueFlags| {
        flags & !(vk::QueueFlags::TRANSFER | vk::QueueFlags::SPARSE_BINDING)
    };

    let dedicated = families.iter().position(|&flags| {
        let flags = masked(flags);
        flags.contains(vk::QueueFlags::COMPUTE) && !flags.contains(vk::QueueFlags::GRAPHICS)
    });

    dedicated
        .or_else(|| {
            families
                .iter()
                .position(|&flags| masked(flags).contains(vk::QueueFlags::COMPUTE))
        })
        .map(|index| index as u32)
}

/// Logical device with one compute queue, destroyed on drop
pub struct ComputeDevice {
    pub device: ash::Device,
    pub queue: vk::Queue,
    pub queue_family: u32,
}

impl ComputeDevice {
    pub fn new(instance: &VulkanInstance, physical_device: vk::PhysicalDevice) -> Result<Self> {
        let families = unsafe {
            instance
                .instance
                .get_physical_device_queue_family_properties(physical_device)
        };
        let flags: Vec<vk::QueueFlags> = families.iter().map(|props| props.queue_flags).collect();

        let queue_family = select_compute_queue_family(&flags).ok_or_else(|| {
            anyhow::anyhow!(
                "No compute-capable queue family ({}): {:?}",
                vk::Result::ERROR_INITIALIZATION_FAILED,
                flags
            )
        })?;
        log::info!("Using queue family {} ({:?})", queue_family, flags[queue_family as usize]);

        let queue_priorities = [1.0];
        let queue_create_info = vk::DeviceQueueCreateInfo::builder()
            .queue_family_index(queue_family)
            .queue_priorities(&queue_priorities)
            .build();

        let create_info = vk::DeviceCreateInfo::builder()
            .queue_create_infos(std::slice::from_ref(&queue_create_info));

        let device = unsafe {
            instance
                .instance
                .create_device(physical_device, &create_info, None)
        }
        .context("Failed to create logical device")?;

        let queue = unsafe { device.get_device_queue(queue_family, 0) };

        Ok(Self {
            device,
            queue,
            queue_family,
        })
    }
}

impl Drop for ComputeDevice {
    fn drop(&mut self) {
        log::info!("Destroying Vulkan device...");

        unsafe {
            // Nothing useful to do with a lost device at this point
            let _ = self.device.device_wait_idle();
            self.device.destroy_device(None);
        }
    }
}
