// Vulkan Instance - headless, validation enabled
//
// Responsibilities:
// - Instance creation with the validation layer and debug printf enabled
// - Debug utils messenger + debug report callback registration
// - Teardown of both sinks before the instance itself

use anyhow::{Context, Result};
use ash::extensions::ext::{DebugReport, DebugUtils};
use ash::{vk, Entry};
use std::ffi::{CStr, CString};

use super::capabilities::{REQUIRED_EXTENSIONS, REQUIRED_LAYERS};
use super::debug::{self, MessageFilter};

/// Vulkan instance wrapper with automatic cleanup
pub struct VulkanInstance {
    pub instance: ash::Instance,
    _entry: Entry,

    // Extension loaders resolve their entry points through vkGetInstanceProcAddr
    debug_utils: DebugUtils,
    messenger: vk::DebugUtilsMessengerEXT,
    debug_report: DebugReport,
    report_callback: vk::DebugReportCallbackEXT,

    // Read by the callbacks through p_user_data; boxed so the address is stable
    _filter: Box<MessageFilter>,
}

impl VulkanInstance {
    /// Create the instance and register both debug sinks.
    ///
    /// The caller has already verified that every required layer and
    /// extension is present on the host.
    pub fn new(entry: Entry, app_name: &str, filter: MessageFilter) -> Result<Self> {
        log::info!("Creating headless Vulkan instance: {}", app_name);

        let instance = Self::create_instance(&entry, app_name)?;
        let filter = Box::new(filter);

        let debug_utils = DebugUtils::new(&entry, &instance);
        let messenger = match unsafe {
            debug_utils.create_debug_utils_messenger(&debug::messenger_create_info(&filter), None)
        } {
            Ok(messenger) => messenger,
            Err(e) => {
                unsafe { instance.destroy_instance(None) };
                return Err(e).context("Failed to create debug utils messenger");
            }
        };

        let debug_report = DebugReport::new(&entry, &instance);
        let report_callback = match unsafe {
            debug_report.create_debug_report_callback(&debug::report_create_info(&filter), None)
        } {
            Ok(callback) => callback,
            Err(e) => {
                unsafe {
                    debug_utils.destroy_debug_utils_messenger(messenger, None);
                    instance.destroy_instance(None);
                }
                return Err(e).context("Failed to create debug report callback");
            }
        };

        log::debug!("Debug messenger and report callback registered");

        Ok(Self {
            instance,
            _entry: entry,
            debug_utils,
            messenger,
            debug_report,
            report_callback,
            _filter: filter,
        })
    }

    fn create_instance(entry: &Entry, app_name: &str) -> Result<ash::Instance> {
        let app_name_cstr = CString::new(app_name)?;
        let engine_name = CString::new("")?;

        let app_info = vk::ApplicationInfo::builder()
            .application_name(&app_name_cstr)
            .application_version(0)
            .engine_name(&engine_name)
            .engine_version(0)
            .api_version(vk::API_VERSION_1_3);

        // No surface extensions, this instance never presents
        let extensions: Vec<_> = REQUIRED_EXTENSIONS.iter().map(|name| name.as_ptr()).collect();
        let layer_names: Vec<_> = REQUIRED_LAYERS.iter().map(|name| name.as_ptr()).collect();

        // Debug printf is a validation feature, off unless chained in here
        let enabled_features = [vk::ValidationFeatureEnableEXT::DEBUG_PRINTF];
        let mut validation_features =
            vk::ValidationFeaturesEXT::builder().enabled_validation_features(&enabled_features);

        let create_info = vk::InstanceCreateInfo::builder()
            .application_info(&app_info)
            .enabled_extension_names(&extensions)
            .enabled_layer_names(&layer_names)
            .push_next(&mut validation_features);

        let instance = unsafe { entry.create_instance(&create_info, None) }
            .context("Failed to create Vulkan instance")?;

        Ok(instance)
    }

    /// First enumerated physical device
    pub fn first_physical_device(&self) -> Result<vk::PhysicalDevice> {
        let devices = unsafe { self.instance.enumerate_physical_devices() }
            .context("Failed to enumerate physical devices")?;

        log::debug!("Found {} physical device(s)", devices.len());

        let Some(&physical_device) = devices.first() else {
            anyhow::bail!("No Vulkan-capable GPU found");
        };

        let properties = unsafe { self.instance.get_physical_device_properties(physical_device) };
        log::info!(
            "Selected GPU: {}",
            unsafe { CStr::from_ptr(properties.device_name.as_ptr()) }.to_string_lossy()
        );
        log::info!(
            "API Version: {}.{}.{}",
            vk::api_version_major(properties.api_version),
            vk::api_version_minor(properties.api_version),
            vk::api_version_patch(properties.api_version)
        );

        Ok(physical_device)
    }
}

impl Drop for VulkanInstance {
    fn drop(&mut self) {
        log::info!("Destroying Vulkan instance...");

        unsafe {
            self.debug_utils.destroy_debug_utils_messenger(self.messenger, None);
            self.debug_report.destroy_debug_report_callback(self.report_callback, None);
            self.instance.destroy_instance(None);
        }
    }
}
