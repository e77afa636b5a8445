// Host capability check
//
// Debug printf needs the Khronos validation layer plus both debug
// extensions. Everything is verified up front, before an instance exists.

use anyhow::{Context, Result};
use ash::Entry;
use std::ffi::CStr;

/// Layers enabled on the instance
pub const REQUIRED_LAYERS: &[&CStr] = &[c"VK_LAYER_KHRONOS_validation"];

/// VK_EXT_debug_utils feeds the messenger, VK_EXT_debug_report the report callback
pub const REQUIRED_EXTENSIONS: &[&CStr] = &[c"VK_EXT_debug_utils", c"VK_EXT_debug_report"];

/// Outcome of checking the host against the required names
#[derive(Debug, Default)]
pub struct CapabilityReport {
    pub missing_layers: Vec<&'static CStr>,
    pub missing_extensions: Vec<&'static CStr>,
}

impl CapabilityReport {
    pub fn is_satisfied(&self) -> bool {
        self.missing_layers.is_empty() && self.missing_extensions.is_empty()
    }
}

/// Names from `required` that do not appear in `available`, in required order
pub fn missing_names<'a>(required: &[&'a CStr], available: &[&CStr]) -> Vec<&'a CStr> {
    required
        .iter()
        .copied()
        .filter(|name| !available.iter().any(|candidate| candidate == name))
        .collect()
}

/// Enumerate instance layers and extensions and compare them against the
/// required lists.
pub fn verify(entry: &Entry) -> Result<CapabilityReport> {
    let layers = entry
        .enumerate_instance_layer_properties()
        .context("Failed to enumerate instance layers")?;
    let extensions = entry
        .enumerate_instance_extension_properties(None)
        .context("Failed to enumerate instance extensions")?;

    // Driver-provided names are NUL-terminated fixed arrays
    let layer_names: Vec<&CStr> = layers
        .iter()
        .map(|props| unsafe { CStr::from_ptr(props.layer_name.as_ptr()) })
        .collect();
    let extension_names: Vec<&CStr> = extensions
        .iter()
        .map(|props| unsafe { CStr::from_ptr(props.extension_name.as_ptr()) })
        .collect();

    log::debug!(
        "Host exposes {} layers and {} instance extensions",
        layer_names.len(),
        extension_names.len()
    );

    Ok(CapabilityReport {
        missing_layers: missing_names(REQUIRED_LAYERS, &layer_names),
        missing_extensions: missing_names(REQUIRED_EXTENSIONS, &extension_names),
    })
}
