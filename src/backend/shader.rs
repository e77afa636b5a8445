// Shader module loading
//
// Vulkan consumes SPIR-V as 32-bit words. Shaders here are precompiled by
// build.rs and read from disk at runtime.

use anyhow::{Context, Result};
use ash::vk;
use std::fs::File;
use std::path::Path;

/// Read a SPIR-V binary as words. A missing file is an error, never an
/// empty module.
pub fn load_spirv<P: AsRef<Path>>(path: P) -> Result<Vec<u32>> {
    let path = path.as_ref();
    let mut file =
        File::open(path).with_context(|| format!("Failed to open shader file: {:?}", path))?;

    // read_spv handles alignment and rejects lengths that are not whole words
    let code = ash::util::read_spv(&mut file)
        .with_context(|| format!("Failed to read SPIR-V from {:?}", path))?;

    log::debug!("Loaded {} SPIR-V words from {:?}", code.len(), path);
    Ok(code)
}

/// Create a shader module from SPIR-V words
pub fn create_shader_module(device: &ash::Device, code: &[u32]) -> Result<vk::ShaderModule> {
    let create_info = vk::ShaderModuleCreateInfo::builder().code(code);

    unsafe {
        device
            .create_shader_module(&create_info, None)
            .context("Failed to create shader module")
    }
}
