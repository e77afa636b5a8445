// Compute pipeline creation
//
// The debug printf shaders bind no resources, so the layout is empty: no
// descriptor sets, no push constants.

use anyhow::{Context, Result};
use ash::vk;

/// Create an empty pipeline layout
pub fn create_pipeline_layout(device: &ash::Device) -> Result<vk::PipelineLayout> {
    let layout_info = vk::PipelineLayoutCreateInfo::builder();

    unsafe {
        device
            .create_pipeline_layout(&layout_info, None)
            .context("Failed to create pipeline layout")
    }
}

/// Create a compute pipeline running `main` from the given module
pub fn create_compute_pipeline(
    device: &ash::Device,
    shader: vk::ShaderModule,
    layout: vk::PipelineLayout,
) -> Result<vk::Pipeline> {
    let stage = vk::PipelineShaderStageCreateInfo::builder()
        .stage(vk::ShaderStageFlags::COMPUTE)
        .module(shader)
        .name(c"main")
        .build();

    let pipeline_info = vk::ComputePipelineCreateInfo::builder()
        .stage(stage)
        .layout(layout)
        .build();

    let pipelines = unsafe {
        device
            .create_compute_pipelines(vk::PipelineCache::null(), &[pipeline_info], None)
            .map_err(|(_, e)| e)
            .context("Failed to create compute pipeline")?
    };

    Ok(pipelines[0])
}
