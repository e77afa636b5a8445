// One-shot compute dispatch
//
// Builds every object a single dispatch needs, records one command buffer,
// submits it and blocks until the queue is idle. Objects are released in
// reverse creation order on drop, including when a step fails part way.

use anyhow::{Context, Result};
use ash::vk;

use super::{pipeline, shader, ComputeDevice};

/// Handles owned by one shader run. Null handles are skipped on drop.
struct DispatchResources<'a> {
    device: &'a ash::Device,
    shader_module: vk::ShaderModule,
    pipeline_layout: vk::PipelineLayout,
    pipeline: vk::Pipeline,
    command_pool: vk::CommandPool,
    command_buffer: vk::CommandBuffer,
}

impl<'a> DispatchResources<'a> {
    fn new(device: &'a ash::Device) -> Self {
        Self {
            device,
            shader_module: vk::ShaderModule::null(),
            pipeline_layout: vk::PipelineLayout::null(),
            pipeline: vk::Pipeline::null(),
            command_pool: vk::CommandPool::null(),
            command_buffer: vk::CommandBuffer::null(),
        }
    }
}

impl Drop for DispatchResources<'_> {
    fn drop(&mut self) {
        unsafe {
            if self.command_buffer != vk::CommandBuffer::null() {
                self.device
                    .free_command_buffers(self.command_pool, &[self.command_buffer]);
            }
            if self.command_pool != vk::CommandPool::null() {
                self.device.destroy_command_pool(self.command_pool, None);
            }
            if self.pipeline != vk::Pipeline::null() {
                self.device.destroy_pipeline(self.pipeline, None);
            }
            if self.pipeline_layout != vk::PipelineLayout::null() {
                self.device.destroy_pipeline_layout(self.pipeline_layout, None);
            }
            if self.shader_module != vk::ShaderModule::null() {
                self.device.destroy_shader_module(self.shader_module, None);
            }
        }
    }
}

/// Run `code` as a compute shader over `group_count_x` workgroups and wait
/// for it to finish.
///
/// Only suitable for shaders that bind no resources.
pub fn run_compute_shader(device: &ComputeDevice, code: &[u32], group_count_x: u32) -> Result<()> {
    let vk_device = &device.device;
    let mut res = DispatchResources::new(vk_device);

    res.shader_module = shader::create_shader_module(vk_device, code)?;
    res.pipeline_layout = pipeline::create_pipeline_layout(vk_device)?;
    res.pipeline = pipeline::create_compute_pipeline(vk_device, res.shader_module, res.pipeline_layout)?;

    let pool_info = vk::CommandPoolCreateInfo::builder().queue_family_index(device.queue_family);
    res.command_pool = unsafe { vk_device.create_command_pool(&pool_info, None) }
        .context("Failed to create command pool")?;

    let alloc_info = vk::CommandBufferAllocateInfo::builder()
        .command_pool(res.command_pool)
        .level(vk::CommandBufferLevel::PRIMARY)
        .command_buffer_count(1);
    res.command_buffer = unsafe { vk_device.allocate_command_buffers(&alloc_info) }
        .context("Failed to allocate command buffer")?[0];

    let cmd = res.command_buffer;
    unsafe {
        let begin_info = vk::CommandBufferBeginInfo::builder()
            .flags(vk::CommandBufferUsageFlags::ONE_TIME_SUBMIT);
        vk_device
            .begin_command_buffer(cmd, &begin_info)
            .context("Failed to begin command buffer")?;

        vk_device.cmd_bind_pipeline(cmd, vk::PipelineBindPoint::COMPUTE, res.pipeline);
        vk_device.cmd_dispatch(cmd, group_count_x, 1, 1);

        vk_device
            .end_command_buffer(cmd)
            .context("Failed to end command buffer")?;
    }

    let command_buffers = [cmd];
    let submit_info = vk::SubmitInfo::builder().command_buffers(&command_buffers);

    log::debug!("Dispatching {} workgroup(s) on queue family {}", group_count_x, device.queue_family);

    unsafe {
        vk_device
            .queue_submit(device.queue, &[submit_info.build()], vk::Fence::null())
            .context("Failed to submit compute work")?;

        // Debug printf output is delivered to the sinks before this returns
        vk_device
            .queue_wait_idle(device.queue)
            .context("Failed waiting for compute queue")?;
    }

    Ok(())
}
