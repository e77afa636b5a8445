// Backend module - headless Vulkan compute
//
// Design: Thin wrapper around ash with RAII cleanup
// Lifetimes nest: instance > device > per-dispatch objects

pub mod capabilities;
pub mod compute;
pub mod debug;
pub mod device;
pub mod instance;
pub mod pipeline;
pub mod shader;

pub use device::ComputeDevice;
pub use instance::VulkanInstance;
