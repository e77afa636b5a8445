// =============================================================================
// VULKAN DEBUG PRINTF SAMPLE - headless compute
// =============================================================================
//
// Runs precompiled compute shaders that call debugPrintfEXT (GLSL) or printf
// (HLSL). The validation layer turns those calls into messages delivered to
// two host callbacks, which print them to stdout.
//
// FLOW:
// 1. Verify the validation layer and debug extensions exist on the host
// 2. Create a headless instance with debug printf enabled
// 3. Register the debug utils messenger and debug report callback
// 4. Pick the first GPU and a compute queue family, create the device
// 5. For each shader: build pipeline, dispatch once, wait for idle
// 6. Tear everything down in reverse order
//
// =============================================================================

mod backend;
mod config;

use anyhow::{Context, Result};
use ash::Entry;
use backend::capabilities::CapabilityReport;
use backend::debug::MessageFilter;
use backend::{capabilities, compute, shader, ComputeDevice, VulkanInstance};
use config::{Config, DEFAULT_CONFIG_PATH};
use std::path::PathBuf;
use std::process::ExitCode;

/// Exit status when the host lacks a required layer or extension
const EXIT_MISSING_CAPABILITIES: u8 = 1;

// =============================================================================
// ENTRY POINT
// =============================================================================

fn main() -> Result<ExitCode> {
    // An explicitly named config must exist, the default one may be absent
    let config = match std::env::args_os().nth(1).map(PathBuf::from) {
        Some(path) => Config::load_required(&path)?,
        None => Config::load(DEFAULT_CONFIG_PATH),
    };

    init_logging(&config);
    log::info!("Starting Vulkan debug printf sample");
    log::debug!("Config: {:?}", config);

    run(&config)
}

/// Initialize logging. Output goes to stderr, stdout is reserved for the
/// debug sinks.
fn init_logging(config: &Config) {
    use env_logger::{Builder, Env};

    // RUST_LOG wins over the configured level
    Builder::from_env(Env::default().default_filter_or(config.log_level_filter().as_str())).init();
}

/// Exit status for an unsatisfied capability report, after logging each
/// missing name. `None` means instance creation may proceed.
fn missing_capabilities_status(report: &CapabilityReport) -> Option<u8> {
    if report.is_satisfied() {
        return None;
    }

    for layer in &report.missing_layers {
        log::error!("Required instance layer not available: {:?}", layer);
    }
    for extension in &report.missing_extensions {
        log::error!("Required instance extension not available: {:?}", extension);
    }
    Some(EXIT_MISSING_CAPABILITIES)
}

fn run(config: &Config) -> Result<ExitCode> {
    // Step 1: Load Vulkan library and check the host
    let entry = unsafe { Entry::load() }
        .context("Failed to load Vulkan library. Is Vulkan installed?")?;

    let report = capabilities::verify(&entry)?;
    if let Some(status) = missing_capabilities_status(&report) {
        return Ok(ExitCode::from(status));
    }

    // Step 2-3: Instance and debug sinks
    let filter = MessageFilter {
        show_only_debug_printf: config.debug.show_only_debug_printf,
        report_message_contains: config.debug.report_message_contains.clone(),
    };
    let instance = VulkanInstance::new(entry, &config.app.name, filter)?;

    // Step 4: GPU, queue and logical device
    let physical_device = instance.first_physical_device()?;
    let device = ComputeDevice::new(&instance, physical_device)?;

    // Step 5: One independent run per shader
    for path in &config.compute.shaders {
        log::info!("Running compute shader {:?}", path);

        let code = shader::load_spirv(path)?;
        compute::run_compute_shader(&device, &code, config.compute.group_count_x)
            .with_context(|| format!("Failed to run compute shader {:?}", path))?;
    }

    // Step 6: Device before instance, the instance drop takes the sinks with it
    drop(device);
    drop(instance);

    log::info!("Cleanup complete");
    Ok(ExitCode::SUCCESS)
}
