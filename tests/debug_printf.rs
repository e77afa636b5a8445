// End-to-end runs of the sample binary.
//
// These need a Vulkan driver, the Khronos validation layer and the compiled
// shaders, so they are ignored by default:
//   cargo test -- --ignored

use std::collections::BTreeSet;
use std::path::Path;
use std::process::{Command, Output};

fn run_sample(name: &str, config: Option<&str>) -> Output {
    let manifest_dir = env!("CARGO_MANIFEST_DIR");
    let mut command = Command::new(env!("CARGO_BIN_EXE_vk-debug-printf"));
    command.current_dir(manifest_dir);
    if let Some(config) = config {
        let path = std::env::temp_dir()
            .join(format!("vk-debug-printf-{}-{}.toml", std::process::id(), name));
        std::fs::write(&path, config).unwrap();
        command.arg(path);
    }
    command.output().expect("failed to launch sample binary")
}

/// Thread ids printed through the messenger by one shader variant
fn printed_threads(stdout: &str, marker: &str) -> Vec<u32> {
    stdout
        .lines()
        .filter(|line| line.starts_with("[VULKAN DEBUG]"))
        .filter_map(|line| {
            let (_, rest) = line.split_once(marker)?;
            let digits: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
            digits.parse().ok()
        })
        .collect()
}

#[test]
#[ignore = "requires a Vulkan device and the validation layer"]
fn both_shaders_print_sixteen_threads() {
    let output = run_sample("default", None);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

    let expected: BTreeSet<u32> = (0..16).collect();
    for marker in ["GLSL thread ", "HLSL thread "] {
        let threads = printed_threads(&stdout, marker);
        assert_eq!(threads.len(), 16, "{} lines:\n{}", marker, stdout);
        assert_eq!(threads.into_iter().collect::<BTreeSet<_>>(), expected);
    }
}

#[test]
#[ignore = "requires a Vulkan device and the validation layer"]
fn small_dispatch_prints_only_launched_threads() {
    let output = run_sample(
        "small",
        Some(
            r#"
            [compute]
            group_count_x = 4
            shaders = ["shaders/glsl_debug_printf.comp.spv"]
            "#,
        ),
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success());

    let threads: BTreeSet<u32> = printed_threads(&stdout, "GLSL thread ").into_iter().collect();
    assert_eq!(threads, (0..4).collect::<BTreeSet<u32>>());
}

#[test]
#[ignore = "requires a Vulkan device and the validation layer"]
fn missing_shader_file_fails() {
    assert!(!Path::new(env!("CARGO_MANIFEST_DIR")).join("shaders/absent.comp.spv").exists());

    let output = run_sample(
        "absent",
        Some(
            r#"
            [compute]
            shaders = ["shaders/absent.comp.spv"]
            "#,
        ),
    );
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Failed to open shader file"));
}

#[test]
#[ignore = "requires the Vulkan loader"]
fn hidden_validation_layer_exits_with_status_one() {
    let empty_layer_dir = std::env::temp_dir()
        .join(format!("vk-debug-printf-{}-no-layers", std::process::id()));
    std::fs::create_dir_all(&empty_layer_dir).unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_vk-debug-printf"))
        .current_dir(env!("CARGO_MANIFEST_DIR"))
        .env("VK_LAYER_PATH", &empty_layer_dir)
        .env("VK_ADD_LAYER_PATH", &empty_layer_dir)
        .env("VK_LOADER_LAYERS_DISABLE", "~all~")
        .output()
        .expect("failed to launch sample binary");

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert_eq!(output.status.code(), Some(1), "stderr: {}", stderr);
    assert!(stderr.contains("VK_LAYER_KHRONOS_validation"), "stderr: {}", stderr);
    // Nothing reached the sinks, so no instance was created
    assert!(String::from_utf8_lossy(&output.stdout).is_empty());
}
