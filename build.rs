// Build script to compile the debug printf compute shaders to SPIR-V
//
// A missing glslc only warns; a shader that fails to compile stops the build.

use std::path::Path;
use std::process::Command;

fn main() {
    println!("cargo:rerun-if-changed=shaders/");

    // Compile shaders using glslc (part of Vulkan SDK)
    compile_shader(
        "shaders/glsl_debug_printf.comp",
        "shaders/glsl_debug_printf.comp.spv",
        &[],
    );
    // glslc understands HLSL when told the source language and stage
    compile_shader(
        "shaders/hlsl_debug_printf.hlsl",
        "shaders/hlsl_debug_printf.comp.spv",
        &["-x", "hlsl", "-fshader-stage=compute", "-fentry-point=main"],
    );
}

fn compile_shader(input: &str, output: &str, extra_args: &[&str]) {
    let input_path = Path::new(input);
    let output_path = Path::new(output);

    // Debug printf needs the non-semantic info extension, available from SPIR-V 1.3
    let result = Command::new("glslc")
        .args(extra_args)
        .arg("--target-env=vulkan1.1")
        .arg(input_path)
        .arg("-o")
        .arg(output_path)
        .status();

    match result {
        Ok(status) if status.success() => {
            println!("Compiled {} -> {}", input, output);
        }
        Ok(status) => {
            panic!("Failed to compile {}: exit code {:?}", input, status.code());
        }
        Err(e) => {
            println!("cargo:warning=glslc not found ({}), {} was not compiled", e, input);
            eprintln!("Shaders will not be compiled. Install Vulkan SDK or compile manually:");
            eprintln!("  glslc {} {} -o {}", extra_args.join(" "), input, output);
        }
    }
}
