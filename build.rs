//! Build script: embeds the git hash and runs GPU pre-flight checks.
//!
//! Verifies that required toolkits are installed before whisper-rs-sys tries
//! to compile, so feature-flag mistakes fail early with a clear message.

use std::process::Command;

fn main() {
    // Embed git short hash for version string
    if let Ok(output) = Command::new("git")
        .args(["rev-parse", "--short=7", "HEAD"])
        .output()
    {
        if output.status.success() {
            let hash = String::from_utf8_lossy(&output.stdout).trim().to_string();
            println!("cargo:rustc-env=GIT_HASH={}", hash);
        }
    }
    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/refs/heads/");

    if cfg!(feature = "cuda") {
        check_cuda();
    }
    if cfg!(feature = "vulkan") {
        check_vulkan();
    }
}

fn check_cuda() {
    let found = Command::new("nvcc")
        .arg("--version")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false);
    if !found {
        panic!(
            "`nvcc` not found — CUDA toolkit is not installed.\n\
             Install: https://developer.nvidia.com/cuda-downloads\n\
             Or build without CUDA: cargo build --release"
        );
    }
    println!("cargo::warning=CUDA toolkit detected");
}

fn check_vulkan() {
    if Command::new("vulkaninfo")
        .arg("--summary")
        .output()
        .is_err()
    {
        panic!(
            "`vulkaninfo` not found — Vulkan SDK is not installed.\n\
             Install: https://vulkan.lunarg.com/\n\
             Or build without Vulkan: cargo build --release"
        );
    }
    println!("cargo::warning=Vulkan SDK detected");
}
