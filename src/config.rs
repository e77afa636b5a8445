// =============================================================================
// CONFIGURATION - Load settings from config.toml
// =============================================================================
//
// This module handles loading and parsing configuration from config.toml.
// Provides sensible defaults if config file is missing or has errors.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Default location, relative to the working directory
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// Root configuration structure
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub app: AppConfig,
    pub compute: ComputeConfig,
    pub debug: DebugConfig,
}

/// Instance identification
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub name: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            name: "VKComputeSample".to_string(),
        }
    }
}

/// Compute dispatch settings
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ComputeConfig {
    /// Workgroups dispatched along X
    pub group_count_x: u32,
    /// Precompiled SPIR-V files, each run in its own pipeline
    pub shaders: Vec<PathBuf>,
}

impl Default for ComputeConfig {
    fn default() -> Self {
        Self {
            group_count_x: 512,
            shaders: vec![
                PathBuf::from("shaders/glsl_debug_printf.comp.spv"),
                PathBuf::from("shaders/hlsl_debug_printf.comp.spv"),
            ],
        }
    }
}

/// Debug settings
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DebugConfig {
    /// When false every messenger and report message is printed
    pub show_only_debug_printf: bool,
    pub report_message_contains: Option<String>,
    pub log_level: String,
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            show_only_debug_printf: true,
            report_message_contains: None,
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from file, falling back to defaults if not found
    pub fn load<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        Self::load_from_path(path).unwrap_or_else(|e| {
            // Logging is not up yet, the config decides its level
            eprintln!("Failed to load {:?}: {:#}. Using defaults.", path, e);
            Config::default()
        })
    }

    /// Load configuration from a specific path
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            eprintln!("Config file not found at {:?}, using defaults", path);
            return Ok(Config::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        Self::parse(&content).with_context(|| format!("Failed to parse config file: {:?}", path))
    }

    /// Load a configuration the user named explicitly; a missing file is an error
    pub fn load_required<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            anyhow::bail!("Config file not found: {:?}", path);
        }

        Self::load_from_path(path)
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Get log level as a `log` filter
    pub fn log_level_filter(&self) -> log::LevelFilter {
        match self.debug.log_level.to_lowercase().as_str() {
            "off" => log::LevelFilter::Off,
            "error" => log::LevelFilter::Error,
            "warn" => log::LevelFilter::Warn,
            "info" => log::LevelFilter::Info,
            "debug" => log::LevelFilter::Debug,
            "trace" => log::LevelFilter::Trace,
            other => {
                eprintln!("Unknown log level '{}', defaulting to info", other);
                log::LevelFilter::Info
            }
        }
    }
}
