//! Settings - Tunable core parameters, persisted to a JSON file.
//!
//! The trace constants were tuned empirically, so they live here rather
//! than being frozen into the navigator.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::warn;

/// Persisted tuning knobs for navigation and knowledge exchange.
#[derive(Serialize, Deserialize, Clone)]
pub struct CoreSettings {
    /// Turns of wall tracing allowed before the first forced timeout.
    #[serde(default = "default_trace_threshold")]
    pub initial_trace_threshold: u32,
    /// Timeout multiplier applied on every trace timeout.
    #[serde(default = "default_growth")]
    pub trace_threshold_growth: u32,
    /// Ticks between outbound terrain fragments.
    #[serde(default = "default_fragment_interval")]
    pub fragment_interval: u32,
    /// Ticks between outbound edge reports.
    #[serde(default = "default_edge_interval")]
    pub edge_report_interval: u32,
    /// Ticks between outbound structure reports.
    #[serde(default = "default_structure_interval")]
    pub structure_report_interval: u32,
}

fn default_trace_threshold() -> u32 { 100 }
fn default_growth() -> u32 { 3 }
fn default_fragment_interval() -> u32 { 6 }
fn default_edge_interval() -> u32 { 30 }
fn default_structure_interval() -> u32 { 6 }

impl Default for CoreSettings {
    fn default() -> Self {
        Self {
            initial_trace_threshold: default_trace_threshold(),
            trace_threshold_growth: default_growth(),
            fragment_interval: default_fragment_interval(),
            edge_report_interval: default_edge_interval(),
            structure_report_interval: default_structure_interval(),
        }
    }
}

fn settings_path() -> PathBuf {
    match std::env::var("GRIDNAV_SETTINGS") {
        Ok(path) => PathBuf::from(path),
        Err(_) => PathBuf::from("gridnav.json"),
    }
}

pub fn save_settings(settings: &CoreSettings) {
    let path = settings_path();
    match serde_json::to_string_pretty(settings) {
        Ok(json) => {
            if let Err(e) = std::fs::write(&path, json) {
                warn!("Failed to save settings: {}", e);
            }
        }
        Err(e) => warn!("Failed to serialize settings: {}", e),
    }
}

pub fn load_settings() -> CoreSettings {
    match std::fs::read_to_string(settings_path()) {
        Ok(json) => serde_json::from_str(&json).unwrap_or_default(),
        Err(_) => CoreSettings::default(),
    }
}
