use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Scheduler tuning (`[scheduler]` section).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Push slower paths toward the tail of the free pool in proportion to
    /// their RTT ratio against faster paths. Off = plain min-RTT-first fill.
    #[serde(default = "default_true")]
    pub proportional_skip: bool,
}

fn default_true() -> bool {
    true
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            proportional_skip: true,
        }
    }
}

/// One simulated path (`[[simulation.sessions]]`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimSessionConfig {
    pub id: u64,
    /// Fixed round-trip time in milliseconds.
    pub rtt_ms: u64,
    /// Send window in pieces.
    pub window: usize,
    /// Every Nth `request_data` call fails (None = never).
    #[serde(default)]
    pub fail_every: Option<u32>,
    /// Every Nth accepted piece times out instead of arriving (None = never).
    #[serde(default)]
    pub loss_every: Option<u32>,
    /// Virtual time at which the session connects (default 0).
    #[serde(default)]
    pub connect_at_ms: Option<u64>,
    /// Virtual time at which the session disconnects (None = stays up).
    #[serde(default)]
    pub disconnect_at_ms: Option<u64>,
}

impl SimSessionConfig {
    pub fn new(id: u64, rtt_ms: u64, window: usize) -> Self {
        Self {
            id,
            rtt_ms,
            window,
            fail_every: None,
            loss_every: None,
            connect_at_ms: None,
            disconnect_at_ms: None,
        }
    }
}

/// Simulation harness parameters (`[simulation]` section).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Total number of pieces the upstream supplier can hand out.
    pub piece_count: u32,
    /// Interval between global scheduling passes.
    pub global_pass_interval_ms: u64,
    /// Hard stop for the virtual clock.
    pub max_duration_ms: u64,
    /// Cap on pieces handed out per replenishment request (None = exactly what was asked).
    #[serde(default)]
    pub supply_batch: Option<usize>,
    #[serde(default)]
    pub sessions: Vec<SimSessionConfig>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            piece_count: 1000,
            global_pass_interval_ms: 50,
            max_duration_ms: 60_000,
            supply_batch: None,
            sessions: vec![
                SimSessionConfig::new(1, 10, 8),
                SimSessionConfig::new(2, 40, 8),
                SimSessionConfig {
                    loss_every: Some(50),
                    ..SimSessionConfig::new(3, 120, 4)
                },
            ],
        }
    }
}

/// Global configuration loaded from `~/.config/mpsched/config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MpschedConfig {
    #[serde(default)]
    pub scheduler: SchedulerConfig,
    #[serde(default)]
    pub simulation: SimulationConfig,
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("mpsched")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<MpschedConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = MpschedConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }
    load_from_path(&path)
}

/// Load configuration from an explicit file.
pub fn load_from_path(path: &Path) -> Result<MpschedConfig> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("read config: {}", path.display()))?;
    let cfg: MpschedConfig =
        toml::from_str(&data).with_context(|| format!("parse config: {}", path.display()))?;
    Ok(cfg)
}
