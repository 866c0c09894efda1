//! Run configuration – reads `~/.ctrlk/config.toml` or an explicit path.

use ctrlk_components::{PidGains, PlantConfig};
use ctrlk_types::{KernelConfig, KernelError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// One PID candidate competing for the controller slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PidCandidate {
    pub name: String,
    #[serde(default)]
    pub gains: PidGains,
}

/// The on/off candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BangBangConfig {
    pub name: String,
    pub amplitude: f64,
    /// Half-width of the hysteresis band around the set-point.
    pub band: f64,
}

impl Default for BangBangConfig {
    fn default() -> Self {
        Self {
            name: "bang_bang".to_string(),
            amplitude: 1.0,
            band: 0.02,
        }
    }
}

/// Everything one `ctrlk` run needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub kernel: KernelConfig,

    /// Cycle period in milliseconds.
    #[serde(default = "default_period_ms")]
    pub period_ms: u64,

    /// Cycles to run before stopping.
    #[serde(default = "default_cycles")]
    pub cycles: u64,

    /// Name of the controller candidate to select.
    #[serde(default = "default_controller")]
    pub controller: String,

    /// Initial set-point target.
    #[serde(default = "default_target")]
    pub target: f64,

    /// Set-point slew limit in units per second.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rate: Option<f64>,

    /// Print a trace line every this many cycles; `0` disables it.
    #[serde(default = "default_trace_every")]
    pub trace_every: u64,

    #[serde(default)]
    pub plant: PlantConfig,

    #[serde(default = "default_pid")]
    pub pid: Vec<PidCandidate>,

    #[serde(default)]
    pub bang_bang: BangBangConfig,
}

fn default_period_ms() -> u64 {
    10
}
fn default_cycles() -> u64 {
    300
}
fn default_controller() -> String {
    "pid".to_string()
}
fn default_target() -> f64 {
    1.0
}
fn default_trace_every() -> u64 {
    25
}
fn default_pid() -> Vec<PidCandidate> {
    vec![
        PidCandidate {
            name: "pid".to_string(),
            gains: PidGains {
                kp: 2.0,
                ki: 1.0,
                kd: 0.05,
                output_min: -5.0,
                output_max: 5.0,
            },
        },
        PidCandidate {
            name: "pid_soft".to_string(),
            gains: PidGains {
                kp: 0.8,
                ki: 0.3,
                kd: 0.0,
                output_min: -2.0,
                output_max: 2.0,
            },
        },
    ]
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            kernel: KernelConfig::default(),
            period_ms: default_period_ms(),
            cycles: default_cycles(),
            controller: default_controller(),
            target: default_target(),
            rate: None,
            trace_every: default_trace_every(),
            plant: PlantConfig::default(),
            pid: default_pid(),
            bang_bang: BangBangConfig::default(),
        }
    }
}

impl AppConfig {
    pub fn period(&self) -> Duration {
        Duration::from_millis(self.period_ms.max(1))
    }
}

/// Return the path to `~/.ctrlk/config.toml`.
pub fn config_path() -> PathBuf {
    config_path_for_home(
        &std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .unwrap_or_else(|_| ".".to_string()),
    )
}

pub(crate) fn config_path_for_home(home: &str) -> PathBuf {
    PathBuf::from(home).join(".ctrlk").join("config.toml")
}

/// Load the run configuration.
///
/// An explicit `path` must exist.  Without one, `~/.ctrlk/config.toml` is
/// read if present and the defaults are used otherwise.  Environment
/// overrides apply in both cases.
pub fn load(path: Option<&Path>) -> Result<AppConfig, KernelError> {
    let mut cfg = match path {
        Some(p) => load_from(p)?
            .ok_or_else(|| KernelError::Config(format!("no config file at {}", p.display())))?,
        None => load_from(&config_path())?.unwrap_or_default(),
    };
    apply_env_overrides(&mut cfg);
    Ok(cfg)
}

/// Load the config from a specific path.  Returns `None` if the file does
/// not exist.
pub(crate) fn load_from(path: &Path) -> Result<Option<AppConfig>, KernelError> {
    if !path.exists() {
        return Ok(None);
    }
    let raw = fs::read_to_string(path)
        .map_err(|e| KernelError::Config(format!("failed to read {}: {}", path.display(), e)))?;
    let cfg: AppConfig = toml::from_str(&raw)
        .map_err(|e| KernelError::Config(format!("failed to parse {}: {}", path.display(), e)))?;
    Ok(Some(cfg))
}

/// Apply `CTRLK_*` environment variable overrides to `cfg`.
///
/// | Variable | Config field |
/// |---|---|
/// | `CTRLK_KERNEL_NAME` | `kernel.name` |
/// | `CTRLK_PERIOD_MS` | `period_ms` |
/// | `CTRLK_CYCLES` | `cycles` |
/// | `CTRLK_CONTROLLER` | `controller` |
pub fn apply_env_overrides(cfg: &mut AppConfig) {
    if let Ok(v) = std::env::var("CTRLK_KERNEL_NAME") {
        cfg.kernel.name = v;
    }
    if let Ok(v) = std::env::var("CTRLK_PERIOD_MS")
        && let Ok(ms) = v.parse::<u64>()
    {
        cfg.period_ms = ms;
    }
    if let Ok(v) = std::env::var("CTRLK_CYCLES")
        && let Ok(n) = v.parse::<u64>()
    {
        cfg.cycles = n;
    }
    if let Ok(v) = std::env::var("CTRLK_CONTROLLER") {
        cfg.controller = v;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(dir: &tempfile::TempDir, raw: &str) -> PathBuf {
        let path = dir.path().join("config.toml");
        fs::write(&path, raw).expect("write config");
        path
    }

    #[test]
    fn empty_file_yields_defaults() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = write(&dir, "");
        let cfg = load_from(&path).expect("load ok").expect("some");
        assert_eq!(cfg, AppConfig::default());
        assert_eq!(cfg.pid.len(), 2);
        assert_eq!(cfg.period(), Duration::from_millis(10));
    }

    #[test]
    fn parses_candidates_and_prefixes() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = write(
            &dir,
            r#"
controller = "fast"
period_ms = 5
rate = 0.5

[kernel]
name = "arm"
[kernel.prefixes]
set_point = "joint"

[plant]
time_constant = 0.2

[[pid]]
name = "fast"
[pid.gains]
kp = 4.0
"#,
        );
        let cfg = load_from(&path).expect("load ok").expect("some");
        assert_eq!(cfg.controller, "fast");
        assert_eq!(cfg.kernel.name, "arm");
        assert_eq!(cfg.kernel.prefixes.set_point, "joint");
        assert_eq!(cfg.rate, Some(0.5));
        assert_eq!(cfg.plant.time_constant, 0.2);
        assert_eq!(cfg.plant.gain, 1.0);
        assert_eq!(cfg.pid.len(), 1);
        assert_eq!(cfg.pid[0].gains.kp, 4.0);
        assert_eq!(cfg.pid[0].gains.ki, 0.0);
    }

    #[test]
    fn load_from_returns_none_when_missing() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = config_path_for_home(&dir.path().to_string_lossy());
        assert!(load_from(&path).expect("no error").is_none());
    }

    #[test]
    fn explicit_missing_path_is_an_error() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = dir.path().join("absent.toml");
        assert!(matches!(load(Some(&path)), Err(KernelError::Config(_))));
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = write(&dir, "period_ms = \"fast\"");
        let err = load_from(&path).expect_err("must fail");
        assert!(matches!(err, KernelError::Config(msg) if msg.contains("parse")));
    }

    #[test]
    fn config_path_points_to_ctrlk_dir() {
        let p = config_path_for_home("/home/testuser");
        assert!(p.to_string_lossy().contains(".ctrlk"));
        assert!(p.to_string_lossy().ends_with("config.toml"));
    }

    #[test]
    fn env_overrides_apply_and_ignore_garbage() {
        // SAFETY: the only test touching these variables.
        unsafe {
            std::env::set_var("CTRLK_CONTROLLER", "bang_bang");
            std::env::set_var("CTRLK_CYCLES", "42");
            std::env::set_var("CTRLK_PERIOD_MS", "not-a-number");
        }
        let mut cfg = AppConfig::default();
        apply_env_overrides(&mut cfg);
        assert_eq!(cfg.controller, "bang_bang");
        assert_eq!(cfg.cycles, 42);
        assert_eq!(cfg.period_ms, 10);
        unsafe {
            std::env::remove_var("CTRLK_CONTROLLER");
            std::env::remove_var("CTRLK_CYCLES");
            std::env::remove_var("CTRLK_PERIOD_MS");
        }
    }
}
