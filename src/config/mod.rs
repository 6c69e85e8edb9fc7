use crate::{
    frame::{Thresholds, DEFAULT_ALARM_TEMP_C, DEFAULT_DISK_WARN_PCT, DEFAULT_MEM_WARN_PCT},
    schedule::{
        CycleTable, DEFAULT_CLOCK_SECS, DEFAULT_CPU_SECS, DEFAULT_MEM_SECS, DEFAULT_STORAGE_SECS,
    },
    sensors::{
        command::DEFAULT_COMMAND_TIMEOUT_MS, SensorSettings, DEFAULT_ETHERNET_IFACE,
        DEFAULT_HWMON_PATHS, DEFAULT_MEMINFO_PATH, DEFAULT_NET_CLASS_DIR,
    },
    Error, Result,
};
use std::path::{Path, PathBuf};

pub mod loader;

pub const DEFAULT_DISPLAY_PATH: &str =
    "/sys/devices/platform/spi/spi_master/spi0/spi0.0/display_text";
pub const DEFAULT_LED_DIR: &str = "/sys/class/leds";
pub const DEFAULT_TICK_MS: u64 = 500;
pub const DEFAULT_BOOT_TEXT: &str = "TX3M";
pub const DEFAULT_BOOT_HOLD_MS: u64 = 1_000;
pub const MIN_TICK_MS: u64 = 50;
/// Ticks longer than a second would skip colon blink phases.
pub const MAX_TICK_MS: u64 = 1_000;
const MAX_BOOT_HOLD_MS: u64 = 10_000;
const MIN_COMMAND_TIMEOUT_MS: u64 = 100;
const MAX_COMMAND_TIMEOUT_MS: u64 = 10_000;
const CONFIG_DIR_NAME: &str = ".tx3vfd";
const CONFIG_FILE_NAME: &str = "config.toml";

/// User-supplied settings loaded from the config file.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub display_path: String,
    pub led_dir: String,
    pub meminfo_path: String,
    pub net_class_dir: String,
    pub hwmon_paths: Vec<String>,
    pub ethernet_iface: String,
    pub tick_ms: u64,
    pub boot_text: String,
    pub boot_hold_ms: u64,
    pub clock_secs: u64,
    pub cpu_secs: u64,
    pub mem_secs: u64,
    pub storage_secs: u64,
    pub alarm_temp_c: f32,
    pub mem_warn_pct: f32,
    pub disk_warn_pct: u8,
    pub command_timeout_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            display_path: DEFAULT_DISPLAY_PATH.to_string(),
            led_dir: DEFAULT_LED_DIR.to_string(),
            meminfo_path: DEFAULT_MEMINFO_PATH.to_string(),
            net_class_dir: DEFAULT_NET_CLASS_DIR.to_string(),
            hwmon_paths: DEFAULT_HWMON_PATHS.iter().map(|p| p.to_string()).collect(),
            ethernet_iface: DEFAULT_ETHERNET_IFACE.to_string(),
            tick_ms: DEFAULT_TICK_MS,
            boot_text: DEFAULT_BOOT_TEXT.to_string(),
            boot_hold_ms: DEFAULT_BOOT_HOLD_MS,
            clock_secs: DEFAULT_CLOCK_SECS,
            cpu_secs: DEFAULT_CPU_SECS,
            mem_secs: DEFAULT_MEM_SECS,
            storage_secs: DEFAULT_STORAGE_SECS,
            alarm_temp_c: DEFAULT_ALARM_TEMP_C,
            mem_warn_pct: DEFAULT_MEM_WARN_PCT,
            disk_warn_pct: DEFAULT_DISK_WARN_PCT,
            command_timeout_ms: DEFAULT_COMMAND_TIMEOUT_MS,
        }
    }
}

impl Config {
    pub fn load_or_default() -> Result<Self> {
        loader::load_or_default()
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        loader::load_from_path(path)
    }

    pub fn cycle(&self) -> CycleTable {
        CycleTable {
            clock_secs: self.clock_secs,
            cpu_secs: self.cpu_secs,
            mem_secs: self.mem_secs,
            storage_secs: self.storage_secs,
        }
    }

    pub fn thresholds(&self) -> Thresholds {
        Thresholds {
            alarm_temp_c: self.alarm_temp_c,
            mem_warn_pct: self.mem_warn_pct,
            disk_warn_pct: self.disk_warn_pct,
        }
    }

    pub fn sensor_settings(&self) -> SensorSettings {
        SensorSettings {
            hwmon_paths: self.hwmon_paths.iter().map(PathBuf::from).collect(),
            meminfo_path: PathBuf::from(&self.meminfo_path),
            net_class_dir: PathBuf::from(&self.net_class_dir),
            ethernet_iface: self.ethernet_iface.clone(),
        }
    }
}

pub(crate) fn validate(cfg: &Config) -> Result<()> {
    if cfg.display_path.trim().is_empty() {
        return Err(Error::InvalidArgs("display_path must not be empty".into()));
    }
    if cfg.led_dir.trim().is_empty() {
        return Err(Error::InvalidArgs("led_dir must not be empty".into()));
    }
    if cfg.ethernet_iface.trim().is_empty() {
        return Err(Error::InvalidArgs("ethernet_iface must not be empty".into()));
    }
    if !(MIN_TICK_MS..=MAX_TICK_MS).contains(&cfg.tick_ms) {
        return Err(Error::InvalidArgs(format!(
            "tick_ms must be between {MIN_TICK_MS} and {MAX_TICK_MS} (got {})",
            cfg.tick_ms
        )));
    }
    if cfg.boot_hold_ms > MAX_BOOT_HOLD_MS {
        return Err(Error::InvalidArgs(format!(
            "boot_hold_ms must be at most {MAX_BOOT_HOLD_MS} (got {})",
            cfg.boot_hold_ms
        )));
    }
    for (key, secs) in [
        ("clock_secs", cfg.clock_secs),
        ("cpu_secs", cfg.cpu_secs),
        ("mem_secs", cfg.mem_secs),
        ("storage_secs", cfg.storage_secs),
    ] {
        if secs == 0 {
            return Err(Error::InvalidArgs(format!("{key} must be at least 1")));
        }
    }
    if !(0.0..=100.0).contains(&cfg.mem_warn_pct) {
        return Err(Error::InvalidArgs(format!(
            "mem_warn_pct must be between 0 and 100 (got {})",
            cfg.mem_warn_pct
        )));
    }
    if cfg.disk_warn_pct > 100 {
        return Err(Error::InvalidArgs(format!(
            "disk_warn_pct must be between 0 and 100 (got {})",
            cfg.disk_warn_pct
        )));
    }
    if !cfg.alarm_temp_c.is_finite() {
        return Err(Error::InvalidArgs("alarm_temp_c must be a finite number".into()));
    }
    if !(MIN_COMMAND_TIMEOUT_MS..=MAX_COMMAND_TIMEOUT_MS).contains(&cfg.command_timeout_ms) {
        return Err(Error::InvalidArgs(format!(
            "command_timeout_ms must be between {MIN_COMMAND_TIMEOUT_MS} and {MAX_COMMAND_TIMEOUT_MS} (got {})",
            cfg.command_timeout_ms
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        validate(&Config::default()).unwrap();
    }

    #[test]
    fn defaults_reproduce_stock_cycle_and_thresholds() {
        let cfg = Config::default();
        assert_eq!(cfg.cycle(), CycleTable::default());
        assert_eq!(cfg.cycle().total_secs(), 20);
        assert_eq!(cfg.thresholds(), Thresholds::default());
        assert_eq!(cfg.sensor_settings(), SensorSettings::default());
    }

    #[test]
    fn rejects_tick_slower_than_blink() {
        let cfg = Config {
            tick_ms: 1_500,
            ..Config::default()
        };
        let err = validate(&cfg).unwrap_err();
        assert!(format!("{err}").contains("tick_ms"));
    }

    #[test]
    fn rejects_empty_cycle_slot() {
        let cfg = Config {
            mem_secs: 0,
            ..Config::default()
        };
        let err = validate(&cfg).unwrap_err();
        assert!(format!("{err}").contains("mem_secs must be at least 1"));
    }
}
