use std::{
    fs,
    path::{Path, PathBuf},
    str::FromStr,
};

use crate::{Error, Result};

use super::{Config, CONFIG_DIR_NAME, CONFIG_FILE_NAME};

/// Load `~/.tx3vfd/config.toml`. A missing file, or no `$HOME` at all (as under
/// systemd without `User=`), yields defaults. Nothing is ever written.
pub fn load_or_default() -> Result<Config> {
    match config_path() {
        Some(path) => load_from_path(&path),
        None => defaults(),
    }
}

pub fn load_from_path(path: &Path) -> Result<Config> {
    if !path.exists() {
        return defaults();
    }

    let raw = fs::read_to_string(path)?;
    parse(&raw)
}

fn defaults() -> Result<Config> {
    let cfg = Config::default();
    super::validate(&cfg)?;
    Ok(cfg)
}

pub fn parse(raw: &str) -> Result<Config> {
    let mut cfg = Config::default();

    for (idx, line) in raw.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let (key, value) = trimmed.split_once('=').ok_or_else(|| {
            Error::InvalidArgs(format!("invalid config line {}: '{}'", idx + 1, line))
        })?;

        let key = key.trim();
        let value = value.trim();
        let line_no = idx + 1;
        match key {
            "display_path" => cfg.display_path = unquote(value).to_string(),
            "led_dir" => cfg.led_dir = unquote(value).to_string(),
            "meminfo_path" => cfg.meminfo_path = unquote(value).to_string(),
            "net_class_dir" => cfg.net_class_dir = unquote(value).to_string(),
            "ethernet_iface" => cfg.ethernet_iface = unquote(value).to_string(),
            "boot_text" => cfg.boot_text = unquote(value).to_string(),
            "hwmon_paths" => {
                cfg.hwmon_paths = parse_string_array(value).map_err(|e| {
                    Error::InvalidArgs(format!("invalid hwmon_paths on line {line_no}: {e}"))
                })?;
            }
            "tick_ms" => cfg.tick_ms = parse_number(key, value, line_no)?,
            "boot_hold_ms" => cfg.boot_hold_ms = parse_number(key, value, line_no)?,
            "clock_secs" => cfg.clock_secs = parse_number(key, value, line_no)?,
            "cpu_secs" => cfg.cpu_secs = parse_number(key, value, line_no)?,
            "mem_secs" => cfg.mem_secs = parse_number(key, value, line_no)?,
            "storage_secs" => cfg.storage_secs = parse_number(key, value, line_no)?,
            "alarm_temp_c" => cfg.alarm_temp_c = parse_number(key, value, line_no)?,
            "mem_warn_pct" => cfg.mem_warn_pct = parse_number(key, value, line_no)?,
            "disk_warn_pct" => cfg.disk_warn_pct = parse_number(key, value, line_no)?,
            "command_timeout_ms" => {
                cfg.command_timeout_ms = parse_number(key, value, line_no)?;
            }
            other => {
                return Err(Error::InvalidArgs(format!(
                    "unknown config key '{other}' on line {line_no}"
                )));
            }
        }
    }

    super::validate(&cfg)?;
    Ok(cfg)
}

pub fn config_path() -> Option<PathBuf> {
    std::env::var_os("HOME")
        .filter(|home| !home.is_empty())
        .map(|home| PathBuf::from(home).join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
}

fn unquote(value: &str) -> &str {
    value.trim_matches('"')
}

fn parse_number<T: FromStr>(key: &str, value: &str, line_no: usize) -> Result<T> {
    unquote(value)
        .parse()
        .map_err(|_| Error::InvalidArgs(format!("invalid {key} value on line {line_no}")))
}

fn parse_string_array(value: &str) -> std::result::Result<Vec<String>, String> {
    let trimmed = value.trim();
    if !trimmed.starts_with('[') || !trimmed.ends_with(']') {
        return Err(
            "expected array literal (e.g., [\"/sys/class/hwmon/hwmon0/temp1_input\"])".into(),
        );
    }
    let inner = &trimmed[1..trimmed.len() - 1];
    if inner.trim().is_empty() {
        return Ok(Vec::new());
    }
    let mut entries = Vec::new();
    for part in inner.split(',') {
        let item = part.trim();
        if item.is_empty() {
            continue;
        }
        let cleaned = if item.len() >= 2
            && ((item.starts_with('"') && item.ends_with('"'))
                || (item.starts_with('\'') && item.ends_with('\'')))
        {
            &item[1..item.len() - 1]
        } else {
            item
        };
        let cleaned = cleaned.trim();
        if cleaned.is_empty() {
            return Err("path entries must not be empty".into());
        }
        entries.push(cleaned.to_string());
    }
    Ok(entries)
}
