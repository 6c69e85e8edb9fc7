//! Turns a display mode and a sensor snapshot into what the panel shows.
//!
//! Encoding is pure: the same mode, snapshot, wall time and elapsed seconds
//! always yield the same [`Frame`].

use crate::display::{DisplayText, LedState};
use crate::schedule::{is_even_second, DisplayMode};
use crate::sensors::SensorSnapshot;
use chrono::{Local, Timelike};
use serde::Serialize;

pub const DEFAULT_ALARM_TEMP_C: f32 = 70.0;
pub const DEFAULT_MEM_WARN_PCT: f32 = 80.0;
pub const DEFAULT_DISK_WARN_PCT: u8 = 80;

/// Hazard LED trip points. Each LED lights strictly above its threshold.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    pub alarm_temp_c: f32,
    pub mem_warn_pct: f32,
    pub disk_warn_pct: u8,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            alarm_temp_c: DEFAULT_ALARM_TEMP_C,
            mem_warn_pct: DEFAULT_MEM_WARN_PCT,
            disk_warn_pct: DEFAULT_DISK_WARN_PCT,
        }
    }
}

/// Local time of day, 24-hour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WallTime {
    pub hour: u32,
    pub minute: u32,
}

impl WallTime {
    pub fn new(hour: u32, minute: u32) -> Self {
        Self { hour, minute }
    }

    pub fn now() -> Self {
        let now = Local::now();
        Self::new(now.hour(), now.minute())
    }

    pub fn is_pm(&self) -> bool {
        self.hour >= 12
    }

    /// 12-hour clock hour; midnight and noon both read 12.
    pub fn hour12(&self) -> u32 {
        match self.hour % 12 {
            0 => 12,
            h => h,
        }
    }

    /// `HHMM`, zero padded, no separator (the colon LED does that job).
    pub fn clock_text(&self) -> String {
        format!("{:02}{:02}", self.hour12(), self.minute)
    }
}

/// Complete output for one tick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Frame {
    pub text: DisplayText,
    pub leds: LedState,
}

impl Frame {
    /// Blank panel, every LED dark.
    pub fn blank() -> Self {
        Self {
            text: DisplayText::blank(),
            leds: LedState::all_off(),
        }
    }
}

pub fn encode(
    mode: DisplayMode,
    snapshot: &SensorSnapshot,
    wall: WallTime,
    elapsed_secs: u64,
    thresholds: &Thresholds,
) -> Frame {
    let mut leds = hazard_leds(snapshot, thresholds);
    leds.play = wall.is_pm();
    leds.colon = match mode {
        DisplayMode::Clock => is_even_second(elapsed_secs),
        _ => true,
    };
    Frame {
        text: DisplayText::new(&mode_text(mode, snapshot, wall)),
        leds,
    }
}

/// Raw panel text for `mode`, before the 4-character clamp.
pub fn mode_text(mode: DisplayMode, snapshot: &SensorSnapshot, wall: WallTime) -> String {
    match mode {
        DisplayMode::Clock => wall.clock_text(),
        DisplayMode::CpuStat => format!("C {}", snapshot.temperature_c as i32),
        DisplayMode::MemStat => format!("r {}", snapshot.memory_pct as i32),
        DisplayMode::StorageStat => format!("S {}", snapshot.disk_pct),
    }
}

/// LEDs that track system state regardless of what the panel is showing.
pub fn hazard_leds(snapshot: &SensorSnapshot, thresholds: &Thresholds) -> LedState {
    LedState {
        alarm: snapshot.temperature_c > thresholds.alarm_temp_c,
        usb: snapshot.disk_pct > thresholds.disk_warn_pct,
        pause: snapshot.memory_pct > thresholds.mem_warn_pct,
        wlan: snapshot.link.wifi,
        lan: snapshot.link.ethernet,
        ..LedState::all_off()
    }
}
