use serde::Serialize;
use std::fmt;
use std::time::Instant;

pub const DEFAULT_CLOCK_SECS: u64 = 10;
pub const DEFAULT_CPU_SECS: u64 = 4;
pub const DEFAULT_MEM_SECS: u64 = 3;
pub const DEFAULT_STORAGE_SECS: u64 = 3;

/// What the front panel is showing in a given slot of the cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DisplayMode {
    Clock,
    CpuStat,
    MemStat,
    StorageStat,
}

impl DisplayMode {
    pub const ALL: [DisplayMode; 4] = [
        DisplayMode::Clock,
        DisplayMode::CpuStat,
        DisplayMode::MemStat,
        DisplayMode::StorageStat,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DisplayMode::Clock => "clock",
            DisplayMode::CpuStat => "cpu",
            DisplayMode::MemStat => "mem",
            DisplayMode::StorageStat => "storage",
        }
    }
}

impl fmt::Display for DisplayMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Seconds spent in each mode per cycle. Slots always run in the order
/// clock, cpu, mem, storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleTable {
    pub clock_secs: u64,
    pub cpu_secs: u64,
    pub mem_secs: u64,
    pub storage_secs: u64,
}

impl Default for CycleTable {
    fn default() -> Self {
        Self {
            clock_secs: DEFAULT_CLOCK_SECS,
            cpu_secs: DEFAULT_CPU_SECS,
            mem_secs: DEFAULT_MEM_SECS,
            storage_secs: DEFAULT_STORAGE_SECS,
        }
    }
}

impl CycleTable {
    pub fn total_secs(&self) -> u64 {
        self.clock_secs + self.cpu_secs + self.mem_secs + self.storage_secs
    }

    pub fn mode_at(&self, elapsed_secs: u64) -> DisplayMode {
        let total = self.total_secs();
        if total == 0 {
            return DisplayMode::Clock;
        }
        let position = elapsed_secs % total;
        let cpu_start = self.clock_secs;
        let mem_start = cpu_start + self.cpu_secs;
        let storage_start = mem_start + self.mem_secs;
        if position < cpu_start {
            DisplayMode::Clock
        } else if position < mem_start {
            DisplayMode::CpuStat
        } else if position < storage_start {
            DisplayMode::MemStat
        } else {
            DisplayMode::StorageStat
        }
    }
}

/// Mode for the default 10/4/3/3 second cycle.
pub fn mode_at(elapsed_secs: u64) -> DisplayMode {
    CycleTable::default().mode_at(elapsed_secs)
}

/// Colon blink phase: lit on even seconds, dark on odd ones.
pub fn is_even_second(elapsed_secs: u64) -> bool {
    elapsed_secs % 2 == 0
}

/// Monotonic origin fixed once at startup.
#[derive(Debug, Clone, Copy)]
pub struct CycleClock {
    origin: Instant,
}

impl CycleClock {
    pub fn start() -> Self {
        Self::starting_at(Instant::now())
    }

    pub fn starting_at(origin: Instant) -> Self {
        Self { origin }
    }

    pub fn elapsed_secs(&self) -> u64 {
        self.elapsed_secs_at(Instant::now())
    }

    pub fn elapsed_secs_at(&self, now: Instant) -> u64 {
        now.saturating_duration_since(self.origin).as_secs()
    }
}
