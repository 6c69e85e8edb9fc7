//! Best-effort system readings.
//!
//! Every reading is backed by a [`Chain`] of [`Source`]s tried in order. A
//! source that cannot produce a value (missing utility, unreadable file,
//! unparsable output) returns `None` and the chain moves on; when nothing
//! answers, the chain's default is used. Acquisition therefore never fails.

use serde::Serialize;
use std::{path::PathBuf, sync::Arc};

pub mod command;
pub mod memory;
pub mod network;
pub mod parse;
pub mod storage;
pub mod temperature;

pub use command::{CommandRunner, ScriptedRunner, SystemRunner};

pub const FALLBACK_TEMPERATURE_C: f32 = 50.0;
pub const DEFAULT_MEMINFO_PATH: &str = "/proc/meminfo";
pub const DEFAULT_NET_CLASS_DIR: &str = "/sys/class/net";
pub const DEFAULT_ETHERNET_IFACE: &str = "eth0";
pub const DEFAULT_HWMON_PATHS: [&str; 3] = [
    "/sys/class/hwmon/hwmon0/temp1_input",
    "/sys/class/hwmon/hwmon1/temp1_input",
    "/sys/class/hwmon/hwmon2/temp1_input",
];
pub const WIRELESS_PREFIXES: [&str; 3] = ["wlan", "wlp", "wifi"];

/// One strategy for obtaining a value of type `T`.
pub trait Source<T>: Send + Sync {
    fn name(&self) -> &str;

    fn read(&self) -> Option<T>;
}

struct Link<T> {
    source: Box<dyn Source<T>>,
    accept: fn(&T) -> bool,
}

/// Ordered fallback chain ending in a fixed default.
pub struct Chain<T> {
    links: Vec<Link<T>>,
    fallback: T,
}

/// Value produced by a chain and which source supplied it (`None` = default).
#[derive(Debug, Clone, PartialEq)]
pub struct Resolved<T> {
    pub value: T,
    pub source: Option<String>,
}

impl<T: Clone> Chain<T> {
    pub fn new(fallback: T) -> Self {
        Self {
            links: Vec::new(),
            fallback,
        }
    }

    /// Append a source whose every value is accepted.
    pub fn then(self, source: impl Source<T> + 'static) -> Self {
        self.then_checked(source, |_| true)
    }

    /// Append a source whose values must pass `accept`; rejected values count
    /// as the source being unavailable.
    pub fn then_checked(
        mut self,
        source: impl Source<T> + 'static,
        accept: fn(&T) -> bool,
    ) -> Self {
        self.links.push(Link {
            source: Box::new(source),
            accept,
        });
        self
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    pub fn resolve(&self) -> Resolved<T> {
        for link in &self.links {
            if let Some(value) = link.source.read() {
                if (link.accept)(&value) {
                    return Resolved {
                        value,
                        source: Some(link.source.name().to_string()),
                    };
                }
            }
        }
        Resolved {
            value: self.fallback.clone(),
            source: None,
        }
    }

    pub fn value(&self) -> T {
        self.resolve().value
    }
}

/// Connectivity of the two network links shown on the panel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LinkStatus {
    pub wifi: bool,
    pub ethernet: bool,
}

/// A single point-in-time reading.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum SensorReading {
    Temperature(f32),
    MemoryUsagePercent(f32),
    DiskUsagePercent(u8),
    LinkStatus(LinkStatus),
}

/// Names of the sources that answered during one acquisition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SourceReport {
    pub temperature: Option<String>,
    pub memory: Option<String>,
    pub disk: Option<String>,
    pub link: Option<String>,
}

/// Every reading needed for one tick.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SensorSnapshot {
    pub temperature_c: f32,
    pub memory_pct: f32,
    pub disk_pct: u8,
    pub link: LinkStatus,
    pub sources: SourceReport,
}

impl SensorSnapshot {
    pub fn readings(&self) -> [SensorReading; 4] {
        [
            SensorReading::Temperature(self.temperature_c),
            SensorReading::MemoryUsagePercent(self.memory_pct),
            SensorReading::DiskUsagePercent(self.disk_pct),
            SensorReading::LinkStatus(self.link),
        ]
    }
}

/// Where the production sources look for their data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SensorSettings {
    pub hwmon_paths: Vec<PathBuf>,
    pub meminfo_path: PathBuf,
    pub net_class_dir: PathBuf,
    pub ethernet_iface: String,
}

impl Default for SensorSettings {
    fn default() -> Self {
        Self {
            hwmon_paths: DEFAULT_HWMON_PATHS.iter().map(PathBuf::from).collect(),
            meminfo_path: PathBuf::from(DEFAULT_MEMINFO_PATH),
            net_class_dir: PathBuf::from(DEFAULT_NET_CLASS_DIR),
            ethernet_iface: DEFAULT_ETHERNET_IFACE.to_string(),
        }
    }
}

pub struct SensorProvider {
    temperature: Chain<f32>,
    memory: Chain<f32>,
    disk: Chain<u8>,
    link: Chain<LinkStatus>,
}

impl SensorProvider {
    pub fn new(
        temperature: Chain<f32>,
        memory: Chain<f32>,
        disk: Chain<u8>,
        link: Chain<LinkStatus>,
    ) -> Self {
        Self {
            temperature,
            memory,
            disk,
            link,
        }
    }

    /// Production chains, with commands executed through `runner`.
    pub fn from_settings(settings: &SensorSettings, runner: Arc<dyn CommandRunner>) -> Self {
        Self::new(
            temperature::default_chain(&settings.hwmon_paths, runner.clone()),
            memory::default_chain(&settings.meminfo_path),
            storage::default_chain(runner.clone()),
            network::default_chain(&settings.net_class_dir, &settings.ethernet_iface, runner),
        )
    }

    pub fn temperature(&self) -> f32 {
        self.temperature.value()
    }

    pub fn memory_usage_percent(&self) -> f32 {
        self.memory.value()
    }

    pub fn disk_usage_percent(&self) -> u8 {
        self.disk.value()
    }

    pub fn network_link_status(&self) -> LinkStatus {
        self.link.value()
    }

    pub fn snapshot(&self) -> SensorSnapshot {
        let temperature = self.temperature.resolve();
        let memory = self.memory.resolve();
        let disk = self.disk.resolve();
        let link = self.link.resolve();
        SensorSnapshot {
            temperature_c: temperature.value,
            memory_pct: memory.value,
            disk_pct: disk.value,
            link: link.value,
            sources: SourceReport {
                temperature: temperature.source,
                memory: memory.source,
                disk: disk.source,
                link: link.source,
            },
        }
    }
}

/// A source that always answers with the same value. Handy for tests and for
/// pinning a reading on hardware without the usual utilities.
#[derive(Debug, Clone)]
pub struct FixedSource<T> {
    name: String,
    value: Option<T>,
}

impl<T> FixedSource<T> {
    pub fn new(name: &str, value: Option<T>) -> Self {
        Self {
            name: name.to_string(),
            value,
        }
    }
}

impl<T: Clone + Send + Sync> Source<T> for FixedSource<T> {
    fn name(&self) -> &str {
        &self.name
    }

    fn read(&self) -> Option<T> {
        self.value.clone()
    }
}
