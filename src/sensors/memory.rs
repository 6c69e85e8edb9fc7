use super::{parse, Chain, Source};
use std::{
    fs,
    path::{Path, PathBuf},
};

pub fn default_chain(meminfo_path: &Path) -> Chain<f32> {
    Chain::new(0.0).then(MemInfoSource::new(meminfo_path))
}

/// `MemTotal` / `MemAvailable` from a meminfo file.
pub struct MemInfoSource {
    path: PathBuf,
}

impl MemInfoSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl Source<f32> for MemInfoSource {
    fn name(&self) -> &str {
        "meminfo"
    }

    fn read(&self) -> Option<f32> {
        let raw = fs::read_to_string(&self.path).ok()?;
        let (total, available) = parse::meminfo_totals(&raw)?;
        parse::memory_usage_percent(total, available)
    }
}
