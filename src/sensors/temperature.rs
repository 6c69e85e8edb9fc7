use super::{parse, Chain, CommandRunner, Source, FALLBACK_TEMPERATURE_C};
use std::{
    fs,
    path::{Path, PathBuf},
    sync::Arc,
};

/// Bounds applied to lm-sensors readings. They exist to reject loosely
/// matched lines, not to model real silicon limits.
pub const LM_SENSORS_MIN_C: f32 = 10.0;
pub const LM_SENSORS_MAX_C: f32 = 100.0;

/// vcgencmd, then hwmon, then lm-sensors (range-checked), then 50 °C.
pub fn default_chain(hwmon_paths: &[PathBuf], runner: Arc<dyn CommandRunner>) -> Chain<f32> {
    Chain::new(FALLBACK_TEMPERATURE_C)
        .then(VcgencmdSource::new(runner.clone()))
        .then(HwmonSource::new(hwmon_paths.to_vec()))
        .then_checked(LmSensorsSource::new(runner), lm_sensors_plausible)
}

pub fn lm_sensors_plausible(celsius: &f32) -> bool {
    *celsius > LM_SENSORS_MIN_C && *celsius < LM_SENSORS_MAX_C
}

/// Raspberry Pi firmware query.
pub struct VcgencmdSource {
    runner: Arc<dyn CommandRunner>,
}

impl VcgencmdSource {
    pub fn new(runner: Arc<dyn CommandRunner>) -> Self {
        Self { runner }
    }
}

impl Source<f32> for VcgencmdSource {
    fn name(&self) -> &str {
        "vcgencmd"
    }

    fn read(&self) -> Option<f32> {
        let output = self.runner.run("vcgencmd", &["measure_temp"])?;
        parse::vcgencmd_temperature(&output)
    }
}

/// First existing node of an ordered hwmon candidate list.
pub struct HwmonSource {
    candidates: Vec<PathBuf>,
}

impl HwmonSource {
    pub fn new(candidates: Vec<PathBuf>) -> Self {
        Self { candidates }
    }

    fn first_existing(&self) -> Option<&Path> {
        self.candidates
            .iter()
            .map(PathBuf::as_path)
            .find(|path| path.exists())
    }
}

impl Source<f32> for HwmonSource {
    fn name(&self) -> &str {
        "hwmon"
    }

    fn read(&self) -> Option<f32> {
        let path = self.first_existing()?;
        let raw = fs::read_to_string(path).ok()?;
        parse::hwmon_temperature(&raw)
    }
}

/// Generic `sensors -u` output.
pub struct LmSensorsSource {
    runner: Arc<dyn CommandRunner>,
}

impl LmSensorsSource {
    pub fn new(runner: Arc<dyn CommandRunner>) -> Self {
        Self { runner }
    }
}

impl Source<f32> for LmSensorsSource {
    fn name(&self) -> &str {
        "lm-sensors"
    }

    fn read(&self) -> Option<f32> {
        let output = self.runner.run("sensors", &["-u"])?;
        parse::lm_sensors_temperature(&output)
    }
}
