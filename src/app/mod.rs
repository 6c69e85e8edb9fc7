use crate::{
    cli::RunOptions,
    config::{self, Config},
    display::{OutputSink, SysfsSink},
    frame::{Thresholds, WallTime},
    schedule::CycleTable,
    sensors::{SensorProvider, SensorSettings, SystemRunner},
    Result,
};
use std::{path::Path, sync::Arc, time::Duration};

mod lifecycle;
mod logger;
mod render_loop;
mod status;

pub use lifecycle::{ensure_privileged, install_signal_handler, ShutdownToken};
pub use logger::{LogLevel, Logger};
pub use render_loop::{
    apply_frame, render_tick, run_render_loop, show_boot, EndpointHealth, LoopSettings,
};
pub use status::status_report;

/// Config for the daemon: file values with CLI overrides applied.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub display_path: String,
    pub led_dir: String,
    pub tick_ms: u64,
    pub boot_text: String,
    pub boot_hold_ms: u64,
    pub cycle: CycleTable,
    pub thresholds: Thresholds,
    pub sensors: SensorSettings,
    pub command_timeout_ms: u64,
    pub log_level: LogLevel,
    pub log_file: Option<String>,
    pub syslog: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        let cfg = Config::default();
        Self {
            display_path: cfg.display_path.clone(),
            led_dir: cfg.led_dir.clone(),
            tick_ms: cfg.tick_ms,
            boot_text: cfg.boot_text.clone(),
            boot_hold_ms: cfg.boot_hold_ms,
            cycle: cfg.cycle(),
            thresholds: cfg.thresholds(),
            sensors: cfg.sensor_settings(),
            command_timeout_ms: cfg.command_timeout_ms,
            log_level: LogLevel::default(),
            log_file: None,
            syslog: false,
        }
    }
}

impl AppConfig {
    pub fn from_sources(mut config: Config, opts: RunOptions) -> Result<Self> {
        if let Some(path) = opts.display_path {
            config.display_path = path;
        }
        if let Some(dir) = opts.led_dir {
            config.led_dir = dir;
        }
        if let Some(tick) = opts.tick_ms {
            config.tick_ms = tick;
        }
        config::validate(&config)?;

        let log_level = match opts.log_level.as_deref() {
            Some(raw) => LogLevel::parse_arg(raw)?,
            None => LogLevel::default(),
        };

        Ok(Self {
            cycle: config.cycle(),
            thresholds: config.thresholds(),
            sensors: config.sensor_settings(),
            display_path: config.display_path,
            led_dir: config.led_dir,
            tick_ms: config.tick_ms,
            boot_text: config.boot_text,
            boot_hold_ms: config.boot_hold_ms,
            command_timeout_ms: config.command_timeout_ms,
            log_level,
            log_file: opts.log_file,
            syslog: opts.syslog,
        })
    }

    pub fn loop_settings(&self) -> LoopSettings {
        LoopSettings {
            tick: Duration::from_millis(self.tick_ms),
            cycle: self.cycle,
            thresholds: self.thresholds,
            boot_text: self.boot_text.clone(),
            boot_hold: Duration::from_millis(self.boot_hold_ms),
        }
    }
}

pub struct App {
    config: AppConfig,
    logger: Logger,
}

impl App {
    pub fn new(config: AppConfig) -> Result<Self> {
        let logger = Logger::new(config.log_level, config.log_file.clone(), config.syslog)?;
        Ok(Self { config, logger })
    }

    pub fn from_options(opts: RunOptions) -> Result<Self> {
        let cfg_file = match opts.config_path.as_deref() {
            Some(path) => Config::load_from_path(Path::new(path))?,
            None => Config::load_or_default()?,
        };
        let merged = AppConfig::from_sources(cfg_file, opts)?;
        Self::new(merged)
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn logger(&self) -> &Logger {
        &self.logger
    }

    /// Production sensor chains; commands time out after `command_timeout_ms`.
    pub fn sensor_provider(&self) -> SensorProvider {
        let runner = SystemRunner::new(Duration::from_millis(self.config.command_timeout_ms));
        SensorProvider::from_settings(&self.config.sensors, Arc::new(runner))
    }

    /// Entry point for the daemon: signal wiring, sysfs output. Callers check
    /// privilege with [`ensure_privileged`] before loading config.
    pub fn run(&self) -> Result<()> {
        let shutdown = ShutdownToken::new();
        if let Err(err) = install_signal_handler(&shutdown) {
            self.logger.error(format!("cannot install signal handler: {err}"));
            return Err(err);
        }

        let mut sink = SysfsSink::new(&self.config.display_path, &self.config.led_dir);
        let sensors = self.sensor_provider();
        self.run_with(&mut sink, &sensors, &shutdown)
    }

    /// Run the loop against any sink and sensor set until `shutdown` fires.
    pub fn run_with<S: OutputSink>(
        &self,
        sink: &mut S,
        sensors: &SensorProvider,
        shutdown: &ShutdownToken,
    ) -> Result<()> {
        self.logger.info(format!(
            "tx3vfd {} starting (display={}, leds={}, tick={}ms, cycle={}s)",
            env!("CARGO_PKG_VERSION"),
            self.config.display_path,
            self.config.led_dir,
            self.config.tick_ms,
            self.config.cycle.total_secs()
        ));
        let present = sink.display_present();
        self.logger.info(format!(
            "display available: {}",
            if present { "yes" } else { "no" }
        ));
        run_render_loop(
            sink,
            sensors,
            &self.config.loop_settings(),
            &self.logger,
            shutdown,
        )
    }

    /// Read every sensor once and render the JSON status report.
    pub fn status(&self) -> Result<String> {
        let snapshot = self.sensor_provider().snapshot();
        let report = status_report(&snapshot, WallTime::now(), &self.config.thresholds);
        serde_json::to_string_pretty(&report)
            .map_err(|e| crate::Error::Parse(format!("status report: {e}")))
    }
}
