use std::collections::HashSet;
use std::fmt;
use std::time::{Duration, Instant};

use super::lifecycle::{render_shutdown, ShutdownToken};
use super::Logger;
use crate::{
    display::{DisplayText, LedId, OutputSink},
    frame::{encode, Frame, Thresholds, WallTime},
    schedule::{CycleClock, CycleTable, DisplayMode},
    sensors::SensorProvider,
    Result,
};

/// Timing and policy knobs for the render loop.
#[derive(Debug, Clone, PartialEq)]
pub struct LoopSettings {
    pub tick: Duration,
    pub cycle: CycleTable,
    pub thresholds: Thresholds,
    pub boot_text: String,
    pub boot_hold: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Endpoint {
    Display,
    Led(LedId),
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Endpoint::Display => f.write_str("display"),
            Endpoint::Led(led) => write!(f, "led {led}"),
        }
    }
}

/// Remembers which endpoints are failing so a missing LED is reported once,
/// not on every tick.
#[derive(Debug, Default)]
pub struct EndpointHealth {
    failing: HashSet<Endpoint>,
}

impl EndpointHealth {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_count(&self) -> usize {
        self.failing.len()
    }

    pub fn display_failing(&self) -> bool {
        self.failing.contains(&Endpoint::Display)
    }

    pub fn led_failing(&self, led: LedId) -> bool {
        self.failing.contains(&Endpoint::Led(led))
    }

    fn record(&mut self, endpoint: Endpoint, outcome: Result<()>, logger: &Logger) {
        match outcome {
            Ok(()) => {
                if self.failing.remove(&endpoint) {
                    logger.info(format!("{endpoint} writable again"));
                }
            }
            Err(err) => {
                if self.failing.insert(endpoint) {
                    logger.warn(format!(
                        "{endpoint} write failed: {err}; skipping until it recovers"
                    ));
                } else {
                    logger.trace(format!("{endpoint} still failing: {err}"));
                }
            }
        }
    }
}

/// Push one frame to the sink. Failed writes are logged and skipped.
pub fn apply_frame<S: OutputSink>(
    sink: &mut S,
    frame: &Frame,
    health: &mut EndpointHealth,
    logger: &Logger,
) {
    let outcome = sink.write_text(&frame.text);
    health.record(Endpoint::Display, outcome, logger);
    for (led, on) in frame.leds.iter() {
        let outcome = sink.set_led(led, on);
        health.record(Endpoint::Led(led), outcome, logger);
    }
}

/// Acquire, encode and write a single tick.
pub fn render_tick<S: OutputSink>(
    sink: &mut S,
    sensors: &SensorProvider,
    settings: &LoopSettings,
    elapsed_secs: u64,
    wall: WallTime,
    health: &mut EndpointHealth,
    logger: &Logger,
) -> Frame {
    let mode = settings.cycle.mode_at(elapsed_secs);
    let snapshot = sensors.snapshot();
    logger.trace(format!(
        "tick {elapsed_secs}s mode={mode} temp={:.1} mem={:.1} disk={} wifi={} eth={}",
        snapshot.temperature_c,
        snapshot.memory_pct,
        snapshot.disk_pct,
        snapshot.link.wifi,
        snapshot.link.ethernet
    ));
    let frame = encode(mode, &snapshot, wall, elapsed_secs, &settings.thresholds);
    apply_frame(sink, &frame, health, logger);
    frame
}

/// Show the boot banner (only when the display is present) and hold it.
/// Returns `false` if shutdown was requested during the hold.
pub fn show_boot<S: OutputSink>(
    sink: &mut S,
    settings: &LoopSettings,
    shutdown: &ShutdownToken,
    health: &mut EndpointHealth,
    logger: &Logger,
) -> bool {
    if !sink.display_present() {
        return true;
    }
    let outcome = sink.write_text(&DisplayText::new(&settings.boot_text));
    health.record(Endpoint::Display, outcome, logger);
    !shutdown.wait_timeout(settings.boot_hold)
}

/// Drive the panel until `shutdown` is cancelled, then blank it once.
pub fn run_render_loop<S: OutputSink>(
    sink: &mut S,
    sensors: &SensorProvider,
    settings: &LoopSettings,
    logger: &Logger,
    shutdown: &ShutdownToken,
) -> Result<()> {
    let started = Instant::now();
    let mut health = EndpointHealth::new();

    if show_boot(sink, settings, shutdown, &mut health, logger) {
        let clock = CycleClock::start();
        let mut last_mode: Option<DisplayMode> = None;

        while !shutdown.is_cancelled() {
            let elapsed_secs = clock.elapsed_secs();
            let mode = settings.cycle.mode_at(elapsed_secs);
            if last_mode != Some(mode) {
                logger.debug(format!("display mode -> {mode}"));
                last_mode = Some(mode);
            }
            render_tick(
                sink,
                sensors,
                settings,
                elapsed_secs,
                WallTime::now(),
                &mut health,
                logger,
            );
            shutdown.wait_timeout(settings.tick);
        }
    }

    render_shutdown(sink, &mut health, logger);
    let uptime = Duration::from_secs(started.elapsed().as_secs());
    logger.info(format!(
        "daemon exiting after {}",
        humantime::format_duration(uptime)
    ));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::LogLevel;
    use crate::display::RecordingSink;
    use crate::sensors::{Chain, FixedSource, LinkStatus, FALLBACK_TEMPERATURE_C};

    fn quiet_logger() -> Logger {
        Logger::new(LogLevel::Error, None, false).unwrap()
    }

    fn settings() -> LoopSettings {
        LoopSettings {
            tick: Duration::from_millis(10),
            cycle: CycleTable::default(),
            thresholds: Thresholds::default(),
            boot_text: "TX3M".into(),
            boot_hold: Duration::from_millis(0),
        }
    }

    fn provider(temp: f32) -> SensorProvider {
        SensorProvider::new(
            Chain::new(FALLBACK_TEMPERATURE_C).then(FixedSource::new("t", Some(temp))),
            Chain::new(0.0).then(FixedSource::new("m", Some(50.0))),
            Chain::new(0).then(FixedSource::new("d", Some(20))),
            Chain::new(LinkStatus::default()).then(FixedSource::new(
                "l",
                Some(LinkStatus {
                    wifi: false,
                    ethernet: true,
                }),
            )),
        )
    }

    #[test]
    fn tick_writes_text_and_every_led() {
        let mut sink = RecordingSink::new();
        let mut health = EndpointHealth::new();
        let frame = render_tick(
            &mut sink,
            &provider(72.0),
            &settings(),
            11,
            WallTime::new(14, 5),
            &mut health,
            &quiet_logger(),
        );
        assert_eq!(frame.text.as_str(), "C 72");
        assert_eq!(sink.last_text(), Some("C 72"));
        assert_eq!(sink.led_writes().len(), LedId::ALL.len());
        let leds = sink.leds();
        assert!(leds.alarm && leds.colon && leds.lan && leds.play);
        assert!(!leds.wlan && !leds.usb && !leds.pause);
    }

    #[test]
    fn failing_led_is_skipped_and_tracked() {
        let mut sink = RecordingSink::new();
        sink.break_led(LedId::Usb);
        let mut health = EndpointHealth::new();
        let logger = quiet_logger();
        let nine = WallTime::new(9, 0);
        let sensors = provider(40.0);
        let settings = settings();
        render_tick(&mut sink, &sensors, &settings, 0, nine, &mut health, &logger);
        assert!(health.led_failing(LedId::Usb));
        assert_eq!(health.failing_count(), 1);
        assert_eq!(sink.led_writes().len(), LedId::ALL.len() - 1);

        sink.repair_led(LedId::Usb);
        render_tick(&mut sink, &sensors, &settings, 1, nine, &mut health, &logger);
        assert_eq!(health.failing_count(), 0);
    }

    #[test]
    fn boot_banner_skipped_without_display() {
        let mut sink = RecordingSink::new().without_display();
        let mut health = EndpointHealth::new();
        let shutdown = ShutdownToken::new();
        let logger = quiet_logger();
        let proceed = show_boot(&mut sink, &settings(), &shutdown, &mut health, &logger);
        assert!(proceed);
        assert!(sink.texts().is_empty());
        assert!(!health.display_failing());
    }

    #[test]
    fn cancelled_before_start_only_blanks_panel() {
        let mut sink = RecordingSink::new();
        let shutdown = ShutdownToken::new();
        shutdown.cancel();
        let sensors = provider(40.0);
        let logger = quiet_logger();
        run_render_loop(&mut sink, &sensors, &settings(), &logger, &shutdown).unwrap();
        assert_eq!(sink.texts(), &["TX3M".to_string(), "    ".to_string()]);
        assert_eq!(sink.led_writes().len(), LedId::ALL.len());
        assert!(sink.led_writes().iter().all(|(_, on)| !on));
    }
}
