use super::{DisplayText, LedId, LedState, OutputSink};
use crate::{Error, Result};
use std::collections::HashSet;

/// In-memory sink used by tests to capture writes and script endpoint failures.
#[derive(Debug, Default)]
pub struct RecordingSink {
    texts: Vec<String>,
    led_writes: Vec<(LedId, bool)>,
    leds: LedState,
    display_missing: bool,
    broken_leds: HashSet<LedId>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every text write fail, as if the SPI display were not bound.
    pub fn without_display(mut self) -> Self {
        self.display_missing = true;
        self
    }

    pub fn break_led(&mut self, led: LedId) {
        self.broken_leds.insert(led);
    }

    pub fn repair_led(&mut self, led: LedId) {
        self.broken_leds.remove(&led);
    }

    pub fn texts(&self) -> &[String] {
        &self.texts
    }

    pub fn last_text(&self) -> Option<&str> {
        self.texts.last().map(String::as_str)
    }

    pub fn led_writes(&self) -> &[(LedId, bool)] {
        &self.led_writes
    }

    /// Last successfully written value of every LED.
    pub fn leds(&self) -> LedState {
        self.leds
    }
}

impl OutputSink for RecordingSink {
    fn write_text(&mut self, text: &DisplayText) -> Result<()> {
        if self.display_missing {
            return Err(Error::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "display_text missing",
            )));
        }
        self.texts.push(text.as_str().to_string());
        Ok(())
    }

    fn set_led(&mut self, led: LedId, on: bool) -> Result<()> {
        if self.broken_leds.contains(&led) {
            return Err(Error::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!(":{led}/brightness missing"),
            )));
        }
        self.led_writes.push((led, on));
        self.leds.set(led, on);
        Ok(())
    }

    fn display_present(&self) -> bool {
        !self.display_missing
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_writes_and_scripted_failures() {
        let mut sink = RecordingSink::new();
        sink.write_text(&DisplayText::new("12")).unwrap();
        sink.set_led(LedId::Play, true).unwrap();
        sink.break_led(LedId::Usb);
        assert!(sink.set_led(LedId::Usb, true).is_err());
        assert_eq!(sink.texts(), &["12  ".to_string()]);
        assert_eq!(sink.led_writes(), &[(LedId::Play, true)]);
        assert!(sink.leds().play);
        assert!(!sink.leds().usb);

        let mut headless = RecordingSink::new().without_display();
        assert!(!headless.display_present());
        assert!(headless.write_text(&DisplayText::blank()).is_err());
    }
}
