use crate::Result;
use serde::Serialize;
use std::fmt;

pub mod fake;
pub mod sysfs;

pub use fake::RecordingSink;
pub use sysfs::SysfsSink;

/// Number of glyphs on the front panel.
pub const DISPLAY_WIDTH: usize = 4;

/// Text shown on the 4-digit panel. Always exactly four printable ASCII characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct DisplayText(String);

impl DisplayText {
    /// Truncate to four characters, pad short input with spaces on the right.
    pub fn new(raw: &str) -> Self {
        let mut text: String = raw
            .chars()
            .take(DISPLAY_WIDTH)
            .map(|c| if c.is_ascii_graphic() { c } else { ' ' })
            .collect();
        while text.len() < DISPLAY_WIDTH {
            text.push(' ');
        }
        Self(text)
    }

    pub fn blank() -> Self {
        Self::new("")
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DisplayText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Discrete indicator LEDs exposed under the LED class directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LedId {
    Alarm,
    Colon,
    Lan,
    Pause,
    Play,
    Usb,
    Wlan,
}

impl LedId {
    pub const ALL: [LedId; 7] = [
        LedId::Alarm,
        LedId::Colon,
        LedId::Lan,
        LedId::Pause,
        LedId::Play,
        LedId::Usb,
        LedId::Wlan,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LedId::Alarm => "alarm",
            LedId::Colon => "colon",
            LedId::Lan => "lan",
            LedId::Pause => "pause",
            LedId::Play => "play",
            LedId::Usb => "usb",
            LedId::Wlan => "wlan",
        }
    }
}

impl fmt::Display for LedId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// On/off state for every LED, rebuilt from scratch each tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LedState {
    pub alarm: bool,
    pub colon: bool,
    pub lan: bool,
    pub pause: bool,
    pub play: bool,
    pub usb: bool,
    pub wlan: bool,
}

impl LedState {
    pub fn all_off() -> Self {
        Self::default()
    }

    pub fn get(&self, led: LedId) -> bool {
        match led {
            LedId::Alarm => self.alarm,
            LedId::Colon => self.colon,
            LedId::Lan => self.lan,
            LedId::Pause => self.pause,
            LedId::Play => self.play,
            LedId::Usb => self.usb,
            LedId::Wlan => self.wlan,
        }
    }

    pub fn set(&mut self, led: LedId, on: bool) {
        let slot = match led {
            LedId::Alarm => &mut self.alarm,
            LedId::Colon => &mut self.colon,
            LedId::Lan => &mut self.lan,
            LedId::Pause => &mut self.pause,
            LedId::Play => &mut self.play,
            LedId::Usb => &mut self.usb,
            LedId::Wlan => &mut self.wlan,
        };
        *slot = on;
    }

    pub fn iter(&self) -> impl Iterator<Item = (LedId, bool)> + '_ {
        LedId::ALL.iter().map(move |&led| (led, self.get(led)))
    }
}

/// Something that can show text on the panel and toggle LEDs.
///
/// Every call is a single independent write. Failures are reported to the
/// caller but are never fatal: a missing LED or absent display is a normal
/// degraded-hardware condition.
pub trait OutputSink {
    fn write_text(&mut self, text: &DisplayText) -> Result<()>;

    fn set_led(&mut self, led: LedId, on: bool) -> Result<()>;

    /// Whether the text endpoint currently exists. Informational only.
    fn display_present(&self) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pads_short_text() {
        assert_eq!(DisplayText::new("C 5").as_str(), "C 5 ");
        assert_eq!(DisplayText::new("X").as_str(), "X   ");
        assert_eq!(DisplayText::blank().as_str(), "    ");
    }

    #[test]
    fn truncates_long_text() {
        assert_eq!(DisplayText::new("TOOLONGTEXT").as_str(), "TOOL");
        assert_eq!(DisplayText::new("0123456789").as_str().len(), 4);
        assert_eq!(DisplayText::new("1159").as_str(), "1159");
    }

    #[test]
    fn replaces_unprintable_characters() {
        assert_eq!(DisplayText::new("a\tb\n").as_str(), "a b ");
        assert_eq!(DisplayText::new("°C").as_str(), " C  ");
    }

    #[test]
    fn led_state_get_set_round_trip() {
        let mut leds = LedState::all_off();
        for led in LedId::ALL {
            assert!(!leds.get(led));
            leds.set(led, true);
            assert!(leds.get(led), "{led} should be on");
        }
        assert!(leds.iter().all(|(_, on)| on));
    }

    #[test]
    fn led_names_match_sysfs() {
        let names: Vec<_> = LedId::ALL.iter().map(|l| l.as_str()).collect();
        assert_eq!(
            names,
            vec!["alarm", "colon", "lan", "pause", "play", "usb", "wlan"]
        );
    }
}
