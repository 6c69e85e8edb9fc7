use super::{DisplayText, LedId, OutputSink};
use crate::Result;
use std::{
    fs::OpenOptions,
    io::Write,
    path::{Path, PathBuf},
};

/// Writes panel text and LED brightness through sysfs attribute files.
#[derive(Debug, Clone)]
pub struct SysfsSink {
    display_path: PathBuf,
    led_dir: PathBuf,
}

impl SysfsSink {
    pub fn new(display_path: impl Into<PathBuf>, led_dir: impl Into<PathBuf>) -> Self {
        Self {
            display_path: display_path.into(),
            led_dir: led_dir.into(),
        }
    }

    pub fn display_path(&self) -> &Path {
        &self.display_path
    }

    /// `<led_dir>/:<name>/brightness`
    pub fn led_path(&self, led: LedId) -> PathBuf {
        self.led_dir
            .join(format!(":{}", led.as_str()))
            .join("brightness")
    }
}

impl OutputSink for SysfsSink {
    fn write_text(&mut self, text: &DisplayText) -> Result<()> {
        write_attribute(&self.display_path, text.as_str().as_bytes())
    }

    fn set_led(&mut self, led: LedId, on: bool) -> Result<()> {
        let value: &[u8] = if on { b"1" } else { b"0" };
        write_attribute(&self.led_path(led), value)
    }

    fn display_present(&self) -> bool {
        self.display_path.exists()
    }
}

// sysfs attributes already exist; never create a regular file in their place.
fn write_attribute(path: &Path, value: &[u8]) -> Result<()> {
    let mut file = OpenOptions::new().write(true).truncate(true).open(path)?;
    file.write_all(value)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn fake_tree() -> (tempfile::TempDir, SysfsSink) {
        let dir = tempfile::tempdir().unwrap();
        let display = dir.path().join("display_text");
        fs::write(&display, "").unwrap();
        let leds = dir.path().join("leds");
        for led in LedId::ALL {
            let led_dir = leds.join(format!(":{}", led.as_str()));
            fs::create_dir_all(&led_dir).unwrap();
            fs::write(led_dir.join("brightness"), "0").unwrap();
        }
        let sink = SysfsSink::new(display, leds);
        (dir, sink)
    }

    #[test]
    fn writes_text_and_leds() {
        let (_dir, mut sink) = fake_tree();
        assert!(sink.display_present());
        sink.write_text(&DisplayText::new("TX3M")).unwrap();
        assert_eq!(fs::read_to_string(sink.display_path()).unwrap(), "TX3M");

        sink.set_led(LedId::Colon, true).unwrap();
        assert_eq!(fs::read_to_string(sink.led_path(LedId::Colon)).unwrap(), "1");
        sink.set_led(LedId::Colon, false).unwrap();
        assert_eq!(fs::read_to_string(sink.led_path(LedId::Colon)).unwrap(), "0");
    }

    #[test]
    fn missing_endpoint_is_an_error_not_a_new_file() {
        let dir = tempfile::tempdir().unwrap();
        let display = dir.path().join("display_text");
        let mut sink = SysfsSink::new(&display, dir.path().join("leds"));
        assert!(!sink.display_present());
        assert!(sink.write_text(&DisplayText::new("TX3M")).is_err());
        assert!(!display.exists());
        assert!(sink.set_led(LedId::Alarm, true).is_err());
    }

    #[test]
    fn led_path_layout() {
        let sink = SysfsSink::new("/tmp/display_text", "/sys/class/leds");
        assert_eq!(
            sink.led_path(LedId::Wlan),
            PathBuf::from("/sys/class/leds/:wlan/brightness")
        );
    }
}
