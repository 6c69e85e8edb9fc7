use crate::{
    frame::{encode, Thresholds, WallTime},
    schedule::DisplayMode,
    sensors::SensorSnapshot,
};
use serde_json::{json, Map, Value};
use std::time::SystemTime;

/// One-shot report for `tx3vfd status`: readings, their sources, and the frame
/// each mode would put on the panel right now.
pub fn status_report(snapshot: &SensorSnapshot, wall: WallTime, thresholds: &Thresholds) -> Value {
    let mut frames = Map::new();
    for mode in DisplayMode::ALL {
        let frame = encode(mode, snapshot, wall, 0, thresholds);
        frames.insert(mode.as_str().to_string(), json!(frame));
    }
    json!({
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": humantime::format_rfc3339_seconds(SystemTime::now()).to_string(),
        "readings": snapshot.readings(),
        "sources": snapshot.sources,
        "frames": frames,
    })
}
