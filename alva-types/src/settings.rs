use serde::{Deserialize, Serialize};

/// Where the lighting console listens for OSC.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsoleSettings {
    pub ip_address: String,
    pub port: u16,
}

impl Default for ConsoleSettings {
    fn default() -> Self {
        Self {
            ip_address: "192.168.1.1".to_string(),
            port: 8000,
        }
    }
}

/// Behaviour of live playback: arming, house lights and timecode sync.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaybackSettings {
    /// Master arm. A disarmed session fires nothing.
    pub armed: bool,
    /// Jump to the nearest preceding cue when playback starts.
    pub livemap_armed: bool,
    pub house_down_on_play: bool,
    pub house_up_on_stop: bool,
    pub house_prefix: String,
    pub house_down_argument: String,
    pub house_up_argument: String,
    /// Keep the console's internal timecode clock locked to playback.
    pub sync_timecode: bool,
    /// Frames added to the playhead when computing the sync timecode (0..=100).
    pub timecode_expected_lag: u32,
}

impl Default for PlaybackSettings {
    fn default() -> Self {
        Self {
            armed: true,
            livemap_armed: true,
            house_down_on_play: false,
            house_up_on_stop: false,
            house_prefix: "/eos/newcmd".to_string(),
            house_down_argument: "500 at 1 Enter".to_string(),
            house_up_argument: "500 at 75 Enter".to_string(),
            sync_timecode: true,
            timecode_expected_lag: 0,
        }
    }
}

/// Batch export of trigger maps to a console event list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderSettings {
    /// Snapshot recalled once the export finishes (1..=9999).
    pub finish_snapshot: u32,
    /// Event lines joined into one command line.
    pub batch_size: usize,
    /// Pause between consecutive sends, in milliseconds.
    pub send_delay_ms: u64,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            finish_snapshot: 1,
            batch_size: 50,
            send_delay_ms: 100,
        }
    }
}
