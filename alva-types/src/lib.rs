//! # alva-types
//!
//! Shared record types for the Alva trigger engine. The host (a sequencer,
//! the CLI, a test) converts its native timeline items into these immutable
//! values; nothing in here talks to the network.

mod settings;
mod strip;

pub use settings::{ConsoleSettings, PlaybackSettings, RenderSettings};
pub use strip::{CueStrip, FlashStrip, MacroStrip, SoundStrip, Strip, StripKind, TriggerStrip};

/// Frame number on the host timeline. Frames may be negative.
pub type Frame = i64;

/// Largest magnitude a flash bias may take in either direction.
pub const MAX_FLASH_BIAS: i8 = 49;

/// Host frame rate, stored the way the host stores it (`fps / fps_base`).
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FrameRate {
    pub fps: u32,
    #[serde(default = "default_fps_base")]
    pub fps_base: f64,
}

fn default_fps_base() -> f64 {
    1.0
}

impl FrameRate {
    pub fn new(fps: u32, fps_base: f64) -> Self {
        Self { fps, fps_base }
    }

    /// Frames per second as a real number. A zero base falls back to `fps`.
    pub fn value(&self) -> f64 {
        if self.fps_base > 0.0 {
            self.fps as f64 / self.fps_base
        } else {
            self.fps as f64
        }
    }
}

impl Default for FrameRate {
    fn default() -> Self {
        Self { fps: 30, fps_base: 1.0 }
    }
}

impl std::fmt::Display for FrameRate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.3} fps", self.value())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_rate_divides_by_base() {
        let ntsc = FrameRate::new(30, 1.001);
        assert!((ntsc.value() - 29.97).abs() < 0.001);
        assert_eq!(FrameRate::new(24, 1.0).value(), 24.0);
    }

    #[test]
    fn zero_base_does_not_divide_by_zero() {
        assert_eq!(FrameRate::new(25, 0.0).value(), 25.0);
    }

    #[test]
    fn frame_rate_base_defaults_to_one() {
        let rate: FrameRate = serde_json::from_str(r#"{"fps": 24}"#).unwrap();
        assert_eq!(rate, FrameRate::new(24, 1.0));
    }
}
