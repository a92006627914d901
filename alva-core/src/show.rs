//! JSON show files: a frame rate, a playhead and a strip list exported by
//! the host.

use std::fmt;
use std::fs;
use std::path::Path;

use alva_types::{Frame, FrameRate, Strip};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Show {
    #[serde(default)]
    pub frame_rate: FrameRate,
    #[serde(default)]
    pub frame_current: Frame,
    #[serde(default)]
    pub strips: Vec<Strip>,
}

#[derive(Debug)]
pub enum ShowError {
    Io(std::io::Error),
    Json(serde_json::Error),
}

impl From<std::io::Error> for ShowError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<serde_json::Error> for ShowError {
    fn from(e: serde_json::Error) -> Self {
        Self::Json(e)
    }
}

impl fmt::Display for ShowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "IO error: {}", e),
            Self::Json(e) => write!(f, "JSON error: {}", e),
        }
    }
}

impl std::error::Error for ShowError {}

impl Show {
    pub fn load(path: &Path) -> Result<Self, ShowError> {
        let contents = fs::read_to_string(path)?;
        let show = Self::from_json(&contents)?;
        log::info!(
            target: "show",
            "loaded {} strips from {} at {}",
            show.strips.len(),
            path.display(),
            show.frame_rate
        );
        Ok(show)
    }

    pub fn from_json(json: &str) -> Result<Self, ShowError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn save(&self, path: &Path) -> Result<(), ShowError> {
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Last frame any strip reaches, or `frame_current` for an empty show.
    pub fn last_frame(&self) -> Frame {
        self.strips
            .iter()
            .map(|s| s.frame_final_end)
            .max()
            .unwrap_or(self.frame_current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alva_types::{CueStrip, StripKind};

    #[test]
    fn missing_sections_take_defaults() {
        let show = Show::from_json("{}").unwrap();
        assert_eq!(show.frame_rate, FrameRate::default());
        assert_eq!(show.frame_current, 0);
        assert!(show.strips.is_empty());
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(matches!(Show::from_json("{"), Err(ShowError::Json(_))));
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("show.json");
        let show = Show {
            frame_rate: FrameRate::new(24, 1.0),
            frame_current: 12,
            strips: vec![Strip::new("c", 0, 48, StripKind::Cue(CueStrip { eos_cue_number: 2 }))],
        };
        show.save(&path).unwrap();
        assert_eq!(Show::load(&path).unwrap(), show);
        assert_eq!(show.last_frame(), 48);
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            Show::load(&dir.path().join("nope.json")),
            Err(ShowError::Io(_))
        ));
    }
}
