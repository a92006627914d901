//! Livemap: jump the console to the cue that should already be live.

use alva_types::{Frame, Strip};

const LABEL_PREFIX: &str = "Livemap Cue: ";

/// Cue number of the latest unmuted cue strip starting at or before `frame`.
///
/// Ties on `frame_start` go to the first strip in scan order.
pub fn resolve(strips: &[Strip], frame: Frame) -> Option<u32> {
    let mut best: Option<(Frame, u32)> = None;
    for strip in strips {
        let Some(cue) = strip.active_cue() else {
            continue;
        };
        if strip.frame_start > frame {
            continue;
        }
        if best.is_none_or(|(start, _)| strip.frame_start > start) {
            best = Some((strip.frame_start, cue));
        }
    }
    best.map(|(_, cue)| cue)
}

/// Command fired when playback starts mid-timeline.
pub fn livemap_command(cue: u32) -> String {
    format!("Go_to_Cue {} Time 1 Enter", cue)
}

/// Command shown while scrubbing a stopped timeline.
pub fn preview_command(cue: u32) -> String {
    format!("Go_to_Cue {} Time Enter", cue)
}

/// Status label; the cue part is left blank when nothing resolves.
pub fn label(cue: Option<u32>) -> String {
    match cue {
        Some(cue) => format!("{}{}", LABEL_PREFIX, cue),
        None => LABEL_PREFIX.to_string(),
    }
}
