//! Frame, timecode and tempo arithmetic.
//!
//! Rounding is half-to-even throughout so that frame positions agree with
//! what the add-on has always produced for existing shows.

use alva_types::{Frame, MAX_FLASH_BIAS};

/// Convert a frame number to `HH:MM:SS:FF` at `fps` frames per second.
///
/// No drop-frame correction is applied. A non-positive rate yields zero.
pub fn frame_to_timecode(frame: Frame, fps: f64) -> String {
    if fps <= 0.0 {
        return "00:00:00:00".to_string();
    }
    let mut rem = frame as f64;
    let hours = (rem / (fps * 3600.0)).floor() as i64;
    rem = rem.rem_euclid(fps * 3600.0);
    let minutes = (rem / (fps * 60.0)).floor() as i64;
    rem = rem.rem_euclid(fps * 60.0);
    let seconds = (rem / fps).floor() as i64;
    let frames = rem.rem_euclid(fps).round_ties_even() as i64;
    format!("{:02}:{:02}:{:02}:{:02}", hours, minutes, seconds, frames)
}

/// Frames after the strip start at which a flash comes back down.
///
/// Zero bias is the midpoint. Negative bias pulls the release toward the
/// start, positive bias pushes it toward the end. The offset is a share of
/// the strip length in frames, so the frame rate does not enter into it.
pub fn bias_offset(bias: i8, duration: Frame) -> f64 {
    let max = MAX_FLASH_BIAS as f64;
    let bias = bias.clamp(-MAX_FLASH_BIAS, MAX_FLASH_BIAS) as f64;
    let duration = duration as f64;
    if bias == 0.0 {
        duration / 2.0
    } else if bias < 0.0 {
        (duration * ((max + bias) / max) * 0.5).round_ties_even()
    } else {
        (duration * (0.5 + (bias / max) * 0.5)).round_ties_even()
    }
}

/// Absolute frame of the flash-down fire for a strip.
pub fn flash_end_frame(frame_start: Frame, bias: i8, duration: Frame) -> Frame {
    (frame_start as f64 + bias_offset(bias, duration)).round_ties_even() as Frame
}

/// Frames between beats at `bpm`. Zero when `bpm` is zero.
pub fn frames_per_beat(bpm: u32, fps: f64) -> Frame {
    if bpm == 0 {
        return 0;
    }
    ((60.0 / bpm as f64) * fps).round_ties_even() as Frame
}

/// One beat on a generated grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BeatMark {
    pub frame: Frame,
    /// Last frame of the beat (inclusive), so adjacent beats never overlap.
    pub frame_last: Frame,
    /// 0-based position inside the measure.
    pub beat_in_measure: u32,
}

/// Beats every `frames_per_beat` frames over `[frame_start, frame_end)`.
pub fn beat_grid(
    frame_start: Frame,
    frame_end: Frame,
    bpm: u32,
    fps: f64,
    beats_per_measure: u32,
) -> Vec<BeatMark> {
    let step = frames_per_beat(bpm, fps);
    if step <= 0 {
        return Vec::new();
    }
    let per_measure = beats_per_measure.max(1);
    let mut marks = Vec::new();
    let mut frame = frame_start;
    let mut beat = 0;
    while frame < frame_end {
        marks.push(BeatMark {
            frame,
            frame_last: frame + step - 1,
            beat_in_measure: beat,
        });
        beat = (beat + 1) % per_measure;
        frame += step;
    }
    marks
}
