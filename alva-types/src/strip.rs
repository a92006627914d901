use serde::{Deserialize, Serialize};

use crate::{Frame, MAX_FLASH_BIAS};

/// One timeline strip, as a read-only snapshot of the host's item.
///
/// The interval is half-open: `[frame_start, frame_final_end)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Strip {
    #[serde(default)]
    pub name: String,
    #[serde(default = "default_channel")]
    pub channel: u32,
    pub frame_start: Frame,
    pub frame_final_end: Frame,
    #[serde(default)]
    pub muted: bool,
    #[serde(flatten)]
    pub kind: StripKind,
}

fn default_channel() -> u32 {
    1
}

/// Kind-specific payload of a strip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum StripKind {
    Macro(MacroStrip),
    Cue(CueStrip),
    Flash(FlashStrip),
    Trigger(TriggerStrip),
    Sound(SoundStrip),
    Movie,
}

/// Console macro fired on the strip's start and/or end edge.
///
/// A non-zero macro number wins over the text; text-only macros are sent as
/// a raw command line.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MacroStrip {
    pub start_frame_macro: u32,
    pub start_frame_macro_text: String,
    pub start_macro_muted: bool,
    pub end_frame_macro: u32,
    pub end_frame_macro_text: String,
    pub end_macro_muted: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CueStrip {
    /// Zero means "no cue".
    pub eos_cue_number: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlashStrip {
    pub start_flash_macro_number: u32,
    pub end_flash_macro_number: u32,
    pub flash_bias: i8,
}

impl FlashStrip {
    /// Bias clamped to `[-49, 49]`.
    pub fn bias(&self) -> i8 {
        self.flash_bias.clamp(-MAX_FLASH_BIAS, MAX_FLASH_BIAS)
    }
}

/// Free-form OSC trigger: `osc_trigger` on start, `osc_trigger_end` on end,
/// plus optional offset commands spread across the strip ("friends").
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TriggerStrip {
    pub trigger_prefix: String,
    pub osc_trigger: String,
    pub osc_trigger_end: String,
    pub friend_list: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SoundStrip {
    /// Console event list driven by this song. Zero = not a clock source.
    pub song_timecode_clock_number: u32,
}

impl Strip {
    pub fn new(name: &str, frame_start: Frame, frame_final_end: Frame, kind: StripKind) -> Self {
        Self {
            name: name.to_string(),
            channel: 1,
            frame_start,
            frame_final_end: frame_final_end.max(frame_start),
            muted: false,
            kind,
        }
    }

    pub fn muted(mut self) -> Self {
        self.muted = true;
        self
    }

    /// Length in frames. Never negative.
    pub fn duration(&self) -> Frame {
        (self.frame_final_end - self.frame_start).max(0)
    }

    /// Whether `frame` falls inside `[frame_start, frame_final_end)`.
    pub fn contains(&self, frame: Frame) -> bool {
        self.frame_start <= frame && frame < self.frame_final_end
    }

    pub fn kind_name(&self) -> &'static str {
        match self.kind {
            StripKind::Macro(_) => "Macro",
            StripKind::Cue(_) => "Cue",
            StripKind::Flash(_) => "Flash",
            StripKind::Trigger(_) => "Trigger",
            StripKind::Sound(_) => "Sound",
            StripKind::Movie => "Movie",
        }
    }

    /// Cue number of an unmuted cue strip, if it carries one.
    pub fn active_cue(&self) -> Option<u32> {
        match &self.kind {
            StripKind::Cue(cue) if !self.muted && cue.eos_cue_number != 0 => Some(cue.eos_cue_number),
            _ => None,
        }
    }

    /// Event list number of an unmuted sound strip acting as a timecode clock.
    pub fn timecode_clock(&self) -> Option<u32> {
        match &self.kind {
            StripKind::Sound(sound) if !self.muted && sound.song_timecode_clock_number != 0 => {
                Some(sound.song_timecode_clock_number)
            }
            _ => None,
        }
    }
}
