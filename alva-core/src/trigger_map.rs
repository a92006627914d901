//! Frame-indexed fire lists built from a strip snapshot.
//!
//! Maps are rebuilt wholesale at every playback start and never mutated
//! while playback runs. Frames are matched exactly: a frame the host skips
//! over is never fired.

use std::collections::BTreeMap;

use alva_types::{FlashStrip, Frame, MacroStrip, Strip, StripKind, TriggerStrip};

use crate::friends;
use crate::timecode;

/// Address used to fire a console macro by number.
pub const MACRO_FIRE_ADDRESS: &str = "/eos/macro/fire";
/// Address used to send a raw command line.
pub const NEWCMD_ADDRESS: &str = "/eos/newcmd";
/// Address used to fire a cue by number.
pub const CUE_FIRE_ADDRESS: &str = "/eos/cue/fire";

/// One command scheduled on a frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FireEntry {
    /// Strip the entry came from, for logs and event-list export.
    pub label: String,
    pub address: String,
    pub argument: String,
}

impl FireEntry {
    pub fn new(label: &str, address: &str, argument: impl Into<String>) -> Self {
        Self {
            label: label.to_string(),
            address: address.to_string(),
            argument: argument.into(),
        }
    }

    /// Console macro number, if this entry fires one.
    pub fn macro_number(&self) -> Option<u32> {
        if self.address == MACRO_FIRE_ADDRESS {
            self.argument.parse().ok()
        } else {
            None
        }
    }
}

/// Frame → ordered fire list. Entries on the same frame keep scan order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TriggerMap {
    frames: BTreeMap<Frame, Vec<FireEntry>>,
}

impl TriggerMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, frame: Frame, entry: FireEntry) {
        self.frames.entry(frame).or_default().push(entry);
    }

    /// Entries scheduled exactly on `frame`.
    pub fn get(&self, frame: Frame) -> &[FireEntry] {
        self.frames.get(&frame).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn contains_frame(&self, frame: Frame) -> bool {
        self.frames.contains_key(&frame)
    }

    /// Scheduled frames in ascending order.
    pub fn frames(&self) -> impl Iterator<Item = Frame> + '_ {
        self.frames.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Frame, &[FireEntry])> + '_ {
        self.frames.iter().map(|(f, e)| (*f, e.as_slice()))
    }

    /// Total number of entries across all frames.
    pub fn len(&self) -> usize {
        self.frames.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

/// Which map an entry belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MapKind {
    MacroStart,
    MacroEnd,
    FlashStart,
    FlashEnd,
    TriggerStart,
    TriggerOffset,
    TriggerEnd,
    Cue,
}

impl MapKind {
    /// Maps fired during live playback, in firing order for a single frame.
    pub const LIVE: [MapKind; 7] = [
        MapKind::MacroStart,
        MapKind::FlashStart,
        MapKind::TriggerStart,
        MapKind::TriggerOffset,
        MapKind::TriggerEnd,
        MapKind::FlashEnd,
        MapKind::MacroEnd,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            MapKind::MacroStart => "macro start",
            MapKind::MacroEnd => "macro end",
            MapKind::FlashStart => "flash start",
            MapKind::FlashEnd => "flash end",
            MapKind::TriggerStart => "trigger start",
            MapKind::TriggerOffset => "trigger offset",
            MapKind::TriggerEnd => "trigger end",
            MapKind::Cue => "cue",
        }
    }
}

/// Every map produced by one scan of the strips.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TriggerMaps {
    pub macro_start: TriggerMap,
    pub macro_end: TriggerMap,
    pub flash_start: TriggerMap,
    pub flash_end: TriggerMap,
    pub trigger_start: TriggerMap,
    pub trigger_offset: TriggerMap,
    pub trigger_end: TriggerMap,
    pub cue: TriggerMap,
}

impl TriggerMaps {
    pub fn get(&self, kind: MapKind) -> &TriggerMap {
        match kind {
            MapKind::MacroStart => &self.macro_start,
            MapKind::MacroEnd => &self.macro_end,
            MapKind::FlashStart => &self.flash_start,
            MapKind::FlashEnd => &self.flash_end,
            MapKind::TriggerStart => &self.trigger_start,
            MapKind::TriggerOffset => &self.trigger_offset,
            MapKind::TriggerEnd => &self.trigger_end,
            MapKind::Cue => &self.cue,
        }
    }

    /// Live entries on `frame`, in firing order.
    pub fn live_entries(&self, frame: Frame) -> impl Iterator<Item = (MapKind, &FireEntry)> + '_ {
        MapKind::LIVE
            .into_iter()
            .flat_map(move |kind| self.get(kind).get(frame).iter().map(move |e| (kind, e)))
    }

    pub fn total_entries(&self) -> usize {
        self.macro_start.len()
            + self.macro_end.len()
            + self.flash_start.len()
            + self.flash_end.len()
            + self.trigger_start.len()
            + self.trigger_offset.len()
            + self.trigger_end.len()
            + self.cue.len()
    }
}

/// Scan `strips` once and build every trigger map.
///
/// Muted strips and strips with missing trigger data are skipped silently.
/// A malformed offset list only drops that strip's offset entries.
pub fn build_trigger_maps(strips: &[Strip]) -> TriggerMaps {
    let mut maps = TriggerMaps::default();
    for strip in strips.iter().filter(|s| !s.muted) {
        match &strip.kind {
            StripKind::Macro(m) => add_macro(&mut maps, strip, m),
            StripKind::Flash(f) => add_flash(&mut maps, strip, f),
            StripKind::Trigger(t) => add_trigger(&mut maps, strip, t),
            StripKind::Cue(c) => {
                if c.eos_cue_number != 0 && !strip.name.is_empty() {
                    maps.cue.insert(
                        strip.frame_start,
                        FireEntry::new(&strip.name, CUE_FIRE_ADDRESS, c.eos_cue_number.to_string()),
                    );
                }
            }
            StripKind::Sound(_) | StripKind::Movie => {}
        }
    }
    log::debug!(
        target: "triggers",
        "built trigger maps: {} entries from {} strips",
        maps.total_entries(),
        strips.len()
    );
    maps
}

fn macro_entry(label: &str, number: u32, text: &str) -> Option<FireEntry> {
    if label.is_empty() {
        return None;
    }
    if number != 0 {
        Some(FireEntry::new(label, MACRO_FIRE_ADDRESS, number.to_string()))
    } else if !text.trim().is_empty() {
        Some(FireEntry::new(label, NEWCMD_ADDRESS, text))
    } else {
        None
    }
}

fn add_macro(maps: &mut TriggerMaps, strip: &Strip, m: &MacroStrip) {
    if !m.start_macro_muted {
        if let Some(entry) = macro_entry(&strip.name, m.start_frame_macro, &m.start_frame_macro_text) {
            maps.macro_start.insert(strip.frame_start, entry);
        }
    }
    if !m.end_macro_muted {
        if let Some(entry) = macro_entry(&strip.name, m.end_frame_macro, &m.end_frame_macro_text) {
            maps.macro_end.insert(strip.frame_final_end, entry);
        }
    }
}

fn add_flash(maps: &mut TriggerMaps, strip: &Strip, f: &FlashStrip) {
    if strip.name.is_empty() {
        return;
    }
    if f.start_flash_macro_number != 0 {
        maps.flash_start.insert(
            strip.frame_start,
            FireEntry::new(&strip.name, MACRO_FIRE_ADDRESS, f.start_flash_macro_number.to_string()),
        );
    }
    if f.end_flash_macro_number != 0 {
        let frame = timecode::flash_end_frame(strip.frame_start, f.bias(), strip.duration());
        maps.flash_end.insert(
            frame,
            FireEntry::new(&strip.name, MACRO_FIRE_ADDRESS, f.end_flash_macro_number.to_string()),
        );
    }
}

fn add_trigger(maps: &mut TriggerMaps, strip: &Strip, t: &TriggerStrip) {
    if t.trigger_prefix.is_empty() {
        return;
    }
    if !t.osc_trigger.is_empty() {
        maps.trigger_start.insert(
            strip.frame_start,
            FireEntry::new(&strip.name, &t.trigger_prefix, t.osc_trigger.as_str()),
        );
    }
    if !t.osc_trigger_end.is_empty() {
        maps.trigger_end.insert(
            strip.frame_final_end,
            FireEntry::new(&strip.name, &t.trigger_prefix, t.osc_trigger_end.as_str()),
        );
    }
    if !t.friend_list.trim().is_empty() {
        match friends::offset_commands(&t.osc_trigger, &t.friend_list) {
            Ok(commands) => add_offsets(maps, strip, t, commands),
            Err(e) => log::warn!(
                target: "triggers",
                "skipping offsets for strip {:?}: {}",
                strip.name,
                e
            ),
        }
    }
}

fn add_offsets(maps: &mut TriggerMaps, strip: &Strip, t: &TriggerStrip, commands: Vec<String>) {
    if commands.is_empty() {
        return;
    }
    let step = strip.duration() as f64 / commands.len() as f64;
    for (i, command) in commands.into_iter().enumerate() {
        let frame = strip.frame_start + (step * i as f64).floor() as Frame;
        maps.trigger_offset
            .insert(frame, FireEntry::new(&strip.name, &t.trigger_prefix, command));
    }
}
